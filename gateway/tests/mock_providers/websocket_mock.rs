//! WebSocket Mock Server for the Deepgram live endpoint
//!
//! Answers every binary chunk with a `Results` frame whose transcript names
//! the chunk, records what each connection received, and can drop the first
//! connection after its first chunk to simulate a provider failure.

use std::net::SocketAddr;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use futures::{SinkExt, StreamExt};
use parking_lot::Mutex;
use serde_json::{Value, json};
use tokio::net::{TcpListener, TcpStream};
use tokio_tungstenite::accept_hdr_async;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::tungstenite::handshake::server::{Request, Response};

/// Shared state of the mock server
#[derive(Default)]
pub struct DeepgramMockState {
    /// Connections accepted so far
    pub connections: AtomicUsize,
    /// Connections that have ended
    pub closed: AtomicUsize,
    /// Audio chunks received, tagged with the 1-based connection number
    pub chunks: Mutex<Vec<(usize, Vec<u8>)>>,
    /// `CloseStream` control messages received
    pub close_streams: AtomicUsize,
    /// `Authorization` header of the last handshake
    pub last_auth: Mutex<Option<String>>,
    /// Query string of the last handshake
    pub last_query: Mutex<Option<String>>,
    /// Drop connection 1 without a close frame after its first chunk
    pub drop_first_connection: AtomicBool,
}

impl DeepgramMockState {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn failing_first_connection() -> Arc<Self> {
        let state = Self::default();
        state.drop_first_connection.store(true, Ordering::SeqCst);
        Arc::new(state)
    }

    pub fn chunks_for(&self, connection: usize) -> Vec<Vec<u8>> {
        self.chunks
            .lock()
            .iter()
            .filter(|(conn, _)| *conn == connection)
            .map(|(_, data)| data.clone())
            .collect()
    }
}

/// Deepgram-shaped `Results` frame.
pub fn results_frame(transcript: &str) -> Value {
    json!({
        "type": "Results",
        "channel_index": [0, 1],
        "duration": 0.5,
        "start": 0.0,
        "is_final": true,
        "speech_final": false,
        "channel": {
            "alternatives": [{
                "transcript": transcript,
                "confidence": 0.95,
                "words": []
            }]
        }
    })
}

async fn handle_connection(
    stream: TcpStream,
    state: Arc<DeepgramMockState>,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let handshake_state = state.clone();
    let ws_stream = accept_hdr_async(stream, move |request: &Request, response: Response| {
        *handshake_state.last_auth.lock() = request
            .headers()
            .get("authorization")
            .and_then(|v| v.to_str().ok())
            .map(String::from);
        *handshake_state.last_query.lock() = request.uri().query().map(String::from);
        Ok(response)
    })
    .await?;
    let (mut write, mut read) = ws_stream.split();

    let conn_id = state.connections.fetch_add(1, Ordering::SeqCst) + 1;

    while let Some(msg) = read.next().await {
        match msg {
            Ok(Message::Binary(audio)) => {
                state.chunks.lock().push((conn_id, audio.to_vec()));
                let transcript = String::from_utf8_lossy(&audio).to_string();
                write
                    .send(Message::Text(results_frame(&transcript).to_string().into()))
                    .await?;

                if conn_id == 1 && state.drop_first_connection.load(Ordering::SeqCst) {
                    // Abrupt drop: no close frame
                    break;
                }
            }
            Ok(Message::Text(text)) => {
                if let Ok(msg) = serde_json::from_str::<Value>(&text)
                    && msg.get("type").and_then(|t| t.as_str()) == Some("CloseStream")
                {
                    state.close_streams.fetch_add(1, Ordering::SeqCst);
                    let metadata = json!({
                        "type": "Metadata",
                        "request_id": format!("req-{conn_id}"),
                        "duration": 0.5,
                        "channels": 1
                    });
                    write.send(Message::Text(metadata.to_string().into())).await?;
                    let _ = write.send(Message::Close(None)).await;
                    break;
                }
            }
            Ok(Message::Close(_)) => break,
            Ok(Message::Ping(data)) => {
                write.send(Message::Pong(data)).await?;
            }
            Err(_) => break,
            _ => {}
        }
    }

    state.closed.fetch_add(1, Ordering::SeqCst);
    Ok(())
}

/// Spawn the mock on an ephemeral port and return its `ws://` URL.
pub async fn spawn_deepgram_mock(state: Arc<DeepgramMockState>) -> String {
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind mock Deepgram listener");
    let addr: SocketAddr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        while let Ok((stream, _)) = listener.accept().await {
            let state = state.clone();
            tokio::spawn(async move {
                if let Err(e) = handle_connection(stream, state).await {
                    eprintln!("Mock Deepgram connection error: {}", e);
                }
            });
        }
    });

    format!("ws://{addr}/v1/listen")
}
