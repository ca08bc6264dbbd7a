//! Transcription WebSocket handler
//!
//! Binary frames from the browser are relayed to the speech service through a
//! [`TranscriptionSession`]; transcript payloads come back as text frames.

use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::{
        State,
        ws::{Message, WebSocket, WebSocketUpgrade},
    },
    response::Response,
};
use futures::{SinkExt, StreamExt};
use tokio::select;
use tracing::{debug, info, warn};

use crate::core::relay::{ClientChannel, ClientFrame, ForwardOutcome, TranscriptionSession};
use crate::state::AppState;

/// Outgoing frame buffer per client
const CHANNEL_BUFFER_SIZE: usize = 256;

/// Maximum WebSocket frame size (10 MB)
const MAX_WS_FRAME_SIZE: usize = 10 * 1024 * 1024;

/// Maximum WebSocket message size (10 MB)
const MAX_WS_MESSAGE_SIZE: usize = 10 * 1024 * 1024;

/// Time allowed for the close frame to reach the client at shutdown
const CLOSE_FRAME_TIMEOUT: Duration = Duration::from_secs(1);

/// `GET /api/deepgram`
///
/// Upgrades to a WebSocket. The session task is tracked by the shutdown
/// coordinator so the process can wait for it to close its speech connection.
pub async fn transcription_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
) -> Response {
    debug!("Transcription WebSocket upgrade requested");

    ws.max_frame_size(MAX_WS_FRAME_SIZE)
        .max_message_size(MAX_WS_MESSAGE_SIZE)
        .on_upgrade(move |socket| {
            let tracker = state.shutdown.tracker().clone();
            tracker.track_future(handle_transcription_socket(socket, state))
        })
}

async fn handle_transcription_socket(socket: WebSocket, state: Arc<AppState>) {
    let (mut sender, mut receiver) = socket.split();
    let (client, mut frames) = ClientChannel::new(CHANNEL_BUFFER_SIZE);

    // Writer task for outgoing frames
    let mut sender_task = tokio::spawn(async move {
        while let Some(frame) = frames.next().await {
            let result = match frame {
                ClientFrame::Text(text) => sender.send(Message::Text(text.into())).await,
                ClientFrame::Close => {
                    let _ = sender.send(Message::Close(None)).await;
                    break;
                }
            };

            if let Err(e) = result {
                debug!("Failed to send WebSocket message: {}", e);
                break;
            }
        }
    });

    let mut session = TranscriptionSession::new(state.stt_connector.clone(), client.clone());
    let session_id = session.id();
    info!(%session_id, "Transcription client connected");

    session.start().await;
    if !session.has_connection() {
        warn!(%session_id, "Continuing without transcription until the next audio chunk");
    }

    let shutdown = state.shutdown.token().clone();
    let mut server_closing = false;

    loop {
        select! {
            biased;

            _ = shutdown.cancelled() => {
                info!(%session_id, "Server shutting down, closing session");
                server_closing = true;
                break;
            }
            msg = receiver.next() => {
                match msg {
                    Some(Ok(Message::Binary(data))) => {
                        if session.forward_audio(data).await == ForwardOutcome::Dropped {
                            debug!(%session_id, "Speech connection replaced");
                        }
                    }
                    Some(Ok(Message::Text(_))) => {
                        debug!(%session_id, "Ignoring text frame from client");
                    }
                    Some(Ok(Message::Close(_))) | None => {
                        info!(%session_id, "Transcription client disconnected");
                        break;
                    }
                    Some(Ok(_)) => {}
                    Some(Err(e)) => {
                        warn!(%session_id, "Transcription WebSocket error: {}", e);
                        break;
                    }
                }
            }
        }
    }

    // Cleanup
    session.close().await;

    if server_closing {
        let _ = tokio::time::timeout(CLOSE_FRAME_TIMEOUT, async {
            client.shutdown().await;
            let _ = (&mut sender_task).await;
        })
        .await;
    }
    sender_task.abort();

    info!(%session_id, "Transcription session terminated");
}
