//! Deepgram STT WebSocket client implementation.
//!
//! This module contains the `DeepgramSTT` struct that implements the
//! `BaseSTT` trait for real-time speech-to-text streaming using Deepgram's
//! live transcription API, plus the `DeepgramConnector` that opens one of
//! these per transcription session.

use bytes::Bytes;
use futures::{SinkExt, StreamExt};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tokio::net::TcpStream;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tokio::time::{Instant, timeout};
use tokio_tungstenite::tungstenite::client::IntoClientRequest;
use tokio_tungstenite::tungstenite::http::HeaderValue;
use tokio_tungstenite::tungstenite::http::header::AUTHORIZATION;
use tokio_tungstenite::{
    MaybeTlsStream, WebSocketStream, connect_async,
    tungstenite::{Error as WsError, protocol::Message},
};
use tracing::{debug, error, info, warn};

use super::config::DeepgramSTTConfig;
use super::messages::{CloseStreamMessage, DeepgramMessage, KeepAliveMessage};
use crate::core::stt::base::{BaseSTT, STTConnector, STTError, STTEvent, STTEventCallback};

// =============================================================================
// Constants
// =============================================================================

/// Maximum time to wait for the WebSocket handshake.
const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Time allowed for Deepgram to flush final results after `CloseStream`.
const CLOSE_DRAIN_TIMEOUT: Duration = Duration::from_secs(2);

/// Upper bound on waiting for the connection task during `finish()`.
const FINISH_TIMEOUT: Duration = Duration::from_secs(5);

/// Audio queue depth between `send_audio()` and the connection task.
const AUDIO_CHANNEL_SIZE: usize = 32;

/// Event queue depth between the connection task and the event callback.
const EVENT_CHANNEL_SIZE: usize = 256;

type DeepgramStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

// =============================================================================
// DeepgramSTT Client
// =============================================================================

/// Deepgram live transcription client.
///
/// ```text
/// ┌─────────────────┐     ┌──────────────────┐     ┌─────────────────┐
/// │   send_audio()  │────▶│  ws_sender (mpsc)│────▶│  WebSocket Task │
/// └─────────────────┘     └──────────────────┘     └────────┬────────┘
///                                                           │
///                         ┌──────────────────┐              │
///                         │  event_tx (mpsc) │◀─────────────┘
///                         └────────┬─────────┘
///                                  │
///                         ┌────────▼─────────┐
///                         │  Event Forward   │────▶ Event Callback
///                         │      Task        │
///                         └──────────────────┘
/// ```
///
/// Events reach the callback in the order Deepgram sent them. Once the
/// connection task exits for any reason, `is_ready()` turns false and
/// `send_audio()` fails, which is the relay's signal to replace the
/// connection.
pub struct DeepgramSTT {
    config: DeepgramSTTConfig,

    /// Audio sender into the connection task
    ws_sender: Option<mpsc::Sender<Bytes>>,

    /// Graceful shutdown signal for the connection task
    shutdown_tx: Option<oneshot::Sender<()>>,

    connection_handle: Option<JoinHandle<()>>,

    event_forward_handle: Option<JoinHandle<()>>,

    event_callback: Option<STTEventCallback>,

    /// Connection state flag (shared with connection task)
    is_connected: Arc<AtomicBool>,
}

impl DeepgramSTT {
    /// Create a disconnected client.
    pub fn new(config: DeepgramSTTConfig) -> Result<Self, STTError> {
        if config.api_key.is_empty() {
            return Err(STTError::AuthenticationFailed(
                "API key is required for Deepgram STT".to_string(),
            ));
        }

        // Fail fast on a malformed endpoint rather than at connect time
        config.build_websocket_url()?;

        Ok(Self {
            config,
            ws_sender: None,
            shutdown_tx: None,
            connection_handle: None,
            event_forward_handle: None,
            event_callback: None,
            is_connected: Arc::new(AtomicBool::new(false)),
        })
    }

    /// Register the callback receiving this connection's events.
    ///
    /// Must be called before `connect()` to observe the `Open` event.
    pub fn on_event(&mut self, callback: STTEventCallback) {
        self.event_callback = Some(callback);
    }

    /// Perform the authenticated WebSocket handshake.
    async fn open_stream(&self) -> Result<DeepgramStream, STTError> {
        let url = self.config.build_websocket_url()?;

        let mut request = url.as_str().into_client_request().map_err(|e| {
            STTError::ConnectionFailed(format!("Failed to create WebSocket request: {e}"))
        })?;
        let auth = HeaderValue::from_str(&format!("Token {}", self.config.api_key))
            .map_err(|e| STTError::ConfigurationError(format!("Invalid API key header: {e}")))?;
        request.headers_mut().insert(AUTHORIZATION, auth);

        match timeout(CONNECT_TIMEOUT, connect_async(request)).await {
            Ok(Ok((stream, _response))) => Ok(stream),
            Ok(Err(WsError::Http(response))) if response.status().as_u16() == 401 => Err(
                STTError::AuthenticationFailed("Deepgram rejected the API key".to_string()),
            ),
            Ok(Err(e)) => Err(STTError::ConnectionFailed(format!(
                "Failed to connect to Deepgram: {e}"
            ))),
            Err(_) => Err(STTError::ConnectionFailed(
                "Connection timeout waiting for Deepgram handshake".to_string(),
            )),
        }
    }

    /// Debug-log the fields of a forwarded frame. Frames that do not match
    /// the expected shape are still forwarded as received.
    fn log_payload(raw: &str) {
        match DeepgramMessage::parse(raw) {
            Ok(DeepgramMessage::Results(results)) => debug!(
                is_final = results.is_final,
                speech_final = results.speech_final,
                "deepgram: transcript received: {}",
                results.transcript()
            ),
            Ok(DeepgramMessage::Metadata(metadata)) => {
                debug!(request_id = %metadata.request_id, "deepgram: metadata received")
            }
            Ok(DeepgramMessage::UtteranceEnd(utterance_end)) => debug!(
                last_word_end = utterance_end.last_word_end,
                "deepgram: utterance end received"
            ),
            Ok(_) => {}
            Err(e) => debug!("deepgram: forwarding frame with unexpected fields: {}", e),
        }
    }

    /// Map a frame that is not forwarded to the client to an event, if any.
    fn notice_event(raw: &str) -> Option<STTEvent> {
        match DeepgramMessage::parse(raw) {
            Ok(DeepgramMessage::SpeechStarted(started)) => {
                debug!(timestamp = started.timestamp, "deepgram: speech started");
                None
            }
            Ok(DeepgramMessage::Error(err)) => Some(STTEvent::Error(STTError::ProviderError(
                err.text().to_string(),
            ))),
            Ok(DeepgramMessage::Warning(warning)) => Some(STTEvent::Warning(warning.description)),
            Ok(DeepgramMessage::Unknown(message_type)) => {
                debug!("Received unknown Deepgram message type: {}", message_type);
                None
            }
            Ok(_) => None,
            Err(e) => {
                warn!("Failed to parse Deepgram message: {}", e);
                None
            }
        }
    }

    /// Handle one incoming WebSocket message from Deepgram.
    ///
    /// # Returns
    /// * `true` - Continue processing messages
    /// * `false` - Deepgram closed the stream
    pub(crate) async fn handle_websocket_message(
        message: Message,
        event_tx: &mpsc::Sender<STTEvent>,
    ) -> bool {
        match message {
            Message::Text(text) => {
                let raw = text.as_str();
                let event = match DeepgramMessage::message_type(raw).as_deref() {
                    Some("Results") => {
                        Self::log_payload(raw);
                        Some(STTEvent::Transcript(raw.to_string()))
                    }
                    Some("Metadata") => {
                        Self::log_payload(raw);
                        Some(STTEvent::Metadata(raw.to_string()))
                    }
                    Some("UtteranceEnd") => {
                        Self::log_payload(raw);
                        Some(STTEvent::UtteranceEnd(raw.to_string()))
                    }
                    Some(_) => Self::notice_event(raw),
                    None => {
                        warn!("Received Deepgram frame without a message type");
                        None
                    }
                };

                if let Some(event) = event
                    && event_tx.send(event).await.is_err()
                {
                    warn!("Failed to deliver Deepgram event - channel closed");
                }
                true
            }
            Message::Close(close_frame) => {
                info!("Deepgram WebSocket closed: {:?}", close_frame);
                false
            }
            Message::Ping(_) => {
                debug!("Received ping from Deepgram");
                true
            }
            Message::Pong(_) => true,
            Message::Binary(_) => {
                debug!("Received unexpected binary message from Deepgram");
                true
            }
            _ => true,
        }
    }

    /// Main loop of the connection task.
    async fn run_connection(
        ws_stream: DeepgramStream,
        mut audio_rx: mpsc::Receiver<Bytes>,
        mut shutdown_rx: oneshot::Receiver<()>,
        event_tx: mpsc::Sender<STTEvent>,
        is_connected: Arc<AtomicBool>,
        keepalive_interval: Duration,
    ) {
        let (mut ws_sink, mut ws_stream) = ws_stream.split();
        let mut keepalive =
            tokio::time::interval_at(Instant::now() + keepalive_interval, keepalive_interval);

        loop {
            tokio::select! {
                Some(audio_data) = audio_rx.recv() => {
                    let data_len = audio_data.len();
                    if let Err(e) = ws_sink.send(Message::Binary(audio_data)).await {
                        let stt_error = STTError::NetworkError(format!(
                            "Failed to send audio to Deepgram: {e}"
                        ));
                        error!("{}", stt_error);
                        is_connected.store(false, Ordering::Release);
                        let _ = event_tx.send(STTEvent::Error(stt_error)).await;
                        break;
                    }
                    debug!("Sent {} bytes of audio to Deepgram", data_len);
                }

                _ = keepalive.tick() => {
                    debug!("deepgram: keepalive");
                    if let Ok(json) = serde_json::to_string(&KeepAliveMessage::default())
                        && let Err(e) = ws_sink.send(Message::Text(json.into())).await
                    {
                        warn!("Failed to send KeepAlive to Deepgram: {}", e);
                    }
                }

                message = ws_stream.next() => {
                    match message {
                        Some(Ok(msg)) => {
                            if !Self::handle_websocket_message(msg, &event_tx).await {
                                break;
                            }
                        }
                        Some(Err(e)) => {
                            let stt_error = STTError::NetworkError(format!("WebSocket error: {e}"));
                            error!("{}", stt_error);
                            is_connected.store(false, Ordering::Release);
                            let _ = event_tx.send(STTEvent::Error(stt_error)).await;
                            break;
                        }
                        None => {
                            info!("Deepgram WebSocket stream ended");
                            break;
                        }
                    }
                }

                _ = &mut shutdown_rx => {
                    debug!("Received shutdown signal for Deepgram STT");
                    is_connected.store(false, Ordering::Release);

                    if let Ok(json) = serde_json::to_string(&CloseStreamMessage::default()) {
                        let _ = ws_sink.send(Message::Text(json.into())).await;
                    }

                    // Deepgram answers CloseStream with its last results and a Metadata frame
                    let _ = timeout(CLOSE_DRAIN_TIMEOUT, async {
                        while let Some(Ok(msg)) = ws_stream.next().await {
                            if !Self::handle_websocket_message(msg, &event_tx).await {
                                break;
                            }
                        }
                    })
                    .await;

                    let _ = ws_sink.send(Message::Close(None)).await;
                    break;
                }
            }
        }

        is_connected.store(false, Ordering::Release);
        let _ = event_tx.send(STTEvent::Close).await;
        info!("Deepgram STT WebSocket connection closed");
    }
}

impl Drop for DeepgramSTT {
    fn drop(&mut self) {
        if let Some(shutdown_tx) = self.shutdown_tx.take() {
            let _ = shutdown_tx.send(());
        }
    }
}

// =============================================================================
// BaseSTT Trait Implementation
// =============================================================================

#[async_trait::async_trait]
impl BaseSTT for DeepgramSTT {
    async fn connect(&mut self) -> Result<(), STTError> {
        if self.connection_handle.is_some() {
            return Err(STTError::ConnectionFailed(
                "Deepgram connection already started".to_string(),
            ));
        }

        let ws_stream = self.open_stream().await?;
        info!("Connected to Deepgram STT WebSocket");

        let (ws_tx, ws_rx) = mpsc::channel::<Bytes>(AUDIO_CHANNEL_SIZE);
        let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();
        let (event_tx, mut event_rx) = mpsc::channel::<STTEvent>(EVENT_CHANNEL_SIZE);

        // Start event forwarding task before anything is emitted
        let callback = self.event_callback.clone();
        self.event_forward_handle = Some(tokio::spawn(async move {
            while let Some(event) = event_rx.recv().await {
                match callback.as_ref() {
                    Some(callback) => callback(event).await,
                    None => debug!("Deepgram event (no callback): {}", event.name()),
                }
            }
        }));

        let _ = event_tx.send(STTEvent::Open).await;
        self.is_connected.store(true, Ordering::Release);

        self.connection_handle = Some(tokio::spawn(Self::run_connection(
            ws_stream,
            ws_rx,
            shutdown_rx,
            event_tx,
            self.is_connected.clone(),
            self.config.keepalive_interval,
        )));

        self.ws_sender = Some(ws_tx);
        self.shutdown_tx = Some(shutdown_tx);
        Ok(())
    }

    fn is_ready(&self) -> bool {
        self.is_connected.load(Ordering::Acquire) && self.ws_sender.is_some()
    }

    async fn send_audio(&mut self, audio_data: Bytes) -> Result<(), STTError> {
        if !self.is_ready() {
            return Err(STTError::ConnectionFailed(
                "Not connected to Deepgram STT".to_string(),
            ));
        }

        // An empty binary frame is Deepgram's legacy close-stream signal
        if audio_data.is_empty() {
            debug!("Skipping empty audio chunk");
            return Ok(());
        }

        let ws_sender = self.ws_sender.as_ref().ok_or_else(|| {
            STTError::ConnectionFailed("Not connected to Deepgram STT".to_string())
        })?;

        let data_len = audio_data.len();
        ws_sender
            .send(audio_data)
            .await
            .map_err(|e| STTError::NetworkError(format!("Failed to send audio data: {e}")))?;

        debug!("Queued {} bytes of audio for Deepgram", data_len);
        Ok(())
    }

    async fn finish(&mut self) -> Result<(), STTError> {
        self.is_connected.store(false, Ordering::Release);
        self.ws_sender = None;

        if let Some(shutdown_tx) = self.shutdown_tx.take() {
            let _ = shutdown_tx.send(());
        }

        if let Some(mut handle) = self.connection_handle.take()
            && timeout(FINISH_TIMEOUT, &mut handle).await.is_err()
        {
            warn!("Deepgram connection task did not stop in time, aborting");
            handle.abort();
        }

        if let Some(mut handle) = self.event_forward_handle.take()
            && timeout(FINISH_TIMEOUT, &mut handle).await.is_err()
        {
            handle.abort();
        }

        info!("Disconnected from Deepgram STT");
        Ok(())
    }

    fn get_provider_info(&self) -> &'static str {
        "Deepgram Live Streaming STT"
    }
}

// =============================================================================
// Connector
// =============================================================================

/// Opens one [`DeepgramSTT`] connection per transcription session.
#[derive(Debug, Clone)]
pub struct DeepgramConnector {
    config: DeepgramSTTConfig,
}

impl DeepgramConnector {
    pub fn new(config: DeepgramSTTConfig) -> Self {
        Self { config }
    }
}

#[async_trait::async_trait]
impl STTConnector for DeepgramConnector {
    async fn open(&self, on_event: STTEventCallback) -> Result<Box<dyn BaseSTT>, STTError> {
        let mut stt = DeepgramSTT::new(self.config.clone())?;
        stt.on_event(on_event);
        stt.connect().await?;
        Ok(Box::new(stt))
    }
}
