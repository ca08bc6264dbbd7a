use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use bytes::Bytes;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use super::client::ClientChannel;
use crate::core::stt::{BaseSTT, STTConnector, STTError, STTEvent, STTEventCallback};

/// What happened to an audio chunk handed to [`TranscriptionSession::forward_audio`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ForwardOutcome {
    /// Delivered to the active speech-service connection
    Forwarded,
    /// Dropped; the connection was replaced
    Dropped,
}

/// One client's relay to the speech service.
///
/// Holds at most one speech-service connection. When a chunk cannot be
/// delivered the connection is closed and a new one opened before the next
/// chunk arrives. The failed chunk is not retried.
pub struct TranscriptionSession {
    id: Uuid,
    connector: Arc<dyn STTConnector>,
    client: ClientChannel,
    connection: Option<Box<dyn BaseSTT>>,
}

impl TranscriptionSession {
    pub fn new(connector: Arc<dyn STTConnector>, client: ClientChannel) -> Self {
        Self {
            id: Uuid::new_v4(),
            connector,
            client,
            connection: None,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn has_connection(&self) -> bool {
        self.connection.is_some()
    }

    /// Open the initial connection. A failure is logged and the session
    /// continues without one.
    pub async fn start(&mut self) {
        self.connection = self.open_connection().await;
    }

    pub async fn forward_audio(&mut self, chunk: Bytes) -> ForwardOutcome {
        let result = match self.connection.as_mut() {
            Some(connection) => connection.send_audio(chunk).await,
            None => Err(STTError::ConnectionFailed(
                "no active speech connection".to_string(),
            )),
        };

        match result {
            Ok(()) => ForwardOutcome::Forwarded,
            Err(e) => {
                warn!(session_id = %self.id, "Audio chunk dropped: {}", e);
                self.replace_connection().await;
                ForwardOutcome::Dropped
            }
        }
    }

    /// Stop delivering events to the client and close the connection, if any.
    pub async fn close(&mut self) {
        self.client.close();
        if let Some(mut connection) = self.connection.take() {
            if let Err(e) = connection.finish().await {
                warn!(session_id = %self.id, "Error closing speech connection: {}", e);
            }
            info!(session_id = %self.id, "Speech connection closed");
        }
    }

    async fn replace_connection(&mut self) {
        if let Some(mut stale) = self.connection.take()
            && let Err(e) = stale.finish().await
        {
            debug!(session_id = %self.id, "Stale connection close failed: {}", e);
        }
        self.connection = self.open_connection().await;
    }

    async fn open_connection(&self) -> Option<Box<dyn BaseSTT>> {
        match self.connector.open(self.event_callback()).await {
            Ok(connection) => {
                info!(
                    session_id = %self.id,
                    provider = connection.get_provider_info(),
                    "Speech connection opened"
                );
                Some(connection)
            }
            Err(e) => {
                error!(session_id = %self.id, "Failed to open speech connection: {}", e);
                None
            }
        }
    }

    fn event_callback(&self) -> STTEventCallback {
        let id = self.id;
        let client = self.client.clone();
        Arc::new(move |event: STTEvent| {
            let client = client.clone();
            Box::pin(async move { dispatch_event(id, &client, event).await })
                as Pin<Box<dyn Future<Output = ()> + Send>>
        })
    }
}

/// Route one speech-service event: payload events go to the client, the rest are logged.
pub async fn dispatch_event(session_id: Uuid, client: &ClientChannel, event: STTEvent) {
    if let Some(payload) = event.client_payload() {
        if !client.send_text(payload.to_owned()).await {
            debug!(%session_id, event = event.name(), "Client closed, event discarded");
        }
        return;
    }

    match event {
        STTEvent::Open => info!(%session_id, "Speech connection ready"),
        STTEvent::Warning(message) => warn!(%session_id, "Speech service warning: {}", message),
        STTEvent::Error(e) => error!(%session_id, "Speech service error: {}", e),
        STTEvent::Close => info!(%session_id, "Speech connection closed by provider"),
        _ => {}
    }
}
