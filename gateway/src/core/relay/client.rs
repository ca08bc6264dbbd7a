use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use tokio::sync::mpsc;

/// Frames queued for the client WebSocket writer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClientFrame {
    Text(String),
    Close,
}

/// Sending half of a client connection, shared with speech-service callbacks.
///
/// Once closed, text frames are discarded both here and on the receiving
/// side, so a frame that was already queued when the client went away is
/// never written.
#[derive(Debug, Clone)]
pub struct ClientChannel {
    tx: mpsc::Sender<ClientFrame>,
    open: Arc<AtomicBool>,
}

/// Receiving half, drained by the WebSocket writer task.
#[derive(Debug)]
pub struct ClientFrames {
    rx: mpsc::Receiver<ClientFrame>,
    open: Arc<AtomicBool>,
}

impl ClientChannel {
    pub fn new(buffer: usize) -> (Self, ClientFrames) {
        let (tx, rx) = mpsc::channel(buffer);
        let open = Arc::new(AtomicBool::new(true));
        (
            Self {
                tx,
                open: open.clone(),
            },
            ClientFrames { rx, open },
        )
    }

    pub fn is_open(&self) -> bool {
        self.open.load(Ordering::Acquire)
    }

    /// Mark the client as gone. Pending and future text frames are dropped.
    pub fn close(&self) {
        self.open.store(false, Ordering::Release);
    }

    /// Close the channel and ask the writer to send a close frame.
    pub async fn shutdown(&self) {
        self.close();
        let _ = self.tx.send(ClientFrame::Close).await;
    }

    /// Queue a text frame. Returns `false` when the client is no longer open.
    pub async fn send_text(&self, text: impl Into<String>) -> bool {
        if !self.is_open() {
            return false;
        }
        if self.tx.send(ClientFrame::Text(text.into())).await.is_err() {
            self.close();
            return false;
        }
        true
    }
}

impl ClientFrames {
    /// Next frame to write, skipping text queued before the client closed.
    pub async fn next(&mut self) -> Option<ClientFrame> {
        loop {
            match self.rx.recv().await? {
                ClientFrame::Text(_) if !self.open.load(Ordering::Acquire) => continue,
                frame => return Some(frame),
            }
        }
    }
}
