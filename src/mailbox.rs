//! Per-session outbound mailbox
//!
//! A bounded queue that never blocks the producer. When full, the oldest
//! pending line is overwritten and the consumer is told how many it missed.
//! Built on a single-receiver `tokio::sync::broadcast` channel, which has
//! exactly these overflow semantics.

use tokio::sync::broadcast;
use tokio::sync::broadcast::error::RecvError;
use tracing::warn;

use crate::error::SendError;

/// Create a mailbox holding at most `capacity` pending lines
///
/// # Panics
/// Panics if `capacity` is zero; `RelayConfig::validate` rejects that.
pub fn mailbox(capacity: usize) -> (Outbox, Inbox) {
    let (sender, receiver) = broadcast::channel(capacity);
    (
        Outbox { sender },
        Inbox {
            receiver,
            dropped: 0,
        },
    )
}

/// Producer side, held by the relay
#[derive(Debug, Clone)]
pub struct Outbox {
    sender: broadcast::Sender<String>,
}

impl Outbox {
    /// Queue a line without waiting
    ///
    /// Fails only when the `Inbox` has been dropped (the session is gone).
    pub fn push(&self, line: String) -> Result<(), SendError> {
        self.sender
            .send(line)
            .map(|_| ())
            .map_err(|_| SendError::ChannelClosed)
    }
}

/// Consumer side, owned by the session's outbound loop
#[derive(Debug)]
pub struct Inbox {
    receiver: broadcast::Receiver<String>,
    dropped: u64,
}

impl Inbox {
    /// Wait for the next line
    ///
    /// Returns `None` once the `Outbox` is dropped and the queue is drained.
    pub async fn recv(&mut self) -> Option<String> {
        loop {
            match self.receiver.recv().await {
                Ok(line) => return Some(line),
                Err(RecvError::Lagged(n)) => {
                    self.dropped += n;
                    warn!("Outbound mailbox full, dropped {} oldest line(s)", n);
                }
                Err(RecvError::Closed) => return None,
            }
        }
    }

    /// Total lines lost to overflow so far
    pub fn dropped(&self) -> u64 {
        self.dropped
    }
}
