//! Active session: one authenticated client and its two loops
//!
//! The inbound loop reads lines from the transport and submits them to the
//! relay as `"<name>: <line>"`. The outbound loop drains the session's
//! mailbox onto the transport. Either loop ending trips the shared
//! [`ClosedFlag`], which wakes the other.

use std::sync::Arc;

use tokio::io::{AsyncRead, AsyncWrite};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};

use crate::connection::{Connection, LineReader, LineWriter};
use crate::mailbox::Inbox;
use crate::relay::RelayHandle;
use crate::types::{SessionId, SessionState};

/// Monotonic closed flag shared by a session's loops
///
/// Once closed it stays closed.
#[derive(Debug, Clone, Default)]
pub struct ClosedFlag(CancellationToken);

impl ClosedFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn close(&self) {
        self.0.cancel();
    }

    pub fn is_closed(&self) -> bool {
        self.0.is_cancelled()
    }

    /// Resolves once the flag is closed
    pub async fn closed(&self) {
        self.0.cancelled().await
    }
}

/// Format a line the way every member sees it
pub fn format_line(name: &str, line: &str) -> String {
    format!("{}: {}", name, line)
}

/// An authenticated, registered client
pub struct Session<S> {
    id: SessionId,
    name: Arc<str>,
    connection: Connection<S>,
    inbox: Inbox,
    relay: RelayHandle,
    closed: ClosedFlag,
}

impl<S> Session<S>
where
    S: AsyncRead + AsyncWrite + Send + 'static,
{
    /// Build a session; the caller must already have registered it with the relay
    pub fn new(
        id: SessionId,
        name: String,
        connection: Connection<S>,
        inbox: Inbox,
        relay: RelayHandle,
    ) -> Self {
        Self {
            id,
            name: Arc::from(name),
            connection,
            inbox,
            relay,
            closed: ClosedFlag::new(),
        }
    }

    pub fn id(&self) -> SessionId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// A handle on this session's closed flag
    pub fn closed_flag(&self) -> ClosedFlag {
        self.closed.clone()
    }

    /// Run both loops until the session closes, then deregister
    pub async fn run(self) {
        let Session {
            id,
            name,
            connection,
            inbox,
            relay,
            closed,
        } = self;

        debug!("Session {} is {}", id, SessionState::Active);

        let (reader, writer) = connection.into_split();

        let mut read_task = tokio::spawn(inbound_loop(
            name.clone(),
            reader,
            relay.clone(),
            closed.clone(),
        ));
        let mut write_task = tokio::spawn(outbound_loop(id, writer, inbox, closed.clone()));

        // Whichever loop ends first closes the session.
        let read_first = tokio::select! {
            result = &mut read_task => {
                if let Err(e) = result {
                    error!("Inbound task for {} failed: {}", id, e);
                }
                true
            }
            result = &mut write_task => {
                if let Err(e) = result {
                    error!("Outbound task for {} failed: {}", id, e);
                }
                false
            }
        };

        // A panicked loop never reached its own close().
        closed.close();
        debug!("Session {} is {}", id, SessionState::Closed);

        let _ = relay.deregister(id).await;

        let remaining = if read_first { write_task } else { read_task };
        if let Err(e) = remaining.await {
            error!("Session task for {} failed: {}", id, e);
        }
        info!("Session {} ('{}') closed", id, name);
    }
}

/// Transport -> relay
async fn inbound_loop<S: AsyncRead>(
    name: Arc<str>,
    mut reader: LineReader<S>,
    relay: RelayHandle,
    closed: ClosedFlag,
) {
    loop {
        let result = tokio::select! {
            _ = closed.closed() => break,
            result = reader.read_line() => result,
        };

        match result {
            Ok(Some(line)) => {
                if closed.is_closed() {
                    break;
                }
                if relay.submit(format_line(&name, &line)).await.is_err() {
                    debug!("Relay closed, ending inbound loop for '{}'", name);
                    break;
                }
            }
            Ok(None) => {
                info!("'{}' closed the connection", name);
                break;
            }
            Err(e) => {
                debug!("Read error for '{}': {}", name, e);
                break;
            }
        }
    }

    closed.close();
    debug!("Inbound loop ended for '{}'", name);
}

/// Mailbox -> transport
async fn outbound_loop<S: AsyncWrite>(
    id: SessionId,
    mut writer: LineWriter<S>,
    mut inbox: Inbox,
    closed: ClosedFlag,
) {
    loop {
        let line = tokio::select! {
            biased;
            _ = closed.closed() => break,
            line = inbox.recv() => line,
        };

        // None: the relay dropped us
        let Some(line) = line else { break };

        if closed.is_closed() {
            break;
        }

        let result = tokio::select! {
            biased;
            _ = closed.closed() => break,
            result = writer.write_line(&line) => result,
        };
        if let Err(e) = result {
            debug!("Write error for {}: {}", id, e);
            break;
        }
    }

    // Dropping the writer discards anything a cancelled write left buffered;
    // flushing it could wait forever on a peer that stopped reading.
    closed.close();
    drop(writer);
    debug!("Outbound loop ended for {}", id);
}
