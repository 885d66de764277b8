//! Connection acceptor
//!
//! Accepts TCP connections, runs the handshake on each one in its own task,
//! and hands authenticated connections over to a [`Session`].

use std::net::SocketAddr;
use std::sync::Arc;

use tokio::io::{AsyncRead, AsyncWrite};
use tokio::net::TcpListener;
use tracing::{debug, error, info};

use crate::auth::Authenticator;
use crate::config::RelayConfig;
use crate::connection::Connection;
use crate::error::RelayError;
use crate::mailbox::mailbox;
use crate::relay::{Member, RelayHandle};
use crate::session::Session;
use crate::types::{SessionId, SessionState};

/// First prompt, answered with the passphrase
pub const PASSPHRASE_PROMPT: &str = "Say my name...";

/// Second prompt, answered with the display name
pub const NAME_PROMPT: &str = "And what's yours?";

/// How a handshake ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Handshake {
    /// Passphrase accepted; carries the trimmed display name
    Accepted { name: String },
    /// Wrong passphrase
    Rejected,
    /// Client hung up before finishing
    Disconnected,
}

/// Run the passphrase/name exchange on a fresh connection
///
/// Walks `SessionState` from `Connecting` until it reaches `Active` or
/// `Closed`. Nothing is written after a wrong passphrase. The name is used
/// verbatim after trimming, empty or not, with no length limit.
pub async fn handshake<S>(
    conn: &mut Connection<S>,
    auth: &dyn Authenticator,
) -> Result<Handshake, RelayError>
where
    S: AsyncRead + AsyncWrite,
{
    let mut state = SessionState::Connecting;
    let mut name = String::new();

    loop {
        debug!("Handshake {}", state);

        state = match state {
            SessionState::Connecting => {
                conn.write_line(PASSPHRASE_PROMPT).await?;
                SessionState::AwaitingPassphrase
            }
            SessionState::AwaitingPassphrase => match conn.read_line().await? {
                Some(passphrase) if auth.verify(passphrase.trim()) => {
                    conn.write_line(NAME_PROMPT).await?;
                    SessionState::AwaitingName
                }
                Some(_) => SessionState::Closed,
                None => return Ok(Handshake::Disconnected),
            },
            SessionState::AwaitingName => match conn.read_line().await? {
                Some(line) => {
                    name = line.trim().to_string();
                    SessionState::Active
                }
                None => return Ok(Handshake::Disconnected),
            },
            SessionState::Active => return Ok(Handshake::Accepted { name }),
            SessionState::Closed => return Ok(Handshake::Rejected),
        };
    }
}

/// Per-connection setup shared by every accepted stream
#[derive(Clone)]
pub struct Acceptor {
    relay: RelayHandle,
    auth: Arc<dyn Authenticator>,
    config: Arc<RelayConfig>,
}

impl Acceptor {
    pub fn new(relay: RelayHandle, auth: Arc<dyn Authenticator>, config: RelayConfig) -> Self {
        Self {
            relay,
            auth,
            config: Arc::new(config),
        }
    }

    /// Accept connections forever
    ///
    /// A failed accept is logged and the loop keeps going.
    pub async fn serve(self, listener: TcpListener) {
        loop {
            match listener.accept().await {
                Ok((stream, addr)) => {
                    info!("Accepting connection from {}", addr);
                    let acceptor = self.clone();

                    tokio::spawn(async move {
                        if let Err(e) = acceptor.handle_connection(stream, addr).await {
                            error!("Connection handler error for {}: {}", addr, e);
                        }
                    });
                }
                Err(e) => {
                    error!("Failed to accept connection: {}", e);
                }
            }
        }
    }

    /// Handle one connection from handshake to session close
    pub async fn handle_connection<S>(&self, stream: S, peer: SocketAddr) -> Result<(), RelayError>
    where
        S: AsyncRead + AsyncWrite + Send + 'static,
    {
        let mut conn = Connection::new(stream);

        let name = match handshake(&mut conn, self.auth.as_ref()).await? {
            Handshake::Accepted { name } => name,
            Handshake::Rejected => {
                info!("Rejected {}: wrong passphrase", peer);
                let _ = conn.shutdown().await;
                return Ok(());
            }
            Handshake::Disconnected => {
                debug!("{} disconnected during handshake", peer);
                return Ok(());
            }
        };

        // Only broadcast lines are capped.
        conn.set_max_line_length(self.config.max_line_length);

        let id = SessionId::new();
        let (outbox, inbox) = mailbox(self.config.outbound_capacity);

        if let Err(e) = self
            .relay
            .register(Member::new(id, name.clone(), outbox))
            .await
        {
            error!("Failed to register session {} - relay closed", id);
            return Err(e.into());
        }
        info!("'{}' joined from {} as session {}", name, peer, id);

        Session::new(id, name, conn, inbox, self.relay.clone())
            .run()
            .await;

        Ok(())
    }
}
