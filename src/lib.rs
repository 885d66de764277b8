//! Multi-client Line Chat Relay Library
//!
//! A small TCP chat relay built on tokio. Clients authenticate with a shared
//! passphrase, pick a display name, and from then on every line they send is
//! broadcast as `"<name>: <line>"` to every connected client, sender included.
//!
//! # Protocol
//! ```text
//! S -> C: Say my name...
//! C -> S: <passphrase>          (wrong passphrase: connection closed)
//! S -> C: And what's yours?
//! C -> S: <display name>
//! C -> S: <line>                (repeatable)
//! S -> *: <display name>: <line>
//! ```
//!
//! # Architecture
//! Uses the Actor pattern with `mpsc` channels:
//! - `Relay` is the central actor owning the membership set; its run loop is the broadcast loop
//! - Each connection runs the handshake, then a `Session` with an inbound and an outbound task
//! - Each session has a bounded drop-oldest mailbox so a slow client never stalls the relay
//!
//! # Example
//! ```ignore
//! use std::sync::Arc;
//! use tokio::net::TcpListener;
//! use chat_relay::{Acceptor, Relay, RelayConfig, SharedSecret};
//!
//! #[tokio::main]
//! async fn main() {
//!     let config = RelayConfig::default();
//!     let listener = TcpListener::bind(config.bind_address).await.unwrap();
//!     let (relay, handle) = Relay::new(&config.server_name, config.inbound_capacity);
//!     tokio::spawn(relay.run());
//!
//!     let auth = Arc::new(SharedSecret::new(config.passphrase.clone()));
//!     Acceptor::new(handle, auth, config).serve(listener).await;
//! }
//! ```

pub mod acceptor;
pub mod auth;
pub mod config;
pub mod connection;
pub mod error;
pub mod mailbox;
pub mod relay;
pub mod session;
pub mod types;

// Re-export main types for convenience
pub use acceptor::{handshake, Acceptor, Handshake, NAME_PROMPT, PASSPHRASE_PROMPT};
pub use auth::{Authenticator, SharedSecret};
pub use config::RelayConfig;
pub use connection::Connection;
pub use error::{RelayError, SendError};
pub use mailbox::{mailbox, Inbox, Outbox};
pub use relay::{Member, Relay, RelayCommand, RelayHandle};
pub use session::{format_line, ClosedFlag, Session};
pub use types::{SessionId, SessionState};
