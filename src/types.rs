//! Basic type definitions for the chat relay
//!
//! Provides:
//! - `SessionId`: UUID-based unique session identifier
//! - `SessionState`: the handshake/lifecycle state of one connection

use uuid::Uuid;

/// Unique session identifier (newtype pattern)
///
/// Display names are not unique, so the relay keys its membership set
/// on this instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SessionId(pub Uuid);

impl SessionId {
    /// Create a new random session ID
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Lifecycle of a single connection
///
/// `Connecting → AwaitingPassphrase → AwaitingName → Active → Closed`.
/// A wrong passphrase jumps straight to `Closed`. The handshake steps
/// through these until it reaches `Active` or `Closed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Connecting,
    AwaitingPassphrase,
    AwaitingName,
    Active,
    Closed,
}

impl std::fmt::Display for SessionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            SessionState::Connecting => "connecting",
            SessionState::AwaitingPassphrase => "awaiting-passphrase",
            SessionState::AwaitingName => "awaiting-name",
            SessionState::Active => "active",
            SessionState::Closed => "closed",
        };
        f.write_str(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_id_unique() {
        let id1 = SessionId::new();
        let id2 = SessionId::new();
        assert_ne!(id1, id2);
    }

    #[test]
    fn test_session_state_display() {
        assert_eq!(SessionState::AwaitingPassphrase.to_string(), "awaiting-passphrase");
        assert_eq!(SessionState::Closed.to_string(), "closed");
    }
}
