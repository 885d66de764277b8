//! Passphrase authentication
//!
//! The handshake only ever asks one question: is this the shared secret?
//! `Authenticator` keeps that question pluggable.

/// Decides whether a passphrase admits a connection
pub trait Authenticator: Send + Sync {
    /// Returns true if `passphrase` is accepted. Callers pass it already trimmed.
    fn verify(&self, passphrase: &str) -> bool;
}

/// A single static secret, compared exactly (case-sensitive)
#[derive(Debug, Clone)]
pub struct SharedSecret(String);

impl SharedSecret {
    pub fn new(secret: impl Into<String>) -> Self {
        Self(secret.into())
    }
}

impl Authenticator for SharedSecret {
    fn verify(&self, passphrase: &str) -> bool {
        self.0 == passphrase
    }
}
