//! Error types for the chat relay
//!
//! Defines connection-level errors and channel send errors.
//! Uses thiserror for ergonomic error definitions.

use thiserror::Error;
use tokio_util::codec::LinesCodecError;

/// Relay errors
///
/// Everything here is local to one connection except `InvalidConfig`,
/// which is raised before the server starts.
#[derive(Debug, Error)]
pub enum RelayError {
    /// IO error (fatal for the connection)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Line framing error, including over-long lines
    #[error("Line codec error: {0}")]
    Codec(#[from] LinesCodecError),

    /// Channel send error (fatal - relay actor is gone)
    #[error("Channel send error")]
    ChannelClosed,

    /// Rejected configuration value
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

impl From<SendError> for RelayError {
    fn from(_: SendError) -> Self {
        RelayError::ChannelClosed
    }
}

/// Message send errors
///
/// Occurs when attempting to send messages through closed channels.
#[derive(Debug, Error)]
pub enum SendError {
    /// The receiving end of the channel has been closed
    #[error("Channel closed")]
    ChannelClosed,
}
