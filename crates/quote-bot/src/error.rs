//! Error types for quote bot operations.

use quote_store::DatabaseError;
use thiserror::Error;

/// Errors that can occur while handling an event.
///
/// User mistakes (bad chat number, unknown author, ...) are answered with a
/// reply and never surface here.
#[derive(Debug, Error)]
pub enum BotError {
    /// Storage failed.
    #[error("storage error: {0}")]
    Database(#[from] DatabaseError),

    /// Invalid configuration.
    #[error("invalid configuration: {0}")]
    Config(String),

    /// Reading events or writing replies failed.
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    /// An inbound event could not be decoded.
    #[error("invalid event: {0}")]
    InvalidEvent(String),
}
