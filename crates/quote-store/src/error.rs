//! Database error types.

use thiserror::Error;

/// Errors that can occur during database operations.
///
/// Logical outcomes such as a missing quote or a duplicate archival key are
/// returned as values, never through this type.
#[derive(Debug, Error)]
pub enum DatabaseError {
    /// SQLx error (connection, query, etc.)
    #[error("database error: {0}")]
    Sqlx(#[from] sqlx::Error),

    /// Migration error
    #[error("migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    /// Browsing state payload could not be encoded.
    #[error("state encoding error: {0}")]
    Json(#[from] serde_json::Error),

    /// A stored browsing state row could not be decoded.
    #[error("corrupt browsing state for user {user_id}: {reason}")]
    CorruptState { user_id: i64, reason: String },
}

/// Result type for database operations.
pub type Result<T> = std::result::Result<T, DatabaseError>;
