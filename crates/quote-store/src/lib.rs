//! SQLite persistence layer for archived chat quotes.
//!
//! This crate stores users, chats, chat membership and quotes, and the
//! per-user browsing state used by private-chat sessions. Both live in the
//! same SQLite database and share one connection pool.
//!
//! # Example
//!
//! ```no_run
//! use quote_store::{chat, quote, user, Chat, ChatKind, Database, InsertOutcome, NewQuote, User};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // Connect and make sure the schema exists
//!     let db = Database::connect("sqlite:quotes.db?mode=rwc").await?;
//!     db.migrate().await?;
//!
//!     user::upsert_user(db.pool(), &User::new(1, "Alice")).await?;
//!     user::upsert_user(db.pool(), &User::new(2, "Bob")).await?;
//!     chat::upsert_chat(db.pool(), &Chat::new(-100, ChatKind::Group, Some("Friends"))).await?;
//!
//!     let outcome = quote::insert_quote(
//!         db.pool(),
//!         &NewQuote {
//!             chat_id: -100,
//!             message_id: 42,
//!             sent_at: 1_500_000_000,
//!             sent_by: 1,
//!             content: "Nice quote here".to_string(),
//!             spans: Vec::new(),
//!             quoted_by: Some(2),
//!         },
//!     )
//!     .await?;
//!     assert_eq!(outcome, InsertOutcome::Added);
//!
//!     Ok(())
//! }
//! ```

pub mod chat;
pub mod error;
pub mod markup;
pub mod membership;
pub mod models;
pub mod quote;
pub mod ranking;
pub mod state;
pub mod user;

pub use error::{DatabaseError, Result};
pub use markup::{rewrite_entities, MarkupSpan, SpanStyle};
pub use models::{
    BrowsingState, Chat, ChatChoice, ChatKind, ChatSummary, InsertOutcome, NewQuote, Quote,
    QuoteWithAuthor, RankedUser, User,
};

use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;
use std::str::FromStr;

/// Database connection wrapper.
///
/// Opened once at startup and shared by every request handler; cloning is
/// cheap and clones share the same pool.
#[derive(Debug, Clone)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Default pool size for database connections.
    pub const DEFAULT_POOL_SIZE: u32 = 20;

    /// Connect to a SQLite database.
    ///
    /// The URL should be in the format `sqlite:path/to/db.sqlite?mode=rwc`.
    ///
    /// # Example
    ///
    /// ```no_run
    /// # async fn example() -> quote_store::Result<()> {
    /// // File database
    /// let db = quote_store::Database::connect("sqlite:data/quotes.db?mode=rwc").await?;
    ///
    /// // In-memory database (for testing)
    /// let db = quote_store::Database::connect("sqlite::memory:").await?;
    /// # Ok(())
    /// # }
    /// ```
    pub async fn connect(url: &str) -> Result<Self> {
        Self::connect_with_pool_size(url, Self::DEFAULT_POOL_SIZE).await
    }

    /// Connect to a SQLite database with a custom pool size.
    pub async fn connect_with_pool_size(url: &str, pool_size: u32) -> Result<Self> {
        let options = SqliteConnectOptions::from_str(url)?
            .create_if_missing(true)
            .foreign_keys(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(pool_size)
            .acquire_timeout(std::time::Duration::from_secs(30))
            .connect_with(options)
            .await?;

        tracing::info!(
            "Connected to quote database: {} (pool size: {})",
            url,
            pool_size
        );

        Ok(Self { pool })
    }

    /// Create any missing tables and indexes.
    ///
    /// Idempotent. Call once after connecting, before serving requests.
    pub async fn migrate(&self) -> Result<()> {
        tracing::info!("Ensuring quote database schema...");

        sqlx::migrate!("./migrations").run(&self.pool).await?;

        tracing::info!("Schema ready");
        Ok(())
    }

    /// Get a reference to the connection pool.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Close the database connection pool.
    pub async fn close(&self) {
        self.pool.close().await;
    }
}
