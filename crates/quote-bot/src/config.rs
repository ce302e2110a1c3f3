//! Configuration for the quote bot.

use std::env;
use std::path::{Path, PathBuf};

use quote_store::Database;

use crate::error::BotError;

/// Default number of users listed per ranking in `/stats`.
pub const DEFAULT_STATS_LIMIT: i64 = 5;

/// Configuration for [`QuoteBot`](crate::QuoteBot).
#[derive(Debug, Clone)]
pub struct QuoteBotConfig {
    /// SQLite URL for the quote database.
    pub sqlite_url: String,
    /// Connection pool size.
    pub pool_size: u32,
    /// The bot's own handle, stripped from `/command@handle`.
    pub bot_username: Option<String>,
    /// The bot's own user id; its messages cannot be quoted.
    pub bot_user_id: Option<i64>,
    /// Number of users listed per ranking in `/stats`.
    pub stats_limit: i64,
}

impl QuoteBotConfig {
    /// Create a new config from a SQLite path or URL.
    pub fn from_sqlite_path(path: impl Into<String>) -> Self {
        let sqlite_path = path.into();
        Self {
            sqlite_url: sqlite_url_from_path(&sqlite_path),
            pool_size: Database::DEFAULT_POOL_SIZE,
            bot_username: None,
            bot_user_id: None,
            stats_limit: DEFAULT_STATS_LIMIT,
        }
    }

    /// Set the bot identity.
    pub fn with_identity(mut self, user_id: i64, username: impl Into<String>) -> Self {
        self.bot_user_id = Some(user_id);
        self.bot_username = Some(username.into());
        self
    }

    /// Load configuration from environment variables.
    ///
    /// Optional env vars:
    /// - `QUOTE_BOT_SQLITE_PATH` (path or sqlite URL, default: ./data/quotes.db)
    /// - `QUOTE_BOT_POOL_SIZE` (default: 20)
    /// - `QUOTE_BOT_USERNAME`
    /// - `QUOTE_BOT_USER_ID`
    /// - `QUOTE_BOT_STATS_LIMIT` (default: 5)
    pub fn from_env() -> Result<Self, BotError> {
        let sqlite_path = env::var("QUOTE_BOT_SQLITE_PATH")
            .unwrap_or_else(|_| "./data/quotes.db".to_string());

        let mut config = Self::from_sqlite_path(sqlite_path);

        if let Some(size) = parse_var::<u32>("QUOTE_BOT_POOL_SIZE")? {
            if size == 0 {
                return Err(BotError::Config(
                    "QUOTE_BOT_POOL_SIZE must be at least 1".to_string(),
                ));
            }
            config.pool_size = size;
        }
        if let Some(limit) = parse_var::<i64>("QUOTE_BOT_STATS_LIMIT")? {
            config.stats_limit = limit;
        }
        config.bot_user_id = parse_var::<i64>("QUOTE_BOT_USER_ID")?;
        config.bot_username = env::var("QUOTE_BOT_USERNAME")
            .ok()
            .map(|name| name.trim().trim_start_matches('@').to_string())
            .filter(|name| !name.is_empty());

        Ok(config)
    }

    /// Directory holding the database file, when the URL names one.
    pub fn database_dir(&self) -> Option<PathBuf> {
        let rest = self.sqlite_url.strip_prefix("sqlite:")?;
        let rest = rest.strip_prefix("//").unwrap_or(rest);
        let path = rest.split('?').next().unwrap_or(rest);
        if path.is_empty() || path == ":memory:" {
            return None;
        }
        Path::new(path)
            .parent()
            .filter(|dir| !dir.as_os_str().is_empty())
            .map(Path::to_path_buf)
    }
}

fn parse_var<T: std::str::FromStr>(name: &str) -> Result<Option<T>, BotError> {
    match env::var(name) {
        Ok(value) => value
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| BotError::Config(format!("{} is not a valid number: {:?}", name, value))),
        Err(_) => Ok(None),
    }
}

fn sqlite_url_from_path(path: &str) -> String {
    if path.starts_with("sqlite:") {
        path.to_string()
    } else {
        format!("sqlite:{}?mode=rwc", path)
    }
}
