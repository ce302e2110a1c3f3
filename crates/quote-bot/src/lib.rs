//! Command handling for the quote archive bot.
//!
//! [`QuoteBot::handle`] takes one [`InboundEvent`] and returns at most one
//! [`Reply`]. Group chats archive and query quotes directly. Private chats
//! first pick a group through the [`ChatBrowser`] and then query it.
//!
//! Delivering replies is left to the caller; the `quote-bot` binary reads
//! events as JSON lines on stdin and writes replies as JSON lines on stdout.

pub mod browsing;
pub mod command;
pub mod config;
pub mod console;
pub mod dispatcher;
pub mod error;
pub mod event;
pub mod formatting;

pub use browsing::{BrowsingInput, ChatBrowser, Resolution, SessionReply};
pub use command::{parse_command, Command};
pub use config::QuoteBotConfig;
pub use console::{serve, ServeSummary};
pub use dispatcher::QuoteBot;
pub use error::BotError;
pub use event::{EventChat, EventUser, InboundEvent, Reply};

pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
