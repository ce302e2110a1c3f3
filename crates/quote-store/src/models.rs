//! Database models.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::markup::MarkupSpan;

/// A chat platform user, identified by the platform-assigned id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct User {
    /// Platform user id.
    pub id: i64,
    /// First name (always present on the platform).
    pub first_name: String,
    /// Last name, empty when the user has none.
    #[serde(default)]
    pub last_name: String,
    /// Handle without the leading `@`, empty when the user has none.
    #[serde(default)]
    pub username: String,
}

impl User {
    /// Create a user with only a first name.
    pub fn new(id: i64, first_name: impl Into<String>) -> Self {
        Self {
            id,
            first_name: first_name.into(),
            last_name: String::new(),
            username: String::new(),
        }
    }

    /// First and last name joined by a space.
    pub fn full_name(&self) -> String {
        if self.last_name.is_empty() {
            self.first_name.clone()
        } else {
            format!("{} {}", self.first_name, self.last_name)
        }
    }
}

/// Kind of chat an event was observed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(rename_all = "lowercase")]
pub enum ChatKind {
    /// One-to-one conversation with the bot.
    Private,
    /// Basic group.
    Group,
    /// Supergroup.
    Supergroup,
    /// Broadcast channel.
    Channel,
}

impl ChatKind {
    /// Whether this is a one-to-one conversation with the bot.
    pub fn is_private(self) -> bool {
        matches!(self, Self::Private)
    }
}

/// A group conversation whose quotes can be archived.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Chat {
    /// Platform chat id.
    pub id: i64,
    /// Chat kind.
    pub kind: ChatKind,
    /// Chat title, if the platform supplied one.
    pub title: Option<String>,
    /// Public handle, if any.
    pub username: Option<String>,
}

impl Chat {
    /// Create a chat without a handle.
    pub fn new(id: i64, kind: ChatKind, title: Option<&str>) -> Self {
        Self {
            id,
            kind,
            title: title.map(str::to_string),
            username: None,
        }
    }
}

/// An archived message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Quote {
    /// Auto-incrementing ID.
    pub id: i64,
    /// Chat the message was sent in.
    pub chat_id: i64,
    /// Platform message id, unique within the chat.
    pub message_id: i64,
    /// Send time of the original message (seconds since epoch).
    pub sent_at: i64,
    /// Original author.
    pub sent_by: i64,
    /// Markup-rewritten message text.
    pub content: String,
    /// User who archived the message.
    pub quoted_by: Option<i64>,
}

/// A quote together with its author.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuoteWithAuthor {
    /// The quote.
    pub quote: Quote,
    /// The user who wrote it.
    pub author: User,
}

/// Input for archiving a message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewQuote {
    /// Chat the message was sent in.
    pub chat_id: i64,
    /// Platform message id.
    pub message_id: i64,
    /// Send time (seconds since epoch).
    pub sent_at: i64,
    /// Original author.
    pub sent_by: i64,
    /// Raw message text.
    pub content: String,
    /// Formatting spans over `content`.
    pub spans: Vec<MarkupSpan>,
    /// User archiving the message.
    pub quoted_by: Option<i64>,
}

/// Result of an archival attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum InsertOutcome {
    /// A new quote row was written.
    Added,
    /// The (chat, message) pair was already archived; nothing was written.
    AlreadyExists,
}

/// A user ranked by number of quotes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct RankedUser {
    /// Number of quotes.
    pub count: i64,
    /// Full name of the user.
    pub display_name: String,
}

/// A chat a user has been seen in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct ChatSummary {
    /// Platform chat id.
    pub chat_id: i64,
    /// Chat title, empty when unknown.
    pub title: String,
}

/// One entry of a chat selection menu.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatChoice {
    /// Zero-based menu index.
    pub index: usize,
    /// Chat the entry refers to.
    pub chat_id: i64,
    /// Title shown to the user.
    pub title: String,
}

/// Per-user browsing state for private-chat sessions.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum BrowsingState {
    /// No target chat yet.
    #[default]
    NoChatSpecified,
    /// A menu was shown; waiting for the user's pick.
    SelectingChat {
        /// Menu entries in display order.
        choices: Vec<ChatChoice>,
    },
    /// Quote lookups run against this chat.
    ChatSelected {
        /// The selected chat.
        chat_id: i64,
    },
}

impl BrowsingState {
    /// Stored phase name.
    pub fn phase(&self) -> &'static str {
        match self {
            Self::NoChatSpecified => "no_chat_specified",
            Self::SelectingChat { .. } => "selecting_chat",
            Self::ChatSelected { .. } => "chat_selected",
        }
    }
}
