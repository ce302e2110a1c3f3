//! Chat selection for private conversations.
//!
//! In a private chat there is no group to read quotes from, so each user
//! first picks one of the chats they were seen in. The pick is stored per
//! user and survives unrelated commands until the user asks to change it.
//!
//! ```text
//!   NoChatSpecified ──(any input)──▶ menu ──▶ SelectingChat
//!   SelectingChat ──(valid pick)──▶ ChatSelected
//!   SelectingChat ──(bad pick)──▶ SelectingChat (same menu)
//!   any phase ──(change chat)──▶ menu ──▶ SelectingChat
//! ```

use quote_store::{membership, state, BrowsingState, ChatChoice, Database};
use tracing::{debug, info};

use crate::error::BotError;

/// Input for one private-chat turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BrowsingInput<'a> {
    /// Explicit request to pick a chat (again).
    ChangeChat,
    /// Any other message: a command or free text.
    Message(&'a str),
}

/// What a turn resolved to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// The session consumed the turn; tell the user about it.
    Session(SessionReply),
    /// Run the user's command against this chat.
    Target(i64),
}

/// Session events reported back to the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionReply {
    /// The user has not been seen in any chat.
    NoChatsFound,
    /// A menu was presented; the user is now selecting.
    ChatMenu(Vec<ChatChoice>),
    /// A chat was picked.
    Selected { chat_id: i64, title: String },
    /// A number that is not on the menu.
    InvalidChatNumber,
    /// Text that matches no menu title.
    NoTitleMatched,
}

/// Why a menu pick failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PickError {
    InvalidChatNumber,
    NoTitleMatched,
}

/// Resolve a pick against a menu.
///
/// Integers are zero-based menu indexes. Anything else is matched as a
/// case-insensitive substring of the titles, first match in menu order.
pub fn pick_choice<'a>(choices: &'a [ChatChoice], input: &str) -> Result<&'a ChatChoice, PickError> {
    let input = input.trim();

    if is_integer(input) {
        return input
            .parse::<usize>()
            .ok()
            .and_then(|index| choices.get(index))
            .ok_or(PickError::InvalidChatNumber);
    }

    if input.is_empty() {
        return Err(PickError::NoTitleMatched);
    }

    let needle = input.to_lowercase();
    choices
        .iter()
        .find(|choice| choice.title.to_lowercase().contains(&needle))
        .ok_or(PickError::NoTitleMatched)
}

/// An optionally signed run of ASCII digits, of any magnitude.
fn is_integer(input: &str) -> bool {
    let digits = input.strip_prefix(&['+', '-'][..]).unwrap_or(input);
    !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit())
}

/// Per-user chat selection backed by the browsing state table.
#[derive(Debug, Clone)]
pub struct ChatBrowser {
    db: Database,
}

impl ChatBrowser {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// Advance a user's session by one turn.
    pub async fn resolve(
        &self,
        user_id: i64,
        input: BrowsingInput<'_>,
    ) -> Result<Resolution, BotError> {
        let current = state::get_or_create_state(self.db.pool(), user_id).await?;
        debug!("User {} browsing phase: {}", user_id, current.phase());

        match (current, input) {
            (_, BrowsingInput::ChangeChat) | (BrowsingState::NoChatSpecified, _) => {
                self.present_menu(user_id).await
            }
            (BrowsingState::SelectingChat { choices }, BrowsingInput::Message(text)) => {
                self.select(user_id, &choices, text).await
            }
            (BrowsingState::ChatSelected { chat_id }, BrowsingInput::Message(_)) => {
                Ok(Resolution::Target(chat_id))
            }
        }
    }

    async fn present_menu(&self, user_id: i64) -> Result<Resolution, BotError> {
        let chats = membership::chats_for_user(self.db.pool(), user_id).await?;

        if chats.is_empty() {
            state::set_state(self.db.pool(), user_id, &BrowsingState::NoChatSpecified).await?;
            return Ok(Resolution::Session(SessionReply::NoChatsFound));
        }

        let choices: Vec<ChatChoice> = chats
            .into_iter()
            .enumerate()
            .map(|(index, chat)| ChatChoice {
                index,
                chat_id: chat.chat_id,
                title: chat.title,
            })
            .collect();

        state::set_state(
            self.db.pool(),
            user_id,
            &BrowsingState::SelectingChat {
                choices: choices.clone(),
            },
        )
        .await?;

        Ok(Resolution::Session(SessionReply::ChatMenu(choices)))
    }

    async fn select(
        &self,
        user_id: i64,
        choices: &[ChatChoice],
        text: &str,
    ) -> Result<Resolution, BotError> {
        let choice = match pick_choice(choices, text) {
            Ok(choice) => choice,
            Err(PickError::InvalidChatNumber) => {
                return Ok(Resolution::Session(SessionReply::InvalidChatNumber));
            }
            Err(PickError::NoTitleMatched) => {
                return Ok(Resolution::Session(SessionReply::NoTitleMatched));
            }
        };

        state::set_state(
            self.db.pool(),
            user_id,
            &BrowsingState::ChatSelected {
                chat_id: choice.chat_id,
            },
        )
        .await?;

        info!("User {} selected chat {}", user_id, choice.chat_id);
        Ok(Resolution::Session(SessionReply::Selected {
            chat_id: choice.chat_id,
            title: choice.title.clone(),
        }))
    }
}
