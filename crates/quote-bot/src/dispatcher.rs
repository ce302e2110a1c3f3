//! QuoteBot implementation.

use quote_store::{
    chat, membership, quote, ranking, user, Chat, ChatKind, Database, InsertOutcome, NewQuote,
    QuoteWithAuthor, User,
};
use tracing::{debug, info};

use crate::browsing::{BrowsingInput, ChatBrowser, Resolution};
use crate::command::{parse_command, Command};
use crate::config::QuoteBotConfig;
use crate::error::BotError;
use crate::event::{EventUser, InboundEvent, Reply};
use crate::formatting::{format_quote, format_session_reply, format_stats};

/// Turns inbound events into replies.
///
/// Cloning is cheap; clones share the database pool.
#[derive(Debug, Clone)]
pub struct QuoteBot {
    db: Database,
    config: QuoteBotConfig,
    browser: ChatBrowser,
}

impl QuoteBot {
    /// Create a bot over an already migrated database.
    pub fn new(db: Database, config: QuoteBotConfig) -> Self {
        let browser = ChatBrowser::new(db.clone());
        Self {
            db,
            config,
            browser,
        }
    }

    /// Connect to the configured database and ensure its schema.
    pub async fn connect(config: QuoteBotConfig) -> Result<Self, BotError> {
        let db = Database::connect_with_pool_size(&config.sqlite_url, config.pool_size).await?;
        db.migrate().await?;
        Ok(Self::new(db, config))
    }

    /// Get a reference to the database.
    pub fn db(&self) -> &Database {
        &self.db
    }

    /// Handle one event. Returns the reply to send, if any.
    pub async fn handle(&self, event: &InboundEvent) -> Result<Option<Reply>, BotError> {
        let Some(text) = event.text.as_deref() else {
            return Ok(None);
        };
        if event.chat.kind == ChatKind::Channel {
            return Ok(None);
        }
        let Some(sender) = event.from.as_ref() else {
            return Ok(None);
        };

        let private = event.chat.is_private();
        if !private && !text.trim_start().starts_with('/') {
            return Ok(None);
        }

        let (command, args) = parse_command(text, self.config.bot_username.as_deref());
        if !private && !command.allowed_in_groups() {
            return Ok(None);
        }

        debug!(
            "Dispatching {:?} from user {} in chat {}",
            command, sender.id, event.chat.id
        );
        self.record_sighting(event, sender).await?;

        if !private {
            if command == Command::AddQuote {
                return self.add_quote(event, sender).await;
            }
            return self.run_query(command, args, event.chat.id, event).await;
        }

        if command == Command::AddQuote {
            return Ok(None);
        }

        let input = if command.opens_menu() {
            BrowsingInput::ChangeChat
        } else {
            BrowsingInput::Message(text)
        };

        match self.browser.resolve(sender.id, input).await? {
            Resolution::Session(reply) => Ok(Some(Reply::html(
                event.chat.id,
                format_session_reply(&reply),
            ))),
            Resolution::Target(chat_id) if command == Command::Which => {
                let title = chat::get_chat(self.db.pool(), chat_id)
                    .await?
                    .and_then(|chat| chat.title)
                    .unwrap_or_default();
                Ok(Some(Reply::plain(
                    event.chat.id,
                    format!("searching quotes from \"{}\"", title),
                )))
            }
            Resolution::Target(chat_id) => self.run_query(command, args, chat_id, event).await,
        }
    }

    /// Upsert the sender, and in groups the chat and the membership.
    async fn record_sighting(&self, event: &InboundEvent, sender: &EventUser) -> Result<(), BotError> {
        user::upsert_user(self.db.pool(), &User::from(sender)).await?;

        if !event.chat.is_private() {
            chat::upsert_chat(self.db.pool(), &Chat::from(&event.chat)).await?;
            membership::record_membership(self.db.pool(), sender.id, event.chat.id).await?;
        }
        Ok(())
    }

    async fn add_quote(
        &self,
        event: &InboundEvent,
        archiver: &EventUser,
    ) -> Result<Option<Reply>, BotError> {
        let Some(replied) = event.reply_to_message.as_deref() else {
            return Ok(None);
        };
        let Some(content) = replied.text.as_deref() else {
            return Ok(None);
        };
        let Some((author, sent_at)) = replied.origin() else {
            return Ok(None);
        };

        let refuse = |text: &str| Some(Reply::plain(event.chat.id, text).in_reply_to(event.message_id));

        if self.config.bot_user_id == Some(author.id) {
            return Ok(refuse("can't quote bot messages"));
        }
        if author.id == archiver.id {
            return Ok(refuse("can't quote own messages"));
        }

        user::upsert_user(self.db.pool(), &User::from(author)).await?;

        let outcome = quote::insert_quote(
            self.db.pool(),
            &NewQuote {
                chat_id: event.chat.id,
                message_id: replied.message_id,
                sent_at,
                sent_by: author.id,
                content: content.to_string(),
                spans: replied.entities.clone(),
                quoted_by: Some(archiver.id),
            },
        )
        .await?;

        let text = match outcome {
            InsertOutcome::Added => "quote added",
            InsertOutcome::AlreadyExists => "quote already exists",
        };
        Ok(Some(
            Reply::plain(event.chat.id, text).in_reply_to(event.message_id),
        ))
    }

    /// Run a read-only quote command against `chat_id`, replying in the
    /// chat the event came from.
    async fn run_query(
        &self,
        command: Command,
        args: &str,
        chat_id: i64,
        event: &InboundEvent,
    ) -> Result<Option<Reply>, BotError> {
        let origin = event.chat.id;
        let pool = self.db.pool();

        let reply = match command {
            Command::Random => {
                let found = quote::random_quote(pool, chat_id, None).await?;
                quote_reply(origin, found, "no quotes in database".to_string())
            }
            Command::Quotes => {
                let text = if args.is_empty() {
                    let count = quote::quote_count(pool, chat_id, None).await?;
                    format!("{} quotes in this chat", count)
                } else {
                    let count = quote::quote_count(pool, chat_id, Some(args)).await?;
                    format!("{} quotes in this chat for search term \"{}\"", count, args)
                };
                Reply::plain(origin, text).in_reply_to(event.message_id)
            }
            Command::Stats => match quote::first_quote(pool, chat_id).await? {
                None => Reply::plain(origin, "no quotes in database"),
                Some(first) => {
                    let limit = self.config.stats_limit;
                    let total = quote::quote_count(pool, chat_id, None).await?;
                    let most_quoted = ranking::top_quoted(pool, chat_id, limit).await?;
                    let most_adding = ranking::top_contributors(pool, chat_id, limit).await?;
                    Reply::html(
                        origin,
                        format_stats(total, first.sent_at, &most_quoted, &most_adding),
                    )
                }
            },
            Command::Author if !args.is_empty() => {
                let found = quote::random_quote(pool, chat_id, Some(args)).await?;
                quote_reply(origin, found, format!("no quotes found by author \"{}\"", args))
            }
            Command::Search if !args.is_empty() => {
                let found = quote::search_quote(pool, args).await?;
                quote_reply(
                    origin,
                    found,
                    format!("no quotes found for search terms \"{}\"", args),
                )
            }
            _ => return Ok(None),
        };

        info!("Answered {:?} for chat {} in chat {}", command, chat_id, origin);
        Ok(Some(reply))
    }
}

fn quote_reply(origin: i64, found: Option<QuoteWithAuthor>, missing: String) -> Reply {
    match found {
        Some(found) => Reply::html(origin, format_quote(&found)),
        None => Reply::plain(origin, missing),
    }
}
