//! Inbound events from the chat platform and the replies produced for them.

use quote_store::{Chat, ChatKind, MarkupSpan, User};
use serde::{Deserialize, Serialize};

/// A message observed by the bot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InboundEvent {
    /// Platform message id, unique within the chat.
    pub message_id: i64,

    /// Send time (seconds since epoch).
    pub date: i64,

    /// Chat the message was sent in.
    pub chat: EventChat,

    /// Sender. Absent for anonymous channel posts.
    #[serde(default)]
    pub from: Option<EventUser>,

    /// Message text; `None` for stickers, photos and other non-text content.
    #[serde(default)]
    pub text: Option<String>,

    /// Formatting spans over `text`.
    #[serde(default)]
    pub entities: Vec<MarkupSpan>,

    /// Original author when the message is a forward.
    #[serde(default)]
    pub forward_from: Option<EventUser>,

    /// Original send time when the message is a forward.
    #[serde(default)]
    pub forward_date: Option<i64>,

    /// The message this one replies to.
    #[serde(default)]
    pub reply_to_message: Option<Box<InboundEvent>>,
}

impl InboundEvent {
    /// Create a text message event.
    pub fn text(message_id: i64, chat: EventChat, from: EventUser, text: impl Into<String>) -> Self {
        Self {
            message_id,
            date: 0,
            chat,
            from: Some(from),
            text: Some(text.into()),
            entities: Vec::new(),
            forward_from: None,
            forward_date: None,
            reply_to_message: None,
        }
    }

    /// Mark this event as a reply to `message`.
    pub fn replying_to(mut self, message: InboundEvent) -> Self {
        self.reply_to_message = Some(Box::new(message));
        self
    }

    /// Original author and send time, following forwards.
    pub fn origin(&self) -> Option<(&EventUser, i64)> {
        match &self.forward_from {
            Some(author) => Some((author, self.forward_date.unwrap_or(self.date))),
            None => self.from.as_ref().map(|author| (author, self.date)),
        }
    }
}

/// Chat metadata attached to an event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventChat {
    /// Platform chat id.
    pub id: i64,
    /// Chat kind.
    #[serde(rename = "type")]
    pub kind: ChatKind,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub username: Option<String>,
}

impl EventChat {
    /// A one-to-one chat with the given user.
    pub fn private(user_id: i64) -> Self {
        Self {
            id: user_id,
            kind: ChatKind::Private,
            title: None,
            username: None,
        }
    }

    /// A group chat.
    pub fn group(id: i64, title: impl Into<String>) -> Self {
        Self {
            id,
            kind: ChatKind::Group,
            title: Some(title.into()),
            username: None,
        }
    }

    pub fn is_private(&self) -> bool {
        self.kind.is_private()
    }
}

impl From<&EventChat> for Chat {
    fn from(chat: &EventChat) -> Self {
        Self {
            id: chat.id,
            kind: chat.kind,
            title: chat.title.clone(),
            username: chat.username.clone(),
        }
    }
}

/// User metadata attached to an event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventUser {
    /// Platform user id.
    pub id: i64,
    pub first_name: String,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub username: Option<String>,
}

impl EventUser {
    pub fn new(id: i64, first_name: impl Into<String>) -> Self {
        Self {
            id,
            first_name: first_name.into(),
            last_name: None,
            username: None,
        }
    }
}

impl From<&EventUser> for User {
    fn from(user: &EventUser) -> Self {
        Self {
            id: user.id,
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone().unwrap_or_default(),
            username: user.username.clone().unwrap_or_default(),
        }
    }
}

/// A reply for the transport to deliver.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reply {
    /// Destination chat.
    pub chat_id: i64,
    /// Reply text.
    pub text: String,
    /// Message to thread the reply under, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reply_to_message_id: Option<i64>,
    /// Whether `text` contains HTML markup.
    #[serde(default)]
    pub html: bool,
}

impl Reply {
    /// Plain-text reply.
    pub fn plain(chat_id: i64, text: impl Into<String>) -> Self {
        Self {
            chat_id,
            text: text.into(),
            reply_to_message_id: None,
            html: false,
        }
    }

    /// HTML reply.
    pub fn html(chat_id: i64, text: impl Into<String>) -> Self {
        Self {
            html: true,
            ..Self::plain(chat_id, text)
        }
    }

    /// Thread this reply under a message.
    pub fn in_reply_to(mut self, message_id: i64) -> Self {
        self.reply_to_message_id = Some(message_id);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quote_store::SpanStyle;

    #[test]
    fn test_parse_group_reply_event() {
        let json = r#"{
            "message_id": 20,
            "date": 1500000100,
            "chat": {"id": -100, "type": "supergroup", "title": "Friends"},
            "from": {"id": 2, "first_name": "Bob", "username": "bobby"},
            "text": "/addquote",
            "entities": [{"type": "bot_command", "offset": 0, "length": 9}],
            "reply_to_message": {
                "message_id": 19,
                "date": 1500000000,
                "chat": {"id": -100, "type": "supergroup", "title": "Friends"},
                "from": {"id": 1, "first_name": "Alice"},
                "text": "Nice quote here",
                "entities": [{"type": "bold", "offset": 0, "length": 4}]
            }
        }"#;

        let event: InboundEvent = serde_json::from_str(json).unwrap();
        assert_eq!(event.chat.kind, ChatKind::Supergroup);
        assert!(event.text.is_some());
        assert_eq!(
            event.entities[0].style,
            SpanStyle::Other("bot_command".to_string())
        );

        let replied = event.reply_to_message.as_deref().unwrap();
        let (author, sent_at) = replied.origin().unwrap();
        assert_eq!(author.id, 1);
        assert_eq!(sent_at, 1_500_000_000);
        assert_eq!(replied.entities[0].style, SpanStyle::Bold);
    }

    #[test]
    fn test_forward_origin_wins() {
        let mut message = InboundEvent::text(
            5,
            EventChat::group(-1, "Friends"),
            EventUser::new(2, "Bob"),
            "forwarded words",
        );
        message.date = 200;
        message.forward_from = Some(EventUser::new(3, "Carol"));
        message.forward_date = Some(100);

        let (author, sent_at) = message.origin().unwrap();
        assert_eq!(author.id, 3);
        assert_eq!(sent_at, 100);
    }

    #[test]
    fn test_non_text_event() {
        let json = r#"{"message_id": 1, "date": 7, "chat": {"id": 5, "type": "private"}, "from": {"id": 5, "first_name": "A"}}"#;
        let event: InboundEvent = serde_json::from_str(json).unwrap();
        assert!(event.text.is_none());
        assert!(event.chat.is_private());
    }

    #[test]
    fn test_date_is_required() {
        let json = r#"{"message_id": 1, "chat": {"id": -1, "type": "group"}, "from": {"id": 5, "first_name": "A"}, "text": "hi"}"#;
        assert!(serde_json::from_str::<InboundEvent>(json).is_err());

        let reply = r#"{"message_id": 2, "date": 10, "chat": {"id": -1, "type": "group"},
            "from": {"id": 6, "first_name": "B"}, "text": "/addquote",
            "reply_to_message": {"message_id": 1, "chat": {"id": -1, "type": "group"},
                "from": {"id": 5, "first_name": "A"}, "text": "undated"}}"#;
        assert!(serde_json::from_str::<InboundEvent>(reply).is_err());
    }

    #[test]
    fn test_user_conversion_defaults_missing_fields() {
        let user = User::from(&EventUser::new(4, "Dan"));
        assert_eq!(user.last_name, "");
        assert_eq!(user.username, "");
    }
}
