//! Reply text rendering.
//!
//! Replies flagged as HTML escape every user-controlled name and title.
//! Quote content is stored already rewritten to markup and is emitted as is.

use chrono::DateTime;
use quote_store::{QuoteWithAuthor, RankedUser};

use crate::browsing::SessionReply;

/// Display format for quote timestamps (UTC).
pub const TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Format a send time in seconds since the epoch.
pub fn format_timestamp(seconds: i64) -> String {
    match DateTime::from_timestamp(seconds, 0) {
        Some(time) => time.format(TIME_FORMAT).to_string(),
        None => seconds.to_string(),
    }
}

/// Escape text for an HTML reply.
pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

/// Render a quote: content, author's first name, and the date in italics.
pub fn format_quote(found: &QuoteWithAuthor) -> String {
    format!(
        "\"{}\" - {}\n<i>{}</i>",
        found.quote.content,
        escape_html(&found.author.first_name),
        format_timestamp(found.quote.sent_at)
    )
}

/// Render the `/stats` summary for a chat with at least one quote.
pub fn format_stats(
    total: i64,
    first_sent_at: i64,
    most_quoted: &[RankedUser],
    most_adding: &[RankedUser],
) -> String {
    let mut lines = vec![
        "<b>Total quote count</b>".to_string(),
        format!(
            "• {} quotes since {}",
            total,
            format_timestamp(first_sent_at)
        ),
        String::new(),
        "<b>Users with the most quotes</b>".to_string(),
    ];
    lines.extend(most_quoted.iter().map(|user| ranking_line(user, total)));
    lines.push(String::new());
    lines.push("<b>Users who add the most quotes</b>".to_string());
    lines.extend(most_adding.iter().map(|user| ranking_line(user, total)));
    lines.join("\n")
}

fn ranking_line(user: &RankedUser, total: i64) -> String {
    let share = if total > 0 {
        user.count as f64 * 100.0 / total as f64
    } else {
        0.0
    };
    format!(
        "• {} ({:.1}%): {}",
        user.count,
        share,
        escape_html(&user.display_name)
    )
}

/// Render a browsing session event.
pub fn format_session_reply(reply: &SessionReply) -> String {
    match reply {
        SessionReply::NoChatsFound => "<b>Chat selection</b>\nno chats found".to_string(),
        SessionReply::ChatMenu(choices) => {
            let mut lines = vec![
                "<b>Chat selection</b>".to_string(),
                "Choose a chat by its number or title:".to_string(),
                String::new(),
            ];
            lines.extend(
                choices
                    .iter()
                    .map(|choice| format!("<b>[{}]</b> {}", choice.index, escape_html(&choice.title))),
            );
            lines.join("\n")
        }
        SessionReply::Selected { title, .. } => {
            format!("selected chat \"{}\"", escape_html(title))
        }
        SessionReply::InvalidChatNumber => "invalid chat number".to_string(),
        SessionReply::NoTitleMatched => "no chat titles matched".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quote_store::{ChatChoice, Quote, User};

    #[test]
    fn test_format_timestamp() {
        assert_eq!(format_timestamp(0), "1970-01-01 00:00:00");
        assert_eq!(format_timestamp(1_500_000_000), "2017-07-14 02:40:00");
    }

    #[test]
    fn test_escape_html() {
        assert_eq!(escape_html("Tom & <Jerry>"), "Tom &amp; &lt;Jerry&gt;");
        assert_eq!(escape_html("plain"), "plain");
    }

    #[test]
    fn test_format_quote() {
        let found = QuoteWithAuthor {
            quote: Quote {
                id: 1,
                chat_id: -1,
                message_id: 7,
                sent_at: 1_500_000_000,
                sent_by: 1,
                content: "<b>Nice</b> quote".to_string(),
                quoted_by: Some(2),
            },
            author: User::new(1, "Alice"),
        };

        assert_eq!(
            format_quote(&found),
            "\"<b>Nice</b> quote\" - Alice\n<i>2017-07-14 02:40:00</i>"
        );
    }

    #[test]
    fn test_format_stats() {
        let quoted = vec![
            RankedUser {
                count: 2,
                display_name: "Alice Liddell".to_string(),
            },
            RankedUser {
                count: 1,
                display_name: "Bob".to_string(),
            },
        ];
        let adding = vec![RankedUser {
            count: 3,
            display_name: "Carol".to_string(),
        }];

        let text = format_stats(3, 0, &quoted, &adding);
        assert_eq!(
            text,
            "<b>Total quote count</b>\n\
             • 3 quotes since 1970-01-01 00:00:00\n\
             \n\
             <b>Users with the most quotes</b>\n\
             • 2 (66.7%): Alice Liddell\n\
             • 1 (33.3%): Bob\n\
             \n\
             <b>Users who add the most quotes</b>\n\
             • 3 (100.0%): Carol"
        );
    }

    #[test]
    fn test_format_menu() {
        let menu = SessionReply::ChatMenu(vec![
            ChatChoice {
                index: 0,
                chat_id: -2,
                title: "A & B".to_string(),
            },
            ChatChoice {
                index: 1,
                chat_id: -1,
                title: "zebra".to_string(),
            },
        ]);

        assert_eq!(
            format_session_reply(&menu),
            "<b>Chat selection</b>\nChoose a chat by its number or title:\n\n\
             <b>[0]</b> A &amp; B\n<b>[1]</b> zebra"
        );
        assert_eq!(
            format_session_reply(&SessionReply::Selected {
                chat_id: -1,
                title: "zebra".to_string()
            }),
            "selected chat \"zebra\""
        );
    }
}
