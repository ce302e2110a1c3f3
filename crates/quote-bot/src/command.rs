//! Command parsing.

/// A recognized bot command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Open the chat menu (private only).
    Start,
    /// Open the chat menu again (private only).
    Chats,
    /// Show the selected chat (private only).
    Which,
    Random,
    Quotes,
    Stats,
    Author,
    Search,
    AddQuote,
    /// Anything else, including free text.
    Unknown,
}

impl Command {
    fn from_name(name: &str) -> Self {
        match name {
            "start" => Self::Start,
            "chats" => Self::Chats,
            "which" => Self::Which,
            "random" => Self::Random,
            "quotes" => Self::Quotes,
            "stats" => Self::Stats,
            "author" => Self::Author,
            "search" => Self::Search,
            "addquote" => Self::AddQuote,
            _ => Self::Unknown,
        }
    }

    /// Whether the command is answered in group chats.
    pub fn allowed_in_groups(self) -> bool {
        matches!(
            self,
            Self::Random | Self::Quotes | Self::Stats | Self::Author | Self::Search | Self::AddQuote
        )
    }

    /// Whether the command asks for the private chat menu.
    pub fn opens_menu(self) -> bool {
        matches!(self, Self::Start | Self::Chats)
    }
}

/// Split message text into a command and its trimmed arguments.
///
/// The command is the first whitespace-separated token, lower-cased, with
/// an optional leading `/` and a trailing `@<bot_username>` removed. A
/// mention of some other bot leaves the token unrecognized.
pub fn parse_command<'a>(text: &'a str, bot_username: Option<&str>) -> (Command, &'a str) {
    let (token, args) = split_command(text);
    let mut name = token.strip_prefix('/').unwrap_or(token).to_lowercase();

    if let Some(at) = name.find('@') {
        let mention = &name[at + 1..];
        let ours = bot_username.is_some_and(|handle| mention.eq_ignore_ascii_case(handle));
        if !ours {
            return (Command::Unknown, args);
        }
        name.truncate(at);
    }

    (Command::from_name(&name), args)
}

fn split_command(text: &str) -> (&str, &str) {
    let trimmed = text.trim();
    let mut parts = trimmed.splitn(2, |c: char| c.is_whitespace());
    let command = parts.next().unwrap_or("");
    let rest = parts.next().unwrap_or("").trim();
    (command, rest)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_command() {
        let (cmd, rest) = split_command("/search  big  words ");
        assert_eq!(cmd, "/search");
        assert_eq!(rest, "big  words");

        let (cmd, rest) = split_command("stats");
        assert_eq!(cmd, "stats");
        assert_eq!(rest, "");
    }

    #[test]
    fn test_parse_plain_and_slash() {
        assert_eq!(parse_command("/random", None), (Command::Random, ""));
        assert_eq!(parse_command("RANDOM", None), (Command::Random, ""));
        assert_eq!(parse_command("/Author Bob", None), (Command::Author, "Bob"));
        assert_eq!(parse_command("hello there", None), (Command::Unknown, "there"));
        assert_eq!(parse_command("", None), (Command::Unknown, ""));
    }

    #[test]
    fn test_parse_strips_own_handle() {
        let bot = Some("QuoteBot");
        assert_eq!(parse_command("/stats@quotebot", bot), (Command::Stats, ""));
        assert_eq!(
            parse_command("/quotes@QuoteBot nice", bot),
            (Command::Quotes, "nice")
        );
        assert_eq!(parse_command("/stats@otherbot", bot).0, Command::Unknown);
        assert_eq!(parse_command("/stats@quotebot", None).0, Command::Unknown);
    }

    #[test]
    fn test_group_commands() {
        assert!(Command::AddQuote.allowed_in_groups());
        assert!(Command::Search.allowed_in_groups());
        assert!(!Command::Start.allowed_in_groups());
        assert!(!Command::Which.allowed_in_groups());
        assert!(!Command::Unknown.allowed_in_groups());
        assert!(Command::Chats.opens_menu());
    }
}
