//! Message parser - Splits raw text into a command token and its arguments

/// A command as typed by the user
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedCommand {
    /// Command name without the slash or any `@bot` suffix
    pub name: String,
    /// Everything after the first whitespace, trimmed
    pub args: String,
}

/// Parses incoming text into commands
#[derive(Debug, Clone, Default)]
pub struct MessageParser {
    bot_username: Option<String>,
}

impl MessageParser {
    pub fn new() -> Self {
        Self::default()
    }

    /// Only `/cmd@<username>` suffixes naming this bot are accepted
    pub fn with_bot_username(mut self, username: impl Into<String>) -> Self {
        let username = username.into();
        self.bot_username = Some(username.trim_start_matches('@').to_string());
        self
    }

    /// `None` for plain chatter and for commands addressed to another bot
    pub fn parse(&self, text: &str) -> Option<ParsedCommand> {
        let body = text.strip_prefix('/')?;

        let (token, rest) = match body.split_once(char::is_whitespace) {
            Some((token, rest)) => (token, rest.trim()),
            None => (body, ""),
        };

        let name = match token.split_once('@') {
            Some((name, target)) => match &self.bot_username {
                Some(me) if !me.eq_ignore_ascii_case(target) => {
                    tracing::debug!("Ignoring /{} addressed to @{}", name, target);
                    return None;
                }
                _ => name,
            },
            None => token,
        };

        Some(ParsedCommand {
            name: name.to_string(),
            args: rest.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_text_is_not_a_command() {
        let parser = MessageParser::new();
        assert_eq!(parser.parse("hello there"), None);
        assert_eq!(parser.parse(" /start"), None);
        assert_eq!(parser.parse(""), None);
    }

    #[test]
    fn test_split_on_first_whitespace() {
        let parser = MessageParser::new();
        let parsed = parser.parse("/echo  hello   world ").unwrap();
        assert_eq!(parsed.name, "echo");
        assert_eq!(parsed.args, "hello   world");

        let parsed = parser.parse("/echo\nmulti\nline").unwrap();
        assert_eq!(parsed.args, "multi\nline");
    }

    #[test]
    fn test_no_args() {
        let parsed = MessageParser::new().parse("/echo").unwrap();
        assert_eq!(parsed.name, "echo");
        assert_eq!(parsed.args, "");
    }

    #[test]
    fn test_bot_suffix() {
        let parser = MessageParser::new().with_bot_username("@RelayBot");
        assert_eq!(parser.parse("/cat@relaybot").unwrap().name, "cat");
        assert_eq!(parser.parse("/cat@OtherBot"), None);

        let anonymous = MessageParser::new();
        assert_eq!(anonymous.parse("/cat@whoever").unwrap().name, "cat");
    }
}
