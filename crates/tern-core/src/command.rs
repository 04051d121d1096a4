//! Session-level commands.
//!
//! Commands are handled outside the message cycle and never interleave
//! with an in-flight request/tool exchange.

/// A session command, recognized at the start of a line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionCommand {
    /// Clear the conversation (credentials are untouched).
    Clear,
    /// Re-run the interactive authorization flow.
    Login,
    /// Exit the session.
    Quit,
    /// Show help.
    Help,
}

impl SessionCommand {
    /// Parse a command from an input line. Returns `None` for ordinary
    /// messages. Matching is case-insensitive on the leading token.
    pub fn parse(line: &str) -> Option<Self> {
        let token = line.trim().split_whitespace().next()?;
        match token.to_lowercase().as_str() {
            "/clear" => Some(Self::Clear),
            "/login" => Some(Self::Login),
            "/quit" | "/exit" => Some(Self::Quit),
            "/help" => Some(Self::Help),
            _ => None,
        }
    }
}

/// Help text shown for `/help`.
pub const HELP_TEXT: &str = "\
Commands:
  /quit   - Exit tern
  /clear  - Clear conversation history
  /login  - Re-authenticate with OAuth
  /help   - Show this help

Tips:
  - The model can read, write, and edit files
  - The model can run bash commands
  - The model can search with glob and grep";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_commands() {
        assert_eq!(SessionCommand::parse("/quit"), Some(SessionCommand::Quit));
        assert_eq!(SessionCommand::parse("/exit"), Some(SessionCommand::Quit));
        assert_eq!(SessionCommand::parse("/clear"), Some(SessionCommand::Clear));
        assert_eq!(SessionCommand::parse("/login"), Some(SessionCommand::Login));
        assert_eq!(SessionCommand::parse("/help"), Some(SessionCommand::Help));
    }

    #[test]
    fn test_parse_case_insensitive() {
        assert_eq!(SessionCommand::parse("/QUIT"), Some(SessionCommand::Quit));
        assert_eq!(SessionCommand::parse("/Clear"), Some(SessionCommand::Clear));
    }

    #[test]
    fn test_parse_with_leading_whitespace() {
        assert_eq!(SessionCommand::parse("  /help"), Some(SessionCommand::Help));
    }

    #[test]
    fn test_ordinary_messages_are_not_commands() {
        assert_eq!(SessionCommand::parse("hello"), None);
        assert_eq!(SessionCommand::parse("please /quit the loop"), None);
        assert_eq!(SessionCommand::parse("/unknown"), None);
        assert_eq!(SessionCommand::parse(""), None);
    }
}
