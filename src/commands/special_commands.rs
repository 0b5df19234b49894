//! Special commands parser for interactive chat mode
//!
//! Lines starting with `/` are commands for the chat loop itself rather than
//! questions for the assistant. Commands are case-insensitive.

use colored::Colorize;
use thiserror::Error;

/// Errors that can occur when parsing special commands
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CommandError {
    /// Unknown command was entered
    #[error("Unknown command: {0}\n\nType '/help' to see available commands")]
    UnknownCommand(String),

    /// Command requires an argument but none was provided
    #[error("Command {command} requires an argument\n\nUsage: {usage}")]
    MissingArgument { command: String, usage: String },
}

/// Commands handled by the chat loop
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SpecialCommand {
    /// Show available commands
    Help,
    /// Refresh and print the session listing
    Sessions,
    /// Resume and switch to another session
    Open(String),
    /// Generate (or show the cached) summary of the active session
    Summary,
    /// Reprint the active session's transcript
    History,
    /// Check whether the active session is indexed
    Status,
    /// Leave the chat loop
    Exit,
}

/// Parses a chat line
///
/// Returns `Ok(None)` for ordinary input that should be asked as a question.
///
/// # Examples
///
/// ```
/// use docai::commands::special_commands::{parse_special_command, SpecialCommand};
///
/// assert_eq!(parse_special_command("/OPEN pdf_1").unwrap(), Some(SpecialCommand::Open("pdf_1".into())));
/// assert_eq!(parse_special_command("what is this?").unwrap(), None);
/// ```
pub fn parse_special_command(input: &str) -> Result<Option<SpecialCommand>, CommandError> {
    let trimmed = input.trim();
    if !trimmed.starts_with('/') {
        return Ok(None);
    }

    let mut parts = trimmed.splitn(2, char::is_whitespace);
    let command = parts.next().unwrap_or_default().to_lowercase();
    let arg = parts.next().map(str::trim).filter(|a| !a.is_empty());

    let parsed = match command.as_str() {
        "/help" | "/?" => SpecialCommand::Help,
        "/sessions" | "/ls" => SpecialCommand::Sessions,
        "/open" => match arg {
            Some(id) => SpecialCommand::Open(id.to_string()),
            None => {
                return Err(CommandError::MissingArgument {
                    command: "/open".to_string(),
                    usage: "/open <session-id>".to_string(),
                })
            }
        },
        "/summary" | "/summarize" => SpecialCommand::Summary,
        "/history" => SpecialCommand::History,
        "/status" => SpecialCommand::Status,
        "/exit" | "/quit" => SpecialCommand::Exit,
        other => return Err(CommandError::UnknownCommand(other.to_string())),
    };
    Ok(Some(parsed))
}

/// Prints the chat help text
pub fn print_help() {
    println!("{}", "Chat commands:".bold());
    println!("  {:<22} show this help", "/help".cyan());
    println!("  {:<22} list your sessions", "/sessions".cyan());
    println!("  {:<22} switch to another session", "/open <session-id>".cyan());
    println!("  {:<22} summarize the current document", "/summary".cyan());
    println!("  {:<22} reprint this conversation", "/history".cyan());
    println!("  {:<22} check indexing status", "/status".cyan());
    println!("  {:<22} leave chat (or Ctrl-D)", "/exit".cyan());
    println!();
    println!("Anything else is asked as a question about the current document.");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_text_is_not_a_command() {
        assert_eq!(parse_special_command("hello /help").unwrap(), None);
        assert_eq!(parse_special_command("").unwrap(), None);
    }

    #[test]
    fn test_commands_are_case_insensitive() {
        assert_eq!(
            parse_special_command("/HeLp").unwrap(),
            Some(SpecialCommand::Help)
        );
        assert_eq!(
            parse_special_command("  /quit  ").unwrap(),
            Some(SpecialCommand::Exit)
        );
    }

    #[test]
    fn test_open_requires_argument() {
        assert!(matches!(
            parse_special_command("/open   "),
            Err(CommandError::MissingArgument { .. })
        ));
        assert_eq!(
            parse_special_command("/open url_42").unwrap(),
            Some(SpecialCommand::Open("url_42".into()))
        );
    }

    #[test]
    fn test_unknown_command() {
        let err = parse_special_command("/delete s1").unwrap_err();
        assert_eq!(err, CommandError::UnknownCommand("/delete".into()));
    }
}
