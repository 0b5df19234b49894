//! Terminal rendering for sessions, transcripts, and summaries

use crate::api::types::Citation;
use crate::conversation::{ConversationTurn, Role};
use crate::sessions::{Session, SessionStatus};
use colored::Colorize;
use prettytable::{format, Table};

/// Shortens `text` to at most `max_chars` characters, appending `...` when
/// anything was cut.
///
/// # Examples
///
/// ```
/// use docai::commands::render::preview;
///
/// assert_eq!(preview("abcdef", 3), "abc...");
/// assert_eq!(preview("abc", 3), "abc");
/// ```
pub fn preview(text: &str, max_chars: usize) -> String {
    let mut chars = text.chars();
    let head: String = chars.by_ref().take(max_chars).collect();
    if chars.next().is_some() {
        format!("{}...", head)
    } else {
        head
    }
}

/// One line per citation: `[index] preview`.
pub fn format_citations(citations: &[Citation], preview_chars: usize) -> Vec<String> {
    citations
        .iter()
        .map(|c| format!("[{}] {}", c.index, preview(&c.preview, preview_chars)))
        .collect()
}

/// Prints a transcript turn with its citations.
pub fn print_turn(turn: &ConversationTurn, preview_chars: usize) {
    match turn.role {
        Role::User => println!("{} {}", "you>".cyan().bold(), turn.text),
        Role::Assistant => {
            println!("{} {}", "assistant>".green().bold(), turn.text);
            let citations = format_citations(turn.citations(), preview_chars);
            if !citations.is_empty() {
                println!("{}", "Sources:".bold());
                for line in citations {
                    println!("  {}", line.dimmed());
                }
            }
        }
    }
}

fn colored_status(status: SessionStatus) -> String {
    match status {
        SessionStatus::Complete => status.to_string().green().to_string(),
        SessionStatus::Processing => status.to_string().yellow().to_string(),
        SessionStatus::Error => status.to_string().red().to_string(),
    }
}

/// Table of sessions in listing order.
pub fn session_table(sessions: &[Session]) -> Table {
    let mut table = Table::new();
    table.set_format(*format::consts::FORMAT_BORDERS_ONLY);

    table.add_row(prettytable::row![
        "ID".bold(),
        "Title".bold(),
        "Type".bold(),
        "Status".bold(),
        "Created".bold()
    ]);

    for session in sessions {
        table.add_row(prettytable::row![
            session.id.cyan(),
            preview(session.display_title(), 40),
            session.source_kind,
            colored_status(session.status),
            session.created_at.format("%Y-%m-%d %H:%M")
        ]);
    }
    table
}

/// Prints the session table, or a hint when there are none.
pub fn print_sessions(sessions: &[Session]) {
    if sessions.is_empty() {
        println!("{}", "No sessions yet. Upload a PDF or submit URLs to start.".yellow());
        return;
    }
    println!("\nYour sessions:");
    session_table(sessions).printstd();
    println!();
}
