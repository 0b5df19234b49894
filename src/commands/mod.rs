/*!
Command handlers for the CLI

This module provides command handlers invoked by the CLI entrypoint.

- `auth`     — login, register, logout, whoami
- `sessions` — listing, document submission, status, summaries, single questions
- `chat`     — interactive question/answer loop over one session
- `render`   — terminal formatting shared by the handlers

Handlers are thin: they parse terminal input, call [`DocaiClient`], and
print results.
*/

use crate::client::DocaiClient;
use crate::config::Config;
use crate::error::Result;

pub mod auth;
pub mod render;
pub mod sessions;
pub mod special_commands;

// Chat command handler
pub mod chat {
    //! Interactive chat mode handler.
    //!
    //! Opens a session (asking for one when none is given), prints its
    //! transcript, and runs a readline loop that sends each line as a
    //! question. Lines starting with `/` are chat commands.

    use super::*;
    use crate::commands::render;
    use crate::commands::special_commands::{parse_special_command, print_help, SpecialCommand};
    use crate::sessions::ProcessingState;
    use colored::Colorize;
    use rustyline::error::ReadlineError;
    use rustyline::DefaultEditor;

    /// Start interactive chat mode
    ///
    /// # Arguments
    ///
    /// * `client` - Authenticated client
    /// * `config` - Loaded configuration (for rendering settings)
    /// * `session` - Session to open; prompted for when `None`
    ///
    /// # Errors
    ///
    /// Returns error if no session can be opened or the terminal fails.
    /// Failures inside the loop are printed and the loop continues.
    pub async fn run_chat(client: &DocaiClient, config: &Config, session: Option<String>) -> Result<()> {
        client.api().auth().require()?;
        let preview_chars = config.conversation.citation_preview_chars;
        let mut rl = DefaultEditor::new()?;

        let session = match session {
            Some(id) => id,
            None => {
                let sessions = client.list_sessions().await.into_result()?;
                render::print_sessions(&sessions);
                if sessions.is_empty() {
                    return Ok(());
                }
                rl.readline("Session id: ")?.trim().to_string()
            }
        };

        let mut active = client.open_session(&session).await?;
        print_transcript(client, &active, preview_chars);
        println!("{}", "Type /help for commands.".dimmed());

        loop {
            let prompt = format!("[{}] > ", active.cyan());
            match rl.readline(&prompt) {
                Ok(line) => {
                    let trimmed = line.trim();
                    if trimmed.is_empty() {
                        continue;
                    }
                    let _ = rl.add_history_entry(trimmed);

                    let command = match parse_special_command(trimmed) {
                        Ok(command) => command,
                        Err(e) => {
                            eprintln!("{}", e.to_string().red());
                            continue;
                        }
                    };

                    match command {
                        None => match client.ask(&active, &line).await {
                            Ok(reply) => render::print_turn(&reply, preview_chars),
                            Err(e) => eprintln!("{} {}", "Error:".red(), e),
                        },
                        Some(SpecialCommand::Help) => print_help(),
                        Some(SpecialCommand::Exit) => break,
                        Some(SpecialCommand::Sessions) => {
                            match client.list_sessions().await.into_result() {
                                Ok(sessions) => render::print_sessions(&sessions),
                                Err(e) => eprintln!("{} {}", "Error:".red(), e),
                            }
                        }
                        Some(SpecialCommand::Open(id)) => match client.open_session(&id).await {
                            Ok(opened) => {
                                active = opened;
                                print_transcript(client, &active, preview_chars);
                            }
                            Err(e) => eprintln!("{} {}", "Error:".red(), e),
                        },
                        Some(SpecialCommand::Summary) => match client.summarize(&active).await {
                            Ok(summary) => println!("{}\n{}\n", "Summary:".bold(), summary.text),
                            Err(e) => eprintln!("{} {}", "Error:".red(), e),
                        },
                        Some(SpecialCommand::History) => {
                            print_transcript(client, &active, preview_chars)
                        }
                        Some(SpecialCommand::Status) => match client.status(&active).await {
                            Ok(ProcessingState::Ready) => println!("{}", "Ready".green()),
                            Ok(ProcessingState::Pending) => {
                                println!("{}", "Still processing".yellow())
                            }
                            Err(e) => eprintln!("{} {}", "Error:".red(), e),
                        },
                    }
                }
                Err(ReadlineError::Interrupted) => {
                    println!("CTRL-C");
                    break;
                }
                Err(ReadlineError::Eof) => {
                    println!("CTRL-D");
                    break;
                }
                Err(err) => {
                    tracing::error!("Readline error: {:?}", err);
                    break;
                }
            }
        }

        println!("Goodbye!");
        Ok(())
    }

    fn print_transcript(client: &DocaiClient, session: &str, preview_chars: usize) {
        println!();
        for turn in client.transcript(session) {
            render::print_turn(&turn, preview_chars);
        }
        println!();
    }
}
