//! Session commands: listing, submission, status, summary, single questions

use std::io::Read;
use std::path::Path;
use std::time::Duration;

use colored::Colorize;

use super::render;
use crate::client::DocaiClient;
use crate::error::{DocaiError, Result};
use crate::sessions::ingestion::parse_url_list;
use crate::sessions::{PdfUpload, ProcessingState};

/// Prints the session listing as a table or JSON.
pub async fn list(client: &DocaiClient, json: bool) -> Result<()> {
    let sessions = client.list_sessions().await.into_result()?;
    if json {
        println!("{}", serde_json::to_string_pretty(&sessions)?);
    } else {
        render::print_sessions(&sessions);
    }
    Ok(())
}

/// Uploads a PDF from disk.
pub async fn upload(client: &DocaiClient, path: &Path, session: Option<String>) -> Result<()> {
    let mut upload = PdfUpload::from_path(path)?;
    if let Some(session) = session {
        upload = upload.into_session(session);
    }
    let id = client.submit_pdf(upload).await?;
    println!("{} {}", "Created session".green(), id.cyan());
    Ok(())
}

/// Collects URLs from arguments and, optionally, a file or stdin (`-`).
pub fn collect_urls(mut urls: Vec<String>, file: Option<&Path>) -> Result<Vec<String>> {
    if let Some(file) = file {
        let text = if file == Path::new("-") {
            let mut buf = String::new();
            std::io::stdin().read_to_string(&mut buf)?;
            buf
        } else {
            std::fs::read_to_string(file)?
        };
        urls.extend(parse_url_list(&text));
    }
    Ok(urls
        .into_iter()
        .map(|u| u.trim().to_string())
        .filter(|u| !u.is_empty())
        .collect())
}

/// Submits URLs as a new session.
pub async fn urls(client: &DocaiClient, urls: Vec<String>, file: Option<&Path>) -> Result<()> {
    let urls = collect_urls(urls, file)?;
    let id = client.submit_urls(&urls).await?;
    println!("{} {}", "Created session".green(), id.cyan());
    Ok(())
}

/// Prints processing status, optionally polling until ready.
pub async fn status(client: &DocaiClient, session: &str, wait: bool, interval: u64) -> Result<()> {
    if wait && interval == 0 {
        return Err(DocaiError::InvalidInput("interval must be greater than 0".to_string()).into());
    }
    loop {
        match client.status(session).await? {
            ProcessingState::Ready => {
                println!("{} {}", session.cyan(), "is ready".green());
                return Ok(());
            }
            ProcessingState::Pending if wait => {
                tracing::debug!(session_id = session, "Still processing");
                tokio::time::sleep(Duration::from_secs(interval)).await;
            }
            ProcessingState::Pending => {
                println!("{} {}", session.cyan(), "is still processing".yellow());
                return Ok(());
            }
        }
    }
}

/// Prints the session summary.
pub async fn summarize(client: &DocaiClient, session: &str) -> Result<()> {
    client.open_session(session).await?;
    let summary = client.summarize(session).await?;
    println!("{}\n{}", "Summary:".bold(), summary.text);
    Ok(())
}

/// Asks one question and prints the answer with its sources.
pub async fn ask(
    client: &DocaiClient,
    session: &str,
    question: &str,
    preview_chars: usize,
) -> Result<()> {
    client.open_session(session).await?;
    let reply = client.ask(session, question).await?;
    render::print_turn(&reply, preview_chars);
    Ok(())
}
