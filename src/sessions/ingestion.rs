//! Document submission and session resumption
//!
//! [`SessionIngestion`] is stateless per call. Inputs are validated locally
//! before any request is made; on success the new (or resumed) session id is
//! announced with a [`SessionEvent`] so the registry accepts it as
//! selectable. On failure nothing changes and the backend's message is
//! surfaced unchanged.
//!
//! Preventing double submission while a call is in flight is the caller's
//! job; [`DocaiClient`](crate::client::DocaiClient) does it for the CLI.

use std::path::Path;

use tokio::sync::broadcast;
use url::Url;

use super::events::SessionEvents;
use super::{SessionEvent, SourceKind};
use crate::api::ApiClient;
use crate::error::{DocaiError, Result};

/// Media type every PDF upload must declare.
pub const PDF_MEDIA_TYPE: &str = "application/pdf";

/// Maximum number of URLs per submission.
pub const MAX_URLS: usize = 5;

/// A PDF ready to upload.
#[derive(Debug, Clone)]
pub struct PdfUpload {
    /// File contents.
    pub bytes: Vec<u8>,
    /// File name reported to the server.
    pub filename: String,
    /// Declared media type; must be `application/pdf`.
    pub media_type: String,
    /// Existing session to upload into, if any.
    pub session_id: Option<String>,
}

impl PdfUpload {
    /// Creates an upload for a new session.
    pub fn new(bytes: Vec<u8>, filename: impl Into<String>, media_type: impl Into<String>) -> Self {
        Self {
            bytes,
            filename: filename.into(),
            media_type: media_type.into(),
            session_id: None,
        }
    }

    /// Targets an existing session instead of creating a new one.
    pub fn into_session(mut self, session_id: impl Into<String>) -> Self {
        self.session_id = Some(session_id.into());
        self
    }

    /// Reads a file from disk, declaring its media type from the extension.
    ///
    /// # Errors
    ///
    /// Returns [`DocaiError::Io`] if the file cannot be read.
    pub fn from_path(path: &Path) -> Result<Self> {
        let bytes = std::fs::read(path).map_err(DocaiError::Io)?;
        let filename = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "document.pdf".to_string());
        Ok(Self::new(bytes, filename, media_type_for_path(path)))
    }

    fn validate(&self) -> Result<()> {
        if self.bytes.is_empty() {
            return Err(DocaiError::InvalidInput(format!("{} is empty", self.filename)).into());
        }
        if !is_pdf_media_type(&self.media_type) {
            return Err(DocaiError::InvalidInput(format!(
                "{} is not a PDF (media type {})",
                self.filename, self.media_type
            ))
            .into());
        }
        Ok(())
    }
}

/// Media type implied by a file extension.
///
/// # Examples
///
/// ```
/// use std::path::Path;
/// use docai::sessions::ingestion::media_type_for_path;
///
/// assert_eq!(media_type_for_path(Path::new("Report.PDF")), "application/pdf");
/// assert_eq!(media_type_for_path(Path::new("notes.txt")), "application/octet-stream");
/// ```
pub fn media_type_for_path(path: &Path) -> &'static str {
    match path.extension().and_then(|e| e.to_str()) {
        Some(ext) if ext.eq_ignore_ascii_case("pdf") => PDF_MEDIA_TYPE,
        _ => "application/octet-stream",
    }
}

/// `true` for `application/pdf`, ignoring case and parameters.
pub fn is_pdf_media_type(media_type: &str) -> bool {
    media_type
        .split(';')
        .next()
        .map(|essence| essence.trim().eq_ignore_ascii_case(PDF_MEDIA_TYPE))
        .unwrap_or(false)
}

/// Splits newline-separated input into URLs, trimming and dropping blanks.
///
/// # Examples
///
/// ```
/// use docai::sessions::ingestion::parse_url_list;
///
/// let urls = parse_url_list(" https://a.com \n\n https://b.com\n");
/// assert_eq!(urls, vec!["https://a.com", "https://b.com"]);
/// ```
pub fn parse_url_list(text: &str) -> Vec<String> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}

/// Checks the count bound and that every URL is absolute with a host.
///
/// Duplicates are allowed. The error lists every invalid URL.
pub fn validate_urls(urls: &[String]) -> Result<()> {
    if urls.is_empty() || urls.len() > MAX_URLS {
        return Err(DocaiError::InvalidInput(format!(
            "expected between 1 and {} URLs, got {}",
            MAX_URLS,
            urls.len()
        ))
        .into());
    }

    let invalid: Vec<&str> = urls
        .iter()
        .filter(|raw| !is_absolute_url(raw))
        .map(String::as_str)
        .collect();
    if !invalid.is_empty() {
        return Err(
            DocaiError::InvalidInput(format!("invalid URL(s): {}", invalid.join(", "))).into(),
        );
    }
    Ok(())
}

fn is_absolute_url(raw: &str) -> bool {
    Url::parse(raw)
        .map(|url| url.has_host())
        .unwrap_or(false)
}

/// Result of polling `/status/{id}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessingState {
    /// Indexed and ready for questions.
    Ready,
    /// Not indexed yet (still processing, or not loaded on the server).
    Pending,
}

/// Submits documents and resumes sessions.
#[derive(Debug, Clone)]
pub struct SessionIngestion {
    api: ApiClient,
    events: SessionEvents,
}

impl SessionIngestion {
    /// Creates an ingestion service publishing on `events`.
    pub fn new(api: ApiClient, events: SessionEvents) -> Self {
        Self { api, events }
    }

    /// Subscribes to session lifecycle events.
    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.events.subscribe()
    }

    /// Uploads a PDF and returns the new session id.
    ///
    /// # Errors
    ///
    /// [`DocaiError::InvalidInput`] for an empty file or a non-PDF media
    /// type (no request is made); [`DocaiError::NotAuthenticated`] without a
    /// credential; otherwise the backend failure.
    pub async fn submit_pdf(&self, upload: PdfUpload) -> Result<String> {
        upload.validate()?;
        self.api.auth().require()?;

        tracing::info!(
            filename = %upload.filename,
            bytes = upload.bytes.len(),
            "Submitting PDF"
        );
        let response = self
            .api
            .process_pdf(
                upload.bytes,
                &upload.filename,
                &upload.media_type,
                upload.session_id.as_deref(),
            )
            .await?;

        self.announce(SessionEvent::Created {
            id: response.session_id.clone(),
            source: SourceKind::Pdf,
        });
        Ok(response.session_id)
    }

    /// Submits one to five URLs, in order, and returns the new session id.
    ///
    /// # Errors
    ///
    /// [`DocaiError::InvalidInput`] for a count outside `1..=5` or any
    /// malformed URL (no request is made); otherwise as
    /// [`submit_pdf`](Self::submit_pdf).
    pub async fn submit_urls(&self, urls: &[String]) -> Result<String> {
        validate_urls(urls)?;
        self.api.auth().require()?;

        tracing::info!(count = urls.len(), "Submitting URLs");
        let response = self.api.process_urls(urls).await?;

        self.announce(SessionEvent::Created {
            id: response.session_id.clone(),
            source: SourceKind::Url,
        });
        Ok(response.session_id)
    }

    /// Validates server-side that `id` can be resumed and announces it.
    pub async fn resume(&self, id: &str) -> Result<String> {
        if id.trim().is_empty() {
            return Err(DocaiError::InvalidInput("session id is empty".to_string()).into());
        }
        self.api.auth().require()?;

        let response = self.api.load_session(id).await?;
        let resumed = if response.session_id.is_empty() {
            id.to_string()
        } else {
            response.session_id
        };

        tracing::info!(session_id = %resumed, "Session resumed");
        self.announce(SessionEvent::Resumed {
            id: resumed.clone(),
        });
        Ok(resumed)
    }

    /// Polls whether the session's document is indexed.
    pub async fn processing_status(&self, id: &str) -> Result<ProcessingState> {
        self.api.auth().require()?;
        let response = self.api.session_status(id).await?;
        Ok(match response.status.as_str() {
            "complete" => ProcessingState::Ready,
            _ => ProcessingState::Pending,
        })
    }

    pub(crate) fn announce(&self, event: SessionEvent) {
        self.events.send(event);
    }
}
