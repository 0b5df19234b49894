//! Document sessions
//!
//! A session is the server-side unit of processing for one uploaded PDF or
//! one set of URLs. The client never mutates a session; it observes status
//! and title by re-fetching.
//!
//! - [`registry`]  -- lists owned sessions and tracks the active one
//! - [`ingestion`] -- submits documents and resumes existing sessions
//! - [`events`]    -- lifecycle notifications from ingestion to the registry

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

pub mod events;
pub mod ingestion;
pub mod registry;

pub use events::SessionEvent;
pub use ingestion::{PdfUpload, ProcessingState, SessionIngestion};
pub use registry::{SessionListing, SessionRegistry};

/// Kind of source material a session was created from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    /// A single uploaded PDF.
    Pdf,
    /// One to five web pages.
    Url,
}

impl std::fmt::Display for SourceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SourceKind::Pdf => write!(f, "pdf"),
            SourceKind::Url => write!(f, "url"),
        }
    }
}

/// Server-driven processing status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionStatus {
    /// Document is still being indexed.
    Processing,
    /// Document is ready for questions and summaries.
    Complete,
    /// Processing failed server-side.
    Error,
}

impl std::fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SessionStatus::Processing => write!(f, "Processing"),
            SessionStatus::Complete => write!(f, "Complete"),
            SessionStatus::Error => write!(f, "Error"),
        }
    }
}

/// A session owned by the authenticated user, as listed by `/my-sessions`.
///
/// # Examples
///
/// ```
/// use docai::sessions::{Session, SessionStatus, SourceKind};
///
/// let session: Session = serde_json::from_str(
///     r#"{"session_id":"pdf_1","created_at":"2024-05-01T10:00:00","title":null,"type":"pdf","status":"complete"}"#,
/// ).unwrap();
/// assert_eq!(session.id, "pdf_1");
/// assert_eq!(session.source_kind, SourceKind::Pdf);
/// assert_eq!(session.status, SessionStatus::Complete);
/// assert_eq!(session.display_title(), "pdf_1");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    /// Opaque, server-assigned, unique identifier.
    #[serde(rename = "session_id")]
    pub id: String,

    /// Creation time. Naive server timestamps are read as UTC.
    #[serde(deserialize_with = "deserialize_timestamp")]
    pub created_at: DateTime<Utc>,

    /// Human-readable title; empty when the server has none.
    #[serde(default, deserialize_with = "deserialize_nullable_string")]
    pub title: String,

    /// What the session was created from.
    #[serde(rename = "type")]
    pub source_kind: SourceKind,

    /// Processing status at the time of listing.
    pub status: SessionStatus,
}

impl Session {
    /// Title for display, falling back to the id.
    pub fn display_title(&self) -> &str {
        if self.title.trim().is_empty() {
            &self.id
        } else {
            &self.title
        }
    }
}

/// Parses an RFC 3339 timestamp, or a naive ISO-8601 one assumed to be UTC.
///
/// # Examples
///
/// ```
/// use docai::sessions::parse_timestamp;
///
/// assert!(parse_timestamp("2024-05-01T10:00:00+02:00").is_some());
/// assert!(parse_timestamp("2024-05-01T10:00:00.123456").is_some());
/// assert!(parse_timestamp("2024-05-01 10:00:00").is_some());
/// assert!(parse_timestamp("yesterday").is_none());
/// ```
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .map(|naive| naive.and_utc())
}

fn deserialize_timestamp<'de, D>(deserializer: D) -> std::result::Result<DateTime<Utc>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse_timestamp(&raw)
        .ok_or_else(|| serde::de::Error::custom(format!("invalid timestamp: {}", raw)))
}

fn deserialize_nullable_string<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, Timelike};

    #[test]
    fn test_session_wire_format_roundtrip_fields() {
        let session: Session = serde_json::from_str(
            r#"{"session_id":"url_9","created_at":"2024-01-02T03:04:05Z","title":"Docs","type":"url","status":"processing"}"#,
        )
        .unwrap();
        assert_eq!(session.id, "url_9");
        assert_eq!(session.title, "Docs");
        assert_eq!(session.source_kind, SourceKind::Url);
        assert_eq!(session.status, SessionStatus::Processing);
        assert_eq!(session.created_at.year(), 2024);
        assert_eq!(session.created_at.hour(), 3);

        let json = serde_json::to_value(&session).unwrap();
        assert_eq!(json["session_id"], "url_9");
        assert_eq!(json["type"], "url");
    }

    #[test]
    fn test_missing_title_defaults_to_empty() {
        let session: Session = serde_json::from_str(
            r#"{"session_id":"s","created_at":"2024-01-02T03:04:05","type":"pdf","status":"error"}"#,
        )
        .unwrap();
        assert_eq!(session.title, "");
        assert_eq!(session.display_title(), "s");
    }

    #[test]
    fn test_unknown_status_is_rejected() {
        let result: std::result::Result<Session, _> = serde_json::from_str(
            r#"{"session_id":"s","created_at":"2024-01-02T03:04:05","type":"pdf","status":"weird"}"#,
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_naive_timestamp_is_utc() {
        let ts = parse_timestamp("2024-05-01T10:00:00").unwrap();
        assert_eq!(ts.to_rfc3339(), "2024-05-01T10:00:00+00:00");
    }

    #[test]
    fn test_offset_timestamp_converted_to_utc() {
        let ts = parse_timestamp("2024-05-01T10:00:00+02:00").unwrap();
        assert_eq!(ts.hour(), 8);
    }

    #[test]
    fn test_status_display() {
        assert_eq!(SessionStatus::Complete.to_string(), "Complete");
        assert_eq!(SourceKind::Pdf.to_string(), "pdf");
    }
}
