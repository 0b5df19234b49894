//! Wire types for the Document AI backend
//!
//! Field names match the backend's JSON exactly; Rust-side names are used
//! only where serde renames them.

use serde::{Deserialize, Serialize};

use crate::sessions::Session;

/// Body of `POST /login` and `POST /register`.
#[derive(Debug, Clone, Serialize)]
pub struct CredentialsRequest<'a> {
    /// Account name.
    pub username: &'a str,
    /// Account password, sent as-is.
    pub password: &'a str,
}

/// Success body of `POST /login` and `POST /register`.
#[derive(Debug, Clone, Deserialize)]
pub struct TokenResponse {
    /// Bearer token.
    pub access_token: String,
    /// Token scheme reported by the server.
    #[serde(default)]
    pub token_type: Option<String>,
}

/// Success body of `GET /me`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    /// Server-side user id.
    pub id: i64,
    /// Account name.
    pub username: String,
}

/// Body of `POST /process-urls`.
#[derive(Debug, Clone, Serialize)]
pub struct ProcessUrlsRequest<'a> {
    /// One to five absolute URLs, in input order.
    pub urls: &'a [String],
}

/// Success body of `POST /process-pdf` and `POST /process-urls`.
#[derive(Debug, Clone, Deserialize)]
pub struct ProcessResponse {
    /// Identifier of the session created (or reused) for the document.
    pub session_id: String,
    /// Human-readable status message.
    #[serde(default)]
    pub message: String,
}

/// Body of `POST /query`.
#[derive(Debug, Clone, Serialize)]
pub struct QueryRequest<'a> {
    /// The user's question.
    pub query: &'a str,
    /// Session the question is about.
    pub session_id: &'a str,
}

/// One evidence citation attached to an answer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Citation {
    /// 1-based rank of the source chunk.
    pub index: u32,
    /// Text excerpt of the source chunk, verbatim.
    pub preview: String,
}

/// Success body of `POST /query`.
#[derive(Debug, Clone, Deserialize)]
pub struct QueryResponse {
    /// Answer text.
    pub answer: String,
    /// Supporting sources, in the server's order.
    #[serde(default)]
    pub sources: Vec<Citation>,
}

/// Body of `POST /summarize-pdf`.
#[derive(Debug, Clone, Serialize)]
pub struct SummarizeRequest<'a> {
    /// Session to summarize.
    pub session_id: &'a str,
}

/// Success body of `POST /summarize-pdf`.
#[derive(Debug, Clone, Deserialize)]
pub struct SummaryResponse {
    /// Summary text.
    pub summary: String,
}

/// Success body of `GET /my-sessions`.
#[derive(Debug, Clone, Deserialize)]
pub struct SessionsResponse {
    /// Sessions owned by the caller, in server order.
    pub sessions: Vec<Session>,
}

/// Success body of `GET /load-session/{id}`.
#[derive(Debug, Clone, Deserialize)]
pub struct LoadSessionResponse {
    /// Human-readable status message.
    #[serde(default)]
    pub message: String,
    /// The session that was loaded.
    pub session_id: String,
}

/// Success body of `GET /status/{id}`.
#[derive(Debug, Clone, Deserialize)]
pub struct StatusResponse {
    /// `"complete"` once the document is indexed, `"not_found"` otherwise.
    pub status: String,
}
