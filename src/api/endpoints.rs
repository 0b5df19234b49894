//! Typed wrappers for each backend endpoint
//!
//! | Endpoint              | Method | Body                      |
//! |-----------------------|--------|---------------------------|
//! | `/login`              | POST   | `{username, password}`    |
//! | `/register`           | POST   | `{username, password}`    |
//! | `/me`                 | GET    | --                        |
//! | `/process-pdf`        | POST   | multipart `file`, `session_id?` |
//! | `/process-urls`       | POST   | `{urls}`                  |
//! | `/query`              | POST   | `{query, session_id}`     |
//! | `/summarize-pdf`      | POST   | `{session_id}`            |
//! | `/my-sessions`        | GET    | --                        |
//! | `/load-session/{id}`  | GET    | --                        |
//! | `/status/{id}`        | GET    | --                        |

use reqwest::Method;
use serde_json::Value;

use super::types::{
    CredentialsRequest, LoadSessionResponse, ProcessResponse, ProcessUrlsRequest, QueryRequest,
    QueryResponse, StatusResponse, SummarizeRequest, SummaryResponse, TokenResponse, UserProfile,
};
use super::{encode_segment, ApiClient, ApiResult, MultipartField, RequestBody};

impl ApiClient {
    /// `POST /login`
    pub async fn login(&self, username: &str, password: &str) -> ApiResult<TokenResponse> {
        let body = RequestBody::json(&CredentialsRequest { username, password })?;
        self.call("/login", Method::POST, body).await
    }

    /// `POST /register`
    pub async fn register(&self, username: &str, password: &str) -> ApiResult<TokenResponse> {
        let body = RequestBody::json(&CredentialsRequest { username, password })?;
        self.call("/register", Method::POST, body).await
    }

    /// `GET /me`
    pub async fn me(&self) -> ApiResult<UserProfile> {
        self.call("/me", Method::GET, RequestBody::Empty).await
    }

    /// `POST /process-pdf` as a multipart upload.
    ///
    /// The `file` part carries `media_type`; `session_id` is sent only when
    /// re-uploading into an existing session.
    pub async fn process_pdf(
        &self,
        bytes: Vec<u8>,
        filename: &str,
        media_type: &str,
        session_id: Option<&str>,
    ) -> ApiResult<ProcessResponse> {
        let mut fields = vec![MultipartField::File {
            name: "file".to_string(),
            filename: filename.to_string(),
            media_type: media_type.to_string(),
            bytes,
        }];
        if let Some(id) = session_id {
            fields.push(MultipartField::Text {
                name: "session_id".to_string(),
                value: id.to_string(),
            });
        }
        self.call("/process-pdf", Method::POST, RequestBody::Multipart(fields))
            .await
    }

    /// `POST /process-urls`
    pub async fn process_urls(&self, urls: &[String]) -> ApiResult<ProcessResponse> {
        let body = RequestBody::json(&ProcessUrlsRequest { urls })?;
        self.call("/process-urls", Method::POST, body).await
    }

    /// `POST /query`
    pub async fn query(&self, session_id: &str, query: &str) -> ApiResult<QueryResponse> {
        let body = RequestBody::json(&QueryRequest { query, session_id })?;
        self.call("/query", Method::POST, body).await
    }

    /// `POST /summarize-pdf`
    pub async fn summarize(&self, session_id: &str) -> ApiResult<SummaryResponse> {
        let body = RequestBody::json(&SummarizeRequest { session_id })?;
        self.call("/summarize-pdf", Method::POST, body).await
    }

    /// `GET /my-sessions`, returned undecoded so the caller can normalize a
    /// malformed listing instead of failing outright.
    pub async fn my_sessions(&self) -> ApiResult<Value> {
        self.call("/my-sessions", Method::GET, RequestBody::Empty)
            .await
    }

    /// `GET /load-session/{id}`
    pub async fn load_session(&self, session_id: &str) -> ApiResult<LoadSessionResponse> {
        let endpoint = format!("/load-session/{}", encode_segment(session_id));
        self.call(&endpoint, Method::GET, RequestBody::Empty).await
    }

    /// `GET /status/{id}`
    pub async fn session_status(&self, session_id: &str) -> ApiResult<StatusResponse> {
        let endpoint = format!("/status/{}", encode_segment(session_id));
        self.call(&endpoint, Method::GET, RequestBody::Empty).await
    }
}
