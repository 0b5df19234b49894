//! HTTP gateway to the Document AI backend
//!
//! [`ApiClient`] is the only component that talks to the network. Every
//! request goes through [`ApiClient::call`], which:
//!
//! - attaches `Authorization: Bearer <token>` when the [`AuthSession`] holds a
//!   usable credential, and omits the header entirely otherwise;
//! - encodes the body as JSON (`Content-Type: application/json`) or as a
//!   multipart form (content type and boundary left to the transport);
//! - turns any status outside `200..=299` into an [`ApiError`] carrying the
//!   server's `message`/`detail` text, or `"request failed"` when the body
//!   has none;
//! - resolves `204 No Content` to an empty value instead of a parse error.
//!
//! There is no retry, queueing, or cancellation here; callers decide.
//! Typed wrappers for each backend endpoint live in [`endpoints`].

use std::time::Duration;

use reqwest::{Method, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::Value;
use thiserror::Error;

use crate::auth::AuthSession;
use crate::error::{DocaiError, ErrorKind, Result};

pub mod endpoints;
pub mod types;

/// Message used when a failed response carries no readable reason.
pub const GENERIC_FAILURE_MESSAGE: &str = "request failed";

/// Result alias for raw backend calls.
pub type ApiResult<T> = std::result::Result<T, ApiError>;

// ---------------------------------------------------------------------------
// ApiError
// ---------------------------------------------------------------------------

/// A failed backend call.
///
/// `status` is `None` when no HTTP response was received (connection
/// refused, DNS failure, body read interrupted). The error is `Clone` so a
/// single in-flight request can hand the same outcome to several waiters.
///
/// # Examples
///
/// ```
/// use docai::api::ApiError;
/// use docai::error::ErrorKind;
///
/// let err = ApiError::new(Some(401), "Invalid credentials");
/// assert_eq!(err.kind(), ErrorKind::AuthenticationFailure);
/// assert_eq!(err.to_string(), "Invalid credentials");
/// ```
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{message}")]
pub struct ApiError {
    /// HTTP status, when a response was received.
    pub status: Option<u16>,
    /// Human-readable reason, verbatim from the server when available.
    pub message: String,
    /// Set when the request failed before it was sent.
    local: Option<ErrorKind>,
}

impl ApiError {
    /// Creates an error for a received response.
    pub fn new(status: Option<u16>, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
            local: None,
        }
    }

    /// Creates an error for a request that never produced a response.
    pub fn network(message: impl Into<String>) -> Self {
        Self::new(None, message)
    }

    /// Creates an error for a request that could not be built, so nothing
    /// was sent.
    pub fn local(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            status: None,
            message: message.into(),
            local: Some(kind),
        }
    }

    /// Classifies the failure.
    pub fn kind(&self) -> ErrorKind {
        if let Some(kind) = self.local {
            return kind;
        }
        match self.status {
            None => ErrorKind::NetworkFailure,
            Some(401) | Some(403) => ErrorKind::AuthenticationFailure,
            Some(_) => ErrorKind::ServerError,
        }
    }
}

// ---------------------------------------------------------------------------
// Request bodies
// ---------------------------------------------------------------------------

/// A single multipart form field.
#[derive(Debug, Clone)]
pub enum MultipartField {
    /// Plain text field.
    Text {
        /// Field name.
        name: String,
        /// Field value.
        value: String,
    },
    /// Binary file field with a declared media type.
    File {
        /// Field name.
        name: String,
        /// File name reported to the server.
        filename: String,
        /// Media type of the part, e.g. `application/pdf`.
        media_type: String,
        /// Raw file contents.
        bytes: Vec<u8>,
    },
}

/// Request payload and its encoding.
#[derive(Debug, Clone, Default)]
pub enum RequestBody {
    /// No body.
    #[default]
    Empty,
    /// UTF-8 JSON document.
    Json(Value),
    /// `multipart/form-data` fields, in order.
    Multipart(Vec<MultipartField>),
}

impl RequestBody {
    /// Serializes `value` into a JSON body.
    pub fn json<T: serde::Serialize>(value: &T) -> ApiResult<Self> {
        serde_json::to_value(value)
            .map(RequestBody::Json)
            .map_err(|e| {
                ApiError::local(
                    ErrorKind::Internal,
                    format!("failed to encode request body: {}", e),
                )
            })
    }

    fn into_form(fields: Vec<MultipartField>) -> ApiResult<reqwest::multipart::Form> {
        let mut form = reqwest::multipart::Form::new();
        for field in fields {
            form = match field {
                MultipartField::Text { name, value } => form.text(name, value),
                MultipartField::File {
                    name,
                    filename,
                    media_type,
                    bytes,
                } => {
                    let part = reqwest::multipart::Part::bytes(bytes)
                        .file_name(filename)
                        .mime_str(&media_type)
                        .map_err(|e| {
                            ApiError::local(
                                ErrorKind::InvalidInput,
                                format!("invalid media type {}: {}", media_type, e),
                            )
                        })?;
                    form.part(name, part)
                }
            };
        }
        Ok(form)
    }
}

// ---------------------------------------------------------------------------
// ApiClient
// ---------------------------------------------------------------------------

/// Single gateway for all backend calls.
///
/// Cloning is cheap; clones share the connection pool and the same
/// [`AuthSession`].
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
/// use docai::api::ApiClient;
/// use docai::auth::{AuthSession, MemoryCredentialStore};
///
/// let auth = AuthSession::new(Arc::new(MemoryCredentialStore::new()));
/// let api = ApiClient::new("http://localhost:8000", auth, None).unwrap();
/// assert_eq!(api.base_url(), "http://localhost:8000");
/// ```
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    auth: AuthSession,
}

impl ApiClient {
    /// Constructs a client targeting `base_url`.
    ///
    /// `timeout` is a transport setting applied by the underlying HTTP
    /// client; `None` leaves requests unbounded.
    ///
    /// # Errors
    ///
    /// Returns [`DocaiError::Config`] if `base_url` is not an absolute
    /// http(s) URL or the HTTP client cannot be initialised.
    pub fn new(base_url: &str, auth: AuthSession, timeout: Option<Duration>) -> Result<Self> {
        let parsed = url::Url::parse(base_url)
            .map_err(|e| DocaiError::Config(format!("Invalid base URL {}: {}", base_url, e)))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(DocaiError::Config(format!(
                "Base URL must use http or https: {}",
                base_url
            ))
            .into());
        }

        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let http = builder
            .build()
            .map_err(|e| DocaiError::Config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            auth,
        })
    }

    /// Backend base URL without a trailing slash.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// The credential holder this client reads from.
    pub fn auth(&self) -> &AuthSession {
        &self.auth
    }

    /// Issues one request and decodes the JSON response into `T`.
    ///
    /// # Arguments
    ///
    /// * `endpoint` - Path beginning with `/`, already percent-encoded.
    /// * `method` - HTTP method.
    /// * `body` - Payload and its encoding.
    ///
    /// # Errors
    ///
    /// Returns an [`ApiError`] for transport failures, any status outside
    /// `200..=299`, or a success body that does not decode into `T`.
    pub async fn call<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        method: Method,
        body: RequestBody,
    ) -> ApiResult<T> {
        let url = format!("{}{}", self.base_url, endpoint);
        let mut req = self.http.request(method.clone(), &url);

        match self.auth.current_credential() {
            Ok(Some(credential)) => {
                req = req.header(reqwest::header::AUTHORIZATION, credential.authorization_header());
            }
            Ok(None) => {}
            Err(e) => {
                tracing::warn!("Credential unavailable, sending {} {} unauthenticated: {}", method, endpoint, e);
            }
        }

        req = match body {
            RequestBody::Empty => req,
            RequestBody::Json(value) => req.json(&value),
            RequestBody::Multipart(fields) => req.multipart(RequestBody::into_form(fields)?),
        };

        tracing::debug!(%method, endpoint, "Sending backend request");

        let response = req.send().await.map_err(|e| {
            tracing::debug!(%method, endpoint, "Request failed before a response: {}", e);
            ApiError::network(format!("network error: {}", e))
        })?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| ApiError::network(format!("failed to read response body: {}", e)))?;

        if !status.is_success() {
            let message = extract_error_message(&text);
            tracing::debug!(%method, endpoint, status = status.as_u16(), %message, "Backend rejected request");
            return Err(ApiError::new(Some(status.as_u16()), message));
        }

        if status == StatusCode::NO_CONTENT || text.trim().is_empty() {
            return empty_result(status);
        }

        serde_json::from_str(&text).map_err(|e| {
            ApiError::new(
                Some(status.as_u16()),
                format!("invalid response body: {}", e),
            )
        })
    }
}

/// Decodes the "empty result" for bodiless successes.
///
/// `()`/`Option`/`Value` decode from `null`; structs whose fields all have
/// defaults decode from `{}`.
fn empty_result<T: DeserializeOwned>(status: StatusCode) -> ApiResult<T> {
    serde_json::from_value(Value::Null)
        .or_else(|_| serde_json::from_value(Value::Object(serde_json::Map::new())))
        .map_err(|e| {
            ApiError::new(
                Some(status.as_u16()),
                format!("expected a response body: {}", e),
            )
        })
}

/// Pulls a human-readable reason out of an error body.
///
/// Looks at `message` first, then FastAPI's `detail` (a string, or a list of
/// validation items with `msg`). Falls back to [`GENERIC_FAILURE_MESSAGE`].
///
/// # Examples
///
/// ```
/// use docai::api::extract_error_message;
///
/// assert_eq!(extract_error_message(r#"{"detail":"Session not found"}"#), "Session not found");
/// assert_eq!(extract_error_message("<html>502</html>"), "request failed");
/// ```
pub fn extract_error_message(body: &str) -> String {
    serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|value| message_from_value(&value))
        .unwrap_or_else(|| GENERIC_FAILURE_MESSAGE.to_string())
}

fn message_from_value(value: &Value) -> Option<String> {
    if let Some(message) = value.get("message").and_then(Value::as_str) {
        if !message.is_empty() {
            return Some(message.to_string());
        }
    }

    match value.get("detail")? {
        Value::String(detail) if !detail.is_empty() => Some(detail.clone()),
        Value::Array(items) => {
            let msgs: Vec<&str> = items
                .iter()
                .filter_map(|item| item.get("msg").and_then(Value::as_str))
                .collect();
            if msgs.is_empty() {
                None
            } else {
                Some(msgs.join("; "))
            }
        }
        _ => None,
    }
}

/// Percent-encodes a single path segment (RFC 3986 unreserved set kept).
pub(crate) fn encode_segment(segment: &str) -> String {
    urlencoding::encode(segment).into_owned()
}
