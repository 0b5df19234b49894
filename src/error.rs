//! Error types for DocAI
//!
//! This module defines the error taxonomy used throughout the client,
//! using `thiserror` for ergonomic error handling. Failures derived from a
//! backend round trip are carried by [`ApiError`]; everything raised locally
//! (validation, missing credentials, unknown sessions) is a [`DocaiError`].

use thiserror::Error;

pub use crate::api::ApiError;

/// Coarse classification of every failure the client can raise
///
/// Callers that need to branch on a failure (retry, re-login, show a form
/// error) match on the kind rather than on concrete variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Local validation failed; no network call was made
    InvalidInput,
    /// Missing, rejected, or expired credential
    AuthenticationFailure,
    /// Operation on a session id that was never observed or resumed
    UnknownSession,
    /// Transport failure with no HTTP response
    NetworkFailure,
    /// Non-2xx response from the backend
    ServerError,
    /// Local infrastructure failure (configuration, storage, I/O)
    Internal,
}

/// Main error type for DocAI operations
#[derive(Error, Debug)]
pub enum DocaiError {
    /// Local input validation errors
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// No credential is available for an authenticated operation
    #[error("Not authenticated: log in first")]
    NotAuthenticated,

    /// Session id was never returned by a listing, created, or resumed
    #[error("Unknown session: {0}")]
    UnknownSession(String),

    /// A question is already awaiting its answer in this session
    #[error("A reply is still pending for session {0}")]
    ReplyPending(String),

    /// A document submission is already in flight
    #[error("A submission is already in progress")]
    SubmissionInFlight,

    /// Backend failure, with the server's message when one was provided
    #[error(transparent)]
    Api(#[from] ApiError),

    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Credential storage errors
    #[error("Storage error: {0}")]
    Storage(String),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// YAML parsing errors
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// Keyring/credential storage errors
    #[error("Keyring error: {0}")]
    Keyring(#[from] keyring::Error),
}

impl DocaiError {
    /// Returns the taxonomy bucket this error belongs to
    ///
    /// # Examples
    ///
    /// ```
    /// use docai::error::{DocaiError, ErrorKind};
    ///
    /// let err = DocaiError::InvalidInput("empty question".to_string());
    /// assert_eq!(err.kind(), ErrorKind::InvalidInput);
    /// ```
    pub fn kind(&self) -> ErrorKind {
        match self {
            DocaiError::InvalidInput(_)
            | DocaiError::ReplyPending(_)
            | DocaiError::SubmissionInFlight => ErrorKind::InvalidInput,
            DocaiError::NotAuthenticated => ErrorKind::AuthenticationFailure,
            DocaiError::UnknownSession(_) => ErrorKind::UnknownSession,
            DocaiError::Api(api) => api.kind(),
            DocaiError::Config(_)
            | DocaiError::Storage(_)
            | DocaiError::Io(_)
            | DocaiError::Serialization(_)
            | DocaiError::Yaml(_)
            | DocaiError::Keyring(_) => ErrorKind::Internal,
        }
    }
}

/// Classifies an `anyhow::Error` produced by this crate
///
/// Returns `None` when the error did not originate from DocAI.
///
/// # Examples
///
/// ```
/// use docai::error::{kind_of, DocaiError, ErrorKind};
///
/// let err: anyhow::Error = DocaiError::UnknownSession("s9".to_string()).into();
/// assert_eq!(kind_of(&err), Some(ErrorKind::UnknownSession));
/// ```
pub fn kind_of(err: &anyhow::Error) -> Option<ErrorKind> {
    if let Some(docai) = err.downcast_ref::<DocaiError>() {
        return Some(docai.kind());
    }
    err.downcast_ref::<ApiError>().map(ApiError::kind)
}

/// Result type alias for DocAI operations
///
/// This is a convenience alias that uses `anyhow::Error` as the error type,
/// allowing for rich error context and easy error propagation.
pub type Result<T> = anyhow::Result<T>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_input_display() {
        let error = DocaiError::InvalidInput("no urls".to_string());
        assert_eq!(error.to_string(), "Invalid input: no urls");
    }

    #[test]
    fn test_api_error_display_is_server_message_verbatim() {
        let error = DocaiError::Api(ApiError::new(Some(400), "Username already registered"));
        assert_eq!(error.to_string(), "Username already registered");
    }

    #[test]
    fn test_kind_for_local_errors() {
        assert_eq!(
            DocaiError::InvalidInput(String::new()).kind(),
            ErrorKind::InvalidInput
        );
        assert_eq!(
            DocaiError::ReplyPending("s1".into()).kind(),
            ErrorKind::InvalidInput
        );
        assert_eq!(
            DocaiError::SubmissionInFlight.kind(),
            ErrorKind::InvalidInput
        );
        assert_eq!(
            DocaiError::NotAuthenticated.kind(),
            ErrorKind::AuthenticationFailure
        );
        assert_eq!(
            DocaiError::UnknownSession("s1".into()).kind(),
            ErrorKind::UnknownSession
        );
        assert_eq!(
            DocaiError::Config("bad".into()).kind(),
            ErrorKind::Internal
        );
    }

    #[test]
    fn test_kind_delegates_to_api_error() {
        let unauthorized = DocaiError::Api(ApiError::new(Some(401), "Invalid token"));
        assert_eq!(unauthorized.kind(), ErrorKind::AuthenticationFailure);

        let offline = DocaiError::Api(ApiError::network("connection refused"));
        assert_eq!(offline.kind(), ErrorKind::NetworkFailure);

        let server = DocaiError::Api(ApiError::new(Some(500), "boom"));
        assert_eq!(server.kind(), ErrorKind::ServerError);
    }

    #[test]
    fn test_kind_of_downcasts_both_error_types() {
        let local: anyhow::Error = DocaiError::NotAuthenticated.into();
        assert_eq!(kind_of(&local), Some(ErrorKind::AuthenticationFailure));

        let remote: anyhow::Error = ApiError::new(Some(404), "Session not found").into();
        assert_eq!(kind_of(&remote), Some(ErrorKind::ServerError));

        let foreign = anyhow::anyhow!("something else");
        assert_eq!(kind_of(&foreign), None);
    }

    #[test]
    fn test_io_error_conversion() {
        let io_error = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let error: DocaiError = io_error.into();
        assert!(matches!(error, DocaiError::Io(_)));
    }

    #[test]
    fn test_json_error_conversion() {
        let json_error = serde_json::from_str::<serde_json::Value>("{invalid json}").unwrap_err();
        let error: DocaiError = json_error.into();
        assert!(matches!(error, DocaiError::Serialization(_)));
    }

    #[test]
    fn test_error_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<DocaiError>();
    }
}
