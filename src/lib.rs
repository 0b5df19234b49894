//! DocAI - client library for the Document AI service
//!
//! This library implements the client side of a document question-answering
//! service: authenticating, submitting PDFs or web pages as processing
//! sessions, and holding an ordered question/answer transcript and a cached
//! summary per session.
//!
//! # Architecture
//!
//! The library is organized into the following modules:
//!
//! - `auth`: bearer credential storage and the authentication session
//! - `api`: the single HTTP gateway to the backend, plus wire types
//! - `sessions`: session listing, active-session tracking, and ingestion
//! - `conversation`: per-session transcripts with strict question/answer ordering
//! - `summary`: lazily generated, single-flight per-session summaries
//! - `client`: facade wiring the components together
//! - `config`: configuration management and validation
//! - `error`: error types and result aliases
//! - `cli` / `commands`: command-line interface and handlers
//!
//! # Example
//!
//! ```no_run
//! use docai::{Config, DocaiClient};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::default();
//!     config.validate()?;
//!
//!     let client = DocaiClient::new(&config)?;
//!     client.login("ada", "secret").await?;
//!     let id = client
//!         .submit_urls(&["https://www.rust-lang.org/".to_string()])
//!         .await?;
//!     client.select_session(&id)?;
//!     let reply = client.ask(&id, "What is this page about?").await?;
//!     println!("{}", reply.text);
//!     Ok(())
//! }
//! ```

pub mod api;
pub mod auth;
pub mod cli;
pub mod client;
pub mod commands;
pub mod config;
pub mod conversation;
pub mod error;
pub mod sessions;
pub mod summary;

// Re-export commonly used types
pub use api::{ApiClient, ApiError};
pub use auth::{AuthSession, Credential, CredentialStore};
pub use client::DocaiClient;
pub use config::Config;
pub use conversation::{ConversationLog, ConversationTurn, Role};
pub use error::{DocaiError, ErrorKind, Result};
pub use sessions::{Session, SessionIngestion, SessionRegistry};
pub use summary::{Summary, SummaryCache};
