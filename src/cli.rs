//! Command-line interface definition for DocAI
//!
//! This module defines the CLI structure using clap's derive API,
//! providing commands for authentication, document submission, session
//! management, and question answering.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// DocAI - ask questions about your documents
///
/// Upload a PDF or a handful of web pages, then summarize them or chat with
/// them through the Document AI backend.
#[derive(Parser, Debug, Clone)]
#[command(name = "docai")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = crate::config::DEFAULT_CONFIG_PATH)]
    pub config: Option<String>,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Override the backend base URL
    #[arg(long, global = true)]
    pub base_url: Option<String>,

    /// Command to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands for DocAI
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Log in and store the credential
    Login {
        /// Account name
        #[arg(short, long)]
        username: String,

        /// Password; prompted for when omitted
        #[arg(short, long, env = "DOCAI_PASSWORD", hide_env_values = true)]
        password: Option<String>,
    },

    /// Create an account and store the credential
    Register {
        /// Account name
        #[arg(short, long)]
        username: String,

        /// Password; prompted for when omitted
        #[arg(short, long, env = "DOCAI_PASSWORD", hide_env_values = true)]
        password: Option<String>,
    },

    /// Forget the stored credential
    Logout,

    /// Show the account behind the stored credential
    Whoami,

    /// List your sessions
    Sessions {
        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Upload a PDF, creating a new session
    Upload {
        /// Path to the PDF
        path: PathBuf,

        /// Add the document to an existing session instead
        #[arg(short, long)]
        session: Option<String>,
    },

    /// Submit up to five web pages as a new session
    Urls {
        /// URLs to process, in order
        urls: Vec<String>,

        /// Read newline-separated URLs from a file ("-" for stdin)
        #[arg(short, long)]
        file: Option<PathBuf>,
    },

    /// Check whether a session's documents are indexed
    Status {
        /// Session id
        session: String,

        /// Poll until the session is ready
        #[arg(short, long)]
        wait: bool,

        /// Seconds between polls when waiting
        #[arg(long, default_value_t = 2)]
        interval: u64,
    },

    /// Summarize a session's document
    Summarize {
        /// Session id
        session: String,
    },

    /// Ask a single question about a session
    Ask {
        /// Session id
        session: String,

        /// The question
        question: String,
    },

    /// Start an interactive question/answer loop
    Chat {
        /// Session to open; pick from the listing when omitted
        #[arg(short, long)]
        session: Option<String>,
    },
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }
}
