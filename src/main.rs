//! DocAI - command-line client for the Document AI service
//!
#![doc = "DocAI - command-line client for the Document AI service"]
#![doc = "Main entry point for the docai binary."]

use anyhow::Result;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use docai::cli::{Cli, Commands};
use docai::client::DocaiClient;
use docai::commands;
use docai::config::{Config, DEFAULT_CONFIG_PATH};

#[tokio::main]
async fn main() -> Result<()> {
    // Parse command line arguments
    let cli = Cli::parse_args();

    // Initialize tracing
    init_tracing(cli.verbose);

    // Load configuration
    let config_path = cli.config.as_deref().unwrap_or(DEFAULT_CONFIG_PATH);
    let config = Config::load(config_path, &cli)?;

    // Validate configuration
    config.validate()?;

    let client = DocaiClient::new(&config)?;
    let preview_chars = config.conversation.citation_preview_chars;

    // Execute command
    match cli.command {
        Commands::Login { username, password } => {
            commands::auth::login(&client, &username, password).await
        }
        Commands::Register { username, password } => {
            commands::auth::register(&client, &username, password).await
        }
        Commands::Logout => commands::auth::logout(&client),
        Commands::Whoami => commands::auth::whoami(&client).await,
        Commands::Sessions { json } => commands::sessions::list(&client, json).await,
        Commands::Upload { path, session } => {
            tracing::debug!("Uploading {}", path.display());
            commands::sessions::upload(&client, &path, session).await
        }
        Commands::Urls { urls, file } => {
            commands::sessions::urls(&client, urls, file.as_deref()).await
        }
        Commands::Status {
            session,
            wait,
            interval,
        } => commands::sessions::status(&client, &session, wait, interval).await,
        Commands::Summarize { session } => commands::sessions::summarize(&client, &session).await,
        Commands::Ask { session, question } => {
            commands::sessions::ask(&client, &session, &question, preview_chars).await
        }
        Commands::Chat { session } => {
            tracing::info!("Starting interactive chat mode");
            commands::chat::run_chat(&client, &config, session).await
        }
    }
}

/// Initialize tracing subscriber with environment filter
///
/// `RUST_LOG` wins when set; otherwise `docai=info`, or `docai=debug` with
/// `--verbose`. Logs go to stderr so command output stays pipeable.
fn init_tracing(verbose: bool) {
    let default_level = if verbose { "docai=debug" } else { "docai=info" };
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}
