//! Application facade tying the client components together
//!
//! [`DocaiClient`] owns one instance of each component, wired over a single
//! [`ApiClient`] and credential store, and implements the coordination that
//! spans components: greeting and resetting transcripts when the active
//! session changes, rejecting overlapping submissions, and the full state
//! reset on logout.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::api::types::UserProfile;
use crate::api::ApiClient;
use crate::auth::{
    AuthSession, Credential, CredentialStore, FileCredentialStore, KeyringCredentialStore,
    MemoryCredentialStore,
};
use crate::config::{Config, CredentialBackend};
use crate::conversation::{ConversationLog, ConversationTurn};
use crate::error::{DocaiError, Result};
use crate::sessions::{
    events, PdfUpload, ProcessingState, SessionIngestion, SessionListing, SessionRegistry,
};
use crate::summary::{Summary, SummaryCache};

/// Builds the credential store selected by configuration
///
/// # Errors
///
/// Returns [`DocaiError::Storage`] if the `file` backend has no explicit
/// path and no user data directory can be determined.
pub fn credential_store(config: &Config) -> Result<Arc<dyn CredentialStore>> {
    let store: Arc<dyn CredentialStore> = match config.credentials.backend {
        CredentialBackend::File => match &config.credentials.path {
            Some(path) => Arc::new(FileCredentialStore::new(path.clone())),
            None => Arc::new(FileCredentialStore::in_data_dir()?),
        },
        CredentialBackend::Keyring => {
            Arc::new(KeyringCredentialStore::new(&config.server.base_url))
        }
        CredentialBackend::Memory => Arc::new(MemoryCredentialStore::new()),
    };
    Ok(store)
}

/// One authenticated user's view of the Document AI backend.
#[derive(Debug)]
pub struct DocaiClient {
    api: ApiClient,
    registry: Arc<SessionRegistry>,
    ingestion: SessionIngestion,
    conversations: ConversationLog,
    summaries: SummaryCache,
    submitting: AtomicBool,
}

impl DocaiClient {
    /// Creates a client using the configured credential backend.
    pub fn new(config: &Config) -> Result<Self> {
        Self::with_store(config, credential_store(config)?)
    }

    /// Creates a client over an explicit credential store.
    pub fn with_store(config: &Config, store: Arc<dyn CredentialStore>) -> Result<Self> {
        let auth = AuthSession::new(store);
        let api = ApiClient::new(&config.server.base_url, auth, config.server.timeout())?;

        let (tx, rx) = events::channel();
        let registry = Arc::new(SessionRegistry::new(api.clone(), rx));
        let ingestion = SessionIngestion::new(api.clone(), tx);
        let conversations =
            ConversationLog::new(api.clone(), Arc::clone(&registry), &config.conversation);
        let summaries = SummaryCache::new(api.clone(), Arc::clone(&registry));

        tracing::debug!(base_url = api.base_url(), "Client initialised");

        Ok(Self {
            api,
            registry,
            ingestion,
            conversations,
            summaries,
            submitting: AtomicBool::new(false),
        })
    }

    /// The underlying HTTP gateway.
    pub fn api(&self) -> &ApiClient {
        &self.api
    }

    /// Session listing and active pointer.
    pub fn registry(&self) -> &SessionRegistry {
        &self.registry
    }

    /// Per-session transcripts.
    pub fn conversations(&self) -> &ConversationLog {
        &self.conversations
    }

    /// Per-session summaries.
    pub fn summaries(&self) -> &SummaryCache {
        &self.summaries
    }

    /// `true` if a usable credential is stored.
    pub fn is_authenticated(&self) -> bool {
        self.api.auth().is_authenticated()
    }

    // ---------------------------------------------------------------------
    // Authentication
    // ---------------------------------------------------------------------

    /// Logs in and persists the credential.
    pub async fn login(&self, username: &str, password: &str) -> Result<Credential> {
        self.api.auth().login(&self.api, username, password).await
    }

    /// Registers, then persists the returned credential.
    pub async fn register(&self, username: &str, password: &str) -> Result<Credential> {
        self.api.auth().register(&self.api, username, password).await
    }

    /// The account behind the stored credential.
    pub async fn whoami(&self) -> Result<UserProfile> {
        self.api.auth().whoami(&self.api).await
    }

    /// Forgets the credential and every piece of per-user state.
    ///
    /// In-memory state is cleared even if the credential store fails; that
    /// failure is returned afterwards.
    pub fn logout(&self) -> Result<()> {
        self.registry.clear();
        self.conversations.clear_all();
        self.summaries.clear();
        let cleared = self.api.auth().clear();
        tracing::info!("Logged out");
        cleared
    }

    // ---------------------------------------------------------------------
    // Sessions
    // ---------------------------------------------------------------------

    /// Refreshes the session listing.
    pub async fn list_sessions(&self) -> SessionListing {
        self.registry.list_sessions().await
    }

    /// Makes `id` the active session.
    ///
    /// When the active session actually changes, the previous transcript is
    /// reset, or abandoned if its reply is still pending. The newly active
    /// session is greeted if it has no turns.
    pub fn select_session(&self, id: &str) -> Result<()> {
        let previous = self.registry.active_id();
        self.registry.select_active(id)?;

        if let Some(previous) = previous.filter(|p| p != id) {
            if self.conversations.reset(&previous).is_err() {
                self.conversations.abandon(&previous);
            }
        }
        self.conversations.greet(id);
        Ok(())
    }

    /// Resumes `id` server-side and makes it active.
    pub async fn open_session(&self, id: &str) -> Result<String> {
        let resumed = self.ingestion.resume(id).await?;
        self.select_session(&resumed)?;
        Ok(resumed)
    }

    /// Uploads a PDF.
    ///
    /// # Errors
    ///
    /// [`DocaiError::SubmissionInFlight`] while another submission from this
    /// client is still running; otherwise as
    /// [`SessionIngestion::submit_pdf`].
    pub async fn submit_pdf(&self, upload: PdfUpload) -> Result<String> {
        let _guard = self.begin_submission()?;
        self.ingestion.submit_pdf(upload).await
    }

    /// Submits one to five URLs. Rejects overlapping submissions like
    /// [`submit_pdf`](Self::submit_pdf).
    pub async fn submit_urls(&self, urls: &[String]) -> Result<String> {
        let _guard = self.begin_submission()?;
        self.ingestion.submit_urls(urls).await
    }

    /// Whether the session's documents are indexed.
    pub async fn status(&self, id: &str) -> Result<ProcessingState> {
        self.ingestion.processing_status(id).await
    }

    // ---------------------------------------------------------------------
    // Questions and summaries
    // ---------------------------------------------------------------------

    /// Asks a question in the active session.
    pub async fn ask(&self, session_id: &str, question: &str) -> Result<ConversationTurn> {
        self.conversations.append(session_id, question).await
    }

    /// The session's transcript.
    pub fn transcript(&self, session_id: &str) -> Vec<ConversationTurn> {
        self.conversations.turns_for(session_id)
    }

    /// Returns the session summary, generating it once.
    pub async fn summarize(&self, session_id: &str) -> Result<Summary> {
        self.summaries.generate(session_id).await
    }

    fn begin_submission(&self) -> Result<SubmissionGuard<'_>> {
        self.submitting
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .map_err(|_| DocaiError::SubmissionInFlight)?;
        Ok(SubmissionGuard(&self.submitting))
    }
}

/// Releases the submission slot when the submission future completes or is
/// dropped.
#[derive(Debug)]
struct SubmissionGuard<'a>(&'a AtomicBool);

impl Drop for SubmissionGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}
