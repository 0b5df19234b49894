//! Lazily generated, per-session document summaries
//!
//! A session has at most one [`Summary`]. [`SummaryCache::generate`] returns
//! the cached value when there is one, and otherwise calls
//! `/summarize-pdf`. Concurrent calls for the same session share a single
//! request: the first caller installs a shared future and later callers
//! await that same future, so all of them observe the identical outcome.
//!
//! A failed request leaves no entry behind. [`SummaryCache::clear`] bumps an
//! epoch so that a request started before the clear cannot repopulate the
//! cache when it resolves.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use futures::future::{BoxFuture, FutureExt, Shared};
use serde::{Deserialize, Serialize};

use crate::api::{ApiClient, ApiError};
use crate::error::{DocaiError, Result};
use crate::sessions::SessionRegistry;

/// Generated summary of a session's document. Immutable once cached.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Summary {
    /// Session the summary belongs to.
    pub session_id: String,
    /// Summary text as produced by the backend.
    pub text: String,
}

type PendingSummary = Shared<BoxFuture<'static, std::result::Result<Summary, ApiError>>>;

#[derive(Default)]
struct CacheState {
    entries: HashMap<String, Summary>,
    in_flight: HashMap<String, PendingSummary>,
    epoch: u64,
}

/// At most one summary per session, generated on demand.
pub struct SummaryCache {
    api: ApiClient,
    registry: Arc<SessionRegistry>,
    state: Arc<Mutex<CacheState>>,
}

impl std::fmt::Debug for SummaryCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = lock(&self.state);
        f.debug_struct("SummaryCache")
            .field("cached", &state.entries.len())
            .field("in_flight", &state.in_flight.len())
            .finish()
    }
}

impl SummaryCache {
    /// Creates an empty cache.
    pub fn new(api: ApiClient, registry: Arc<SessionRegistry>) -> Self {
        Self {
            api,
            registry,
            state: Arc::new(Mutex::new(CacheState::default())),
        }
    }

    /// Cached summary for `session_id`, without any network call.
    pub fn summary_for(&self, session_id: &str) -> Option<Summary> {
        lock(&self.state).entries.get(session_id).cloned()
    }

    /// Returns the session's summary, generating it if needed.
    ///
    /// # Errors
    ///
    /// [`DocaiError::NotAuthenticated`] without a credential,
    /// [`DocaiError::UnknownSession`] for an id the registry has never
    /// observed, or the backend failure (shared by every waiter).
    pub async fn generate(&self, session_id: &str) -> Result<Summary> {
        self.api.auth().require()?;
        if !self.registry.is_selectable(session_id) {
            return Err(DocaiError::UnknownSession(session_id.to_string()).into());
        }

        let pending = {
            let mut state = lock(&self.state);
            if let Some(summary) = state.entries.get(session_id) {
                return Ok(summary.clone());
            }
            match state.in_flight.get(session_id) {
                Some(pending) => {
                    tracing::debug!(session_id, "Joining in-flight summary request");
                    pending.clone()
                }
                None => {
                    let pending = self.start(session_id, state.epoch);
                    state
                        .in_flight
                        .insert(session_id.to_string(), pending.clone());
                    pending
                }
            }
        };

        Ok(pending.await?)
    }

    /// Drops every cached summary and detaches in-flight requests.
    pub fn clear(&self) {
        let mut state = lock(&self.state);
        state.entries.clear();
        state.in_flight.clear();
        state.epoch += 1;
    }

    /// Builds the shared request; it records its own outcome so the cache is
    /// updated exactly once regardless of how many callers await it.
    fn start(&self, session_id: &str, epoch: u64) -> PendingSummary {
        let api = self.api.clone();
        let state = Arc::clone(&self.state);
        let session_id = session_id.to_string();

        async move {
            tracing::info!(session_id = %session_id, "Generating summary");
            let outcome = api.summarize(&session_id).await.map(|response| Summary {
                session_id: session_id.clone(),
                text: response.summary,
            });

            let mut state = lock(&state);
            if state.epoch == epoch {
                state.in_flight.remove(&session_id);
                match &outcome {
                    Ok(summary) => {
                        state.entries.insert(session_id.clone(), summary.clone());
                    }
                    Err(e) => {
                        tracing::warn!(session_id = %session_id, error = %e, "Summary failed");
                    }
                }
            }
            outcome
        }
        .boxed()
        .shared()
    }
}

fn lock(state: &Mutex<CacheState>) -> MutexGuard<'_, CacheState> {
    match state.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::{AuthSession, Credential, MemoryCredentialStore};
    use crate::error::{kind_of, ErrorKind};
    use crate::sessions::events;

    fn cache(authenticated: bool) -> SummaryCache {
        let store = if authenticated {
            MemoryCredentialStore::with_credential(Credential::bearer("t"))
        } else {
            MemoryCredentialStore::new()
        };
        let auth = AuthSession::new(Arc::new(store));
        let api = ApiClient::new("http://127.0.0.1:9", auth, None).unwrap();
        let registry = Arc::new(SessionRegistry::new(api.clone(), events::channel().1));
        SummaryCache::new(api, registry)
    }

    #[test]
    fn test_summary_for_is_empty_initially() {
        assert!(cache(true).summary_for("s1").is_none());
    }

    #[tokio::test]
    async fn test_generate_requires_credential() {
        let err = cache(false).generate("s1").await.unwrap_err();
        assert_eq!(kind_of(&err), Some(ErrorKind::AuthenticationFailure));
    }

    #[tokio::test]
    async fn test_generate_rejects_unobserved_session() {
        let err = cache(true).generate("ghost").await.unwrap_err();
        assert_eq!(kind_of(&err), Some(ErrorKind::UnknownSession));
    }

    #[test]
    fn test_clear_drops_entries() {
        let cache = cache(true);
        lock(&cache.state).entries.insert(
            "s1".into(),
            Summary {
                session_id: "s1".into(),
                text: "short".into(),
            },
        );
        assert!(cache.summary_for("s1").is_some());
        cache.clear();
        assert!(cache.summary_for("s1").is_none());
        assert_eq!(lock(&cache.state).epoch, 1);
    }
}
