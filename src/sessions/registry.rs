//! Sessions owned by the authenticated user
//!
//! [`SessionRegistry`] keeps the most recently applied `/my-sessions`
//! listing and an "active session" pointer.
//!
//! # Stale listings
//!
//! Every [`list_sessions`](SessionRegistry::list_sessions) call takes a
//! request token from a monotonically increasing counter at initiation. When
//! a response arrives it is applied only if no later call has been initiated
//! since, so a slow old response can never overwrite a fresh one. A failed
//! latest call clears the visible listing instead of leaving stale entries
//! next to an error.
//!
//! # Selectable ids
//!
//! An id may become active only if it appears in the visible listing or was
//! announced by a [`SessionEvent`] (created or resumed through ingestion).
//! The active id stays selectable when a failed refresh empties the listing.

use std::collections::HashSet;
use std::sync::{Mutex, MutexGuard};

use tokio::sync::mpsc::{self, error::TryRecvError};

use super::{Session, SessionEvent};
use crate::api::types::SessionsResponse;
use crate::api::{ApiClient, ApiError};
use crate::error::{DocaiError, Result};

/// Outcome of one [`SessionRegistry::list_sessions`] call.
///
/// `sessions` is always present. On failure it is empty and `error` says
/// why.
#[derive(Debug)]
pub struct SessionListing {
    /// Sessions in server order; empty on failure.
    pub sessions: Vec<Session>,
    /// The failure, if the fetch or its decoding failed.
    pub error: Option<anyhow::Error>,
    /// `true` when a later call was initiated before this one resolved, so
    /// this result was not applied to the visible listing.
    pub superseded: bool,
}

impl SessionListing {
    /// Converts into a plain `Result`, dropping the supersession flag.
    pub fn into_result(self) -> Result<Vec<Session>> {
        match self.error {
            Some(err) => Err(err),
            None => Ok(self.sessions),
        }
    }
}

#[derive(Debug, Default)]
struct RegistryState {
    /// Most recently applied listing.
    sessions: Vec<Session>,
    /// Ids announced through ingestion events.
    introduced: HashSet<String>,
    active: Option<String>,
    /// Token of the most recently initiated listing.
    latest_request: u64,
}

impl RegistryState {
    fn is_selectable(&self, id: &str) -> bool {
        self.active.as_deref() == Some(id)
            || self.introduced.contains(id)
            || self.sessions.iter().any(|s| s.id == id)
    }
}

/// Enumerates sessions and tracks which one is active.
#[derive(Debug)]
pub struct SessionRegistry {
    api: ApiClient,
    state: Mutex<RegistryState>,
    events: Mutex<mpsc::UnboundedReceiver<SessionEvent>>,
}

impl SessionRegistry {
    /// Creates an empty registry fed by `events`.
    pub fn new(api: ApiClient, events: mpsc::UnboundedReceiver<SessionEvent>) -> Self {
        Self {
            api,
            state: Mutex::new(RegistryState::default()),
            events: Mutex::new(events),
        }
    }

    /// Fetches `/my-sessions` and applies it if still the latest request.
    ///
    /// Never fails outright: errors (including a missing credential and a
    /// malformed body) are reported in [`SessionListing::error`] alongside
    /// an empty list.
    pub async fn list_sessions(&self) -> SessionListing {
        let token = {
            let mut state = self.lock_state();
            state.latest_request += 1;
            state.latest_request
        };

        let fetched = self.fetch().await;

        let mut state = self.lock_state();
        let superseded = state.latest_request != token;
        if superseded {
            tracing::warn!(
                token,
                latest = state.latest_request,
                "Discarding superseded session listing"
            );
        }

        match fetched {
            Ok(sessions) => {
                if !superseded {
                    state.sessions = sessions.clone();
                }
                SessionListing {
                    sessions,
                    error: None,
                    superseded,
                }
            }
            Err(err) => {
                if !superseded {
                    tracing::warn!("Failed to list sessions: {}", err);
                    state.sessions.clear();
                }
                SessionListing {
                    sessions: Vec::new(),
                    error: Some(err),
                    superseded,
                }
            }
        }
    }

    async fn fetch(&self) -> Result<Vec<Session>> {
        self.api.auth().require()?;
        let value = self.api.my_sessions().await?;
        let response: SessionsResponse = serde_json::from_value(value).map_err(|e| {
            DocaiError::Api(ApiError::new(
                Some(200),
                format!("malformed session listing: {}", e),
            ))
        })?;
        Ok(response.sessions)
    }

    /// Snapshot of the visible listing.
    pub fn sessions(&self) -> Vec<Session> {
        self.lock_state().sessions.clone()
    }

    /// Looks up a session in the visible listing.
    pub fn session(&self, id: &str) -> Option<Session> {
        self.lock_state()
            .sessions
            .iter()
            .find(|s| s.id == id)
            .cloned()
    }

    /// Makes `id` the active session.
    ///
    /// # Errors
    ///
    /// [`DocaiError::NotAuthenticated`] without a credential;
    /// [`DocaiError::UnknownSession`] if `id` is neither in the visible
    /// listing nor announced by ingestion.
    pub fn select_active(&self, id: &str) -> Result<()> {
        self.api.auth().require()?;
        self.drain_events();

        let mut state = self.lock_state();
        if !state.is_selectable(id) {
            return Err(DocaiError::UnknownSession(id.to_string()).into());
        }
        if state.active.as_deref() != Some(id) {
            tracing::info!(session_id = id, "Active session changed");
        }
        state.active = Some(id.to_string());
        Ok(())
    }

    /// The active session id, if one was selected.
    pub fn active_id(&self) -> Option<String> {
        self.lock_state().active.clone()
    }

    /// `true` if `id` could be passed to [`select_active`](Self::select_active).
    pub fn is_selectable(&self, id: &str) -> bool {
        self.drain_events();
        self.lock_state().is_selectable(id)
    }

    /// Forgets everything: listing, announced ids, and the active pointer.
    /// In-flight listings started before the reset are discarded.
    pub fn clear(&self) {
        let mut state = self.lock_state();
        let token = state.latest_request + 1;
        *state = RegistryState {
            latest_request: token,
            ..RegistryState::default()
        };
    }

    /// Applies every pending ingestion event.
    fn drain_events(&self) {
        let mut events = match self.events.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        loop {
            match events.try_recv() {
                Ok(event) => {
                    tracing::debug!(session_id = event.session_id(), "Session announced");
                    self.lock_state()
                        .introduced
                        .insert(event.session_id().to_string());
                }
                Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => break,
            }
        }
    }

    fn lock_state(&self) -> MutexGuard<'_, RegistryState> {
        match self.state.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}
