//! Per-session question/answer transcripts
//!
//! Each session has an append-only transcript driven by a small state
//! machine:
//!
//! ```text
//! Empty --greet--> Greeted --append--> AwaitingReply --reply/failure--> Idle
//!                                            ^                          |
//!                                            +---------append-----------+
//! ```
//!
//! A synthetic welcome turn is recorded exactly once, when the session first
//! becomes active with no turns. `append` records the user turn before the
//! query leaves the client, and the matching assistant turn (answer or
//! apology) when it returns. While a reply is pending a second `append` is
//! refused, which is what keeps each answer directly after its question.
//!
//! Query failures are absorbed: the transcript gets a fixed apology turn and
//! the error is logged instead of returned, so every question has a visible
//! outcome. The same apology is recorded when the caller drops an `append`
//! future before the reply arrives (for example under a timeout).

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use crate::api::ApiClient;
use crate::config::ConversationConfig;
use crate::error::{DocaiError, Result};
use crate::sessions::SessionRegistry;

pub mod turn;

pub use turn::{ConversationTurn, Role};

/// Id of the synthetic welcome turn.
pub const WELCOME_TURN_ID: &str = "welcome";

/// Where a session's transcript is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConversationState {
    /// No turns yet.
    Empty,
    /// Only the welcome turn.
    Greeted,
    /// Last question answered; ready for the next.
    Idle,
    /// A question is waiting for its answer.
    AwaitingReply,
}

#[derive(Debug)]
struct Transcript {
    turns: Vec<ConversationTurn>,
    state: ConversationState,
    /// Distinguishes this transcript from a later one for the same session,
    /// so replies to a discarded transcript are dropped.
    epoch: u64,
}

/// Ordered transcripts keyed by session id.
#[derive(Debug)]
pub struct ConversationLog {
    api: ApiClient,
    registry: Arc<SessionRegistry>,
    welcome_message: String,
    apology_message: String,
    transcripts: Mutex<HashMap<String, Transcript>>,
    next_epoch: AtomicU64,
}

impl ConversationLog {
    /// Creates an empty log.
    ///
    /// Questions are accepted only for the registry's active session.
    pub fn new(api: ApiClient, registry: Arc<SessionRegistry>, config: &ConversationConfig) -> Self {
        Self {
            api,
            registry,
            welcome_message: config.welcome_message.clone(),
            apology_message: config.apology_message.clone(),
            transcripts: Mutex::new(HashMap::new()),
            next_epoch: AtomicU64::new(1),
        }
    }

    /// Records the welcome turn if the session has no turns yet.
    pub fn greet(&self, session_id: &str) {
        let mut transcripts = self.lock();
        let transcript = self.transcript_mut(&mut transcripts, session_id);
        if transcript.turns.is_empty() {
            transcript.turns.push(ConversationTurn::synthetic(
                WELCOME_TURN_ID,
                self.welcome_message.clone(),
            ));
            transcript.state = ConversationState::Greeted;
        }
    }

    /// Asks a question about the active session and records both sides.
    ///
    /// Returns the assistant turn: the answer, or the apology if the query
    /// failed.
    ///
    /// # Errors
    ///
    /// Raised before anything is recorded:
    ///
    /// - [`DocaiError::InvalidInput`] for empty or whitespace-only text
    /// - [`DocaiError::NotAuthenticated`] without a credential
    /// - [`DocaiError::UnknownSession`] if `session_id` is not active
    /// - [`DocaiError::ReplyPending`] while the previous question is
    ///   unanswered
    pub async fn append(&self, session_id: &str, text: &str) -> Result<ConversationTurn> {
        if text.trim().is_empty() {
            return Err(DocaiError::InvalidInput("question is empty".to_string()).into());
        }
        self.api.auth().require()?;
        if self.registry.active_id().as_deref() != Some(session_id) {
            return Err(DocaiError::UnknownSession(session_id.to_string()).into());
        }

        let epoch = {
            let mut transcripts = self.lock();
            let transcript = self.transcript_mut(&mut transcripts, session_id);
            if transcript.state == ConversationState::AwaitingReply {
                return Err(DocaiError::ReplyPending(session_id.to_string()).into());
            }
            if transcript.turns.is_empty() {
                transcript.turns.push(ConversationTurn::synthetic(
                    WELCOME_TURN_ID,
                    self.welcome_message.clone(),
                ));
            }
            transcript.turns.push(ConversationTurn::user(text));
            transcript.state = ConversationState::AwaitingReply;
            transcript.epoch
        };
        let pending = PendingReply {
            log: self,
            session_id,
            epoch,
            settled: false,
        };

        let reply = match self.api.query(session_id, text).await {
            Ok(response) => ConversationTurn::answer(response.answer, response.sources),
            Err(e) => {
                tracing::warn!(
                    session_id,
                    status = ?e.status,
                    error = %e,
                    "Query failed; recording apology"
                );
                self.apology_turn()
            }
        };

        pending.settle(&reply);
        Ok(reply)
    }

    /// The session's turns in append order.
    pub fn turns_for(&self, session_id: &str) -> Vec<ConversationTurn> {
        self.lock()
            .get(session_id)
            .map(|t| t.turns.clone())
            .unwrap_or_default()
    }

    /// Current state of the session's transcript.
    pub fn state_of(&self, session_id: &str) -> ConversationState {
        self.lock()
            .get(session_id)
            .map(|t| t.state)
            .unwrap_or(ConversationState::Empty)
    }

    /// Clears a transcript when the active session moves away from it.
    ///
    /// # Errors
    ///
    /// [`DocaiError::ReplyPending`] if a question is still unanswered.
    pub fn reset(&self, session_id: &str) -> Result<()> {
        let mut transcripts = self.lock();
        if let Some(transcript) = transcripts.get(session_id) {
            if transcript.state == ConversationState::AwaitingReply {
                return Err(DocaiError::ReplyPending(session_id.to_string()).into());
            }
        }
        transcripts.remove(session_id);
        Ok(())
    }

    /// Drops a transcript even mid-reply; the late reply is discarded.
    pub(crate) fn abandon(&self, session_id: &str) {
        if self.lock().remove(session_id).is_some() {
            tracing::debug!(session_id, "Abandoned transcript");
        }
    }

    /// Drops every transcript.
    pub fn clear_all(&self) {
        self.lock().clear();
    }

    fn apology_turn(&self) -> ConversationTurn {
        ConversationTurn::synthetic(
            format!("error-{}", ulid::Ulid::new()),
            self.apology_message.clone(),
        )
    }

    /// Closes out a question unless its transcript was discarded meanwhile.
    fn record_reply(&self, session_id: &str, epoch: u64, reply: ConversationTurn) {
        let mut transcripts = self.lock();
        match transcripts.get_mut(session_id) {
            Some(transcript) if transcript.epoch == epoch => {
                transcript.turns.push(reply);
                transcript.state = ConversationState::Idle;
            }
            _ => {
                tracing::debug!(session_id, "Transcript was discarded; dropping late reply");
            }
        }
    }

    fn transcript_mut<'a>(
        &self,
        transcripts: &'a mut HashMap<String, Transcript>,
        session_id: &str,
    ) -> &'a mut Transcript {
        transcripts
            .entry(session_id.to_string())
            .or_insert_with(|| Transcript {
                turns: Vec::new(),
                state: ConversationState::Empty,
                epoch: self.next_epoch.fetch_add(1, Ordering::SeqCst),
            })
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, Transcript>> {
        match self.transcripts.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

/// An unanswered question. Dropping it unsettled (the caller stopped
/// waiting) records the apology so the transcript never stalls in
/// `AwaitingReply`.
struct PendingReply<'a> {
    log: &'a ConversationLog,
    session_id: &'a str,
    epoch: u64,
    settled: bool,
}

impl PendingReply<'_> {
    fn settle(mut self, reply: &ConversationTurn) {
        self.log
            .record_reply(self.session_id, self.epoch, reply.clone());
        self.settled = true;
    }
}

impl Drop for PendingReply<'_> {
    fn drop(&mut self) {
        if !self.settled {
            tracing::warn!(
                session_id = self.session_id,
                "Question abandoned before its reply; recording apology"
            );
            self.log
                .record_reply(self.session_id, self.epoch, self.log.apology_turn());
        }
    }
}
