//! Transcript entries

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ulid::Ulid;

use crate::api::types::Citation;

/// Who produced a turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// The person asking questions.
    User,
    /// The document assistant.
    Assistant,
}

/// One utterance in a session transcript. Never mutated once recorded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationTurn {
    /// Client-generated id, unique within the session.
    pub id: String,
    /// Speaker.
    pub role: Role,
    /// Utterance text, stored verbatim.
    pub text: String,
    /// When the turn was recorded.
    pub created_at: DateTime<Utc>,
    /// Evidence for an assistant answer, in server order.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub citations: Option<Vec<Citation>>,
}

impl ConversationTurn {
    /// A user question with a fresh id.
    pub fn user(text: impl Into<String>) -> Self {
        Self::new(Ulid::new().to_string(), Role::User, text.into(), None)
    }

    /// An assistant answer carrying its citations.
    pub fn answer(text: impl Into<String>, citations: Vec<Citation>) -> Self {
        Self::new(
            Ulid::new().to_string(),
            Role::Assistant,
            text.into(),
            Some(citations),
        )
    }

    /// A synthetic assistant turn with no citations (welcome or apology).
    pub fn synthetic(id: impl Into<String>, text: impl Into<String>) -> Self {
        Self::new(id.into(), Role::Assistant, text.into(), None)
    }

    fn new(id: String, role: Role, text: String, citations: Option<Vec<Citation>>) -> Self {
        Self {
            id,
            role,
            text,
            created_at: Utc::now(),
            citations,
        }
    }

    /// Citations, or an empty slice when the turn has none.
    pub fn citations(&self) -> &[Citation] {
        self.citations.as_deref().unwrap_or(&[])
    }
}
