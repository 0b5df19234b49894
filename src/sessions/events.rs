//! Session lifecycle notifications
//!
//! [`SessionIngestion`](super::SessionIngestion) publishes a
//! [`SessionEvent`] whenever a session becomes usable on this client.
//! Every event reaches the [`SessionRegistry`](super::SessionRegistry) over
//! an unbounded queue, so newly created or resumed ids become selectable
//! without waiting for the next listing no matter how many pile up. Other
//! observers subscribe to a bounded broadcast copy and may lag.

use tokio::sync::{broadcast, mpsc};

use super::SourceKind;

/// Buffered events per observer before the oldest are dropped.
pub const EVENT_CHANNEL_CAPACITY: usize = 64;

/// A session became available to this client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    /// A document submission created a new session.
    Created {
        /// Server-assigned session id.
        id: String,
        /// What the session was created from.
        source: SourceKind,
    },
    /// An existing session was validated and loaded server-side.
    Resumed {
        /// The resumed session id.
        id: String,
    },
}

impl SessionEvent {
    /// The session this event is about.
    pub fn session_id(&self) -> &str {
        match self {
            SessionEvent::Created { id, .. } | SessionEvent::Resumed { id } => id,
        }
    }
}

/// Publishing half shared by ingestion.
#[derive(Debug, Clone)]
pub struct SessionEvents {
    registry: mpsc::UnboundedSender<SessionEvent>,
    observers: broadcast::Sender<SessionEvent>,
}

impl SessionEvents {
    /// Delivers `event` to the registry and to current observers.
    pub fn send(&self, event: SessionEvent) {
        if self.registry.send(event.clone()).is_err() {
            tracing::debug!(session_id = event.session_id(), "Session registry is gone");
        }
        // No observers is the common case.
        let _ = self.observers.send(event);
    }

    /// Subscribes an observer; it sees events sent from now on.
    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.observers.subscribe()
    }
}

/// Creates the publisher and the registry's receiving end.
///
/// # Examples
///
/// ```
/// use docai::sessions::events::{channel, SessionEvent};
///
/// let (events, mut registry_rx) = channel();
/// let mut observer = events.subscribe();
/// events.send(SessionEvent::Resumed { id: "s1".into() });
/// assert_eq!(registry_rx.try_recv().unwrap().session_id(), "s1");
/// assert_eq!(observer.try_recv().unwrap().session_id(), "s1");
/// ```
pub fn channel() -> (SessionEvents, mpsc::UnboundedReceiver<SessionEvent>) {
    let (registry, rx) = mpsc::unbounded_channel();
    let (observers, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
    (
        SessionEvents {
            registry,
            observers,
        },
        rx,
    )
}
