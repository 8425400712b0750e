//! Live session registry
//!
//! Tracks the outbound channel of every connected viewer, keyed by a
//! process-unique session id. Removal is idempotent; a send to a closed
//! channel just prunes the entry, it never aborts delivery to the rest.
//!
//! `bytes::Bytes` is reference counted, so fan-out clones share one
//! allocation per frame.

use std::collections::HashMap;

use bytes::Bytes;
use tokio::sync::mpsc;

/// Process-unique identifier for a connected session
pub type SessionId = u64;

/// Registry of currently connected viewer sessions
#[derive(Debug, Default)]
pub struct SessionRegistry {
    /// Outbound channels keyed by session id
    sessions: HashMap<SessionId, mpsc::UnboundedSender<Bytes>>,
    /// Next session id to allocate
    next_id: SessionId,
}

impl SessionRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self {
            sessions: HashMap::new(),
            next_id: 1,
        }
    }

    /// Register a session's outbound channel, allocating its id
    pub fn register(&mut self, tx: mpsc::UnboundedSender<Bytes>) -> SessionId {
        let id = self.next_id;
        self.next_id += 1;
        self.sessions.insert(id, tx);

        tracing::debug!(session_id = id, sessions = self.sessions.len(), "Session registered");
        id
    }

    /// Remove a session
    ///
    /// Removing an id that is absent (already removed, or pruned by a
    /// broadcast) is a no-op.
    pub fn remove(&mut self, id: SessionId) {
        if self.sessions.remove(&id).is_some() {
            tracing::debug!(session_id = id, sessions = self.sessions.len(), "Session removed");
        }
    }

    /// Push a frame to one session
    ///
    /// A session that has gone away is pruned and the push is skipped.
    pub fn send(&mut self, id: SessionId, frame: Bytes) {
        if let Some(tx) = self.sessions.get(&id) {
            if tx.send(frame).is_err() {
                self.sessions.remove(&id);
                tracing::debug!(session_id = id, "Session gone, pruned on send");
            }
        }
    }

    /// Push a frame to every live session
    ///
    /// Sessions whose channel is closed are skipped and pruned; delivery
    /// to the remaining sessions is unaffected.
    pub fn broadcast(&mut self, frame: &Bytes) {
        let mut dead = Vec::new();

        for (&id, tx) in &self.sessions {
            if tx.send(frame.clone()).is_err() {
                dead.push(id);
            }
        }

        for id in dead {
            self.sessions.remove(&id);
            tracing::debug!(session_id = id, "Session gone, pruned on broadcast");
        }
    }

    /// Number of live sessions
    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    /// Whether any session is connected
    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}
