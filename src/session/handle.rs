//! Per-viewer session handle
//!
//! Held by the transport task for one connection. Frames pushed by the
//! coordinator arrive on the handle's channel in delivery order: the two
//! snapshot frames first, then incrementals.

use bytes::Bytes;
use tokio::sync::mpsc;

use crate::session::registry::SessionId;

/// Session lifecycle phase
///
/// `Closed` is terminal; there are no other transitions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    /// Created, snapshot not yet delivered
    Connecting,
    /// Snapshot queued and session registered for incremental broadcasts
    Connected,
    /// Disconnected; no further frames will arrive
    Closed,
}

/// Handle to one viewer session
#[derive(Debug)]
pub struct Session {
    id: SessionId,
    phase: SessionPhase,
    frames: mpsc::UnboundedReceiver<Bytes>,
}

impl Session {
    pub(crate) fn new(id: SessionId, frames: mpsc::UnboundedReceiver<Bytes>) -> Self {
        Self {
            id,
            phase: SessionPhase::Connecting,
            frames,
        }
    }

    pub(crate) fn mark_connected(&mut self) {
        if self.phase == SessionPhase::Connecting {
            self.phase = SessionPhase::Connected;
        }
    }

    /// Unique session id, assigned at registration
    pub fn id(&self) -> SessionId {
        self.id
    }

    /// Current lifecycle phase
    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    /// Wait for the next outbound frame
    ///
    /// Returns `None` once the session has been closed and all queued
    /// frames have been drained.
    pub async fn next_frame(&mut self) -> Option<Bytes> {
        match self.frames.recv().await {
            Some(frame) => Some(frame),
            None => {
                self.phase = SessionPhase::Closed;
                None
            }
        }
    }

    /// Take the next frame if one is already queued
    pub fn try_next_frame(&mut self) -> Option<Bytes> {
        self.frames.try_recv().ok()
    }

    /// Stop receiving frames
    ///
    /// Subsequent pushes from the coordinator fail and the session is
    /// pruned from the registry on the next broadcast touching it.
    pub fn close(&mut self) {
        self.frames.close();
        self.phase = SessionPhase::Closed;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_phase_transitions() {
        let (tx, rx) = mpsc::unbounded_channel();
        let mut session = Session::new(1, rx);
        assert_eq!(session.phase(), SessionPhase::Connecting);

        session.mark_connected();
        assert_eq!(session.phase(), SessionPhase::Connected);

        // Queued frames drain in order.
        tx.send(Bytes::from_static(b"a")).unwrap();
        tx.send(Bytes::from_static(b"b")).unwrap();
        assert_eq!(session.next_frame().await.unwrap(), "a");
        assert_eq!(session.next_frame().await.unwrap(), "b");

        drop(tx);
        assert_eq!(session.next_frame().await, None);
        assert_eq!(session.phase(), SessionPhase::Closed);
    }

    #[tokio::test]
    async fn test_close_is_terminal() {
        let (tx, rx) = mpsc::unbounded_channel();
        let mut session = Session::new(7, rx);

        session.close();
        assert_eq!(session.phase(), SessionPhase::Closed);
        assert!(tx.send(Bytes::from_static(b"x")).is_err());

        // Closing again is a no-op.
        session.close();
        assert_eq!(session.phase(), SessionPhase::Closed);
    }
}
