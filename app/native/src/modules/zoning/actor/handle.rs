//! Handle for communicating with the engine actor.
//!
//! The `EngineHandle` is cheap to clone and can be shared across threads, so
//! compositor callbacks, timers and the config watcher all post through it.

use std::time::Duration;

use tokio::sync::{mpsc, oneshot};

use super::messages::EngineMessage;
use crate::modules::zoning::compositor::{GrabOp, WindowId};
use crate::modules::zoning::manager::EngineSnapshot;

/// Error types for actor communication.
#[derive(Debug, thiserror::Error)]
pub enum ActorError {
    /// Failed to send message to actor.
    #[error("Failed to send message to actor: channel closed or full")]
    SendFailed,

    /// Failed to receive response from actor.
    #[error("Failed to receive response from actor: channel closed")]
    ReceiveFailed,

    /// Query timed out.
    #[error("Query timed out after {0:?}")]
    Timeout(Duration),
}

/// Handle for communicating with the engine actor.
#[derive(Clone, Debug)]
pub struct EngineHandle {
    sender: mpsc::Sender<EngineMessage>,
}

impl EngineHandle {
    /// Create a new handle with the given sender.
    pub(crate) const fn new(sender: mpsc::Sender<EngineMessage>) -> Self { Self { sender } }

    // ========================================================================
    // Fire-and-forget sending
    // ========================================================================

    /// Send a message to the actor without waiting for delivery.
    ///
    /// # Errors
    ///
    /// Returns [`ActorError::SendFailed`] if the channel is closed or full.
    pub fn send(&self, msg: EngineMessage) -> Result<(), ActorError> {
        self.sender.try_send(msg).map_err(|_| ActorError::SendFailed)
    }

    /// Send a message to the actor and wait for buffer space.
    ///
    /// # Errors
    ///
    /// Returns [`ActorError::SendFailed`] if the channel is closed.
    pub async fn send_async(&self, msg: EngineMessage) -> Result<(), ActorError> {
        self.sender.send(msg).await.map_err(|_| ActorError::SendFailed)
    }

    /// Whether the actor has stopped.
    #[must_use]
    pub fn is_closed(&self) -> bool { self.sender.is_closed() }

    // ========================================================================
    // Compositor notifications
    // ========================================================================

    /// Forward a grab-begin notification.
    ///
    /// # Errors
    ///
    /// Returns [`ActorError::SendFailed`] if the actor is gone.
    pub fn grab_op_begin(&self, window: WindowId, op: GrabOp) -> Result<(), ActorError> {
        self.send(EngineMessage::GrabOpBegin { window, op })
    }

    /// Forward a grab-end notification.
    ///
    /// # Errors
    ///
    /// Returns [`ActorError::SendFailed`] if the actor is gone.
    pub fn grab_op_end(&self, window: WindowId, op: GrabOp) -> Result<(), ActorError> {
        self.send(EngineMessage::GrabOpEnd { window, op })
    }

    /// Forward a window-created notification.
    ///
    /// # Errors
    ///
    /// Returns [`ActorError::SendFailed`] if the actor is gone.
    pub fn window_created(&self, window: WindowId) -> Result<(), ActorError> {
        self.send(EngineMessage::WindowCreated { window })
    }

    /// Forward a window-destroyed notification.
    ///
    /// # Errors
    ///
    /// Returns [`ActorError::SendFailed`] if the actor is gone.
    pub fn window_destroyed(&self, window: WindowId) -> Result<(), ActorError> {
        self.send(EngineMessage::WindowDestroyed { window })
    }

    /// Forward a monitors-changed notification.
    ///
    /// # Errors
    ///
    /// Returns [`ActorError::SendFailed`] if the actor is gone.
    pub fn monitors_changed(&self) -> Result<(), ActorError> {
        self.send(EngineMessage::MonitorsChanged)
    }

    /// Ask the tab bar to cycle the focused zone.
    ///
    /// # Errors
    ///
    /// Returns [`ActorError::SendFailed`] if the actor is gone.
    pub fn cycle_windows_in_current_zone(&self) -> Result<(), ActorError> {
        self.send(EngineMessage::CycleWindowsInCurrentZone)
    }

    /// Tear down the engine and stop the actor.
    ///
    /// # Errors
    ///
    /// Returns [`ActorError::SendFailed`] if the actor is already gone.
    pub async fn shutdown(&self) -> Result<(), ActorError> {
        self.send_async(EngineMessage::Shutdown).await
    }

    // ========================================================================
    // Queries
    // ========================================================================

    /// Get a snapshot of the engine state.
    ///
    /// # Errors
    ///
    /// Returns [`ActorError::SendFailed`] if the channel is closed, or
    /// [`ActorError::ReceiveFailed`] if the response channel is closed.
    pub async fn snapshot(&self) -> Result<EngineSnapshot, ActorError> {
        let (tx, rx) = oneshot::channel();

        self.sender
            .send(EngineMessage::Snapshot { respond_to: tx })
            .await
            .map_err(|_| ActorError::SendFailed)?;

        rx.await.map_err(|_| ActorError::ReceiveFailed)
    }

    /// Get a snapshot with a timeout.
    ///
    /// # Errors
    ///
    /// Returns [`ActorError::Timeout`] if the query doesn't complete in time,
    /// or any error from [`Self::snapshot`].
    pub async fn snapshot_timeout(&self, timeout: Duration) -> Result<EngineSnapshot, ActorError> {
        tokio::time::timeout(timeout, self.snapshot())
            .await
            .map_err(|_| ActorError::Timeout(timeout))?
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_actor_error_display() {
        assert!(ActorError::SendFailed.to_string().contains("channel closed"));
        assert!(ActorError::Timeout(Duration::from_secs(1)).to_string().contains("1s"));
    }

    #[test]
    fn test_send_fails_after_receiver_dropped() {
        let (sender, receiver) = mpsc::channel(1);
        let handle = EngineHandle::new(sender);
        drop(receiver);

        assert!(handle.is_closed());
        assert!(matches!(handle.monitors_changed(), Err(ActorError::SendFailed)));
    }

    #[test]
    fn test_send_fails_when_full() {
        let (sender, _receiver) = mpsc::channel(1);
        let handle = EngineHandle::new(sender);

        assert!(handle.window_created(1).is_ok());
        assert!(matches!(handle.window_created(2), Err(ActorError::SendFailed)));
    }
}
