//! Engine actor.
//!
//! The actor owns the [`WindowManager`] and processes messages one at a time,
//! so compositor callbacks, timers and setting changes never interleave inside
//! a handler. The manager holds compositor objects that are bound to the
//! compositor's thread, so the actor runs on a [`tokio::task::LocalSet`].
//!
//! # Panic Recovery
//!
//! If a message handler panics, the panic is caught and logged and the actor
//! keeps processing subsequent messages. State may be partially inconsistent
//! but the shell stays responsive.

mod handle;
mod messages;

use std::panic::{AssertUnwindSafe, catch_unwind};

pub use handle::{ActorError, EngineHandle};
pub use messages::EngineMessage;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use super::compositor::Compositor;
use super::manager::WindowManager;
use super::registry::ZoneRegistry;
use super::scheduler::Scheduler;
use crate::constants::CHANNEL_BUFFER_SIZE;

/// Create the actor's channel.
///
/// The handle exists before the actor so timers and watchers can be built
/// around it first.
#[must_use]
pub fn channel() -> (EngineHandle, mpsc::Receiver<EngineMessage>) {
    let (sender, receiver) = mpsc::channel(CHANNEL_BUFFER_SIZE);
    (EngineHandle::new(sender), receiver)
}

/// The actor that owns the snap engine.
pub struct EngineActor<C, R, S> {
    manager: WindowManager<C, R, S>,
    receiver: mpsc::Receiver<EngineMessage>,
}

impl<C, R, S> EngineActor<C, R, S>
where
    C: Compositor + 'static,
    R: ZoneRegistry + 'static,
    S: Scheduler + 'static,
{
    /// Create an actor around `manager`, reading from `receiver`.
    #[must_use]
    pub const fn new(
        manager: WindowManager<C, R, S>,
        receiver: mpsc::Receiver<EngineMessage>,
    ) -> Self {
        Self { manager, receiver }
    }

    /// Spawn the actor on the current [`tokio::task::LocalSet`].
    ///
    /// The task resolves to the manager once the actor stops, so callers can
    /// inspect the final state.
    ///
    /// # Panics
    ///
    /// Panics if called outside a `LocalSet`.
    pub fn spawn_local(self) -> JoinHandle<WindowManager<C, R, S>> {
        tracing::debug!("spawning zoning engine actor");
        tokio::task::spawn_local(self.run())
    }

    /// Run the actor's message loop until shutdown or until every handle is dropped.
    ///
    /// A [`TokioScheduler`] owned by the manager holds a handle of its own, so
    /// actors using it stop only on [`EngineMessage::Shutdown`].
    ///
    /// [`TokioScheduler`]: super::scheduler::TokioScheduler
    pub async fn run(mut self) -> WindowManager<C, R, S> {
        self.manager.connect_signals();
        tracing::trace!("engine message loop starting");

        while let Some(msg) = self.receiver.recv().await {
            if matches!(msg, EngineMessage::Shutdown) {
                tracing::debug!("engine actor received shutdown message");
                break;
            }

            let msg_name = msg.name();
            let result = catch_unwind(AssertUnwindSafe(|| {
                self.handle_message(msg);
            }));

            if let Err(panic_info) = result {
                let panic_msg = panic_info
                    .downcast_ref::<&str>()
                    .map(|s| (*s).to_string())
                    .or_else(|| panic_info.downcast_ref::<String>().cloned())
                    .unwrap_or_else(|| "unknown panic".to_string());

                tracing::error!(message = msg_name, panic = %panic_msg, "engine recovered from panic");
            }
        }

        self.manager.teardown();
        tracing::debug!("engine actor stopped");
        self.manager
    }

    fn handle_message(&mut self, msg: EngineMessage) {
        match msg {
            EngineMessage::GrabOpBegin { window, op } => self.manager.grab_op_begin(window, op),
            EngineMessage::GrabOpEnd { window, op } => self.manager.grab_op_end(window, op),
            EngineMessage::WindowCreated { window } => self.manager.window_created(window),
            EngineMessage::WindowDestroyed { window } => self.manager.window_destroyed(window),
            EngineMessage::MonitorsChanged => self.manager.monitors_changed(),
            EngineMessage::SettingChanged(key) => self.manager.setting_changed(key),
            EngineMessage::TimerFired { id, task } => self.manager.timer_fired(id, task),
            EngineMessage::CycleWindowsInCurrentZone => {
                if !self.manager.cycle_windows_in_current_zone() {
                    tracing::debug!("nothing to cycle in current zone");
                }
            }
            EngineMessage::Snapshot { respond_to } => {
                if respond_to.send(self.manager.snapshot()).is_err() {
                    tracing::warn!("failed to send snapshot response (channel closed)");
                }
            }
            // Handled by the loop.
            EngineMessage::Shutdown => {}
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
