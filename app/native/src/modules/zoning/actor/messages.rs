//! Message types for the engine actor.

use tokio::sync::oneshot;

use crate::modules::zoning::compositor::{GrabOp, WindowId};
use crate::modules::zoning::manager::EngineSnapshot;
use crate::modules::zoning::registry::SettingKey;
use crate::modules::zoning::scheduler::{TimerId, TimerTask};

/// Messages sent to the engine actor.
#[derive(Debug)]
pub enum EngineMessage {
    // ════════════════════════════════════════════════════════════════════════
    // Compositor Notifications
    // ════════════════════════════════════════════════════════════════════════
    /// A grab started.
    GrabOpBegin { window: WindowId, op: GrabOp },

    /// A grab ended.
    GrabOpEnd { window: WindowId, op: GrabOp },

    /// A window was created.
    WindowCreated { window: WindowId },

    /// A window was destroyed.
    WindowDestroyed { window: WindowId },

    /// Monitor topology or work areas changed.
    MonitorsChanged,

    // ════════════════════════════════════════════════════════════════════════
    // Engine Internals
    // ════════════════════════════════════════════════════════════════════════
    /// A subscribed setting changed.
    SettingChanged(SettingKey),

    /// A scheduled timer fired.
    TimerFired { id: TimerId, task: TimerTask },

    // ════════════════════════════════════════════════════════════════════════
    // Shell Commands
    // ════════════════════════════════════════════════════════════════════════
    /// Cycle the windows sharing the focused window's zone.
    CycleWindowsInCurrentZone,

    /// Request a snapshot of the engine state.
    Snapshot { respond_to: oneshot::Sender<EngineSnapshot> },

    /// Tear down and stop the actor.
    Shutdown,
}

impl EngineMessage {
    /// Returns the message name for logging.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::GrabOpBegin { .. } => "GrabOpBegin",
            Self::GrabOpEnd { .. } => "GrabOpEnd",
            Self::WindowCreated { .. } => "WindowCreated",
            Self::WindowDestroyed { .. } => "WindowDestroyed",
            Self::MonitorsChanged => "MonitorsChanged",
            Self::SettingChanged(_) => "SettingChanged",
            Self::TimerFired { .. } => "TimerFired",
            Self::CycleWindowsInCurrentZone => "CycleWindowsInCurrentZone",
            Self::Snapshot { .. } => "Snapshot",
            Self::Shutdown => "Shutdown",
        }
    }
}
