//! Zone-based window snapping.
//!
//! While a window is dragged, the zone under the pointer is highlighted; on
//! release the window is moved and resized to fill that zone exactly. New
//! windows can be tiled into the zone under their center once they settle,
//! and a window dragged back out of every zone gets its pre-snap frame back.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │          Compositor notifications / config watcher            │
//! └──────────────────────────────┬───────────────────────────────┘
//!                                │ EngineHandle (mpsc)
//!                                ▼
//! ┌──────────────────────────────────────────────────────────────┐
//! │                        Engine Actor                           │
//! │  - Processes messages sequentially on a LocalSet             │
//! │  - Timers post TimerFired back into the same channel         │
//! └──────────────────────────────┬───────────────────────────────┘
//!                                ▼
//! ┌──────────────────────────────────────────────────────────────┐
//! │                       WindowManager                           │
//! │  - Per-window tiling state     - HighlightManager            │
//! │  - find_target_zone            - Compositor / Registry traits│
//! └──────────────────────────────────────────────────────────────┘
//! ```

pub mod actor;
pub mod compositor;
pub mod geometry;
pub mod highlight;
pub mod manager;
pub mod registry;
pub mod scheduler;
pub mod sim;
pub mod tabs;
pub mod zone;

// Re-export commonly used types
pub use actor::{ActorError, EngineActor, EngineHandle, EngineMessage};
pub use compositor::{
    Compositor, CompositorError, GrabOp, HighlightOverlay, MonitorLayout, Monitors, Signal,
    SubscriptionId, WindowId, WindowInfo, WindowKind,
};
pub use geometry::{Point, Rect};
pub use highlight::{HighlightManager, HighlightSession, TickOutcome};
pub use manager::{EngineSnapshot, TilingState, WindowManager};
pub use registry::{
    ConfigRegistry, RegistryError, SettingKey, StaticRegistry, ZoneRegistry, ZoneSettings,
};
pub use scheduler::{ManualScheduler, Scheduler, TimerId, TimerTask, TokioScheduler};
pub use sim::{
    DesktopCommand, OverlayEvent, Scenario, ScenarioReport, ScenarioStep, ScenarioWindow,
    SimulatedDesktop, WindowReport, run_scenario,
};
pub use tabs::ZoneTabs;
pub use zone::{Zone, find_target_zone};
