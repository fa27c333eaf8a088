//! Compositor collaborator interface.
//!
//! The engine never talks to a compositor directly. Pointer, monitor and window
//! access all go through the traits here, so the window manager can be driven by
//! the shell integration in production and by [`SimulatedDesktop`] in tests and
//! in the `simulate` CLI command.
//!
//! Monitor indices are `Option<usize>`: `None` is the compositor's "no monitor"
//! answer (`-1` on most compositors).
//!
//! [`SimulatedDesktop`]: super::sim::SimulatedDesktop

use serde::{Deserialize, Serialize};

use super::geometry::{Point, Rect};

/// Stable identity of a compositor window.
pub type WindowId = u64;

// ============================================================================
// Subscriptions
// ============================================================================

/// Token returned by a `connect` call, required to disconnect.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriptionId(pub u64);

/// Compositor notifications the engine can subscribe to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Signal {
    /// A move/resize grab started on a window.
    GrabOpBegin,
    /// A move/resize grab ended on a window.
    GrabOpEnd,
    /// A window was created.
    WindowCreated,
    /// A window was destroyed.
    WindowDestroyed,
    /// Monitors were added, removed or their work areas changed.
    MonitorsChanged,
}

impl Signal {
    /// Signals that are only useful while zoning is enabled.
    pub const ZONING: [Self; 3] = [Self::GrabOpBegin, Self::GrabOpEnd, Self::WindowCreated];

    /// Signals that stay connected for the lifetime of the engine.
    pub const LIFECYCLE: [Self; 2] = [Self::WindowDestroyed, Self::MonitorsChanged];

    /// Returns the signal name as a static string.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::GrabOpBegin => "grab-op-begin",
            Self::GrabOpEnd => "grab-op-end",
            Self::WindowCreated => "window-created",
            Self::WindowDestroyed => "window-destroyed",
            Self::MonitorsChanged => "monitors-changed",
        }
    }
}

/// Errors reported by a compositor implementation.
#[derive(Debug, thiserror::Error)]
pub enum CompositorError {
    /// The subscription token is unknown or was already released.
    #[error("unknown subscription {0:?}")]
    UnknownSubscription(SubscriptionId),

    /// The compositor refused the subscription.
    #[error("cannot subscribe to {0}")]
    SubscribeFailed(&'static str),
}

// ============================================================================
// Window Introspection
// ============================================================================

/// Window type as reported by the compositor.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum WindowKind {
    /// Regular application window.
    #[default]
    Normal,
    /// Transient dialog.
    Dialog,
    /// Modal dialog attached to a parent.
    ModalDialog,
    /// Tool palettes and other utility windows.
    Utility,
    /// Splash screens.
    Splash,
    /// Menus, tooltips, popups.
    Menu,
    /// Docks and panels.
    Dock,
    /// The desktop surface.
    Desktop,
}

impl WindowKind {
    /// Returns true if windows of this kind can be snapped when dragged.
    #[must_use]
    pub const fn is_tileable(self) -> bool {
        matches!(self, Self::Normal | Self::Dialog | Self::ModalDialog)
    }
}

/// Snapshot of a window's state.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct WindowInfo {
    /// Outer frame in global coordinates.
    pub frame: Rect,
    /// Window type.
    pub kind: WindowKind,
    /// Whether the window is fullscreen.
    pub fullscreen: bool,
    /// Whether the window is maximized (either axis).
    pub maximized: bool,
    /// Monitor the window is assigned to, if any.
    pub monitor: Option<usize>,
    /// Whether the window is hidden from the taskbar.
    pub skip_taskbar: bool,
}

/// Kind of grab operation reported with grab notifications.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum GrabOp {
    /// Pointer-driven move.
    Moving,
    /// Keyboard-driven move.
    KeyboardMoving,
    /// Pointer-driven resize from any edge.
    Resizing,
    /// Keyboard-driven resize.
    KeyboardResizing,
    /// Any other grab (window menu, compositor internals).
    Other,
}

impl GrabOp {
    /// Returns true if this grab moves the window.
    #[must_use]
    pub const fn is_move(self) -> bool { matches!(self, Self::Moving | Self::KeyboardMoving) }
}

// ============================================================================
// Monitors
// ============================================================================

/// Monitor topology queries.
pub trait Monitors {
    /// Number of connected monitors.
    fn monitor_count(&self) -> usize;

    /// Index of the primary monitor.
    fn primary_monitor(&self) -> usize;

    /// Work area of a monitor, or `None` if the index is out of range.
    fn work_area(&self, monitor: usize) -> Option<Rect>;

    /// Work area of `monitor`, falling back to the primary monitor.
    ///
    /// Out-of-range indices and `None` resolve to the primary monitor's work
    /// area. Without any monitor the zero rectangle is returned.
    fn resolve_work_area(&self, monitor: Option<usize>) -> Rect {
        monitor
            .filter(|&index| index < self.monitor_count())
            .and_then(|index| self.work_area(index))
            .or_else(|| self.work_area(self.primary_monitor()))
            .unwrap_or_default()
    }
}

/// Plain monitor topology snapshot.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct MonitorLayout {
    /// Work area per monitor, indexed by monitor number.
    pub work_areas: Vec<Rect>,
    /// Index of the primary monitor.
    pub primary: usize,
}

impl MonitorLayout {
    /// Create a layout from work areas with monitor 0 as primary.
    #[must_use]
    pub const fn new(work_areas: Vec<Rect>) -> Self { Self { work_areas, primary: 0 } }

    /// Returns the index of the monitor containing `point`, if any.
    ///
    /// Uses half-open containment so adjacent monitors never both claim a point.
    #[must_use]
    pub fn monitor_at(&self, point: Point) -> Option<usize> {
        let (px, py) = (i64::from(point.x), i64::from(point.y));

        self.work_areas.iter().position(|area| {
            px >= i64::from(area.x)
                && px < i64::from(area.x) + i64::from(area.width)
                && py >= i64::from(area.y)
                && py < i64::from(area.y) + i64::from(area.height)
        })
    }
}

impl Monitors for MonitorLayout {
    fn monitor_count(&self) -> usize { self.work_areas.len() }

    fn primary_monitor(&self) -> usize { self.primary }

    fn work_area(&self, monitor: usize) -> Option<Rect> { self.work_areas.get(monitor).copied() }
}

// ============================================================================
// Highlight Overlay
// ============================================================================

/// A per-monitor overlay used to preview the hovered zone.
///
/// Dropping the overlay destroys it.
pub trait HighlightOverlay {
    /// Show the overlay covering `rect` (global coordinates).
    fn show(&mut self, rect: Rect);

    /// Hide the overlay. Hiding a hidden overlay is a no-op.
    fn hide(&mut self);
}

// ============================================================================
// Compositor
// ============================================================================

/// Everything the engine needs from the compositor.
pub trait Compositor: Monitors {
    /// Current pointer position.
    fn pointer_position(&self) -> Point;

    /// Monitor under `point`, if any.
    fn monitor_at(&self, point: Point) -> Option<usize>;

    /// Snapshot of a window's state, or `None` if the window no longer exists.
    fn window_info(&self, window: WindowId) -> Option<WindowInfo>;

    /// All live windows.
    fn windows(&self) -> Vec<WindowId>;

    /// The focused window, if any.
    fn focused_window(&self) -> Option<WindowId>;

    /// Move and resize a window so its frame equals `rect`.
    fn move_resize(&mut self, window: WindowId, rect: Rect);

    /// Leave the maximized state on both axes.
    fn unmaximize(&mut self, window: WindowId);

    /// Create the highlight overlay for a monitor.
    ///
    /// Returns `None` if the compositor cannot host an overlay there.
    fn create_highlight(&mut self, monitor: usize) -> Option<Box<dyn HighlightOverlay>>;

    /// Subscribe to a notification.
    ///
    /// # Errors
    ///
    /// Returns [`CompositorError::SubscribeFailed`] if the compositor refuses it.
    fn connect(&mut self, signal: Signal) -> Result<SubscriptionId, CompositorError>;

    /// Release a subscription.
    ///
    /// # Errors
    ///
    /// Returns [`CompositorError::UnknownSubscription`] for stale tokens.
    fn disconnect(&mut self, id: SubscriptionId) -> Result<(), CompositorError>;
}

// ============================================================================
// Tests
// ============================================================================
