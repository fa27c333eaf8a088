//! In-memory compositor and scenario runner.
//!
//! [`SimulatedDesktop`] implements [`Compositor`] over plain data and records
//! every geometry command and overlay call. Clones share state, so a test can
//! hand one clone to the engine and inspect another.
//!
//! [`Scenario`] is a scripted sequence of compositor events (pointer moves,
//! drags, window creation, time passing) that [`run_scenario`] plays against a
//! [`WindowManager`] on a virtual clock. Events for signals the engine is not
//! subscribed to are dropped, as a real compositor would.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

use super::compositor::{
    Compositor, CompositorError, GrabOp, HighlightOverlay, MonitorLayout, Monitors, Signal,
    SubscriptionId, WindowId, WindowInfo,
};
use super::geometry::{Point, Rect};
use super::manager::{EngineSnapshot, WindowManager};
use super::registry::{StaticRegistry, ZoneSettings};
use super::scheduler::ManualScheduler;
use super::zone::Zone;

// ============================================================================
// Recorded Events
// ============================================================================

/// A geometry command issued to the desktop.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "command", rename_all = "camelCase")]
pub enum DesktopCommand {
    MoveResize { window: WindowId, rect: Rect },
    Unmaximize { window: WindowId },
}

/// A call made on a highlight overlay.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "call", rename_all = "camelCase")]
pub enum OverlayEvent {
    Show { monitor: usize, rect: Rect },
    Hide { monitor: usize },
}

// ============================================================================
// Simulated Desktop
// ============================================================================

#[derive(Debug, Default)]
struct DesktopState {
    layout: MonitorLayout,
    pointer: Point,
    windows: BTreeMap<WindowId, WindowInfo>,
    focused: Option<WindowId>,
    next_subscription: u64,
    subscriptions: BTreeMap<SubscriptionId, Signal>,
    refused_overlays: BTreeSet<usize>,
    commands: Vec<DesktopCommand>,
    overlay_events: Vec<OverlayEvent>,
}

/// In-memory compositor.
#[derive(Clone, Debug, Default)]
pub struct SimulatedDesktop {
    state: Arc<Mutex<DesktopState>>,
}

impl SimulatedDesktop {
    /// Create a desktop with one monitor per work area; monitor 0 is primary.
    #[must_use]
    pub fn new(work_areas: Vec<Rect>) -> Self { Self::with_layout(MonitorLayout::new(work_areas)) }

    /// Create a desktop from a full monitor layout.
    #[must_use]
    pub fn with_layout(layout: MonitorLayout) -> Self {
        Self {
            state: Arc::new(Mutex::new(DesktopState {
                layout,
                ..DesktopState::default()
            })),
        }
    }

    /// Replace the monitor work areas. Does not notify the engine.
    pub fn set_work_areas(&self, work_areas: Vec<Rect>) {
        let mut state = self.state.lock();
        let primary = state.layout.primary.min(work_areas.len().saturating_sub(1));
        state.layout = MonitorLayout { work_areas, primary };
    }

    /// Move the pointer.
    pub fn set_pointer(&self, point: Point) { self.state.lock().pointer = point; }

    /// Set the focused window.
    pub fn set_focused(&self, window: Option<WindowId>) { self.state.lock().focused = window; }

    /// Add or replace a window.
    pub fn insert_window(&self, window: WindowId, info: WindowInfo) {
        self.state.lock().windows.insert(window, info);
    }

    /// Remove a window. Does not notify the engine.
    pub fn remove_window(&self, window: WindowId) { self.state.lock().windows.remove(&window); }

    /// Modify a window in place.
    pub fn update_window(&self, window: WindowId, update: impl FnOnce(&mut WindowInfo)) {
        if let Some(info) = self.state.lock().windows.get_mut(&window) {
            update(info);
        }
    }

    /// Current state of a window.
    #[must_use]
    pub fn window(&self, window: WindowId) -> Option<WindowInfo> {
        self.state.lock().windows.get(&window).cloned()
    }

    /// Make `create_highlight` fail for `monitor`.
    pub fn refuse_overlay(&self, monitor: usize) { self.state.lock().refused_overlays.insert(monitor); }

    /// Whether the engine is subscribed to `signal`.
    #[must_use]
    pub fn is_connected(&self, signal: Signal) -> bool {
        self.state.lock().subscriptions.values().any(|s| *s == signal)
    }

    /// Number of live subscriptions.
    #[must_use]
    pub fn subscription_count(&self) -> usize { self.state.lock().subscriptions.len() }

    /// Invalidate every subscription token, as a compositor restart would.
    pub fn drop_all_subscriptions(&self) { self.state.lock().subscriptions.clear(); }

    /// Geometry commands issued so far.
    #[must_use]
    pub fn commands(&self) -> Vec<DesktopCommand> { self.state.lock().commands.clone() }

    /// Number of move/resize commands issued so far.
    #[must_use]
    pub fn move_resize_count(&self) -> usize {
        self.state
            .lock()
            .commands
            .iter()
            .filter(|c| matches!(c, DesktopCommand::MoveResize { .. }))
            .count()
    }

    /// Overlay calls made so far.
    #[must_use]
    pub fn overlay_events(&self) -> Vec<OverlayEvent> { self.state.lock().overlay_events.clone() }

    /// Clear the command and overlay logs.
    pub fn clear_log(&self) {
        let mut state = self.state.lock();
        state.commands.clear();
        state.overlay_events.clear();
    }
}

impl Monitors for SimulatedDesktop {
    fn monitor_count(&self) -> usize { self.state.lock().layout.monitor_count() }

    fn primary_monitor(&self) -> usize { self.state.lock().layout.primary_monitor() }

    fn work_area(&self, monitor: usize) -> Option<Rect> { self.state.lock().layout.work_area(monitor) }
}

impl Compositor for SimulatedDesktop {
    fn pointer_position(&self) -> Point { self.state.lock().pointer }

    fn monitor_at(&self, point: Point) -> Option<usize> { self.state.lock().layout.monitor_at(point) }

    fn window_info(&self, window: WindowId) -> Option<WindowInfo> { self.window(window) }

    fn windows(&self) -> Vec<WindowId> { self.state.lock().windows.keys().copied().collect() }

    fn focused_window(&self) -> Option<WindowId> { self.state.lock().focused }

    fn move_resize(&mut self, window: WindowId, rect: Rect) {
        let mut state = self.state.lock();
        if let Some(info) = state.windows.get_mut(&window) {
            info.frame = rect;
        }
        state.commands.push(DesktopCommand::MoveResize { window, rect });
    }

    fn unmaximize(&mut self, window: WindowId) {
        let mut state = self.state.lock();
        if let Some(info) = state.windows.get_mut(&window) {
            info.maximized = false;
        }
        state.commands.push(DesktopCommand::Unmaximize { window });
    }

    fn create_highlight(&mut self, monitor: usize) -> Option<Box<dyn HighlightOverlay>> {
        if self.state.lock().refused_overlays.contains(&monitor) {
            return None;
        }
        Some(Box::new(SimOverlay {
            monitor,
            state: Arc::clone(&self.state),
        }))
    }

    fn connect(&mut self, signal: Signal) -> Result<SubscriptionId, CompositorError> {
        let mut state = self.state.lock();
        state.next_subscription += 1;
        let id = SubscriptionId(state.next_subscription);
        state.subscriptions.insert(id, signal);
        Ok(id)
    }

    fn disconnect(&mut self, id: SubscriptionId) -> Result<(), CompositorError> {
        self.state
            .lock()
            .subscriptions
            .remove(&id)
            .map(|_| ())
            .ok_or(CompositorError::UnknownSubscription(id))
    }
}

/// Overlay that records its calls in the desktop log.
struct SimOverlay {
    monitor: usize,
    state: Arc<Mutex<DesktopState>>,
}

impl HighlightOverlay for SimOverlay {
    fn show(&mut self, rect: Rect) {
        self.state.lock().overlay_events.push(OverlayEvent::Show {
            monitor: self.monitor,
            rect,
        });
    }

    fn hide(&mut self) {
        self.state.lock().overlay_events.push(OverlayEvent::Hide { monitor: self.monitor });
    }
}

// ============================================================================
// Scenarios
// ============================================================================

/// A window present when the scenario starts or created by a step.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScenarioWindow {
    pub id: WindowId,
    #[serde(flatten)]
    pub info: WindowInfo,
}

const fn default_grab_op() -> GrabOp { GrabOp::Moving }

/// One scripted event.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "camelCase")]
pub enum ScenarioStep {
    /// Move the pointer.
    Pointer { x: i32, y: i32 },
    /// Begin a grab.
    DragBegin {
        window: WindowId,
        #[serde(default = "default_grab_op")]
        op: GrabOp,
    },
    /// End a grab.
    DragEnd {
        window: WindowId,
        #[serde(default = "default_grab_op")]
        op: GrabOp,
    },
    /// Begin a move, walk the pointer to `(x, y)` and release.
    Drag { window: WindowId, x: i32, y: i32 },
    /// Create a window.
    Create(ScenarioWindow),
    /// Destroy a window.
    Destroy { window: WindowId },
    /// Let virtual time pass.
    Wait { ms: u64 },
    /// Replace the monitor work areas.
    Monitors {
        #[serde(rename = "workAreas")]
        work_areas: Vec<Rect>,
    },
    /// Focus a window.
    Focus { window: WindowId },
}

/// A scripted session.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Scenario {
    /// Work area per monitor.
    pub monitors: Vec<Rect>,
    /// Primary monitor index.
    pub primary: usize,
    /// Zones overriding the configured ones, if present.
    pub zones: Option<Vec<Zone>>,
    /// Windows that exist before the first step.
    pub windows: Vec<ScenarioWindow>,
    /// Events, in order.
    pub steps: Vec<ScenarioStep>,
}

/// Final state of one window.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WindowReport {
    pub id: WindowId,
    pub frame: Rect,
    pub zoned: bool,
    pub original_rect: Option<Rect>,
}

/// Everything a scenario did.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScenarioReport {
    /// Geometry commands, in order.
    pub commands: Vec<DesktopCommand>,
    /// Overlay calls, in order.
    pub overlay_events: Vec<OverlayEvent>,
    /// Windows still alive at the end.
    pub windows: Vec<WindowReport>,
    /// Engine state at the end.
    pub engine: EngineSnapshot,
}

/// Time a `drag` step spends walking the pointer, so the highlight can tick.
const DRAG_STEP: Duration = Duration::from_millis(25);
const DRAG_SEGMENTS: i32 = 8;

/// Play `scenario` against a fresh engine using `settings`.
#[must_use]
pub fn run_scenario(scenario: &Scenario, mut settings: ZoneSettings) -> ScenarioReport {
    if let Some(zones) = &scenario.zones {
        settings.zones = zones.as_slice().into();
    }

    let desktop = SimulatedDesktop::with_layout(MonitorLayout {
        work_areas: scenario.monitors.clone(),
        primary: scenario.primary,
    });
    for window in &scenario.windows {
        desktop.insert_window(window.id, window.info.clone());
    }

    let mut manager =
        WindowManager::new(desktop.clone(), StaticRegistry::new(settings), ManualScheduler::new());
    manager.connect_signals();

    for step in &scenario.steps {
        tracing::trace!(?step, "scenario step");
        play_step(&mut manager, &desktop, step);
    }

    let windows = manager
        .compositor()
        .windows()
        .into_iter()
        .filter_map(|id| {
            desktop.window(id).map(|info| WindowReport {
                id,
                frame: info.frame,
                zoned: manager.is_zoned(id),
                original_rect: manager.original_rect(id),
            })
        })
        .collect();

    ScenarioReport {
        commands: desktop.commands(),
        overlay_events: desktop.overlay_events(),
        windows,
        engine: manager.snapshot(),
    }
}

/// Position `segment` of `DRAG_SEGMENTS` on the way from `from` to `to`.
fn interpolate(from: i32, to: i32, segment: i32) -> i32 {
    let (from64, to64) = (i64::from(from), i64::from(to));
    let at = from64 + (to64 - from64) * i64::from(segment) / i64::from(DRAG_SEGMENTS);
    i32::try_from(at).unwrap_or(to)
}

type SimManager = WindowManager<SimulatedDesktop, StaticRegistry, ManualScheduler>;

fn play_step(manager: &mut SimManager, desktop: &SimulatedDesktop, step: &ScenarioStep) {
    match step {
        ScenarioStep::Pointer { x, y } => desktop.set_pointer(Point::new(*x, *y)),
        ScenarioStep::DragBegin { window, op } => {
            if desktop.is_connected(Signal::GrabOpBegin) {
                manager.grab_op_begin(*window, *op);
            }
        }
        ScenarioStep::DragEnd { window, op } => {
            if desktop.is_connected(Signal::GrabOpEnd) {
                manager.grab_op_end(*window, *op);
            }
        }
        ScenarioStep::Drag { window, x, y } => {
            let from = desktop.pointer_position();
            play_step(manager, desktop, &ScenarioStep::DragBegin {
                window: *window,
                op: GrabOp::Moving,
            });
            for segment in 1..=DRAG_SEGMENTS {
                let px = interpolate(from.x, *x, segment);
                let py = interpolate(from.y, *y, segment);
                desktop.set_pointer(Point::new(px, py));
                manager.advance(DRAG_STEP);
            }
            play_step(manager, desktop, &ScenarioStep::DragEnd {
                window: *window,
                op: GrabOp::Moving,
            });
        }
        ScenarioStep::Create(window) => {
            desktop.insert_window(window.id, window.info.clone());
            if desktop.is_connected(Signal::WindowCreated) {
                manager.window_created(window.id);
            }
        }
        ScenarioStep::Destroy { window } => {
            desktop.remove_window(*window);
            if desktop.is_connected(Signal::WindowDestroyed) {
                manager.window_destroyed(*window);
            }
        }
        ScenarioStep::Wait { ms } => manager.advance(Duration::from_millis(*ms)),
        ScenarioStep::Monitors { work_areas } => {
            desktop.set_work_areas(work_areas.clone());
            if desktop.is_connected(Signal::MonitorsChanged) {
                manager.monitors_changed();
            }
        }
        ScenarioStep::Focus { window } => desktop.set_focused(Some(*window)),
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn scenario(json: &str) -> Scenario { serde_json::from_str(json).unwrap() }

    #[test]
    fn test_interpolate_spans_full_i32_range() {
        assert_eq!(interpolate(i32::MIN, i32::MAX, 0), i32::MIN);
        assert_eq!(interpolate(i32::MIN, i32::MAX, DRAG_SEGMENTS), i32::MAX);
        assert_eq!(interpolate(0, 800, DRAG_SEGMENTS / 2), 400);
        assert_eq!(interpolate(400, -400, DRAG_SEGMENTS / 2), 0);
    }

    #[test]
    fn test_desktop_clones_share_state() {
        let desktop = SimulatedDesktop::new(vec![Rect::new(0, 0, 100, 100)]);
        let mut clone = desktop.clone();
        desktop.insert_window(1, WindowInfo::default());

        clone.move_resize(1, Rect::new(1, 2, 3, 4));

        assert_eq!(desktop.window(1).map(|w| w.frame), Some(Rect::new(1, 2, 3, 4)));
        assert_eq!(desktop.move_resize_count(), 1);
    }

    #[test]
    fn test_disconnect_unknown_subscription_fails() {
        let mut desktop = SimulatedDesktop::default();
        let id = desktop.connect(Signal::GrabOpBegin).unwrap();

        assert!(desktop.disconnect(id).is_ok());
        assert!(matches!(desktop.disconnect(id), Err(CompositorError::UnknownSubscription(_))));
    }

    #[test]
    fn test_set_work_areas_keeps_primary_in_range() {
        let desktop = SimulatedDesktop::with_layout(MonitorLayout {
            work_areas: vec![Rect::new(0, 0, 10, 10), Rect::new(10, 0, 10, 10)],
            primary: 1,
        });

        desktop.set_work_areas(vec![Rect::new(0, 0, 10, 10)]);

        assert_eq!(desktop.primary_monitor(), 0);
    }

    #[test]
    fn test_scenario_parses_steps() {
        let parsed = scenario(
            r#"{
                "monitors": [{ "x": 0, "y": 0, "width": 1920, "height": 1080 }],
                "windows": [{ "id": 1, "frame": { "x": 0, "y": 0, "width": 10, "height": 10 } }],
                "steps": [
                    { "action": "pointer", "x": 5, "y": 5 },
                    { "action": "dragBegin", "window": 1 },
                    { "action": "dragEnd", "window": 1, "op": "resizing" },
                    { "action": "wait", "ms": 100 },
                    { "action": "create", "id": 2, "monitor": 0 }
                ]
            }"#,
        );

        assert_eq!(parsed.steps.len(), 5);
        assert_eq!(parsed.steps[1], ScenarioStep::DragBegin { window: 1, op: GrabOp::Moving });
        assert_eq!(parsed.steps[2], ScenarioStep::DragEnd { window: 1, op: GrabOp::Resizing });
        assert!(matches!(&parsed.steps[4], ScenarioStep::Create(w) if w.info.monitor == Some(0)));
    }

    #[test]
    fn test_run_scenario_drag_snaps_window() {
        let parsed = scenario(
            r#"{
                "monitors": [{ "x": 0, "y": 0, "width": 1920, "height": 1080 }],
                "zones": [{ "name": "left", "x": 0, "y": 0, "width": 960, "height": 1080 }],
                "windows": [{
                    "id": 1,
                    "frame": { "x": 1000, "y": 100, "width": 800, "height": 600 },
                    "monitor": 0
                }],
                "steps": [
                    { "action": "pointer", "x": 1400, "y": 400 },
                    { "action": "drag", "window": 1, "x": 400, "y": 500 }
                ]
            }"#,
        );

        let report = run_scenario(&parsed, ZoneSettings::default());

        assert_eq!(report.commands, vec![DesktopCommand::MoveResize {
            window: 1,
            rect: Rect::new(0, 0, 960, 1080)
        }]);
        assert!(report.windows[0].zoned);
        assert_eq!(report.windows[0].original_rect, Some(Rect::new(1000, 100, 800, 600)));
        assert!(report.overlay_events.contains(&OverlayEvent::Show {
            monitor: 0,
            rect: Rect::new(0, 0, 960, 1080)
        }));
        assert_eq!(report.overlay_events.last(), Some(&OverlayEvent::Hide { monitor: 0 }));
    }

    #[test]
    fn test_run_scenario_disabled_drops_drag_events() {
        let parsed = scenario(
            r#"{
                "monitors": [{ "x": 0, "y": 0, "width": 1920, "height": 1080 }],
                "zones": [{ "name": "left", "x": 0, "y": 0, "width": 960, "height": 1080 }],
                "windows": [{ "id": 1, "frame": { "x": 0, "y": 0, "width": 10, "height": 10 } }],
                "steps": [{ "action": "drag", "window": 1, "x": 400, "y": 500 }]
            }"#,
        );
        let settings = ZoneSettings {
            zoning_enabled: false,
            ..ZoneSettings::default()
        };

        let report = run_scenario(&parsed, settings);

        assert!(report.commands.is_empty());
        assert!(report.overlay_events.is_empty());
    }
}
