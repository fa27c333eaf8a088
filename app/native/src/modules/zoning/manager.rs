//! The snap engine.
//!
//! [`WindowManager`] owns every piece of per-window tiling state and is the
//! only component that moves or resizes windows. It reacts to compositor
//! notifications (grab begin/end, window created/destroyed, monitors changed),
//! to setting changes and to its own timers.
//!
//! Conceptually each window is in one of three states:
//!
//! ```text
//!   Untracked ──snap──▶ Zoned ──drag out, restore──▶ Untracked
//!       ▲                 │
//!       └──drag out───────┘  (restore off, or no original stored)
//! ```
//!
//! with `UnzonedWithOriginal` as the short-lived state between a drag-begin
//! that captured the frame and the matching drag-end.

use std::collections::HashMap;

use serde::Serialize;

use super::compositor::{Compositor, GrabOp, Signal, SubscriptionId, WindowId, WindowInfo, WindowKind};
use super::geometry::Rect;
use super::highlight::{HighlightManager, HighlightSession, TickOutcome};
use super::registry::{SettingKey, ZoneRegistry, ZoneSettings};
use super::scheduler::{ManualScheduler, Scheduler, TimerId, TimerTask};
use super::tabs::ZoneTabs;
use super::zone::{Zone, find_target_zone};

// ============================================================================
// Tiling State
// ============================================================================

/// Tiling state attached to one window.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TilingState {
    /// The window's frame was last set by a snap.
    pub zoned: bool,
    /// Frame before the first snap of the current zoning episode.
    pub original_rect: Option<Rect>,
}

impl TilingState {
    const fn is_empty(&self) -> bool { !self.zoned && self.original_rect.is_none() }
}

/// Point-in-time view of the engine, for queries and reports.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EngineSnapshot {
    /// Tracked windows and their state, sorted by id.
    pub windows: Vec<(WindowId, TilingState)>,
    /// Window being dragged, if any.
    pub dragging: Option<WindowId>,
    /// Highlighted zone, as `(monitor, zone name)`.
    pub highlighted: Option<(usize, String)>,
    /// Windows waiting for their settle delay.
    pub pending_settles: usize,
}

// ============================================================================
// Window Manager
// ============================================================================

/// Per-window snapping state machine.
pub struct WindowManager<C, R, S> {
    compositor: C,
    registry: R,
    scheduler: S,
    settings: ZoneSettings,
    windows: HashMap<WindowId, TilingState>,
    drag: Option<WindowId>,
    highlight: HighlightManager,
    pending_settles: HashMap<WindowId, TimerId>,
    zoning_subscriptions: Vec<SubscriptionId>,
    lifecycle_subscriptions: Vec<SubscriptionId>,
    setting_subscriptions: Vec<SubscriptionId>,
    tabs: Option<Box<dyn ZoneTabs>>,
    connected: bool,
}

impl<C, R, S> WindowManager<C, R, S>
where
    C: Compositor,
    R: ZoneRegistry,
    S: Scheduler,
{
    /// Create a manager and one highlight overlay per monitor.
    ///
    /// Nothing is subscribed until [`Self::connect_signals`] runs.
    pub fn new(mut compositor: C, registry: R, scheduler: S) -> Self {
        let settings = registry.snapshot();
        let mut highlight = HighlightManager::new();
        highlight.rebuild_overlays(&mut compositor);

        Self {
            compositor,
            registry,
            scheduler,
            settings,
            windows: HashMap::new(),
            drag: None,
            highlight,
            pending_settles: HashMap::new(),
            zoning_subscriptions: Vec::new(),
            lifecycle_subscriptions: Vec::new(),
            setting_subscriptions: Vec::new(),
            tabs: None,
            connected: false,
        }
    }

    /// Attach the tab-bar collaborator.
    #[must_use]
    pub fn with_tabs(mut self, tabs: Box<dyn ZoneTabs>) -> Self {
        self.tabs = Some(tabs);
        self
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    #[must_use]
    pub const fn compositor(&self) -> &C { &self.compositor }

    #[must_use]
    pub const fn registry(&self) -> &R { &self.registry }

    pub const fn registry_mut(&mut self) -> &mut R { &mut self.registry }

    #[must_use]
    pub const fn scheduler(&self) -> &S { &self.scheduler }

    /// The settings snapshot currently in effect.
    #[must_use]
    pub const fn settings(&self) -> &ZoneSettings { &self.settings }

    #[must_use]
    pub const fn highlight(&self) -> &HighlightManager { &self.highlight }

    /// Whether [`Self::connect_signals`] ran and [`Self::teardown`] did not.
    #[must_use]
    pub const fn is_connected(&self) -> bool { self.connected }

    /// Window of the open drag gesture, if any.
    #[must_use]
    pub const fn dragging(&self) -> Option<WindowId> { self.drag }

    /// Tiling state of a window, if it is tracked.
    #[must_use]
    pub fn tiling_state(&self, window: WindowId) -> Option<TilingState> {
        self.windows.get(&window).copied()
    }

    #[must_use]
    pub fn is_zoned(&self, window: WindowId) -> bool {
        self.windows.get(&window).is_some_and(|state| state.zoned)
    }

    #[must_use]
    pub fn original_rect(&self, window: WindowId) -> Option<Rect> {
        self.windows.get(&window).and_then(|state| state.original_rect)
    }

    /// Number of windows with tiling state.
    #[must_use]
    pub fn tracked_window_count(&self) -> usize { self.windows.len() }

    /// Number of windows waiting for their settle delay.
    #[must_use]
    pub fn pending_settle_count(&self) -> usize { self.pending_settles.len() }

    /// Capture the engine state for reporting.
    #[must_use]
    pub fn snapshot(&self) -> EngineSnapshot {
        let mut windows: Vec<_> = self.windows.iter().map(|(id, state)| (*id, *state)).collect();
        windows.sort_by_key(|(id, _)| *id);

        EngineSnapshot {
            windows,
            dragging: self.drag,
            highlighted: self
                .highlight
                .session()
                .map(|HighlightSession { monitor, zone }| (*monitor, zone.name.clone())),
            pending_settles: self.pending_settles.len(),
        }
    }

    // ========================================================================
    // Lifecycle
    // ========================================================================

    /// Subscribe to settings and compositor notifications.
    ///
    /// Drag and creation notifications are only subscribed while zoning is
    /// enabled. Calling this twice is a no-op.
    pub fn connect_signals(&mut self) {
        if self.connected {
            return;
        }
        self.settings = self.registry.snapshot();

        for key in SettingKey::ALL {
            match self.registry.subscribe(key) {
                Ok(id) => self.setting_subscriptions.push(id),
                Err(err) => tracing::warn!(setting = %key, error = %err, "cannot watch setting"),
            }
        }

        self.lifecycle_subscriptions = self.connect_group(&Signal::LIFECYCLE);
        if self.settings.zoning_enabled {
            self.zoning_subscriptions = self.connect_group(&Signal::ZONING);
        }

        self.connected = true;
        tracing::debug!(
            zones = self.settings.zones.len(),
            enabled = self.settings.zoning_enabled,
            "zoning signals connected"
        );
    }

    /// Release every subscription and timer and forget all window state.
    pub fn teardown(&mut self) {
        self.highlight.stop(&mut self.scheduler);
        self.drag = None;
        self.cancel_settles();

        let compositor_subscriptions: Vec<_> = self
            .zoning_subscriptions
            .drain(..)
            .chain(self.lifecycle_subscriptions.drain(..))
            .collect();
        self.disconnect_all(compositor_subscriptions);

        for id in self.setting_subscriptions.drain(..) {
            if let Err(err) = self.registry.unsubscribe(id) {
                tracing::debug!(error = %err, "ignoring stale setting subscription");
            }
        }

        self.cleanup_window_properties();
        self.highlight.destroy_overlays();
        self.connected = false;
        tracing::debug!("zoning torn down");
    }

    /// Delete the tiling state of every window.
    ///
    /// Sweeps the compositor's live windows first, then drops any state left
    /// behind by windows the compositor no longer reports.
    pub fn cleanup_window_properties(&mut self) {
        for window in self.compositor.windows() {
            self.windows.remove(&window);
        }

        if !self.windows.is_empty() {
            tracing::debug!(count = self.windows.len(), "dropping state of vanished windows");
            self.windows.clear();
        }
    }

    fn connect_group(&mut self, signals: &[Signal]) -> Vec<SubscriptionId> {
        signals
            .iter()
            .filter_map(|signal| match self.compositor.connect(*signal) {
                Ok(id) => Some(id),
                Err(err) => {
                    tracing::warn!(signal = signal.as_str(), error = %err, "cannot connect signal");
                    None
                }
            })
            .collect()
    }

    fn disconnect_all(&mut self, ids: Vec<SubscriptionId>) {
        for id in ids {
            if let Err(err) = self.compositor.disconnect(id) {
                tracing::debug!(error = %err, "ignoring stale signal subscription");
            }
        }
    }

    fn cancel_settles(&mut self) {
        for (_, timer) in self.pending_settles.drain() {
            self.scheduler.cancel(timer);
        }
    }

    // ========================================================================
    // Drag Lifecycle
    // ========================================================================

    /// A grab started on `window`.
    pub fn grab_op_begin(&mut self, window: WindowId, op: GrabOp) {
        if !op.is_move() || !self.settings.zoning_enabled {
            return;
        }
        let Some(info) = self.compositor.window_info(window) else {
            return;
        };
        if !info.kind.is_tileable() || info.fullscreen {
            return;
        }

        self.drag = Some(window);
        self.highlight.start(&mut self.scheduler, self.settings.timing.highlight_interval());

        if !self.settings.restore_on_untile {
            return;
        }
        let state = self.windows.get(&window);
        if state.is_some_and(|state| state.original_rect.is_some() || state.zoned) {
            return;
        }
        self.windows.entry(window).or_default().original_rect = Some(info.frame);
        tracing::trace!(window, frame = %info.frame, "captured pre-drag frame");
    }

    /// A grab ended on `window`.
    pub fn grab_op_end(&mut self, window: WindowId, op: GrabOp) {
        if !op.is_move() {
            return;
        }

        // The highlight must be gone before the window snaps.
        self.highlight.stop(&mut self.scheduler);
        self.drag = None;

        if !self.settings.zoning_enabled {
            return;
        }
        let Some(info) = self.compositor.window_info(window) else {
            self.windows.remove(&window);
            return;
        };

        if !info.kind.is_tileable() || info.fullscreen {
            if let Some(state) = self.windows.get_mut(&window) {
                state.zoned = false;
            }
            self.prune(window);
            return;
        }

        let pointer = self.compositor.pointer_position();
        let monitor = self.compositor.monitor_at(pointer).or(info.monitor);
        let zone = find_target_zone(&self.settings.zones, pointer, monitor, &self.compositor).cloned();

        match zone {
            Some(zone) => self.snap(window, &info, &zone, monitor),
            None => self.leave_zones(window),
        }
    }

    /// Move `window` into `zone` on `monitor`.
    fn snap(&mut self, window: WindowId, info: &WindowInfo, zone: &Zone, monitor: Option<usize>) {
        let mut frame = info.frame;
        if info.maximized {
            self.compositor.unmaximize(window);
            frame = self.compositor.window_info(window).map_or(frame, |info| info.frame);
        }

        let target = zone.absolute_rect(&self.compositor.resolve_work_area(monitor));
        let state = self.windows.entry(window).or_default();

        if frame == target {
            state.zoned = true;
            tracing::trace!(window, zone = %zone.name, "window already fills zone");
            return;
        }

        if self.settings.restore_on_untile && state.original_rect.is_none() {
            state.original_rect = Some(frame);
        }

        self.compositor.move_resize(window, target);
        state.zoned = true;
        tracing::debug!(window, zone = %zone.name, rect = %target, "snapped window");
    }

    /// `window` was released outside every zone.
    fn leave_zones(&mut self, window: WindowId) {
        let Some(state) = self.windows.get_mut(&window) else {
            return;
        };

        let original = state.original_rect.take();
        if state.zoned && self.settings.restore_on_untile {
            if let Some(rect) = original {
                self.compositor.move_resize(window, rect);
                tracing::debug!(window, rect = %rect, "restored window");
            }
        }
        state.zoned = false;
        self.prune(window);
    }

    fn prune(&mut self, window: WindowId) {
        if self.windows.get(&window).is_some_and(TilingState::is_empty) {
            self.windows.remove(&window);
        }
    }

    // ========================================================================
    // Window Lifecycle
    // ========================================================================

    /// A window was created; tile it once it settles.
    pub fn window_created(&mut self, window: WindowId) {
        if !self.settings.zoning_enabled || !self.settings.tile_new_windows {
            return;
        }
        let Some(info) = self.compositor.window_info(window) else {
            return;
        };
        if info.kind != WindowKind::Normal || info.skip_taskbar {
            return;
        }

        if let Some(previous) = self.pending_settles.remove(&window) {
            self.scheduler.cancel(previous);
        }
        let delay = self.settings.timing.settle_delay();
        let timer = self.scheduler.schedule(delay, TimerTask::SettleWindow(window));
        self.pending_settles.insert(window, timer);
        tracing::trace!(window, delay_ms = delay.as_millis(), "waiting for window to settle");
    }

    /// A window was destroyed; forget everything about it.
    pub fn window_destroyed(&mut self, window: WindowId) {
        if let Some(timer) = self.pending_settles.remove(&window) {
            self.scheduler.cancel(timer);
        }
        if self.drag == Some(window) {
            self.drag = None;
            self.highlight.stop(&mut self.scheduler);
        }
        self.windows.remove(&window);
    }

    /// Monitor topology changed; recreate the overlays.
    pub fn monitors_changed(&mut self) {
        self.highlight.rebuild_overlays(&mut self.compositor);
    }

    /// One attempt at tiling a settled new window. Never retried.
    fn settle_window(&mut self, window: WindowId) {
        if !self.settings.zoning_enabled || !self.settings.tile_new_windows {
            return;
        }
        let Some(info) = self.compositor.window_info(window) else {
            tracing::debug!(window, "window vanished before settling");
            return;
        };
        if info.fullscreen || info.maximized || !info.frame.has_area() {
            return;
        }
        let Some(monitor) = info.monitor else {
            return;
        };

        let center = info.frame.center();
        let zone =
            find_target_zone(&self.settings.zones, center, Some(monitor), &self.compositor).cloned();
        if let Some(zone) = zone {
            self.snap(window, &info, &zone, Some(monitor));
        }
    }

    // ========================================================================
    // Settings & Timers
    // ========================================================================

    /// A subscribed setting changed; reload every setting at once.
    pub fn setting_changed(&mut self, key: SettingKey) {
        let previous = std::mem::replace(&mut self.settings, self.registry.snapshot());
        tracing::debug!(setting = %key, "settings reloaded");

        if !self.connected || previous.zoning_enabled == self.settings.zoning_enabled {
            return;
        }

        if self.settings.zoning_enabled {
            self.zoning_subscriptions = self.connect_group(&Signal::ZONING);
            tracing::info!("zoning enabled");
        } else {
            let ids = std::mem::take(&mut self.zoning_subscriptions);
            self.disconnect_all(ids);
            self.highlight.stop(&mut self.scheduler);
            self.drag = None;
            self.cancel_settles();
            tracing::info!("zoning disabled");
        }
    }

    /// A scheduled timer fired.
    pub fn timer_fired(&mut self, id: TimerId, task: TimerTask) {
        match task {
            TimerTask::HighlightTick => {
                if !self.highlight.claim_timer(id) {
                    return;
                }
                let outcome = self.highlight.tick(
                    &self.compositor,
                    &self.settings.zones,
                    self.settings.highlight_on_hover,
                );
                if outcome == TickOutcome::Continue {
                    let interval = self.settings.timing.highlight_interval();
                    self.highlight.rearm(&mut self.scheduler, interval);
                }
            }
            TimerTask::SettleWindow(window) => {
                if self.pending_settles.get(&window) != Some(&id) {
                    return;
                }
                self.pending_settles.remove(&window);
                self.settle_window(window);
            }
        }
    }

    // ========================================================================
    // Shell Actions
    // ========================================================================

    /// Ask the tab bar to cycle the windows sharing the focused window's zone.
    ///
    /// Returns `false` when there is no tab bar, no focused window, or the
    /// focused window does not fill a zone.
    pub fn cycle_windows_in_current_zone(&mut self) -> bool {
        let Some(focused) = self.compositor.focused_window() else {
            return false;
        };
        let Some(info) = self.compositor.window_info(focused) else {
            return false;
        };
        let Some(monitor) = info.monitor else {
            return false;
        };

        let work_area = self.compositor.resolve_work_area(Some(monitor));
        let Some(zone) = self
            .settings
            .zones
            .iter()
            .filter(|zone| zone.monitor_index == monitor)
            .find(|zone| zone.absolute_rect(&work_area) == info.frame)
            .cloned()
        else {
            return false;
        };

        let members: Vec<WindowId> = self
            .compositor
            .windows()
            .into_iter()
            .filter(|window| self.is_zoned(*window))
            .filter(|window| {
                self.compositor.window_info(*window).is_some_and(|other| other.frame == info.frame)
            })
            .collect();

        match self.tabs.as_mut() {
            Some(tabs) => tabs.cycle_windows(monitor, &zone, &members),
            None => {
                tracing::debug!("no tab bar to cycle windows");
                false
            }
        }
    }
}

impl<C, R> WindowManager<C, R, ManualScheduler>
where
    C: Compositor,
    R: ZoneRegistry,
{
    /// Advance the virtual clock by `by`, firing every timer that comes due.
    ///
    /// Timers re-armed by a tick inside the window fire too.
    pub fn advance(&mut self, by: std::time::Duration) {
        let until = self.scheduler.now() + by;
        while let Some((id, task)) = self.scheduler.pop_due(until) {
            self.timer_fired(id, task);
        }
    }
}

impl<C, R, S> std::fmt::Debug for WindowManager<C, R, S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WindowManager")
            .field("windows", &self.windows)
            .field("drag", &self.drag)
            .field("highlight", &self.highlight)
            .field("pending_settles", &self.pending_settles)
            .field("connected", &self.connected)
            .finish_non_exhaustive()
    }
}

// ============================================================================
// Tests
// ============================================================================
