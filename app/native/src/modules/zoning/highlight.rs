//! Hover highlight during a drag.
//!
//! While a move grab is open the highlight manager polls the pointer, runs the
//! same detection as drag-end and keeps at most one per-monitor overlay shown
//! over the zone the window would snap into. The loop is a chain of one-shot
//! timers: every tick that returns [`TickOutcome::Continue`] is re-armed by the
//! window manager, and starting a new loop cancels the previous timer.

use std::time::Duration;

use super::compositor::{Compositor, HighlightOverlay};
use super::scheduler::{Scheduler, TimerId, TimerTask};
use super::zone::{Zone, find_target_zone};

/// Result of one poll.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TickOutcome {
    /// Keep polling.
    Continue,
    /// Terminate the loop.
    Stop,
}

/// The zone currently shown to the user.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HighlightSession {
    /// Monitor whose overlay is showing.
    pub monitor: usize,
    /// The highlighted zone.
    pub zone: Zone,
}

/// Owns the per-monitor overlays and the polling loop state.
#[derive(Default)]
pub struct HighlightManager {
    overlays: Vec<Option<Box<dyn HighlightOverlay>>>,
    session: Option<HighlightSession>,
    timer: Option<TimerId>,
}

impl std::fmt::Debug for HighlightManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HighlightManager")
            .field("overlays", &self.overlays.len())
            .field("session", &self.session)
            .field("timer", &self.timer)
            .finish()
    }
}

impl HighlightManager {
    /// Create a manager without overlays.
    #[must_use]
    pub fn new() -> Self { Self::default() }

    /// The currently highlighted zone, if any.
    #[must_use]
    pub const fn session(&self) -> Option<&HighlightSession> { self.session.as_ref() }

    /// Whether a polling loop is armed.
    #[must_use]
    pub const fn is_running(&self) -> bool { self.timer.is_some() }

    /// The timer of the armed loop, if any.
    #[must_use]
    pub const fn timer(&self) -> Option<TimerId> { self.timer }

    /// Number of monitors with an overlay.
    #[must_use]
    pub fn overlay_count(&self) -> usize { self.overlays.iter().filter(|o| o.is_some()).count() }

    /// Destroy every overlay and create one per current monitor.
    ///
    /// Any shown highlight is discarded with its overlay. Runs synchronously so
    /// the next tick always sees the new topology.
    pub fn rebuild_overlays<C: Compositor + ?Sized>(&mut self, compositor: &mut C) {
        self.destroy_overlays();
        self.overlays = (0..compositor.monitor_count())
            .map(|monitor| {
                let overlay = compositor.create_highlight(monitor);
                if overlay.is_none() {
                    tracing::debug!(monitor, "no highlight overlay for monitor");
                }
                overlay
            })
            .collect();
        tracing::debug!(overlays = self.overlay_count(), "highlight overlays rebuilt");
    }

    /// Drop every overlay.
    pub fn destroy_overlays(&mut self) {
        if let Some(session) = self.session.take() {
            self.hide_overlay(session.monitor);
        }
        self.overlays.clear();
    }

    /// Start polling, replacing any loop that is already running.
    pub fn start<S: Scheduler + ?Sized>(&mut self, scheduler: &mut S, interval: Duration) {
        if let Some(timer) = self.timer.take() {
            scheduler.cancel(timer);
        }
        self.timer = Some(scheduler.schedule(interval, TimerTask::HighlightTick));
        tracing::trace!("highlight loop started");
    }

    /// Stop polling and hide whatever is shown.
    pub fn stop<S: Scheduler + ?Sized>(&mut self, scheduler: &mut S) {
        if let Some(timer) = self.timer.take() {
            scheduler.cancel(timer);
            tracing::trace!("highlight loop stopped");
        }
        self.hide();
    }

    /// Handle a fired poll timer.
    ///
    /// Returns `false` for timers that do not belong to the armed loop.
    pub(crate) fn claim_timer(&mut self, id: TimerId) -> bool {
        if self.timer == Some(id) {
            self.timer = None;
            true
        } else {
            false
        }
    }

    /// Re-arm after a tick that returned [`TickOutcome::Continue`].
    pub(crate) fn rearm<S: Scheduler + ?Sized>(&mut self, scheduler: &mut S, interval: Duration) {
        self.timer = Some(scheduler.schedule(interval, TimerTask::HighlightTick));
    }

    /// Run one poll against the live pointer.
    pub fn tick<C: Compositor + ?Sized>(
        &mut self,
        compositor: &C,
        zones: &[Zone],
        highlight_enabled: bool,
    ) -> TickOutcome {
        if !highlight_enabled {
            self.hide();
            return TickOutcome::Stop;
        }

        let pointer = compositor.pointer_position();
        let Some(monitor) = compositor.monitor_at(pointer) else {
            self.hide();
            return TickOutcome::Continue;
        };

        let Some(zone) = find_target_zone(zones, pointer, Some(monitor), compositor) else {
            self.hide();
            return TickOutcome::Continue;
        };

        let unchanged = self
            .session
            .as_ref()
            .is_some_and(|session| session.monitor == monitor && session.zone == *zone);
        if unchanged {
            return TickOutcome::Continue;
        }

        self.hide();

        let rect = zone.absolute_rect(&compositor.resolve_work_area(Some(monitor)));
        match self.overlays.get_mut(monitor).and_then(Option::as_mut) {
            Some(overlay) => {
                overlay.show(rect);
                tracing::trace!(monitor, zone = %zone.name, rect = %rect, "highlight shown");
                self.session = Some(HighlightSession {
                    monitor,
                    zone: zone.clone(),
                });
            }
            None => {
                self.session = None;
            }
        }

        TickOutcome::Continue
    }

    /// Hide the shown highlight, if any, and clear the session.
    fn hide(&mut self) {
        if let Some(session) = self.session.take() {
            self.hide_overlay(session.monitor);
        }
    }

    fn hide_overlay(&mut self, monitor: usize) {
        if let Some(overlay) = self.overlays.get_mut(monitor).and_then(Option::as_mut) {
            overlay.hide();
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
