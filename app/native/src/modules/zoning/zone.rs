//! Zones and zone detection.
//!
//! A zone is a named rectangle on one monitor, stored relative to that
//! monitor's work area so it survives panel and resolution changes.
//! [`find_target_zone`] is the only hit-test in the crate; the window manager
//! and the highlight manager both go through it so they always agree.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::compositor::Monitors;
use super::geometry::{Point, Rect};

/// A named, monitor-relative target rectangle windows can snap into.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Zone {
    /// Display name. Not required to be unique.
    #[serde(default)]
    pub name: String,

    /// Monitor this zone belongs to.
    #[serde(default)]
    pub monitor_index: usize,

    /// Horizontal offset from the work area's left edge.
    pub x: i32,

    /// Vertical offset from the work area's top edge.
    pub y: i32,

    /// Width in pixels. Zero-sized zones never match a point.
    pub width: i32,

    /// Height in pixels.
    pub height: i32,
}

impl Zone {
    /// Create a new zone.
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        monitor_index: usize,
        x: i32,
        y: i32,
        width: i32,
        height: i32,
    ) -> Self {
        Self {
            name: name.into(),
            monitor_index,
            x,
            y,
            width,
            height,
        }
    }

    /// The zone's rectangle relative to its work area.
    #[must_use]
    pub const fn local_rect(&self) -> Rect { Rect::new(self.x, self.y, self.width, self.height) }

    /// The zone's rectangle in global coordinates for the given work area.
    #[must_use]
    pub const fn absolute_rect(&self, work_area: &Rect) -> Rect {
        self.local_rect().offset_by(work_area)
    }

    /// Whether the zone has a reachable (non-zero) area.
    #[must_use]
    pub const fn is_reachable(&self) -> bool { self.width > 0 && self.height > 0 }
}

/// Find the zone under `point` on `monitor`.
///
/// The monitor's work area is resolved with the primary-monitor fallback, so an
/// unknown or out-of-range monitor still yields a work area. Only zones whose
/// `monitor_index` equals `monitor` are candidates; the first candidate whose
/// absolute rectangle contains `point` (edges included) wins.
#[must_use]
pub fn find_target_zone<'a, M>(
    zones: &'a [Zone],
    point: Point,
    monitor: Option<usize>,
    monitors: &M,
) -> Option<&'a Zone>
where
    M: Monitors + ?Sized,
{
    let work_area = monitors.resolve_work_area(monitor);

    zones.iter().filter(|zone| Some(zone.monitor_index) == monitor).find(|zone| {
        zone.is_reachable() && zone.absolute_rect(&work_area).contains_closed(point)
    })
}

// ============================================================================
// Tests
// ============================================================================
