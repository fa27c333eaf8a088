//! Tab-bar collaborator.
//!
//! Several windows can sit in the same zone. Presenting them as tabs and
//! deciding which one comes forward belongs to the shell; the engine only
//! works out which zone the focused window occupies and who shares it.

use super::compositor::WindowId;
use super::zone::Zone;

/// Hands windows sharing a zone to the shell's tab UI.
pub trait ZoneTabs {
    /// Bring the next window of `zone` forward.
    ///
    /// `windows` lists every zoned window currently filling the zone, the
    /// focused one included, in compositor stacking order. Returns `true` if
    /// the shell cycled.
    fn cycle_windows(&mut self, monitor: usize, zone: &Zone, windows: &[WindowId]) -> bool;
}
