//! Integer geometry shared by the zoning engine.
//!
//! Three coordinate spaces meet here:
//! - zone-local offsets (relative to a monitor's work area),
//! - work-area rectangles (global screen coordinates, as reported by the compositor),
//! - absolute window frames (global screen coordinates).
//!
//! Everything is integral: compositors hand out integer frames and a snap must
//! match the target rectangle bit-exactly.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

// ============================================================================
// Point
// ============================================================================

/// A point in global screen coordinates.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    /// Create a new point.
    #[must_use]
    pub const fn new(x: i32, y: i32) -> Self { Self { x, y } }
}

// ============================================================================
// Rect
// ============================================================================

/// A rectangle with position and size.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl Rect {
    /// Create a new rectangle.
    #[must_use]
    pub const fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self { x, y, width, height }
    }

    /// Create a zero-sized rectangle at origin.
    #[must_use]
    pub const fn zero() -> Self { Self::new(0, 0, 0, 0) }

    /// Check if this rectangle has a non-zero area.
    #[must_use]
    pub const fn has_area(&self) -> bool { self.width > 0 && self.height > 0 }

    /// Check if this rectangle contains a point, inclusive on every edge.
    ///
    /// A point exactly on the right or bottom edge is inside. Two zones that
    /// share an edge therefore both contain the points on it; ordering decides.
    /// Far edges are computed in `i64`, so rectangles reaching past
    /// `i32::MAX` still answer correctly.
    #[must_use]
    pub fn contains_closed(&self, point: Point) -> bool {
        let (px, py) = (i64::from(point.x), i64::from(point.y));

        px >= i64::from(self.x)
            && px <= i64::from(self.x) + i64::from(self.width)
            && py >= i64::from(self.y)
            && py <= i64::from(self.y) + i64::from(self.height)
    }

    /// Translate this rectangle by the origin of `origin`.
    ///
    /// Used to lift a work-area-relative rectangle into global coordinates.
    /// The origin saturates at the `i32` bounds.
    #[must_use]
    pub const fn offset_by(&self, origin: &Self) -> Self {
        Self::new(
            origin.x.saturating_add(self.x),
            origin.y.saturating_add(self.y),
            self.width,
            self.height,
        )
    }

    /// Get the center point of this rectangle.
    ///
    /// Halves round toward negative infinity.
    #[must_use]
    pub const fn center(&self) -> Point {
        Point::new(
            self.x.saturating_add(self.width.div_euclid(2)),
            self.y.saturating_add(self.height.div_euclid(2)),
        )
    }

    /// Format as `x,y widthxheight` for logs and CLI output.
    #[must_use]
    pub fn describe(&self) -> String {
        format!("{},{} {}x{}", self.x, self.y, self.width, self.height)
    }
}

impl std::fmt::Display for Rect {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {}, {}, {})", self.x, self.y, self.width, self.height)
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_contains_closed_includes_all_edges() {
        let rect = Rect::new(10, 20, 100, 50);

        assert!(rect.contains_closed(Point::new(10, 20)));
        assert!(rect.contains_closed(Point::new(110, 20)));
        assert!(rect.contains_closed(Point::new(10, 70)));
        assert!(rect.contains_closed(Point::new(110, 70)));
        assert!(rect.contains_closed(Point::new(60, 45)));
    }

    #[test]
    fn test_contains_closed_rejects_outside() {
        let rect = Rect::new(10, 20, 100, 50);

        assert!(!rect.contains_closed(Point::new(9, 45)));
        assert!(!rect.contains_closed(Point::new(111, 45)));
        assert!(!rect.contains_closed(Point::new(60, 19)));
        assert!(!rect.contains_closed(Point::new(60, 71)));
    }

    #[test]
    fn test_degenerate_rect_still_contains_its_edge() {
        // The point test alone does not exclude zero-sized rectangles.
        let line = Rect::new(5, 5, 0, 10);
        assert!(line.contains_closed(Point::new(5, 8)));
        assert!(!line.has_area());
    }

    #[test]
    fn test_contains_closed_near_i32_bounds() {
        let rect = Rect::new(i32::MAX - 10, 0, 100, 100);

        assert!(rect.contains_closed(Point::new(i32::MAX, 50)));
        assert!(!rect.contains_closed(Point::new(0, 50)));
    }

    #[test]
    fn test_offset_by_saturates() {
        let far = Rect::new(2_000_000_000, -2_000_000_000, 10, 10);
        let origin = Rect::new(1_000_000_000, -1_000_000_000, 1920, 1080);

        assert_eq!(far.offset_by(&origin), Rect::new(i32::MAX, i32::MIN, 10, 10));
    }

    #[test]
    fn test_offset_by_work_area() {
        let zone_local = Rect::new(0, 0, 960, 1080);
        let work_area = Rect::new(1920, 32, 1920, 1048);

        assert_eq!(zone_local.offset_by(&work_area), Rect::new(1920, 32, 960, 1080));
    }

    #[test]
    fn test_center_rounds_toward_negative_infinity() {
        assert_eq!(Rect::new(0, 0, 400, 400).center(), Point::new(200, 200));
        assert_eq!(Rect::new(0, 0, 5, 7).center(), Point::new(2, 3));
        assert_eq!(Rect::new(-10, -10, 5, 5).center(), Point::new(-8, -8));
    }

    #[test]
    fn test_has_area() {
        assert!(Rect::new(0, 0, 1, 1).has_area());
        assert!(!Rect::new(0, 0, 0, 1).has_area());
        assert!(!Rect::zero().has_area());
    }

    #[test]
    fn test_display_formats() {
        let rect = Rect::new(1, 2, 3, 4);
        assert_eq!(rect.to_string(), "(1, 2, 3, 4)");
        assert_eq!(rect.describe(), "1,2 3x4");
    }
}
