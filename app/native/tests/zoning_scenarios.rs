//! End-to-end snapping scenarios against the simulated desktop.
//!
//! Each test drives a [`WindowManager`] through the public API with a
//! [`ManualScheduler`], so timers fire only when the test advances the clock.

use std::time::Duration;

use zonesnap_lib::modules::zoning::{
    DesktopCommand, GrabOp, ManualScheduler, MonitorLayout, Point, Rect, Scenario, SimulatedDesktop,
    StaticRegistry, WindowInfo, WindowManager, Zone, ZoneSettings, find_target_zone, run_scenario,
};

type Manager = WindowManager<SimulatedDesktop, StaticRegistry, ManualScheduler>;

// ============================================================================
// Helpers
// ============================================================================

const SCREEN: Rect = Rect::new(0, 0, 1920, 1080);

fn left_half() -> Zone { Zone::new("left", 0, 0, 0, 960, 1080) }

fn manager(desktop: &SimulatedDesktop, settings: ZoneSettings) -> Manager {
    let mut manager =
        WindowManager::new(desktop.clone(), StaticRegistry::new(settings), ManualScheduler::new());
    manager.connect_signals();
    manager
}

fn window_at(frame: Rect) -> WindowInfo {
    WindowInfo {
        frame,
        monitor: Some(0),
        ..WindowInfo::default()
    }
}

fn drag(manager: &mut Manager, desktop: &SimulatedDesktop, window: u64, to: Point) {
    manager.grab_op_begin(window, GrabOp::Moving);
    desktop.set_pointer(to);
    manager.advance(Duration::from_millis(60));
    manager.grab_op_end(window, GrabOp::Moving);
}

// ============================================================================
// Detection
// ============================================================================

#[test]
fn test_detector_matches_exactly_the_closed_zone_rect() {
    let layout = MonitorLayout::new(vec![Rect::new(100, 50, 1920, 1080)]);
    let zones = vec![Zone::new("box", 0, 10, 20, 100, 200)];
    // Absolute rect: x 110..=210, y 70..=270.

    let inside = [(110, 70), (210, 270), (110, 270), (210, 70), (160, 100)];
    let outside = [(109, 70), (211, 270), (110, 69), (210, 271), (0, 0)];

    for (x, y) in inside {
        assert!(
            find_target_zone(&zones, Point::new(x, y), Some(0), &layout).is_some(),
            "({x}, {y}) should hit"
        );
    }
    for (x, y) in outside {
        assert!(
            find_target_zone(&zones, Point::new(x, y), Some(0), &layout).is_none(),
            "({x}, {y}) should miss"
        );
    }
}

#[test]
fn test_detector_unknown_monitor_uses_primary_work_area() {
    let layout = MonitorLayout {
        work_areas: vec![Rect::new(0, 0, 1920, 1080), Rect::new(1920, 0, 1920, 1080)],
        primary: 1,
    };
    let zones = vec![Zone::new("ghost", 7, 0, 0, 100, 100)];

    let hit = find_target_zone(&zones, Point::new(1950, 50), Some(7), &layout);
    assert_eq!(hit.map(|z| z.name.as_str()), Some("ghost"));
    assert!(find_target_zone(&zones, Point::new(50, 50), Some(7), &layout).is_none());
    assert!(find_target_zone(&zones, Point::new(1950, 50), None, &layout).is_none());
}

// ============================================================================
// Snapping
// ============================================================================

#[test]
fn test_drag_into_zone_then_back_out_restores_frame() {
    let desktop = SimulatedDesktop::new(vec![SCREEN]);
    let original = Rect::new(1000, 100, 800, 600);
    desktop.insert_window(1, window_at(original));
    let mut manager = manager(&desktop, ZoneSettings::with_zones(vec![left_half()]));

    drag(&mut manager, &desktop, 1, Point::new(400, 500));
    assert_eq!(desktop.window(1).map(|w| w.frame), Some(Rect::new(0, 0, 960, 1080)));
    assert!(manager.is_zoned(1));
    assert_eq!(manager.original_rect(1), Some(original));

    drag(&mut manager, &desktop, 1, Point::new(1500, 500));
    assert_eq!(desktop.window(1).map(|w| w.frame), Some(original));
    assert!(!manager.is_zoned(1));
    assert_eq!(manager.tracked_window_count(), 0);
    assert_eq!(desktop.move_resize_count(), 2);
}

#[test]
fn test_snapping_a_window_that_already_fills_the_zone_sends_nothing() {
    let desktop = SimulatedDesktop::new(vec![SCREEN]);
    desktop.insert_window(1, window_at(Rect::new(0, 0, 960, 1080)));
    let mut manager = manager(&desktop, ZoneSettings::with_zones(vec![left_half()]));

    drag(&mut manager, &desktop, 1, Point::new(10, 10));
    drag(&mut manager, &desktop, 1, Point::new(900, 1000));

    assert!(manager.is_zoned(1));
    assert_eq!(desktop.move_resize_count(), 0);
}

#[test]
fn test_release_off_every_monitor_falls_back_to_window_monitor() {
    let desktop =
        SimulatedDesktop::new(vec![Rect::new(0, 0, 1920, 1080), Rect::new(1920, 0, 1920, 1080)]);
    desktop.insert_window(1, WindowInfo {
        frame: Rect::new(2000, 100, 600, 400),
        monitor: Some(1),
        ..WindowInfo::default()
    });
    // Reaches above the top edge of monitor 1.
    let zones = vec![Zone::new("overhang", 1, 0, -100, 1920, 200)];
    let mut manager = manager(&desktop, ZoneSettings::with_zones(zones));

    drag(&mut manager, &desktop, 1, Point::new(2500, -50));

    assert_eq!(desktop.window(1).map(|w| w.frame), Some(Rect::new(1920, -100, 1920, 200)));
    assert!(manager.is_zoned(1));
}

#[test]
fn test_zoning_disabled_release_does_nothing() {
    let desktop = SimulatedDesktop::new(vec![SCREEN]);
    desktop.insert_window(1, window_at(Rect::new(1000, 100, 800, 600)));
    let settings = ZoneSettings {
        zoning_enabled: false,
        ..ZoneSettings::with_zones(vec![left_half()])
    };
    let mut manager = manager(&desktop, settings);

    manager.grab_op_end(1, GrabOp::Moving);

    assert!(desktop.commands().is_empty());
    assert!(desktop.overlay_events().is_empty());
}

// ============================================================================
// New Windows
// ============================================================================

#[test]
fn test_window_destroyed_before_settling_is_never_moved() {
    let desktop = SimulatedDesktop::new(vec![SCREEN]);
    let settings = ZoneSettings {
        tile_new_windows: true,
        ..ZoneSettings::with_zones(vec![left_half()])
    };
    let mut manager = manager(&desktop, settings);

    desktop.insert_window(1, window_at(Rect::new(100, 100, 400, 400)));
    manager.window_created(1);
    manager.advance(Duration::from_millis(50));
    desktop.remove_window(1);
    manager.window_destroyed(1);
    manager.advance(Duration::from_millis(500));

    assert!(desktop.commands().is_empty());
    assert_eq!(manager.pending_settle_count(), 0);
    assert_eq!(manager.tracked_window_count(), 0);
}

#[test]
fn test_new_window_snaps_to_zone_under_its_center() {
    let desktop = SimulatedDesktop::new(vec![SCREEN]);
    let settings = ZoneSettings {
        tile_new_windows: true,
        ..ZoneSettings::with_zones(vec![left_half()])
    };
    let mut manager = manager(&desktop, settings);

    desktop.insert_window(1, window_at(Rect::new(100, 100, 400, 400)));
    manager.window_created(1);
    manager.advance(Duration::from_millis(99));
    assert!(desktop.commands().is_empty());

    manager.advance(Duration::from_millis(1));
    assert_eq!(desktop.commands(), vec![DesktopCommand::MoveResize {
        window: 1,
        rect: Rect::new(0, 0, 960, 1080),
    }]);
}

// ============================================================================
// Scripts
// ============================================================================

#[test]
fn test_scenario_script_round_trip() {
    let script = r#"{
        "monitors": [{ "x": 0, "y": 0, "width": 1920, "height": 1080 }],
        "zones": [{ "name": "left", "x": 0, "y": 0, "width": 960, "height": 1080 }],
        "windows": [{ "id": 1, "frame": { "x": 1000, "y": 100, "width": 800, "height": 600 }, "monitor": 0 }],
        "steps": [
            { "action": "pointer", "x": 1400, "y": 400 },
            { "action": "drag", "window": 1, "x": 400, "y": 500 },
            { "action": "drag", "window": 1, "x": 1400, "y": 400 }
        ]
    }"#;
    let scenario: Scenario = serde_json::from_str(script).unwrap();

    let report = run_scenario(&scenario, ZoneSettings::default());

    assert_eq!(report.commands, vec![
        DesktopCommand::MoveResize {
            window: 1,
            rect: Rect::new(0, 0, 960, 1080)
        },
        DesktopCommand::MoveResize {
            window: 1,
            rect: Rect::new(1000, 100, 800, 600)
        },
    ]);
    assert!(!report.overlay_events.is_empty());
    assert_eq!(report.windows.len(), 1);
    assert!(!report.windows[0].zoned);
    assert_eq!(report.engine.dragging, None);
    assert_eq!(report.engine.highlighted, None);
}
