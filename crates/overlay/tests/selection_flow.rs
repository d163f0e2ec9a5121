use capture::{Bounds, Point, Rect, StaticDesktop, WindowEntry};
use capture::Desktop;
use overlay::{Origin, Outcome, SelectionOutcome, SelectionTracker, SnapMode};

/// Secondary monitor left of and above the primary
fn desktop() -> StaticDesktop {
    StaticDesktop::new(
        vec![
            Bounds::new(0, 0, 2560, 1440),
            Bounds::new(-1920, -300, 0, 780),
        ],
        vec![WindowEntry::new("Terminal", Bounds::new(-1500, 0, -500, 600))],
    )
}

fn tracker() -> SelectionTracker {
    let desktop = desktop();
    SelectionTracker::from_desktop(Origin::from(desktop.full_virtual_bounds().origin()), &desktop)
}

#[test]
fn drag_across_monitors_is_overlay_local() {
    let mut tracker = tracker();

    tracker.mouse_move(Point::new(-100, -100));
    tracker.mouse_down();
    tracker.mouse_move(Point::new(300, 200));

    let outcome = tracker.mouse_up();
    assert_eq!(outcome, Outcome::Commit(Rect::new(1820, 200, 400, 300)));
    assert_eq!(
        Option::<SelectionOutcome>::from(outcome),
        Some(SelectionOutcome::Region(Rect::new(1820, 200, 400, 300)))
    );
}

#[test]
fn monitor_snap_on_secondary_display() {
    let mut tracker = tracker();

    tracker.mouse_move(Point::new(-10, 700));
    tracker.set_mode(SnapMode::Monitor);

    assert_eq!(
        tracker.mouse_up(),
        Outcome::Commit(Rect::new(0, 0, 1920, 1080))
    );
}

#[test]
fn window_snap_uses_client_bounds() {
    let mut tracker = tracker();

    tracker.set_shift(true);
    tracker.mouse_move(Point::new(-1000, 300));

    assert_eq!(
        tracker.mouse_up(),
        Outcome::Commit(Rect::new(420, 300, 1000, 600))
    );
}

#[test]
fn pointer_in_dead_zone_snaps_to_nothing() {
    // Below the secondary monitor, outside every display
    let mut tracker = tracker();

    tracker.set_ctrl(true);
    tracker.mouse_move(Point::new(-800, 1000));

    assert_eq!(tracker.selection_local(), None);
    assert_eq!(tracker.mouse_up(), Outcome::Dismiss);
}

#[test]
fn screenshot_origin_wins_over_current_layout() {
    // Secondary display unplugged after the bitmap was taken
    let current = StaticDesktop::new(vec![Bounds::new(0, 0, 2560, 1440)], Vec::new());
    let mut tracker = SelectionTracker::from_desktop(Origin::new(-1920, -300), &current);

    tracker.mouse_move(Point::new(100, 100));
    tracker.mouse_down();
    tracker.mouse_move(Point::new(300, 200));

    assert_eq!(
        tracker.mouse_up(),
        Outcome::Commit(Rect::new(2020, 400, 200, 100))
    );
}

#[test]
fn ctrl_before_first_move_uses_seeded_pointer() {
    let mut tracker = tracker();

    // Pointer position at overlay start, before any WM_MOUSEMOVE
    tracker.mouse_move(Point::new(-900, 100));
    tracker.set_ctrl(true);

    assert_eq!(tracker.selection_local(), Some(Rect::new(0, 0, 1920, 1080)));
    let toolbar = tracker.toolbar().unwrap();
    assert!(toolbar.frame.right() <= 1920);
}
