//! Selection logic for free, monitor and window selection

use crate::coords::Origin;
use crate::toolbar::Toolbar;
use capture::{monitor_at, Bounds, Desktop, Point, Rect, WindowEntry};

/// Minimum selection size, smaller drags dismiss the overlay
pub const MIN_SELECTION_SIZE: u32 = 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Hovering,
    Dragging,
    Committed,
    Dismissed,
}

impl Phase {
    pub fn is_finished(&self) -> bool {
        matches!(self, Phase::Committed | Phase::Dismissed)
    }
}

/// How the selection follows the cursor
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SnapMode {
    /// Click and drag
    #[default]
    Free,
    /// Monitor under the cursor
    Monitor,
    /// Topmost window under the cursor, falling back to the monitor
    Window,
}

/// Keys forwarded to the overlay by the global key poller
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Modifier {
    Ctrl,
    Shift,
    Alt,
    Escape,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Continue,
    /// Overlay-local crop rectangle
    Commit(Rect),
    Dismiss,
}

/// Two corners in virtual-desktop coordinates, in drag order
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Selection {
    pub start: Point,
    pub end: Point,
}

impl Selection {
    pub const EMPTY: Selection = Selection {
        start: Point::new(0, 0),
        end: Point::new(0, 0),
    };

    pub fn from_bounds(bounds: &Bounds) -> Self {
        if bounds.is_empty() {
            return Self::EMPTY;
        }

        Self {
            start: Point::new(bounds.left, bounds.top),
            end: Point::new(bounds.right, bounds.bottom),
        }
    }

    /// Corners sorted so that left <= right and top <= bottom
    pub fn normalized(&self) -> Bounds {
        Bounds::new(
            self.start.x.min(self.end.x),
            self.start.y.min(self.end.y),
            self.start.x.max(self.end.x),
            self.start.y.max(self.end.y),
        )
    }

    pub fn is_empty(&self) -> bool {
        let b = self.normalized();
        b.width() < MIN_SELECTION_SIZE || b.height() < MIN_SELECTION_SIZE
    }
}

/// Selection state for one overlay session.
///
/// Every position fed in and kept here is virtual-desktop-global; the only
/// conversion to overlay-local happens through [`Origin`].
#[derive(Debug, Clone)]
pub struct SelectionTracker {
    origin: Origin,
    monitors: Vec<Bounds>,
    windows: Vec<WindowEntry>,
    cursor: Point,
    ctrl: bool,
    shift: bool,
    magnifier: bool,
    mode: SnapMode,
    phase: Phase,
    selection: Selection,
    /// Current press started on a toolbar button
    toolbar_press: bool,
}

impl SelectionTracker {
    pub fn new(origin: Origin, monitors: Vec<Bounds>, windows: Vec<WindowEntry>) -> Self {
        Self {
            origin,
            monitors,
            windows,
            cursor: Point::default(),
            ctrl: false,
            shift: false,
            magnifier: false,
            mode: SnapMode::Free,
            phase: Phase::Idle,
            selection: Selection::EMPTY,
            toolbar_press: false,
        }
    }

    /// Snapshot monitors and windows once for the session.
    ///
    /// `origin` is the top-left of the screenshot the overlay shows.
    pub fn from_desktop(origin: Origin, desktop: &dyn Desktop) -> Self {
        Self::new(origin, desktop.displays(), desktop.open_windows_bounds())
    }

    pub fn origin(&self) -> Origin {
        self.origin
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn mode(&self) -> SnapMode {
        self.mode
    }

    pub fn cursor(&self) -> Point {
        self.cursor
    }

    pub fn selection(&self) -> Selection {
        self.selection
    }

    pub fn magnifier(&self) -> bool {
        self.magnifier
    }

    pub fn ctrl_held(&self) -> bool {
        self.ctrl
    }

    pub fn shift_held(&self) -> bool {
        self.shift
    }

    /// Toolbar on the monitor under the cursor
    pub fn toolbar(&self) -> Option<Toolbar> {
        self.monitor_under_cursor()
            .map(|monitor| Toolbar::on_monitor(self.origin.bounds_to_local(&monitor)))
    }

    /// Current selection as an overlay-local rectangle, `None` while empty
    pub fn selection_local(&self) -> Option<Rect> {
        if self.selection.is_empty() {
            None
        } else {
            Some(self.origin.bounds_to_local(&self.selection.normalized()))
        }
    }

    pub fn mouse_move(&mut self, global: Point) {
        if self.phase.is_finished() {
            return;
        }

        self.cursor = global;
        if self.phase == Phase::Idle {
            self.phase = Phase::Hovering;
        }

        self.refresh();
    }

    pub fn mouse_down(&mut self) {
        if self.phase.is_finished() {
            return;
        }

        let local = self.origin.to_local(self.cursor);
        if let Some(toolbar) = self.toolbar().filter(|t| t.contains(local)) {
            self.toolbar_press = true;
            if let Some(mode) = toolbar.hit(local) {
                self.set_mode(mode);
            }
            return;
        }

        if self.mode != SnapMode::Free {
            return;
        }

        self.selection = Selection {
            start: self.cursor,
            end: self.cursor,
        };
        self.phase = Phase::Dragging;
    }

    pub fn mouse_up(&mut self) -> Outcome {
        if self.phase.is_finished() {
            return Outcome::Continue;
        }

        if std::mem::take(&mut self.toolbar_press) {
            return Outcome::Continue;
        }

        self.ctrl = false;
        self.shift = false;

        if self.selection.is_empty() {
            tracing::debug!(selection = ?self.selection, "empty selection, dismissing overlay");
            self.phase = Phase::Dismissed;
            return Outcome::Dismiss;
        }

        let rect = self.origin.bounds_to_local(&self.selection.normalized());
        self.phase = Phase::Committed;
        Outcome::Commit(rect)
    }

    pub fn set_ctrl(&mut self, down: bool) {
        self.ctrl = down;
        self.shift = false;
        self.change_mode(if down { SnapMode::Monitor } else { SnapMode::Free });
    }

    pub fn set_shift(&mut self, down: bool) {
        self.shift = down;
        self.ctrl = false;
        self.change_mode(if down { SnapMode::Window } else { SnapMode::Free });
    }

    /// Mode picked explicitly, overriding held modifiers
    pub fn set_mode(&mut self, mode: SnapMode) {
        self.ctrl = mode == SnapMode::Monitor;
        self.shift = mode == SnapMode::Window;
        self.change_mode(mode);
    }

    pub fn set_magnifier(&mut self, on: bool) {
        self.magnifier = on;
    }

    pub fn escape(&mut self) -> Outcome {
        self.phase = Phase::Dismissed;
        Outcome::Dismiss
    }

    /// Apply a key transition reported by the key poller
    pub fn apply_modifier(&mut self, key: Modifier, down: bool) -> Outcome {
        if self.phase.is_finished() {
            return Outcome::Continue;
        }

        match key {
            Modifier::Ctrl => self.set_ctrl(down),
            Modifier::Shift => self.set_shift(down),
            Modifier::Alt => self.set_magnifier(down),
            Modifier::Escape if down => return self.escape(),
            Modifier::Escape => {}
        }

        Outcome::Continue
    }

    fn change_mode(&mut self, mode: SnapMode) {
        if self.phase.is_finished() {
            return;
        }

        self.mode = mode;
        self.selection = Selection::EMPTY;

        // Snapping replaces any drag in progress
        if mode != SnapMode::Free && self.phase == Phase::Dragging {
            self.phase = Phase::Hovering;
        }

        self.refresh();
    }

    fn refresh(&mut self) {
        match self.mode {
            SnapMode::Monitor => {
                self.selection = self
                    .monitor_under_cursor()
                    .map(|b| Selection::from_bounds(&b))
                    .unwrap_or(Selection::EMPTY);
            }
            SnapMode::Window => {
                let target = self
                    .window_under_cursor()
                    .or_else(|| self.monitor_under_cursor());
                self.selection = target
                    .map(|b| Selection::from_bounds(&b))
                    .unwrap_or(Selection::EMPTY);
            }
            SnapMode::Free => {
                if self.phase == Phase::Dragging {
                    self.selection.end = self.cursor;
                } else {
                    self.selection = Selection::EMPTY;
                }
            }
        }
    }

    fn monitor_under_cursor(&self) -> Option<Bounds> {
        monitor_at(&self.monitors, self.cursor.x, self.cursor.y)
    }

    /// Windows are kept in Z-order, so the first hit is the topmost
    fn window_under_cursor(&self) -> Option<Bounds> {
        self.windows
            .iter()
            .find(|w| w.contains(self.cursor.x, self.cursor.y))
            .map(|w| w.bounds)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn single_monitor() -> SelectionTracker {
        SelectionTracker::new(
            Origin::new(0, 0),
            vec![Bounds::new(0, 0, 1920, 1080)],
            Vec::new(),
        )
    }

    fn drag(tracker: &mut SelectionTracker, from: (i32, i32), to: (i32, i32)) -> Outcome {
        tracker.mouse_move(Point::new(from.0, from.1));
        tracker.mouse_down();
        tracker.mouse_move(Point::new(to.0, to.1));
        tracker.mouse_up()
    }

    #[test]
    fn free_drag_commits_normalized_rect() {
        let expected = Outcome::Commit(Rect::new(50, 50, 150, 100));

        let mut forward = single_monitor();
        assert_eq!(drag(&mut forward, (50, 50), (200, 150)), expected);
        assert_eq!(forward.phase(), Phase::Committed);

        let mut backward = single_monitor();
        assert_eq!(drag(&mut backward, (200, 150), (50, 50)), expected);
    }

    #[test]
    fn zero_area_drag_dismisses() {
        let mut flat = single_monitor();
        assert_eq!(drag(&mut flat, (10, 10), (300, 10)), Outcome::Dismiss);
        assert_eq!(flat.phase(), Phase::Dismissed);

        let mut click = single_monitor();
        assert_eq!(drag(&mut click, (10, 10), (10, 10)), Outcome::Dismiss);
    }

    #[test]
    fn release_without_press_dismisses() {
        let mut tracker = single_monitor();
        tracker.mouse_move(Point::new(400, 400));
        assert_eq!(tracker.phase(), Phase::Hovering);
        assert_eq!(tracker.mouse_up(), Outcome::Dismiss);
    }

    #[test]
    fn ctrl_snaps_to_monitor_under_cursor() {
        let mut tracker = SelectionTracker::new(
            Origin::new(-1280, -200),
            vec![Bounds::new(0, 0, 1920, 1080), Bounds::new(-1280, -200, 0, 824)],
            Vec::new(),
        );

        tracker.set_ctrl(true);
        tracker.mouse_move(Point::new(500, 500));
        assert_eq!(tracker.mode(), SnapMode::Monitor);

        assert_eq!(
            tracker.mouse_up(),
            Outcome::Commit(Rect::new(1280, 200, 1920, 1080))
        );
        assert!(!tracker.ctrl_held());
    }

    #[test]
    fn shift_prefers_topmost_window_then_monitor() {
        let mut tracker = SelectionTracker::new(
            Origin::new(0, 0),
            vec![Bounds::new(0, 0, 1920, 1080)],
            vec![
                WindowEntry::new("dialog", Bounds::new(200, 200, 400, 300)),
                WindowEntry::new("editor", Bounds::new(100, 100, 800, 600)),
            ],
        );

        tracker.set_shift(true);
        tracker.mouse_move(Point::new(250, 250));
        assert_eq!(tracker.selection_local(), Some(Rect::new(200, 200, 200, 100)));

        tracker.mouse_move(Point::new(700, 500));
        assert_eq!(tracker.selection_local(), Some(Rect::new(100, 100, 700, 500)));

        tracker.mouse_move(Point::new(1500, 900));
        assert_eq!(tracker.selection_local(), Some(Rect::new(0, 0, 1920, 1080)));
    }

    #[test]
    fn ctrl_and_shift_are_exclusive() {
        let mut tracker = single_monitor();
        tracker.mouse_move(Point::new(10, 10));

        tracker.set_ctrl(true);
        tracker.set_shift(true);
        assert_eq!(tracker.mode(), SnapMode::Window);

        tracker.set_ctrl(true);
        assert_eq!(tracker.mode(), SnapMode::Monitor);

        tracker.set_ctrl(false);
        assert_eq!(tracker.mode(), SnapMode::Free);
        assert_eq!(tracker.selection_local(), None);
    }

    #[test]
    fn mouse_down_is_ignored_while_snapping() {
        let mut tracker = single_monitor();
        tracker.mouse_move(Point::new(10, 10));
        tracker.set_ctrl(true);
        tracker.mouse_down();
        assert_eq!(tracker.phase(), Phase::Hovering);
    }

    #[test]
    fn snapping_cancels_drag_in_progress() {
        let mut tracker = single_monitor();
        tracker.mouse_move(Point::new(10, 10));
        tracker.mouse_down();
        tracker.mouse_move(Point::new(100, 100));
        assert_eq!(tracker.phase(), Phase::Dragging);

        tracker.set_ctrl(true);
        assert_eq!(tracker.phase(), Phase::Hovering);
        tracker.set_ctrl(false);
        assert_eq!(tracker.selection_local(), None);
    }

    #[test]
    fn escape_dismisses_and_freezes_state() {
        let mut tracker = single_monitor();
        tracker.mouse_move(Point::new(10, 10));
        tracker.mouse_down();

        assert_eq!(
            tracker.apply_modifier(Modifier::Escape, true),
            Outcome::Dismiss
        );
        tracker.mouse_move(Point::new(300, 300));
        assert_eq!(tracker.mouse_up(), Outcome::Continue);
        assert_eq!(tracker.phase(), Phase::Dismissed);
    }

    fn click(tracker: &mut SelectionTracker, at: Point) -> Outcome {
        tracker.mouse_move(at);
        tracker.mouse_down();
        tracker.mouse_up()
    }

    #[test]
    fn toolbar_buttons_switch_mode_without_closing() {
        let mut tracker = single_monitor();
        tracker.mouse_move(Point::new(900, 500));
        let toolbar = tracker.toolbar().unwrap();
        let (_, window_button) = toolbar.buttons[2];
        let (_, monitor_button) = toolbar.buttons[1];

        let on_window = Point::new(window_button.x + 2, window_button.y + 2);
        assert_eq!(click(&mut tracker, on_window), Outcome::Continue);
        assert_eq!(tracker.mode(), SnapMode::Window);
        assert!(tracker.shift_held());

        let on_monitor = Point::new(monitor_button.x + 2, monitor_button.y + 2);
        assert_eq!(click(&mut tracker, on_monitor), Outcome::Continue);
        assert_eq!(tracker.mode(), SnapMode::Monitor);
        assert_eq!(tracker.phase(), Phase::Hovering);

        assert_eq!(
            click(&mut tracker, Point::new(900, 500)),
            Outcome::Commit(Rect::new(0, 0, 1920, 1080))
        );
    }

    #[test]
    fn drag_cannot_start_on_toolbar() {
        let mut tracker = single_monitor();
        tracker.mouse_move(Point::new(900, 500));
        let frame = tracker.toolbar().unwrap().frame;

        tracker.mouse_move(Point::new(frame.x + 1, frame.y + 1));
        tracker.mouse_down();
        assert_eq!(tracker.phase(), Phase::Hovering);
        tracker.mouse_move(Point::new(1500, 900));
        assert_eq!(tracker.mouse_up(), Outcome::Continue);
        assert_eq!(tracker.mode(), SnapMode::Free);
    }

    #[test]
    fn toolbar_follows_monitor_under_cursor() {
        let mut tracker = SelectionTracker::new(
            Origin::new(-1280, 0),
            vec![Bounds::new(0, 0, 1920, 1080), Bounds::new(-1280, 0, 0, 1024)],
            Vec::new(),
        );

        tracker.mouse_move(Point::new(-600, 300));
        let left = tracker.toolbar().unwrap().frame;
        assert!(left.x > 0 && left.right() < 1280);

        tracker.mouse_move(Point::new(600, 300));
        let right = tracker.toolbar().unwrap().frame;
        assert!(right.x > 1280 && right.right() < 1280 + 1920);
    }

    #[test]
    fn magnifier_does_not_touch_selection() {
        let mut tracker = single_monitor();
        tracker.mouse_move(Point::new(10, 10));
        tracker.mouse_down();
        tracker.mouse_move(Point::new(60, 40));

        tracker.apply_modifier(Modifier::Alt, true);
        assert!(tracker.magnifier());
        assert_eq!(tracker.phase(), Phase::Dragging);
        assert_eq!(tracker.selection_local(), Some(Rect::new(10, 10, 50, 30)));
    }
}
