//! Mode toolbar: three buttons centred at the top of the monitor under the cursor

use crate::selection::SnapMode;
use capture::{Point, Rect};

pub const BUTTON_WIDTH: u32 = 72;
pub const BUTTON_HEIGHT: u32 = 32;
const BUTTON_GAP: i32 = 4;
const FRAME_PADDING: i32 = 6;
/// Distance from the top edge of the monitor
const TOP_MARGIN: i32 = 12;

/// Button order, left to right
pub const MODES: [SnapMode; 3] = [SnapMode::Free, SnapMode::Monitor, SnapMode::Window];

impl SnapMode {
    pub fn label(&self) -> &'static str {
        match self {
            SnapMode::Free => "Rect",
            SnapMode::Monitor => "Monitor",
            SnapMode::Window => "Window",
        }
    }
}

/// Overlay-local layout of the toolbar
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Toolbar {
    pub frame: Rect,
    pub buttons: [(SnapMode, Rect); 3],
}

impl Toolbar {
    /// Layout for a monitor given in overlay-local coordinates
    pub fn on_monitor(monitor: Rect) -> Self {
        let count = MODES.len() as i32;
        let inner = BUTTON_WIDTH as i32 * count + BUTTON_GAP * (count - 1);
        let frame_width = inner + FRAME_PADDING * 2;
        let frame_height = BUTTON_HEIGHT as i32 + FRAME_PADDING * 2;

        let frame = Rect::new(
            monitor.x + (monitor.width as i32 - frame_width) / 2,
            monitor.y + TOP_MARGIN,
            frame_width as u32,
            frame_height as u32,
        );

        let buttons = std::array::from_fn(|index| {
            let x = frame.x + FRAME_PADDING + index as i32 * (BUTTON_WIDTH as i32 + BUTTON_GAP);
            (
                MODES[index],
                Rect::new(x, frame.y + FRAME_PADDING, BUTTON_WIDTH, BUTTON_HEIGHT),
            )
        });

        Self { frame, buttons }
    }

    pub fn contains(&self, local: Point) -> bool {
        self.frame.contains(local.x, local.y)
    }

    /// Mode of the button under `local`, if any
    pub fn hit(&self, local: Point) -> Option<SnapMode> {
        self.buttons
            .iter()
            .find(|(_, rect)| rect.contains(local.x, local.y))
            .map(|(mode, _)| *mode)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn toolbar_is_centred_below_monitor_top() {
        let toolbar = Toolbar::on_monitor(Rect::new(1920, 0, 2560, 1440));
        let frame = toolbar.frame;

        assert_eq!(frame.y, 12);
        assert_eq!(frame.x - 1920, 1920 + 2560 - frame.right());
        assert_eq!(frame.width, 3 * 72 + 2 * 4 + 12);
    }

    #[test]
    fn buttons_sit_left_to_right_inside_frame() {
        let toolbar = Toolbar::on_monitor(Rect::new(0, 0, 1920, 1080));
        let modes: Vec<SnapMode> = toolbar.buttons.iter().map(|(m, _)| *m).collect();
        assert_eq!(modes, MODES.to_vec());

        for window in toolbar.buttons.windows(2) {
            assert!(window[0].1.right() < window[1].1.x);
        }
        for (_, rect) in toolbar.buttons {
            assert_eq!(toolbar.frame.intersection(&rect), Some(rect));
        }
    }

    #[test]
    fn hit_test_finds_buttons_not_gaps() {
        let toolbar = Toolbar::on_monitor(Rect::new(0, 0, 1920, 1080));
        let monitor_button = toolbar.buttons[1].1;

        assert_eq!(
            toolbar.hit(Point::new(monitor_button.x + 1, monitor_button.y + 1)),
            Some(SnapMode::Monitor)
        );

        let gap = Point::new(monitor_button.right() + 1, monitor_button.y + 1);
        assert!(toolbar.contains(gap));
        assert_eq!(toolbar.hit(gap), None);
        assert_eq!(toolbar.hit(Point::new(5, 500)), None);
    }
}
