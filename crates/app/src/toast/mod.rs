//! Stacked toast notifications

mod stack;
#[cfg(windows)]
mod window;

pub use stack::{NotificationStack, ToastId, TOAST_HEIGHT, TOAST_SPACING, TOAST_WIDTH};
#[cfg(windows)]
pub use window::Toasts;

use capture::{Bounds, Point};
use std::time::Duration;

pub const AUTO_CLOSE_AFTER: Duration = Duration::from_secs(5);

/// Gap between the stack and the work area edge
pub const SCREEN_MARGIN: i32 = 16;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastKind {
    /// Spinner-style notice, stays until updated
    Wait,
    Success,
    Fail,
}

impl ToastKind {
    pub fn title(&self) -> &'static str {
        match self {
            ToastKind::Wait => "Please wait",
            ToastKind::Success => "Success",
            ToastKind::Fail => "Failed",
        }
    }

    pub fn auto_close(&self) -> Option<Duration> {
        match self {
            ToastKind::Wait => None,
            ToastKind::Success | ToastKind::Fail => Some(AUTO_CLOSE_AFTER),
        }
    }
}

/// Top-left corner of a toast `offset` pixels above the bottom of the stack
pub fn toast_position(work_area: Bounds, offset: i32) -> Point {
    Point::new(
        work_area.right - SCREEN_MARGIN - TOAST_WIDTH,
        work_area.bottom - SCREEN_MARGIN - TOAST_HEIGHT - offset,
    )
}
