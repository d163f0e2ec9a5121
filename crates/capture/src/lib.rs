//! Screen capture module for CapYap
//!
//! Provides the desktop geometry model, display/window bounds queries and
//! full virtual-desktop screenshots.

pub mod bounds;
pub mod desktop;
#[cfg(windows)]
pub mod native;
pub mod screenshot;

pub use bounds::{Bounds, Point};
pub use desktop::{monitor_at, union_bounds, Desktop, StaticDesktop, WindowEntry};
#[cfg(windows)]
pub use native::NativeDesktop;
#[cfg(windows)]
pub use screenshot::capture_all_monitors;
pub use screenshot::Screenshot;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum CaptureError {
    #[cfg(windows)]
    #[error("Windows API error: {0}")]
    Windows(#[from] windows::core::Error),

    #[error("GDI error: {0}")]
    Gdi(String),

    #[error("No displays attached to the desktop")]
    NoDisplays,

    #[error("Invalid capture region: {0:?}")]
    InvalidRegion(Rect),

    #[error("Pixel buffer does not match {width}x{height}")]
    BufferSize { width: u32, height: u32 },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),
}

pub type CaptureResult<T> = Result<T, CaptureError>;

/// Rectangle in physical pixels
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

impl Rect {
    pub fn new(x: i32, y: i32, width: u32, height: u32) -> Self {
        Self { x, y, width, height }
    }

    pub fn right(&self) -> i32 {
        self.x + self.width as i32
    }

    pub fn bottom(&self) -> i32 {
        self.y + self.height as i32
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    pub fn contains(&self, x: i32, y: i32) -> bool {
        x >= self.x && x < self.right() && y >= self.y && y < self.bottom()
    }

    /// Overlapping part of two rectangles, `None` when they do not overlap
    pub fn intersection(&self, other: &Rect) -> Option<Rect> {
        let left = self.x.max(other.x);
        let top = self.y.max(other.y);
        let right = self.right().min(other.right());
        let bottom = self.bottom().min(other.bottom());

        if right <= left || bottom <= top {
            return None;
        }

        Some(Rect::new(left, top, (right - left) as u32, (bottom - top) as u32))
    }
}
