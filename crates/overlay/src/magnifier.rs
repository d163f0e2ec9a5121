//! Magnifier loupe placement

use capture::{Point, Rect};

/// Loupe edge length in pixels
pub const LOUPE_SIZE: u32 = 120;
/// Screen pixels per sampled pixel
pub const LOUPE_ZOOM: u32 = 12;
/// Gap between the cursor and the loupe
const CURSOR_GAP: i32 = 20;

/// Where the loupe is drawn and which bitmap square it magnifies
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Loupe {
    /// Overlay-local destination square
    pub dest: Rect,
    /// Bitmap-local source square centred on the cursor
    pub source: Rect,
}

impl Loupe {
    /// Loupe for a cursor at `cursor` (overlay-local) on a `width` x `height` surface.
    ///
    /// Sits below-right of the cursor and flips to the other side on any
    /// axis where it would leave the surface.
    pub fn around(cursor: Point, width: u32, height: u32) -> Self {
        let size = LOUPE_SIZE as i32;

        let mut x = cursor.x + CURSOR_GAP;
        if x + size > width as i32 {
            x = cursor.x - CURSOR_GAP - size;
        }

        let mut y = cursor.y + CURSOR_GAP;
        if y + size > height as i32 {
            y = cursor.y - CURSOR_GAP - size;
        }

        let span = LOUPE_SIZE / LOUPE_ZOOM;
        let half = span as i32 / 2;

        Self {
            dest: Rect::new(x, y, LOUPE_SIZE, LOUPE_SIZE),
            source: Rect::new(cursor.x - half, cursor.y - half, span, span),
        }
    }

    /// Centre of the destination square, where the crosshair goes
    pub fn center(&self) -> Point {
        Point::new(
            self.dest.x + self.dest.width as i32 / 2,
            self.dest.y + self.dest.height as i32 / 2,
        )
    }
}
