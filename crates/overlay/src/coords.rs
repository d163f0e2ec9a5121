//! Conversion between virtual-desktop and overlay-local coordinates

use capture::{Bounds, Point, Rect};

/// Top-left corner of the overlay on the virtual desktop.
///
/// The overlay and the screenshot bitmap share this origin, so overlay-local
/// coordinates index the bitmap directly.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Origin {
    pub x: i32,
    pub y: i32,
}

impl Origin {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    pub fn to_local(&self, global: Point) -> Point {
        Point::new(global.x - self.x, global.y - self.y)
    }

    pub fn to_global(&self, local: Point) -> Point {
        Point::new(local.x + self.x, local.y + self.y)
    }

    /// Global bounds as an overlay-local crop rectangle
    pub fn bounds_to_local(&self, global: &Bounds) -> Rect {
        let top_left = self.to_local(Point::new(global.left, global.top));
        Rect::new(top_left.x, top_left.y, global.width(), global.height())
    }
}

impl From<Point> for Origin {
    fn from(p: Point) -> Self {
        Self::new(p.x, p.y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn local_and_global_are_inverse() {
        let origin = Origin::new(-1920, -120);
        let p = Point::new(15, 300);
        assert_eq!(origin.to_global(origin.to_local(p)), p);
        assert_eq!(origin.to_local(Point::new(-1920, -120)), Point::new(0, 0));
    }

    #[test]
    fn bounds_convert_to_local_rect() {
        let origin = Origin::new(-1280, -200);
        let monitor = Bounds::new(0, 0, 1920, 1080);
        assert_eq!(
            origin.bounds_to_local(&monitor),
            Rect::new(1280, 200, 1920, 1080)
        );
    }
}
