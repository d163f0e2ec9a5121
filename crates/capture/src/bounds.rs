//! Desktop geometry in virtual-screen pixel coordinates

/// Point on the virtual desktop
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

/// Monitor or window extents: left/top inclusive, right/bottom exclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Bounds {
    pub left: i32,
    pub top: i32,
    pub right: i32,
    pub bottom: i32,
}

impl Bounds {
    /// Seed for unions; also what a query returns when nothing was found.
    pub const EMPTY: Bounds = Bounds {
        left: i32::MAX,
        top: i32::MAX,
        right: i32::MIN,
        bottom: i32::MIN,
    };

    pub const ZERO: Bounds = Bounds {
        left: 0,
        top: 0,
        right: 0,
        bottom: 0,
    };

    pub const fn new(left: i32, top: i32, right: i32, bottom: i32) -> Self {
        Self { left, top, right, bottom }
    }

    /// Build from a position and a pixel size
    pub fn from_origin_size(x: i32, y: i32, width: u32, height: u32) -> Self {
        Self::new(x, y, x.saturating_add(width as i32), y.saturating_add(height as i32))
    }

    /// True for the "no displays" sentinel and any inverted bounds
    pub fn is_empty(&self) -> bool {
        self.left > self.right || self.top > self.bottom
    }

    pub fn width(&self) -> u32 {
        if self.is_empty() {
            0
        } else {
            (self.right as i64 - self.left as i64) as u32
        }
    }

    pub fn height(&self) -> u32 {
        if self.is_empty() {
            0
        } else {
            (self.bottom as i64 - self.top as i64) as u32
        }
    }

    pub fn origin(&self) -> Point {
        Point::new(self.left, self.top)
    }

    pub fn contains(&self, x: i32, y: i32) -> bool {
        x >= self.left && x < self.right && y >= self.top && y < self.bottom
    }

    pub fn union(&self, other: &Bounds) -> Bounds {
        Bounds::new(
            self.left.min(other.left),
            self.top.min(other.top),
            self.right.max(other.right),
            self.bottom.max(other.bottom),
        )
    }
}

impl Default for Bounds {
    fn default() -> Self {
        Self::ZERO
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_sentinel_has_no_size() {
        assert!(Bounds::EMPTY.is_empty());
        assert_eq!(Bounds::EMPTY.width(), 0);
        assert_eq!(Bounds::EMPTY.height(), 0);
    }

    #[test]
    fn union_with_empty_is_identity() {
        let b = Bounds::new(-1920, 0, 0, 1080);
        assert_eq!(Bounds::EMPTY.union(&b), b);
    }

    #[test]
    fn contains_is_half_open() {
        let b = Bounds::new(0, 0, 1920, 1080);
        assert!(b.contains(0, 0));
        assert!(b.contains(1919, 1079));
        assert!(!b.contains(1920, 500));
        assert!(!b.contains(500, 1080));
    }
}
