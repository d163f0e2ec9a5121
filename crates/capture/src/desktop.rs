//! Display and window bounds queries

use crate::bounds::Bounds;

/// Visible top-level window
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WindowEntry {
    pub title: String,
    pub bounds: Bounds,
}

impl WindowEntry {
    pub fn new(title: impl Into<String>, bounds: Bounds) -> Self {
        Self {
            title: title.into(),
            bounds,
        }
    }

    pub fn contains(&self, x: i32, y: i32) -> bool {
        self.bounds.contains(x, y)
    }
}

/// Source of display and window extents.
///
/// Implementations never fail: an enumeration that the OS refuses is
/// reported as an empty list.
pub trait Desktop {
    /// Bounds of every display attached to the desktop
    fn displays(&self) -> Vec<Bounds>;

    /// Visible, non-cloaked, titled top-level windows, topmost first
    fn open_windows(&self) -> Vec<WindowEntry>;

    /// Union of all displays, `Bounds::EMPTY` if there are none
    fn full_virtual_bounds(&self) -> Bounds {
        union_bounds(&self.displays())
    }

    /// Display containing the point
    fn current_monitor_bounds(&self, x: i32, y: i32) -> Option<Bounds> {
        monitor_at(&self.displays(), x, y)
    }

    fn open_windows_bounds(&self) -> Vec<WindowEntry> {
        self.open_windows()
    }
}

pub fn union_bounds(displays: &[Bounds]) -> Bounds {
    displays
        .iter()
        .fold(Bounds::EMPTY, |acc, display| acc.union(display))
}

pub fn monitor_at(displays: &[Bounds], x: i32, y: i32) -> Option<Bounds> {
    displays.iter().copied().find(|d| d.contains(x, y))
}

/// Fixed layout, used when the desktop is described up front
#[derive(Debug, Clone, Default)]
pub struct StaticDesktop {
    pub displays: Vec<Bounds>,
    pub windows: Vec<WindowEntry>,
}

impl StaticDesktop {
    pub fn new(displays: Vec<Bounds>, windows: Vec<WindowEntry>) -> Self {
        Self { displays, windows }
    }
}

impl Desktop for StaticDesktop {
    fn displays(&self) -> Vec<Bounds> {
        self.displays.clone()
    }

    fn open_windows(&self) -> Vec<WindowEntry> {
        self.windows.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dual_monitor() -> StaticDesktop {
        StaticDesktop::new(
            vec![
                Bounds::new(0, 0, 1920, 1080),
                Bounds::new(-1280, -200, 0, 824),
            ],
            Vec::new(),
        )
    }

    #[test]
    fn full_bounds_is_union_of_displays() {
        let desktop = dual_monitor();
        assert_eq!(
            desktop.full_virtual_bounds(),
            Bounds::new(-1280, -200, 1920, 1080)
        );
    }

    #[test]
    fn no_displays_yields_empty_sentinel() {
        let desktop = StaticDesktop::default();
        let full = desktop.full_virtual_bounds();
        assert!(full.is_empty());
        assert!(full.left > full.right);
    }

    #[test]
    fn monitor_lookup_returns_containing_display() {
        let desktop = dual_monitor();
        assert_eq!(
            desktop.current_monitor_bounds(-640, 300),
            Some(Bounds::new(-1280, -200, 0, 824))
        );
        assert_eq!(
            desktop.current_monitor_bounds(960, 540),
            Some(Bounds::new(0, 0, 1920, 1080))
        );
    }

    #[test]
    fn point_outside_every_display_has_no_monitor() {
        let desktop = dual_monitor();
        assert_eq!(desktop.current_monitor_bounds(-640, 900), None);
    }
}
