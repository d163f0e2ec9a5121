//! Overlay module for CapYap
//!
//! Provides the frozen screenshot overlay with free, monitor and window
//! selection.

pub mod coords;
pub mod magnifier;
#[cfg(windows)]
pub mod render;
pub mod selection;
pub mod toolbar;
#[cfg(windows)]
pub mod window;

pub use coords::Origin;
pub use magnifier::Loupe;
pub use selection::{Modifier, Outcome, Phase, Selection, SelectionTracker, SnapMode};
pub use toolbar::Toolbar;
#[cfg(windows)]
pub use window::OverlayWindow;

use capture::Rect;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum OverlayError {
    #[cfg(windows)]
    #[error("Windows API error: {0}")]
    Windows(#[from] windows::core::Error),

    #[error("Renderer setup failed: {0}")]
    Renderer(String),

    #[error("An overlay is already open")]
    AlreadyOpen,
}

pub type OverlayResult<T> = Result<T, OverlayError>;

/// Selection outcome
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionOutcome {
    /// User selected a region, overlay-local (= screenshot-local)
    Region(Rect),
    /// User cancelled or released on an empty selection
    Cancelled,
}

impl From<Outcome> for Option<SelectionOutcome> {
    fn from(outcome: Outcome) -> Self {
        match outcome {
            Outcome::Continue => None,
            Outcome::Commit(rect) => Some(SelectionOutcome::Region(rect)),
            Outcome::Dismiss => Some(SelectionOutcome::Cancelled),
        }
    }
}
