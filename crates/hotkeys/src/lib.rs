//! Global hotkeys and modifier tracking for CapYap
//!
//! Keys are polled rather than registered with the OS so that modifier
//! presses alone (Ctrl, Shift, Alt) can drive the overlay.

pub mod events;
pub mod key;
pub mod manager;
#[cfg(windows)]
pub mod native;
pub mod poller;
pub mod tracker;

pub use events::{EventTable, SubscriptionId};
pub use key::{HotKey, Modifiers, VirtualKey};
pub use manager::{BindingAction, HotKeyManager, ModifierKey};
#[cfg(windows)]
pub use native::AsyncKeyStateSource;
pub use poller::{HotKeyPoller, KeyStateSource, POLL_INTERVAL};
pub use tracker::{KeyEdge, KeySnapshot, KeyState, KeyTracker};

use thiserror::Error;

#[derive(Error, Debug)]
pub enum HotKeyError {
    #[error("Invalid hotkey: {0:?}")]
    InvalidHotKey(String),

    #[error("{0:?} is already bound")]
    AlreadyBound(BindingAction),

    #[error("Failed to start key poller: {0}")]
    Io(#[from] std::io::Error),
}

pub type HotKeyResult<T> = Result<T, HotKeyError>;
