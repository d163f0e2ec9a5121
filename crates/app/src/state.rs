//! State machine for CapYap

/// Application state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppState {
    /// Idle state - ready to capture
    Idle,
    /// Overlay open, waiting for a selection
    Selecting,
}

impl AppState {
    /// Tooltip text for the tray icon
    pub fn display_text(&self) -> &'static str {
        match self {
            AppState::Idle => "CapYap",
            AppState::Selecting => "CapYap - selecting...",
        }
    }

    pub fn can_capture(&self) -> bool {
        matches!(self, AppState::Idle)
    }
}

/// State machine transitions
#[derive(Debug)]
pub struct StateMachine {
    state: AppState,
    pending_uploads: usize,
}

impl StateMachine {
    pub fn new() -> Self {
        Self {
            state: AppState::Idle,
            pending_uploads: 0,
        }
    }

    pub fn state(&self) -> AppState {
        self.state
    }

    /// Uploads handed to a worker that have not reported back yet
    pub fn pending_uploads(&self) -> usize {
        self.pending_uploads
    }

    /// Transition to selecting state; false while an overlay is already open
    pub fn start_selecting(&mut self) -> bool {
        if self.state.can_capture() {
            self.state = AppState::Selecting;
            true
        } else {
            false
        }
    }

    /// Overlay closed, return to idle
    pub fn finish_selecting(&mut self) -> bool {
        if matches!(self.state, AppState::Selecting) {
            self.state = AppState::Idle;
            true
        } else {
            false
        }
    }

    pub fn upload_started(&mut self) {
        self.pending_uploads += 1;
    }

    pub fn upload_finished(&mut self) {
        self.pending_uploads = self.pending_uploads.saturating_sub(1);
    }

    /// Tray tooltip for the current state
    pub fn tooltip(&self) -> String {
        match self.pending_uploads {
            0 => self.state.display_text().to_string(),
            n => format!("{} ({n} uploading)", self.state.display_text()),
        }
    }

    /// Reset to idle
    pub fn reset(&mut self) {
        self.state = AppState::Idle;
        self.pending_uploads = 0;
    }
}

impl Default for StateMachine {
    fn default() -> Self {
        Self::new()
    }
}
