//! CapYap - capture a screen region and share it as a link

#![cfg_attr(windows, windows_subsystem = "windows")]

mod clipboard;
mod logging;
mod pipeline;
mod settings;
mod sound;
mod startup;
mod state;
mod toast;
#[cfg(windows)]
mod tray;
#[cfg(windows)]
mod ui;
mod upload;

#[cfg(windows)]
fn main() -> anyhow::Result<()> {
    use crate::settings::{log_dir, settings_path, Settings};
    use crate::ui::AppWindow;
    use windows::Win32::UI::HiDpi::{
        SetProcessDpiAwarenessContext, DPI_AWARENESS_CONTEXT_PER_MONITOR_AWARE_V2,
    };

    // Logging depends on the settings, so load errors are reported afterwards
    let loaded = Settings::load(&settings_path());
    let settings = loaded.as_ref().cloned().unwrap_or_default();

    let _guard = logging::init(settings.app.debug_logging, &log_dir())?;
    tracing::info!(version = env!("CARGO_PKG_VERSION"), "CapYap starting");
    if let Err(e) = &loaded {
        tracing::error!("failed to load settings, using defaults: {e}");
    }

    // Physical pixels everywhere, matching the GDI capture
    unsafe {
        let _ = SetProcessDpiAwarenessContext(DPI_AWARENESS_CONTEXT_PER_MONITOR_AWARE_V2);
    }

    if settings.app.auto_start != startup::is_enabled() {
        if let Err(e) = startup::set_enabled(settings.app.auto_start) {
            tracing::warn!("failed to apply autostart setting: {e}");
        }
    }

    let window = AppWindow::create(settings)?;
    let exit_code = AppWindow::run_message_loop();
    drop(window);

    tracing::info!(exit_code, "CapYap stopped");
    Ok(())
}

#[cfg(not(windows))]
fn main() -> anyhow::Result<()> {
    anyhow::bail!("CapYap only runs on Windows")
}
