//! Hidden application window: tray, hotkeys, capture sessions, upload results

use crate::clipboard;
use crate::pipeline::prepare_upload;
use crate::settings::{settings_path, Settings, APP_DIR};
use crate::sound::{self, Clip};
use crate::startup;
use crate::state::StateMachine;
use crate::toast::{ToastId, ToastKind, Toasts};
use crate::tray::{
    SystemTray, ID_TRAY_AUTOSTART, ID_TRAY_CAPTURE, ID_TRAY_EXIT, ID_TRAY_OPEN_BROWSER,
    ID_TRAY_SETTINGS, WM_TRAYICON,
};
use crate::upload::{HttpUploader, UploadDispatcher, UploadReport, UploadRequest, Uploader};
use capture::{capture_all_monitors, NativeDesktop};
use crossbeam_channel::{unbounded, Receiver, Sender};
use hotkeys::{
    AsyncKeyStateSource, BindingAction, HotKey, HotKeyManager, HotKeyPoller, HotKeyResult,
    KeyEdge, ModifierKey,
};
use once_cell::sync::OnceCell;
use overlay::{Modifier, OverlayWindow};
use parking_lot::Mutex;
use std::cell::RefCell;
use std::collections::HashMap;
use std::sync::Arc;
use uuid::Uuid;
use windows::core::{w, PCWSTR};
use windows::Win32::Foundation::{HINSTANCE, HWND, LPARAM, LRESULT, WPARAM};
use windows::Win32::System::LibraryLoader::GetModuleHandleW;
use windows::Win32::UI::WindowsAndMessaging::*;

/// Custom messages posted by worker threads
pub const WM_APP_KEY_EVENT: u32 = WM_USER + 100;
pub const WM_APP_UPLOAD_DONE: u32 = WM_USER + 101;
pub const WM_APP_CAPTURE: u32 = WM_USER + 102;

const CLOSE_CROP_VIEW_HOTKEY: &str = "Esc";

static UI_STATE: OnceCell<Arc<Mutex<UiState>>> = OnceCell::new();

thread_local! {
    static TRAY: RefCell<Option<SystemTray>> = RefCell::new(None);
    static HOTKEYS: RefCell<Option<HotKeys>> = RefCell::new(None);
}

/// State reachable from any thread
pub struct UiState {
    pub state_machine: StateMachine,
    pub settings: Settings,
    dispatcher: UploadDispatcher,
    uploads: Receiver<UploadReport>,
    key_events: Receiver<KeyEdge>,
    /// Upload ticket -> its "uploading" toast
    toasts: HashMap<Uuid, ToastId>,
}

/// Bindings and poller, UI thread only
struct HotKeys {
    manager: HotKeyManager,
    poller: HotKeyPoller,
    sender: Sender<KeyEdge>,
}

impl HotKeys {
    fn restart_poller(&mut self, hwnd_raw: isize) -> HotKeyResult<()> {
        self.poller.stop();
        self.poller = start_poller(&self.manager, self.sender.clone(), hwnd_raw)?;
        Ok(())
    }
}

fn hwnd_from_raw(raw: isize) -> HWND {
    HWND(raw as *mut std::ffi::c_void)
}

fn post(hwnd_raw: isize, msg: u32) {
    unsafe {
        let _ = PostMessageW(hwnd_from_raw(hwnd_raw), msg, WPARAM(0), LPARAM(0));
    }
}

fn make_uploader(settings: &Settings) -> anyhow::Result<Arc<dyn Uploader>> {
    let uploader = HttpUploader::new(&settings.upload.api_host, settings.upload.upload_key.clone())?;
    Ok(Arc::new(uploader))
}

fn start_poller(
    manager: &HotKeyManager,
    sender: Sender<KeyEdge>,
    hwnd_raw: isize,
) -> HotKeyResult<HotKeyPoller> {
    HotKeyPoller::start(AsyncKeyStateSource, manager.watched_keys(), sender, move || {
        post(hwnd_raw, WM_APP_KEY_EVENT)
    })
}

fn overlay_modifier(key: ModifierKey) -> Modifier {
    match key {
        ModifierKey::Ctrl => Modifier::Ctrl,
        ModifierKey::Shift => Modifier::Shift,
        ModifierKey::Alt => Modifier::Alt,
        ModifierKey::Escape => Modifier::Escape,
    }
}

/// Hidden top-level window owning the tray icon
pub struct AppWindow {
    hwnd: HWND,
}

impl AppWindow {
    const CLASS_NAME: PCWSTR = w!("CapYapMain");

    pub fn create(settings: Settings) -> anyhow::Result<Self> {
        let hwnd = unsafe {
            let hinstance = HINSTANCE(GetModuleHandleW(None)?.0);

            let wc = WNDCLASSEXW {
                cbSize: std::mem::size_of::<WNDCLASSEXW>() as u32,
                lpfnWndProc: Some(Self::wnd_proc),
                hInstance: hinstance,
                lpszClassName: Self::CLASS_NAME,
                ..Default::default()
            };
            RegisterClassExW(&wc);

            // Never shown; exists for the tray and posted messages
            CreateWindowExW(
                WINDOW_EX_STYLE::default(),
                Self::CLASS_NAME,
                w!("CapYap"),
                WS_OVERLAPPED,
                0,
                0,
                0,
                0,
                None,
                None,
                hinstance,
                None,
            )?
        };
        // Store as isize for thread safety
        let hwnd_raw = hwnd.0 as isize;

        let (dispatcher, uploads) = UploadDispatcher::new(make_uploader(&settings)?, move || {
            post(hwnd_raw, WM_APP_UPLOAD_DONE)
        });
        let (key_sender, key_events) = unbounded();

        let hotkeys = Self::install_hotkeys(&settings, key_sender, hwnd_raw)?;
        HOTKEYS.with(|h| *h.borrow_mut() = Some(hotkeys));

        let _ = UI_STATE.set(Arc::new(Mutex::new(UiState {
            state_machine: StateMachine::new(),
            settings,
            dispatcher,
            uploads,
            key_events,
            toasts: HashMap::new(),
        })));

        TRAY.with(|tray| {
            let mut new_tray = SystemTray::new(hwnd);
            if let Err(e) = new_tray.show() {
                tracing::warn!("failed to add tray icon: {e}");
            }
            *tray.borrow_mut() = Some(new_tray);
        });

        Ok(Self { hwnd })
    }

    fn install_hotkeys(
        settings: &Settings,
        sender: Sender<KeyEdge>,
        hwnd_raw: isize,
    ) -> HotKeyResult<HotKeys> {
        let mut manager = HotKeyManager::new();
        manager.bind(BindingAction::CaptureScreen, settings.hotkeys.capture_hotkey())?;
        manager.bind(BindingAction::CloseCropView, HotKey::parse(CLOSE_CROP_VIEW_HOTKEY)?)?;

        // Captures run from a fresh message, never inside key dispatch
        manager.on_action(BindingAction::CaptureScreen, move |_| post(hwnd_raw, WM_APP_CAPTURE));
        manager.on_action(BindingAction::CloseCropView, |_| {
            OverlayWindow::handle_modifier(Modifier::Escape, true);
        });
        for key in [ModifierKey::Ctrl, ModifierKey::Shift, ModifierKey::Alt] {
            manager.on_modifier(key, move |down| {
                OverlayWindow::handle_modifier(overlay_modifier(key), *down);
            });
        }

        let poller = start_poller(&manager, sender.clone(), hwnd_raw)?;
        Ok(HotKeys {
            manager,
            poller,
            sender,
        })
    }

    /// Run message loop
    pub fn run_message_loop() -> i32 {
        unsafe {
            let mut msg = MSG::default();
            while GetMessageW(&mut msg, None, 0, 0).into() {
                let _ = TranslateMessage(&msg);
                DispatchMessageW(&msg);
            }
            msg.wParam.0 as i32
        }
    }

    fn update_tooltip() {
        let Some(state) = UI_STATE.get() else {
            return;
        };
        let text = state.lock().state_machine.tooltip();
        TRAY.with(|tray| {
            if let Some(ref mut tray) = *tray.borrow_mut() {
                tray.set_tooltip(&text);
            }
        });
    }

    fn on_key_events() {
        let Some(state) = UI_STATE.get() else {
            return;
        };
        let edges: Vec<KeyEdge> = state.lock().key_events.try_iter().collect();

        HOTKEYS.with(|h| {
            if let Some(ref mut hotkeys) = *h.borrow_mut() {
                for edge in edges {
                    hotkeys.manager.handle(edge);
                }
            }
        });
    }

    /// Pick up edits made to the settings file since the last capture
    fn reload_settings(hwnd: HWND) {
        let Some(state) = UI_STATE.get() else {
            return;
        };

        let settings = match Settings::load(&settings_path()) {
            Ok(settings) => settings,
            Err(e) => {
                tracing::warn!("keeping current settings: {e}");
                return;
            }
        };

        let hotkey_changed = {
            let mut state = state.lock();
            if state.settings.upload != settings.upload {
                match make_uploader(&settings) {
                    Ok(uploader) => state.dispatcher.set_uploader(uploader),
                    Err(e) => tracing::warn!("keeping current uploader: {e}"),
                }
            }
            let changed = state.settings.hotkeys != settings.hotkeys;
            state.settings = settings.clone();
            changed
        };

        if hotkey_changed {
            let hotkey = settings.hotkeys.capture_hotkey();
            HOTKEYS.with(|h| {
                if let Some(ref mut hotkeys) = *h.borrow_mut() {
                    hotkeys.manager.rebind(BindingAction::CaptureScreen, hotkey);
                    if let Err(e) = hotkeys.restart_poller(hwnd.0 as isize) {
                        tracing::error!("failed to restart key poller: {e}");
                    }
                }
            });
        }
    }

    fn capture_screen(hwnd: HWND) {
        let Some(state) = UI_STATE.get() else {
            return;
        };

        if !state.lock().state_machine.start_selecting() {
            tracing::error!("overlay is already open");
            return;
        }

        Self::reload_settings(hwnd);
        Self::update_tooltip();

        // The lock is not held across the overlay's nested message loop
        let settings = state.lock().settings.clone();
        let result = Self::run_capture_session(&settings);

        state.lock().state_machine.finish_selecting();

        match result {
            Ok(Some(request)) => Self::start_upload(request),
            Ok(None) => {}
            Err(e) => {
                tracing::error!("failed to capture the screen: {e:#}");
                let _ = Toasts::show(ToastKind::Fail, &e.to_string());
            }
        }

        Self::update_tooltip();
    }

    fn run_capture_session(settings: &Settings) -> anyhow::Result<Option<UploadRequest>> {
        let desktop = NativeDesktop;

        sound::play(Clip::Capture);

        // Before the overlay exists, so it stays out of the bitmap
        let screenshot = capture_all_monitors(&desktop, settings.app.capture_cursor)?;

        Toasts::hide_all();
        let outcome = OverlayWindow::show(&screenshot, &desktop);
        Toasts::show_all();

        let request = prepare_upload(outcome?, &screenshot, &settings.upload, &APP_DIR)?;
        Ok(request)
    }

    fn start_upload(request: UploadRequest) {
        let Some(state) = UI_STATE.get() else {
            return;
        };

        let toast = Toasts::show(ToastKind::Wait, "Uploading screen capture...");
        let mut state = state.lock();
        let ticket = request.ticket;

        match state.dispatcher.dispatch(request) {
            Ok(()) => {
                state.state_machine.upload_started();
                if let Ok(id) = toast {
                    state.toasts.insert(ticket, id);
                }
            }
            Err(e) => {
                drop(state);
                tracing::error!("failed to start upload: {e}");
                match toast {
                    Ok(id) => {
                        Toasts::update(id, ToastKind::Fail, &e.to_string());
                    }
                    Err(_) => {
                        let _ = Toasts::show(ToastKind::Fail, &e.to_string());
                    }
                }
            }
        }
    }

    fn on_uploads_done() {
        let Some(state) = UI_STATE.get() else {
            return;
        };

        let (reports, copy_image) = {
            let state = state.lock();
            let reports: Vec<UploadReport> = state.uploads.try_iter().collect();
            (reports, state.settings.upload.copy_image_on_failure)
        };

        for report in reports {
            let toast = {
                let mut state = state.lock();
                state.state_machine.upload_finished();
                state.toasts.remove(&report.ticket)
            };

            if report.result.is_ok() {
                sound::play(Clip::Complete);
            }
            let (kind, message) = match report.result {
                Ok(url) => match clipboard::set_text(&url) {
                    Ok(()) => (
                        ToastKind::Success,
                        "Screen capture uploaded and copied to clipboard".to_string(),
                    ),
                    Err(e) => {
                        tracing::warn!("failed to copy url: {e}");
                        (ToastKind::Success, url)
                    }
                },
                Err(e) => {
                    if copy_image {
                        if let Err(e) = clipboard::set_image(&report.image) {
                            tracing::warn!("failed to copy image: {e}");
                        }
                    }
                    (ToastKind::Fail, e.to_string())
                }
            };

            let updated = toast.is_some_and(|id| Toasts::update(id, kind, &message));
            if !updated {
                let _ = Toasts::show(kind, &message);
            }
        }

        Self::update_tooltip();
    }

    fn open_in_browser() {
        let Some(state) = UI_STATE.get() else {
            return;
        };
        let host = state.lock().settings.upload.api_host.clone();
        if let Err(e) = open::that(&host) {
            tracing::error!("failed to open {host}: {e}");
        }
    }

    fn open_settings() {
        let path = settings_path();
        if !path.exists() {
            let settings = UI_STATE
                .get()
                .map(|state| state.lock().settings.clone())
                .unwrap_or_default();
            if let Err(e) = settings.save(&path) {
                tracing::error!("failed to write settings: {e}");
                return;
            }
        }
        if let Err(e) = open::that(&path) {
            tracing::error!("failed to open settings: {e}");
        }
    }

    fn toggle_autostart() {
        let enabled = !startup::is_enabled();
        if let Err(e) = startup::set_enabled(enabled) {
            tracing::error!("failed to change autostart: {e}");
            return;
        }

        if let Some(state) = UI_STATE.get() {
            let mut state = state.lock();
            state.settings.app.auto_start = enabled;
            if let Err(e) = state.settings.save(&settings_path()) {
                tracing::error!("failed to save settings: {e}");
            }
        }
    }

    unsafe extern "system" fn wnd_proc(
        hwnd: HWND,
        msg: u32,
        wparam: WPARAM,
        lparam: LPARAM,
    ) -> LRESULT {
        match msg {
            WM_COMMAND => {
                match (wparam.0 & 0xFFFF) as u32 {
                    ID_TRAY_CAPTURE => Self::capture_screen(hwnd),
                    ID_TRAY_OPEN_BROWSER => Self::open_in_browser(),
                    ID_TRAY_SETTINGS => Self::open_settings(),
                    ID_TRAY_AUTOSTART => Self::toggle_autostart(),
                    ID_TRAY_EXIT => {
                        let _ = DestroyWindow(hwnd);
                    }
                    _ => {}
                }
                LRESULT(0)
            }

            WM_TRAYICON => {
                let event = (lparam.0 & 0xFFFF) as u32;
                if event == WM_RBUTTONUP {
                    let autostart = startup::is_enabled();
                    TRAY.with(|tray| {
                        if let Some(ref tray) = *tray.borrow() {
                            let _ = tray.show_context_menu(autostart);
                        }
                    });
                } else if event == WM_LBUTTONDBLCLK {
                    Self::capture_screen(hwnd);
                }
                LRESULT(0)
            }

            WM_APP_KEY_EVENT => {
                Self::on_key_events();
                LRESULT(0)
            }

            WM_APP_CAPTURE => {
                Self::capture_screen(hwnd);
                LRESULT(0)
            }

            WM_APP_UPLOAD_DONE => {
                Self::on_uploads_done();
                LRESULT(0)
            }

            WM_DESTROY => {
                if let Some(state) = UI_STATE.get() {
                    let mut state = state.lock();
                    let pending = state.state_machine.pending_uploads();
                    if pending > 0 {
                        tracing::warn!(pending, "quitting with uploads in flight");
                    }
                    state.state_machine.reset();
                }
                HOTKEYS.with(|h| {
                    if let Some(mut hotkeys) = h.borrow_mut().take() {
                        hotkeys.poller.stop();
                    }
                });
                TRAY.with(|tray| {
                    *tray.borrow_mut() = None;
                });
                Toasts::close_all();
                PostQuitMessage(0);
                LRESULT(0)
            }

            _ => DefWindowProcW(hwnd, msg, wparam, lparam),
        }
    }
}

impl Drop for AppWindow {
    fn drop(&mut self) {
        unsafe {
            if IsWindow(self.hwnd).as_bool() {
                let _ = DestroyWindow(self.hwnd);
            }
        }
    }
}
