//! Overlay window implementation

use crate::{
    coords::Origin,
    render::OverlayRenderer,
    selection::{Modifier, Outcome, SelectionTracker},
    OverlayError, OverlayResult, SelectionOutcome,
};
use capture::{Desktop, Point, Screenshot};
use std::cell::RefCell;
use windows::core::{w, PCWSTR};
use windows::Win32::Foundation::{HINSTANCE, HWND, LPARAM, LRESULT, POINT, WPARAM};
use windows::Win32::Graphics::Gdi::{InvalidateRect, UpdateWindow};
use windows::Win32::System::LibraryLoader::GetModuleHandleW;
use windows::Win32::UI::Input::KeyboardAndMouse::{SetFocus, VK_ESCAPE};
use windows::Win32::UI::WindowsAndMessaging::{
    CreateWindowExW, DefWindowProcW, DestroyWindow, DispatchMessageW, GetCursorPos, GetMessageW,
    LoadCursorW, PostQuitMessage, RegisterClassExW, SetForegroundWindow, ShowWindow,
    TranslateMessage, CS_HREDRAW, CS_VREDRAW, IDC_CROSS, MSG, SW_SHOW, WM_CLOSE, WM_DESTROY,
    WM_ERASEBKGND, WM_KEYDOWN, WM_LBUTTONDOWN, WM_LBUTTONUP, WM_MOUSEMOVE, WM_PAINT, WNDCLASSEXW,
    WS_EX_TOOLWINDOW, WS_EX_TOPMOST, WS_POPUP,
};

thread_local! {
    static OVERLAY_STATE: RefCell<Option<Box<OverlayState>>> = RefCell::new(None);
}

struct OverlayState {
    hwnd: HWND,
    renderer: OverlayRenderer,
    tracker: SelectionTracker,
    result: Option<SelectionOutcome>,
}

impl OverlayState {
    fn apply(&mut self, outcome: Outcome) {
        if self.result.is_none() {
            self.result = outcome.into();
        }
    }
}

/// Overlay window for selection
pub struct OverlayWindow;

impl OverlayWindow {
    const CLASS_NAME: PCWSTR = w!("CapYapOverlay");

    /// Show the frozen screenshot and block until the user commits or dismisses.
    ///
    /// `screenshot` must have been captured from `desktop` before this call.
    /// Runs a nested message loop on the calling thread, so messages for
    /// other windows of that thread keep being dispatched.
    pub fn show(screenshot: &Screenshot, desktop: &dyn Desktop) -> OverlayResult<SelectionOutcome> {
        if Self::is_open() {
            return Err(OverlayError::AlreadyOpen);
        }

        let origin = Origin::from(screenshot.origin());
        let mut tracker = SelectionTracker::from_desktop(origin, desktop);
        // Modifiers pressed before the first mouse move act on the pointer's monitor
        if let Some(cursor) = Self::pointer_position() {
            tracker.mouse_move(cursor);
        }
        let renderer = OverlayRenderer::new(screenshot)?;
        let bounds = screenshot.bounds();

        unsafe {
            let hmodule = GetModuleHandleW(None)?;
            let hinstance = HINSTANCE(hmodule.0);

            let wc = WNDCLASSEXW {
                cbSize: std::mem::size_of::<WNDCLASSEXW>() as u32,
                style: CS_HREDRAW | CS_VREDRAW,
                lpfnWndProc: Some(Self::wnd_proc),
                hInstance: hinstance,
                hCursor: LoadCursorW(None, IDC_CROSS)?,
                lpszClassName: Self::CLASS_NAME,
                ..Default::default()
            };

            // Fails harmlessly once the class exists
            RegisterClassExW(&wc);

            let hwnd = CreateWindowExW(
                WS_EX_TOPMOST | WS_EX_TOOLWINDOW,
                Self::CLASS_NAME,
                w!("CapYap Overlay"),
                WS_POPUP,
                bounds.left,
                bounds.top,
                bounds.width() as i32,
                bounds.height() as i32,
                None,
                None,
                hinstance,
                None,
            )?;

            OVERLAY_STATE.with(|s| {
                *s.borrow_mut() = Some(Box::new(OverlayState {
                    hwnd,
                    renderer,
                    tracker,
                    result: None,
                }));
            });

            let _ = ShowWindow(hwnd, SW_SHOW);
            let _ = SetForegroundWindow(hwnd);
            let _ = SetFocus(hwnd);
            let _ = UpdateWindow(hwnd);
            tracing::debug!(?bounds, "overlay shown");

            // Nested message loop
            let mut msg = MSG::default();
            loop {
                let ret = GetMessageW(&mut msg, None, 0, 0);
                if !ret.as_bool() {
                    // Hand WM_QUIT back to the outer loop
                    PostQuitMessage(msg.wParam.0 as i32);
                    break;
                }
                let _ = TranslateMessage(&msg);
                DispatchMessageW(&msg);

                let has_result = OVERLAY_STATE.with(|s| {
                    s.borrow()
                        .as_ref()
                        .map(|state| state.result.is_some())
                        .unwrap_or(true)
                });
                if has_result {
                    break;
                }
            }

            let state = OVERLAY_STATE.with(|s| s.borrow_mut().take());
            let _ = DestroyWindow(hwnd);

            let outcome = state
                .and_then(|state| state.result)
                .unwrap_or(SelectionOutcome::Cancelled);
            tracing::debug!(?outcome, "overlay closed");
            Ok(outcome)
        }
    }

    pub fn is_open() -> bool {
        OVERLAY_STATE.with(|s| s.borrow().is_some())
    }

    /// Feed a modifier transition from the key poller into the open overlay.
    ///
    /// Returns false when no overlay is open on this thread.
    pub fn handle_modifier(key: Modifier, down: bool) -> bool {
        let hwnd = OVERLAY_STATE.with(|s| {
            s.borrow_mut().as_mut().map(|state| {
                let outcome = state.tracker.apply_modifier(key, down);
                state.apply(outcome);
                state.hwnd
            })
        });

        match hwnd {
            Some(hwnd) => {
                unsafe {
                    let _ = InvalidateRect(hwnd, None, false);
                }
                true
            }
            None => false,
        }
    }

    unsafe extern "system" fn wnd_proc(
        hwnd: HWND,
        msg: u32,
        wparam: WPARAM,
        lparam: LPARAM,
    ) -> LRESULT {
        match msg {
            WM_PAINT => {
                OVERLAY_STATE.with(|s| {
                    if let Some(ref state) = *s.borrow() {
                        state.renderer.render(hwnd, &state.tracker);
                    }
                });
                LRESULT(0)
            }

            // The whole client area is repainted from the back buffer
            WM_ERASEBKGND => LRESULT(1),

            WM_MOUSEMOVE => {
                let position = Self::cursor_position(lparam);
                Self::update(hwnd, |tracker| {
                    tracker.mouse_move(position);
                    Outcome::Continue
                });
                LRESULT(0)
            }

            WM_LBUTTONDOWN => {
                let position = Self::cursor_position(lparam);
                Self::update(hwnd, |tracker| {
                    tracker.mouse_move(position);
                    tracker.mouse_down();
                    Outcome::Continue
                });
                LRESULT(0)
            }

            WM_LBUTTONUP => {
                let position = Self::cursor_position(lparam);
                Self::update(hwnd, |tracker| {
                    tracker.mouse_move(position);
                    tracker.mouse_up()
                });
                LRESULT(0)
            }

            WM_KEYDOWN => {
                if wparam.0 == VK_ESCAPE.0 as usize {
                    Self::update(hwnd, |tracker| tracker.escape());
                }
                LRESULT(0)
            }

            WM_CLOSE => {
                Self::update(hwnd, |tracker| tracker.escape());
                LRESULT(0)
            }

            WM_DESTROY => LRESULT(0),

            _ => DefWindowProcW(hwnd, msg, wparam, lparam),
        }
    }

    fn pointer_position() -> Option<Point> {
        let mut point = POINT::default();
        unsafe { GetCursorPos(&mut point) }.ok()?;
        Some(Point::new(point.x, point.y))
    }

    /// Client coordinates of a mouse message, as a virtual-desktop point
    fn cursor_position(lparam: LPARAM) -> Point {
        let x = (lparam.0 & 0xFFFF) as i16 as i32;
        let y = ((lparam.0 >> 16) & 0xFFFF) as i16 as i32;

        OVERLAY_STATE.with(|s| match *s.borrow() {
            Some(ref state) => state.tracker.origin().to_global(Point::new(x, y)),
            None => Point::new(x, y),
        })
    }

    fn update(hwnd: HWND, f: impl FnOnce(&mut SelectionTracker) -> Outcome) {
        OVERLAY_STATE.with(|s| {
            if let Some(ref mut state) = *s.borrow_mut() {
                let outcome = f(&mut state.tracker);
                state.apply(outcome);
            }
        });

        unsafe {
            let _ = InvalidateRect(hwnd, None, false);
        }
    }
}
