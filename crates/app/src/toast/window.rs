//! Toast popups (topmost, never activated)

use super::{toast_position, NotificationStack, ToastId, ToastKind, TOAST_HEIGHT, TOAST_WIDTH};
use capture::{Bounds, Point};
use std::cell::RefCell;
use std::collections::HashMap;
use std::sync::Once;
use uuid::Uuid;
use windows::core::{w, PCWSTR};
use windows::Win32::Foundation::{COLORREF, HINSTANCE, HWND, LPARAM, LRESULT, RECT, WPARAM};
use windows::Win32::Graphics::Gdi::{
    BeginPaint, CreateSolidBrush, DeleteObject, DrawTextW, EndPaint, FillRect, InvalidateRect,
    SetBkMode, SetTextColor, TextOutW, DT_END_ELLIPSIS, DT_NOPREFIX, DT_WORDBREAK, PAINTSTRUCT,
    TRANSPARENT,
};
use windows::Win32::System::LibraryLoader::GetModuleHandleW;
use windows::Win32::UI::WindowsAndMessaging::{
    CreateWindowExW, DefWindowProcW, DestroyWindow, GetClientRect, KillTimer, LoadCursorW,
    RegisterClassExW, SetTimer, SetWindowPos, ShowWindow, SystemParametersInfoW, HWND_TOPMOST,
    IDC_HAND, SPI_GETWORKAREA, SWP_NOACTIVATE, SWP_NOSIZE, SW_HIDE, SW_SHOWNOACTIVATE,
    SYSTEM_PARAMETERS_INFO_UPDATE_FLAGS, WM_LBUTTONUP, WM_PAINT, WM_TIMER, WNDCLASSEXW,
    WS_EX_NOACTIVATE, WS_EX_TOOLWINDOW, WS_EX_TOPMOST, WS_POPUP,
};

const TOAST_CLASS: PCWSTR = w!("CapYapToast");
const CLOSE_TIMER: usize = 1;
const ACCENT_WIDTH: i32 = 6;
const PADDING: i32 = 12;

const BACKGROUND: COLORREF = COLORREF(0x00202020);
const TITLE_COLOR: COLORREF = COLORREF(0x00FFFFFF);
const TEXT_COLOR: COLORREF = COLORREF(0x00C8C8C8);

static REGISTER: Once = Once::new();

thread_local! {
    static TOASTS: RefCell<ToastRegistry> = RefCell::new(ToastRegistry::default());
}

struct ToastEntry {
    hwnd: HWND,
    kind: ToastKind,
    message: String,
}

#[derive(Default)]
struct ToastRegistry {
    stack: NotificationStack,
    entries: HashMap<ToastId, ToastEntry>,
}

impl ToastRegistry {
    fn id_of(&self, hwnd: HWND) -> Option<ToastId> {
        self.entries
            .iter()
            .find(|(_, entry)| entry.hwnd == hwnd)
            .map(|(id, _)| *id)
    }

    /// Target position of every toast, newest first
    fn placements(&self) -> Vec<(HWND, Point)> {
        let work_area = primary_work_area();

        self.stack
            .layout()
            .into_iter()
            .filter_map(|(id, _)| {
                let entry = self.entries.get(&id)?;
                let offset = self.stack.offset(id)?;
                Some((entry.hwnd, toast_position(work_area, offset)))
            })
            .collect()
    }
}

/// Move every toast to its slot; window calls happen outside the borrow
fn apply_layout() {
    let (placements, hidden) = TOASTS.with(|t| {
        let registry = t.borrow();
        (registry.placements(), registry.stack.is_hidden())
    });

    for (hwnd, position) in placements {
        unsafe {
            let _ = SetWindowPos(
                hwnd,
                HWND_TOPMOST,
                position.x,
                position.y,
                0,
                0,
                SWP_NOACTIVATE | SWP_NOSIZE,
            );
            ShowWindow(hwnd, if hidden { SW_HIDE } else { SW_SHOWNOACTIVATE });
        }
    }
}

fn accent(kind: ToastKind) -> COLORREF {
    match kind {
        ToastKind::Wait => COLORREF(0x00D47800),
        ToastKind::Success => COLORREF(0x0050AF4C),
        ToastKind::Fail => COLORREF(0x003643F4),
    }
}

fn primary_work_area() -> Bounds {
    let mut rect = RECT::default();
    unsafe {
        let _ = SystemParametersInfoW(
            SPI_GETWORKAREA,
            0,
            Some(&mut rect as *mut RECT as *mut _),
            SYSTEM_PARAMETERS_INFO_UPDATE_FLAGS(0),
        );
    }
    Bounds::new(rect.left, rect.top, rect.right, rect.bottom)
}

fn register_class() -> windows::core::Result<HINSTANCE> {
    let hinstance = unsafe { HINSTANCE(GetModuleHandleW(None)?.0) };

    REGISTER.call_once(|| unsafe {
        let wc = WNDCLASSEXW {
            cbSize: std::mem::size_of::<WNDCLASSEXW>() as u32,
            lpfnWndProc: Some(toast_wnd_proc),
            hInstance: hinstance,
            hCursor: LoadCursorW(None, IDC_HAND).unwrap_or_default(),
            lpszClassName: TOAST_CLASS,
            ..Default::default()
        };

        let _ = RegisterClassExW(&wc);
    });

    Ok(hinstance)
}

/// Toast windows owned by the UI thread
pub struct Toasts;

impl Toasts {
    pub fn show(kind: ToastKind, message: &str) -> windows::core::Result<ToastId> {
        let hinstance = register_class()?;

        let hwnd = unsafe {
            CreateWindowExW(
                WS_EX_TOPMOST | WS_EX_TOOLWINDOW | WS_EX_NOACTIVATE,
                TOAST_CLASS,
                w!("CapYap"),
                WS_POPUP,
                0,
                0,
                TOAST_WIDTH,
                TOAST_HEIGHT,
                None,
                None,
                hinstance,
                None,
            )?
        };

        let id = Uuid::new_v4();
        TOASTS.with(|t| {
            let mut registry = t.borrow_mut();
            registry.entries.insert(
                id,
                ToastEntry {
                    hwnd,
                    kind,
                    message: message.to_string(),
                },
            );
            registry.stack.push(id);
        });
        apply_layout();
        arm_timer(hwnd, kind);

        tracing::debug!(%id, ?kind, "toast shown");
        Ok(id)
    }

    /// Change the kind and text of an open toast
    pub fn update(id: ToastId, kind: ToastKind, message: &str) -> bool {
        let hwnd = TOASTS.with(|t| {
            t.borrow_mut().entries.get_mut(&id).map(|entry| {
                entry.kind = kind;
                entry.message = message.to_string();
                entry.hwnd
            })
        });

        match hwnd {
            Some(hwnd) => {
                arm_timer(hwnd, kind);
                unsafe {
                    let _ = InvalidateRect(hwnd, None, true);
                }
                true
            }
            None => false,
        }
    }

    pub fn close(id: ToastId) {
        let entry = TOASTS.with(|t| {
            let mut registry = t.borrow_mut();
            registry.stack.remove(id);
            registry.entries.remove(&id)
        });

        // Destroy outside the borrow, DestroyWindow re-enters the wnd proc
        if let Some(entry) = entry {
            unsafe {
                let _ = KillTimer(entry.hwnd, CLOSE_TIMER);
                let _ = DestroyWindow(entry.hwnd);
            }
            apply_layout();
            tracing::debug!(%id, "toast closed");
        }
    }

    pub fn hide_all() {
        TOASTS.with(|t| t.borrow_mut().stack.hide_all());
        apply_layout();
    }

    pub fn show_all() {
        TOASTS.with(|t| t.borrow_mut().stack.show_all());
        apply_layout();
    }

    pub fn close_all() {
        let ids: Vec<ToastId> = TOASTS.with(|t| t.borrow().entries.keys().copied().collect());
        for id in ids {
            Self::close(id);
        }
    }
}

fn arm_timer(hwnd: HWND, kind: ToastKind) {
    unsafe {
        match kind.auto_close() {
            Some(after) => {
                SetTimer(hwnd, CLOSE_TIMER, after.as_millis() as u32, None);
            }
            None => {
                let _ = KillTimer(hwnd, CLOSE_TIMER);
            }
        }
    }
}

fn close_window(hwnd: HWND) {
    if let Some(id) = TOASTS.with(|t| t.borrow().id_of(hwnd)) {
        Toasts::close(id);
    }
}

unsafe fn paint(hwnd: HWND) {
    let mut ps = PAINTSTRUCT::default();
    let hdc = BeginPaint(hwnd, &mut ps);

    let mut client = RECT::default();
    let _ = GetClientRect(hwnd, &mut client);

    let content = TOASTS.with(|t| {
        let registry = t.borrow();
        registry
            .id_of(hwnd)
            .and_then(|id| registry.entries.get(&id))
            .map(|entry| (entry.kind, entry.message.clone()))
    });

    let background = CreateSolidBrush(BACKGROUND);
    FillRect(hdc, &client, background);
    let _ = DeleteObject(background);

    if let Some((kind, message)) = content {
        let stripe = RECT {
            right: client.left + ACCENT_WIDTH,
            ..client
        };
        let brush = CreateSolidBrush(accent(kind));
        FillRect(hdc, &stripe, brush);
        let _ = DeleteObject(brush);

        SetBkMode(hdc, TRANSPARENT);

        let title: Vec<u16> = kind.title().encode_utf16().collect();
        SetTextColor(hdc, TITLE_COLOR);
        let _ = TextOutW(hdc, ACCENT_WIDTH + PADDING, PADDING, &title);

        let mut text: Vec<u16> = message.encode_utf16().collect();
        let mut text_rect = RECT {
            left: ACCENT_WIDTH + PADDING,
            top: PADDING + 20,
            right: client.right - PADDING,
            bottom: client.bottom - PADDING,
        };
        SetTextColor(hdc, TEXT_COLOR);
        DrawTextW(
            hdc,
            &mut text,
            &mut text_rect,
            DT_WORDBREAK | DT_END_ELLIPSIS | DT_NOPREFIX,
        );
    }

    let _ = EndPaint(hwnd, &ps);
}

unsafe extern "system" fn toast_wnd_proc(
    hwnd: HWND,
    msg: u32,
    wparam: WPARAM,
    lparam: LPARAM,
) -> LRESULT {
    match msg {
        WM_PAINT => {
            paint(hwnd);
            LRESULT(0)
        }

        WM_TIMER if wparam.0 == CLOSE_TIMER => {
            close_window(hwnd);
            LRESULT(0)
        }

        // Click to dismiss
        WM_LBUTTONUP => {
            close_window(hwnd);
            LRESULT(0)
        }

        _ => DefWindowProcW(hwnd, msg, wparam, lparam),
    }
}
