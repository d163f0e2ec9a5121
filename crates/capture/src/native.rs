//! Win32 display and window enumeration

use crate::bounds::Bounds;
use crate::desktop::{Desktop, WindowEntry};
use windows::core::PCWSTR;
use windows::Win32::Foundation::{BOOL, HWND, LPARAM, POINT, RECT};
use windows::Win32::Graphics::Dwm::{DwmGetWindowAttribute, DWMWA_CLOAKED};
use windows::Win32::Graphics::Gdi::{
    ClientToScreen, EnumDisplayDevicesW, EnumDisplaySettingsW, DEVMODEW, DISPLAY_DEVICEW,
    DISPLAY_DEVICE_ATTACHED_TO_DESKTOP, ENUM_CURRENT_SETTINGS,
};
use windows::Win32::UI::WindowsAndMessaging::{
    EnumWindows, GetClientRect, GetShellWindow, GetWindowTextLengthW, GetWindowTextW,
    IsWindowVisible,
};

/// Live desktop, re-enumerated on every call
#[derive(Debug, Clone, Copy, Default)]
pub struct NativeDesktop;

impl Desktop for NativeDesktop {
    fn displays(&self) -> Vec<Bounds> {
        enumerate_displays()
    }

    fn open_windows(&self) -> Vec<WindowEntry> {
        enumerate_windows()
    }
}

/// Current position and resolution of each display attached to the desktop
pub fn enumerate_displays() -> Vec<Bounds> {
    let mut displays = Vec::new();
    let mut index = 0u32;

    unsafe {
        loop {
            let mut device = DISPLAY_DEVICEW {
                cb: std::mem::size_of::<DISPLAY_DEVICEW>() as u32,
                ..Default::default()
            };

            if !EnumDisplayDevicesW(PCWSTR::null(), index, &mut device, 0).as_bool() {
                break;
            }
            index += 1;

            if device.StateFlags.0 & DISPLAY_DEVICE_ATTACHED_TO_DESKTOP.0 == 0 {
                continue;
            }

            let mut mode = DEVMODEW {
                dmSize: std::mem::size_of::<DEVMODEW>() as u16,
                ..Default::default()
            };

            if !EnumDisplaySettingsW(
                PCWSTR(device.DeviceName.as_ptr()),
                ENUM_CURRENT_SETTINGS,
                &mut mode,
            )
            .as_bool()
            {
                continue;
            }

            let position = mode.Anonymous1.Anonymous2.dmPosition;
            displays.push(Bounds::from_origin_size(
                position.x,
                position.y,
                mode.dmPelsWidth,
                mode.dmPelsHeight,
            ));
        }
    }

    tracing::debug!(count = displays.len(), "enumerated displays");
    displays
}

struct EnumContext {
    shell: HWND,
    windows: Vec<WindowEntry>,
}

/// Visible top-level windows in Z-order, client areas in screen coordinates
pub fn enumerate_windows() -> Vec<WindowEntry> {
    let mut context = EnumContext {
        shell: unsafe { GetShellWindow() },
        windows: Vec::new(),
    };

    unsafe {
        let _ = EnumWindows(
            Some(enum_window_callback),
            LPARAM(&mut context as *mut EnumContext as isize),
        );
    }

    tracing::debug!(count = context.windows.len(), "enumerated windows");
    context.windows
}

unsafe extern "system" fn enum_window_callback(hwnd: HWND, lparam: LPARAM) -> BOOL {
    let context = &mut *(lparam.0 as *mut EnumContext);

    if hwnd == context.shell || !IsWindowVisible(hwnd).as_bool() || is_cloaked(hwnd) {
        return BOOL(1);
    }

    if let Some(entry) = window_entry(hwnd) {
        context.windows.push(entry);
    }

    BOOL(1) // Continue enumeration
}

unsafe fn is_cloaked(hwnd: HWND) -> bool {
    let mut cloaked: u32 = 0;
    DwmGetWindowAttribute(
        hwnd,
        DWMWA_CLOAKED,
        &mut cloaked as *mut _ as *mut _,
        std::mem::size_of::<u32>() as u32,
    )
    .is_ok()
        && cloaked != 0
}

unsafe fn window_entry(hwnd: HWND) -> Option<WindowEntry> {
    let length = GetWindowTextLengthW(hwnd);
    if length <= 0 {
        return None;
    }

    let mut title_buf = vec![0u16; length as usize + 1];
    let copied = GetWindowTextW(hwnd, &mut title_buf);
    let title = String::from_utf16_lossy(&title_buf[..copied.max(0) as usize]);

    let mut client = RECT::default();
    GetClientRect(hwnd, &mut client).ok()?;

    let mut top_left = POINT {
        x: client.left,
        y: client.top,
    };
    if !ClientToScreen(hwnd, &mut top_left).as_bool() {
        return None;
    }

    Some(WindowEntry::new(
        title,
        Bounds::new(
            top_left.x,
            top_left.y,
            top_left.x + client.right,
            top_left.y + client.bottom,
        ),
    ))
}
