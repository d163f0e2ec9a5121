//! System tray implementation

use windows::core::{w, PCWSTR};
use windows::Win32::Foundation::{HINSTANCE, HWND, POINT};
use windows::Win32::System::LibraryLoader::GetModuleHandleW;
use windows::Win32::UI::Shell::{
    Shell_NotifyIconW, NIF_ICON, NIF_MESSAGE, NIF_TIP, NIM_ADD, NIM_DELETE, NIM_MODIFY,
    NOTIFYICONDATAW,
};
use windows::Win32::UI::WindowsAndMessaging::{
    AppendMenuW, CreatePopupMenu, DestroyMenu, GetCursorPos, LoadIconW, SetForegroundWindow,
    TrackPopupMenu, IDI_APPLICATION, MF_CHECKED, MF_SEPARATOR, MF_STRING, MF_UNCHECKED,
    TPM_BOTTOMALIGN, TPM_LEFTALIGN, WM_USER,
};

/// Tray icon message
pub const WM_TRAYICON: u32 = WM_USER + 1;

/// Tray menu commands
pub const ID_TRAY_CAPTURE: u32 = 1001;
pub const ID_TRAY_OPEN_BROWSER: u32 = 1002;
pub const ID_TRAY_SETTINGS: u32 = 1003;
pub const ID_TRAY_AUTOSTART: u32 = 1004;
pub const ID_TRAY_EXIT: u32 = 1005;

fn make_int_resource(id: u16) -> PCWSTR {
    PCWSTR(id as *const u16)
}

fn copy_tip(nid: &mut NOTIFYICONDATAW, text: &str) {
    let wide: Vec<u16> = text.encode_utf16().collect();
    let len = wide.len().min(nid.szTip.len() - 1);
    nid.szTip = [0; 128];
    nid.szTip[..len].copy_from_slice(&wide[..len]);
}

/// System tray manager
pub struct SystemTray {
    hwnd: HWND,
    nid: NOTIFYICONDATAW,
    visible: bool,
}

impl SystemTray {
    pub fn new(hwnd: HWND) -> Self {
        let mut nid = NOTIFYICONDATAW {
            cbSize: std::mem::size_of::<NOTIFYICONDATAW>() as u32,
            hWnd: hwnd,
            uID: 1,
            uFlags: NIF_ICON | NIF_MESSAGE | NIF_TIP,
            uCallbackMessage: WM_TRAYICON,
            ..Default::default()
        };
        copy_tip(&mut nid, "CapYap");

        Self {
            hwnd,
            nid,
            visible: false,
        }
    }

    pub fn show(&mut self) -> windows::core::Result<()> {
        if self.visible {
            return Ok(());
        }

        unsafe {
            // Embedded icon 1 when the binary carries one, stock icon otherwise
            let hinstance = HINSTANCE(GetModuleHandleW(None)?.0);
            let icon = LoadIconW(hinstance, make_int_resource(1))
                .or_else(|_| LoadIconW(None, IDI_APPLICATION))?;
            self.nid.hIcon = icon;

            Shell_NotifyIconW(NIM_ADD, &self.nid).ok()?;
            self.visible = true;
        }
        Ok(())
    }

    pub fn hide(&mut self) {
        if !self.visible {
            return;
        }

        unsafe {
            let _ = Shell_NotifyIconW(NIM_DELETE, &self.nid);
        }
        self.visible = false;
    }

    pub fn set_tooltip(&mut self, text: &str) {
        copy_tip(&mut self.nid, text);

        if self.visible {
            unsafe {
                let _ = Shell_NotifyIconW(NIM_MODIFY, &self.nid);
            }
        }
    }

    /// Show the context menu at the cursor
    pub fn show_context_menu(&self, autostart: bool) -> windows::core::Result<()> {
        unsafe {
            let menu = CreatePopupMenu()?;

            let _ = AppendMenuW(menu, MF_STRING, ID_TRAY_CAPTURE as usize, w!("Take a screenshot"));
            let _ = AppendMenuW(menu, MF_STRING, ID_TRAY_OPEN_BROWSER as usize, w!("Open in browser"));
            let _ = AppendMenuW(menu, MF_STRING, ID_TRAY_SETTINGS as usize, w!("Settings"));
            let check = if autostart { MF_CHECKED } else { MF_UNCHECKED };
            let _ = AppendMenuW(
                menu,
                MF_STRING | check,
                ID_TRAY_AUTOSTART as usize,
                w!("Start with Windows"),
            );
            let _ = AppendMenuW(menu, MF_SEPARATOR, 0, PCWSTR::null());
            let _ = AppendMenuW(menu, MF_STRING, ID_TRAY_EXIT as usize, w!("Quit"));

            let mut pt = POINT::default();
            let _ = GetCursorPos(&mut pt);

            // Needed so the menu closes when clicking elsewhere
            let _ = SetForegroundWindow(self.hwnd);
            let _ = TrackPopupMenu(
                menu,
                TPM_LEFTALIGN | TPM_BOTTOMALIGN,
                pt.x,
                pt.y,
                0,
                self.hwnd,
                None,
            );

            let _ = DestroyMenu(menu);
        }
        Ok(())
    }
}

impl Drop for SystemTray {
    fn drop(&mut self) {
        self.hide();
    }
}
