//! "Start with Windows" through the per-user Run key

use std::path::Path;

pub const RUN_KEY: &str = r"Software\Microsoft\Windows\CurrentVersion\Run";
pub const APP_NAME: &str = "CapYap";

/// Registry value: the quoted executable path
pub fn run_command(exe: &Path) -> String {
    format!("\"{}\"", exe.display())
}

#[cfg(windows)]
pub use native::{is_enabled, set_enabled};

#[cfg(windows)]
mod native {
    use super::{run_command, APP_NAME, RUN_KEY};
    use windows::core::{HSTRING, PCWSTR};
    use windows::Win32::Foundation::{ERROR_FILE_NOT_FOUND, WIN32_ERROR};
    use windows::Win32::System::Registry::{
        RegCloseKey, RegDeleteValueW, RegOpenKeyExW, RegQueryValueExW, RegSetValueExW, HKEY,
        HKEY_CURRENT_USER, KEY_QUERY_VALUE, KEY_SET_VALUE, REG_SAM_FLAGS, REG_SZ,
    };

    /// Open handle to the Run key, closed on drop
    struct RunKey(HKEY);

    impl RunKey {
        fn open(access: REG_SAM_FLAGS) -> windows::core::Result<Self> {
            let mut hkey = HKEY::default();
            let subkey = HSTRING::from(RUN_KEY);
            unsafe {
                RegOpenKeyExW(HKEY_CURRENT_USER, PCWSTR(subkey.as_ptr()), 0, access, &mut hkey)
                    .ok()?;
            }
            Ok(Self(hkey))
        }
    }

    impl Drop for RunKey {
        fn drop(&mut self) {
            unsafe {
                let _ = RegCloseKey(self.0);
            }
        }
    }

    pub fn is_enabled() -> bool {
        let Ok(key) = RunKey::open(KEY_QUERY_VALUE) else {
            return false;
        };

        let name = HSTRING::from(APP_NAME);
        let mut size = 0u32;
        let status = unsafe {
            RegQueryValueExW(
                key.0,
                PCWSTR(name.as_ptr()),
                None,
                None,
                None,
                Some(&mut size as *mut u32),
            )
        };

        // Size includes the terminating nul
        status.is_ok() && size > 2
    }

    pub fn set_enabled(enabled: bool) -> anyhow::Result<()> {
        let key = RunKey::open(KEY_SET_VALUE)?;
        let name = HSTRING::from(APP_NAME);

        if enabled {
            let exe = std::env::current_exe()?;

            let data: Vec<u8> = run_command(&exe)
                .encode_utf16()
                .chain(std::iter::once(0))
                .flat_map(|c| c.to_le_bytes())
                .collect();

            unsafe {
                RegSetValueExW(key.0, PCWSTR(name.as_ptr()), 0, REG_SZ, Some(&data)).ok()?;
            }
            tracing::info!(exe = %exe.display(), "autostart enabled");
        } else {
            let status: WIN32_ERROR = unsafe { RegDeleteValueW(key.0, PCWSTR(name.as_ptr())) };
            if status != ERROR_FILE_NOT_FOUND {
                status.ok()?;
            }
            tracing::info!("autostart disabled");
        }

        Ok(())
    }
}
