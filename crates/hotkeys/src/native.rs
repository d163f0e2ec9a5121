//! Key state from the Win32 async key table

use crate::key::VirtualKey;
use crate::poller::KeyStateSource;
use windows::Win32::UI::Input::KeyboardAndMouse::GetAsyncKeyState;

#[derive(Debug, Clone, Copy, Default)]
pub struct AsyncKeyStateSource;

impl KeyStateSource for AsyncKeyStateSource {
    fn is_down(&self, key: VirtualKey) -> bool {
        // High bit set = held right now
        unsafe { (GetAsyncKeyState(key.0 as i32) as u16 & 0x8000) != 0 }
    }
}
