//! Virtual keys and hotkey strings

use crate::{HotKeyError, HotKeyResult};
use std::fmt;
use std::str::FromStr;

/// Win32 virtual-key code
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct VirtualKey(pub u16);

impl VirtualKey {
    pub const BACK: VirtualKey = VirtualKey(0x08);
    pub const TAB: VirtualKey = VirtualKey(0x09);
    pub const RETURN: VirtualKey = VirtualKey(0x0D);
    pub const SHIFT: VirtualKey = VirtualKey(0x10);
    pub const CONTROL: VirtualKey = VirtualKey(0x11);
    /// Alt
    pub const MENU: VirtualKey = VirtualKey(0x12);
    pub const PAUSE: VirtualKey = VirtualKey(0x13);
    pub const CAPITAL: VirtualKey = VirtualKey(0x14);
    pub const ESCAPE: VirtualKey = VirtualKey(0x1B);
    pub const SPACE: VirtualKey = VirtualKey(0x20);
    pub const PRIOR: VirtualKey = VirtualKey(0x21);
    pub const NEXT: VirtualKey = VirtualKey(0x22);
    pub const END: VirtualKey = VirtualKey(0x23);
    pub const HOME: VirtualKey = VirtualKey(0x24);
    pub const LEFT: VirtualKey = VirtualKey(0x25);
    pub const UP: VirtualKey = VirtualKey(0x26);
    pub const RIGHT: VirtualKey = VirtualKey(0x27);
    pub const DOWN: VirtualKey = VirtualKey(0x28);
    /// Print Screen
    pub const SNAPSHOT: VirtualKey = VirtualKey(0x2C);
    pub const INSERT: VirtualKey = VirtualKey(0x2D);
    pub const DELETE: VirtualKey = VirtualKey(0x2E);
    pub const F1: VirtualKey = VirtualKey(0x70);

    /// `A`-`Z`, case-insensitive
    pub fn letter(c: char) -> Option<Self> {
        c.is_ascii_alphabetic()
            .then(|| VirtualKey(c.to_ascii_uppercase() as u16))
    }

    /// `0`-`9` on the main row
    pub fn digit(c: char) -> Option<Self> {
        c.is_ascii_digit().then(|| VirtualKey(c as u16))
    }

    /// `F1`-`F24`
    pub fn function(n: u8) -> Option<Self> {
        (1..=24)
            .contains(&n)
            .then(|| VirtualKey(Self::F1.0 + n as u16 - 1))
    }

    pub fn is_modifier(&self) -> bool {
        matches!(*self, Self::SHIFT | Self::CONTROL | Self::MENU)
    }

    /// Parse an upper-case key name
    fn from_name(upper: &str) -> Option<Self> {
        let key = match upper {
            "PRINTSCREEN" | "PRTSC" | "PRINT" | "SNAPSHOT" => Self::SNAPSHOT,
            "SPACE" => Self::SPACE,
            "TAB" => Self::TAB,
            "ENTER" | "RETURN" => Self::RETURN,
            "ESC" | "ESCAPE" => Self::ESCAPE,
            "DELETE" | "DEL" => Self::DELETE,
            "INSERT" | "INS" => Self::INSERT,
            "BACKSPACE" => Self::BACK,
            "CAPSLOCK" => Self::CAPITAL,
            "PAUSE" => Self::PAUSE,
            "HOME" => Self::HOME,
            "END" => Self::END,
            "PAGEUP" => Self::PRIOR,
            "PAGEDOWN" => Self::NEXT,
            "LEFT" | "LEFTARROW" => Self::LEFT,
            "RIGHT" | "RIGHTARROW" => Self::RIGHT,
            "UP" | "UPARROW" => Self::UP,
            "DOWN" | "DOWNARROW" => Self::DOWN,
            _ if upper.len() > 1 && upper.starts_with('F') => {
                return upper[1..].parse::<u8>().ok().and_then(Self::function)
            }
            _ => {
                let mut chars = upper.chars();
                let c = chars.next()?;
                if chars.next().is_some() {
                    return None;
                }
                return Self::letter(c).or_else(|| Self::digit(c));
            }
        };

        Some(key)
    }

    fn name(&self) -> String {
        match *self {
            Self::SNAPSHOT => "PrintScreen".into(),
            Self::SPACE => "Space".into(),
            Self::TAB => "Tab".into(),
            Self::RETURN => "Enter".into(),
            Self::ESCAPE => "Esc".into(),
            Self::DELETE => "Delete".into(),
            Self::INSERT => "Insert".into(),
            Self::BACK => "Backspace".into(),
            Self::CAPITAL => "CapsLock".into(),
            Self::PAUSE => "Pause".into(),
            Self::HOME => "Home".into(),
            Self::END => "End".into(),
            Self::PRIOR => "PageUp".into(),
            Self::NEXT => "PageDown".into(),
            Self::LEFT => "Left".into(),
            Self::RIGHT => "Right".into(),
            Self::UP => "Up".into(),
            Self::DOWN => "Down".into(),
            Self::CONTROL => "Ctrl".into(),
            Self::SHIFT => "Shift".into(),
            Self::MENU => "Alt".into(),
            VirtualKey(code @ 0x70..=0x87) => format!("F{}", code - Self::F1.0 + 1),
            VirtualKey(code @ (0x30..=0x39 | 0x41..=0x5A)) => (code as u8 as char).to_string(),
            VirtualKey(code) => format!("0x{:02X}", code),
        }
    }
}

impl fmt::Display for VirtualKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name())
    }
}

/// Modifier keys that must be held with a hotkey
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Modifiers {
    pub ctrl: bool,
    pub shift: bool,
    pub alt: bool,
}

impl Modifiers {
    pub const NONE: Modifiers = Modifiers {
        ctrl: false,
        shift: false,
        alt: false,
    };
}

/// A key plus the exact set of modifiers held with it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HotKey {
    pub key: VirtualKey,
    pub modifiers: Modifiers,
}

impl HotKey {
    pub fn new(key: VirtualKey, modifiers: Modifiers) -> Self {
        Self { key, modifiers }
    }

    /// Parse a hotkey string like "Ctrl+Shift+S" or "PrintScreen"
    pub fn parse(s: &str) -> HotKeyResult<Self> {
        let invalid = || HotKeyError::InvalidHotKey(s.to_string());

        let mut modifiers = Modifiers::NONE;
        let mut key: Option<VirtualKey> = None;

        for part in s.split('+') {
            let upper = part.trim().to_ascii_uppercase();
            match upper.as_str() {
                "CTRL" | "CONTROL" => modifiers.ctrl = true,
                "SHIFT" => modifiers.shift = true,
                "ALT" => modifiers.alt = true,
                "" => {}
                _ => {
                    // Exactly one non-modifier key
                    if key.is_some() {
                        return Err(invalid());
                    }
                    key = Some(VirtualKey::from_name(&upper).ok_or_else(invalid)?);
                }
            }
        }

        key.map(|key| HotKey { key, modifiers }).ok_or_else(invalid)
    }
}

impl FromStr for HotKey {
    type Err = HotKeyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        HotKey::parse(s)
    }
}

impl fmt::Display for HotKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.modifiers.ctrl {
            f.write_str("Ctrl+")?;
        }
        if self.modifiers.shift {
            f.write_str("Shift+")?;
        }
        if self.modifiers.alt {
            f.write_str("Alt+")?;
        }
        write!(f, "{}", self.key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_plain_key() {
        let hk = HotKey::parse("PrintScreen").unwrap();
        assert_eq!(hk.key, VirtualKey::SNAPSHOT);
        assert_eq!(hk.modifiers, Modifiers::NONE);
    }

    #[test]
    fn parses_modifier_combo() {
        let hk: HotKey = "ctrl + shift + s".parse().unwrap();
        assert_eq!(hk.key, VirtualKey(0x53));
        assert!(hk.modifiers.ctrl && hk.modifiers.shift && !hk.modifiers.alt);
    }

    #[test]
    fn parses_function_and_digit_keys() {
        assert_eq!(HotKey::parse("Alt+F12").unwrap().key, VirtualKey(0x7B));
        assert_eq!(HotKey::parse("Ctrl+4").unwrap().key, VirtualKey(0x34));
    }

    #[test]
    fn rejects_bad_strings() {
        assert!(HotKey::parse("Ctrl+Shift").is_err());
        assert!(HotKey::parse("Ctrl+A+B").is_err());
        assert!(HotKey::parse("Hyper+K").is_err());
        assert!(HotKey::parse("F25").is_err());
        assert!(HotKey::parse("").is_err());
    }

    #[test]
    fn display_round_trips() {
        for s in ["PrintScreen", "Ctrl+Shift+S", "Alt+F4", "Ctrl+Esc"] {
            assert_eq!(HotKey::parse(s).unwrap().to_string(), s);
        }
    }
}
