// src/keys.rs

//! Platform-neutral key symbols as reported by display drivers.
//!
//! Handheld consoles expose their face buttons and d-pad as ordinary
//! keyboard keys, so the keymap in the configuration is written in terms of
//! these symbols.

use bitflags::bitflags;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

bitflags! {
    /// Keyboard modifiers held during a key press.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
    pub struct Modifiers: u8 {
        const SHIFT = 1 << 0;
        const CONTROL = 1 << 1;
        const ALT = 1 << 2;
        const SUPER = 1 << 3;
    }
}

/// A key symbol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum KeySymbol {
    /// A printable key, lower-case.
    Char(char),

    F1,
    F2,
    F3,
    F4,
    F5,
    F6,
    F7,
    F8,
    F9,
    F10,
    F11,
    F12,

    Shift,
    Control,
    Alt,
    Super,

    Left,
    Right,
    Up,
    Down,
    PageUp,
    PageDown,
    Home,
    End,
    Insert,
    Delete,

    Enter,
    Space,
    Backspace,
    Tab,
    Escape,
    Pause,
    Menu,

    #[default]
    Unknown,
}

const NAMED: &[(&str, KeySymbol)] = &[
    ("F1", KeySymbol::F1),
    ("F2", KeySymbol::F2),
    ("F3", KeySymbol::F3),
    ("F4", KeySymbol::F4),
    ("F5", KeySymbol::F5),
    ("F6", KeySymbol::F6),
    ("F7", KeySymbol::F7),
    ("F8", KeySymbol::F8),
    ("F9", KeySymbol::F9),
    ("F10", KeySymbol::F10),
    ("F11", KeySymbol::F11),
    ("F12", KeySymbol::F12),
    ("Shift", KeySymbol::Shift),
    ("Control", KeySymbol::Control),
    ("Alt", KeySymbol::Alt),
    ("Super", KeySymbol::Super),
    ("Left", KeySymbol::Left),
    ("Right", KeySymbol::Right),
    ("Up", KeySymbol::Up),
    ("Down", KeySymbol::Down),
    ("PageUp", KeySymbol::PageUp),
    ("PageDown", KeySymbol::PageDown),
    ("Home", KeySymbol::Home),
    ("End", KeySymbol::End),
    ("Insert", KeySymbol::Insert),
    ("Delete", KeySymbol::Delete),
    ("Enter", KeySymbol::Enter),
    ("Space", KeySymbol::Space),
    ("Backspace", KeySymbol::Backspace),
    ("Tab", KeySymbol::Tab),
    ("Escape", KeySymbol::Escape),
    ("Pause", KeySymbol::Pause),
    ("Menu", KeySymbol::Menu),
];

impl KeySymbol {
    /// Returns true if the key symbol represents a modifier key.
    pub fn is_modifier(&self) -> bool {
        matches!(
            self,
            KeySymbol::Shift | KeySymbol::Control | KeySymbol::Alt | KeySymbol::Super
        )
    }
}

/// Parses the names used in keymap files: a named key (`"Up"`, `"F5"`,
/// case-insensitive) or a single character (`"a"`).
impl FromStr for KeySymbol {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if let Some((_, sym)) = NAMED.iter().find(|(name, _)| name.eq_ignore_ascii_case(s)) {
            return Ok(*sym);
        }
        let mut chars = s.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) => Ok(KeySymbol::Char(c.to_ascii_lowercase())),
            _ => Err(format!("unknown key name '{}'", s)),
        }
    }
}

impl fmt::Display for KeySymbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let KeySymbol::Char(c) = self {
            return write!(f, "{}", c);
        }
        match NAMED.iter().find(|(_, sym)| sym == self) {
            Some((name, _)) => f.write_str(name),
            None => f.write_str("Unknown"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_log::test;

    #[test]
    fn parses_named_and_char_keys() {
        assert_eq!("up".parse::<KeySymbol>(), Ok(KeySymbol::Up));
        assert_eq!("F10".parse::<KeySymbol>(), Ok(KeySymbol::F10));
        assert_eq!("A".parse::<KeySymbol>(), Ok(KeySymbol::Char('a')));
        assert!("NotAKey".parse::<KeySymbol>().is_err());
        assert!("".parse::<KeySymbol>().is_err());
    }

    #[test]
    fn display_matches_parse() {
        for sym in [KeySymbol::PageDown, KeySymbol::Char('x'), KeySymbol::Space] {
            assert_eq!(sym.to_string().parse::<KeySymbol>(), Ok(sym));
        }
    }

    #[test]
    fn modifiers_are_flagged() {
        assert!(KeySymbol::Alt.is_modifier());
        assert!(!KeySymbol::Enter.is_modifier());
    }
}
