// src/color.rs

//! Defines the RGBA `Color` value used by every drawing primitive, together
//! with its hex string form (`RRGGBBAA`) used by skins and configuration.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// An immutable 8-bit-per-channel RGBA color.
///
/// Alpha is straight (not premultiplied). `a == 255` is opaque and `a == 0`
/// is fully transparent; the drawing primitives special-case both ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const BLACK: Color = Color::rgb(0, 0, 0);
    pub const WHITE: Color = Color::rgb(255, 255, 255);
    pub const TRANSPARENT: Color = Color::rgba(0, 0, 0, 0);

    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Opaque color.
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self::rgba(r, g, b, 255)
    }

    /// Returns the same color with a different alpha.
    pub const fn with_alpha(self, a: u8) -> Self {
        Self::rgba(self.r, self.g, self.b, a)
    }

    pub const fn is_opaque(&self) -> bool {
        self.a == 255
    }

    /// Parses an `RRGGBBAA` hex string.
    ///
    /// Parsing is lenient: every two-character group is read like `strtol`
    /// would (leading hex digits only, optional sign), the value is clamped
    /// into `[0, 255]`, and an unreadable or missing group becomes 0. Bad
    /// input is never rejected.
    pub fn from_hex(s: &str) -> Self {
        let s = s.trim();
        let s = s.strip_prefix('#').unwrap_or(s);
        let channel = |index: usize| -> u8 {
            let start = index * 2;
            let group = s.get(start..start + 2).or_else(|| s.get(start..)).unwrap_or("");
            parse_hex_group(group)
        };
        Self::rgba(channel(0), channel(1), channel(2), channel(3))
    }

    /// Formats the color as lower-case `rrggbbaa`.
    pub fn to_hex(&self) -> String {
        self.to_string()
    }
}

/// Reads the leading hex digits of `group` and clamps the result to a byte.
fn parse_hex_group(group: &str) -> u8 {
    let (negative, digits) = match group.as_bytes().first() {
        Some(b'-') => (true, &group[1..]),
        Some(b'+') => (false, &group[1..]),
        _ => (false, group),
    };
    let mut value: i32 = 0;
    for c in digits.chars() {
        match c.to_digit(16) {
            Some(d) => value = value * 16 + d as i32,
            None => break,
        }
    }
    if negative {
        value = -value;
    }
    value.clamp(0, 255) as u8
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02x}{:02x}{:02x}{:02x}", self.r, self.g, self.b, self.a)
    }
}

impl Serialize for Color {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for Color {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Ok(Color::from_hex(&s))
    }
}
