// src/config.rs

//! Configuration structures for the launcher.
//!
//! Deserialized from a JSON file. Every section and field has a default, so
//! a partial file (or none at all) yields a working setup.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use crate::color::Color;
use crate::input::Button;
use crate::text::FontSpec;
use anyhow::{Context, Result};
use log::{info, warn};

// --- Top-Level Configuration Structure ---

/// The complete launcher configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    /// Window and resolution settings.
    pub display: DisplayConfig,
    /// Skin directories, wallpaper and colours.
    pub skin: SkinConfig,
    /// Font stack, first entry is the primary font.
    pub fonts: FontsConfig,
    /// Screen blanking.
    pub power: PowerConfig,
    /// Key name to button overrides, e.g. `{"a": "accept"}`.
    pub keymap: HashMap<String, Button>,
    /// Message shown at startup.
    pub notice: Option<NoticeConfig>,
}

impl Config {
    /// Reads and parses `path`.
    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        let config: Config = serde_json::from_str(&text)
            .with_context(|| format!("parsing config {}", path.display()))?;
        info!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    /// Like `load`, but a missing or broken file gives the defaults.
    pub fn load_or_default(path: &Path) -> Self {
        match Self::load(path) {
            Ok(config) => config,
            Err(e) => {
                warn!("{:#}; using default configuration", e);
                Config::default()
            }
        }
    }
}

// --- Lenient numbers ---

/// Deserializers for numeric settings. Any JSON number is accepted and
/// clamped into the field's range (fractions truncated, NaN as 0), so one
/// bad value never discards the rest of the file.
pub(crate) mod lenient {
    use log::warn;
    use serde::{Deserialize, Deserializer};

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Number {
        Int(i64),
        Float(f64),
    }

    fn clamped(number: &Number, max: u64) -> u64 {
        match *number {
            Number::Int(i) => {
                if i < 0 {
                    0
                } else {
                    (i as u64).min(max)
                }
            }
            Number::Float(f) if f.is_nan() => 0,
            Number::Float(f) => f.clamp(0.0, max as f64) as u64,
        }
    }

    fn read<'de, D: Deserializer<'de>>(deserializer: D, max: u64) -> Result<u64, D::Error> {
        let number = Number::deserialize(deserializer)?;
        let value = clamped(&number, max);
        let in_range = match number {
            Number::Int(i) => i >= 0 && i as u64 == value,
            Number::Float(f) => f == value as f64,
        };
        if !in_range {
            warn!("Config value clamped to {}", value);
        }
        Ok(value)
    }

    pub fn clamped_u32<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u32, D::Error> {
        read(deserializer, u32::MAX as u64).map(|v| v as u32)
    }

    pub fn clamped_u64<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u64, D::Error> {
        read(deserializer, u64::MAX)
    }
}

// --- Display Configuration ---

/// A logical screen size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Resolution {
    #[serde(deserialize_with = "lenient::clamped_u32")]
    pub width: u32,
    #[serde(deserialize_with = "lenient::clamped_u32")]
    pub height: u32,
}

impl Resolution {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    /// Window caption.
    pub caption: String,
    /// Use a window instead of covering the screen.
    pub windowed: bool,
    /// Logical resolutions in priority order; the first one the output
    /// supports is used.
    pub resolutions: Vec<Resolution>,
    /// Skip the mode check and use this size.
    pub force_resolution: Option<Resolution>,
    /// When set, the last frame is saved here as a PNG on exit.
    pub screenshot_dir: Option<PathBuf>,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        DisplayConfig {
            caption: "pocketmenu".to_string(),
            windowed: false,
            resolutions: vec![
                Resolution::new(1280, 720),
                Resolution::new(800, 480),
                Resolution::new(640, 480),
                Resolution::new(480, 272),
                Resolution::new(320, 240),
                Resolution::new(240, 160),
            ],
            force_resolution: None,
            screenshot_dir: None,
        }
    }
}

// --- Skin Configuration ---

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SkinConfig {
    /// Skin directories searched in order; active skin first.
    pub search_paths: Vec<PathBuf>,
    /// Wallpaper, skin-relative or absolute. Stretched to the screen.
    pub wallpaper: Option<String>,
    #[serde(deserialize_with = "lenient::clamped_u32")]
    pub top_bar_height: u32,
    #[serde(deserialize_with = "lenient::clamped_u32")]
    pub bottom_bar_height: u32,
    pub colors: SkinColors,
}

impl Default for SkinConfig {
    fn default() -> Self {
        SkinConfig {
            search_paths: vec![PathBuf::from("skins/Default")],
            wallpaper: Some("wallpapers/default.png".to_string()),
            top_bar_height: 40,
            bottom_bar_height: 20,
            colors: SkinColors::default(),
        }
    }
}

/// Skin colours, written as `RRGGBBAA` hex strings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SkinColors {
    pub top_bar_bg: Color,
    pub bottom_bar_bg: Color,
    pub selection_bg: Color,
    pub message_box_bg: Color,
    pub message_box_border: Color,
    pub message_box_selection: Color,
    /// Fill used when no wallpaper can be loaded.
    pub background: Color,
}

impl Default for SkinColors {
    fn default() -> Self {
        SkinColors {
            top_bar_bg: Color::rgba(255, 255, 255, 130),
            bottom_bar_bg: Color::rgba(255, 255, 255, 130),
            selection_bg: Color::rgba(255, 255, 255, 130),
            message_box_bg: Color::rgba(255, 255, 255, 255),
            message_box_border: Color::rgba(80, 80, 80, 255),
            message_box_selection: Color::rgba(160, 160, 160, 255),
            background: Color::BLACK,
        }
    }
}

// --- Fonts ---

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FontsConfig {
    /// Font stack; later entries supply glyphs the earlier ones lack.
    pub stack: Vec<FontSpec>,
}

impl Default for FontsConfig {
    fn default() -> Self {
        FontsConfig {
            stack: vec![
                FontSpec::new("/usr/share/fonts/truetype/dejavu/DejaVuSansCondensed.ttf", 12),
                FontSpec::new("/usr/share/fonts/truetype/droid/DroidSansFallbackFull.ttf", 13),
                FontSpec::new("/usr/share/fonts/truetype/droid/DroidSansFallback.ttf", 13),
            ],
        }
    }
}

// --- Power ---

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PowerConfig {
    /// Seconds without input before the screen is blanked. 0 disables.
    #[serde(deserialize_with = "lenient::clamped_u64")]
    pub screen_timeout_secs: u64,
    /// Framebuffer blank control file, e.g. `/sys/class/graphics/fb0/blank`.
    pub blank_path: Option<PathBuf>,
}

impl Default for PowerConfig {
    fn default() -> Self {
        PowerConfig {
            screen_timeout_secs: 60,
            blank_path: None,
        }
    }
}

// --- Startup notice ---

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct NoticeConfig {
    pub text: String,
    /// Program to run when the notice is accepted.
    pub launch: Option<LaunchConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct LaunchConfig {
    pub program: PathBuf,
    pub args: Vec<String>,
    pub working_dir: Option<PathBuf>,
}
