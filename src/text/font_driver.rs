// src/text/font_driver.rs

//! Font loading and text rasterisation primitives.
//!
//! This module defines the `FontDriver` trait. A driver turns an ordered
//! font stack into a loaded font and renders whole lines of text into
//! straight-alpha pixel runs; the outline renderer does the rest.

use crate::color::Color;
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// One entry of a font stack: a font file and the pixel size to load it at.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FontSpec {
    pub path: PathBuf,
    #[serde(deserialize_with = "crate::config::lenient::clamped_u32")]
    pub size_px: u32,
}

impl FontSpec {
    pub fn new(path: impl Into<PathBuf>, size_px: u32) -> Self {
        Self {
            path: path.into(),
            size_px,
        }
    }
}

/// A rasterised line of text, row-major, straight alpha.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GlyphRun {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<Color>,
}

/// Font rasteriser interface.
///
/// Implementors handle:
/// - Loading an ordered font stack with fallback
/// - Line metrics
/// - Rendering a line of text in a single colour
pub trait FontDriver {
    /// Loaded font stack.
    type Font;

    /// Loads `specs` in order. Entries that cannot be loaded are logged and
    /// skipped; an error is returned only if none loads.
    fn load_stack(&self, specs: &[FontSpec]) -> Result<Self::Font>;

    /// Distance between consecutive baselines, in pixels.
    fn line_spacing(&self, font: &Self::Font) -> i32;

    /// Width in pixels `text` would rasterise to.
    fn text_width(&self, font: &Self::Font, text: &str) -> i32;

    /// Renders `text` in `color`, coverage in the alpha channel. The run is
    /// `line_spacing` pixels high.
    fn rasterize(&self, font: &Self::Font, text: &str, color: Color) -> Result<GlyphRun>;
}
