//! Headless font driver: every character is a solid fixed-size cell.
//!
//! Needs no font files, so tests and `--headless` runs get deterministic
//! text geometry.

use super::font_driver::{FontDriver, FontSpec, GlyphRun};
use crate::color::Color;
use anyhow::Result;

pub const CELL_WIDTH: u32 = 6;
pub const CELL_HEIGHT: u32 = 10;

#[derive(Debug, Clone, Default)]
pub struct HeadlessFontDriver;

impl HeadlessFontDriver {
    pub fn new() -> Self {
        Self
    }
}

impl FontDriver for HeadlessFontDriver {
    type Font = ();

    fn load_stack(&self, _specs: &[FontSpec]) -> Result<Self::Font> {
        Ok(())
    }

    fn line_spacing(&self, _font: &Self::Font) -> i32 {
        CELL_HEIGHT as i32
    }

    fn text_width(&self, _font: &Self::Font, text: &str) -> i32 {
        (text.chars().filter(|c| !c.is_control()).count() as u32 * CELL_WIDTH) as i32
    }

    /// Non-blank characters fill their cell except the rightmost column.
    fn rasterize(&self, font: &Self::Font, text: &str, color: Color) -> Result<GlyphRun> {
        let width = self.text_width(font, text) as u32;
        let mut pixels = vec![Color::TRANSPARENT; (width * CELL_HEIGHT) as usize];
        for (i, ch) in text.chars().filter(|c| !c.is_control()).enumerate() {
            if ch.is_whitespace() {
                continue;
            }
            let left = i as u32 * CELL_WIDTH;
            for y in 0..CELL_HEIGHT {
                for x in left..left + CELL_WIDTH - 1 {
                    pixels[(y * width + x) as usize] = color;
                }
            }
        }
        Ok(GlyphRun {
            width,
            height: CELL_HEIGHT,
            pixels,
        })
    }
}
