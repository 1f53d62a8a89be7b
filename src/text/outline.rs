// src/text/outline.rs

//! White text with a one-pixel black outline, readable on any wallpaper.

use super::font_driver::{FontDriver, FontSpec};
use crate::color::Color;
use crate::geometry::{HAlign, VAlign};
use crate::render::BlendMode;
use crate::surface::{OffscreenSurface, Surface, SurfaceKind};
use anyhow::Result;
use log::{error, trace};

/// Draws outlined text through a `FontDriver`.
pub struct OutlineTextRenderer<D: FontDriver> {
    driver: D,
    font: D::Font,
}

impl<D: FontDriver> OutlineTextRenderer<D> {
    /// Loads the font stack with `driver`.
    pub fn new(driver: D, specs: &[FontSpec]) -> Result<Self> {
        let font = driver.load_stack(specs)?;
        Ok(Self { driver, font })
    }

    pub fn line_spacing(&self) -> i32 {
        self.driver.line_spacing(&self.font)
    }

    /// Width `text` would occupy, without drawing anything.
    pub fn text_width(&self, text: &str) -> i32 {
        if text.is_empty() {
            return 0;
        }
        self.driver.text_width(&self.font, text)
    }

    /// Rasterises `text` and uploads it as a blending surface.
    fn upload<K: SurfaceKind>(
        &self,
        target: &Surface<K>,
        text: &str,
        color: Color,
    ) -> Result<(OffscreenSurface, i32), i32> {
        let run = match self.driver.rasterize(&self.font, text, color) {
            Ok(run) => run,
            Err(e) => {
                error!("Font rendering failed: {:#}", e);
                return Err(0);
            }
        };
        let width = run.width as i32;
        match OffscreenSurface::from_pixels(
            target.context(),
            run.width,
            run.height,
            run.pixels,
            BlendMode::Blend,
        ) {
            Some(surface) => Ok((surface, width)),
            None => {
                error!("Texture creation failed for text '{}'", text);
                Err(width)
            }
        }
    }

    /// Writes one line of text at `(x, y)`, anchored by `halign`/`valign`.
    /// Returns the rendered width, or 0 when nothing could be rendered.
    pub fn write_line<K: SurfaceKind>(
        &self,
        surface: &mut Surface<K>,
        text: &str,
        x: i32,
        y: i32,
        halign: HAlign,
        valign: VAlign,
    ) -> i32 {
        if text.is_empty() {
            return 0;
        }
        let spacing = self.line_spacing();
        let y = match valign {
            VAlign::Top => y,
            VAlign::Middle => y - spacing / 2,
            VAlign::Bottom => y - spacing,
        };

        let (shadow, width) = match self.upload(surface, text, Color::BLACK) {
            Ok(uploaded) => uploaded,
            Err(width) => return width,
        };
        let x = match halign {
            HAlign::Left => x,
            HAlign::Center => x - width / 2,
            HAlign::Right => x - width,
        };
        trace!("write_line '{}' at ({}, {}) width {}", text, x, y, width);

        for (dx, dy) in [(0, -1), (0, 1), (-1, 0), (1, 0)] {
            shadow.blit(surface, x + dx, y + dy, 0, 0, None);
        }
        drop(shadow);

        if let Ok((fill, _)) = self.upload(surface, text, Color::WHITE) {
            fill.blit(surface, x, y, 0, 0, None);
        }
        width
    }

    /// Writes `text` line by line, advancing by the line spacing. Vertical
    /// alignment applies to the whole block. Returns the widest line.
    pub fn write<K: SurfaceKind>(
        &self,
        surface: &mut Surface<K>,
        text: &str,
        x: i32,
        y: i32,
        halign: HAlign,
        valign: VAlign,
    ) -> i32 {
        let spacing = self.line_spacing();
        let lines: Vec<&str> = text.split('\n').collect();
        let block = spacing * lines.len() as i32;
        let mut y = match valign {
            VAlign::Top => y,
            VAlign::Middle => y - block / 2,
            VAlign::Bottom => y - block,
        };
        let mut widest = 0;
        for line in lines {
            widest = widest.max(self.write_line(surface, line, x, y, halign, VAlign::Top));
            y += spacing;
        }
        widest
    }
}
