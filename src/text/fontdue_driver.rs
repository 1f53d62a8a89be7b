// src/text/fontdue_driver.rs

//! TrueType/OpenType rasterisation with `fontdue`.
//!
//! Characters are looked up through the font stack in order; the first face
//! that has a glyph for a character renders it, the primary face draws the
//! missing-glyph box otherwise.

use super::font_driver::{FontDriver, FontSpec, GlyphRun};
use crate::color::Color;
use crate::error::RenderError;
use anyhow::{anyhow, Result};
use log::{debug, info, warn};
use std::fs;

struct Face {
    font: fontdue::Font,
    size_px: f32,
    name: String,
}

/// A loaded font stack. The first face sets the line metrics.
pub struct FontStack {
    faces: Vec<Face>,
    ascent: i32,
    line_spacing: i32,
}

impl FontStack {
    fn face_for(&self, ch: char) -> (&Face, u16) {
        for face in &self.faces {
            let index = face.font.lookup_glyph_index(ch);
            if index != 0 {
                return (face, index);
            }
        }
        let primary = &self.faces[0];
        (primary, 0)
    }

    pub fn face_names(&self) -> Vec<&str> {
        self.faces.iter().map(|f| f.name.as_str()).collect()
    }
}

#[derive(Debug, Default, Clone)]
pub struct FontdueFontDriver;

impl FontdueFontDriver {
    pub fn new() -> Self {
        Self
    }

    fn load_face(spec: &FontSpec) -> Result<Face> {
        let bytes = fs::read(&spec.path).map_err(|e| {
            RenderError::ResourceUnavailable(format!("font {}: {}", spec.path.display(), e))
        })?;
        let size_px = spec.size_px.max(1) as f32;
        let settings = fontdue::FontSettings {
            scale: size_px,
            ..fontdue::FontSettings::default()
        };
        let font = fontdue::Font::from_bytes(bytes, settings)
            .map_err(|e| anyhow!("parsing font {}: {}", spec.path.display(), e))?;
        Ok(Face {
            font,
            size_px,
            name: spec.path.display().to_string(),
        })
    }

    /// Pen positions: `(face, glyph index, x)` per character plus the total
    /// advance.
    fn layout<'a>(stack: &'a FontStack, text: &str) -> (Vec<(&'a Face, u16, f32)>, f32) {
        let mut pen = 0.0f32;
        let mut glyphs = Vec::with_capacity(text.len());
        for ch in text.chars().filter(|c| !c.is_control()) {
            let (face, index) = stack.face_for(ch);
            glyphs.push((face, index, pen));
            pen += face.font.metrics_indexed(index, face.size_px).advance_width;
        }
        (glyphs, pen)
    }
}

impl FontDriver for FontdueFontDriver {
    type Font = FontStack;

    fn load_stack(&self, specs: &[FontSpec]) -> Result<FontStack> {
        let mut faces = Vec::new();
        for spec in specs {
            match Self::load_face(spec) {
                Ok(face) => {
                    info!("Loaded font '{}' at {}px", face.name, spec.size_px);
                    faces.push(face);
                }
                Err(e) => warn!("Unable to open font: {:#}", e),
            }
        }
        let primary = faces
            .first()
            .ok_or_else(|| {
                RenderError::ResourceUnavailable(format!(
                    "none of the {} configured fonts could be loaded",
                    specs.len()
                ))
            })?;

        let (ascent, line_spacing) = match primary.font.horizontal_line_metrics(primary.size_px) {
            Some(m) => (m.ascent.ceil() as i32, m.new_line_size.ceil() as i32),
            None => {
                debug!("Font '{}' has no horizontal metrics", primary.name);
                let size = primary.size_px.ceil() as i32;
                (size * 4 / 5, size + size / 5)
            }
        };
        Ok(FontStack {
            faces,
            ascent,
            line_spacing: line_spacing.max(1),
        })
    }

    fn line_spacing(&self, font: &FontStack) -> i32 {
        font.line_spacing
    }

    fn text_width(&self, font: &FontStack, text: &str) -> i32 {
        Self::layout(font, text).1.ceil() as i32
    }

    fn rasterize(&self, font: &FontStack, text: &str, color: Color) -> Result<GlyphRun> {
        let (glyphs, advance) = Self::layout(font, text);
        let width = advance.ceil().max(0.0) as u32;
        let height = font.line_spacing as u32;
        let mut pixels = vec![Color::TRANSPARENT; width as usize * height as usize];

        for (face, index, pen) in glyphs {
            let (metrics, coverage) = face.font.rasterize_indexed(index, face.size_px);
            if metrics.width == 0 || metrics.height == 0 {
                continue;
            }
            let left = pen.round() as i32 + metrics.xmin;
            let top = font.ascent - (metrics.ymin + metrics.height as i32);
            for gy in 0..metrics.height {
                let y = top + gy as i32;
                if y < 0 || y >= height as i32 {
                    continue;
                }
                for gx in 0..metrics.width {
                    let x = left + gx as i32;
                    if x < 0 || x >= width as i32 {
                        continue;
                    }
                    let cov = coverage[gy * metrics.width + gx] as u32;
                    let alpha = ((cov * color.a as u32 + 127) / 255) as u8;
                    let slot = &mut pixels[y as usize * width as usize + x as usize];
                    if alpha > slot.a {
                        *slot = color.with_alpha(alpha);
                    }
                }
            }
        }

        Ok(GlyphRun {
            width,
            height,
            pixels,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_log::test;

    #[test]
    fn missing_fonts_are_an_error_only_when_nothing_loads() {
        let driver = FontdueFontDriver::new();
        let err = driver
            .load_stack(&[
                FontSpec::new("/nonexistent/a.ttf", 12),
                FontSpec::new("/nonexistent/b.ttf", 12),
            ])
            .err()
            .unwrap();
        assert!(err.to_string().contains("none of the 2"));
        assert!(matches!(
            err.downcast_ref::<RenderError>(),
            Some(RenderError::ResourceUnavailable(_))
        ));
        assert!(driver.load_stack(&[]).is_err());
    }

    #[test]
    fn unreadable_font_file_is_unavailable() {
        let err = FontdueFontDriver::load_face(&FontSpec::new("/nonexistent/c.ttf", 12))
            .err()
            .unwrap();
        match err.downcast_ref::<RenderError>() {
            Some(RenderError::ResourceUnavailable(msg)) => assert!(msg.contains("c.ttf")),
            other => panic!("unexpected error {:?}", other),
        }
    }

    #[test]
    fn garbage_font_file_is_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.ttf");
        fs::write(&path, b"not a font").unwrap();
        assert!(FontdueFontDriver::new()
            .load_stack(&[FontSpec::new(&path, 10)])
            .is_err());
    }
}
