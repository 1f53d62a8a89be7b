// src/render/texture.rs

//! Pixel storage for textures and the blend arithmetic applied when drawing
//! into them.

use crate::color::Color;
use crate::geometry::Rect;
use serde::{Deserialize, Serialize};

/// Byte order of a presented frame. Textures always store `Color` values;
/// the format only matters when a frame is handed to a display driver.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum PixelFormat {
    /// B, G, R, A in memory (a little-endian `0xAARRGGBB` word). Native
    /// layout of 24/32-bit TrueColor X11 visuals.
    #[default]
    Bgra8888,
    /// R, G, B, A in memory.
    Rgba8888,
}

impl PixelFormat {
    pub const BYTES_PER_PIXEL: usize = 4;

    pub fn encode(self, c: Color) -> [u8; 4] {
        match self {
            PixelFormat::Bgra8888 => [c.b, c.g, c.r, c.a],
            PixelFormat::Rgba8888 => [c.r, c.g, c.b, c.a],
        }
    }

    pub fn decode(self, px: [u8; 4]) -> Color {
        match self {
            PixelFormat::Bgra8888 => Color::rgba(px[2], px[1], px[0], px[3]),
            PixelFormat::Rgba8888 => Color::rgba(px[0], px[1], px[2], px[3]),
        }
    }
}

/// How source pixels combine with destination pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BlendMode {
    /// Source replaces destination.
    #[default]
    None,
    /// Straight-alpha "over": `dst = src * a + dst * (1 - a)`.
    Blend,
}

/// Whether a texture may be bound as a render target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextureAccess {
    /// Upload-once content (decoded images, rasterized text).
    Static,
    /// Can be drawn into.
    Target,
}

/// A rectangular pixel store owned by the render context.
#[derive(Debug, Clone)]
pub struct Texture {
    pub(crate) width: u32,
    pub(crate) height: u32,
    pub(crate) format: PixelFormat,
    pub(crate) access: TextureAccess,
    /// Blend mode used when this texture is the *source* of a copy.
    pub(crate) blend: BlendMode,
    /// Alpha modulation applied when this texture is the source of a copy.
    pub(crate) alpha_mod: u8,
    /// Clip rect used while this texture is the current target.
    pub(crate) clip: Option<Rect>,
    pub(crate) pixels: Vec<Color>,
}

impl Texture {
    pub(crate) fn new(width: u32, height: u32, format: PixelFormat, access: TextureAccess) -> Self {
        Self {
            width,
            height,
            format,
            access,
            blend: BlendMode::None,
            alpha_mod: 255,
            clip: None,
            pixels: vec![Color::TRANSPARENT; width as usize * height as usize],
        }
    }

    pub(crate) fn bounds(&self) -> Rect {
        Rect::sized(self.width as i32, self.height as i32)
    }

    /// The area drawing may touch: the target bounds, narrowed by the clip.
    pub(crate) fn drawable_area(&self) -> Rect {
        match self.clip {
            Some(clip) => clip.intersect(&self.bounds()),
            None => self.bounds(),
        }
    }

    pub(crate) fn pixel(&self, x: i32, y: i32) -> Color {
        self.pixels[y as usize * self.width as usize + x as usize]
    }

    pub(crate) fn put(&mut self, x: i32, y: i32, src: Color, mode: BlendMode) {
        let idx = y as usize * self.width as usize + x as usize;
        self.pixels[idx] = match mode {
            BlendMode::None => src,
            BlendMode::Blend => blend_over(src, self.pixels[idx]),
        };
    }

    /// Writes the texture in `format` byte order into `out`, which must hold
    /// `width * height * 4` bytes.
    pub(crate) fn encode_into(&self, format: PixelFormat, out: &mut [u8]) {
        for (chunk, px) in out
            .chunks_exact_mut(PixelFormat::BYTES_PER_PIXEL)
            .zip(self.pixels.iter())
        {
            chunk.copy_from_slice(&format.encode(*px));
        }
    }
}

/// Straight-alpha source-over with rounding to nearest.
pub fn blend_over(src: Color, dst: Color) -> Color {
    let sa = src.a as u32;
    if sa == 255 {
        return src;
    }
    if sa == 0 {
        return dst;
    }
    let inv = 255 - sa;
    let mix = |s: u8, d: u8| ((s as u32 * sa + d as u32 * inv + 127) / 255) as u8;
    Color::rgba(
        mix(src.r, dst.r),
        mix(src.g, dst.g),
        mix(src.b, dst.b),
        (sa + (dst.a as u32 * inv + 127) / 255) as u8,
    )
}

/// Scales `alpha` by the modulation factor `m` (255 is identity).
pub fn modulate(alpha: u8, m: u8) -> u8 {
    if m == 255 {
        return alpha;
    }
    ((alpha as u32 * m as u32 + 127) / 255) as u8
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_log::test;

    #[test]
    fn blend_extremes() {
        let dst = Color::rgb(10, 20, 30);
        assert_eq!(blend_over(Color::rgba(200, 200, 200, 0), dst), dst);
        assert_eq!(blend_over(Color::rgb(1, 2, 3), dst), Color::rgb(1, 2, 3));
    }

    #[test]
    fn half_alpha_averages() {
        let out = blend_over(Color::rgba(255, 255, 255, 128), Color::BLACK);
        assert_eq!((out.r, out.a), (128, 255));
    }

    #[test]
    fn modulate_identity_and_zero() {
        assert_eq!(modulate(200, 255), 200);
        assert_eq!(modulate(200, 0), 0);
        assert_eq!(modulate(255, 128), 128);
    }

    #[test]
    fn formats_round_trip() {
        let c = Color::rgba(1, 2, 3, 4);
        for f in [PixelFormat::Bgra8888, PixelFormat::Rgba8888] {
            assert_eq!(f.decode(f.encode(c)), c);
        }
        assert_eq!(PixelFormat::Bgra8888.encode(c), [3, 2, 1, 4]);
    }
}
