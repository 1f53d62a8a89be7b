// src/surface/offscreen.rs

//! Off-screen artifacts: pre-rendered pixels that are blitted repeatedly.

use super::{Surface, SurfaceKind};
use crate::color::Color;
use crate::image::decode_png;
use crate::render::{BlendMode, PixelFormat, RenderContext, Target, TextureAccess, TextureId};
use log::{debug, warn};
use std::fs;
use std::path::Path;

/// Tag for surfaces that exclusively own one texture and nothing else.
#[derive(Debug, Default)]
pub struct Offscreen;

impl SurfaceKind for Offscreen {
    const NAME: &'static str = "OffscreenSurface";
}

impl Surface<Offscreen> {
    /// Allocates a drawable `width x height` surface, cleared to opaque
    /// black. Later blits of it blend. Returns `None` (logged) when the
    /// texture cannot be created.
    pub fn allocate_blank(ctx: &RenderContext, width: u32, height: u32) -> Option<Self> {
        let texture = match ctx.create_texture(
            width,
            height,
            PixelFormat::default(),
            TextureAccess::Target,
        ) {
            Ok(id) => id,
            Err(e) => {
                warn!("OffscreenSurface: cannot allocate {}x{}: {}", width, height, e);
                return None;
            }
        };
        let mut surface = Self::from_parts(ctx.clone(), texture, width, height, Offscreen);
        surface.clear(Color::BLACK);
        ctx.set_texture_blend_mode(texture, BlendMode::Blend);
        Some(surface)
    }

    /// Wraps already-rasterised pixels in a static surface.
    pub fn from_pixels(
        ctx: &RenderContext,
        width: u32,
        height: u32,
        pixels: Vec<Color>,
        blend: BlendMode,
    ) -> Option<Self> {
        match ctx.create_texture_from_pixels(width, height, pixels) {
            Ok(texture) => {
                ctx.set_texture_blend_mode(texture, blend);
                Some(Self::from_parts(ctx.clone(), texture, width, height, Offscreen))
            }
            Err(e) => {
                warn!("OffscreenSurface: upload of {}x{} failed: {}", width, height, e);
                None
            }
        }
    }

    /// Decodes PNG bytes into a surface.
    ///
    /// A non-zero `width` or `height` that differs from the decoded size
    /// stretches the image to `(width or decoded width, height or decoded
    /// height)`, without keeping the aspect ratio. If the stretched copy
    /// cannot be allocated the image is kept at its decoded size.
    pub fn from_image_bytes(
        ctx: &RenderContext,
        bytes: &[u8],
        width: u32,
        height: u32,
        with_alpha: bool,
    ) -> Option<Self> {
        let image = match decode_png(bytes, with_alpha) {
            Ok(image) => image,
            Err(e) => {
                warn!("OffscreenSurface: {}", e);
                return None;
            }
        };
        let blend = if with_alpha {
            BlendMode::Blend
        } else {
            BlendMode::None
        };
        let (decoded_w, decoded_h) = (image.width, image.height);
        let original = Self::from_pixels(ctx, decoded_w, decoded_h, image.pixels, BlendMode::None)?;

        let wants_w = if width != 0 { width } else { decoded_w };
        let wants_h = if height != 0 { height } else { decoded_h };
        if (wants_w, wants_h) == (decoded_w, decoded_h) {
            ctx.set_texture_blend_mode(original.texture, blend);
            return Some(original);
        }

        debug!(
            "OffscreenSurface: stretching {}x{} to {}x{}",
            decoded_w, decoded_h, wants_w, wants_h
        );
        match original.resampled(wants_w, wants_h) {
            Some(stretched) => {
                ctx.set_texture_blend_mode(stretched.texture, blend);
                Some(stretched)
            }
            None => {
                ctx.set_texture_blend_mode(original.texture, blend);
                Some(original)
            }
        }
    }

    /// Reads and decodes a PNG file; see `from_image_bytes`.
    pub fn from_image_file(
        ctx: &RenderContext,
        path: &Path,
        width: u32,
        height: u32,
        with_alpha: bool,
    ) -> Option<Self> {
        match fs::read(path) {
            Ok(bytes) => Self::from_image_bytes(ctx, &bytes, width, height, with_alpha),
            Err(e) => {
                warn!("OffscreenSurface: cannot read {}: {}", path.display(), e);
                None
            }
        }
    }

    /// A deep copy in a new texture with the same blend mode.
    pub fn duplicate(&self) -> Option<Self> {
        let copy = self.resampled(self.width, self.height)?;
        if let Some(mode) = self.ctx.texture_blend_mode(self.texture) {
            self.ctx.set_texture_blend_mode(copy.texture, mode);
        }
        Some(copy)
    }

    /// Renders this surface, unblended, into a new drawable texture of the
    /// given size.
    fn resampled(&self, width: u32, height: u32) -> Option<Self> {
        let texture = match self.ctx.create_texture(
            width,
            height,
            PixelFormat::default(),
            TextureAccess::Target,
        ) {
            Ok(id) => id,
            Err(e) => {
                warn!("OffscreenSurface: cannot allocate {}x{} copy: {}", width, height, e);
                return None;
            }
        };
        let copy = Self::from_parts(self.ctx.clone(), texture, width, height, Offscreen);
        if let Err(e) = self.copy_raw_into(texture) {
            warn!("OffscreenSurface: copy into {:?} failed: {}", texture, e);
            return None;
        }
        Some(copy)
    }

    fn copy_raw_into(&self, texture: TextureId) -> Result<(), crate::error::RenderError> {
        let _guard = self.ctx.bind(Target::Texture(texture))?;
        let saved = self
            .ctx
            .texture_blend_mode(self.texture)
            .unwrap_or_default();
        self.ctx.set_texture_blend_mode(self.texture, BlendMode::None);
        let result = self.ctx.copy(self.texture, None, None);
        self.ctx.set_texture_blend_mode(self.texture, saved);
        result
    }
}
