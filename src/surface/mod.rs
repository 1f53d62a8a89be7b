// src/surface/mod.rs

//! Drawables: one `Surface<K>` type whose kind tag says who owns the pixels.
//!
//! - `Surface<Offscreen>`: a pre-rendered artifact owning one texture
//! - `Surface<Presentation>`: the window-bound back-buffer, owning the
//!   display driver as well
//!
//! Every primitive binds the surface's own texture through a `TargetGuard`,
//! so whatever target was current before a call is current again after it,
//! on every path.

pub mod offscreen;
pub mod presentation;


use crate::color::Color;
use crate::geometry::{HAlign, Rect, VAlign};
use crate::render::{BlendMode, RenderContext, Target, TargetGuard, TextureId};
use log::warn;
use std::fmt;

pub use offscreen::Offscreen;
pub use presentation::{resolution_supported, select_resolution, Presentation};

pub type OffscreenSurface = Surface<Offscreen>;
pub type PresentationSurface = Surface<Presentation>;

/// Ownership tag of a surface.
pub trait SurfaceKind {
    const NAME: &'static str;

    /// Releases kind-specific resources. Called from the surface's `Drop`
    /// after its texture is gone.
    fn release(&mut self, _ctx: &RenderContext) {}
}

/// A fixed-size drawable backed by one texture of a `RenderContext`.
pub struct Surface<K: SurfaceKind> {
    ctx: RenderContext,
    texture: TextureId,
    width: u32,
    height: u32,
    kind: K,
}

impl<K: SurfaceKind> fmt::Debug for Surface<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct(K::NAME)
            .field("texture", &self.texture)
            .field("width", &self.width)
            .field("height", &self.height)
            .finish()
    }
}

/// Resets a texture's alpha modulation to opaque when dropped.
struct AlphaModGuard<'a> {
    ctx: &'a RenderContext,
    texture: TextureId,
}

impl Drop for AlphaModGuard<'_> {
    fn drop(&mut self) {
        self.ctx.set_texture_alpha_mod(self.texture, 255);
    }
}

impl<K: SurfaceKind> Surface<K> {
    pub(crate) fn from_parts(
        ctx: RenderContext,
        texture: TextureId,
        width: u32,
        height: u32,
        kind: K,
    ) -> Self {
        Self {
            ctx,
            texture,
            width,
            height,
            kind,
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn bounds(&self) -> Rect {
        Rect::sized(self.width as i32, self.height as i32)
    }

    pub fn texture(&self) -> TextureId {
        self.texture
    }

    pub fn context(&self) -> &RenderContext {
        &self.ctx
    }

    pub(crate) fn kind_mut(&mut self) -> &mut K {
        &mut self.kind
    }

    /// Makes this surface's texture the current target until the guard drops.
    fn bind(&self) -> Option<TargetGuard> {
        match self.ctx.bind(Target::Texture(self.texture)) {
            Ok(guard) => Some(guard),
            Err(e) => {
                warn!("{}: cannot draw into {:?}: {}", K::NAME, self.texture, e);
                None
            }
        }
    }

    /// Fills `rect` with `color`.
    ///
    /// Opaque colors go straight to the backend, which enforces the clip
    /// itself. Translucent fills are clipped first and skipped when nothing
    /// is left; fully transparent fills never reach the backend.
    pub fn fill(&mut self, rect: Rect, color: Color) {
        if color.a == 0 {
            return;
        }
        let Some(_guard) = self.bind() else { return };
        if color.a == 255 {
            self.ctx.set_draw_color(color);
            self.ctx.fill_rect(rect);
            return;
        }
        let clipped = rect.intersect(&self.ctx.clip_rect());
        if clipped.is_empty() {
            return;
        }
        self.ctx.set_draw_color(color);
        self.ctx.set_draw_blend_mode(BlendMode::Blend);
        self.ctx.fill_rect(clipped);
    }

    /// Draws the 1-pixel border of `rect`.
    pub fn outline_rect(&mut self, rect: Rect, color: Color) {
        let Rect { x, y, w, h } = rect;
        if h >= 1 {
            self.fill(Rect::new(x, y, w, 1), color);
        }
        if h >= 2 {
            self.fill(Rect::new(x, y + h - 1, w, 1), color);
            let inner = h - 2;
            if inner > 0 {
                if w >= 1 {
                    self.fill(Rect::new(x, y + 1, 1, inner), color);
                }
                if w >= 2 {
                    self.fill(Rect::new(x + w - 1, y + 1, 1, inner), color);
                }
            }
        }
    }

    /// Overwrites the whole surface with `color`, ignoring the clip.
    pub fn clear(&mut self, color: Color) {
        let Some(_guard) = self.bind() else { return };
        self.ctx.set_draw_color(color);
        self.ctx.clear();
    }

    pub fn set_clip_rect(&mut self, rect: Rect) {
        if let Some(_guard) = self.bind() {
            self.ctx.set_clip_rect(Some(rect));
        }
    }

    pub fn clear_clip_rect(&mut self) {
        if let Some(_guard) = self.bind() {
            self.ctx.set_clip_rect(None);
        }
    }

    /// The active clip, or the whole surface when none is set.
    pub fn clip_rect(&self) -> Rect {
        match self.bind() {
            Some(_guard) => self.ctx.clip_rect(),
            None => self.bounds(),
        }
    }

    /// Copies the top-left `w x h` of this surface (whole width/height for
    /// zero) onto `dest` at `(x, y)`, unscaled. `alpha` modulates the copy;
    /// `Some(0)` draws nothing.
    pub fn blit<D: SurfaceKind>(
        &self,
        dest: &mut Surface<D>,
        x: i32,
        y: i32,
        w: u32,
        h: u32,
        alpha: Option<u8>,
    ) {
        if alpha == Some(0) {
            return;
        }
        let w = if w == 0 { self.width } else { w } as i32;
        let h = if h == 0 { self.height } else { h } as i32;
        let Some(_guard) = dest.bind() else { return };

        let _alpha_guard = alpha.map(|a| {
            self.ctx.set_texture_alpha_mod(self.texture, a);
            AlphaModGuard {
                ctx: &self.ctx,
                texture: self.texture,
            }
        });
        if let Err(e) = self.ctx.copy(
            self.texture,
            Some(Rect::new(0, 0, w, h)),
            Some(Rect::new(x, y, w, h)),
        ) {
            warn!("{}: blit failed: {}", K::NAME, e);
        }
    }

    /// Blits with `(x, y)` as the centre of the copied area.
    pub fn blit_center<D: SurfaceKind>(
        &self,
        dest: &mut Surface<D>,
        x: i32,
        y: i32,
        w: u32,
        h: u32,
        alpha: Option<u8>,
    ) {
        let mut ow = self.width / 2;
        if w != 0 {
            ow = ow.min(w / 2);
        }
        let mut oh = self.height / 2;
        if h != 0 {
            oh = oh.min(h / 2);
        }
        self.blit(dest, x - ow as i32, y - oh as i32, w, h, alpha);
    }

    /// Blits with `(x, y)` as the top-right corner of the copied area.
    pub fn blit_right<D: SurfaceKind>(
        &self,
        dest: &mut Surface<D>,
        x: i32,
        y: i32,
        w: u32,
        h: u32,
        alpha: Option<u8>,
    ) {
        let span = if w == 0 { self.width } else { w };
        self.blit(dest, x - self.width.min(span) as i32, y, w, h, alpha);
    }

    /// Blits the whole surface aligned inside `container`.
    pub fn blit_aligned<D: SurfaceKind>(
        &self,
        dest: &mut Surface<D>,
        container: Rect,
        halign: HAlign,
        valign: VAlign,
    ) {
        let (width, height) = (self.width as i32, self.height as i32);
        let x = container.x
            + match halign {
                HAlign::Left => 0,
                HAlign::Center => container.w / 2 - width / 2,
                HAlign::Right => container.w - width,
            };
        let y = container.y
            + match valign {
                VAlign::Top => 0,
                VAlign::Middle => container.h / 2 - height / 2,
                VAlign::Bottom => container.h - height,
            };
        self.blit(dest, x, y, 0, 0, None);
    }

    /// The surface's pixels, row-major.
    pub fn snapshot(&self) -> Vec<Color> {
        self.ctx
            .read_pixels(Target::Texture(self.texture))
            .unwrap_or_default()
    }

    pub fn pixel(&self, x: i32, y: i32) -> Option<Color> {
        self.ctx.pixel(Target::Texture(self.texture), x, y)
    }
}

impl<K: SurfaceKind> Drop for Surface<K> {
    fn drop(&mut self) {
        if self.ctx.target() == Target::Texture(self.texture) {
            let _ = self.ctx.set_target(Target::Window);
        }
        self.ctx.destroy_texture(self.texture);
        self.kind.release(&self.ctx);
    }
}
