// src/render/context.rs

//! The render context: a software texture store with exactly one current
//! render target.
//!
//! Every drawable receives a clone of the `RenderContext` handle when it is
//! created and routes all drawing through it. There is no process-wide
//! renderer; the "current target" lives inside the context and is switched
//! either explicitly with `set_target` or temporarily with `bind`, whose
//! `TargetGuard` puts the previous target back when it is dropped.

use super::texture::{modulate, BlendMode, PixelFormat, Texture, TextureAccess};
use crate::color::Color;
use crate::error::RenderError;
use crate::geometry::Rect;
use log::{trace, warn};
use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

/// Largest texture extent the context will allocate.
pub const DEFAULT_MAX_TEXTURE_SIZE: u32 = 4096;

/// Handle to a texture owned by a `RenderContext`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TextureId(u32);

/// The destination of drawing operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Target {
    /// The window's own frame, as last attached by the presentation surface.
    Window,
    /// A target-capable texture.
    Texture(TextureId),
}

/// Counters of backend operations, used to verify which primitives
/// actually reached the pixels.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DrawStats {
    pub fills: u64,
    pub clears: u64,
    pub copies: u64,
}

impl DrawStats {
    pub fn total(&self) -> u64 {
        self.fills + self.clears + self.copies
    }
}

struct RenderState {
    textures: HashMap<TextureId, Texture>,
    next_id: u32,
    window: Option<Texture>,
    target: Target,
    draw_color: Color,
    draw_blend: BlendMode,
    stats: DrawStats,
    max_texture_size: u32,
}

impl RenderState {
    /// Runs `f` against the current target, if it exists.
    fn with_target<R>(&mut self, f: impl FnOnce(&mut Texture) -> R) -> Option<R> {
        match self.target {
            Target::Window => self.window.as_mut().map(f),
            Target::Texture(id) => self.textures.get_mut(&id).map(f),
        }
    }

    fn target_texture(&self, target: Target) -> Option<&Texture> {
        match target {
            Target::Window => self.window.as_ref(),
            Target::Texture(id) => self.textures.get(&id),
        }
    }
}

/// Cloneable handle to the shared render state. Single-threaded by design
/// of the redraw loop; clones are cheap and all refer to the same store.
#[derive(Clone)]
pub struct RenderContext {
    state: Rc<RefCell<RenderState>>,
}

impl fmt::Debug for RenderContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state.borrow();
        f.debug_struct("RenderContext")
            .field("textures", &state.textures.len())
            .field("target", &state.target)
            .field("stats", &state.stats)
            .finish()
    }
}

impl Default for RenderContext {
    fn default() -> Self {
        Self::new()
    }
}

impl RenderContext {
    pub fn new() -> Self {
        Self::with_max_texture_size(DEFAULT_MAX_TEXTURE_SIZE)
    }

    pub fn with_max_texture_size(max_texture_size: u32) -> Self {
        Self {
            state: Rc::new(RefCell::new(RenderState {
                textures: HashMap::new(),
                next_id: 1,
                window: None,
                target: Target::Window,
                draw_color: Color::BLACK,
                draw_blend: BlendMode::None,
                stats: DrawStats::default(),
                max_texture_size,
            })),
        }
    }

    // --- Texture lifecycle ---

    /// Allocates a transparent texture.
    pub fn create_texture(
        &self,
        width: u32,
        height: u32,
        format: PixelFormat,
        access: TextureAccess,
    ) -> Result<TextureId, RenderError> {
        let mut state = self.state.borrow_mut();
        if width == 0 || height == 0 {
            return Err(RenderError::TextureCreation(format!(
                "invalid texture extent {}x{}",
                width, height
            )));
        }
        if width > state.max_texture_size || height > state.max_texture_size {
            return Err(RenderError::TextureCreation(format!(
                "texture {}x{} exceeds maximum size {}",
                width, height, state.max_texture_size
            )));
        }
        let id = TextureId(state.next_id);
        state.next_id += 1;
        state
            .textures
            .insert(id, Texture::new(width, height, format, access));
        trace!("RenderContext: created {:?} {}x{} ({:?})", id, width, height, access);
        Ok(id)
    }

    /// Uploads straight-alpha pixels into a new static texture.
    pub fn create_texture_from_pixels(
        &self,
        width: u32,
        height: u32,
        pixels: Vec<Color>,
    ) -> Result<TextureId, RenderError> {
        if pixels.len() != width as usize * height as usize {
            return Err(RenderError::TextureCreation(format!(
                "pixel buffer of {} entries does not match {}x{}",
                pixels.len(),
                width,
                height
            )));
        }
        let id = self.create_texture(width, height, PixelFormat::default(), TextureAccess::Static)?;
        if let Some(tex) = self.state.borrow_mut().textures.get_mut(&id) {
            tex.pixels = pixels;
        }
        Ok(id)
    }

    /// Releases a texture. If it was the current target the window becomes
    /// current again.
    pub fn destroy_texture(&self, id: TextureId) {
        let mut state = self.state.borrow_mut();
        if state.textures.remove(&id).is_none() {
            warn!("RenderContext: destroy of unknown texture {:?}", id);
            return;
        }
        if state.target == Target::Texture(id) {
            warn!("RenderContext: destroyed the current target {:?}; window is current now", id);
            state.target = Target::Window;
        }
        trace!("RenderContext: destroyed {:?}", id);
    }

    pub fn texture_count(&self) -> usize {
        self.state.borrow().textures.len()
    }

    pub fn texture_size(&self, id: TextureId) -> Option<(u32, u32)> {
        self.state
            .borrow()
            .textures
            .get(&id)
            .map(|t| (t.width, t.height))
    }

    pub fn texture_format(&self, id: TextureId) -> Option<PixelFormat> {
        self.state.borrow().textures.get(&id).map(|t| t.format)
    }

    pub fn set_texture_blend_mode(&self, id: TextureId, mode: BlendMode) {
        if let Some(tex) = self.state.borrow_mut().textures.get_mut(&id) {
            tex.blend = mode;
        }
    }

    pub fn texture_blend_mode(&self, id: TextureId) -> Option<BlendMode> {
        self.state.borrow().textures.get(&id).map(|t| t.blend)
    }

    pub fn set_texture_alpha_mod(&self, id: TextureId, alpha: u8) {
        if let Some(tex) = self.state.borrow_mut().textures.get_mut(&id) {
            tex.alpha_mod = alpha;
        }
    }

    pub fn texture_alpha_mod(&self, id: TextureId) -> Option<u8> {
        self.state.borrow().textures.get(&id).map(|t| t.alpha_mod)
    }

    // --- Target binding ---

    pub fn target(&self) -> Target {
        self.state.borrow().target
    }

    /// Makes `target` current. Fails, leaving the current target untouched,
    /// for unknown or non-target textures.
    pub fn set_target(&self, target: Target) -> Result<(), RenderError> {
        let mut state = self.state.borrow_mut();
        if let Target::Texture(id) = target {
            match state.textures.get(&id) {
                None => {
                    return Err(RenderError::InvalidTarget(format!("{:?} does not exist", id)));
                }
                Some(tex) if tex.access != TextureAccess::Target => {
                    return Err(RenderError::InvalidTarget(format!(
                        "{:?} was not created as a render target",
                        id
                    )));
                }
                Some(_) => {}
            }
        }
        state.target = target;
        Ok(())
    }

    /// Makes `target` current until the returned guard is dropped.
    pub fn bind(&self, target: Target) -> Result<TargetGuard, RenderError> {
        let previous = self.target();
        self.set_target(target)?;
        Ok(TargetGuard {
            ctx: self.clone(),
            previous,
        })
    }

    // --- Per-target state ---

    /// Sets the clip rect of the current target. `None` clears it.
    pub fn set_clip_rect(&self, clip: Option<Rect>) {
        self.state.borrow_mut().with_target(|t| t.clip = clip);
    }

    /// The active clip of the current target, or the full target when none
    /// is set.
    pub fn clip_rect(&self) -> Rect {
        self.state
            .borrow_mut()
            .with_target(|t| t.clip.unwrap_or_else(|| t.bounds()))
            .unwrap_or_default()
    }

    pub fn set_draw_color(&self, color: Color) {
        self.state.borrow_mut().draw_color = color;
    }

    pub fn set_draw_blend_mode(&self, mode: BlendMode) {
        self.state.borrow_mut().draw_blend = mode;
    }

    pub fn draw_blend_mode(&self) -> BlendMode {
        self.state.borrow().draw_blend
    }

    // --- Drawing ---

    /// Fills `rect` with the draw color, honouring the current target's clip
    /// and the draw blend mode.
    pub fn fill_rect(&self, rect: Rect) {
        let mut state = self.state.borrow_mut();
        state.stats.fills += 1;
        let color = state.draw_color;
        let mode = state.draw_blend;
        state.with_target(|t| {
            let area = rect.intersect(&t.drawable_area());
            for y in area.y..area.bottom() {
                for x in area.x..area.right() {
                    t.put(x, y, color, mode);
                }
            }
        });
    }

    /// Overwrites the whole current target with the draw color, ignoring the
    /// clip.
    pub fn clear(&self) {
        let mut state = self.state.borrow_mut();
        state.stats.clears += 1;
        let color = state.draw_color;
        state.with_target(|t| t.pixels.fill(color));
    }

    /// Copies `src_rect` of texture `src` (whole texture if `None`) into
    /// `dst_rect` of the current target (whole target if `None`), scaling
    /// with nearest-neighbour sampling. The source texture's blend mode and
    /// alpha modulation apply.
    pub fn copy(
        &self,
        src: TextureId,
        src_rect: Option<Rect>,
        dst_rect: Option<Rect>,
    ) -> Result<(), RenderError> {
        let mut guard = self.state.borrow_mut();
        let state = &mut *guard;
        state.stats.copies += 1;

        // Take the destination out of the store so it can be written while
        // the source is read. A copy onto itself reads from a snapshot.
        let target = state.target;
        let mut detached = match target {
            Target::Texture(id) => state.textures.remove(&id),
            Target::Window => None,
        };
        let self_copy = target == Target::Texture(src);
        let snapshot = if self_copy { detached.clone() } else { None };
        let source = if self_copy {
            snapshot.as_ref()
        } else {
            state.textures.get(&src)
        };
        let dest = match target {
            Target::Window => state.window.as_mut(),
            Target::Texture(_) => detached.as_mut(),
        };

        let outcome = match (source, dest) {
            (None, _) => Err(RenderError::InvalidTarget(format!(
                "copy from unknown texture {:?}",
                src
            ))),
            (Some(_), None) => {
                warn!("RenderContext: copy with no usable target {:?}", target);
                Ok(())
            }
            (Some(source), Some(dest)) => {
                copy_pixels(source, dest, src_rect, dst_rect);
                Ok(())
            }
        };

        if let (Target::Texture(id), Some(tex)) = (target, detached) {
            state.textures.insert(id, tex);
        }
        outcome
    }

    // --- Readback ---

    /// Copies out the pixels of `target`.
    pub fn read_pixels(&self, target: Target) -> Option<Vec<Color>> {
        self.state
            .borrow()
            .target_texture(target)
            .map(|t| t.pixels.clone())
    }

    /// Reads one pixel of `target`; `None` when out of bounds.
    pub fn pixel(&self, target: Target, x: i32, y: i32) -> Option<Color> {
        let state = self.state.borrow();
        let tex = state.target_texture(target)?;
        tex.bounds().contains(x, y).then(|| tex.pixel(x, y))
    }

    pub fn stats(&self) -> DrawStats {
        self.state.borrow().stats
    }

    // --- Window frame, managed by the presentation surface ---

    pub(crate) fn attach_window(&self, width: u32, height: u32, format: PixelFormat) {
        let mut window = Texture::new(width, height, format, TextureAccess::Target);
        window.pixels.fill(Color::BLACK);
        self.state.borrow_mut().window = Some(window);
    }

    pub(crate) fn detach_window(&self) {
        let mut state = self.state.borrow_mut();
        state.window = None;
        state.target = Target::Window;
    }

    pub fn window_size(&self) -> Option<(u32, u32)> {
        self.state
            .borrow()
            .window
            .as_ref()
            .map(|w| (w.width, w.height))
    }

    /// Serialises the window frame into `out`. Returns false when no window
    /// is attached or `out` has the wrong size.
    pub(crate) fn encode_window(&self, format: PixelFormat, out: &mut [u8]) -> bool {
        let state = self.state.borrow();
        match state.window.as_ref() {
            Some(w) if out.len() == w.pixels.len() * PixelFormat::BYTES_PER_PIXEL => {
                w.encode_into(format, out);
                true
            }
            _ => false,
        }
    }
}

fn copy_pixels(source: &Texture, dest: &mut Texture, src_rect: Option<Rect>, dst_rect: Option<Rect>) {
    let requested = src_rect.unwrap_or_else(|| source.bounds());
    if requested.is_empty() {
        return;
    }
    let clipped_src = requested.intersect(&source.bounds());
    if clipped_src.is_empty() {
        return;
    }

    let mut dst = dst_rect.unwrap_or_else(|| dest.bounds());
    if clipped_src != requested {
        // Shrink the destination by the same proportion the source lost.
        dst.x += (clipped_src.x - requested.x) * dst.w / requested.w;
        dst.y += (clipped_src.y - requested.y) * dst.h / requested.h;
        dst.w = clipped_src.w * dst.w / requested.w;
        dst.h = clipped_src.h * dst.h / requested.h;
    }
    if dst.is_empty() {
        return;
    }

    let area = dst.intersect(&dest.drawable_area());
    for y in area.y..area.bottom() {
        let sy = clipped_src.y + ((y - dst.y) as i64 * clipped_src.h as i64 / dst.h as i64) as i32;
        for x in area.x..area.right() {
            let sx = clipped_src.x + ((x - dst.x) as i64 * clipped_src.w as i64 / dst.w as i64) as i32;
            let texel = source.pixel(sx, sy);
            let texel = texel.with_alpha(modulate(texel.a, source.alpha_mod));
            dest.put(x, y, texel, source.blend);
        }
    }
}

/// Restores the previously current target when dropped.
#[must_use = "the previous target is restored as soon as the guard is dropped"]
pub struct TargetGuard {
    ctx: RenderContext,
    previous: Target,
}

impl TargetGuard {
    /// The target that will become current again.
    pub fn previous(&self) -> Target {
        self.previous
    }
}

impl fmt::Debug for TargetGuard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TargetGuard")
            .field("previous", &self.previous)
            .finish()
    }
}

impl Drop for TargetGuard {
    fn drop(&mut self) {
        if let Err(e) = self.ctx.set_target(self.previous) {
            // The previous target vanished while bound elsewhere.
            warn!("TargetGuard: could not restore {:?}: {}", self.previous, e);
            let _ = self.ctx.set_target(Target::Window);
        }
    }
}
