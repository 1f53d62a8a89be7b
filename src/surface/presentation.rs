// src/surface/presentation.rs

//! The window-bound drawable.
//!
//! Layers paint into a back-buffer texture of the launcher's logical
//! resolution. `flip` scales it onto the window frame and hands the frame to
//! the display driver, then makes the back-buffer current again.

use super::{Surface, SurfaceKind};
use crate::color::Color;
use crate::display::{
    DisplayDriver, DisplayError, DisplayEvent, DisplayMode, DriverConfig, DriverRequest,
    DriverResponse, Framebuffer,
};
use crate::error::RenderError;
use crate::image::encode_png;
use crate::input::EventSource;
use crate::render::{PixelFormat, RenderContext, Target, TextureAccess};
use anyhow::Context;
use log::{debug, info, trace, warn};
use std::fs;
use std::path::Path;

/// Tag for the presentation surface: owns the display driver and the frame
/// buffer shuttled to it.
pub struct Presentation {
    driver: Box<dyn DisplayDriver>,
    format: PixelFormat,
    window_width: u32,
    window_height: u32,
    /// `None` only while the frame is with the driver.
    frame: Option<Framebuffer>,
}

impl SurfaceKind for Presentation {
    const NAME: &'static str = "PresentationSurface";

    fn release(&mut self, ctx: &RenderContext) {
        ctx.detach_window();
        debug!("PresentationSurface: window released");
    }
}

fn platform<T>(what: &str, result: Result<T, DisplayError>) -> Result<T, RenderError> {
    result.map_err(|e| RenderError::PlatformInit(format!("{}: {}", what, e)))
}

impl Surface<Presentation> {
    /// Opens the window and allocates a `width x height` back-buffer in the
    /// window's native pixel format, which becomes the current target.
    ///
    /// The window covers the screen unless `windowed` is set. Any failure is
    /// a `PlatformInit` error; there is nothing to draw on without a window.
    pub fn open(
        ctx: &RenderContext,
        mut driver: Box<dyn DisplayDriver>,
        caption: &str,
        width: u32,
        height: u32,
        windowed: bool,
    ) -> Result<Self, RenderError> {
        platform(
            "hide cursor",
            driver.handle_request(DriverRequest::SetCursorVisibility(false)),
        )?;

        let config = DriverConfig {
            caption: caption.to_string(),
            width_px: width,
            height_px: height,
            fullscreen: !windowed,
        };
        let (window_width, window_height, format) =
            match platform("create window", driver.handle_request(DriverRequest::Init(config)))? {
                DriverResponse::InitComplete {
                    width_px,
                    height_px,
                    format,
                } => (width_px, height_px, format),
                other => {
                    return Err(RenderError::PlatformInit(format!(
                        "unexpected response to Init: {:?}",
                        other
                    )))
                }
            };
        if window_width == 0 || window_height == 0 {
            return Err(RenderError::PlatformInit(format!(
                "window has no area ({}x{})",
                window_width, window_height
            )));
        }
        ctx.attach_window(window_width, window_height, format);

        let texture = ctx
            .create_texture(width, height, format, TextureAccess::Target)
            .map_err(|e| {
                ctx.detach_window();
                RenderError::PlatformInit(format!("back-buffer: {}", e))
            })?;
        let surface = Self::from_parts(
            ctx.clone(),
            texture,
            width,
            height,
            Presentation {
                driver,
                format,
                window_width,
                window_height,
                frame: Some(Framebuffer::new(window_width, window_height, format)),
            },
        );
        ctx.set_target(Target::Texture(texture))?;

        info!(
            "PresentationSurface: {}x{} back-buffer on a {}x{} {:?} window",
            width, height, window_width, window_height, format
        );
        Ok(surface)
    }

    /// Native pixel format of the window.
    pub fn format(&self) -> PixelFormat {
        self.kind.format
    }

    pub fn window_size(&self) -> (u32, u32) {
        (self.kind.window_width, self.kind.window_height)
    }

    pub fn set_title(&mut self, title: &str) {
        if let Err(e) = self
            .kind
            .driver
            .handle_request(DriverRequest::SetTitle(title.to_string()))
        {
            warn!("PresentationSurface: cannot set title: {}", e);
        }
    }

    /// Shows the back-buffer: clears the window frame to black, copies the
    /// back-buffer onto it scaled to the window, presents it and makes the
    /// back-buffer the current target again. Presentation failures are
    /// logged; the frame buffer is recovered either way.
    pub fn flip(&mut self) {
        let ctx = self.ctx.clone();
        if let Err(e) = ctx.set_target(Target::Window) {
            warn!("PresentationSurface: cannot bind window: {}", e);
            return;
        }
        ctx.set_draw_color(Color::BLACK);
        ctx.clear();
        if let Err(e) = ctx.copy(self.texture, None, None) {
            warn!("PresentationSurface: back-buffer copy failed: {}", e);
        }

        let kind = &mut self.kind;
        let mut frame = kind.frame.take().unwrap_or_else(|| {
            Framebuffer::new(kind.window_width, kind.window_height, kind.format)
        });
        if ctx.encode_window(kind.format, &mut frame.pixels) {
            kind.frame = Some(match kind.driver.handle_request(DriverRequest::Present(frame)) {
                Ok(DriverResponse::PresentComplete(frame)) => {
                    trace!("PresentationSurface: frame presented");
                    frame
                }
                Ok(other) => {
                    warn!("PresentationSurface: unexpected response to Present: {:?}", other);
                    Framebuffer::new(kind.window_width, kind.window_height, kind.format)
                }
                Err(DisplayError::PresentationFailed(frame, reason)) => {
                    warn!("PresentationSurface: presentation failed: {}", reason);
                    frame
                }
                Err(e) => {
                    warn!("PresentationSurface: presentation failed: {}", e);
                    Framebuffer::new(kind.window_width, kind.window_height, kind.format)
                }
            });
        } else {
            warn!("PresentationSurface: window frame unavailable");
            kind.frame = Some(frame);
        }

        if let Err(e) = ctx.set_target(Target::Texture(self.texture)) {
            warn!("PresentationSurface: cannot rebind back-buffer: {}", e);
        }
    }

    /// Writes the back-buffer to `path` as PNG.
    pub fn save_screenshot(&self, path: &Path) -> anyhow::Result<()> {
        let png = encode_png(self.width, self.height, &self.snapshot())?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("creating {}", parent.display()))?;
        }
        fs::write(path, png).with_context(|| format!("writing {}", path.display()))?;
        info!("PresentationSurface: screenshot saved to {}", path.display());
        Ok(())
    }
}

impl EventSource for Surface<Presentation> {
    fn poll_events(&mut self, wait: bool) -> Vec<DisplayEvent> {
        match self
            .kind
            .driver
            .handle_request(DriverRequest::PollEvents { wait })
        {
            Ok(DriverResponse::Events(events)) => events,
            Ok(other) => {
                warn!("PresentationSurface: unexpected response to PollEvents: {:?}", other);
                Vec::new()
            }
            Err(e) => {
                warn!("PresentationSurface: event poll failed: {}", e);
                Vec::new()
            }
        }
    }
}

/// The display mode SDL would pick for `width x height`: the smallest mode
/// at least as large in both axes, scanning `modes` from largest to
/// smallest.
fn closest_mode(modes: &[DisplayMode], width: u32, height: u32) -> Option<DisplayMode> {
    let mut best: Option<DisplayMode> = None;
    for mode in modes {
        if mode.width_px < width {
            break;
        }
        if mode.height_px < height {
            if mode.width_px == width {
                break;
            }
            // Wide enough but too short; other aspect ratios may follow.
            continue;
        }
        let better = best.map_or(true, |b| {
            mode.width_px < b.width_px || mode.height_px < b.height_px
        });
        if better {
            best = Some(*mode);
        }
    }
    best
}

/// Whether the output can show `width x height` without scaling artefacts:
/// the closest mode must cover it and match it exactly in at least one axis.
pub fn resolution_supported(driver: &mut dyn DisplayDriver, width: u32, height: u32) -> bool {
    let mut modes = match driver.handle_request(DriverRequest::DisplayModes) {
        Ok(DriverResponse::DisplayModes(modes)) => modes,
        Ok(other) => {
            warn!("resolution_supported: unexpected response {:?}", other);
            return false;
        }
        Err(e) => {
            warn!("resolution_supported: cannot list display modes: {}", e);
            return false;
        }
    };
    modes.sort_by(|a, b| (b.width_px, b.height_px).cmp(&(a.width_px, a.height_px)));

    let supported = match closest_mode(&modes, width, height) {
        Some(mode) => {
            mode.width_px >= width
                && mode.height_px >= height
                && !(mode.width_px > width && mode.height_px > height)
        }
        None => false,
    };
    debug!(
        "resolution_supported: {}x{} -> {}",
        width,
        height,
        if supported { "yes" } else { "no" }
    );
    supported
}

/// The first candidate, in priority order, that `supported` accepts.
pub fn select_resolution(
    candidates: &[(u32, u32)],
    mut supported: impl FnMut(u32, u32) -> bool,
) -> Option<(u32, u32)> {
    candidates.iter().copied().find(|&(w, h)| supported(w, h))
}
