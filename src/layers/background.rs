// src/layers/background.rs

//! The bottom-most layer: wallpaper plus top and bottom bars, composed into
//! one off-screen artifact at startup and blitted every frame.

use crate::compositor::{Layer, LayerStatus};
use crate::config::SkinConfig;
use crate::error::RenderError;
use crate::geometry::Rect;
use crate::input::Button;
use crate::render::RenderContext;
use crate::resources::SkinResources;
use crate::surface::{OffscreenSurface, PresentationSurface};
use log::{debug, info};

const TOP_BAR_IMAGE: &str = "imgs/topbar.png";
const BOTTOM_BAR_IMAGE: &str = "imgs/bottombar.png";

pub struct Background {
    artifact: OffscreenSurface,
}

impl Background {
    /// Renders the background for a `width x height` screen.
    ///
    /// The wallpaper is stretched to the screen; without one the surface is
    /// filled with the skin's background colour. Each bar is its skin image
    /// tiled across the width, or a box in the bar colour if the skin has no
    /// image for it.
    pub fn new(
        ctx: &RenderContext,
        resources: &mut SkinResources,
        skin: &SkinConfig,
        width: u32,
        height: u32,
    ) -> Result<Self, RenderError> {
        let mut artifact = OffscreenSurface::allocate_blank(ctx, width, height)
            .ok_or_else(|| RenderError::TextureCreation(format!("background {}x{}", width, height)))?;

        let wallpaper = skin
            .wallpaper
            .as_deref()
            .and_then(|name| resources.resolve(name))
            .and_then(|path| OffscreenSurface::from_image_file(ctx, &path, width, height, false));
        match wallpaper {
            Some(image) => image.blit(&mut artifact, 0, 0, 0, 0, None),
            None => {
                info!("Background: no usable wallpaper, using a plain fill");
                let bounds = artifact.bounds();
                artifact.fill(bounds, skin.colors.background);
            }
        }

        let (w, h) = (width as i32, height as i32);
        match resources.get(TOP_BAR_IMAGE) {
            Some(bar) => tile_row(&bar, &mut artifact, 0),
            None => artifact.fill(Rect::new(0, 0, w, skin.top_bar_height as i32), skin.colors.top_bar_bg),
        }
        match resources.get(BOTTOM_BAR_IMAGE) {
            Some(bar) => {
                let y = h - bar.height() as i32;
                tile_row(&bar, &mut artifact, y)
            }
            None => {
                let bar_h = skin.bottom_bar_height as i32;
                artifact.fill(Rect::new(0, h - bar_h, w, bar_h), skin.colors.bottom_bar_bg)
            }
        }
        debug!("Background: rendered {}x{}", width, height);
        Ok(Self { artifact })
    }

    pub fn artifact(&self) -> &OffscreenSurface {
        &self.artifact
    }
}

/// Repeats `tile` across the full width of `dest` at row `y`.
fn tile_row(tile: &OffscreenSurface, dest: &mut OffscreenSurface, y: i32) {
    let step = tile.width().max(1) as usize;
    for x in (0..dest.width()).step_by(step) {
        tile.blit(dest, x as i32, y, 0, 0, None);
    }
}

impl Layer for Background {
    fn paint(&mut self, surface: &mut PresentationSurface) {
        self.artifact.blit(surface, 0, 0, 0, 0, None);
    }

    fn handle_input(&mut self, _button: Button) -> bool {
        false
    }

    fn status(&self) -> LayerStatus {
        LayerStatus::Active
    }
}
