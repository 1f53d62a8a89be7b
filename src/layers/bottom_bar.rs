// src/layers/bottom_bar.rs

//! Button hints along the bottom edge: each hint is the skin's icon for a
//! button followed by a short label.

use crate::compositor::{Layer, LayerStatus};
use crate::geometry::{HAlign, VAlign};
use crate::input::Button;
use crate::resources::SkinResources;
use crate::surface::{OffscreenSurface, PresentationSurface, Surface, SurfaceKind};
use crate::text::{FontDriver, OutlineTextRenderer};
use log::debug;
use std::rc::Rc;

/// First hint starts this far from the left edge.
const LEFT_MARGIN: i32 = 5;
/// Hint text is centred this far above the bottom edge.
const TEXT_OFFSET: i32 = 10;
/// Icons sit this far above the text line.
const ICON_RAISE: i32 = 7;
const LABEL_GAP: i32 = 3;
const HINT_GAP: i32 = 6;

/// One icon + label pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ButtonHint {
    /// Icon name under `imgs/buttons/`, without extension.
    pub icon: String,
    pub label: String,
}

impl ButtonHint {
    pub fn new(icon: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            icon: icon.into(),
            label: label.into(),
        }
    }
}

pub struct BottomBar<D: FontDriver> {
    font: Rc<OutlineTextRenderer<D>>,
    hints: Vec<(Option<Rc<OffscreenSurface>>, String)>,
}

impl<D: FontDriver> BottomBar<D> {
    /// Looks up each hint's icon once. Hints whose icon the skin lacks are
    /// kept but never drawn.
    pub fn new(
        font: Rc<OutlineTextRenderer<D>>,
        resources: &mut SkinResources,
        hints: &[ButtonHint],
    ) -> Self {
        let hints = hints
            .iter()
            .map(|hint| {
                let icon = resources.get(&format!("imgs/buttons/{}.png", hint.icon));
                if icon.is_none() {
                    debug!("BottomBar: no icon for '{}', hint hidden", hint.icon);
                }
                (icon, hint.label.clone())
            })
            .collect();
        Self { font, hints }
    }
}

/// Draws one hint with its text line at `y` and returns the x where the next
/// hint starts. Without an icon nothing is drawn and `x` is returned as is.
pub fn draw_hint<D: FontDriver, K: SurfaceKind>(
    font: &OutlineTextRenderer<D>,
    surface: &mut Surface<K>,
    icon: Option<&OffscreenSurface>,
    label: &str,
    x: i32,
    y: i32,
) -> i32 {
    let Some(icon) = icon else { return x };
    icon.blit(surface, x, y - ICON_RAISE, 0, 0, None);
    let mut w = icon.width() as i32;
    if !label.is_empty() {
        w += LABEL_GAP;
        w += font.write(surface, label, x + w, y, HAlign::Left, VAlign::Middle);
        w += HINT_GAP;
    }
    x + w
}

impl<D: FontDriver> Layer for BottomBar<D> {
    fn paint(&mut self, surface: &mut PresentationSurface) {
        let y = surface.height() as i32 - TEXT_OFFSET;
        let mut x = LEFT_MARGIN;
        for (icon, label) in &self.hints {
            x = draw_hint(&*self.font, surface, icon.as_deref(), label, x, y);
        }
    }

    fn handle_input(&mut self, _button: Button) -> bool {
        false
    }

    fn status(&self) -> LayerStatus {
        LayerStatus::Active
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::Color;
    use crate::image::encode_png;
    use crate::render::RenderContext;
    use crate::text::HeadlessFontDriver;
    use std::fs;
    use std::path::Path;
    use test_log::test;

    fn write_icon(dir: &Path, name: &str) {
        let path = dir.join(format!("imgs/buttons/{}.png", name));
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        let pixels = vec![Color::rgb(0, 0, 255); 4 * 4];
        fs::write(path, encode_png(4, 4, &pixels).unwrap()).unwrap();
    }

    fn font() -> Rc<OutlineTextRenderer<HeadlessFontDriver>> {
        Rc::new(OutlineTextRenderer::new(HeadlessFontDriver::new(), &[]).unwrap())
    }

    #[test]
    fn hint_advances_past_icon_label_and_gap() {
        let dir = tempfile::tempdir().unwrap();
        write_icon(dir.path(), "accept");
        let ctx = RenderContext::new();
        let mut res = SkinResources::new(&ctx, vec![dir.path().to_path_buf()]);
        let icon = res.get("imgs/buttons/accept.png").unwrap();
        let mut target = OffscreenSurface::allocate_blank(&ctx, 60, 30).unwrap();
        let font = font();

        let next = draw_hint(&*font, &mut target, Some(&*icon), "OK", 5, 20);
        // 4 icon + 3 gap + 12 text + 6 gap.
        assert_eq!(next, 5 + 4 + 3 + 12 + 6);
        assert_eq!(target.pixel(5, 13), Some(Color::rgb(0, 0, 255)));
        assert_eq!(target.pixel(13, 20), Some(Color::WHITE));
    }

    #[test]
    fn hint_without_icon_draws_nothing() {
        let ctx = RenderContext::new();
        let mut target = OffscreenSurface::allocate_blank(&ctx, 40, 20).unwrap();
        let before = target.snapshot();
        assert_eq!(draw_hint(&*font(), &mut target, None, "OK", 5, 10), 5);
        assert_eq!(target.snapshot(), before);
    }

    #[test]
    fn label_is_optional() {
        let dir = tempfile::tempdir().unwrap();
        write_icon(dir.path(), "menu");
        let ctx = RenderContext::new();
        let mut res = SkinResources::new(&ctx, vec![dir.path().to_path_buf()]);
        let icon = res.get("imgs/buttons/menu.png").unwrap();
        let mut target = OffscreenSurface::allocate_blank(&ctx, 20, 20).unwrap();
        assert_eq!(draw_hint(&*font(), &mut target, Some(&*icon), "", 0, 10), 4);
    }

    #[test]
    fn bar_lays_hints_out_left_to_right() {
        let dir = tempfile::tempdir().unwrap();
        write_icon(dir.path(), "a");
        write_icon(dir.path(), "b");
        let ctx = RenderContext::new();
        let mut res = SkinResources::new(&ctx, vec![dir.path().to_path_buf()]);
        let mut bar = BottomBar::new(
            font(),
            &mut res,
            &[
                ButtonHint::new("a", "X"),
                ButtonHint::new("missing", "Gone"),
                ButtonHint::new("b", "Y"),
            ],
        );

        let driver = crate::display::HeadlessDisplayDriver::with_modes(Vec::new());
        let mut screen =
            PresentationSurface::open(&ctx, Box::new(driver), "t", 64, 40, true).unwrap();
        screen.clear(Color::BLACK);
        bar.paint(&mut screen);

        // First icon at x 5, second right after "X": 5 + 4 + 3 + 6 + 6 = 24.
        assert_eq!(screen.pixel(5, 23), Some(Color::rgb(0, 0, 255)));
        assert_eq!(screen.pixel(24, 23), Some(Color::rgb(0, 0, 255)));
        assert!(!bar.handle_input(Button::Accept));
    }
}
