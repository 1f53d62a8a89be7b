// src/layers/notice.rs

//! A modal message box. It fades the screen in behind itself, swallows all
//! input, and goes away on Accept or Cancel.

use crate::color::Color;
use crate::compositor::{Layer, LaunchRequest, LaunchSignal, LayerStatus};
use crate::config::SkinColors;
use crate::geometry::{HAlign, Rect, VAlign};
use crate::input::Button;
use crate::surface::PresentationSurface;
use crate::text::{FontDriver, OutlineTextRenderer};
use log::debug;
use std::rc::Rc;

/// Final opacity of the black veil over the layers below.
pub const DIM_ALPHA: u8 = 200;
/// Veil opacity added per animation frame.
pub const FADE_STEP: u8 = 40;
const PADDING: i32 = 8;

pub struct Notice<D: FontDriver> {
    font: Rc<OutlineTextRenderer<D>>,
    text: String,
    background: Color,
    border: Color,
    fade: u8,
    launch: Option<(LaunchRequest, LaunchSignal)>,
    status: LayerStatus,
}

impl<D: FontDriver> Notice<D> {
    pub fn new(font: Rc<OutlineTextRenderer<D>>, text: impl Into<String>, colors: &SkinColors) -> Self {
        Self {
            font,
            text: text.into(),
            background: colors.message_box_bg,
            border: colors.message_box_border,
            fade: 0,
            launch: None,
            status: LayerStatus::Active,
        }
    }

    /// Accepting the notice will request `request` through `signal`.
    pub fn with_launch(mut self, request: LaunchRequest, signal: LaunchSignal) -> Self {
        self.launch = Some((request, signal));
        self
    }

    /// Current veil opacity.
    pub fn fade(&self) -> u8 {
        self.fade
    }

    /// The box around the text, centred on a `width x height` screen.
    pub fn frame(&self, width: u32, height: u32) -> Rect {
        let lines = self.text.split('\n').count() as i32;
        let text_w = self
            .text
            .split('\n')
            .map(|line| self.font.text_width(line))
            .max()
            .unwrap_or(0);
        let w = text_w + 2 * PADDING;
        let h = lines * self.font.line_spacing() + 2 * PADDING;
        Rect::new(
            width as i32 / 2 - w / 2,
            height as i32 / 2 - h / 2,
            w,
            h,
        )
    }
}

impl<D: FontDriver> Layer for Notice<D> {
    fn paint(&mut self, surface: &mut PresentationSurface) {
        let bounds = surface.bounds();
        surface.fill(bounds, Color::BLACK.with_alpha(self.fade));

        let frame = self.frame(surface.width(), surface.height());
        surface.fill(frame, self.background);
        surface.outline_rect(frame, self.border);
        self.font.write(
            surface,
            &self.text,
            frame.x + frame.w / 2,
            frame.y + frame.h / 2,
            HAlign::Center,
            VAlign::Middle,
        );
    }

    fn run_animations(&mut self) -> bool {
        if self.fade < DIM_ALPHA {
            self.fade = self.fade.saturating_add(FADE_STEP).min(DIM_ALPHA);
        }
        self.fade < DIM_ALPHA
    }

    fn handle_input(&mut self, button: Button) -> bool {
        match button {
            Button::Accept => {
                if let Some((request, signal)) = self.launch.take() {
                    signal.request(request);
                }
                debug!("Notice accepted");
                self.status = LayerStatus::Dismissed;
            }
            Button::Cancel => {
                debug!("Notice cancelled");
                self.status = LayerStatus::Dismissed;
            }
            _ => {}
        }
        true
    }

    fn status(&self) -> LayerStatus {
        self.status
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::display::HeadlessDisplayDriver;
    use crate::render::RenderContext;
    use crate::text::HeadlessFontDriver;
    use test_log::test;

    fn notice(text: &str) -> Notice<HeadlessFontDriver> {
        let font = Rc::new(OutlineTextRenderer::new(HeadlessFontDriver::new(), &[]).unwrap());
        let colors = SkinColors {
            message_box_bg: Color::rgb(250, 250, 250),
            message_box_border: Color::rgb(80, 80, 80),
            ..SkinColors::default()
        };
        Notice::new(font, text, &colors)
    }

    #[test]
    fn fade_runs_to_dim_alpha_then_stops() {
        let mut n = notice("hi");
        let mut frames = 0;
        while n.run_animations() {
            frames += 1;
            assert!(frames < 100);
        }
        assert_eq!(n.fade(), DIM_ALPHA);
        assert_eq!(frames, (DIM_ALPHA / FADE_STEP) as usize - 1);
        assert!(!n.run_animations());
    }

    #[test]
    fn consumes_everything_and_dismisses_on_accept_or_cancel() {
        let mut n = notice("hi");
        assert!(n.handle_input(Button::Left));
        assert_eq!(n.status(), LayerStatus::Active);
        assert!(n.handle_input(Button::Cancel));
        assert_eq!(n.status(), LayerStatus::Dismissed);

        let mut n = notice("hi");
        assert!(n.handle_input(Button::Accept));
        assert_eq!(n.status(), LayerStatus::Dismissed);
    }

    #[test]
    fn accept_requests_the_configured_launch_once() {
        let signal = LaunchSignal::default();
        let mut n = notice("run?").with_launch(LaunchRequest::new("/bin/game"), signal.clone());
        n.handle_input(Button::Cancel);
        assert!(!signal.is_pending());

        let mut n = notice("run?").with_launch(LaunchRequest::new("/bin/game"), signal.clone());
        n.handle_input(Button::Accept);
        assert!(signal.is_pending());
    }

    #[test]
    fn frame_is_centred_around_the_text_block() {
        let n = notice("abcd\nab");
        // 4 cells of 6 px plus padding; 2 lines of 10 px plus padding.
        assert_eq!(n.frame(100, 80), Rect::new(50 - 20, 40 - 18, 40, 36));
    }

    #[test]
    fn paint_dims_the_screen_and_draws_the_box() {
        let ctx = RenderContext::new();
        let mut screen = PresentationSurface::open(
            &ctx,
            Box::new(HeadlessDisplayDriver::with_modes(Vec::new())),
            "t",
            100,
            80,
            true,
        )
        .unwrap();
        screen.clear(Color::WHITE);
        let mut n = notice("hi");
        while n.run_animations() {}
        n.paint(&mut screen);

        let corner = screen.pixel(0, 0).unwrap();
        assert_eq!(corner.a, 255);
        assert!(corner.r < 60, "veil darkens the screen: {:?}", corner);
        let frame = n.frame(100, 80);
        assert_eq!(screen.pixel(frame.x, frame.y), Some(Color::rgb(80, 80, 80)));
        assert_eq!(screen.pixel(frame.x + 2, frame.y + 2), Some(Color::rgb(250, 250, 250)));
    }
}
