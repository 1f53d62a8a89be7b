// src/compositor/layer.rs

//! The unit of composition.

use crate::input::Button;
use crate::surface::PresentationSurface;

/// Lifecycle of a layer. `Dismissed` is terminal: the compositor removes
/// the layer at the start of the next frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LayerStatus {
    #[default]
    Active,
    Dismissed,
}

/// A full-screen or partial overlay drawn by the compositor.
pub trait Layer {
    /// Draws the layer onto the back-buffer. Called back to front.
    fn paint(&mut self, surface: &mut PresentationSurface);

    /// Advances animations by one frame. Returns true while more frames are
    /// needed, which keeps the loop from blocking on input.
    fn run_animations(&mut self) -> bool {
        false
    }

    /// Offers a button to the layer. Returns true if it was consumed, which
    /// stops it from reaching the layers below.
    fn handle_input(&mut self, button: Button) -> bool;

    fn status(&self) -> LayerStatus;
}
