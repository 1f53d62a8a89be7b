// src/text/mod.rs

//! Text rendering.
//!
//! - `font_driver`: the `FontDriver` rasteriser interface and font specs
//! - `fontdue_driver`: TrueType/OpenType font stacks via `fontdue`
//! - `headless_font_driver`: fixed-cell glyphs, no font files needed
//! - `outline`: the outlined-text renderer used by every layer

pub mod font_driver;
pub mod fontdue_driver;
pub mod headless_font_driver;
pub mod outline;

#[cfg(test)]
mod tests;

pub use font_driver::{FontDriver, FontSpec, GlyphRun};
pub use fontdue_driver::FontdueFontDriver;
pub use headless_font_driver::HeadlessFontDriver;
pub use outline::OutlineTextRenderer;
