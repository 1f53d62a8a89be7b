// src/lib.rs

//! Software compositor and redraw loop for small fixed-resolution launcher
//! screens.
//!
//! Leaves first:
//! - `color`, `geometry`: RGBA values and the clip-rect algebra
//! - `render`: the texture store and current-target binding every drawable
//!   goes through
//! - `display`: the window boundary, as a request/response driver protocol
//! - `surface`: off-screen artifacts and the presentation surface
//! - `text`: outlined text over a pluggable rasteriser
//! - `compositor`: the layer stack and the per-frame pipeline
//! - `input`, `keys`, `power`: buttons, key tables and screen blanking
//! - `resources`, `image`, `config`, `layers`: what the binary assembles

pub mod color;
pub mod compositor;
pub mod config;
pub mod display;
pub mod error;
pub mod geometry;
pub mod image;
pub mod input;
pub mod keys;
pub mod layers;
pub mod power;
pub mod render;
pub mod resources;
pub mod surface;
pub mod text;
