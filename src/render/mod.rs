// src/render/mod.rs

//! Software rendering backend.
//!
//! - `texture`: pixel storage, pixel formats and blend arithmetic
//! - `context`: the `RenderContext` handle, target binding and primitives

pub mod context;
pub mod texture;


pub use context::{DrawStats, RenderContext, Target, TargetGuard, TextureId};
pub use texture::{BlendMode, PixelFormat, TextureAccess};
