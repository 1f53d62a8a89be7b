// src/layers/mod.rs

//! Concrete layers the launcher stacks on the compositor.
//!
//! - `background`: wallpaper with both bars, pre-rendered once
//! - `bottom_bar`: button hints along the bottom edge
//! - `notice`: a modal message that fades in and waits for a button

pub mod background;
pub mod bottom_bar;
pub mod notice;

pub use background::Background;
pub use bottom_bar::{BottomBar, ButtonHint};
pub use notice::Notice;
