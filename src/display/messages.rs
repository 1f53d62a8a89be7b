// src/display/messages.rs
//! Message types for communication between the presentation surface and a
//! `DisplayDriver`.
//!
//! Frames travel by ownership transfer: the surface hands a `Framebuffer` to
//! the driver with `Present` and gets the same allocation back in
//! `PresentComplete`, or inside `DisplayError::PresentationFailed` when
//! presentation fails, so the buffer is never lost.

use crate::keys::{KeySymbol, Modifiers};
use crate::render::PixelFormat;
use thiserror::Error;

/// Window parameters for `DriverRequest::Init`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DriverConfig {
    pub caption: String,
    /// Requested logical size of the window.
    pub width_px: u32,
    pub height_px: u32,
    /// Cover the whole screen with the window at the desktop resolution.
    pub fullscreen: bool,
}

/// A display mode offered by the output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DisplayMode {
    pub width_px: u32,
    pub height_px: u32,
}

impl DisplayMode {
    pub const fn new(width_px: u32, height_px: u32) -> Self {
        Self { width_px, height_px }
    }
}

/// One presented frame in the window's native pixel format.
#[derive(Clone, PartialEq, Eq)]
pub struct Framebuffer {
    pub width_px: u32,
    pub height_px: u32,
    pub format: PixelFormat,
    pub pixels: Box<[u8]>,
}

impl Framebuffer {
    pub fn new(width_px: u32, height_px: u32, format: PixelFormat) -> Self {
        let len = width_px as usize * height_px as usize * PixelFormat::BYTES_PER_PIXEL;
        Self {
            width_px,
            height_px,
            format,
            pixels: vec![0u8; len].into_boxed_slice(),
        }
    }

    /// Decodes the pixel at `(x, y)`.
    pub fn pixel(&self, x: u32, y: u32) -> Option<crate::color::Color> {
        if x >= self.width_px || y >= self.height_px {
            return None;
        }
        let i = (y as usize * self.width_px as usize + x as usize) * PixelFormat::BYTES_PER_PIXEL;
        let px = [
            self.pixels[i],
            self.pixels[i + 1],
            self.pixels[i + 2],
            self.pixels[i + 3],
        ];
        Some(self.format.decode(px))
    }
}

impl std::fmt::Debug for Framebuffer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Framebuffer")
            .field("width_px", &self.width_px)
            .field("height_px", &self.height_px)
            .field("format", &self.format)
            .field("len", &self.pixels.len())
            .finish()
    }
}

/// Requests sent to a DisplayDriver.
#[derive(Debug, Clone)]
pub enum DriverRequest {
    /// Create and map the window. Answered with `InitComplete`.
    Init(DriverConfig),

    /// List the output's display modes, largest first. Valid before `Init`.
    DisplayModes,

    /// Fetch queued native events. With `wait` the driver blocks until at
    /// least one event arrives.
    PollEvents { wait: bool },

    /// Display the frame and hand the buffer back.
    Present(Framebuffer),

    /// Set the window title.
    SetTitle(String),

    /// Show or hide the pointer over the window.
    SetCursorVisibility(bool),
}

/// Responses sent back by a DisplayDriver.
#[derive(Debug)]
pub enum DriverResponse {
    /// The window exists; its real size and native pixel format.
    InitComplete {
        width_px: u32,
        height_px: u32,
        format: PixelFormat,
    },

    /// Available modes, largest first.
    DisplayModes(Vec<DisplayMode>),

    /// Native events that occurred.
    Events(Vec<DisplayEvent>),

    /// Frame displayed; buffer returned for reuse.
    PresentComplete(Framebuffer),

    TitleSet,

    CursorVisibilitySet,
}

/// Platform-agnostic display events.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DisplayEvent {
    /// Key press.
    Key {
        symbol: KeySymbol,
        modifiers: Modifiers,
        text: Option<String>,
    },

    /// The window manager asked the window to close.
    CloseRequested,

    FocusGained,

    FocusLost,
}

/// Driver failures.
#[derive(Debug, Error)]
pub enum DisplayError {
    /// Presenting failed; the frame buffer is handed back so the caller can
    /// keep drawing.
    #[error("presentation failed: {1}")]
    PresentationFailed(Framebuffer, String),

    /// The request is not valid in the driver's current state.
    #[error("unexpected request: {0}")]
    UnexpectedRequest(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}
