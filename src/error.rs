// src/error.rs

//! Typed failures of the rendering core.
//!
//! Everything except `PlatformInit` is recoverable: callers log it and carry
//! on with an absent or partial result.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum RenderError {
    /// A texture could not be allocated (zero or oversized extent, unknown
    /// source texture).
    #[error("texture creation failed: {0}")]
    TextureCreation(String),

    /// A file-backed resource (image, font) is missing or unreadable.
    #[error("resource unavailable: {0}")]
    ResourceUnavailable(String),

    /// Image bytes could not be decoded.
    #[error("decode failure: {0}")]
    DecodeFailure(String),

    /// Pixels could not be written out as an image.
    #[error("encode failure: {0}")]
    EncodeFailure(String),

    /// The render target could not be switched.
    #[error("invalid render target: {0}")]
    InvalidTarget(String),

    /// The window or its back-buffer could not be acquired.
    #[error("platform initialization failed: {0}")]
    PlatformInit(String),
}
