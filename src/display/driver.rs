// src/display/driver.rs
//! DisplayDriver trait - minimal interface for platform-specific display primitives.
//!
//! The driver owns the native window. Everything that is not a platform
//! primitive (back-buffer management, scaling, mode selection) lives in the
//! presentation surface.
//!
//! ## Lifecycle
//! 1. `new()` - Connect to the display server; no window yet. `DisplayModes`
//!    may be queried at this point.
//! 2. `handle_request(Init)` - Create the window, report its metrics.
//! 3. Request/response loop - `Present`, `PollEvents`, ...
//! 4. `Drop` - Destroy the window and close the connection.

use crate::display::messages::{DisplayError, DriverRequest, DriverResponse};
use anyhow::{Context, Result};
use log::{info, warn};

/// Minimal platform-specific display driver interface.
pub trait DisplayDriver {
    /// Connects to the platform. No window is created here.
    fn new() -> Result<Self>
    where
        Self: Sized;

    /// Handles a request, returning the matching response.
    ///
    /// ## Request/Response Pairs
    /// - `Init(config)` → `InitComplete`
    /// - `DisplayModes` → `DisplayModes`
    /// - `PollEvents { wait }` → `Events`
    /// - `Present(frame)` → `PresentComplete(frame)`
    /// - `SetTitle(s)` → `TitleSet`
    /// - `SetCursorVisibility(b)` → `CursorVisibilitySet`
    ///
    /// A failed `Present` returns the frame inside
    /// `DisplayError::PresentationFailed`.
    fn handle_request(&mut self, request: DriverRequest) -> Result<DriverResponse, DisplayError>;
}

/// Connects a `P` driver, or an `F` driver when `skip_preferred` is set or
/// `P` cannot connect. Only a failing `F` is an error.
pub fn connect_with_fallback<P, F>(skip_preferred: bool) -> Result<Box<dyn DisplayDriver>>
where
    P: DisplayDriver + 'static,
    F: DisplayDriver + 'static,
{
    if !skip_preferred {
        match P::new() {
            Ok(driver) => return Ok(Box::new(driver)),
            Err(e) => warn!("Display driver unavailable ({:#}); falling back", e),
        }
    }
    let driver = F::new().context("Fallback display driver failed")?;
    info!("Using fallback display driver");
    Ok(Box::new(driver))
}
