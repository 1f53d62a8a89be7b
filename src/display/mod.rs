// src/display/mod.rs
//! Message-based display system.
//!
//! - DisplayDriver: Platform-specific primitives (X11, headless)
//! - Messages: Request/Response protocol between the presentation surface
//!   and the driver

pub mod driver;
pub mod drivers;
pub mod messages;

pub use driver::{connect_with_fallback, DisplayDriver};
pub use drivers::{HeadlessDisplayDriver, HeadlessProbe};
pub use messages::{
    DisplayError, DisplayEvent, DisplayMode, DriverConfig, DriverRequest, DriverResponse,
    Framebuffer,
};

#[cfg(feature = "x11")]
pub use drivers::X11DisplayDriver;
