//! Headless display driver: no window, frames are kept in memory.
//!
//! Used by tests and by `--headless` runs. A `HeadlessProbe` obtained from
//! the driver stays valid after the driver has been moved into a
//! presentation surface; it scripts input events and inspects what was
//! presented.

use crate::display::driver::DisplayDriver;
use crate::display::messages::{
    DisplayError, DisplayEvent, DisplayMode, DriverConfig, DriverRequest, DriverResponse,
    Framebuffer,
};
use crate::render::PixelFormat;
use anyhow::{anyhow, Result};
use log::{info, trace};
use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

/// Frames kept for inspection; older ones are discarded.
const RETAINED_FRAMES: usize = 8;

#[derive(Debug)]
struct HeadlessState {
    modes: Vec<DisplayMode>,
    window: Option<DriverConfig>,
    window_size: Option<(u32, u32)>,
    cursor_visible: bool,
    events: VecDeque<DisplayEvent>,
    presented: VecDeque<Framebuffer>,
    present_count: u64,
    fail_init: bool,
    fail_next_present: bool,
}

pub struct HeadlessDisplayDriver {
    state: Rc<RefCell<HeadlessState>>,
}

impl HeadlessDisplayDriver {
    /// A driver whose output offers `modes` (largest first).
    pub fn with_modes(modes: Vec<DisplayMode>) -> Self {
        Self {
            state: Rc::new(RefCell::new(HeadlessState {
                modes,
                window: None,
                window_size: None,
                cursor_visible: true,
                events: VecDeque::new(),
                presented: VecDeque::new(),
                present_count: 0,
                fail_init: false,
                fail_next_present: false,
            })),
        }
    }

    /// A driver whose window can never be created.
    pub fn failing() -> Self {
        let driver = Self::with_modes(Vec::new());
        driver.state.borrow_mut().fail_init = true;
        driver
    }

    pub fn probe(&self) -> HeadlessProbe {
        HeadlessProbe {
            state: Rc::clone(&self.state),
        }
    }
}

impl DisplayDriver for HeadlessDisplayDriver {
    fn new() -> Result<Self> {
        info!("HeadlessDisplayDriver::new()");
        Ok(Self::with_modes(vec![
            DisplayMode::new(640, 480),
            DisplayMode::new(320, 240),
        ]))
    }

    fn handle_request(&mut self, request: DriverRequest) -> Result<DriverResponse, DisplayError> {
        let mut state = self.state.borrow_mut();
        match request {
            DriverRequest::Init(config) => {
                if state.fail_init {
                    return Err(anyhow!("headless window creation disabled").into());
                }
                let (width_px, height_px) = match (config.fullscreen, state.modes.first()) {
                    (true, Some(desktop)) => (desktop.width_px, desktop.height_px),
                    _ => (config.width_px, config.height_px),
                };
                info!(
                    "HeadlessDisplayDriver: Init '{}' - window {}x{}",
                    config.caption, width_px, height_px
                );
                state.window = Some(config);
                state.window_size = Some((width_px, height_px));
                Ok(DriverResponse::InitComplete {
                    width_px,
                    height_px,
                    format: PixelFormat::Bgra8888,
                })
            }
            DriverRequest::DisplayModes => Ok(DriverResponse::DisplayModes(state.modes.clone())),
            DriverRequest::PollEvents { wait } => {
                let mut events: Vec<DisplayEvent> = state.events.drain(..).collect();
                if events.is_empty() && wait {
                    // Nobody will ever type into a headless window.
                    info!("HeadlessDisplayDriver: no scripted input left; requesting close");
                    events.push(DisplayEvent::CloseRequested);
                }
                Ok(DriverResponse::Events(events))
            }
            DriverRequest::Present(frame) => {
                trace!("HeadlessDisplayDriver: Present");
                if state.window.is_none() {
                    return Err(DisplayError::PresentationFailed(
                        frame,
                        "no window".to_string(),
                    ));
                }
                if std::mem::take(&mut state.fail_next_present) {
                    return Err(DisplayError::PresentationFailed(
                        frame,
                        "scripted presentation failure".to_string(),
                    ));
                }
                state.present_count += 1;
                if state.presented.len() == RETAINED_FRAMES {
                    state.presented.pop_front();
                }
                state.presented.push_back(frame.clone());
                Ok(DriverResponse::PresentComplete(frame))
            }
            DriverRequest::SetTitle(title) => {
                info!("HeadlessDisplayDriver: SetTitle '{}'", title);
                if let Some(window) = state.window.as_mut() {
                    window.caption = title;
                }
                Ok(DriverResponse::TitleSet)
            }
            DriverRequest::SetCursorVisibility(visible) => {
                state.cursor_visible = visible;
                Ok(DriverResponse::CursorVisibilitySet)
            }
        }
    }
}

/// Test-side view of a headless driver.
#[derive(Clone)]
pub struct HeadlessProbe {
    state: Rc<RefCell<HeadlessState>>,
}

impl HeadlessProbe {
    pub fn push_event(&self, event: DisplayEvent) {
        self.state.borrow_mut().events.push_back(event);
    }

    /// The most recently presented frame.
    pub fn last_frame(&self) -> Option<Framebuffer> {
        self.state.borrow().presented.back().cloned()
    }

    pub fn present_count(&self) -> u64 {
        self.state.borrow().present_count
    }

    pub fn window_size(&self) -> Option<(u32, u32)> {
        self.state.borrow().window_size
    }

    pub fn caption(&self) -> Option<String> {
        self.state.borrow().window.as_ref().map(|w| w.caption.clone())
    }

    pub fn fullscreen(&self) -> Option<bool> {
        self.state.borrow().window.as_ref().map(|w| w.fullscreen)
    }

    pub fn cursor_visible(&self) -> bool {
        self.state.borrow().cursor_visible
    }

    /// Makes the next `Present` fail.
    pub fn fail_next_present(&self) {
        self.state.borrow_mut().fail_next_present = true;
    }
}
