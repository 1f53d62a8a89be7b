// src/display/drivers/x11.rs

//! X11 DisplayDriver using Xlib and XRandR.
//!
//! - Display modes from XRandR (`XRRSizes`), largest first
//! - Fullscreen through `_NET_WM_STATE_FULLSCREEN`
//! - Frame presentation via XPutImage (BGRA, 24/32-bit TrueColor visuals)
//! - Invisible pointer via a 1x1 pixmap cursor

use crate::display::driver::DisplayDriver;
use crate::display::messages::{
    DisplayError, DisplayEvent, DisplayMode, DriverConfig, DriverRequest, DriverResponse,
    Framebuffer,
};
use crate::keys::{KeySymbol, Modifiers};
use crate::render::PixelFormat;
use anyhow::{anyhow, Context, Result};
use log::{debug, info, trace, warn};
use std::ffi::CString;
use std::os::raw::{c_char, c_int};
use std::{mem, ptr};
use x11::keysym;
use x11::xlib::*;
use x11::xrandr;

pub struct X11DisplayDriver {
    display: *mut Display,
    screen: c_int,
    visual: *mut Visual,
    depth: c_int,
    /// 0 until `Init`.
    window: Window,
    gc: GC,
    wm_delete_window: Atom,
    width_px: u32,
    height_px: u32,
    cursor_visible: bool,
}

impl DisplayDriver for X11DisplayDriver {
    fn new() -> Result<Self> {
        info!("X11DisplayDriver::new() - Connecting to X server");

        // SAFETY: plain Xlib connection setup; the display pointer is checked
        // before any further use.
        unsafe {
            let display = XOpenDisplay(ptr::null());
            if display.is_null() {
                return Err(anyhow!("Failed to open X11 display. Is DISPLAY set?"));
            }
            let screen = XDefaultScreen(display);
            let visual = XDefaultVisual(display, screen);
            let depth = XDefaultDepth(display, screen);
            if depth != 24 && depth != 32 {
                XCloseDisplay(display);
                return Err(anyhow!("Unsupported X11 visual depth {}", depth));
            }
            let wm_delete_window =
                XInternAtom(display, b"WM_DELETE_WINDOW\0".as_ptr() as *const c_char, 0);

            Ok(Self {
                display,
                screen,
                visual,
                depth,
                window: 0,
                gc: ptr::null_mut(),
                wm_delete_window,
                width_px: 0,
                height_px: 0,
                cursor_visible: true,
            })
        }
    }

    fn handle_request(&mut self, request: DriverRequest) -> Result<DriverResponse, DisplayError> {
        match request {
            DriverRequest::Init(config) => Ok(self.handle_init(config)?),
            DriverRequest::DisplayModes => Ok(DriverResponse::DisplayModes(self.display_modes())),
            DriverRequest::PollEvents { wait } => self.handle_poll_events(wait),
            DriverRequest::Present(frame) => self.handle_present(frame),
            DriverRequest::SetTitle(title) => Ok(self.handle_set_title(&title)?),
            DriverRequest::SetCursorVisibility(visible) => {
                self.cursor_visible = visible;
                if self.window != 0 {
                    self.apply_cursor_visibility();
                }
                Ok(DriverResponse::CursorVisibilitySet)
            }
        }
    }
}

impl X11DisplayDriver {
    fn desktop_size(&self) -> (u32, u32) {
        // SAFETY: display and screen come from `new`.
        unsafe {
            (
                XDisplayWidth(self.display, self.screen) as u32,
                XDisplayHeight(self.display, self.screen) as u32,
            )
        }
    }

    fn display_modes(&self) -> Vec<DisplayMode> {
        let mut count: c_int = 0;
        // SAFETY: XRRSizes returns a server-owned array of `count` entries or
        // null; the slice is not kept beyond this call.
        let mut modes: Vec<DisplayMode> = unsafe {
            let sizes = xrandr::XRRSizes(self.display, self.screen, &mut count);
            if sizes.is_null() || count <= 0 {
                Vec::new()
            } else {
                std::slice::from_raw_parts(sizes, count as usize)
                    .iter()
                    .map(|s| DisplayMode::new(s.width as u32, s.height as u32))
                    .collect()
            }
        };
        if modes.is_empty() {
            let (w, h) = self.desktop_size();
            warn!("X11DisplayDriver: XRandR reported no sizes; using desktop {}x{}", w, h);
            modes.push(DisplayMode::new(w, h));
        }
        modes.sort_by(|a, b| (b.width_px, b.height_px).cmp(&(a.width_px, a.height_px)));
        modes.dedup();
        debug!("X11DisplayDriver: display modes {:?}", modes);
        modes
    }

    fn handle_init(&mut self, config: DriverConfig) -> Result<DriverResponse> {
        if self.window != 0 {
            return Err(anyhow!("X11DisplayDriver: window already created"));
        }
        let (width_px, height_px) = if config.fullscreen {
            self.desktop_size()
        } else {
            (config.width_px, config.height_px)
        };
        let caption = CString::new(config.caption.as_str()).context("window caption")?;

        // SAFETY: Xlib calls on the connection opened in `new`; the window
        // id is checked before use.
        unsafe {
            let root = XRootWindow(self.display, self.screen);
            let window = XCreateSimpleWindow(
                self.display,
                root,
                0,
                0,
                width_px,
                height_px,
                0,
                XBlackPixel(self.display, self.screen),
                XBlackPixel(self.display, self.screen),
            );
            if window == 0 {
                return Err(anyhow!("Failed to create X11 window"));
            }
            self.window = window;
            self.width_px = width_px;
            self.height_px = height_px;

            XStoreName(self.display, window, caption.as_ptr());
            XSelectInput(
                self.display,
                window,
                ExposureMask | KeyPressMask | FocusChangeMask | StructureNotifyMask,
            );
            XSetWMProtocols(self.display, window, &mut self.wm_delete_window, 1);

            if config.fullscreen {
                let wm_state =
                    XInternAtom(self.display, b"_NET_WM_STATE\0".as_ptr() as *const c_char, 0);
                let fullscreen = XInternAtom(
                    self.display,
                    b"_NET_WM_STATE_FULLSCREEN\0".as_ptr() as *const c_char,
                    0,
                );
                XChangeProperty(
                    self.display,
                    window,
                    wm_state,
                    XA_ATOM,
                    32,
                    PropModeReplace,
                    &fullscreen as *const Atom as *const u8,
                    1,
                );
            }

            self.gc = XCreateGC(self.display, window, 0, ptr::null_mut());
            XMapWindow(self.display, window);
            XFlush(self.display);
        }
        self.apply_cursor_visibility();

        info!(
            "X11DisplayDriver: Initialized '{}' {}x{} px (fullscreen: {})",
            config.caption, width_px, height_px, config.fullscreen
        );
        Ok(DriverResponse::InitComplete {
            width_px,
            height_px,
            format: PixelFormat::Bgra8888,
        })
    }

    fn apply_cursor_visibility(&self) {
        // SAFETY: called only once the window exists.
        unsafe {
            if self.cursor_visible {
                XUndefineCursor(self.display, self.window);
            } else {
                let mut color: XColor = mem::zeroed();
                let pixmap = XCreatePixmap(self.display, self.window, 1, 1, 1);
                if pixmap == 0 {
                    warn!("X11DisplayDriver: failed to create pixmap for invisible cursor");
                    return;
                }
                let cursor =
                    XCreatePixmapCursor(self.display, pixmap, pixmap, &mut color, &mut color, 0, 0);
                if cursor != 0 {
                    XDefineCursor(self.display, self.window, cursor);
                    XFreeCursor(self.display, cursor);
                } else {
                    warn!("X11DisplayDriver: failed to create invisible cursor");
                }
                XFreePixmap(self.display, pixmap);
            }
            XFlush(self.display);
        }
    }

    fn handle_poll_events(&mut self, wait: bool) -> Result<DriverResponse, DisplayError> {
        if self.window == 0 {
            return Err(DisplayError::UnexpectedRequest(
                "PollEvents before Init".to_string(),
            ));
        }
        let mut events = Vec::new();
        // SAFETY: XNextEvent fills a zeroed XEvent; with `wait` the first
        // call blocks until the server delivers something.
        unsafe {
            let mut block = wait;
            while block || XPending(self.display) > 0 {
                block = false;
                let mut event: XEvent = mem::zeroed();
                XNextEvent(self.display, &mut event);
                if let Some(display_event) = self.convert_event(&mut event) {
                    events.push(display_event);
                }
            }
        }
        Ok(DriverResponse::Events(events))
    }

    unsafe fn convert_event(&self, event: &mut XEvent) -> Option<DisplayEvent> {
        match event.get_type() {
            KeyPress => {
                let key_event = &mut event.key;
                let sym = XLookupKeysym(key_event, 0);
                let mut buffer = [0u8; 32];
                let count = XLookupString(
                    key_event,
                    buffer.as_mut_ptr() as *mut c_char,
                    buffer.len() as c_int,
                    ptr::null_mut(),
                    ptr::null_mut(),
                );
                let text = (count > 0)
                    .then(|| String::from_utf8_lossy(&buffer[..count as usize]).into_owned());
                let symbol = map_keysym(sym as u32);
                trace!("X11DisplayDriver: key {:#x} -> {:?}", sym, symbol);
                Some(DisplayEvent::Key {
                    symbol,
                    modifiers: extract_modifiers(key_event.state),
                    text,
                })
            }
            ClientMessage => {
                let message = &event.client_message;
                (message.data.get_long(0) as Atom == self.wm_delete_window)
                    .then_some(DisplayEvent::CloseRequested)
            }
            FocusIn => Some(DisplayEvent::FocusGained),
            FocusOut => Some(DisplayEvent::FocusLost),
            _ => None,
        }
    }

    fn handle_present(&mut self, frame: Framebuffer) -> Result<DriverResponse, DisplayError> {
        trace!("X11DisplayDriver: Presenting frame");
        if self.window == 0 {
            return Err(DisplayError::PresentationFailed(frame, "no window".to_string()));
        }
        if frame.width_px != self.width_px || frame.height_px != self.height_px {
            let reason = format!(
                "frame {}x{} does not match window {}x{}",
                frame.width_px, frame.height_px, self.width_px, self.height_px
            );
            return Err(DisplayError::PresentationFailed(frame, reason));
        }

        // SAFETY: the XImage borrows the frame's bytes for the duration of
        // XPutImage; its data pointer is cleared before XDestroyImage so Xlib
        // never frees memory it does not own.
        unsafe {
            let image = XCreateImage(
                self.display,
                self.visual,
                self.depth as u32,
                ZPixmap,
                0,
                frame.pixels.as_ptr() as *mut c_char,
                frame.width_px,
                frame.height_px,
                32,
                0,
            );
            if image.is_null() {
                return Err(DisplayError::PresentationFailed(
                    frame,
                    "Failed to create XImage".to_string(),
                ));
            }
            XPutImage(
                self.display,
                self.window,
                self.gc,
                image,
                0,
                0,
                0,
                0,
                frame.width_px,
                frame.height_px,
            );
            (*image).data = ptr::null_mut();
            XDestroyImage(image);
            XFlush(self.display);
        }
        Ok(DriverResponse::PresentComplete(frame))
    }

    fn handle_set_title(&mut self, title: &str) -> Result<DriverResponse> {
        let c_title = CString::new(title)?;
        if self.window != 0 {
            // SAFETY: window exists.
            unsafe {
                XStoreName(self.display, self.window, c_title.as_ptr());
                XFlush(self.display);
            }
        }
        Ok(DriverResponse::TitleSet)
    }
}

fn map_keysym(sym: u32) -> KeySymbol {
    match sym {
        keysym::XK_BackSpace => KeySymbol::Backspace,
        keysym::XK_Tab => KeySymbol::Tab,
        keysym::XK_Return | keysym::XK_KP_Enter => KeySymbol::Enter,
        keysym::XK_Escape => KeySymbol::Escape,
        keysym::XK_space => KeySymbol::Space,
        keysym::XK_Pause => KeySymbol::Pause,
        keysym::XK_Menu => KeySymbol::Menu,
        keysym::XK_Delete => KeySymbol::Delete,
        keysym::XK_Insert => KeySymbol::Insert,
        keysym::XK_Home => KeySymbol::Home,
        keysym::XK_End => KeySymbol::End,
        keysym::XK_Page_Up => KeySymbol::PageUp,
        keysym::XK_Page_Down => KeySymbol::PageDown,
        keysym::XK_Left => KeySymbol::Left,
        keysym::XK_Up => KeySymbol::Up,
        keysym::XK_Right => KeySymbol::Right,
        keysym::XK_Down => KeySymbol::Down,
        keysym::XK_Shift_L | keysym::XK_Shift_R => KeySymbol::Shift,
        keysym::XK_Control_L | keysym::XK_Control_R => KeySymbol::Control,
        keysym::XK_Alt_L | keysym::XK_Alt_R => KeySymbol::Alt,
        keysym::XK_Super_L | keysym::XK_Super_R => KeySymbol::Super,
        keysym::XK_F1 => KeySymbol::F1,
        keysym::XK_F2 => KeySymbol::F2,
        keysym::XK_F3 => KeySymbol::F3,
        keysym::XK_F4 => KeySymbol::F4,
        keysym::XK_F5 => KeySymbol::F5,
        keysym::XK_F6 => KeySymbol::F6,
        keysym::XK_F7 => KeySymbol::F7,
        keysym::XK_F8 => KeySymbol::F8,
        keysym::XK_F9 => KeySymbol::F9,
        keysym::XK_F10 => KeySymbol::F10,
        keysym::XK_F11 => KeySymbol::F11,
        keysym::XK_F12 => KeySymbol::F12,
        s if (0x20..0x7f).contains(&s) => {
            KeySymbol::Char((s as u8 as char).to_ascii_lowercase())
        }
        _ => KeySymbol::Unknown,
    }
}

fn extract_modifiers(state: u32) -> Modifiers {
    let mut modifiers = Modifiers::empty();
    if state & ShiftMask != 0 {
        modifiers |= Modifiers::SHIFT;
    }
    if state & ControlMask != 0 {
        modifiers |= Modifiers::CONTROL;
    }
    if state & Mod1Mask != 0 {
        modifiers |= Modifiers::ALT;
    }
    if state & Mod4Mask != 0 {
        modifiers |= Modifiers::SUPER;
    }
    modifiers
}

impl Drop for X11DisplayDriver {
    fn drop(&mut self) {
        info!("X11DisplayDriver::drop() - Cleaning up");
        // SAFETY: each resource is released once, in reverse order of
        // creation, and only if it was created.
        unsafe {
            if !self.gc.is_null() {
                XFreeGC(self.display, self.gc);
            }
            if self.window != 0 {
                XDestroyWindow(self.display, self.window);
            }
            if !self.display.is_null() {
                XCloseDisplay(self.display);
            }
        }
    }
}
