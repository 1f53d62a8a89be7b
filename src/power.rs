// src/power.rs

//! Screen blanking after a period without input.
//!
//! A timer thread owns the panel: it is the only writer of the "screen
//! powered" flag and of the blank file while it runs. The redraw loop only
//! reads the flag and reports activity through a channel.

use log::{debug, info, warn};
use std::fs;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, RecvTimeoutError, Sender};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

/// Framebuffer blank levels understood by the kernel.
const FB_BLANK_UNBLANK: &str = "0";
const FB_BLANK_POWERDOWN: &str = "4";

/// Whether the panel is lit, mirrored into an optional sysfs blank file.
#[derive(Debug)]
pub struct ScreenState {
    powered: AtomicBool,
    blank_path: Option<PathBuf>,
}

impl ScreenState {
    pub fn new(blank_path: Option<PathBuf>) -> Self {
        Self {
            powered: AtomicBool::new(true),
            blank_path,
        }
    }

    pub fn is_powered(&self) -> bool {
        self.powered.load(Ordering::Acquire)
    }

    /// Switches the panel. Failing to write the blank file is logged; the
    /// flag follows the request regardless. Called only by the timer thread,
    /// or by `PowerSaver::drop` once that thread has been joined.
    fn set_powered(&self, on: bool) {
        let was = self.powered.swap(on, Ordering::AcqRel);
        if was == on {
            return;
        }
        info!("Screen {}", if on { "on" } else { "off" });
        if let Some(path) = &self.blank_path {
            let level = if on { FB_BLANK_UNBLANK } else { FB_BLANK_POWERDOWN };
            if let Err(e) = fs::write(path, level) {
                warn!("Could not write '{}' to {}: {}", level, path.display(), e);
            }
        }
    }
}

#[derive(Debug)]
enum TimerMessage {
    /// Input arrived: restart the countdown and light the panel if needed.
    Activity,
    Shutdown,
}

/// Cloneable handle the input side uses to report activity.
#[derive(Debug, Clone)]
pub struct ActivityNotifier {
    tx: Option<Sender<TimerMessage>>,
    screen: Arc<ScreenState>,
}

impl ActivityNotifier {
    /// Restarts the blanking countdown. Returns true when the screen was
    /// blanked, i.e. this activity is what wakes it. The timer thread does
    /// the unblanking.
    pub fn notify(&self) -> bool {
        let was_blank = !self.screen.is_powered();
        if let Some(tx) = &self.tx {
            if tx.send(TimerMessage::Activity).is_err() {
                debug!("ActivityNotifier: timer thread is gone");
            }
        }
        was_blank
    }
}

/// Owns the blanking timer thread. Dropping it stops the thread and leaves
/// the screen on.
pub struct PowerSaver {
    screen: Arc<ScreenState>,
    tx: Option<Sender<TimerMessage>>,
    thread: Option<JoinHandle<()>>,
}

impl PowerSaver {
    /// Starts the timer. A zero timeout disables blanking and spawns no
    /// thread.
    pub fn start(screen: Arc<ScreenState>, timeout: Duration) -> Self {
        if timeout.is_zero() {
            debug!("PowerSaver: blanking disabled");
            return Self {
                screen,
                tx: None,
                thread: None,
            };
        }

        let (tx, rx) = mpsc::channel();
        let thread_screen = Arc::clone(&screen);
        let spawned = thread::Builder::new()
            .name("power-saver".to_string())
            .spawn(move || {
                debug!("PowerSaver: timer started ({:?})", timeout);
                loop {
                    let message = if thread_screen.is_powered() {
                        rx.recv_timeout(timeout)
                    } else {
                        rx.recv().map_err(|_| RecvTimeoutError::Disconnected)
                    };
                    match message {
                        Ok(TimerMessage::Activity) => thread_screen.set_powered(true),
                        Err(RecvTimeoutError::Timeout) => thread_screen.set_powered(false),
                        Ok(TimerMessage::Shutdown) | Err(RecvTimeoutError::Disconnected) => break,
                    }
                }
                debug!("PowerSaver: timer stopped");
            });

        match spawned {
            Ok(handle) => Self {
                screen,
                tx: Some(tx),
                thread: Some(handle),
            },
            Err(e) => {
                warn!("PowerSaver: could not spawn timer thread: {}", e);
                Self {
                    screen,
                    tx: None,
                    thread: None,
                }
            }
        }
    }

    pub fn notifier(&self) -> ActivityNotifier {
        ActivityNotifier {
            tx: self.tx.clone(),
            screen: Arc::clone(&self.screen),
        }
    }

    pub fn screen(&self) -> &Arc<ScreenState> {
        &self.screen
    }
}

impl Drop for PowerSaver {
    fn drop(&mut self) {
        if let Some(tx) = self.tx.take() {
            let _ = tx.send(TimerMessage::Shutdown);
        }
        if let Some(handle) = self.thread.take() {
            if handle.join().is_err() {
                warn!("PowerSaver: timer thread panicked");
            }
        }
        self.screen.set_powered(true);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Instant;
    use test_log::test;

    fn wait_until(mut cond: impl FnMut() -> bool) -> bool {
        let deadline = Instant::now() + Duration::from_secs(5);
        while Instant::now() < deadline {
            if cond() {
                return true;
            }
            thread::sleep(Duration::from_millis(5));
        }
        false
    }

    #[test]
    fn flag_toggles_and_writes_blank_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("blank");
        let screen = ScreenState::new(Some(path.clone()));

        screen.set_powered(false);
        assert!(!screen.is_powered());
        assert_eq!(fs::read_to_string(&path).unwrap(), "4");

        screen.set_powered(true);
        assert!(screen.is_powered());
        assert_eq!(fs::read_to_string(&path).unwrap(), "0");
    }

    #[test]
    fn unwritable_blank_file_is_not_fatal() {
        let screen = ScreenState::new(Some(PathBuf::from("/nonexistent/dir/blank")));
        screen.set_powered(false);
        assert!(!screen.is_powered());
    }

    #[test]
    fn timer_blanks_and_activity_wakes() {
        let screen = Arc::new(ScreenState::new(None));
        let saver = PowerSaver::start(Arc::clone(&screen), Duration::from_millis(20));
        let notifier = saver.notifier();

        assert!(wait_until(|| !screen.is_powered()));
        assert!(notifier.notify(), "first press after blanking wakes the screen");
        assert!(wait_until(|| screen.is_powered()));

        drop(saver);
        assert!(screen.is_powered());
    }

    #[test]
    fn activity_while_lit_is_passed_through() {
        let screen = Arc::new(ScreenState::new(None));
        let saver = PowerSaver::start(Arc::clone(&screen), Duration::from_secs(3600));
        assert!(!saver.notifier().notify());
        assert!(screen.is_powered());
    }

    #[test]
    fn zero_timeout_never_blanks() {
        let screen = Arc::new(ScreenState::new(None));
        let saver = PowerSaver::start(Arc::clone(&screen), Duration::ZERO);
        thread::sleep(Duration::from_millis(30));
        assert!(screen.is_powered());
        assert!(!saver.notifier().notify());
    }

    #[test]
    fn activity_racing_a_timeout_leaves_the_panel_lit() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("blank");
        let screen = Arc::new(ScreenState::new(Some(path.clone())));
        let saver = PowerSaver::start(Arc::clone(&screen), Duration::from_millis(1));
        let notifier = saver.notifier();

        for _ in 0..200 {
            notifier.notify();
        }
        // Once the thread settles, the blank file agrees with the flag.
        assert!(wait_until(|| {
            let lit = screen.is_powered();
            let file = fs::read_to_string(&path).unwrap_or_default();
            file == if lit { "0" } else { "4" }
        }));
        drop(saver);
        assert!(screen.is_powered());
        assert_eq!(fs::read_to_string(&path).unwrap(), "0");
    }

    #[test]
    fn notify_does_not_touch_the_flag_itself() {
        let screen = Arc::new(ScreenState::new(None));
        screen.set_powered(false);
        // No timer thread: nobody is there to unblank.
        let saver = PowerSaver::start(Arc::clone(&screen), Duration::ZERO);
        assert!(saver.notifier().notify());
        assert!(!screen.is_powered());
        drop(saver);
        assert!(screen.is_powered());
    }
}
