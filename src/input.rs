// src/input.rs

//! Abstract buttons and the sources that produce them.
//!
//! The compositor only ever sees `Button`s. Where they come from is hidden
//! behind `InputSource`; the stock implementation, `KeymapInput`, turns
//! display driver events into buttons through a configurable key table.

use crate::display::DisplayEvent;
use crate::keys::KeySymbol;
use crate::power::ActivityNotifier;
use log::{debug, trace, warn};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, VecDeque};

/// Logical launcher buttons.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Button {
    Up,
    Down,
    Left,
    Right,
    Accept,
    Cancel,
    Clear,
    AltLeft,
    AltRight,
    PageUp,
    PageDown,
    Menu,
    Settings,
    /// Leave the launcher. Never dispatched to layers.
    Quit,
}

/// Anything that can deliver native display events. Implemented by the
/// presentation surface, which owns the window.
pub trait EventSource {
    /// Drains queued events. With `wait` blocks until at least one arrives,
    /// although an implementation may still return an empty batch.
    fn poll_events(&mut self, wait: bool) -> Vec<DisplayEvent>;
}

/// Produces buttons for the compositor loop.
pub trait InputSource {
    /// Returns the next button. With `wait` the call may block; without it
    /// `None` means nothing is pending.
    fn next_button(&mut self, events: &mut dyn EventSource, wait: bool) -> Option<Button>;
}

/// Translates key events into buttons through a key table.
pub struct KeymapInput {
    keymap: HashMap<KeySymbol, Button>,
    pending: VecDeque<Button>,
    activity: Option<ActivityNotifier>,
}

impl Default for KeymapInput {
    fn default() -> Self {
        Self::new(default_keymap())
    }
}

impl KeymapInput {
    pub fn new(keymap: HashMap<KeySymbol, Button>) -> Self {
        Self {
            keymap,
            pending: VecDeque::new(),
            activity: None,
        }
    }

    /// Builds a key table from `key name -> button` entries as written in
    /// the configuration, on top of the default table. Unknown key names are
    /// skipped.
    pub fn from_names(entries: &HashMap<String, Button>) -> Self {
        let mut keymap = default_keymap();
        for (name, button) in entries {
            match name.parse::<KeySymbol>() {
                Ok(symbol) => {
                    keymap.insert(symbol, *button);
                }
                Err(e) => warn!("KeymapInput: ignoring keymap entry: {}", e),
            }
        }
        Self::new(keymap)
    }

    /// Reports every key press to the screen blanking timer.
    pub fn with_activity(mut self, activity: ActivityNotifier) -> Self {
        self.activity = Some(activity);
        self
    }

    fn translate(&mut self, event: DisplayEvent) {
        match event {
            DisplayEvent::CloseRequested => {
                debug!("KeymapInput: close requested");
                self.pending.push_back(Button::Quit);
            }
            DisplayEvent::Key { symbol, .. } => {
                let woke = self
                    .activity
                    .as_ref()
                    .map(|a| a.notify())
                    .unwrap_or(false);
                if woke {
                    // The press that turns the screen back on does nothing else.
                    debug!("KeymapInput: {:?} woke the screen", symbol);
                    return;
                }
                match self.keymap.get(&symbol) {
                    Some(button) => {
                        trace!("KeymapInput: {:?} -> {:?}", symbol, button);
                        self.pending.push_back(*button);
                    }
                    None => trace!("KeymapInput: unmapped key {:?}", symbol),
                }
            }
            DisplayEvent::FocusGained | DisplayEvent::FocusLost => {}
        }
    }
}

impl InputSource for KeymapInput {
    fn next_button(&mut self, events: &mut dyn EventSource, wait: bool) -> Option<Button> {
        if let Some(button) = self.pending.pop_front() {
            return Some(button);
        }
        for event in events.poll_events(wait) {
            self.translate(event);
        }
        self.pending.pop_front()
    }
}

/// The built-in table: d-pad on the arrow keys, face buttons on the keys
/// handheld firmwares usually report for them.
pub fn default_keymap() -> HashMap<KeySymbol, Button> {
    HashMap::from([
        (KeySymbol::Up, Button::Up),
        (KeySymbol::Down, Button::Down),
        (KeySymbol::Left, Button::Left),
        (KeySymbol::Right, Button::Right),
        (KeySymbol::Control, Button::Accept),
        (KeySymbol::Alt, Button::Cancel),
        (KeySymbol::Space, Button::Clear),
        (KeySymbol::Tab, Button::AltLeft),
        (KeySymbol::Backspace, Button::AltRight),
        (KeySymbol::PageUp, Button::PageUp),
        (KeySymbol::PageDown, Button::PageDown),
        (KeySymbol::Escape, Button::Menu),
        (KeySymbol::Enter, Button::Settings),
    ])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keys::Modifiers;
    use test_log::test;

    #[derive(Default)]
    struct Scripted {
        batches: VecDeque<Vec<DisplayEvent>>,
        polls: Vec<bool>,
    }

    impl EventSource for Scripted {
        fn poll_events(&mut self, wait: bool) -> Vec<DisplayEvent> {
            self.polls.push(wait);
            self.batches.pop_front().unwrap_or_default()
        }
    }

    fn key(symbol: KeySymbol) -> DisplayEvent {
        DisplayEvent::Key {
            symbol,
            modifiers: Modifiers::empty(),
            text: None,
        }
    }

    #[test]
    fn batched_events_are_delivered_in_order() {
        let mut source = Scripted::default();
        source
            .batches
            .push_back(vec![key(KeySymbol::Up), key(KeySymbol::Control)]);
        let mut input = KeymapInput::default();

        assert_eq!(input.next_button(&mut source, true), Some(Button::Up));
        assert_eq!(input.next_button(&mut source, true), Some(Button::Accept));
        assert_eq!(source.polls, vec![true]);
    }

    #[test]
    fn close_request_becomes_quit() {
        let mut source = Scripted::default();
        source.batches.push_back(vec![DisplayEvent::CloseRequested]);
        let mut input = KeymapInput::default();
        assert_eq!(input.next_button(&mut source, false), Some(Button::Quit));
    }

    #[test]
    fn unmapped_keys_and_focus_are_ignored() {
        let mut source = Scripted::default();
        source
            .batches
            .push_back(vec![key(KeySymbol::F7), DisplayEvent::FocusLost]);
        let mut input = KeymapInput::default();
        assert_eq!(input.next_button(&mut source, false), None);
    }

    #[test]
    fn configured_names_override_defaults() {
        let names = HashMap::from([
            ("a".to_string(), Button::Accept),
            ("Up".to_string(), Button::PageUp),
            ("bogus key".to_string(), Button::Menu),
        ]);
        let mut input = KeymapInput::from_names(&names);
        let mut source = Scripted::default();
        source
            .batches
            .push_back(vec![key(KeySymbol::Char('a')), key(KeySymbol::Up)]);

        assert_eq!(input.next_button(&mut source, false), Some(Button::Accept));
        assert_eq!(input.next_button(&mut source, false), Some(Button::PageUp));
    }

    #[test]
    fn button_names_deserialize_snake_case() {
        let b: Button = serde_json::from_str("\"alt_left\"").unwrap();
        assert_eq!(b, Button::AltLeft);
    }
}
