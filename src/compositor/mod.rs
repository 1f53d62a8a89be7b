// src/compositor/mod.rs

//! The layered scene and the redraw/input loop that drives it.
//!
//! One frame is: prune dismissed layers, tick animations, paint back to
//! front, flip, check for a pending launch, wait for a button (only while
//! nothing animates) and dispatch it front to back.

pub mod layer;

#[cfg(test)]
mod tests;

pub use layer::{Layer, LayerStatus};

use crate::input::{Button, InputSource};
use crate::surface::PresentationSurface;
use log::{debug, info, trace};
use std::cell::RefCell;
use std::path::PathBuf;
use std::rc::Rc;

/// Ordered layers, painted first to last.
#[derive(Default)]
pub struct LayerStack {
    layers: Vec<Box<dyn Layer>>,
}

impl LayerStack {
    pub fn new() -> Self {
        Self::default()
    }

    /// Puts `layer` on top.
    pub fn push(&mut self, layer: Box<dyn Layer>) {
        self.layers.push(layer);
    }

    pub fn len(&self) -> usize {
        self.layers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }

    /// Removes dismissed layers; survivors keep their order.
    pub fn prune(&mut self) -> usize {
        let before = self.layers.len();
        self.layers.retain(|l| l.status() == LayerStatus::Active);
        let removed = before - self.layers.len();
        if removed > 0 {
            debug!("LayerStack: pruned {} dismissed layer(s)", removed);
        }
        removed
    }

    /// Ticks every layer. True if any of them is still animating.
    pub fn run_animations(&mut self) -> bool {
        self.layers
            .iter_mut()
            .fold(false, |animating, layer| layer.run_animations() | animating)
    }

    pub fn paint(&mut self, surface: &mut PresentationSurface) {
        for layer in &mut self.layers {
            layer.paint(surface);
        }
    }

    /// Offers `button` from the top layer down until one consumes it.
    pub fn dispatch(&mut self, button: Button) -> bool {
        for layer in self.layers.iter_mut().rev() {
            if layer.handle_input(button) {
                return true;
            }
        }
        trace!("LayerStack: {:?} not consumed", button);
        false
    }
}

/// A program the launcher should run once it has shut its window.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaunchRequest {
    pub program: PathBuf,
    pub args: Vec<String>,
    pub working_dir: Option<PathBuf>,
}

impl LaunchRequest {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            working_dir: None,
        }
    }
}

/// Shared slot layers use to ask the loop to exit and launch something.
#[derive(Debug, Clone, Default)]
pub struct LaunchSignal {
    pending: Rc<RefCell<Option<LaunchRequest>>>,
}

impl LaunchSignal {
    /// Requests a launch. A later request replaces an earlier one.
    pub fn request(&self, request: LaunchRequest) {
        info!("Launch requested: {}", request.program.display());
        *self.pending.borrow_mut() = Some(request);
    }

    pub fn is_pending(&self) -> bool {
        self.pending.borrow().is_some()
    }

    fn take(&self) -> Option<LaunchRequest> {
        self.pending.borrow_mut().take()
    }
}

/// Queue through which layers open new layers. Spawned layers join the top
/// of the stack at the start of the next frame.
#[derive(Clone, Default)]
pub struct LayerSpawner {
    queue: Rc<RefCell<Vec<Box<dyn Layer>>>>,
}

impl LayerSpawner {
    pub fn spawn(&self, layer: Box<dyn Layer>) {
        self.queue.borrow_mut().push(layer);
    }

    fn drain(&self) -> Vec<Box<dyn Layer>> {
        std::mem::take(&mut *self.queue.borrow_mut())
    }
}

/// Why the loop ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoopExit {
    Quit,
    Launch(LaunchRequest),
}

#[derive(Default)]
pub struct Compositor {
    stack: LayerStack,
    launch: LaunchSignal,
    spawner: LayerSpawner,
    frames: u64,
}

impl Compositor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, layer: Box<dyn Layer>) {
        self.stack.push(layer);
    }

    pub fn stack(&self) -> &LayerStack {
        &self.stack
    }

    pub fn launch_signal(&self) -> LaunchSignal {
        self.launch.clone()
    }

    pub fn spawner(&self) -> LayerSpawner {
        self.spawner.clone()
    }

    /// Frames completed so far.
    pub fn frames(&self) -> u64 {
        self.frames
    }

    /// Runs one frame. Returns `Some` when the loop should end.
    pub fn run_frame(
        &mut self,
        surface: &mut PresentationSurface,
        input: &mut dyn InputSource,
    ) -> Option<LoopExit> {
        for layer in self.spawner.drain() {
            self.stack.push(layer);
        }
        self.stack.prune();
        let animating = self.stack.run_animations();
        self.stack.paint(surface);
        surface.flip();
        self.frames += 1;

        if let Some(request) = self.launch.take() {
            return Some(LoopExit::Launch(request));
        }

        let wait = !animating;
        let button = loop {
            let button = input.next_button(surface, wait);
            if button.is_some() || !wait {
                break button;
            }
        };
        match button {
            Some(Button::Quit) => {
                info!("Quit requested");
                Some(LoopExit::Quit)
            }
            Some(button) => {
                self.stack.dispatch(button);
                None
            }
            None => None,
        }
    }

    /// Runs frames until a layer requests a launch or the user quits.
    pub fn run(
        &mut self,
        surface: &mut PresentationSurface,
        input: &mut dyn InputSource,
    ) -> LoopExit {
        info!("Compositor: entering main loop with {} layer(s)", self.stack.len());
        loop {
            if let Some(exit) = self.run_frame(surface, input) {
                info!("Compositor: leaving main loop after {} frame(s)", self.frames);
                return exit;
            }
        }
    }
}
