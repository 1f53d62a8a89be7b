// src/compositor/tests.rs

use super::*;
use crate::color::Color;
use crate::display::{DisplayMode, HeadlessDisplayDriver, HeadlessProbe};
use crate::geometry::Rect;
use crate::input::EventSource;
use crate::render::RenderContext;
use std::collections::VecDeque;
use test_log::test;

type Log = Rc<RefCell<Vec<String>>>;

struct Probe {
    name: &'static str,
    log: Log,
    consumes: bool,
    animation_frames: u32,
    color: Color,
    status: Rc<RefCell<LayerStatus>>,
}

impl Probe {
    fn new(name: &'static str, log: &Log) -> Self {
        Self {
            name,
            log: Rc::clone(log),
            consumes: false,
            animation_frames: 0,
            color: Color::TRANSPARENT,
            status: Rc::new(RefCell::new(LayerStatus::Active)),
        }
    }
}

impl Layer for Probe {
    fn paint(&mut self, surface: &mut PresentationSurface) {
        self.log.borrow_mut().push(format!("paint {}", self.name));
        surface.fill(Rect::new(0, 0, 4, 4), self.color);
    }

    fn run_animations(&mut self) -> bool {
        self.log.borrow_mut().push(format!("animate {}", self.name));
        if self.animation_frames > 0 {
            self.animation_frames -= 1;
            true
        } else {
            false
        }
    }

    fn handle_input(&mut self, button: Button) -> bool {
        self.log
            .borrow_mut()
            .push(format!("input {} {:?}", self.name, button));
        self.consumes
    }

    fn status(&self) -> LayerStatus {
        *self.status.borrow()
    }
}

/// Hands out scripted buttons and records the `wait` flag of each call.
#[derive(Default)]
struct ScriptedInput {
    buttons: VecDeque<Option<Button>>,
    waits: Vec<bool>,
}

impl ScriptedInput {
    fn new(buttons: &[Option<Button>]) -> Self {
        Self {
            buttons: buttons.iter().copied().collect(),
            waits: Vec::new(),
        }
    }
}

impl InputSource for ScriptedInput {
    fn next_button(&mut self, _events: &mut dyn EventSource, wait: bool) -> Option<Button> {
        self.waits.push(wait);
        self.buttons.pop_front().unwrap_or(Some(Button::Quit))
    }
}

fn screen(ctx: &RenderContext) -> (PresentationSurface, HeadlessProbe) {
    let driver = HeadlessDisplayDriver::with_modes(vec![DisplayMode::new(32, 24)]);
    let probe = driver.probe();
    let surface = PresentationSurface::open(ctx, Box::new(driver), "t", 32, 24, false).unwrap();
    (surface, probe)
}

fn entries(log: &Log, prefix: &str) -> Vec<String> {
    log.borrow()
        .iter()
        .filter(|e| e.starts_with(prefix))
        .cloned()
        .collect()
}

#[test]
fn dispatch_stops_at_first_consumer_from_the_top() {
    let log = Log::default();
    let mut stack = LayerStack::new();
    stack.push(Box::new(Probe::new("A", &log)));
    stack.push(Box::new(Probe {
        consumes: true,
        ..Probe::new("B", &log)
    }));
    stack.push(Box::new(Probe::new("C", &log)));

    assert!(stack.dispatch(Button::Accept));
    assert_eq!(
        entries(&log, "input"),
        vec!["input C Accept", "input B Accept"]
    );
}

#[test]
fn unconsumed_button_visits_every_layer() {
    let log = Log::default();
    let mut stack = LayerStack::new();
    stack.push(Box::new(Probe::new("A", &log)));
    stack.push(Box::new(Probe::new("B", &log)));
    assert!(!stack.dispatch(Button::Left));
    assert_eq!(entries(&log, "input").len(), 2);
}

#[test]
fn dismissed_layer_is_pruned_next_frame() {
    let ctx = RenderContext::new();
    let (mut surface, _probe) = screen(&ctx);
    let log = Log::default();
    let b = Probe::new("B", &log);
    let b_status = Rc::clone(&b.status);

    let mut compositor = Compositor::new();
    compositor.push(Box::new(Probe::new("A", &log)));
    compositor.push(Box::new(b));
    compositor.push(Box::new(Probe::new("C", &log)));
    *b_status.borrow_mut() = LayerStatus::Dismissed;

    let mut input = ScriptedInput::new(&[Some(Button::Up)]);
    assert_eq!(compositor.run_frame(&mut surface, &mut input), None);

    assert_eq!(compositor.stack().len(), 2);
    assert_eq!(entries(&log, "paint"), vec!["paint A", "paint C"]);
}

#[test]
fn every_layer_animates_and_animation_disables_waiting() {
    let ctx = RenderContext::new();
    let (mut surface, _probe) = screen(&ctx);
    let log = Log::default();
    let mut compositor = Compositor::new();
    compositor.push(Box::new(Probe {
        animation_frames: 1,
        ..Probe::new("A", &log)
    }));
    compositor.push(Box::new(Probe::new("B", &log)));

    let mut input = ScriptedInput::new(&[None, Some(Button::Down)]);
    assert_eq!(compositor.run_frame(&mut surface, &mut input), None);
    assert_eq!(compositor.run_frame(&mut surface, &mut input), None);

    assert_eq!(
        entries(&log, "animate"),
        vec!["animate A", "animate B", "animate A", "animate B"]
    );
    assert_eq!(input.waits, vec![false, true]);
}

#[test]
fn waiting_retries_until_a_button_arrives() {
    let ctx = RenderContext::new();
    let (mut surface, _probe) = screen(&ctx);
    let log = Log::default();
    let mut compositor = Compositor::new();
    compositor.push(Box::new(Probe::new("A", &log)));

    let mut input = ScriptedInput::new(&[None, None, Some(Button::Right)]);
    assert_eq!(compositor.run_frame(&mut surface, &mut input), None);

    assert_eq!(input.waits, vec![true, true, true]);
    assert_eq!(entries(&log, "input"), vec!["input A Right"]);
}

#[test]
fn quit_is_never_dispatched() {
    let ctx = RenderContext::new();
    let (mut surface, _probe) = screen(&ctx);
    let log = Log::default();
    let mut compositor = Compositor::new();
    compositor.push(Box::new(Probe {
        consumes: true,
        ..Probe::new("A", &log)
    }));

    let mut input = ScriptedInput::new(&[Some(Button::Quit)]);
    assert_eq!(
        compositor.run_frame(&mut surface, &mut input),
        Some(LoopExit::Quit)
    );
    assert!(entries(&log, "input").is_empty());
}

#[test]
fn pending_launch_exits_after_flip_without_reading_input() {
    let ctx = RenderContext::new();
    let (mut surface, probe) = screen(&ctx);
    let log = Log::default();
    let mut compositor = Compositor::new();
    compositor.push(Box::new(Probe::new("A", &log)));
    compositor
        .launch_signal()
        .request(LaunchRequest::new("/usr/bin/game"));

    let mut input = ScriptedInput::new(&[Some(Button::Accept)]);
    let exit = compositor.run_frame(&mut surface, &mut input);

    assert_eq!(exit, Some(LoopExit::Launch(LaunchRequest::new("/usr/bin/game"))));
    assert_eq!(probe.present_count(), 1);
    assert!(input.waits.is_empty());
    assert!(!compositor.launch_signal().is_pending());
}

#[test]
fn layers_paint_back_to_front() {
    let ctx = RenderContext::new();
    let (mut surface, probe) = screen(&ctx);
    let log = Log::default();
    let mut compositor = Compositor::new();
    compositor.push(Box::new(Probe {
        color: Color::rgb(255, 0, 0),
        ..Probe::new("A", &log)
    }));
    compositor.push(Box::new(Probe {
        color: Color::rgb(0, 255, 0),
        ..Probe::new("B", &log)
    }));

    let mut input = ScriptedInput::new(&[Some(Button::Quit)]);
    compositor.run_frame(&mut surface, &mut input);

    let frame = probe.last_frame().unwrap();
    assert_eq!(frame.pixel(1, 1), Some(Color::rgb(0, 255, 0)));
}

#[test]
fn spawned_layers_join_on_top_next_frame() {
    let ctx = RenderContext::new();
    let (mut surface, _probe) = screen(&ctx);
    let log = Log::default();
    let mut compositor = Compositor::new();
    compositor.push(Box::new(Probe::new("A", &log)));
    compositor.spawner().spawn(Box::new(Probe {
        consumes: true,
        ..Probe::new("S", &log)
    }));
    assert_eq!(compositor.stack().len(), 1);

    let mut input = ScriptedInput::new(&[Some(Button::Accept)]);
    compositor.run_frame(&mut surface, &mut input);

    assert_eq!(compositor.stack().len(), 2);
    assert_eq!(entries(&log, "input"), vec!["input S Accept"]);
}

#[test]
fn run_loops_until_quit() {
    let ctx = RenderContext::new();
    let (mut surface, probe) = screen(&ctx);
    let log = Log::default();
    let mut compositor = Compositor::new();
    compositor.push(Box::new(Probe::new("A", &log)));

    let mut input = ScriptedInput::new(&[Some(Button::Up), Some(Button::Down)]);
    assert_eq!(compositor.run(&mut surface, &mut input), LoopExit::Quit);
    assert_eq!(compositor.frames(), 3);
    assert_eq!(probe.present_count(), 3);
}
