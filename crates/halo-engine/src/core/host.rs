use std::cell::Cell;
use std::rc::Rc;

use crate::coords::Vec2;
use crate::input::{Environment, EventTarget, PointerTarget};
use crate::time::FrameScheduler;

/// Runtime-owned services handed to the application.
///
/// - `target`: the viewport's event target; the runtime dispatches every
///   translated pointer event on it
/// - `scheduler`: the frame domain, run once per redraw
/// - `environment`: host capabilities, fixed for the session
pub struct Host {
    target: Rc<EventTarget>,
    scheduler: FrameScheduler,
    environment: Environment,
    viewport: Cell<Vec2>,
}

impl Host {
    pub fn new(environment: Environment) -> Self {
        Self {
            target: Rc::new(EventTarget::new()),
            scheduler: FrameScheduler::new(),
            environment,
            viewport: Cell::new(Vec2::zero()),
        }
    }

    /// The concrete target, for hosts and tests that dispatch events.
    pub fn event_target(&self) -> Rc<EventTarget> {
        Rc::clone(&self.target)
    }

    /// The target as seen by listeners such as `PointerHub`.
    pub fn pointer_target(&self) -> Rc<dyn PointerTarget> {
        self.target.clone()
    }

    pub fn scheduler(&self) -> &FrameScheduler {
        &self.scheduler
    }

    pub fn environment(&self) -> Environment {
        self.environment
    }

    /// Logical viewport size in logical pixels.
    pub fn viewport(&self) -> Vec2 {
        self.viewport.get()
    }

    pub fn set_viewport(&self, size: Vec2) {
        self.viewport.set(size);
    }
}
