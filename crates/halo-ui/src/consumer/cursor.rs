use std::rc::Rc;

use halo_engine::coords::Vec2;
use halo_engine::input::PointerHub;
use halo_engine::time::FrameTask;

use crate::context::{ContextError, Providers};
use crate::cursor::{CursorState, CursorVariant};

use super::smoothing::{Follower, Smoothing};

/// Damping rates of the cursor and its trail.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct CursorConfig {
    /// Exponential rate of the main cursor, per second.
    pub smoothing_rate: f32,
    /// Rate of the trailing marker; lower lags further behind.
    pub trail_rate: f32,
}

impl Default for CursorConfig {
    fn default() -> Self {
        Self {
            smoothing_rate: 18.0,
            trail_rate: 8.0,
        }
    }
}

/// One frame of cursor output.
#[derive(Debug, Clone, PartialEq)]
pub struct CursorFrame {
    pub position: Vec2,
    pub trail: Vec2,
    pub variant: CursorVariant,
    pub pressed: bool,
    /// `false` until the first pointer move and while the pointer is outside
    /// the surface.
    pub visible: bool,
}

/// Where the cursor renderer writes its frames.
pub trait CursorSurface {
    fn write(&mut self, frame: &CursorFrame);
}

/// Custom cursor driven by the pointer hub.
///
/// Reads the latest sample once per frame, smooths it, and writes exactly one
/// [`CursorFrame`] per frame. Nothing is mounted on touch-only hosts.
pub struct CursorRenderer {
    task: Option<FrameTask>,
}

impl CursorRenderer {
    pub fn mount(
        providers: &Providers,
        config: CursorConfig,
        surface: impl CursorSurface + 'static,
    ) -> Result<Self, ContextError> {
        let hub = providers.pointer()?.clone();
        let cursor = Rc::clone(providers.cursor()?);
        let scheduler = providers.scheduler()?;

        let env = hub.environment();
        if env.is_touch_only() {
            log::debug!("touch-only environment; cursor renderer not mounted");
            return Ok(Self { task: None });
        }

        let mut pass = CursorPass {
            hub,
            cursor,
            main: Follower::new(Smoothing::for_environment(env, config.smoothing_rate)),
            trail: Follower::new(Smoothing::for_environment(env, config.trail_rate)),
            surface: Box::new(surface),
        };
        let task = scheduler.request_frames(move |time| pass.run(time.dt));

        Ok(Self { task: Some(task) })
    }

    pub fn is_mounted(&self) -> bool {
        self.task.is_some()
    }

    /// Cancels the frame task; the surface receives no further writes.
    pub fn unmount(&mut self) {
        if let Some(task) = self.task.take() {
            task.cancel();
        }
    }
}

struct CursorPass {
    hub: PointerHub,
    cursor: Rc<CursorState>,
    main: Follower,
    trail: Follower,
    surface: Box<dyn CursorSurface>,
}

impl CursorPass {
    fn run(&mut self, dt: f32) {
        let sample = self.hub.latest_sample();

        if sample.is_initialized() {
            self.main.set_target(sample.position());
            self.trail.set_target(sample.position());
        }
        self.main.step(dt);
        self.trail.step(dt);

        let frame = CursorFrame {
            position: self.main.position(),
            trail: self.trail.position(),
            variant: self.cursor.variant(),
            pressed: self.hub.pointer_pressed(),
            visible: sample.is_initialized() && self.hub.pointer_inside(),
        };
        self.surface.write(&frame);
    }
}
