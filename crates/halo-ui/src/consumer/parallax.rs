use std::cell::Cell;
use std::rc::Rc;

use halo_engine::coords::{Rect, Vec2};
use halo_engine::input::{PointerHub, Subscription};
use halo_engine::time::FrameTask;

use crate::context::{ContextError, Providers};

use super::smoothing::{Follower, Smoothing};

/// Offset range and damping of a parallax layer.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct ParallaxConfig {
    /// Offset at the container's left and right edges.
    pub range_x: (f32, f32),
    /// Offset at the container's top and bottom edges.
    pub range_y: (f32, f32),
    pub smoothing_rate: f32,
}

impl Default for ParallaxConfig {
    fn default() -> Self {
        Self {
            range_x: (-15.0, 15.0),
            range_y: (-15.0, 15.0),
            smoothing_rate: 6.0,
        }
    }
}

impl ParallaxConfig {
    /// Maps a pointer position to the layer's target offset. Positions
    /// outside `container` clamp to the range ends.
    pub fn offset_for(&self, container: Rect, pointer: Vec2) -> Vec2 {
        let t = container
            .relative(pointer)
            .clamp(Vec2::zero(), Vec2::new(1.0, 1.0));
        Vec2::new(
            self.range_x.0 + (self.range_x.1 - self.range_x.0) * t.x,
            self.range_y.0 + (self.range_y.1 - self.range_y.0) * t.y,
        )
    }
}

/// Receives layer offsets.
pub trait LayerSurface {
    fn write_offset(&mut self, offset: Vec2);
}

/// A layer displaced by the pointer position within its container.
///
/// The hub subscription only marks the layer dirty; the target offset is
/// recomputed on the next frame and the surface is written only while the
/// offset is still moving.
pub struct ParallaxLayer {
    container: Rc<Cell<Rect>>,
    dirty: Rc<Cell<bool>>,
    subscription: Option<Subscription>,
    task: Option<FrameTask>,
}

impl ParallaxLayer {
    pub fn mount(
        providers: &Providers,
        container: Rect,
        config: ParallaxConfig,
        surface: impl LayerSurface + 'static,
    ) -> Result<Self, ContextError> {
        let hub = providers.pointer()?.clone();
        let scheduler = providers.scheduler()?;

        let container = Rc::new(Cell::new(container));
        let dirty = Rc::new(Cell::new(hub.latest_sample().is_initialized()));

        let subscription = {
            let dirty = Rc::clone(&dirty);
            hub.subscribe(move |_| dirty.set(true))
        };

        let smoothing = Smoothing::for_environment(hub.environment(), config.smoothing_rate);
        let mut pass = ParallaxPass {
            hub,
            config,
            container: Rc::clone(&container),
            dirty: Rc::clone(&dirty),
            follower: Follower::new(smoothing),
            surface: Box::new(surface),
        };
        let task = scheduler.request_frames(move |time| pass.run(time.dt));

        Ok(Self {
            container,
            dirty,
            subscription: Some(subscription),
            task: Some(task),
        })
    }

    pub fn container(&self) -> Rect {
        self.container.get()
    }

    /// Updates the container; the target is remapped on the next frame.
    pub fn set_container(&self, container: Rect) {
        self.container.set(container);
        self.dirty.set(true);
    }

    pub fn is_mounted(&self) -> bool {
        self.task.is_some()
    }

    pub fn unmount(&mut self) {
        if let Some(task) = self.task.take() {
            task.cancel();
        }
        if let Some(subscription) = self.subscription.take() {
            subscription.unsubscribe();
        }
    }
}

struct ParallaxPass {
    hub: PointerHub,
    config: ParallaxConfig,
    container: Rc<Cell<Rect>>,
    dirty: Rc<Cell<bool>>,
    follower: Follower,
    surface: Box<dyn LayerSurface>,
}

impl ParallaxPass {
    fn run(&mut self, dt: f32) {
        if self.dirty.replace(false) {
            let sample = self.hub.latest_sample();
            if sample.is_initialized() {
                self.follower
                    .set_target(self.config.offset_for(self.container.get(), sample.position()));
            }
        }

        if self.follower.step(dt) {
            self.surface.write_offset(self.follower.position());
        }
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;

    use halo_engine::input::{Environment, EventTarget, InputEvent};
    use halo_engine::time::{FrameScheduler, FrameTime};

    use super::*;

    #[derive(Clone, Default)]
    struct Offsets(Rc<RefCell<Vec<Vec2>>>);

    impl LayerSurface for Offsets {
        fn write_offset(&mut self, offset: Vec2) {
            self.0.borrow_mut().push(offset);
        }
    }

    fn setup(env: Environment) -> (Rc<EventTarget>, FrameScheduler, Providers) {
        let target = Rc::new(EventTarget::new());
        let hub = PointerHub::new(target.clone(), env);
        hub.initialize();
        let scheduler = FrameScheduler::new();
        let providers = Providers::empty()
            .with_pointer(hub)
            .with_scheduler(scheduler.clone());
        (target, scheduler, providers)
    }

    fn frame(i: u64) -> FrameTime {
        FrameTime::with_dt(1.0 / 60.0, i)
    }

    const CONTAINER: Rect = Rect::new(0.0, 0.0, 1000.0, 500.0);

    // ── mapping ───────────────────────────────────────────────────────────

    #[test]
    fn offset_spans_configured_range() {
        let config = ParallaxConfig::default();

        assert_eq!(config.offset_for(CONTAINER, Vec2::zero()), Vec2::new(-15.0, -15.0));
        assert_eq!(config.offset_for(CONTAINER, Vec2::new(500.0, 250.0)), Vec2::zero());
        assert_eq!(
            config.offset_for(CONTAINER, Vec2::new(5000.0, -20.0)),
            Vec2::new(15.0, -15.0)
        );
    }

    // ── frames ────────────────────────────────────────────────────────────

    #[test]
    fn no_writes_without_pointer_movement() {
        let (_target, scheduler, providers) = setup(Environment::desktop());
        let offsets = Offsets::default();
        let _layer =
            ParallaxLayer::mount(&providers, CONTAINER, ParallaxConfig::default(), offsets.clone()).unwrap();

        for i in 0..10 {
            scheduler.run_frame_at(frame(i));
        }
        assert!(offsets.0.borrow().is_empty());
    }

    #[test]
    fn writes_while_moving_then_goes_quiet() {
        let (target, scheduler, providers) = setup(Environment::desktop());
        let offsets = Offsets::default();
        let _layer =
            ParallaxLayer::mount(&providers, CONTAINER, ParallaxConfig::default(), offsets.clone()).unwrap();

        target.dispatch(&InputEvent::moved(500.0, 250.0));
        scheduler.run_frame_at(frame(0));
        assert_eq!(offsets.0.borrow().as_slice(), &[Vec2::zero()]);

        target.dispatch(&InputEvent::moved(1000.0, 500.0));
        for i in 1..600 {
            scheduler.run_frame_at(frame(i));
        }

        let written = offsets.0.borrow().len();
        assert_eq!(offsets.0.borrow().last().copied(), Some(Vec2::new(15.0, 15.0)));

        scheduler.run_frame_at(frame(600));
        assert_eq!(offsets.0.borrow().len(), written);
    }

    #[test]
    fn resize_remaps_without_pointer_movement() {
        let (target, scheduler, providers) = setup(Environment::desktop().with_reduced_motion(true));
        let offsets = Offsets::default();
        let layer =
            ParallaxLayer::mount(&providers, CONTAINER, ParallaxConfig::default(), offsets.clone()).unwrap();

        target.dispatch(&InputEvent::moved(500.0, 250.0));
        scheduler.run_frame_at(frame(0));
        assert_eq!(offsets.0.borrow().last().copied(), Some(Vec2::zero()));

        layer.set_container(Rect::new(0.0, 0.0, 500.0, 250.0));
        scheduler.run_frame_at(frame(1));

        assert_eq!(layer.container(), Rect::new(0.0, 0.0, 500.0, 250.0));
        assert_eq!(offsets.0.borrow().last().copied(), Some(Vec2::new(15.0, 15.0)));
    }

    #[test]
    fn resize_before_first_move_writes_nothing() {
        let (_target, scheduler, providers) = setup(Environment::desktop());
        let offsets = Offsets::default();
        let layer =
            ParallaxLayer::mount(&providers, CONTAINER, ParallaxConfig::default(), offsets.clone()).unwrap();

        layer.set_container(Rect::new(0.0, 0.0, 500.0, 250.0));
        scheduler.run_frame_at(frame(0));

        assert!(offsets.0.borrow().is_empty());
    }

    #[test]
    fn reduced_motion_jumps_to_target() {
        let (target, scheduler, providers) = setup(Environment::desktop().with_reduced_motion(true));
        let offsets = Offsets::default();
        let _layer =
            ParallaxLayer::mount(&providers, CONTAINER, ParallaxConfig::default(), offsets.clone()).unwrap();

        target.dispatch(&InputEvent::moved(0.0, 0.0));
        scheduler.run_frame_at(frame(0));
        target.dispatch(&InputEvent::moved(1000.0, 0.0));
        scheduler.run_frame_at(frame(1));

        assert_eq!(offsets.0.borrow().last().copied(), Some(Vec2::new(15.0, -15.0)));
    }

    #[test]
    fn unmount_releases_subscription_and_task() {
        let (target, scheduler, providers) = setup(Environment::desktop());
        let hub = providers.pointer().unwrap().clone();
        let offsets = Offsets::default();
        let mut layer =
            ParallaxLayer::mount(&providers, CONTAINER, ParallaxConfig::default(), offsets.clone()).unwrap();
        assert_eq!(hub.subscriber_count(), 1);

        layer.unmount();
        target.dispatch(&InputEvent::moved(10.0, 10.0));
        scheduler.run_frame_at(frame(0));

        assert_eq!(hub.subscriber_count(), 0);
        assert_eq!(scheduler.active_tasks(), 0);
        assert!(offsets.0.borrow().is_empty());
        assert!(!layer.is_mounted());
    }

    #[test]
    fn mount_without_pointer_provider_fails() {
        let providers = Providers::empty().with_scheduler(FrameScheduler::new());
        let result = ParallaxLayer::mount(&providers, CONTAINER, ParallaxConfig::default(), Offsets::default());

        assert_eq!(
            result.err(),
            Some(ContextError::MissingProvider { context: "PointerHub" })
        );
    }
}
