use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

use super::frame_clock::{FrameClock, FrameTime};

/// Identifier of a scheduled frame task.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct FrameTaskId(u64);

struct TaskSlot {
    id: FrameTaskId,
    callback: RefCell<Box<dyn FnMut(FrameTime)>>,
    live: Cell<bool>,
}

struct SchedulerShared {
    tasks: RefCell<Vec<Rc<TaskSlot>>>,
    next_id: Cell<u64>,
    clock: RefCell<FrameClock>,
}

impl SchedulerShared {
    fn cancel(&self, id: FrameTaskId) {
        // Dropping the slot may cancel tasks its callback owns.
        let removed = {
            let mut tasks = self.tasks.borrow_mut();
            tasks.iter().position(|t| t.id == id).map(|idx| tasks.remove(idx))
        };
        if let Some(slot) = removed {
            slot.live.set(false);
        }
    }
}

/// Repeating per-frame tasks bound to the display refresh signal.
///
/// The host calls [`run_frame`] once per presented frame; every live task
/// runs exactly once per call, whatever the number of input events that
/// arrived since the previous frame. Handles are cheap clones.
///
/// [`run_frame`]: FrameScheduler::run_frame
#[derive(Clone)]
pub struct FrameScheduler {
    shared: Rc<SchedulerShared>,
}

impl FrameScheduler {
    pub fn new() -> Self {
        Self::with_clock(FrameClock::new())
    }

    pub fn with_clock(clock: FrameClock) -> Self {
        Self {
            shared: Rc::new(SchedulerShared {
                tasks: RefCell::new(Vec::new()),
                next_id: Cell::new(1),
                clock: RefCell::new(clock),
            }),
        }
    }

    /// Schedules `callback` to run on every frame until the returned
    /// [`FrameTask`] is cancelled or dropped.
    pub fn request_frames(&self, callback: impl FnMut(FrameTime) + 'static) -> FrameTask {
        let id = FrameTaskId(self.shared.next_id.get());
        self.shared.next_id.set(id.0 + 1);

        self.shared.tasks.borrow_mut().push(Rc::new(TaskSlot {
            id,
            callback: RefCell::new(Box::new(callback)),
            live: Cell::new(true),
        }));

        FrameTask {
            scheduler: Rc::downgrade(&self.shared),
            id,
        }
    }

    /// Ticks the internal clock and runs one frame.
    pub fn run_frame(&self) -> FrameTime {
        let time = self.shared.clock.borrow_mut().tick();
        self.run_frame_at(time);
        time
    }

    /// Runs one frame with an explicit timestamp; returns the number of
    /// tasks that ran.
    ///
    /// Tasks scheduled during the frame first run on the next one. Tasks
    /// cancelled during the frame do not run, even if they come later in
    /// the current pass.
    pub fn run_frame_at(&self, time: FrameTime) -> usize {
        let snapshot: Vec<Rc<TaskSlot>> = self.shared.tasks.borrow().clone();
        let mut ran = 0;

        for task in &snapshot {
            if !task.live.get() {
                continue;
            }
            match task.callback.try_borrow_mut() {
                Ok(mut callback) => {
                    callback(time);
                    ran += 1;
                }
                Err(_) => log::trace!("frame task {:?} is already running; skipped", task.id),
            }
        }
        ran
    }

    /// Resets the clock baseline so the next frame does not report the
    /// time spent suspended.
    pub fn reset_clock(&self) {
        self.shared.clock.borrow_mut().reset();
    }

    pub fn active_tasks(&self) -> usize {
        self.shared.tasks.borrow().len()
    }
}

impl Default for FrameScheduler {
    fn default() -> Self {
        Self::new()
    }
}

/// Handle for a task scheduled with [`FrameScheduler::request_frames`].
///
/// Cancelling (or dropping) takes effect immediately: once it returns the
/// callback never runs again.
#[must_use = "dropping a FrameTask cancels it immediately"]
pub struct FrameTask {
    scheduler: Weak<SchedulerShared>,
    id: FrameTaskId,
}

impl FrameTask {
    pub fn id(&self) -> FrameTaskId {
        self.id
    }

    pub fn cancel(self) {}
}

impl Drop for FrameTask {
    fn drop(&mut self) {
        if let Some(scheduler) = self.scheduler.upgrade() {
            scheduler.cancel(self.id);
        }
    }
}
