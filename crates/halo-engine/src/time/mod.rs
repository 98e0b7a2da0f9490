//! Time subsystem.
//!
//! Provides the frame domain: a clamped `FrameClock` and the `FrameScheduler`
//! that runs every consumer's per-frame task once per presented frame.
//! Intended usage:
//! - one `FrameScheduler` per window, driven by the host's redraw signal
//! - consumers call `request_frames` on mount and drop the `FrameTask` on teardown

mod frame_clock;
mod scheduler;

pub use frame_clock::{FrameClock, FrameTime};
pub use scheduler::{FrameScheduler, FrameTask, FrameTaskId};
