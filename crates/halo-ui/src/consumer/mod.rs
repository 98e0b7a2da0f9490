//! Per-consumer animation readers.
//!
//! Each consumer owns a frame task on the shared [`FrameScheduler`], reads
//! the hub's latest sample at most once per frame, smooths it on its own
//! terms, and writes once to its surface. Dropping or unmounting a consumer
//! cancels its task.
//!
//! [`FrameScheduler`]: halo_engine::time::FrameScheduler

mod cursor;
mod parallax;
mod smoothing;

pub use cursor::{CursorConfig, CursorFrame, CursorRenderer, CursorSurface};
pub use parallax::{LayerSurface, ParallaxConfig, ParallaxLayer};
pub use smoothing::{Follower, Smoothing, SNAP_DISTANCE};
