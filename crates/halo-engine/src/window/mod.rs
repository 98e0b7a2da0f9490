//! Window + runtime loop.
//!
//! Owns the `winit` EventLoop and Window and wires them to the `Host`:
//! pointer events go to the host's event target, redraws drive its frame
//! scheduler.

mod runtime;
mod translate;

pub use runtime::{Runtime, RuntimeConfig};
