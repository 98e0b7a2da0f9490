//! Halo engine crate.
//!
//! This crate owns the platform-facing pieces used by higher layers: the
//! pointer broadcast hub, frame timing and scheduling, and the winit host.

pub mod coords;
pub mod core;
pub mod input;
pub mod logging;
pub mod time;
pub mod window;
