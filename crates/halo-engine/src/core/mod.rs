//! Core engine-facing contracts.
//!
//! This module defines the interface between the runtime (platform loop)
//! and higher layers (UI, studio). The runtime hands the application a
//! `Host` holding the pointer target, the frame scheduler and the
//! environment signals; nothing platform-specific leaks through it.

mod app;
mod host;

pub use app::{App, AppControl};
pub use host::Host;
