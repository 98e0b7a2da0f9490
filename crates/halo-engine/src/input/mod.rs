//! Input subsystem.
//!
//! Public API is platform-agnostic and does not expose winit types.
//! Hosts translate platform events into `InputEvent`s and dispatch them on a
//! `PointerTarget`; the `PointerHub` is the single listener on that target and
//! republishes the latest position to every consumer.

mod environment;
mod hub;
mod sample;
mod state;
mod target;
mod types;

pub use environment::{Environment, PointerCapability};
pub use hub::{Initialization, PointerCallback, PointerHub, SubscriberId, Subscription};
pub use sample::PointerSample;
pub use state::InputState;
pub use target::{EventTarget, ListenerId, PointerTarget, RawListener};
pub use types::{
    InputEvent,
    Modifiers,
    MouseButton,
    MouseButtonState,
    PointerButtonEvent,
    PointerMoveEvent,
};
