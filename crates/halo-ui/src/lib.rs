//! Halo UI: reactive targets and pointer consumers on top of `halo-engine`.
//!
//! # Quick start
//!
//! ```rust,ignore
//! use halo_ui::prelude::*;
//!
//! // Services, usually built in `App::on_start`.
//! let hub = PointerHub::new(host.pointer_target(), host.environment());
//! hub.initialize();
//! let cursor = Rc::new(CursorState::new());
//! let providers = Providers::empty()
//!     .with_pointer(hub)
//!     .with_cursor(cursor.clone())
//!     .with_scheduler(host.scheduler().clone());
//!
//! // Reactive elements.
//! let mut doc = Document::new();
//! let mut registry = MagneticRegistry::new(cursor.clone());
//! registry.start_observing(&mut doc);
//!
//! // Consumers.
//! let renderer = CursorRenderer::mount(&providers, CursorConfig::default(), my_surface)?;
//!
//! // Every frame: reconcile whatever changed in the tree.
//! registry.flush(&mut doc);
//! ```

pub mod consumer;
pub mod context;
pub mod cursor;
pub mod event;
pub mod feed;
pub mod registry;
pub mod tree;

/// Everything an app wiring pointer effects needs.
pub mod prelude {
    pub use std::rc::Rc;

    pub use crate::consumer::{
        CursorConfig, CursorFrame, CursorRenderer, CursorSurface, Follower, LayerSurface,
        ParallaxConfig, ParallaxLayer, Smoothing,
    };
    pub use crate::context::{Context, ContextError, Providers};
    pub use crate::cursor::{CursorState, CursorVariant};
    pub use crate::event::{HoverEvent, HoverPhase, HoverSink};
    pub use crate::feed::{ChangeFeed, DocumentFeed, ManualFeed, ManualFeedHandle, TreeChange};
    pub use crate::registry::{FlushStats, MagneticRegistry, MarkerSpec, ReactiveOptions};
    pub use crate::tree::{Document, MutationRecord, NodeId, TreeError, TreeObserver};

    // Engine primitives consumers touch directly.
    pub use halo_engine::coords::{Rect, Vec2};
    pub use halo_engine::input::{Environment, PointerHub, PointerSample, Subscription};
    pub use halo_engine::time::{FrameScheduler, FrameTask, FrameTime};
}
