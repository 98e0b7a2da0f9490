//! Element tree with mutation observation.
//!
//! A [`Document`] is an arena of elements below a permanent `body` root.
//! Elements carry string attributes and hover listeners; structural and
//! attribute mutations are reported to [`TreeObserver`]s as
//! [`MutationRecord`]s, drained by the caller when it chooses.

mod document;
mod mutation;

pub use document::{Document, HoverHandler, HoverListenerId, NodeId, TreeError};
pub use mutation::{MutationRecord, TreeObserver};
