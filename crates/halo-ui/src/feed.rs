//! Change feeds: where the registry learns about tree mutations.
//!
//! A feed batches structural and attribute changes until the registry drains
//! it on its observation tick. [`DocumentFeed`] reads a [`Document`]'s
//! mutation records; [`ManualFeed`] is filled by hand.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use crate::tree::{Document, MutationRecord, NodeId, TreeObserver};

/// A change the registry must reconcile.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TreeChange {
    /// `node` (and its subtree) was inserted somewhere.
    Inserted(NodeId),
    /// `node` (and its subtree) was removed from its parent.
    Removed(NodeId),
    /// Attribute `name` of `node` was set or removed.
    AttributeChanged { node: NodeId, name: String },
}

/// Source of batched tree changes.
pub trait ChangeFeed {
    /// Returns every change since the previous drain, oldest first.
    fn drain(&mut self) -> Vec<TreeChange>;

    /// Stops observation. Later drains return nothing.
    fn disconnect(&mut self);
}

// ── DocumentFeed ──────────────────────────────────────────────────────────

/// Feed backed by a [`TreeObserver`].
pub struct DocumentFeed {
    observer: Option<TreeObserver>,
}

impl DocumentFeed {
    pub fn new(observer: TreeObserver) -> Self {
        Self {
            observer: Some(observer),
        }
    }

    /// Observes the whole document.
    pub fn observe(doc: &mut Document) -> Self {
        let root = doc.root();
        Self::new(doc.observe(root))
    }
}

impl ChangeFeed for DocumentFeed {
    fn drain(&mut self) -> Vec<TreeChange> {
        let Some(observer) = &self.observer else {
            return Vec::new();
        };

        let mut changes = Vec::new();
        for record in observer.take_records() {
            match record {
                MutationRecord::ChildList { added, removed, .. } => {
                    changes.extend(removed.into_iter().map(TreeChange::Removed));
                    changes.extend(added.into_iter().map(TreeChange::Inserted));
                }
                MutationRecord::Attribute { target, name, .. } => {
                    changes.push(TreeChange::AttributeChanged { node: target, name });
                }
            }
        }
        changes
    }

    fn disconnect(&mut self) {
        if let Some(observer) = self.observer.take() {
            observer.disconnect();
        }
    }
}

// ── ManualFeed ────────────────────────────────────────────────────────────

struct ManualQueue {
    changes: RefCell<Vec<TreeChange>>,
    connected: Cell<bool>,
}

/// Feed whose changes are pushed through a [`ManualFeedHandle`].
pub struct ManualFeed {
    queue: Rc<ManualQueue>,
}

impl ManualFeed {
    pub fn new() -> Self {
        Self {
            queue: Rc::new(ManualQueue {
                changes: RefCell::new(Vec::new()),
                connected: Cell::new(true),
            }),
        }
    }

    pub fn handle(&self) -> ManualFeedHandle {
        ManualFeedHandle {
            queue: Rc::clone(&self.queue),
        }
    }
}

impl Default for ManualFeed {
    fn default() -> Self {
        Self::new()
    }
}

impl ChangeFeed for ManualFeed {
    fn drain(&mut self) -> Vec<TreeChange> {
        std::mem::take(&mut *self.queue.changes.borrow_mut())
    }

    fn disconnect(&mut self) {
        self.queue.connected.set(false);
        self.queue.changes.borrow_mut().clear();
    }
}

/// Pushes changes into a [`ManualFeed`]. Pushes after disconnect are
/// dropped.
#[derive(Clone)]
pub struct ManualFeedHandle {
    queue: Rc<ManualQueue>,
}

impl ManualFeedHandle {
    pub fn push(&self, change: TreeChange) {
        if self.queue.connected.get() {
            self.queue.changes.borrow_mut().push(change);
        } else {
            log::trace!("manual feed disconnected; dropping {change:?}");
        }
    }

    pub fn inserted(&self, node: NodeId) {
        self.push(TreeChange::Inserted(node));
    }

    pub fn removed(&self, node: NodeId) {
        self.push(TreeChange::Removed(node));
    }

    pub fn attribute_changed(&self, node: NodeId, name: &str) {
        self.push(TreeChange::AttributeChanged {
            node,
            name: name.to_string(),
        });
    }

    pub fn is_connected(&self) -> bool {
        self.queue.connected.get()
    }

    pub fn pending(&self) -> usize {
        self.queue.changes.borrow().len()
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn document_feed_flattens_records() {
        let mut doc = Document::new();
        let root = doc.root();
        let mut feed = DocumentFeed::observe(&mut doc);

        let a = doc.create_element("div");
        let b = doc.create_element("div");
        doc.append_child(root, a).unwrap();
        doc.append_child(root, b).unwrap();
        doc.append_child(a, b).unwrap();
        doc.set_attribute(a, "data-reactive", "").unwrap();

        assert_eq!(
            feed.drain(),
            vec![
                TreeChange::Inserted(a),
                TreeChange::Inserted(b),
                TreeChange::Removed(b),
                TreeChange::Inserted(b),
                TreeChange::AttributeChanged { node: a, name: "data-reactive".to_string() },
            ]
        );
        assert_eq!(feed.drain(), vec![]);
    }

    #[test]
    fn document_feed_is_silent_after_disconnect() {
        let mut doc = Document::new();
        let root = doc.root();
        let mut feed = DocumentFeed::observe(&mut doc);
        feed.disconnect();

        let a = doc.create_element("div");
        doc.append_child(root, a).unwrap();

        assert_eq!(feed.drain(), vec![]);
        feed.disconnect();
    }

    #[test]
    fn manual_feed_collects_until_disconnected() {
        let mut feed = ManualFeed::new();
        let handle = feed.handle();
        let node = Document::new().root();

        handle.inserted(node);
        handle.attribute_changed(node, "data-reactive");
        assert_eq!(handle.pending(), 2);
        assert_eq!(feed.drain().len(), 2);

        feed.disconnect();
        handle.removed(node);
        assert!(!handle.is_connected());
        assert_eq!(feed.drain(), vec![]);
    }
}
