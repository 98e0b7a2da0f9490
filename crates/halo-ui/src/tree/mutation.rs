use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

use super::document::NodeId;

/// One observed change to the tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MutationRecord {
    /// Children of `target` were inserted and/or removed.
    ChildList {
        target: NodeId,
        added: Vec<NodeId>,
        removed: Vec<NodeId>,
    },
    /// An attribute of `target` was set or removed.
    Attribute {
        target: NodeId,
        name: String,
        old_value: Option<String>,
    },
}

impl MutationRecord {
    pub fn target(&self) -> NodeId {
        match self {
            MutationRecord::ChildList { target, .. } | MutationRecord::Attribute { target, .. } => *target,
        }
    }
}

pub(crate) struct RecordQueue {
    records: RefCell<Vec<MutationRecord>>,
    connected: Cell<bool>,
}

impl RecordQueue {
    pub(crate) fn is_connected(&self) -> bool {
        self.connected.get()
    }

    pub(crate) fn push(&self, record: MutationRecord) {
        if self.connected.get() {
            self.records.borrow_mut().push(record);
        }
    }
}

/// Registration made by the document for one observer.
pub(crate) struct ObserverSlot {
    pub(crate) root: NodeId,
    pub(crate) queue: Weak<RecordQueue>,
}

/// Receives the mutation records of one subtree.
///
/// Records accumulate until [`take_records`](Self::take_records) drains them.
/// Dropping the observer or calling [`disconnect`](Self::disconnect) stops
/// delivery.
pub struct TreeObserver {
    root: NodeId,
    queue: Rc<RecordQueue>,
}

impl TreeObserver {
    pub(crate) fn new(root: NodeId) -> (Self, ObserverSlot) {
        let queue = Rc::new(RecordQueue {
            records: RefCell::new(Vec::new()),
            connected: Cell::new(true),
        });
        let slot = ObserverSlot {
            root,
            queue: Rc::downgrade(&queue),
        };
        (Self { root, queue }, slot)
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Returns the pending records in the order the mutations happened.
    pub fn take_records(&self) -> Vec<MutationRecord> {
        std::mem::take(&mut *self.queue.records.borrow_mut())
    }

    pub fn pending(&self) -> usize {
        self.queue.records.borrow().len()
    }

    /// Stops delivery and discards pending records.
    pub fn disconnect(&self) {
        self.queue.connected.set(false);
        self.queue.records.borrow_mut().clear();
    }

    pub fn is_connected(&self) -> bool {
        self.queue.is_connected()
    }
}
