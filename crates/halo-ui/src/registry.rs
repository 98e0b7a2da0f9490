//! Magnetic target registry.
//!
//! Keeps hover listeners attached to exactly the connected elements that
//! bear the marker attribute, while the tree changes underneath it.
//!
//! # How reconciliation works
//!
//! 1. [`MagneticRegistry::start`] scans the tree once and attaches every
//!    marked, connected element.
//! 2. Mutations accumulate in a [`ChangeFeed`].
//! 3. [`MagneticRegistry::flush`] drains the feed in order. Each change names
//!    the nodes to re-check (an inserted or removed node plus its subtree, or
//!    one node whose marker changed); every check reads the live tree, so a
//!    batch that adds and removes the same node nets out to "not tracked".
//! 4. [`MagneticRegistry::stop`] disconnects the feed and detaches
//!    everything.

use std::cell::Cell;
use std::collections::BTreeMap;
use std::rc::Rc;

use crate::event::{HoverEvent, HoverPhase, HoverSink};
use crate::feed::{ChangeFeed, DocumentFeed, TreeChange};
use crate::tree::{Document, HoverListenerId, NodeId, TreeError};

// ── configuration ─────────────────────────────────────────────────────────

/// Attribute names that opt an element in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarkerSpec {
    /// Boolean marker; presence means "reactive".
    pub attribute: String,
    /// Optional text shown by the cursor while hovering.
    pub label_attribute: String,
}

impl Default for MarkerSpec {
    fn default() -> Self {
        Self {
            attribute: "data-reactive".to_string(),
            label_attribute: "data-reactive-label".to_string(),
        }
    }
}

/// Options for [`MagneticRegistry::register_reactive_element`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReactiveOptions {
    pub label: Option<String>,
}

impl ReactiveOptions {
    pub fn labelled(label: impl Into<String>) -> Self {
        Self {
            label: Some(label.into()),
        }
    }
}

/// What one [`MagneticRegistry::flush`] did.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub struct FlushStats {
    /// Changes drained from the feed.
    pub records: usize,
    pub attached: usize,
    pub detached: usize,
}

// ── registry ──────────────────────────────────────────────────────────────

struct Attachment {
    enter: HoverListenerId,
    leave: HoverListenerId,
    active: Rc<Cell<bool>>,
}

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
enum Reconciled {
    Attached,
    Detached,
    Unchanged,
}

impl FlushStats {
    fn tally(&mut self, outcome: Reconciled) {
        match outcome {
            Reconciled::Attached => self.attached += 1,
            Reconciled::Detached => self.detached += 1,
            Reconciled::Unchanged => {}
        }
    }
}

pub struct MagneticRegistry {
    marker: MarkerSpec,
    sink: Rc<dyn HoverSink>,
    tracked: BTreeMap<NodeId, Attachment>,
    feed: Option<Box<dyn ChangeFeed>>,
}

impl MagneticRegistry {
    pub fn new(sink: Rc<dyn HoverSink>) -> Self {
        Self::with_marker(sink, MarkerSpec::default())
    }

    pub fn with_marker(sink: Rc<dyn HoverSink>, marker: MarkerSpec) -> Self {
        Self {
            marker,
            sink,
            tracked: BTreeMap::new(),
            feed: None,
        }
    }

    pub fn marker(&self) -> &MarkerSpec {
        &self.marker
    }

    // ── lifecycle ─────────────────────────────────────────────────────────

    /// Scans `doc` and begins observing `feed`. Returns how many elements
    /// the scan attached.
    ///
    /// Starting again replaces (and disconnects) the previous feed; elements
    /// already tracked stay attached.
    pub fn start(&mut self, doc: &mut Document, feed: Box<dyn ChangeFeed>) -> usize {
        if let Some(mut old) = self.feed.replace(feed) {
            log::debug!("magnetic registry restarted; previous feed disconnected");
            old.disconnect();
        }

        let attached = doc
            .query_attribute(&self.marker.attribute)
            .into_iter()
            .filter(|&node| self.sync(doc, node) == Reconciled::Attached)
            .count();

        log::debug!(
            "magnetic registry started: {attached} element(s) bearing `{}`",
            self.marker.attribute
        );
        attached
    }

    /// [`start`](Self::start) with a feed observing the whole document.
    pub fn start_observing(&mut self, doc: &mut Document) -> usize {
        let feed = DocumentFeed::observe(doc);
        self.start(doc, Box::new(feed))
    }

    /// Drains the feed and reconciles. A no-op before `start` and after
    /// `stop`.
    pub fn flush(&mut self, doc: &mut Document) -> FlushStats {
        let Some(feed) = self.feed.as_mut() else {
            return FlushStats::default();
        };
        let changes = feed.drain();

        let mut stats = FlushStats {
            records: changes.len(),
            ..FlushStats::default()
        };
        let mut saw_removal = false;

        for change in &changes {
            match change {
                TreeChange::Inserted(node) => self.sync_subtree(doc, *node, &mut stats),
                TreeChange::Removed(node) => {
                    saw_removal = true;
                    self.sync_subtree(doc, *node, &mut stats);
                }
                TreeChange::AttributeChanged { node, name } => {
                    if *name == self.marker.attribute {
                        stats.tally(self.sync(doc, *node));
                    }
                }
            }
        }

        // A node can leave the tree without a record of its own, e.g. when
        // it is moved out of a subtree that was already detached.
        if saw_removal {
            let stale: Vec<NodeId> = self
                .tracked
                .keys()
                .copied()
                .filter(|&node| !doc.is_connected(node))
                .collect();
            for node in stale {
                stats.tally(self.sync(doc, node));
            }
        }

        if stats.attached + stats.detached > 0 {
            log::trace!(
                "registry flush: {} change(s), +{} -{}",
                stats.records,
                stats.attached,
                stats.detached
            );
        }
        stats
    }

    /// Disconnects the feed and detaches every tracked element.
    pub fn stop(&mut self, doc: &mut Document) {
        if let Some(mut feed) = self.feed.take() {
            feed.disconnect();
        }

        let nodes: Vec<NodeId> = self.tracked.keys().copied().collect();
        for node in &nodes {
            self.detach(doc, *node);
        }

        if !nodes.is_empty() {
            log::debug!("magnetic registry stopped; {} element(s) detached", nodes.len());
        }
    }

    pub fn is_started(&self) -> bool {
        self.feed.is_some()
    }

    // ── typed registration ────────────────────────────────────────────────

    /// Marks `node` reactive and, when the registry is running, attaches it
    /// right away. Returns whether this call attached it.
    pub fn register_reactive_element(
        &mut self,
        doc: &mut Document,
        node: NodeId,
        options: ReactiveOptions,
    ) -> Result<bool, TreeError> {
        doc.set_attribute(node, &self.marker.attribute, "")?;
        if let Some(label) = options.label {
            doc.set_attribute(node, &self.marker.label_attribute, label)?;
        }

        Ok(self.is_started() && self.sync(doc, node) == Reconciled::Attached)
    }

    /// Removes the marker and label from `node` and detaches it. Returns
    /// whether it was tracked.
    pub fn unregister_reactive_element(
        &mut self,
        doc: &mut Document,
        node: NodeId,
    ) -> Result<bool, TreeError> {
        doc.remove_attribute(node, &self.marker.attribute)?;
        doc.remove_attribute(node, &self.marker.label_attribute)?;

        Ok(self.sync(doc, node) == Reconciled::Detached)
    }

    // ── queries ───────────────────────────────────────────────────────────

    pub fn is_tracked(&self, node: NodeId) -> bool {
        self.tracked.contains_key(&node)
    }

    /// `true` while the pointer is inside tracked element `node`.
    pub fn is_active(&self, node: NodeId) -> bool {
        self.tracked.get(&node).is_some_and(|a| a.active.get())
    }

    pub fn tracked_count(&self) -> usize {
        self.tracked.len()
    }

    /// Tracked elements in id order.
    pub fn tracked(&self) -> Vec<NodeId> {
        self.tracked.keys().copied().collect()
    }

    // ── reconciliation ────────────────────────────────────────────────────

    fn sync_subtree(&mut self, doc: &mut Document, node: NodeId, stats: &mut FlushStats) {
        stats.tally(self.sync(doc, node));
        for child in doc.descendants(node) {
            stats.tally(self.sync(doc, child));
        }
    }

    fn sync(&mut self, doc: &mut Document, node: NodeId) -> Reconciled {
        let wanted = doc.is_connected(node) && doc.has_attribute(node, &self.marker.attribute);

        match (wanted, self.is_tracked(node)) {
            (true, false) => match self.attach(doc, node) {
                Ok(()) => Reconciled::Attached,
                Err(e) => {
                    log::warn!("failed to attach reactive element: {e}");
                    Reconciled::Unchanged
                }
            },
            (false, true) => {
                self.detach(doc, node);
                Reconciled::Detached
            }
            _ => Reconciled::Unchanged,
        }
    }

    fn attach(&mut self, doc: &mut Document, node: NodeId) -> Result<(), TreeError> {
        let active = Rc::new(Cell::new(false));

        let enter = {
            let active = Rc::clone(&active);
            let sink = Rc::clone(&self.sink);
            let label_attribute = self.marker.label_attribute.clone();
            doc.add_hover_listener(
                node,
                HoverPhase::Enter,
                Rc::new(move |doc: &Document, ev: &HoverEvent| {
                    active.set(true);
                    sink.hover_enter(ev.target, doc.attribute(ev.target, &label_attribute));
                }),
            )?
        };

        let leave = {
            let active = Rc::clone(&active);
            let sink = Rc::clone(&self.sink);
            let installed = doc.add_hover_listener(
                node,
                HoverPhase::Leave,
                Rc::new(move |_: &Document, ev: &HoverEvent| {
                    active.set(false);
                    sink.hover_leave(ev.target);
                }),
            );
            match installed {
                Ok(id) => id,
                Err(e) => {
                    doc.remove_hover_listener(node, enter);
                    return Err(e);
                }
            }
        };

        log::trace!("reactive element {node} attached");
        self.tracked.insert(node, Attachment { enter, leave, active });
        Ok(())
    }

    fn detach(&mut self, doc: &mut Document, node: NodeId) {
        let Some(attachment) = self.tracked.remove(&node) else {
            return;
        };
        doc.remove_hover_listener(node, attachment.enter);
        doc.remove_hover_listener(node, attachment.leave);

        if attachment.active.replace(false) {
            self.sink.hover_leave(node);
        }
        log::trace!("reactive element {node} detached");
    }
}
