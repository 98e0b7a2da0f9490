use std::fmt;
use std::rc::Rc;

use thiserror::Error;

use crate::event::{HoverEvent, HoverPhase};

use super::mutation::{MutationRecord, ObserverSlot, TreeObserver};

// ── ids ───────────────────────────────────────────────────────────────────

/// Handle to an element of a [`Document`].
///
/// Ids are never reused: a removed element keeps its id (and its subtree)
/// and can be inserted again.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Handle to a hover listener installed with [`Document::add_hover_listener`].
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct HoverListenerId(u64);

/// Hover handler. Receives the document so it can read attributes at
/// dispatch time.
pub type HoverHandler = Rc<dyn Fn(&Document, &HoverEvent)>;

// ── errors ────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TreeError {
    #[error("unknown node {0}")]
    UnknownNode(NodeId),

    #[error("cannot insert {child} into {parent}: the result would not be a tree")]
    Hierarchy { parent: NodeId, child: NodeId },

    #[error("{child} is not a child of {parent}")]
    NotAChild { parent: NodeId, child: NodeId },
}

// ── Document ──────────────────────────────────────────────────────────────

struct HoverListener {
    id: HoverListenerId,
    phase: HoverPhase,
    handler: HoverHandler,
}

struct Element {
    tag: String,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    attributes: Vec<(String, String)>,
    listeners: Vec<HoverListener>,
}

impl Element {
    fn new(tag: String) -> Self {
        Self {
            tag,
            parent: None,
            children: Vec::new(),
            attributes: Vec::new(),
            listeners: Vec::new(),
        }
    }
}

/// In-process element tree.
///
/// The root (`body`) always exists and is the only element connected by
/// definition; every other element is connected while its ancestor chain
/// reaches the root. Structural and attribute mutations are reported to
/// every [`TreeObserver`] whose root contains the mutation target.
pub struct Document {
    nodes: Vec<Element>,
    root: NodeId,
    next_listener: u64,
    observers: Vec<ObserverSlot>,
}

impl Document {
    pub fn new() -> Self {
        Self {
            nodes: vec![Element::new("body".to_string())],
            root: NodeId(0),
            next_listener: 1,
            observers: Vec::new(),
        }
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Creates a detached element.
    pub fn create_element(&mut self, tag: impl Into<String>) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Element::new(tag.into()));
        id
    }

    pub fn tag(&self, node: NodeId) -> Option<&str> {
        self.get(node).map(|el| el.tag.as_str())
    }

    pub fn exists(&self, node: NodeId) -> bool {
        node.0 < self.nodes.len()
    }

    // ── structure ─────────────────────────────────────────────────────────

    /// Appends `child` as the last child of `parent`, moving it out of its
    /// current parent first.
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) -> Result<(), TreeError> {
        self.check(parent)?;
        self.check(child)?;

        if child == self.root || self.contains(child, parent) {
            return Err(TreeError::Hierarchy { parent, child });
        }

        if let Some(old_parent) = self.nodes[child.0].parent {
            self.detach(old_parent, child);
        }

        self.nodes[child.0].parent = Some(parent);
        self.nodes[parent.0].children.push(child);
        self.emit(MutationRecord::ChildList {
            target: parent,
            added: vec![child],
            removed: Vec::new(),
        });
        Ok(())
    }

    pub fn remove_child(&mut self, parent: NodeId, child: NodeId) -> Result<(), TreeError> {
        self.check(parent)?;
        self.check(child)?;

        if self.nodes[child.0].parent != Some(parent) {
            return Err(TreeError::NotAChild { parent, child });
        }
        self.detach(parent, child);
        Ok(())
    }

    /// Removes `node` from its parent. Removing a parentless element is a
    /// no-op.
    pub fn remove(&mut self, node: NodeId) -> Result<(), TreeError> {
        self.check(node)?;
        if let Some(parent) = self.nodes[node.0].parent {
            self.detach(parent, node);
        }
        Ok(())
    }

    fn detach(&mut self, parent: NodeId, child: NodeId) {
        self.nodes[parent.0].children.retain(|&c| c != child);
        self.nodes[child.0].parent = None;
        self.emit(MutationRecord::ChildList {
            target: parent,
            added: Vec::new(),
            removed: vec![child],
        });
    }

    pub fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.get(node).and_then(|el| el.parent)
    }

    pub fn children(&self, node: NodeId) -> &[NodeId] {
        self.get(node).map(|el| el.children.as_slice()).unwrap_or(&[])
    }

    /// Descendants of `node` in pre-order, excluding `node` itself.
    pub fn descendants(&self, node: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack: Vec<NodeId> = self.children(node).iter().rev().copied().collect();

        while let Some(id) = stack.pop() {
            out.push(id);
            stack.extend(self.children(id).iter().rev().copied());
        }
        out
    }

    /// `true` if `node` is `ancestor` or lies below it.
    pub fn contains(&self, ancestor: NodeId, node: NodeId) -> bool {
        let mut cursor = Some(node);
        while let Some(id) = cursor {
            if id == ancestor {
                return true;
            }
            cursor = self.parent(id);
        }
        false
    }

    pub fn is_connected(&self, node: NodeId) -> bool {
        self.contains(self.root, node)
    }

    /// Connected elements bearing attribute `name`, in document order.
    pub fn query_attribute(&self, name: &str) -> Vec<NodeId> {
        std::iter::once(self.root)
            .chain(self.descendants(self.root))
            .filter(|&id| self.has_attribute(id, name))
            .collect()
    }

    // ── attributes ────────────────────────────────────────────────────────

    pub fn set_attribute(
        &mut self,
        node: NodeId,
        name: &str,
        value: impl Into<String>,
    ) -> Result<(), TreeError> {
        self.check(node)?;
        let value = value.into();
        let attributes = &mut self.nodes[node.0].attributes;

        let old_value = match attributes.iter_mut().find(|(n, _)| n == name) {
            Some((_, v)) => Some(std::mem::replace(v, value)),
            None => {
                attributes.push((name.to_string(), value));
                None
            }
        };

        self.emit(MutationRecord::Attribute {
            target: node,
            name: name.to_string(),
            old_value,
        });
        Ok(())
    }

    /// Returns whether the attribute was present.
    pub fn remove_attribute(&mut self, node: NodeId, name: &str) -> Result<bool, TreeError> {
        self.check(node)?;
        let attributes = &mut self.nodes[node.0].attributes;

        let Some(idx) = attributes.iter().position(|(n, _)| n == name) else {
            return Ok(false);
        };
        let (name, old) = attributes.remove(idx);

        self.emit(MutationRecord::Attribute {
            target: node,
            name,
            old_value: Some(old),
        });
        Ok(true)
    }

    pub fn attribute(&self, node: NodeId, name: &str) -> Option<&str> {
        self.get(node)?
            .attributes
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    pub fn has_attribute(&self, node: NodeId, name: &str) -> bool {
        self.attribute(node, name).is_some()
    }

    // ── hover listeners ───────────────────────────────────────────────────

    pub fn add_hover_listener(
        &mut self,
        node: NodeId,
        phase: HoverPhase,
        handler: HoverHandler,
    ) -> Result<HoverListenerId, TreeError> {
        self.check(node)?;
        let id = HoverListenerId(self.next_listener);
        self.next_listener += 1;

        self.nodes[node.0].listeners.push(HoverListener { id, phase, handler });
        Ok(id)
    }

    /// Returns whether a listener was removed.
    pub fn remove_hover_listener(&mut self, node: NodeId, id: HoverListenerId) -> bool {
        let Some(el) = self.nodes.get_mut(node.0) else {
            return false;
        };
        let before = el.listeners.len();
        el.listeners.retain(|l| l.id != id);
        el.listeners.len() != before
    }

    pub fn listener_count(&self, node: NodeId) -> usize {
        self.get(node).map_or(0, |el| el.listeners.len())
    }

    /// Runs the `phase` listeners of `node` and returns how many ran.
    ///
    /// Unknown nodes and nodes without listeners are silently ignored.
    pub fn dispatch_hover(&self, node: NodeId, phase: HoverPhase) -> usize {
        let Some(el) = self.get(node) else {
            return 0;
        };
        let handlers: Vec<HoverHandler> = el
            .listeners
            .iter()
            .filter(|l| l.phase == phase)
            .map(|l| Rc::clone(&l.handler))
            .collect();

        let event = HoverEvent { target: node, phase };
        for handler in &handlers {
            handler(self, &event);
        }
        handlers.len()
    }

    // ── observation ───────────────────────────────────────────────────────

    /// Starts recording mutations whose target lies inside `root`.
    pub fn observe(&mut self, root: NodeId) -> TreeObserver {
        let (observer, slot) = TreeObserver::new(root);
        self.observers.push(slot);
        observer
    }

    fn emit(&mut self, record: MutationRecord) {
        self.observers
            .retain(|slot| slot.queue.upgrade().is_some_and(|q| q.is_connected()));
        if self.observers.is_empty() {
            return;
        }

        let target = record.target();
        let queues: Vec<_> = self
            .observers
            .iter()
            .filter(|slot| self.contains(slot.root, target))
            .filter_map(|slot| slot.queue.upgrade())
            .collect();

        for queue in queues {
            queue.push(record.clone());
        }
    }

    // ── helpers ───────────────────────────────────────────────────────────

    fn get(&self, node: NodeId) -> Option<&Element> {
        self.nodes.get(node.0)
    }

    fn check(&self, node: NodeId) -> Result<(), TreeError> {
        if self.exists(node) {
            Ok(())
        } else {
            Err(TreeError::UnknownNode(node))
        }
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use pretty_assertions::assert_eq;

    use super::*;

    fn card(doc: &mut Document, parent: NodeId) -> NodeId {
        let node = doc.create_element("div");
        doc.append_child(parent, node).unwrap();
        node
    }

    // ── structure ─────────────────────────────────────────────────────────

    #[test]
    fn new_elements_start_detached() {
        let mut doc = Document::new();
        let node = doc.create_element("div");
        assert!(!doc.is_connected(node));
        assert!(doc.is_connected(doc.root()));
        assert_eq!(doc.tag(doc.root()), Some("body"));
    }

    #[test]
    fn append_moves_child_between_parents() {
        let mut doc = Document::new();
        let root = doc.root();
        let a = card(&mut doc, root);
        let b = card(&mut doc, root);
        let c = card(&mut doc, a);

        doc.append_child(b, c).unwrap();

        assert_eq!(doc.children(a), &[] as &[NodeId]);
        assert_eq!(doc.children(b), &[c]);
        assert_eq!(doc.parent(c), Some(b));
    }

    #[test]
    fn descendants_are_pre_order() {
        let mut doc = Document::new();
        let root = doc.root();
        let a = card(&mut doc, root);
        let a1 = card(&mut doc, a);
        let a2 = card(&mut doc, a);
        let b = card(&mut doc, root);

        assert_eq!(doc.descendants(root), vec![a, a1, a2, b]);
        assert_eq!(doc.descendants(a), vec![a1, a2]);
    }

    #[test]
    fn removed_subtree_stays_intact_but_disconnected() {
        let mut doc = Document::new();
        let root = doc.root();
        let a = card(&mut doc, root);
        let inner = card(&mut doc, a);

        doc.remove(a).unwrap();

        assert!(!doc.is_connected(a));
        assert!(!doc.is_connected(inner));
        assert_eq!(doc.descendants(a), vec![inner]);
    }

    #[test]
    fn remove_of_parentless_node_is_noop() {
        let mut doc = Document::new();
        let node = doc.create_element("div");
        assert_eq!(doc.remove(node), Ok(()));
        assert_eq!(doc.remove(doc.root()), Ok(()));
    }

    // ── errors ────────────────────────────────────────────────────────────

    #[test]
    fn cycles_and_root_moves_are_rejected() {
        let mut doc = Document::new();
        let root = doc.root();
        let a = card(&mut doc, root);
        let b = card(&mut doc, a);

        assert_eq!(doc.append_child(b, a), Err(TreeError::Hierarchy { parent: b, child: a }));
        assert_eq!(doc.append_child(a, a), Err(TreeError::Hierarchy { parent: a, child: a }));
        assert_eq!(
            doc.append_child(a, root),
            Err(TreeError::Hierarchy { parent: a, child: root })
        );
    }

    #[test]
    fn remove_child_requires_parentage() {
        let mut doc = Document::new();
        let root = doc.root();
        let a = card(&mut doc, root);
        let b = card(&mut doc, root);

        assert_eq!(doc.remove_child(a, b), Err(TreeError::NotAChild { parent: a, child: b }));
    }

    #[test]
    fn unknown_nodes_are_reported() {
        let mut doc = Document::new();
        let other = {
            let mut bigger = Document::new();
            for _ in 0..4 {
                bigger.create_element("div");
            }
            bigger.create_element("div")
        };

        assert_eq!(doc.remove(other), Err(TreeError::UnknownNode(other)));
        assert_eq!(
            doc.set_attribute(other, "x", "1"),
            Err(TreeError::UnknownNode(other))
        );
        assert_eq!(doc.dispatch_hover(other, HoverPhase::Enter), 0);
        assert_eq!(
            TreeError::UnknownNode(other).to_string(),
            "unknown node #5".to_string()
        );
    }

    // ── attributes ────────────────────────────────────────────────────────

    #[test]
    fn attributes_set_replace_and_remove() {
        let mut doc = Document::new();
        let node = doc.create_element("div");

        doc.set_attribute(node, "data-reactive", "").unwrap();
        doc.set_attribute(node, "data-reactive-label", "VIEW").unwrap();
        doc.set_attribute(node, "data-reactive-label", "OPEN").unwrap();

        assert!(doc.has_attribute(node, "data-reactive"));
        assert_eq!(doc.attribute(node, "data-reactive-label"), Some("OPEN"));
        assert_eq!(doc.remove_attribute(node, "data-reactive"), Ok(true));
        assert_eq!(doc.remove_attribute(node, "data-reactive"), Ok(false));
        assert!(!doc.has_attribute(node, "data-reactive"));
    }

    #[test]
    fn query_only_returns_connected_elements() {
        let mut doc = Document::new();
        let root = doc.root();
        let a = card(&mut doc, root);
        let b = card(&mut doc, a);
        let loose = doc.create_element("div");
        for n in [a, b, loose] {
            doc.set_attribute(n, "data-reactive", "").unwrap();
        }

        assert_eq!(doc.query_attribute("data-reactive"), vec![a, b]);
    }

    // ── records ───────────────────────────────────────────────────────────

    #[test]
    fn observer_records_mutations_in_order() {
        let mut doc = Document::new();
        let root = doc.root();
        let observer = doc.observe(root);

        let a = doc.create_element("div");
        doc.append_child(root, a).unwrap();
        doc.set_attribute(a, "data-reactive", "").unwrap();
        doc.remove(a).unwrap();

        assert_eq!(
            observer.take_records(),
            vec![
                MutationRecord::ChildList { target: root, added: vec![a], removed: vec![] },
                MutationRecord::Attribute {
                    target: a,
                    name: "data-reactive".to_string(),
                    old_value: None,
                },
                MutationRecord::ChildList { target: root, added: vec![], removed: vec![a] },
            ]
        );
        assert_eq!(observer.pending(), 0);
    }

    #[test]
    fn move_reports_removal_then_insertion() {
        let mut doc = Document::new();
        let root = doc.root();
        let a = card(&mut doc, root);
        let b = card(&mut doc, root);
        let c = card(&mut doc, a);
        let observer = doc.observe(root);

        doc.append_child(b, c).unwrap();

        assert_eq!(
            observer.take_records(),
            vec![
                MutationRecord::ChildList { target: a, added: vec![], removed: vec![c] },
                MutationRecord::ChildList { target: b, added: vec![c], removed: vec![] },
            ]
        );
    }

    #[test]
    fn mutations_outside_observed_root_are_not_recorded() {
        let mut doc = Document::new();
        let root = doc.root();
        let observer = doc.observe(root);

        let loose = doc.create_element("div");
        let child = doc.create_element("span");
        doc.append_child(loose, child).unwrap();
        doc.set_attribute(child, "data-reactive", "").unwrap();

        assert_eq!(observer.pending(), 0);
    }

    #[test]
    fn disconnected_or_dropped_observers_stop_receiving() {
        let mut doc = Document::new();
        let root = doc.root();
        let kept = doc.observe(root);
        let disconnected = doc.observe(root);
        let dropped = doc.observe(root);
        drop(dropped);
        disconnected.disconnect();

        card(&mut doc, root);

        assert_eq!(kept.pending(), 1);
        assert_eq!(disconnected.pending(), 0);
        assert!(!disconnected.is_connected());
        assert_eq!(doc.observers.len(), 1);
    }

    // ── hover ─────────────────────────────────────────────────────────────

    #[test]
    fn dispatch_runs_only_matching_phase() {
        let mut doc = Document::new();
        let root = doc.root();
        let node = card(&mut doc, root);
        let entered = Rc::new(Cell::new(0));
        let left = Rc::new(Cell::new(0));

        let e = Rc::clone(&entered);
        doc.add_hover_listener(
            node,
            HoverPhase::Enter,
            Rc::new(move |_: &Document, _: &HoverEvent| e.set(e.get() + 1)),
        )
        .unwrap();
        let l = Rc::clone(&left);
        let leave = doc
            .add_hover_listener(
                node,
                HoverPhase::Leave,
                Rc::new(move |_: &Document, _: &HoverEvent| l.set(l.get() + 1)),
            )
            .unwrap();

        assert_eq!(doc.dispatch_hover(node, HoverPhase::Enter), 1);
        assert_eq!(doc.dispatch_hover(node, HoverPhase::Leave), 1);
        assert!(doc.remove_hover_listener(node, leave));
        assert!(!doc.remove_hover_listener(node, leave));
        assert_eq!(doc.dispatch_hover(node, HoverPhase::Leave), 0);

        assert_eq!((entered.get(), left.get()), (1, 1));
        assert_eq!(doc.listener_count(node), 1);
    }

    #[test]
    fn handlers_read_attributes_at_dispatch_time() {
        let mut doc = Document::new();
        let root = doc.root();
        let node = card(&mut doc, root);
        let seen = Rc::new(std::cell::RefCell::new(None));

        let s = Rc::clone(&seen);
        doc.add_hover_listener(
            node,
            HoverPhase::Enter,
            Rc::new(move |doc: &Document, ev: &HoverEvent| {
                *s.borrow_mut() = doc.attribute(ev.target, "label").map(String::from);
            }),
        )
        .unwrap();

        doc.set_attribute(node, "label", "late").unwrap();
        doc.dispatch_hover(node, HoverPhase::Enter);

        assert_eq!(seen.borrow().as_deref(), Some("late"));
    }
}
