use std::cell::{Cell, RefCell};

use crate::event::HoverSink;
use crate::tree::NodeId;

/// Visual mode of the custom cursor.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum CursorVariant {
    #[default]
    Default,
    /// Over a reactive element without a label.
    Hover,
    /// Over a reactive element carrying a label.
    Text(String),
}

/// Shared cursor hover state, fed by the magnetic registry.
///
/// A leave only resets the variant when it comes from the element that is
/// currently hovered, so a late leave from a previous element cannot clear
/// the state set by the next one.
#[derive(Debug, Default)]
pub struct CursorState {
    hovered: Cell<Option<NodeId>>,
    variant: RefCell<CursorVariant>,
}

impl CursorState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn variant(&self) -> CursorVariant {
        self.variant.borrow().clone()
    }

    pub fn hovered(&self) -> Option<NodeId> {
        self.hovered.get()
    }

    pub fn is_hovering(&self) -> bool {
        self.hovered.get().is_some()
    }

    pub fn reset(&self) {
        self.hovered.set(None);
        *self.variant.borrow_mut() = CursorVariant::Default;
    }
}

impl HoverSink for CursorState {
    fn hover_enter(&self, target: NodeId, label: Option<&str>) {
        let variant = match label.map(str::trim) {
            Some(text) if !text.is_empty() => CursorVariant::Text(text.to_string()),
            _ => CursorVariant::Hover,
        };
        log::trace!("cursor enter {target}: {variant:?}");

        self.hovered.set(Some(target));
        *self.variant.borrow_mut() = variant;
    }

    fn hover_leave(&self, target: NodeId) {
        if self.hovered.get() == Some(target) {
            log::trace!("cursor leave {target}");
            self.reset();
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::tree::Document;

    fn two_nodes() -> (NodeId, NodeId) {
        let mut doc = Document::new();
        (doc.create_element("a"), doc.create_element("b"))
    }

    #[test]
    fn label_selects_text_variant() {
        let (a, b) = two_nodes();
        let cursor = CursorState::new();

        cursor.hover_enter(a, Some("VIEW"));
        assert_eq!(cursor.variant(), CursorVariant::Text("VIEW".to_string()));

        cursor.hover_enter(b, Some("  "));
        assert_eq!(cursor.variant(), CursorVariant::Hover);
        assert_eq!(cursor.hovered(), Some(b));
    }

    #[test]
    fn stale_leave_keeps_current_hover() {
        let (a, b) = two_nodes();
        let cursor = CursorState::new();

        cursor.hover_enter(a, None);
        cursor.hover_enter(b, Some("OPEN"));
        cursor.hover_leave(a);

        assert_eq!(cursor.variant(), CursorVariant::Text("OPEN".to_string()));

        cursor.hover_leave(b);
        assert_eq!(cursor.variant(), CursorVariant::Default);
        assert!(!cursor.is_hovering());
    }
}
