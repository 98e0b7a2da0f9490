use crate::tree::NodeId;

/// Which edge of a hover a listener reacts to.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum HoverPhase {
    Enter,
    Leave,
}

/// Hover notification delivered to element listeners.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct HoverEvent {
    pub target: NodeId,
    pub phase: HoverPhase,
}

/// Receiver of hover transitions on reactive elements.
///
/// Implemented by [`CursorState`](crate::cursor::CursorState); the registry
/// forwards every enter/leave of a tracked element here.
pub trait HoverSink {
    /// The pointer entered `target`. `label` is the element's label
    /// attribute at the time of the event.
    fn hover_enter(&self, target: NodeId, label: Option<&str>);

    /// The pointer left `target`, or `target` stopped being reactive while
    /// hovered.
    fn hover_leave(&self, target: NodeId);
}
