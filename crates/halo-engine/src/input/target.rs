use std::cell::{Cell, RefCell};
use std::rc::Rc;

use super::types::InputEvent;

/// Callback installed on a [`PointerTarget`].
pub type RawListener = Rc<dyn Fn(&InputEvent)>;

/// Identifier returned by [`PointerTarget::add_listener`].
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct ListenerId(u64);

/// The global event target raw pointer listeners attach to.
///
/// The host owns the concrete target (see [`EventTarget`]); the hub only sees
/// this trait, so tests can count listeners or substitute their own target.
pub trait PointerTarget {
    fn add_listener(&self, listener: RawListener) -> ListenerId;

    /// Returns `false` when `id` was not installed.
    fn remove_listener(&self, id: ListenerId) -> bool;

    fn listener_count(&self) -> usize;
}

/// In-process event target.
///
/// `dispatch` delivers to a snapshot of the listener list, so listeners may
/// install or remove listeners (including themselves) while being called.
#[derive(Default)]
pub struct EventTarget {
    listeners: RefCell<Vec<(ListenerId, RawListener)>>,
    next_id: Cell<u64>,
}

impl EventTarget {
    pub fn new() -> Self {
        Self::default()
    }

    /// Delivers `ev` to every installed listener in installation order.
    ///
    /// Returns the number of listeners called.
    pub fn dispatch(&self, ev: &InputEvent) -> usize {
        let snapshot: Vec<RawListener> = self
            .listeners
            .borrow()
            .iter()
            .map(|(_, l)| Rc::clone(l))
            .collect();

        for listener in &snapshot {
            listener(ev);
        }
        snapshot.len()
    }
}

impl PointerTarget for EventTarget {
    fn add_listener(&self, listener: RawListener) -> ListenerId {
        let id = ListenerId(self.next_id.get());
        self.next_id.set(self.next_id.get() + 1);
        self.listeners.borrow_mut().push((id, listener));
        id
    }

    fn remove_listener(&self, id: ListenerId) -> bool {
        let mut listeners = self.listeners.borrow_mut();
        let before = listeners.len();
        listeners.retain(|(lid, _)| *lid != id);
        listeners.len() != before
    }

    fn listener_count(&self) -> usize {
        self.listeners.borrow().len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dispatch_reaches_listeners_in_order() {
        let target = EventTarget::new();
        let log = Rc::new(RefCell::new(Vec::new()));

        for tag in ["a", "b"] {
            let log = Rc::clone(&log);
            target.add_listener(Rc::new(move |_: &InputEvent| log.borrow_mut().push(tag)));
        }

        assert_eq!(target.dispatch(&InputEvent::PointerLeft), 2);
        assert_eq!(*log.borrow(), vec!["a", "b"]);
    }

    #[test]
    fn remove_listener_reports_presence() {
        let target = EventTarget::new();
        let id = target.add_listener(Rc::new(|_: &InputEvent| {}));
        assert!(target.remove_listener(id));
        assert!(!target.remove_listener(id));
        assert_eq!(target.listener_count(), 0);
    }

    #[test]
    fn listener_may_remove_itself_during_dispatch() {
        let target = Rc::new(EventTarget::new());
        let slot: Rc<Cell<Option<ListenerId>>> = Rc::new(Cell::new(None));

        let t = Rc::clone(&target);
        let s = Rc::clone(&slot);
        let id = target.add_listener(Rc::new(move |_: &InputEvent| {
            if let Some(id) = s.get() {
                t.remove_listener(id);
            }
        }));
        slot.set(Some(id));

        target.dispatch(&InputEvent::PointerLeft);
        assert_eq!(target.listener_count(), 0);
    }
}
