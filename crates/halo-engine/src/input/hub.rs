use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

use super::environment::Environment;
use super::sample::PointerSample;
use super::state::InputState;
use super::target::{ListenerId, PointerTarget, RawListener};
use super::types::{InputEvent, MouseButton};

/// Callback invoked synchronously for every captured pointer move.
pub type PointerCallback = Rc<dyn Fn(&PointerSample)>;

/// Membership key of a hub subscriber.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct SubscriberId(u64);

/// Outcome of [`PointerHub::initialize`].
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum Initialization {
    /// The raw listener was installed by this call.
    Attached,
    /// A previous call already installed it.
    AlreadyAttached,
    /// The environment has no hovering pointer; nothing was installed.
    SkippedTouchOnly,
}

struct Subscriber {
    id: SubscriberId,
    callback: PointerCallback,
    live: Cell<bool>,
    delivering: Cell<bool>,
}

struct HubShared {
    target: Rc<dyn PointerTarget>,
    environment: Environment,

    sample: Cell<PointerSample>,
    input: RefCell<InputState>,

    subscribers: RefCell<Vec<Rc<Subscriber>>>,
    next_subscriber: Cell<u64>,

    listener: Cell<Option<ListenerId>>,
}

impl HubShared {
    fn handle_event(&self, ev: &InputEvent) {
        let moved = self.input.borrow_mut().apply_event(ev);
        let Some(pos) = moved else {
            return;
        };

        let sample = PointerSample {
            x: pos.x,
            y: pos.y,
            seq: self.sample.get().seq.wrapping_add(1).max(1),
        };
        self.sample.set(sample);
        self.fan_out(&sample);
    }

    fn fan_out(&self, sample: &PointerSample) {
        // Subscribing or unsubscribing from inside a callback edits the live
        // list, never this pass's snapshot.
        let snapshot: Vec<Rc<Subscriber>> = self.subscribers.borrow().clone();

        for sub in &snapshot {
            // A nested move already reached the rest of the list.
            if self.sample.get().seq != sample.seq {
                log::trace!("pass for sample {} superseded", sample.seq);
                break;
            }
            if !sub.live.get() {
                continue;
            }
            if sub.delivering.replace(true) {
                log::trace!("skipping re-entrant delivery to subscriber {:?}", sub.id);
                continue;
            }
            (sub.callback)(sample);
            sub.delivering.set(false);
        }
    }

    fn remove_subscriber(&self, id: SubscriberId) {
        // The callback may own other subscriptions; it must drop after the
        // list borrow ends.
        let removed = {
            let mut subs = self.subscribers.borrow_mut();
            subs.iter().position(|s| s.id == id).map(|idx| subs.remove(idx))
        };
        if let Some(sub) = removed {
            sub.live.set(false);
        }
    }

    fn detach_listener(&self) -> bool {
        match self.listener.take() {
            Some(id) => self.target.remove_listener(id),
            None => false,
        }
    }
}

impl Drop for HubShared {
    fn drop(&mut self) {
        if self.detach_listener() {
            log::debug!("pointer hub dropped; raw listener removed");
        }
    }
}

/// Single authoritative source of pointer position.
///
/// One raw listener is installed on the host's [`PointerTarget`] no matter
/// how many consumers read from the hub. Each move updates the shared
/// [`PointerSample`] and is then delivered synchronously to every
/// subscriber, in registration order. Expensive work belongs in the
/// consumers' own frame tasks, which read [`latest_sample`] once per frame.
///
/// `PointerHub` is a cheap, cloneable handle; all clones share one hub.
///
/// # Lifecycle
///
/// 1. [`PointerHub::new`] with the host target and environment.
/// 2. [`initialize`] once per session (repeat calls are no-ops; touch-only
///    hosts never install anything).
/// 3. Consumers [`subscribe`] and/or read [`latest_sample`].
/// 4. [`teardown`] at application shutdown.
///
/// [`latest_sample`]: PointerHub::latest_sample
/// [`initialize`]: PointerHub::initialize
/// [`subscribe`]: PointerHub::subscribe
/// [`teardown`]: PointerHub::teardown
#[derive(Clone)]
pub struct PointerHub {
    shared: Rc<HubShared>,
}

impl PointerHub {
    pub fn new(target: Rc<dyn PointerTarget>, environment: Environment) -> Self {
        Self {
            shared: Rc::new(HubShared {
                target,
                environment,
                sample: Cell::new(PointerSample::default()),
                input: RefCell::new(InputState::default()),
                subscribers: RefCell::new(Vec::new()),
                next_subscriber: Cell::new(1),
                listener: Cell::new(None),
            }),
        }
    }

    /// Installs the raw listener on the first call.
    pub fn initialize(&self) -> Initialization {
        let shared = &self.shared;

        if shared.listener.get().is_some() {
            return Initialization::AlreadyAttached;
        }

        if shared.environment.is_touch_only() {
            log::debug!("pointer hub: touch-only environment, no listener installed");
            return Initialization::SkippedTouchOnly;
        }

        // Weak so the target does not keep the hub alive.
        let weak: Weak<HubShared> = Rc::downgrade(shared);
        let listener: RawListener = Rc::new(move |ev: &InputEvent| {
            if let Some(shared) = weak.upgrade() {
                shared.handle_event(ev);
            }
        });

        let id = shared.target.add_listener(listener);
        shared.listener.set(Some(id));
        log::debug!("pointer hub: raw listener {id:?} installed");
        Initialization::Attached
    }

    /// Removes the raw listener. Intended for application shutdown only;
    /// subscribers stay registered but stop receiving events.
    pub fn teardown(&self) {
        if self.shared.detach_listener() {
            log::debug!("pointer hub: raw listener removed");
        }
    }

    /// Registers `callback` for every subsequent pointer move.
    ///
    /// Dropping the returned [`Subscription`] unsubscribes.
    pub fn subscribe(&self, callback: impl Fn(&PointerSample) + 'static) -> Subscription {
        self.subscribe_shared(Rc::new(callback))
    }

    /// Like [`subscribe`](Self::subscribe) for a shared callback.
    ///
    /// Subscribing the same `Rc` twice keeps a single membership; the second
    /// handle refers to the first one's membership.
    pub fn subscribe_shared(&self, callback: PointerCallback) -> Subscription {
        let shared = &self.shared;
        let mut subs = shared.subscribers.borrow_mut();

        if let Some(existing) = subs.iter().find(|s| Rc::ptr_eq(&s.callback, &callback)) {
            return Subscription {
                hub: Rc::downgrade(shared),
                id: existing.id,
            };
        }

        let id = SubscriberId(shared.next_subscriber.get());
        shared.next_subscriber.set(id.0 + 1);
        subs.push(Rc::new(Subscriber {
            id,
            callback,
            live: Cell::new(true),
            delivering: Cell::new(false),
        }));

        Subscription {
            hub: Rc::downgrade(shared),
            id,
        }
    }

    /// Copy of the most recent sample; the origin sample before any move.
    #[inline]
    pub fn latest_sample(&self) -> PointerSample {
        self.shared.sample.get()
    }

    pub fn subscriber_count(&self) -> usize {
        self.shared.subscribers.borrow().len()
    }

    pub fn is_attached(&self) -> bool {
        self.shared.listener.get().is_some()
    }

    pub fn environment(&self) -> Environment {
        self.shared.environment
    }

    /// `true` while the primary button is held.
    pub fn pointer_pressed(&self) -> bool {
        self.button_down(MouseButton::Left)
    }

    pub fn button_down(&self, button: MouseButton) -> bool {
        self.shared.input.borrow().button_down(button)
    }

    /// `true` between a move and the next leave.
    pub fn pointer_inside(&self) -> bool {
        self.shared.input.borrow().pointer_inside()
    }
}

/// Handle returned by [`PointerHub::subscribe`].
///
/// The callback receives no further events once [`unsubscribe`] is called or
/// the handle is dropped, including later subscribers' turns in a fan-out
/// pass that is already running.
///
/// [`unsubscribe`]: Subscription::unsubscribe
#[must_use = "dropping a Subscription unsubscribes immediately"]
pub struct Subscription {
    hub: Weak<HubShared>,
    id: SubscriberId,
}

impl Subscription {
    pub fn id(&self) -> SubscriberId {
        self.id
    }

    pub fn is_active(&self) -> bool {
        self.hub
            .upgrade()
            .is_some_and(|hub| hub.subscribers.borrow().iter().any(|s| s.id == self.id))
    }

    /// Explicit form of dropping the handle.
    pub fn unsubscribe(self) {}
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(hub) = self.hub.upgrade() {
            hub.remove_subscriber(self.id);
        }
    }
}
