//! Event Dispatcher
//!
//! In-page publish/subscribe keyed by event kind. Delivery is synchronous,
//! in registration order, on the caller's stack. A panicking subscriber
//! aborts the `emit` call; subscribers are not isolated from each other.

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::{Rc, Weak};

use crate::event::{EventKind, SyncEvent};

type Callback = Rc<dyn Fn(&SyncEvent)>;

struct Registration {
    id: u64,
    callback: Callback,
}

#[derive(Default)]
struct DispatcherInner {
    next_id: u64,
    subscribers: HashMap<EventKind, Vec<Registration>>,
}

/// Per-surface event hub. Cloning shares the same subscriber table.
#[derive(Clone, Default)]
pub struct EventDispatcher {
    inner: Rc<RefCell<DispatcherInner>>,
}

impl EventDispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Deliver `event` to every subscriber of its kind.
    ///
    /// The subscriber list is snapshotted first, so callbacks may emit,
    /// subscribe or unsubscribe while being called.
    pub fn emit(&self, event: &SyncEvent) {
        let callbacks: Vec<Callback> = {
            let inner = self.inner.borrow();
            inner
                .subscribers
                .get(&event.kind())
                .map(|regs| regs.iter().map(|reg| reg.callback.clone()).collect())
                .unwrap_or_default()
        };
        for callback in callbacks {
            callback(event);
        }
    }

    /// Register `callback` for one event kind
    pub fn subscribe<F>(&self, kind: EventKind, callback: F) -> Subscription
    where
        F: Fn(&SyncEvent) + 'static,
    {
        self.register(kind, Rc::new(callback))
    }

    /// Register the same callback for every event kind
    pub fn subscribe_all<F>(&self, callback: F) -> SubscriptionSet
    where
        F: Fn(&SyncEvent) + 'static,
    {
        let callback: Callback = Rc::new(callback);
        let mut set = SubscriptionSet::default();
        for kind in EventKind::ALL {
            set.push(self.register(kind, callback.clone()));
        }
        set
    }

    pub fn subscriber_count(&self, kind: EventKind) -> usize {
        self.inner
            .borrow()
            .subscribers
            .get(&kind)
            .map_or(0, Vec::len)
    }

    fn register(&self, kind: EventKind, callback: Callback) -> Subscription {
        let mut inner = self.inner.borrow_mut();
        let id = inner.next_id;
        inner.next_id += 1;
        inner
            .subscribers
            .entry(kind)
            .or_default()
            .push(Registration { id, callback });
        Subscription {
            dispatcher: Rc::downgrade(&self.inner),
            kind,
            id,
            active: Cell::new(true),
        }
    }
}

/// Handle to one registered callback.
///
/// Dropping it does not unsubscribe; call [`Subscription::unsubscribe`].
#[must_use = "keep the Subscription to be able to unsubscribe"]
pub struct Subscription {
    dispatcher: Weak<RefCell<DispatcherInner>>,
    kind: EventKind,
    id: u64,
    active: Cell<bool>,
}

impl Subscription {
    pub fn kind(&self) -> EventKind {
        self.kind
    }

    pub fn is_active(&self) -> bool {
        self.active.get()
    }

    /// Remove exactly this callback. Later calls are no-ops.
    pub fn unsubscribe(&self) {
        if !self.active.replace(false) {
            return;
        }
        if let Some(inner) = self.dispatcher.upgrade() {
            let mut inner = inner.borrow_mut();
            if let Some(regs) = inner.subscribers.get_mut(&self.kind) {
                regs.retain(|reg| reg.id != self.id);
            }
        }
    }
}

/// A group of subscriptions torn down together
#[derive(Default)]
#[must_use = "keep the SubscriptionSet to be able to unsubscribe"]
pub struct SubscriptionSet {
    subscriptions: Vec<Subscription>,
}

impl SubscriptionSet {
    pub fn push(&mut self, subscription: Subscription) {
        self.subscriptions.push(subscription);
    }

    pub fn extend(&mut self, other: SubscriptionSet) {
        self.subscriptions.extend(other.subscriptions);
    }

    pub fn len(&self) -> usize {
        self.subscriptions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.subscriptions.is_empty()
    }

    pub fn unsubscribe_all(&mut self) {
        for subscription in self.subscriptions.drain(..) {
            subscription.unsubscribe();
        }
    }
}
