//! Authoritative transform state with push notification to subscribers.
//!
//! The editor writes every pan/zoom change into a [`TransformStore`]; anything
//! that has to mirror the canvas (the HTML overlay, rulers, minimaps) implements
//! [`TransformListener`] and subscribes. Updates are delivered synchronously in
//! subscription order and never queued: the last write wins.

#[cfg(test)]
#[path = "store_test.rs"]
mod store_test;

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use crate::camera::Transform;

/// Receives every transform written to a [`TransformStore`].
pub trait TransformListener {
    fn on_transform(&mut self, transform: &Transform);
}

/// Handle returned by [`TransformStore::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

struct Subscription {
    id: ListenerId,
    listener: Weak<RefCell<dyn TransformListener>>,
}

pub struct TransformStore {
    current: Transform,
    subscriptions: Vec<Subscription>,
    next_id: u64,
}

impl Default for TransformStore {
    fn default() -> Self {
        Self::new(Transform::IDENTITY)
    }
}

impl TransformStore {
    #[must_use]
    pub fn new(initial: Transform) -> Self {
        Self { current: initial, subscriptions: Vec::new(), next_id: 1 }
    }

    #[must_use]
    pub fn current(&self) -> Transform {
        self.current
    }

    /// Register a listener. The store holds it weakly; dropping the last
    /// strong reference unsubscribes it on the next notification.
    pub fn subscribe<L>(&mut self, listener: &Rc<RefCell<L>>) -> ListenerId
    where
        L: TransformListener + 'static,
    {
        let id = ListenerId(self.next_id);
        self.next_id += 1;
        let strong: Rc<RefCell<dyn TransformListener>> = listener.clone();
        self.subscriptions.push(Subscription { id, listener: Rc::downgrade(&strong) });
        id
    }

    /// Remove a listener. Returns `false` when it was not subscribed.
    pub fn unsubscribe(&mut self, id: ListenerId) -> bool {
        let before = self.subscriptions.len();
        self.subscriptions.retain(|sub| sub.id != id);
        self.subscriptions.len() != before
    }

    #[must_use]
    pub fn listener_count(&self) -> usize {
        self.subscriptions.len()
    }

    /// Replace the current transform and notify every live listener.
    pub fn set(&mut self, transform: Transform) {
        self.current = transform;
        self.subscriptions.retain(|sub| sub.listener.strong_count() > 0);
        for sub in &self.subscriptions {
            let Some(listener) = sub.listener.upgrade() else {
                continue;
            };
            // Listeners already borrowed elsewhere miss this update.
            if let Ok(mut guard) = listener.try_borrow_mut() {
                guard.on_transform(&transform);
            }
        }
    }

    /// Re-deliver the current transform, e.g. after the viewport resized.
    pub fn notify(&mut self) {
        self.set(self.current);
    }
}
