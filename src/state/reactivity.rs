// ============================================================================
// REACTIVITY - Observable values and cancellable subscriptions
// ============================================================================

use std::cell::{Cell, RefCell};
use std::rc::Rc;

type Callback<T> = Rc<dyn Fn(&T)>;

/// Handle returned by every observer registration.
///
/// Dropping it (or calling `unsubscribe`) cancels the registration.
/// `forget` keeps the registration alive for the rest of the program.
#[must_use = "dropping a Subscription cancels it immediately"]
pub struct Subscription {
    cancel: Option<Box<dyn FnOnce()>>,
}

impl Subscription {
    pub fn new<F>(cancel: F) -> Self
    where
        F: FnOnce() + 'static,
    {
        Self { cancel: Some(Box::new(cancel)) }
    }

    pub fn unsubscribe(mut self) {
        if let Some(cancel) = self.cancel.take() {
            cancel();
        }
    }

    pub fn forget(mut self) {
        self.cancel = None;
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(cancel) = self.cancel.take() {
            cancel();
        }
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription")
            .field("active", &self.cancel.is_some())
            .finish()
    }
}

/// Shared value with change notifications. Clones share value and subscribers.
pub struct ReactiveState<T> {
    value: Rc<RefCell<T>>,
    subscribers: Rc<RefCell<Vec<(u64, Callback<T>)>>>,
    next_id: Rc<Cell<u64>>,
}

impl<T: Clone + 'static> ReactiveState<T> {
    pub fn new(value: T) -> Self {
        Self {
            value: Rc::new(RefCell::new(value)),
            subscribers: Rc::new(RefCell::new(Vec::new())),
            next_id: Rc::new(Cell::new(0)),
        }
    }

    /// Snapshot of the current value
    pub fn get(&self) -> T {
        self.value.borrow().clone()
    }

    /// Read the value without cloning it
    pub fn with<R>(&self, reader: impl FnOnce(&T) -> R) -> R {
        reader(&self.value.borrow())
    }

    /// Replace the value and notify subscribers
    pub fn set(&self, new_value: T) {
        *self.value.borrow_mut() = new_value;
        self.notify();
    }

    /// Mutate in place; subscribers are notified only when `updater` returns true
    pub fn update<F>(&self, updater: F) -> bool
    where
        F: FnOnce(&mut T) -> bool,
    {
        let changed = updater(&mut self.value.borrow_mut());
        if changed {
            self.notify();
        }
        changed
    }

    pub fn subscribe<F>(&self, callback: F) -> Subscription
    where
        F: Fn(&T) + 'static,
    {
        let id = self.next_id.get();
        self.next_id.set(id + 1);
        self.subscribers.borrow_mut().push((id, Rc::new(callback)));

        let subscribers = Rc::downgrade(&self.subscribers);
        Subscription::new(move || {
            if let Some(subscribers) = subscribers.upgrade() {
                subscribers.borrow_mut().retain(|(sub_id, _)| *sub_id != id);
            }
        })
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers.borrow().len()
    }

    fn notify(&self) {
        // Snapshot first: callbacks may read, set or (un)subscribe
        let snapshot = self.get();
        let callbacks: Vec<Callback<T>> = self
            .subscribers
            .borrow()
            .iter()
            .map(|(_, cb)| cb.clone())
            .collect();
        for callback in callbacks {
            callback(&snapshot);
        }
    }
}

impl<T> Clone for ReactiveState<T> {
    fn clone(&self) -> Self {
        Self {
            value: self.value.clone(),
            subscribers: self.subscribers.clone(),
            next_id: self.next_id.clone(),
        }
    }
}

impl<T: Clone + Default + 'static> Default for ReactiveState<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}
