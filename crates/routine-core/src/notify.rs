//! Synchronous publish/subscribe used by the ledger and the plugin manager.

use std::fmt;

/// Handle returned by `subscribe`; pass it back to `unsubscribe`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriptionId(u64);

type Listener<T> = Box<dyn Fn(&T) + Send + Sync>;

/// Ordered listener list. Fan-out happens on the caller's thread, in
/// subscription order.
pub struct Subscribers<T> {
    next_id: u64,
    listeners: Vec<(SubscriptionId, Listener<T>)>,
}

impl<T> Subscribers<T> {
    pub fn new() -> Self {
        Self {
            next_id: 0,
            listeners: Vec::new(),
        }
    }

    pub fn subscribe<F>(&mut self, listener: F) -> SubscriptionId
    where
        F: Fn(&T) + Send + Sync + 'static,
    {
        let id = SubscriptionId(self.next_id);
        self.next_id += 1;
        self.listeners.push((id, Box::new(listener)));
        id
    }

    /// Returns false if the id was unknown (already unsubscribed).
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(existing, _)| *existing != id);
        self.listeners.len() != before
    }

    pub fn notify(&self, value: &T) {
        for (_, listener) in &self.listeners {
            listener(value);
        }
    }

    pub fn len(&self) -> usize {
        self.listeners.len()
    }

    pub fn is_empty(&self) -> bool {
        self.listeners.is_empty()
    }
}

impl<T> Default for Subscribers<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> fmt::Debug for Subscribers<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscribers")
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    #[test]
    fn notify_reaches_listeners_in_order() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let mut subs = Subscribers::<u32>::new();

        let a = Arc::clone(&seen);
        subs.subscribe(move |v| a.lock().unwrap().push(format!("a{v}")));
        let b = Arc::clone(&seen);
        subs.subscribe(move |v| b.lock().unwrap().push(format!("b{v}")));

        subs.notify(&7);
        assert_eq!(*seen.lock().unwrap(), vec!["a7", "b7"]);
    }

    #[test]
    fn unsubscribe_removes_only_that_listener() {
        let count = Arc::new(Mutex::new(0));
        let mut subs = Subscribers::<()>::new();

        let c1 = Arc::clone(&count);
        let first = subs.subscribe(move |_| *c1.lock().unwrap() += 1);
        let c2 = Arc::clone(&count);
        subs.subscribe(move |_| *c2.lock().unwrap() += 10);

        assert!(subs.unsubscribe(first));
        assert!(!subs.unsubscribe(first));
        subs.notify(&());
        assert_eq!(*count.lock().unwrap(), 10);
        assert_eq!(subs.len(), 1);
    }
}
