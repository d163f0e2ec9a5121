//! Typed subscriber lists keyed by event

use std::collections::HashMap;
use std::hash::Hash;
use std::sync::atomic::{AtomicU64, Ordering};

static NEXT_ID: AtomicU64 = AtomicU64::new(1);

/// Handle returned by [`EventTable::subscribe`]; unique across all tables
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Callback<A> = Box<dyn FnMut(&A)>;

/// Ordered callbacks per key, invoked in subscription order
pub struct EventTable<K, A> {
    subscribers: HashMap<K, Vec<(SubscriptionId, Callback<A>)>>,
}

impl<K: Eq + Hash + Clone, A> EventTable<K, A> {
    pub fn new() -> Self {
        Self {
            subscribers: HashMap::new(),
        }
    }

    pub fn subscribe(&mut self, key: K, callback: impl FnMut(&A) + 'static) -> SubscriptionId {
        let id = SubscriptionId(NEXT_ID.fetch_add(1, Ordering::Relaxed));
        self.subscribers
            .entry(key)
            .or_default()
            .push((id, Box::new(callback)));
        id
    }

    /// Returns false if `id` was not subscribed here
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        for list in self.subscribers.values_mut() {
            if let Some(pos) = list.iter().position(|(sub, _)| *sub == id) {
                list.remove(pos);
                return true;
            }
        }
        false
    }

    /// Drop every subscriber of `key`, returning how many there were
    pub fn unsubscribe_all(&mut self, key: &K) -> usize {
        self.subscribers.remove(key).map_or(0, |list| list.len())
    }

    /// Invoke the subscribers of `key`, returning how many ran
    pub fn emit(&mut self, key: &K, arg: &A) -> usize {
        match self.subscribers.get_mut(key) {
            Some(list) => {
                for (_, callback) in list.iter_mut() {
                    callback(arg);
                }
                list.len()
            }
            None => 0,
        }
    }

    pub fn subscriber_count(&self, key: &K) -> usize {
        self.subscribers.get(key).map_or(0, |list| list.len())
    }
}

impl<K: Eq + Hash + Clone, A> Default for EventTable<K, A> {
    fn default() -> Self {
        Self::new()
    }
}
