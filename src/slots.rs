//! SubscriberSlots: structural layer with stable keys.
//!
//! Entries live in a generational slot arena, so a key taken before a
//! removal never aliases an entry inserted afterwards. Nothing here calls
//! user code: removed callables are handed back to the caller, which drops
//! them once it no longer holds a borrow on the slots.

use crate::callable::WeakCallable;
use slotmap::{DefaultKey, SlotMap};

pub(crate) struct SubscriberSlots<A, R> {
    slots: SlotMap<DefaultKey, WeakCallable<A, R>>,
}

impl<A: 'static, R: 'static> SubscriberSlots<A, R> {
    pub(crate) fn new() -> Self {
        Self::with_capacity(0)
    }

    pub(crate) fn with_capacity(capacity: usize) -> Self {
        Self {
            slots: SlotMap::with_capacity_and_key(capacity),
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.slots.len()
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub(crate) fn insert(&mut self, callable: WeakCallable<A, R>) -> DefaultKey {
        self.slots.insert(callable)
    }

    /// First key whose callable compares equal to `callable`.
    pub(crate) fn find(&self, callable: &WeakCallable<A, R>) -> Option<DefaultKey> {
        self.slots
            .iter()
            .find(|(_, c)| *c == callable)
            .map(|(k, _)| k)
    }

    /// A clone of the callable at `key`, sharing its thunk.
    pub(crate) fn get(&self, key: DefaultKey) -> Option<WeakCallable<A, R>> {
        self.slots.get(key).cloned()
    }

    pub(crate) fn remove(&mut self, key: DefaultKey) -> Option<WeakCallable<A, R>> {
        self.slots.remove(key)
    }

    /// Remove every listed key still present. Keys already gone are skipped.
    pub(crate) fn remove_keys(&mut self, keys: &[DefaultKey]) -> Vec<WeakCallable<A, R>> {
        keys.iter().filter_map(|&k| self.slots.remove(k)).collect()
    }

    /// Remove every entry whose target has been reclaimed.
    pub(crate) fn remove_dead(&mut self) -> Vec<WeakCallable<A, R>> {
        let dead: Vec<DefaultKey> = self
            .slots
            .iter()
            .filter(|(_, c)| !c.is_alive())
            .map(|(k, _)| k)
            .collect();
        dead.into_iter().filter_map(|k| self.slots.remove(k)).collect()
    }

    /// Snapshot of the keys present right now.
    pub(crate) fn keys(&self) -> Vec<DefaultKey> {
        self.slots.keys().collect()
    }

    pub(crate) fn drain(&mut self) -> Vec<WeakCallable<A, R>> {
        self.slots.drain().map(|(_, c)| c).collect()
    }

    #[cfg(test)]
    pub(crate) fn contains_key(&self, key: DefaultKey) -> bool {
        self.slots.contains_key(key)
    }
}
