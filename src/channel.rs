//! WeakEventChannel: multicast to weakly-bound subscribers, pruning dead ones.

use crate::callable::WeakCallable;
use crate::error::Error;
use crate::slots::SubscriberSlots;
use core::cell::RefCell;
use core::fmt;
use slotmap::DefaultKey;

/// Key of one subscription, usable for O(1) removal.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct Subscription(DefaultKey);

/// Unordered set of `WeakCallable` subscribers.
///
/// Subscribing does not keep the target alive. Entries whose target has
/// been reclaimed stay in the channel until the next `invoke`, `prune`, or a
/// matching `unsubscribe`; there is no hook tied to the reclamation itself.
///
/// Every method takes `&self`, so subscribers may subscribe, unsubscribe or
/// invoke re-entrantly from inside a delivery. A delivery pass visits the
/// subscriptions present when it starts: entries added during the pass are
/// not visited by it, and entries removed during the pass are skipped if
/// their turn has not come yet. Visit order is unspecified.
///
/// The channel holds no lock and is `!Send`/`!Sync`; callers that share it
/// across contexts must serialize access themselves.
pub struct WeakEventChannel<A, R = ()> {
    subscribers: RefCell<SubscriberSlots<A, R>>,
}

impl<A: 'static, R: 'static> WeakEventChannel<A, R> {
    pub fn new() -> Self {
        Self {
            subscribers: RefCell::new(SubscriberSlots::new()),
        }
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            subscribers: RefCell::new(SubscriberSlots::with_capacity(capacity)),
        }
    }

    /// Number of entries, including dead ones not yet pruned.
    pub fn len(&self) -> usize {
        self.subscribers.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.subscribers.borrow().is_empty()
    }

    /// Add a subscriber. Subscribing the same callable twice yields two
    /// entries, each notified once per `invoke`.
    pub fn subscribe(
        &self,
        callable: impl Into<Option<WeakCallable<A, R>>>,
    ) -> Result<Subscription, Error> {
        let callable = callable.into().ok_or(Error::NullSubscriber)?;
        let method = callable.method();
        let key = self.subscribers.borrow_mut().insert(callable);
        tracing::trace!(%method, "subscribed");
        Ok(Subscription(key))
    }

    /// Remove one entry equal to `callable`. Returns `Ok(false)` when no
    /// entry matches.
    ///
    /// Equality is resolved now, not at subscribe time. A callable whose
    /// target is gone has no identity left, so it matches any other dead
    /// entry for the same method, including one bound to a different
    /// object. Use `remove` with the `Subscription` to target one entry
    /// exactly.
    pub fn unsubscribe<'c>(
        &self,
        callable: impl Into<Option<&'c WeakCallable<A, R>>>,
    ) -> Result<bool, Error> {
        let callable = callable.into().ok_or(Error::NullSubscriber)?;
        let removed = {
            let mut subscribers = self.subscribers.borrow_mut();
            subscribers
                .find(callable)
                .and_then(|key| subscribers.remove(key))
        };
        let found = removed.is_some();
        tracing::trace!(method = %callable.method(), found, "unsubscribed");
        drop(removed);
        Ok(found)
    }

    /// Remove the entry created by `subscribe`. Returns false if it is
    /// already gone.
    pub fn remove(&self, subscription: Subscription) -> bool {
        let removed = self.subscribers.borrow_mut().remove(subscription.0);
        let found = removed.is_some();
        tracing::trace!(
            method = ?removed.as_ref().map(WeakCallable::method),
            found,
            "removed subscription"
        );
        drop(removed);
        found
    }

    /// Deliver `args` to every live subscriber and prune the dead ones.
    /// Returns how many subscribers were called.
    pub fn invoke(&self, args: A) -> usize
    where
        A: Clone,
    {
        self.dispatch(args, |_| {})
    }

    /// Like `invoke`, but collects each live subscriber's return value.
    pub fn collect(&self, args: A) -> Vec<R>
    where
        A: Clone,
    {
        let mut results = Vec::new();
        self.dispatch(args, |r| results.push(r));
        results
    }

    /// Drop entries whose target is gone without delivering anything.
    /// Returns how many were dropped.
    pub fn prune(&self) -> usize {
        let removed = self.subscribers.borrow_mut().remove_dead();
        let pruned = removed.len();
        if pruned > 0 {
            tracing::trace!(pruned, remaining = self.len(), "pruned dead subscribers");
        }
        drop(removed);
        pruned
    }

    /// Remove every subscription.
    pub fn clear(&self) {
        let removed = self.subscribers.borrow_mut().drain();
        tracing::trace!(cleared = removed.len(), "cleared subscribers");
        drop(removed);
    }

    // Two phases: deliver over a key snapshot with no borrow held across
    // the call, then compact the dead keys. Removed callables are dropped
    // after the borrow is released.
    fn dispatch(&self, args: A, mut on_result: impl FnMut(R)) -> usize
    where
        A: Clone,
    {
        let pending = self.subscribers.borrow().keys();
        let mut delivered = 0;
        let mut dead: Vec<DefaultKey> = Vec::new();

        for key in pending {
            let callable = self.subscribers.borrow().get(key);
            let Some(callable) = callable else {
                // Removed earlier in this pass.
                continue;
            };
            match callable.try_invoke(args.clone()) {
                Some(r) => {
                    delivered += 1;
                    on_result(r);
                }
                None => dead.push(key),
            }
        }

        if !dead.is_empty() {
            let removed = self.subscribers.borrow_mut().remove_keys(&dead);
            tracing::trace!(
                pruned = removed.len(),
                remaining = self.len(),
                "pruned dead subscribers"
            );
            drop(removed);
        }
        delivered
    }
}

impl<A: 'static, R: 'static> Default for WeakEventChannel<A, R> {
    fn default() -> Self {
        Self::new()
    }
}

impl<A: 'static, R: 'static> fmt::Debug for WeakEventChannel<A, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.subscribers.try_borrow() {
            Ok(s) => f.debug_struct("WeakEventChannel").field("len", &s.len()).finish(),
            Err(_) => f.debug_struct("WeakEventChannel").finish_non_exhaustive(),
        }
    }
}
