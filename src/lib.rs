//! weak-event: method callables that do not keep their target alive, and
//! a multicast channel that drops subscribers whose target is gone.
//!
//! Internal Design:
//!
//! Summary
//! - Goal: deliver notifications to objects without the notifier owning
//!   them, so a subscriber's lifetime is decided only by its real owners.
//! - Layers:
//!   - Method<T, A, R>: a `MethodId` plus a thunk `(&T, A) -> R` built once.
//!     Arguments are packed into a tuple `A`; the `Invoker` trait is
//!     implemented for every `Fn(&T, A1, ..., An) -> R` up to five
//!     arguments, so method paths bind directly.
//!   - WeakCallable<A, R>: a `Weak<T>` plus the shared thunk, erased over
//!     `T`. Invoking it upgrades, calls, and releases; a dead target yields
//!     `R::default()`.
//!   - SubscriberSlots<A, R>: structural storage in a generational slot
//!     arena. It never calls user code; nested access is ruled out by the
//!     channel's `RefCell`.
//!   - WeakEventChannel<A, R>: public multicast API over the slots.
//!   - LazyValue<T>: a lazily computed value that reports changes through
//!     a channel.
//!
//! Constraints
//! - Single-threaded: `!Send`/`!Sync` by construction (`Rc`/`Weak`). There
//!   is no internal locking; a caller sharing a channel must serialize.
//! - Liveness is observed, never signalled: a dead subscriber is found at
//!   delivery, `prune`, or unsubscribe time.
//! - Identity is the target's address while alive, read through
//!   `Weak::as_ptr` without upgrading.
//!
//! Delivery
//! - `invoke` snapshots the slot keys, then calls each entry by key with no
//!   borrow held, so handlers may subscribe, unsubscribe or invoke
//!   re-entrantly. Entries added during a pass are not visited by it;
//!   entries removed during a pass are skipped if not yet visited.
//! - Dead keys found during the pass are compacted afterwards. Removed
//!   callables are dropped only after the slot borrow is released, so their
//!   destructors may reenter the channel.
//!
//! Notes and non-goals
//! - Thread-safe channels are out of scope; `Arc`-based callables would
//!   need their own storage and locking.
//! - Arguments and return values must be `'static`.

mod callable;
mod channel;
mod error;
mod lazy;
mod method;
mod slots;
mod slots_proptest;

// Public surface
pub use callable::{StrongCallable, WeakCallable};
pub use channel::{Subscription, WeakEventChannel};
pub use error::{BindingFault, Error};
pub use lazy::{LazyValue, ValueChange};
pub use method::{BoundMethod, Invoker, Method, MethodId};
