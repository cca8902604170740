//! LazyValue: a lazily computed value that announces changes through a
//! `WeakEventChannel`.

use crate::channel::WeakEventChannel;
use core::cell::RefCell;
use core::fmt;

/// What happened to a `LazyValue`.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum ValueChange {
    /// The initializer ran on first access.
    Created,
    /// `set` stored a new value.
    Replaced,
    /// `reset` discarded the value; the next access runs the initializer again.
    Reset,
}

enum State<T> {
    Pending,
    Initializing,
    Ready(T),
}

/// A value computed on first access and recomputed after `reset`.
///
/// Each state transition happens under an exclusive borrow of the state,
/// which is released before subscribers are notified; handlers may read
/// the value or subscribe further from inside the notification.
pub struct LazyValue<T> {
    state: RefCell<State<T>>,
    init: Box<dyn Fn() -> T>,
    changed: WeakEventChannel<(ValueChange,)>,
}

impl<T> LazyValue<T> {
    pub fn new<F>(init: F) -> Self
    where
        F: Fn() -> T + 'static,
    {
        Self {
            state: RefCell::new(State::Pending),
            init: Box::new(init),
            changed: WeakEventChannel::new(),
        }
    }

    /// Change notifications. Subscribers are held weakly.
    pub fn changed(&self) -> &WeakEventChannel<(ValueChange,)> {
        &self.changed
    }

    pub fn is_created(&self) -> bool {
        matches!(*self.state.borrow(), State::Ready(_))
    }

    /// Run `f` on the value, initializing it first if needed. `f` runs
    /// while the state is borrowed and must not call `set` or `reset`.
    ///
    /// # Panics
    /// Panics if called from inside the initializer, or after the
    /// initializer panicked.
    pub fn with<U>(&self, f: impl FnOnce(&T) -> U) -> U {
        match &*self.state.borrow() {
            State::Ready(v) => return f(v),
            State::Initializing => {
                panic!("LazyValue initializer re-entered or previously panicked")
            }
            State::Pending => {}
        }
        self.create_with(f)
    }

    /// Store `value`, replacing any current value, and notify.
    pub fn set(&self, value: T) {
        let old = {
            let mut state = self.state.borrow_mut();
            assert!(
                !matches!(*state, State::Initializing),
                "LazyValue::set called from inside its initializer"
            );
            core::mem::replace(&mut *state, State::Ready(value))
        };
        drop(old);
        self.notify(ValueChange::Replaced);
    }

    /// Discard the value so the next access recomputes it. Does nothing,
    /// and sends no notification, if the value was never created.
    pub fn reset(&self) {
        let old = {
            let mut state = self.state.borrow_mut();
            match *state {
                State::Ready(_) => core::mem::replace(&mut *state, State::Pending),
                _ => return,
            }
        };
        drop(old);
        self.notify(ValueChange::Reset);
    }

    // `f` sees the fresh value before `Created` goes out, so a handler that
    // resets the value cannot send the caller back into the initializer.
    fn create_with<U>(&self, f: impl FnOnce(&T) -> U) -> U {
        *self.state.borrow_mut() = State::Initializing;
        let value = (self.init)();
        *self.state.borrow_mut() = State::Ready(value);
        let out = match &*self.state.borrow() {
            State::Ready(v) => f(v),
            _ => unreachable!("value stored above"),
        };
        self.notify(ValueChange::Created);
        out
    }

    fn notify(&self, change: ValueChange) {
        let notified = self.changed.invoke((change,));
        tracing::trace!(?change, notified, "lazy value changed");
    }
}

impl<T: Clone> LazyValue<T> {
    /// A clone of the value, initializing it first if needed.
    ///
    /// # Panics
    /// Panics if called from inside the initializer.
    pub fn get(&self) -> T {
        self.with(T::clone)
    }
}

impl<T: fmt::Debug> fmt::Debug for LazyValue<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut d = f.debug_struct("LazyValue");
        match self.state.try_borrow().as_deref() {
            Ok(State::Ready(v)) => d.field("value", v),
            Ok(_) => d.field("value", &format_args!("<pending>")),
            Err(_) => d.field("value", &format_args!("<busy>")),
        };
        d.finish()
    }
}
