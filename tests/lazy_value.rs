// LazyValue test suite.
//
// Core invariants exercised:
// - The initializer runs on first access only, and again after reset.
// - Every state transition notifies live subscribers once, after the
//   transition is visible.
// - Subscribers are held weakly: dropping one silences it.
use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};
use weak_event::{method, LazyValue, ValueChange, WeakCallable};

#[derive(Default)]
struct Watcher {
    seen: RefCell<Vec<ValueChange>>,
}

impl Watcher {
    fn on_change(&self, change: ValueChange) {
        self.seen.borrow_mut().push(change);
    }
}

fn watch(lazy: &LazyValue<u64>, w: &Rc<Watcher>) {
    lazy.changed()
        .subscribe(WeakCallable::new(w, method!(Watcher, on_change)).unwrap())
        .unwrap();
}

// Test: created, replaced and reset transitions each notify once.
#[test]
fn transitions_notify_subscribers() {
    let lazy = LazyValue::new(|| 40u64);
    let w = Rc::new(Watcher::default());
    watch(&lazy, &w);

    assert_eq!(lazy.get(), 40);
    assert_eq!(lazy.get(), 40);
    lazy.set(2);
    assert_eq!(lazy.get(), 2);
    lazy.reset();
    assert_eq!(lazy.get(), 40);

    assert_eq!(
        *w.seen.borrow(),
        vec![
            ValueChange::Created,
            ValueChange::Replaced,
            ValueChange::Reset,
            ValueChange::Created,
        ]
    );
}

// Test: reset on a never-created value is silent.
#[test]
fn reset_before_creation_is_noop() {
    let lazy = LazyValue::new(|| 1u64);
    let w = Rc::new(Watcher::default());
    watch(&lazy, &w);
    lazy.reset();
    assert!(w.seen.borrow().is_empty());
    assert!(!lazy.is_created());
}

// Test: set before first access skips the initializer.
#[test]
fn set_before_access_skips_init() {
    let runs = Rc::new(Cell::new(0));
    let r = runs.clone();
    let lazy = LazyValue::new(move || {
        r.set(r.get() + 1);
        0u64
    });
    lazy.set(9);
    assert!(lazy.is_created());
    assert_eq!(lazy.get(), 9);
    assert_eq!(runs.get(), 0);
}

// Test: a dropped watcher stops receiving and is pruned.
#[test]
fn dropped_watcher_is_pruned() {
    let lazy = LazyValue::new(|| 5u64);
    let kept = Rc::new(Watcher::default());
    let gone = Rc::new(Watcher::default());
    watch(&lazy, &kept);
    watch(&lazy, &gone);
    drop(gone);

    lazy.get();
    assert_eq!(lazy.changed().len(), 1);
    assert_eq!(*kept.seen.borrow(), vec![ValueChange::Created]);
}

/// Reads the value back from inside the change notification.
struct Reader {
    lazy: Weak<LazyValue<u64>>,
    observed: RefCell<Vec<u64>>,
}

impl Reader {
    fn on_change(&self, change: ValueChange) {
        if change == ValueChange::Reset {
            return;
        }
        if let Some(lazy) = self.lazy.upgrade() {
            self.observed.borrow_mut().push(lazy.get());
        }
    }
}

// Test: handlers see the new state and may read it re-entrantly.
#[test]
fn handlers_read_new_value() {
    let lazy = Rc::new(LazyValue::new(|| 11u64));
    let reader = Rc::new(Reader {
        lazy: Rc::downgrade(&lazy),
        observed: RefCell::new(Vec::new()),
    });
    lazy.changed()
        .subscribe(WeakCallable::new(&reader, method!(Reader, on_change)).unwrap())
        .unwrap();

    assert_eq!(lazy.get(), 11);
    lazy.set(12);
    assert_eq!(*reader.observed.borrow(), vec![11, 12]);
}

// Test: `with` borrows without cloning.
#[test]
fn with_borrows_value() {
    let lazy = LazyValue::new(|| vec![1, 2, 3]);
    assert_eq!(lazy.with(|v| v.len()), 3);
    assert_eq!(lazy.with(|v| v.iter().sum::<i32>()), 6);
}
