use proptest::prelude::*;
use std::cell::Cell;
use std::rc::Rc;
use weak_event::{method, WeakCallable, WeakEventChannel};

#[derive(Default)]
struct Counter {
    hits: Cell<usize>,
}

impl Counter {
    fn hit(&self) {
        self.hits.set(self.hits.get() + 1);
    }
}

// Model random subscribe/unsubscribe/drop/invoke sequences and check that
// each invoke reaches exactly the live subscriptions, then leaves only them.
proptest! {
    #[test]
    fn prop_channel_delivery(targets in 1usize..=6, ops in proptest::collection::vec((0u8..=3u8, 0usize..100usize), 1..120)) {
        let channel: WeakEventChannel<()> = WeakEventChannel::new();
        let mut owners: Vec<Option<Rc<Counter>>> = (0..targets).map(|_| Some(Rc::new(Counter::default()))).collect();
        // Live subscription count per target index.
        let mut subs: Vec<usize> = vec![0; targets];
        // Dead entries that have not yet been pruned.
        let mut lingering = 0usize;

        for (op, raw) in ops {
            let t = raw % targets;
            match op {
                // Subscribe (reviving the target first if it was dropped)
                0 => {
                    let owner = owners[t].get_or_insert_with(|| Rc::new(Counter::default())).clone();
                    let cb = WeakCallable::new(&owner, method!(Counter, hit)).unwrap();
                    channel.subscribe(cb).unwrap();
                    subs[t] += 1;
                }
                // Unsubscribe one entry for a live target
                1 => {
                    if let Some(owner) = &owners[t] {
                        let cb = WeakCallable::new(owner, method!(Counter, hit)).unwrap();
                        let found = channel.unsubscribe(&cb).unwrap();
                        prop_assert_eq!(found, subs[t] > 0);
                        if found {
                            subs[t] -= 1;
                        }
                    }
                }
                // Drop the target
                2 => {
                    if owners[t].take().is_some() {
                        lingering += subs[t];
                        subs[t] = 0;
                    }
                }
                // Invoke
                3 => {
                    let before: Vec<usize> = owners.iter().map(|o| o.as_ref().map_or(0, |c| c.hits.get())).collect();
                    let delivered = channel.invoke(());
                    let live: usize = subs.iter().sum();
                    prop_assert_eq!(delivered, live);
                    for (i, o) in owners.iter().enumerate() {
                        if let Some(c) = o {
                            prop_assert_eq!(c.hits.get(), before[i] + subs[i]);
                        }
                    }
                    lingering = 0;
                }
                _ => unreachable!(),
            }

            prop_assert_eq!(channel.len(), subs.iter().sum::<usize>() + lingering);
        }
    }
}
