#![cfg(test)]

// Property tests for SubscriberSlots kept inside the crate so they can
// reach the crate-private structural layer.

use crate::callable::WeakCallable;
use crate::method;
use crate::slots::SubscriberSlots;
use proptest::prelude::*;
use slotmap::DefaultKey;
use std::rc::Rc;

struct Target(usize);

impl Target {
    fn id(&self) -> usize {
        self.0
    }
}

#[derive(Clone, Debug)]
enum Op {
    Insert(usize),
    Remove(usize),
    Kill(usize),
    Revive(usize),
    Find(usize),
    RemoveDead,
}

fn arb_ops() -> impl Strategy<Value = Vec<Op>> {
    let idx = 0usize..6;
    let op = prop_oneof![
        3 => idx.clone().prop_map(Op::Insert),
        1 => idx.clone().prop_map(Op::Remove),
        1 => idx.clone().prop_map(Op::Kill),
        1 => idx.clone().prop_map(Op::Revive),
        1 => idx.prop_map(Op::Find),
        1 => Just(Op::RemoveDead),
    ];
    proptest::collection::vec(op, 1..80)
}

// Property: model equivalence against a Vec of (key, target index).
// Invariants exercised across random operation sequences:
// - `insert` yields a fresh key; removed keys never resolve again.
// - `find` returns a key whose entry targets the same live object.
// - `remove_dead` removes exactly the entries whose target was dropped.
// - `len`/`is_empty` agree with the model after each op.
proptest! {
    #![proptest_config(ProptestConfig { cases: 64, .. ProptestConfig::default() })]
    #[test]
    fn prop_slots_match_model(ops in arb_ops()) {
        let mut targets: Vec<Option<Rc<Target>>> = (0..6).map(|i| Some(Rc::new(Target(i)))).collect();
        let mut sut: SubscriberSlots<(), usize> = SubscriberSlots::new();
        let mut model: Vec<(DefaultKey, usize)> = Vec::new();
        let mut stale: Vec<DefaultKey> = Vec::new();

        for op in ops {
            match op {
                Op::Insert(i) => {
                    if let Some(t) = &targets[i] {
                        let cb = WeakCallable::new(t, method!(Target, id)).unwrap();
                        let k = sut.insert(cb);
                        prop_assert!(!model.iter().any(|&(mk, _)| mk == k));
                        prop_assert!(!stale.contains(&k));
                        model.push((k, i));
                    }
                }
                Op::Remove(i) => {
                    if let Some(pos) = model.iter().position(|&(_, t)| t == i) {
                        let (k, _) = model.swap_remove(pos);
                        prop_assert!(sut.remove(k).is_some());
                        stale.push(k);
                    }
                }
                Op::Kill(i) => {
                    targets[i] = None;
                }
                Op::Revive(i) => {
                    if targets[i].is_none() {
                        targets[i] = Some(Rc::new(Target(i)));
                    }
                }
                Op::Find(i) => {
                    if let Some(t) = &targets[i] {
                        let probe = WeakCallable::new(t, method!(Target, id)).unwrap();
                        match sut.find(&probe) {
                            Some(k) => {
                                let found = sut.get(k).expect("found key resolves");
                                prop_assert_eq!(found.try_invoke(()), Some(i));
                            }
                            None => {
                                // No live entry may point at this object.
                                for &(k, _) in &model {
                                    let cb = sut.get(k).expect("model key resolves");
                                    prop_assert!(cb != probe);
                                }
                            }
                        }
                    }
                }
                Op::RemoveDead => {
                    let removed = sut.remove_dead();
                    let (dead, live): (Vec<_>, Vec<_>) = model
                        .iter()
                        .copied()
                        .partition(|&(k, _)| !sut.contains_key(k));
                    prop_assert_eq!(removed.len(), dead.len());
                    for &(k, _) in &dead {
                        stale.push(k);
                    }
                    model = live;
                    for &(k, _) in &model {
                        let cb = sut.get(k).expect("survivor resolves");
                        prop_assert!(cb.is_alive());
                    }
                }
            }

            for &k in &stale {
                prop_assert!(sut.get(k).is_none());
            }
            prop_assert_eq!(sut.len(), model.len());
            prop_assert_eq!(sut.is_empty(), model.is_empty());
        }
    }
}
