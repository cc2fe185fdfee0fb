#![cfg(test)]

// Property tests for WeakKeyDictionary kept inside the crate so they can
// check the table's internal bookkeeping alongside the public behavior.

use crate::weak_key_dictionary::WeakKeyDictionary;
use proptest::prelude::*;
use std::collections::{BTreeMap, BTreeSet};
use std::rc::{Rc, Weak};

// Pool-indexed operations to improve shrinking: indices shrink to earlier
// keys, pool length shrinks, and op lists shrink in length.
#[derive(Clone, Debug)]
enum Op {
    Insert(usize, i32),
    DropKey(usize),
    Remove(usize),
    Get(usize),
    Scavenge,
    Iterate,
}

fn arb_scenario() -> impl Strategy<Value = (Vec<String>, Vec<Op>)> {
    proptest::collection::btree_set("[a-z]{1,4}", 1..=8).prop_flat_map(|pool| {
        let pool: Vec<String> = pool.into_iter().collect();
        let idx = 0..pool.len();
        let op = prop_oneof![
            4 => (idx.clone(), any::<i32>()).prop_map(|(i, v)| Op::Insert(i, v)),
            2 => idx.clone().prop_map(Op::DropKey),
            1 => idx.clone().prop_map(Op::Remove),
            2 => idx.clone().prop_map(Op::Get),
            1 => Just(Op::Scavenge),
            1 => Just(Op::Iterate),
        ];
        proptest::collection::vec(op, 1..80).prop_map(move |ops| (pool.clone(), ops))
    })
}

// Property: state-machine equivalence against a map of live keys.
// The model owns the only strong reference to each live key, so dropping a
// key from the model kills it in the dictionary as well.
// Invariants exercised across random operation sequences:
// - Insert of a live equal key overwrites and returns the old value.
// - `get`/`contains_key`/`lookup` see exactly the model's live keys.
// - `len()` is an upper bound on live keys and matches the slot index.
// - `scavenge()` removes exactly the dead slots; a second call returns 0.
// - Iteration yields each live pair exactly once and nothing dead.
proptest! {
    #![proptest_config(ProptestConfig { cases: 64, .. ProptestConfig::default() })]
    #[test]
    fn prop_state_machine((pool, ops) in arb_scenario()) {
        let mut sut: WeakKeyDictionary<Weak<str>, i32> = WeakKeyDictionary::new();
        let mut model: BTreeMap<String, (Rc<str>, i32)> = BTreeMap::new();

        for op in ops {
            match op {
                Op::Insert(i, v) => {
                    let name = &pool[i];
                    // Use a fresh allocation each time so equality, not
                    // identity, decides whether the entry is overwritten.
                    let key: Rc<str> = Rc::from(name.as_str());
                    let prev = sut.insert(&key, v);
                    match model.get_mut(name) {
                        Some((_, mv)) => {
                            prop_assert_eq!(prev, Some(*mv));
                            *mv = v;
                        }
                        None => {
                            prop_assert_eq!(prev, None);
                            model.insert(name.clone(), (key, v));
                        }
                    }
                }
                Op::DropKey(i) => {
                    let _ = model.remove(&pool[i]);
                }
                Op::Remove(i) => {
                    let name = &pool[i];
                    let removed = sut.remove(name.as_str());
                    prop_assert_eq!(removed, model.remove(name).map(|(_, v)| v));
                }
                Op::Get(i) => {
                    let name = pool[i].as_str();
                    let expected = model.get(name).map(|(_, v)| *v);
                    prop_assert_eq!(sut.get(name).copied(), expected);
                    prop_assert_eq!(sut.contains_key(name), expected.is_some());
                    prop_assert_eq!(sut.lookup(name).ok().copied(), expected);
                }
                Op::Scavenge => {
                    let before = sut.len();
                    let removed = sut.scavenge();
                    prop_assert_eq!(before - removed, model.len());
                    prop_assert_eq!(sut.len(), model.len());
                    prop_assert_eq!(sut.scavenge(), 0);
                }
                Op::Iterate => {
                    let seen: Vec<(String, i32)> =
                        sut.iter().map(|(k, v)| (k.to_string(), *v)).collect();
                    let unique: BTreeSet<&String> = seen.iter().map(|(k, _)| k).collect();
                    prop_assert_eq!(unique.len(), seen.len(), "duplicate key in iteration");
                    let seen: BTreeMap<String, i32> = seen.into_iter().collect();
                    let expected: BTreeMap<String, i32> =
                        model.iter().map(|(k, (_, v))| (k.clone(), *v)).collect();
                    prop_assert_eq!(seen, expected);
                }
            }

            prop_assert!(sut.len() >= model.len());
            prop_assert_eq!(sut.table.index.len(), sut.table.slots.len());
        }

        drop(model);
        let before = sut.len();
        prop_assert_eq!(sut.scavenge(), before);
        prop_assert!(sut.is_empty());
    }
}

// Property: with entries that are dropped right after insertion, growth-
// triggered sweeps keep the slot count bounded by a small multiple of the
// live set instead of the number of inserts.
proptest! {
    #![proptest_config(ProptestConfig { cases: 32, .. ProptestConfig::default() })]
    #[test]
    fn prop_growth_sweep_bounds_len(keep_every in 1usize..10, n in 1usize..300) {
        let mut sut: WeakKeyDictionary<Weak<str>, usize> = WeakKeyDictionary::new();
        let mut kept = Vec::new();
        let mut peak = 0;
        for i in 0..n {
            let key: Rc<str> = Rc::from(format!("k{i}").as_str());
            sut.insert(&key, i);
            // A fresh allocation has no tombstones, so the peak capacity is
            // the size of the largest allocation the index ever made.
            peak = peak.max(sut.capacity());
            if i % keep_every == 0 {
                kept.push(key);
            }
        }
        // The index only reallocates when a sweep leaves it full of live
        // keys, so no allocation outgrows them by more than a constant factor.
        prop_assert!(sut.len() <= n);
        prop_assert!(
            peak <= 8 * kept.len() + 16,
            "peak capacity {} for {} live keys",
            peak,
            kept.len()
        );
        sut.scavenge();
        prop_assert_eq!(sut.len(), kept.len());
        for (i, k) in kept.iter().enumerate() {
            prop_assert_eq!(sut.get(k), Some(&(i * keep_every)));
        }
    }
}
