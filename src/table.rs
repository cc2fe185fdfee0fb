//! Table: hashed storage of weak-keyed slots.
//!
//! Slots live in a `SlotMap` and are addressed by generational keys, which
//! stay valid across sweeps. A `HashTable<DefaultKey>` indexes them by the
//! hash cached in each slot's `WeakEntry`, so the index can rehash and
//! unlink slots whose keys are already gone. Lookups never mutate: a dead
//! slot just fails to match.

use crate::comparer::KeyComparer;
use crate::reentrancy::DebugReentrancy;
use crate::weak_entry::WeakEntry;
use crate::weak_handle::WeakHandle;
use core::mem;
use hashbrown::HashTable;
use slotmap::{DefaultKey, SlotMap};

pub(crate) struct Slot<W, V> {
    pub(crate) entry: WeakEntry<W>,
    pub(crate) value: V,
}

/// Outcome of probing for a key before an insert.
pub(crate) enum Probe {
    /// A live, comparer-equal key already occupies this slot.
    Live(DefaultKey),
    /// No live match; carries the hash to insert under.
    Vacant(u64),
}

pub(crate) struct Table<W, V, C> {
    comparer: C,
    pub(crate) index: HashTable<DefaultKey>,
    pub(crate) slots: SlotMap<DefaultKey, Slot<W, V>>,
    pub(crate) reentrancy: DebugReentrancy,
}

/// Remove `slot` from the bucket its cached `hash` routes to.
pub(crate) fn unlink(index: &mut HashTable<DefaultKey>, slot: DefaultKey, hash: u64) -> bool {
    match index.find_entry(hash, |&k| k == slot) {
        Ok(occupied) => {
            occupied.remove();
            true
        }
        Err(_) => false,
    }
}

impl<W, V, C> Table<W, V, C> {
    pub(crate) fn with_capacity_and_comparer(capacity: usize, comparer: C) -> Self {
        Self {
            comparer,
            index: HashTable::with_capacity(capacity),
            slots: SlotMap::with_capacity_and_key(capacity),
            reentrancy: DebugReentrancy::new(),
        }
    }

    pub(crate) fn comparer(&self) -> &C {
        &self.comparer
    }

    /// Slots in use, live or dead.
    pub(crate) fn len(&self) -> usize {
        self.slots.len()
    }

    /// Slots the index can hold before it has to rehash or reallocate.
    /// Tombstones count against it, so it is not the allocation size.
    pub(crate) fn capacity(&self) -> usize {
        self.index.capacity()
    }

    /// True when inserting one more slot would make the index grow.
    pub(crate) fn at_growth_threshold(&self) -> bool {
        !self.index.is_empty() && self.index.len() >= self.index.capacity()
    }

    pub(crate) fn value(&self, slot: DefaultKey) -> Option<&V> {
        self.slots.get(slot).map(|s| &s.value)
    }

    pub(crate) fn value_mut(&mut self, slot: DefaultKey) -> Option<&mut V> {
        self.slots.get_mut(slot).map(|s| &mut s.value)
    }

    /// Overwrite the value of an existing slot, returning the old one.
    pub(crate) fn replace_value(&mut self, slot: DefaultKey, value: V) -> Option<V> {
        self.slots
            .get_mut(slot)
            .map(|s| mem::replace(&mut s.value, value))
    }

    /// Unlink and return a slot. The caller drops it once the table is
    /// consistent again.
    pub(crate) fn remove(&mut self, slot: DefaultKey) -> Option<Slot<W, V>> {
        let _g = self.reentrancy.enter("remove");
        let removed = self.slots.remove(slot)?;
        let unlinked = unlink(&mut self.index, slot, removed.entry.hash());
        debug_assert!(unlinked, "slot missing from its bucket");
        Some(removed)
    }

    /// Unlink every slot, live or dead, and hand them back. As with
    /// `remove`, the caller drops them once the table is consistent again.
    pub(crate) fn clear(&mut self) -> SlotMap<DefaultKey, Slot<W, V>> {
        let _g = self.reentrancy.enter("clear");
        self.index.clear();
        mem::take(&mut self.slots)
    }

    pub(crate) fn slots(&self) -> slotmap::basic::Iter<'_, DefaultKey, Slot<W, V>> {
        self.slots.iter()
    }
}

impl<W, V, C> Table<W, V, C>
where
    W: WeakHandle,
    C: KeyComparer<W::Key>,
{
    // Resolves each candidate's handle once and compares against that
    // snapshot; dead candidates fall through without side effects.
    fn find_hashed(&self, hash: u64, key: &W::Key) -> Option<DefaultKey> {
        self.index
            .find(hash, |&k| {
                self.slots.get(k).is_some_and(|s| {
                    s.entry.hash() == hash
                        && s.entry
                            .matches(|stored| self.comparer.keys_equal(stored, key))
                })
            })
            .copied()
    }

    /// Locate the live slot for `key`.
    pub(crate) fn find(&self, key: &W::Key) -> Option<DefaultKey> {
        let _g = self.reentrancy.enter("find");
        let hash = self.comparer.hash_key(key);
        self.find_hashed(hash, key)
    }

    /// Like `find`, but hands back the hash on a miss so an insert does not
    /// have to hash twice.
    pub(crate) fn probe(&self, key: &W::Key) -> Probe {
        let _g = self.reentrancy.enter("probe");
        let hash = self.comparer.hash_key(key);
        match self.find_hashed(hash, key) {
            Some(slot) => Probe::Live(slot),
            None => Probe::Vacant(hash),
        }
    }

    /// Add a slot for a key known to have no live match. `hash` must come
    /// from `probe` on the same key.
    pub(crate) fn insert_new(&mut self, key: &W::Strong, hash: u64, value: V) -> DefaultKey {
        let _g = self.reentrancy.enter("insert");
        let slot = self.slots.insert(Slot {
            entry: WeakEntry::new(key, hash),
            value,
        });
        let slots = &self.slots;
        self.index
            .insert_unique(hash, slot, |&k| slots.get(k).map_or(0, |s| s.entry.hash()));
        slot
    }
}
