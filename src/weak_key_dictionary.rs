//! WeakKeyDictionary: the public map that holds its keys weakly.

use crate::comparer::{DefaultComparer, KeyComparer};
use crate::enumerator::{Iter, Keys, Values};
use crate::error::{WeakKeyError, WeakKeyResult};
use crate::scavenger;
use crate::table::{Probe, Table};
use crate::weak_handle::WeakHandle;
use core::fmt;
use core::hash::Hash;
use core::ops::Index;
use log::trace;

/// A hash map whose keys are held through weak handles `W`.
///
/// Inserting never extends a key's lifetime. Once every strong reference
/// to a key is dropped its entry disappears from all reads immediately,
/// and its slot is reclaimed by the next sweep: either an explicit
/// [`scavenge`](Self::scavenge) or the one that runs automatically when the
/// table would otherwise have to grow.
///
/// `len()` counts slots, so between sweeps it may include entries whose
/// keys are already dead. It is exact right after `scavenge()`.
///
/// ```
/// use std::rc::{Rc, Weak};
/// use weak_key_dictionary::WeakKeyDictionary;
///
/// let mut d: WeakKeyDictionary<Weak<str>, u32> = WeakKeyDictionary::new();
/// let key: Rc<str> = Rc::from("task");
/// d.insert(&key, 1);
/// assert_eq!(d.get("task"), Some(&1));
///
/// drop(key);
/// assert_eq!(d.get("task"), None);
/// assert_eq!(d.scavenge(), 1);
/// assert!(d.is_empty());
/// ```
pub struct WeakKeyDictionary<W, V, C = DefaultComparer> {
    pub(crate) table: Table<W, V, C>,
}

impl<W, V> WeakKeyDictionary<W, V>
where
    W: WeakHandle,
    W::Key: Hash + Eq,
{
    pub fn new() -> Self {
        Self::with_comparer(DefaultComparer::default())
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self::with_capacity_and_comparer(capacity, DefaultComparer::default())
    }
}

impl<W, V, C> Default for WeakKeyDictionary<W, V, C>
where
    C: Default,
{
    fn default() -> Self {
        Self {
            table: Table::with_capacity_and_comparer(0, C::default()),
        }
    }
}

impl<W, V, C> WeakKeyDictionary<W, V, C> {
    /// Entries presumed live: exact after `scavenge()`, an upper bound
    /// otherwise.
    pub fn len(&self) -> usize {
        self.table.len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.len() == 0
    }

    /// Number of entries the table can hold before it next has to sweep,
    /// rehash or reallocate.
    ///
    /// Tombstones left by removed entries count against this, so it can drop
    /// after a sweep while the allocation stays the same size. It is not a
    /// measure of memory use.
    pub fn capacity(&self) -> usize {
        self.table.capacity()
    }

    pub fn comparer(&self) -> &C {
        self.table.comparer()
    }

    /// Remove every entry, live or dead.
    pub fn clear(&mut self) {
        let reclaimed = self.table.clear();
        trace!("cleared {} entries", reclaimed.len());
        drop(reclaimed);
    }
}

impl<W, V, C> WeakKeyDictionary<W, V, C>
where
    W: WeakHandle,
{
    /// Sweep out every entry whose key has been dropped and return how many
    /// were removed. Returns 0 when nothing is dead.
    pub fn scavenge(&mut self) -> usize {
        scavenger::scavenge(&mut self.table)
    }

    /// Live `(key, &value)` pairs. Each call starts a fresh traversal, and
    /// liveness is checked as each element is produced.
    pub fn iter(&self) -> Iter<'_, W, V> {
        Iter::new(self.table.slots())
    }

    pub fn keys(&self) -> Keys<'_, W, V> {
        Keys::new(self.iter())
    }

    pub fn values(&self) -> Values<'_, W, V> {
        Values::new(self.table.slots())
    }
}

impl<W, V, C> WeakKeyDictionary<W, V, C>
where
    W: WeakHandle,
    C: KeyComparer<W::Key>,
{
    pub fn with_comparer(comparer: C) -> Self {
        Self::with_capacity_and_comparer(0, comparer)
    }

    pub fn with_capacity_and_comparer(capacity: usize, comparer: C) -> Self {
        Self {
            table: Table::with_capacity_and_comparer(capacity, comparer),
        }
    }

    /// Value for a live key equal to `key`, or `None`. Never fails and never
    /// mutates the table.
    pub fn get(&self, key: &W::Key) -> Option<&V> {
        let slot = self.table.find(key)?;
        self.table.value(slot)
    }

    pub fn get_mut(&mut self, key: &W::Key) -> Option<&mut V> {
        let slot = self.table.find(key)?;
        self.table.value_mut(slot)
    }

    /// Value for a live key equal to `key`.
    ///
    /// Fails with [`WeakKeyError::KeyNotFound`] if there is none.
    pub fn lookup(&self, key: &W::Key) -> WeakKeyResult<&V> {
        self.get(key).ok_or(WeakKeyError::KeyNotFound)
    }

    /// [`lookup`](Self::lookup) through a weak handle. Fails with
    /// [`WeakKeyError::NullKey`] if the handle's key is already gone.
    pub fn lookup_weak(&self, key: &W) -> WeakKeyResult<&V> {
        let strong = key.upgrade().ok_or(WeakKeyError::NullKey)?;
        self.lookup(&*strong)
    }

    pub fn contains_key(&self, key: &W::Key) -> bool {
        self.table.find(key).is_some()
    }

    /// Associate `value` with `key`, returning the previous value if a live
    /// equal key was already present. Only a weak handle to `key` is kept.
    ///
    /// If adding a new entry would make the table grow, dead entries are
    /// swept first and the table only grows if it is still full.
    pub fn insert(&mut self, key: &W::Strong, value: V) -> Option<V> {
        match self.table.probe(&**key) {
            Probe::Live(slot) => self.table.replace_value(slot, value),
            Probe::Vacant(hash) => {
                if self.table.at_growth_threshold() {
                    self.scavenge_before_growth();
                }
                self.table.insert_new(key, hash, value);
                None
            }
        }
    }

    /// [`insert`](Self::insert) through a weak handle. Fails with
    /// [`WeakKeyError::NullKey`] if the handle's key is already gone.
    pub fn insert_weak(&mut self, key: &W, value: V) -> WeakKeyResult<Option<V>> {
        let strong = key.upgrade().ok_or(WeakKeyError::NullKey)?;
        Ok(self.insert(&strong, value))
    }

    /// Remove the entry for a live key equal to `key` and return its value.
    /// Entries with dead keys cannot be matched; `scavenge` removes those.
    pub fn remove(&mut self, key: &W::Key) -> Option<V> {
        let slot = self.table.find(key)?;
        self.table.remove(slot).map(|s| s.value)
    }

    fn scavenge_before_growth(&mut self) {
        let capacity = self.table.capacity();
        trace!(
            "table full at {} entries; scavenging before growth",
            capacity
        );
        let removed = self.scavenge();
        if removed == 0 {
            trace!("nothing to reclaim; growing past {} entries", capacity);
        }
    }
}

impl<W, V, C> Index<&W::Key> for WeakKeyDictionary<W, V, C>
where
    W: WeakHandle,
    C: KeyComparer<W::Key>,
{
    type Output = V;

    /// # Panics
    ///
    /// Panics if no live key equal to `key` is present.
    fn index(&self, key: &W::Key) -> &V {
        match self.get(key) {
            Some(v) => v,
            None => panic!("key not found in WeakKeyDictionary"),
        }
    }
}

impl<'a, W, V, C> Extend<(&'a W::Strong, V)> for WeakKeyDictionary<W, V, C>
where
    W: WeakHandle + 'a,
    C: KeyComparer<W::Key>,
{
    fn extend<I: IntoIterator<Item = (&'a W::Strong, V)>>(&mut self, iter: I) {
        for (key, value) in iter {
            self.insert(key, value);
        }
    }
}

impl<'a, W, V, C> IntoIterator for &'a WeakKeyDictionary<W, V, C>
where
    W: WeakHandle,
{
    type Item = (W::Strong, &'a V);
    type IntoIter = Iter<'a, W, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<W, V, C> fmt::Debug for WeakKeyDictionary<W, V, C>
where
    W: WeakHandle,
    W::Strong: fmt::Debug,
    V: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::comparer::ByAddress;
    use std::collections::BTreeSet;
    use std::rc::{Rc, Weak};

    type Dict<V> = WeakKeyDictionary<Weak<str>, V>;

    fn key(s: &str) -> Rc<str> {
        Rc::from(s)
    }

    /// Invariant: re-inserting a live equal key overwrites in place.
    #[test]
    fn reinsert_overwrites_without_new_slot() {
        let mut d: Dict<i32> = WeakKeyDictionary::new();
        let k = key("k");
        assert_eq!(d.insert(&k, 1), None);
        assert_eq!(d.insert(&key("k"), 2), Some(1));
        assert_eq!(d.len(), 1);
        assert_eq!(d.get("k"), Some(&2));
    }

    #[test]
    fn lookup_reports_missing_and_dead_keys() {
        let mut d: Dict<i32> = WeakKeyDictionary::new();
        assert_eq!(d.lookup("x"), Err(WeakKeyError::KeyNotFound));

        let k = key("k");
        d.insert(&k, 5);
        assert_eq!(d.lookup("k"), Ok(&5));
        drop(k);
        assert_eq!(d.lookup("k"), Err(WeakKeyError::KeyNotFound));
        assert_eq!(d.len(), 1, "lookup must not sweep");
    }

    #[test]
    fn weak_entry_points_reject_dead_handles() {
        let mut d: Dict<i32> = WeakKeyDictionary::new();
        let k = key("k");
        let weak = Rc::downgrade(&k);

        assert_eq!(d.insert_weak(&weak, 1), Ok(None));
        assert_eq!(d.lookup_weak(&weak), Ok(&1));
        assert_eq!(d.insert_weak(&weak, 2), Ok(Some(1)));
        assert_eq!(Rc::strong_count(&k), 1, "insert_weak must not retain the key");

        drop(k);
        assert_eq!(d.insert_weak(&weak, 3), Err(WeakKeyError::NullKey));
        assert_eq!(d.lookup_weak(&weak), Err(WeakKeyError::NullKey));

        let mut sized: WeakKeyDictionary<Weak<String>, i32> = WeakKeyDictionary::new();
        assert_eq!(sized.insert_weak(&Weak::new(), 1), Err(WeakKeyError::NullKey));
        assert!(sized.is_empty());
    }

    #[test]
    fn get_mut_and_remove() {
        let mut d: Dict<i32> = WeakKeyDictionary::new();
        let k = key("k");
        d.insert(&k, 10);
        if let Some(v) = d.get_mut("k") {
            *v += 1;
        }
        assert_eq!(d["k"], 11);
        assert_eq!(d.remove("k"), Some(11));
        assert_eq!(d.remove("k"), None);
        assert!(d.is_empty());
        assert!(!d.contains_key("k"));
    }

    #[test]
    fn remove_cannot_match_dead_key() {
        let mut d: Dict<i32> = WeakKeyDictionary::new();
        d.insert(&key("gone"), 1);
        assert_eq!(d.remove("gone"), None);
        assert_eq!(d.len(), 1);
        assert_eq!(d.scavenge(), 1);
    }

    #[test]
    #[should_panic(expected = "key not found")]
    fn index_panics_on_miss() {
        let d: Dict<i32> = WeakKeyDictionary::new();
        let _ = d["missing"];
    }

    #[test]
    fn growth_sweeps_dead_entries_before_reallocating() {
        let mut d: Dict<usize> = WeakKeyDictionary::new();
        let mut kept = Vec::new();
        for i in 0..64 {
            let k = key(&format!("k{i}"));
            d.insert(&k, i);
            if i % 8 == 0 {
                kept.push(k);
            }
        }
        assert!(d.len() < 64);
        assert!(d.len() >= kept.len());
        d.scavenge();
        assert_eq!(d.len(), kept.len());
    }

    /// Once dead entries are reclaimed on growth, a workload whose live set
    /// stays small never reallocates past a small table. A reallocation
    /// leaves no tombstones, so the peak `capacity()` seen after each insert
    /// is the size of the largest allocation.
    #[test]
    fn steady_state_never_reallocates_past_live_entries() {
        let mut d: Dict<u32> = WeakKeyDictionary::new();
        let anchor = key("anchor");
        d.insert(&anchor, 0);
        let mut peak = d.capacity();
        for i in 0..10_000u32 {
            d.insert(&key(&i.to_string()), i);
            peak = peak.max(d.capacity());
        }
        assert!(peak < 64, "table reallocated to {peak} entries for dead keys");
        assert_eq!(d.get("anchor"), Some(&0));
    }

    #[test]
    fn clear_removes_live_and_dead() {
        let mut d: Dict<i32> = WeakKeyDictionary::with_capacity(8);
        let a = key("a");
        d.insert(&a, 1);
        d.insert(&key("b"), 2);
        d.clear();
        assert!(d.is_empty());
        assert_eq!(d.get("a"), None);
        assert_eq!(d.scavenge(), 0);
    }

    #[test]
    fn iteration_and_projections() {
        let mut d: Dict<i32> = WeakKeyDictionary::new();
        let a = key("a");
        let c = key("c");
        d.insert(&a, 1);
        d.insert(&key("b"), 2);
        d.insert(&c, 3);

        let pairs: BTreeSet<(String, i32)> =
            d.iter().map(|(k, v)| (k.to_string(), *v)).collect();
        assert_eq!(
            pairs,
            [("a".to_string(), 1), ("c".to_string(), 3)].into_iter().collect()
        );
        let keys: BTreeSet<String> = d.keys().map(|k| k.to_string()).collect();
        assert_eq!(keys, ["a", "c"].iter().map(|s| s.to_string()).collect());
        let mut values: Vec<i32> = d.values().copied().collect();
        values.sort_unstable();
        assert_eq!(values, vec![1, 3]);
        assert_eq!((&d).into_iter().count(), 2);
    }

    #[test]
    fn extend_inserts_borrowed_keys() {
        let mut d: Dict<i32> = WeakKeyDictionary::new();
        let a = key("a");
        let b = key("b");
        d.extend([(&a, 1), (&b, 2), (&a, 3)]);
        assert_eq!(d.len(), 2);
        assert_eq!(d.get("a"), Some(&3));
        assert_eq!(d.get("b"), Some(&2));
    }

    #[test]
    fn debug_lists_live_entries() {
        let mut d: Dict<i32> = WeakKeyDictionary::new();
        let a = key("a");
        d.insert(&a, 1);
        d.insert(&key("gone"), 2);
        assert_eq!(format!("{d:?}"), r#"{"a": 1}"#);
    }

    #[test]
    fn by_address_comparer_uses_identity() {
        let mut d: WeakKeyDictionary<Weak<str>, i32, ByAddress> =
            WeakKeyDictionary::with_comparer(ByAddress::default());
        let k1 = key("same");
        let k2 = key("same");
        d.insert(&k1, 1);
        d.insert(&k2, 2);
        assert_eq!(d.len(), 2);
        assert_eq!(d.get(&*k1), Some(&1));
        assert_eq!(d.get(&*k2), Some(&2));
        assert_eq!(d.get("same"), None);
    }

    #[test]
    fn default_uses_comparer_default() {
        let d: WeakKeyDictionary<Weak<str>, i32, ByAddress> = Default::default();
        assert!(d.is_empty());
        assert_eq!(d.capacity(), 0);
    }
}
