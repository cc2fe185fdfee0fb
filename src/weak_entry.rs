//! WeakEntry: a weak key handle plus the hash computed when it was inserted.

use crate::weak_handle::WeakHandle;

/// The key half of a table slot.
///
/// `hash` is fixed at construction. It stays valid after the key dies so
/// the slot can still be found in its bucket and unlinked.
pub(crate) struct WeakEntry<W> {
    handle: W,
    hash: u64,
}

impl<W> WeakEntry<W> {
    #[inline]
    pub(crate) fn hash(&self) -> u64 {
        self.hash
    }
}

impl<W: WeakHandle> WeakEntry<W> {
    pub(crate) fn new(key: &W::Strong, hash: u64) -> Self {
        Self {
            handle: W::downgrade(key),
            hash,
        }
    }

    /// Resolve the key once. Callers must use the returned reference for the
    /// rest of their operation instead of resolving again.
    #[inline]
    pub(crate) fn resolve(&self) -> Option<W::Strong> {
        self.handle.upgrade()
    }

    #[inline]
    pub(crate) fn is_dead(&self) -> bool {
        self.handle.is_expired()
    }

    /// Evaluate `pred` against the live key. A dead key never matches.
    #[inline]
    pub(crate) fn matches<F>(&self, pred: F) -> bool
    where
        F: FnOnce(&W::Key) -> bool,
    {
        match self.resolve() {
            Some(strong) => pred(&strong),
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::WeakEntry;
    use std::rc::{Rc, Weak};

    #[test]
    fn hash_survives_key_death() {
        let key: Rc<str> = Rc::from("k");
        let e: WeakEntry<Weak<str>> = WeakEntry::new(&key, 42);
        assert_eq!(e.hash(), 42);
        assert!(!e.is_dead());
        drop(key);
        assert!(e.is_dead());
        assert_eq!(e.hash(), 42);
    }

    /// The cached hash is readable without any handle bound, which is what
    /// unlinking from an unbounded table needs.
    #[test]
    fn hash_needs_no_handle_bound() {
        fn cached<W>(e: &WeakEntry<W>) -> u64 {
            e.hash()
        }
        let e = WeakEntry { handle: (), hash: 9 };
        assert_eq!(cached(&e), 9);
    }

    #[test]
    fn dead_entry_never_matches() {
        let key: Rc<str> = Rc::from("k");
        let e: WeakEntry<Weak<str>> = WeakEntry::new(&key, 0);
        assert!(e.matches(|k| k == "k"));
        assert!(!e.matches(|k| k == "x"));
        drop(key);
        let mut called = false;
        assert!(!e.matches(|_| {
            called = true;
            true
        }));
        assert!(!called, "predicate must not run for a dead key");
    }

    #[test]
    fn entry_does_not_keep_key_alive() {
        let key = Rc::new(String::from("k"));
        let e: WeakEntry<Weak<String>> = WeakEntry::new(&key, 1);
        assert_eq!(Rc::strong_count(&key), 1);
        let resolved = e.resolve().expect("live");
        assert_eq!(Rc::strong_count(&key), 2);
        drop(resolved);
        assert_eq!(Rc::strong_count(&key), 1);
    }
}
