//! Enumerator: lazy iterators over the live entries of a dictionary.

use crate::table::Slot;
use crate::weak_handle::WeakHandle;
use core::iter::FusedIterator;
use slotmap::DefaultKey;

/// Iterator over live `(key, &value)` pairs.
///
/// Each slot's key is resolved when the cursor reaches it, so a key dropped
/// after `iter()` was called but before its slot is visited is skipped.
/// Dead slots are skipped without being removed.
pub struct Iter<'a, W, V> {
    slots: slotmap::basic::Iter<'a, DefaultKey, Slot<W, V>>,
}

impl<'a, W, V> Iter<'a, W, V> {
    pub(crate) fn new(slots: slotmap::basic::Iter<'a, DefaultKey, Slot<W, V>>) -> Self {
        Self { slots }
    }
}

impl<'a, W: WeakHandle, V> Iterator for Iter<'a, W, V> {
    type Item = (W::Strong, &'a V);

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        for (_, slot) in self.slots.by_ref() {
            if let Some(key) = slot.entry.resolve() {
                return Some((key, &slot.value));
            }
        }
        None
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        (0, self.slots.size_hint().1)
    }
}

impl<W: WeakHandle, V> FusedIterator for Iter<'_, W, V> {}

/// Iterator over the live keys, as strong references.
pub struct Keys<'a, W, V> {
    inner: Iter<'a, W, V>,
}

impl<'a, W, V> Keys<'a, W, V> {
    pub(crate) fn new(inner: Iter<'a, W, V>) -> Self {
        Self { inner }
    }
}

impl<W: WeakHandle, V> Iterator for Keys<'_, W, V> {
    type Item = W::Strong;

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(k, _)| k)
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<W: WeakHandle, V> FusedIterator for Keys<'_, W, V> {}

/// Iterator over the values of live entries.
pub struct Values<'a, W, V> {
    slots: slotmap::basic::Iter<'a, DefaultKey, Slot<W, V>>,
}

impl<'a, W, V> Values<'a, W, V> {
    pub(crate) fn new(slots: slotmap::basic::Iter<'a, DefaultKey, Slot<W, V>>) -> Self {
        Self { slots }
    }
}

impl<'a, W: WeakHandle, V> Iterator for Values<'a, W, V> {
    type Item = &'a V;

    // Liveness only; no strong key reference is needed to yield a value.
    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        self.slots
            .by_ref()
            .find(|(_, slot)| !slot.entry.is_dead())
            .map(|(_, slot)| &slot.value)
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        (0, self.slots.size_hint().1)
    }
}

impl<W: WeakHandle, V> FusedIterator for Values<'_, W, V> {}
