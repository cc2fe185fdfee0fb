//! Key comparers: the hash and equality pair that decides key identity.

use core::hash::{BuildHasher, Hash};
use std::collections::hash_map::RandomState;

/// Hashing and equality for keys of type `K`.
///
/// Implementations must be consistent: keys that compare equal must hash
/// to the same value. The dictionary calls `hash_key` exactly once per
/// inserted key and caches the result.
pub trait KeyComparer<K: ?Sized> {
    fn hash_key(&self, key: &K) -> u64;
    fn keys_equal(&self, a: &K, b: &K) -> bool;
}

/// Value equality through `K: Hash + Eq`, hashed with `S`.
#[derive(Clone, Debug, Default)]
pub struct DefaultComparer<S = RandomState> {
    hasher: S,
}

impl<S> DefaultComparer<S> {
    pub fn with_hasher(hasher: S) -> Self {
        Self { hasher }
    }

    pub fn hasher(&self) -> &S {
        &self.hasher
    }
}

impl<K, S> KeyComparer<K> for DefaultComparer<S>
where
    K: ?Sized + Hash + Eq,
    S: BuildHasher,
{
    #[inline]
    fn hash_key(&self, key: &K) -> u64 {
        self.hasher.hash_one(key)
    }

    #[inline]
    fn keys_equal(&self, a: &K, b: &K) -> bool {
        a == b
    }
}

/// Object identity: two keys are equal only if they are the same allocation.
///
/// Works for any `K`, including types without `Hash`/`Eq`. Keys are always
/// borrowed from inside their `Rc`/`Arc`, so the address is stable for as
/// long as the key lives.
#[derive(Clone, Debug, Default)]
pub struct ByAddress<S = RandomState> {
    hasher: S,
}

impl<S> ByAddress<S> {
    pub fn with_hasher(hasher: S) -> Self {
        Self { hasher }
    }

    pub fn hasher(&self) -> &S {
        &self.hasher
    }
}

#[inline]
fn address<K: ?Sized>(key: &K) -> usize {
    // Drop any pointer metadata so `str`/slice keys compare by data address.
    key as *const K as *const () as usize
}

impl<K, S> KeyComparer<K> for ByAddress<S>
where
    K: ?Sized,
    S: BuildHasher,
{
    #[inline]
    fn hash_key(&self, key: &K) -> u64 {
        self.hasher.hash_one(address(key))
    }

    #[inline]
    fn keys_equal(&self, a: &K, b: &K) -> bool {
        address(a) == address(b)
    }
}
