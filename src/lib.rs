//! weak-key-dictionary: a hash map that holds its keys weakly, so attaching
//! state to an object never keeps that object alive.
//!
//! Internal Design:
//!
//! Summary
//! - Goal: let a library associate auxiliary values with caller-owned,
//!   reference-counted objects without leaking them, and reclaim the
//!   entries of objects that have been dropped.
//! - Layers (leaf to root):
//!   - `WeakHandle`: the contract with the key's owner. Downgrade a strong
//!     reference, upgrade a weak one, test for death. Implemented for
//!     `std::rc::Weak` and `std::sync::Weak`.
//!   - `KeyComparer`: hash plus equality. `DefaultComparer` uses
//!     `Hash + Eq`; `ByAddress` uses allocation identity.
//!   - `WeakEntry`: a weak handle plus the key's hash, computed once.
//!   - `Table`: a `hashbrown::HashTable` index over a `slotmap::SlotMap` of
//!     slots; includes a debug-only reentrancy guard around comparer calls.
//!   - `scavenger`: the sweep that unlinks and frees slots with dead keys.
//!   - `enumerator`: lazy iterators that skip dead slots.
//!   - `WeakKeyDictionary`: public API; routes growth through the sweep.
//!
//! Liveness
//! - A key is live while some strong reference to it exists outside the
//!   dictionary. The dictionary never holds one between operations.
//! - Reads filter dead entries: a dead slot never compares equal to a query,
//!   is never yielded by iteration, and is left in place. Reads take `&self`
//!   and never mutate.
//! - Each operation resolves a slot's weak handle at most once and works with
//!   that snapshot. With `Arc` keys another thread may drop a key at any
//!   instant, so re-checking would be a race.
//!
//! Reclamation
//! - `scavenge()` removes every slot whose key is dead and returns the count.
//! - Inserting a new key into a full table runs `scavenge()` first, and the
//!   table grows only if it is still full afterwards. Memory therefore tracks
//!   the live set rather than everything ever inserted.
//! - `len()` counts slots. It is exact right after a sweep and an upper bound
//!   on live entries between sweeps.
//!
//! Hashing invariants
//! - Each slot stores the hash computed at insertion, and the index only ever
//!   uses the stored hash. Dead slots stay routable for unlinking, and the
//!   comparer is never called during a rehash.
//!
//! Concurrency
//! - No internal locking. Mutation needs `&mut self`. The dictionary is
//!   `!Sync`; with `Arc` keys it is `Send` when its values and comparer are.
//!
//! Notes and non-goals
//! - No promise about when a dead entry is reclaimed, only that it is never
//!   observed and is eventually swept.
//! - Keys cannot be mutated through the dictionary.

mod comparer;
mod enumerator;
mod error;
mod reentrancy;
mod scavenger;
mod table;
mod weak_entry;
mod weak_handle;
mod weak_key_dictionary;
mod weak_key_dictionary_proptest;

// Public surface
pub use comparer::{ByAddress, DefaultComparer, KeyComparer};
pub use enumerator::{Iter, Keys, Values};
pub use error::{WeakKeyError, WeakKeyResult};
pub use weak_handle::WeakHandle;
pub use weak_key_dictionary::WeakKeyDictionary;
