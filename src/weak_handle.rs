//! WeakHandle: the contract between the dictionary and whatever owns the keys.
//!
//! The dictionary never owns a key. It needs three things from the key's
//! owner: a way to make a non-owning handle from a strong reference, a way
//! to turn that handle back into a strong reference if the key is still
//! alive, and a cheap death test that does not produce a strong reference.
//! `std::rc::Weak` and `std::sync::Weak` provide all three.

use core::ops::Deref;
use std::rc::{self, Rc};
use std::sync::{self, Arc};

/// A non-owning handle to a reference-counted key.
pub trait WeakHandle: Sized {
    /// The key type the handle points at. May be unsized (`str`, `[T]`).
    type Key: ?Sized;

    /// The owning handle callers hold to keep a key alive.
    type Strong: Clone + Deref<Target = Self::Key>;

    /// Create a weak handle that does not extend the key's lifetime.
    fn downgrade(strong: &Self::Strong) -> Self;

    /// Resolve the handle. `None` once the last strong reference is gone.
    fn upgrade(&self) -> Option<Self::Strong>;

    /// True once the key has been dropped. Once true it stays true.
    fn is_expired(&self) -> bool;
}

impl<T: ?Sized> WeakHandle for rc::Weak<T> {
    type Key = T;
    type Strong = Rc<T>;

    #[inline]
    fn downgrade(strong: &Rc<T>) -> Self {
        Rc::downgrade(strong)
    }

    #[inline]
    fn upgrade(&self) -> Option<Rc<T>> {
        rc::Weak::upgrade(self)
    }

    #[inline]
    fn is_expired(&self) -> bool {
        self.strong_count() == 0
    }
}

impl<T: ?Sized> WeakHandle for sync::Weak<T> {
    type Key = T;
    type Strong = Arc<T>;

    #[inline]
    fn downgrade(strong: &Arc<T>) -> Self {
        Arc::downgrade(strong)
    }

    #[inline]
    fn upgrade(&self) -> Option<Arc<T>> {
        sync::Weak::upgrade(self)
    }

    #[inline]
    fn is_expired(&self) -> bool {
        self.strong_count() == 0
    }
}
