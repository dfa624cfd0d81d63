//! Move-only handles.

use std::fmt;
use std::ops::{Deref, DerefMut};

use allot_core::{contract, Allocator};

use crate::handle::Ref;

/// A value-owning handle that cannot be copied or shared.
///
/// Being the only path to its referent, a `Unique` hands out `&mut T`
/// through [`DerefMut`].
pub struct Unique<'a, T: ?Sized>(Ref<'a, T>);

impl<'a, T: ?Sized> Unique<'a, T> {
    pub(crate) fn new_unchecked(handle: Ref<'a, T>) -> Self {
        Self(handle)
    }

    /// Claim sole ownership of `handle`, giving it back if other owners
    /// exist or it is empty, weak or projected.
    pub fn try_from_ref(handle: Ref<'a, T>) -> Result<Self, Ref<'a, T>> {
        if handle.is_unique() {
            Ok(Self(handle))
        } else {
            Err(handle)
        }
    }

    /// Give up uniqueness, returning the plain handle.
    pub fn into_ref(self) -> Ref<'a, T> {
        self.0
    }

    /// The provider this handle is bound to.
    pub fn allocator(&self) -> Option<&'a dyn Allocator> {
        self.0.allocator()
    }
}

impl<T: ?Sized> Deref for Unique<'_, T> {
    type Target = T;

    fn deref(&self) -> &T {
        &self.0
    }
}

impl<T: ?Sized> DerefMut for Unique<'_, T> {
    fn deref_mut(&mut self) -> &mut T {
        match self.0.get_mut() {
            Some(value) => value,
            None => contract::fatal(format_args!("unique handle lost exclusive access")),
        }
    }
}

impl<T: ?Sized + fmt::Debug> fmt::Debug for Unique<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Unique").field(&&*self.0).finish()
    }
}
