//! Non-owning and conditionally-owning views of a handle's referent.

use std::fmt;
use std::marker::PhantomData;
use std::ops::Deref;

use crate::handle::Ref;
use crate::role::Role;

/// Weak view of a referent owned by another handle.
///
/// Borrows the owning handle for `'h`, so the view cannot outlive the
/// value it observes. Dropping it never releases anything.
pub struct WeakRef<'h, 'a, T: ?Sized> {
    view: Ref<'a, T>,
    _owner: PhantomData<&'h Ref<'a, T>>,
}

impl<'h, 'a, T: ?Sized> WeakRef<'h, 'a, T> {
    pub(crate) fn new(view: Ref<'a, T>) -> Self {
        debug_assert_eq!(view.role(), Role::Weak);
        Self {
            view,
            _owner: PhantomData,
        }
    }

    /// Always [`Role::Weak`].
    pub fn role(&self) -> Role {
        self.view.role()
    }

    /// Whether the observed handle was empty.
    pub fn is_empty(&self) -> bool {
        self.view.is_empty()
    }

    /// Shared reference to the referent, or `None` if empty.
    pub fn get(&self) -> Option<&T> {
        self.view.get()
    }
}

impl<T: ?Sized> Deref for WeakRef<'_, '_, T> {
    type Target = T;

    fn deref(&self) -> &T {
        &self.view
    }
}

impl<T: ?Sized + fmt::Debug> fmt::Debug for WeakRef<'_, '_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("WeakRef").field(&self.view).finish()
    }
}

/// Result of converting a handle to another reference to the same
/// referent: a shared owner when the provider can share, else a weak view.
pub enum Alias<'h, 'a, T: ?Sized> {
    /// Independent shared owner; may outlive the source handle.
    Shared(Ref<'a, T>),
    /// Weak view bound to the source handle.
    Weak(WeakRef<'h, 'a, T>),
}

impl<'h, 'a, T: ?Sized> Alias<'h, 'a, T> {
    /// Role of the alias.
    pub fn role(&self) -> Role {
        match self {
            Alias::Shared(r) => r.role(),
            Alias::Weak(w) => w.role(),
        }
    }

    /// Whether sharing succeeded.
    pub fn is_shared(&self) -> bool {
        matches!(self, Alias::Shared(_))
    }

    /// Whether the conversion fell back to a weak view.
    pub fn is_weak(&self) -> bool {
        matches!(self, Alias::Weak(_))
    }

    /// The shared owner, dropping a weak view.
    pub fn into_shared(self) -> Option<Ref<'a, T>> {
        match self {
            Alias::Shared(r) => Some(r),
            Alias::Weak(_) => None,
        }
    }

    /// Shared reference to the referent, or `None` if empty.
    pub fn get(&self) -> Option<&T> {
        match self {
            Alias::Shared(r) => r.get(),
            Alias::Weak(w) => w.get(),
        }
    }
}

impl<T: ?Sized> Deref for Alias<'_, '_, T> {
    type Target = T;

    fn deref(&self) -> &T {
        match self {
            Alias::Shared(r) => &**r,
            Alias::Weak(w) => &**w,
        }
    }
}

impl<T: ?Sized + fmt::Debug> fmt::Debug for Alias<'_, '_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Alias::Shared(r) => f.debug_tuple("Shared").field(r).finish(),
            Alias::Weak(w) => f.debug_tuple("Weak").field(w).finish(),
        }
    }
}
