//! Owning pointer to an object created through an allocator.

use std::fmt;
use std::marker::PhantomData;
use std::mem::ManuallyDrop;
use std::ops::{Deref, DerefMut};
use std::ptr::NonNull;

use super::object::{delete_object, new_object};
use super::resource::Allocator;
use crate::error::Result;

/// Owns an object allocated from `alloc` and deletes it through that same
/// allocator when dropped.
pub struct ManagedPtr<'a, T: ?Sized> {
    ptr: NonNull<T>,
    alloc: &'a dyn Allocator,
    _owns: PhantomData<T>,
}

// SAFETY: `ManagedPtr` uniquely owns its pointee; the allocator is `Sync`.
unsafe impl<T: ?Sized + Send> Send for ManagedPtr<'_, T> {}
unsafe impl<T: ?Sized + Sync> Sync for ManagedPtr<'_, T> {}

impl<'a, T> ManagedPtr<'a, T> {
    /// Moves `value` into a footprint allocated from `alloc`.
    pub fn new_in(value: T, alloc: &'a dyn Allocator) -> Result<Self> {
        let ptr = new_object(alloc, value)?;
        Ok(Self {
            ptr,
            alloc,
            _owns: PhantomData,
        })
    }
}

impl<'a, T: ?Sized> ManagedPtr<'a, T> {
    /// Takes ownership of an object created by `new_object`.
    ///
    /// # Safety
    ///
    /// `ptr` must come from `new_object`/`try_new_object` on `alloc` and must
    /// not be owned by anything else.
    pub unsafe fn from_raw(ptr: NonNull<T>, alloc: &'a dyn Allocator) -> Self {
        Self {
            ptr,
            alloc,
            _owns: PhantomData,
        }
    }

    /// Gives up ownership without deleting the object.
    pub fn release(self) -> (NonNull<T>, &'a dyn Allocator) {
        let this = ManuallyDrop::new(self);
        (this.ptr, this.alloc)
    }

    pub fn allocator(&self) -> &'a dyn Allocator {
        self.alloc
    }

    pub fn as_ptr(&self) -> NonNull<T> {
        self.ptr
    }
}

impl<T: ?Sized> Deref for ManagedPtr<'_, T> {
    type Target = T;

    fn deref(&self) -> &T {
        // SAFETY: the pointee is live for as long as `self` owns it.
        unsafe { self.ptr.as_ref() }
    }
}

impl<T: ?Sized> DerefMut for ManagedPtr<'_, T> {
    fn deref_mut(&mut self) -> &mut T {
        // SAFETY: unique ownership.
        unsafe { self.ptr.as_mut() }
    }
}

impl<T: ?Sized> Drop for ManagedPtr<'_, T> {
    fn drop(&mut self) {
        // SAFETY: created from `alloc`, owned exclusively, never used again.
        unsafe { delete_object(self.alloc, Some(self.ptr)) }
    }
}

impl<T: ?Sized + fmt::Debug> fmt::Debug for ManagedPtr<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&**self, f)
    }
}
