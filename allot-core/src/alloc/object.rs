//! Typed construction and destruction through an [`Allocator`].
//!
//! [`try_new_object`] obtains the footprint first and only then runs the
//! initialiser. Until the value has been written, the footprint is owned by
//! a rollback guard, so an initialiser that returns `Err` or panics releases
//! the block exactly once before the failure propagates.

use std::alloc::Layout;
use std::ptr::{self, NonNull};

use super::resource::Allocator;
use crate::error::{Error, Result};

/// Owns a raw footprint until construction succeeds.
struct FootprintGuard<'a> {
    alloc: &'a dyn Allocator,
    ptr: NonNull<u8>,
    layout: Layout,
}

impl<'a> FootprintGuard<'a> {
    fn allocate(alloc: &'a dyn Allocator, layout: Layout) -> Result<Self> {
        let ptr = alloc.allocate_aligned(layout.size(), layout.align())?;
        Ok(Self { alloc, ptr, layout })
    }

    /// Disarms the guard, handing the footprint to the caller.
    fn release(self) -> NonNull<u8> {
        let ptr = self.ptr;
        std::mem::forget(self);
        ptr
    }
}

impl Drop for FootprintGuard<'_> {
    fn drop(&mut self) {
        // SAFETY: the block came from `alloc` with exactly this layout.
        unsafe {
            self.alloc
                .deallocate_aligned(self.ptr, self.layout.size(), self.layout.align())
        }
    }
}

/// Allocates a footprint for `T` from `alloc` and moves `value` into it.
pub fn new_object<T>(alloc: &dyn Allocator, value: T) -> Result<NonNull<T>> {
    try_new_object(alloc, || Ok::<T, Error>(value))
}

/// Allocates a footprint for `T` from `alloc`, then builds the value with
/// `init`.
///
/// If `init` fails or unwinds, the footprint is released before the error or
/// panic leaves this function.
pub fn try_new_object<T, E, F>(alloc: &dyn Allocator, init: F) -> Result<NonNull<T>, E>
where
    F: FnOnce() -> Result<T, E>,
    E: From<Error>,
{
    let guard = FootprintGuard::allocate(alloc, Layout::new::<T>())?;
    let value = init()?;
    let ptr = guard.release().cast::<T>();
    // SAFETY: the footprint is sized and aligned for `T` and uninitialised.
    unsafe { ptr.as_ptr().write(value) };
    Ok(ptr)
}

/// Drops the object behind `object` and releases its footprint to `alloc`.
/// Does nothing for `None`.
///
/// The footprint is taken from the pointee itself before it is dropped, so a
/// trait-object pointer releases the full concrete object.
///
/// # Safety
///
/// `object` must come from [`new_object`]/[`try_new_object`] on `alloc` (or an
/// allocator equal to it), possibly unsized afterwards, and must not be used
/// again.
pub unsafe fn delete_object<T: ?Sized>(alloc: &dyn Allocator, object: Option<NonNull<T>>) {
    let Some(object) = object else {
        return;
    };
    let layout = Layout::for_value(unsafe { object.as_ref() });
    let base = object.cast::<u8>();
    unsafe {
        ptr::drop_in_place(object.as_ptr());
        alloc.deallocate_aligned(base, layout.size(), layout.align());
    }
}

/// Like [`delete_object`] for a pointer whose static type is exactly the
/// allocated type; the footprint is computed statically.
///
/// # Safety
///
/// As for [`delete_object`], and `object` must point at a `T` that was
/// allocated as a `T`.
pub unsafe fn delete_object_raw<T>(alloc: &dyn Allocator, object: Option<NonNull<T>>) {
    let Some(object) = object else {
        return;
    };
    let layout = Layout::new::<T>();
    unsafe {
        ptr::drop_in_place(object.as_ptr());
        alloc.deallocate_aligned(object.cast(), layout.size(), layout.align());
    }
}
