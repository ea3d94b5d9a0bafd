//! ## allot-core::aware
//! **Allocator propagation protocol**
//!
//! Rules every allocator-aware type follows:
//! - an object's allocator is chosen once, at construction, and never changes;
//! - copying (`try_clone_in`) uses the allocator it is given, or the default
//!   allocator when given none, never the source's;
//! - `take` moves the payload into a new object that adopts the source's
//!   allocator, without allocating, and leaves the source default-valued;
//! - `take_in` / `assign_from` transfer only between equal allocators and
//!   otherwise fall back to copying, leaving the source untouched;
//! - `swap_same_allocator` requires equal allocators; the free [`swap`] does not.

use crate::alloc::{allocator_eq, Allocator, AllocatorHandle};
use crate::error::Result;

pub trait AllocatorAware<'a>: Sized {
    /// The allocator captured at construction.
    fn allocator(&self) -> &'a dyn Allocator;

    /// A default-valued object using `alloc`.
    fn default_in(alloc: AllocatorHandle<'a>) -> Self;

    /// Copy construction with an explicit (or, if empty, default) allocator.
    fn try_clone_in(&self, alloc: AllocatorHandle<'a>) -> Result<Self>;

    /// Move construction without an allocator: the result uses `self`'s
    /// allocator and `self` is left default-valued.
    fn take(&mut self) -> Self;

    /// Copy assignment. The target keeps its allocator; on error the target
    /// keeps its original value.
    fn assign(&mut self, rhs: &Self) -> Result<()>;

    /// Exchanges values with `other` without allocating.
    ///
    /// # Panics
    ///
    /// If the allocators are not equal.
    fn swap_same_allocator(&mut self, other: &mut Self);

    /// Move construction with an allocator: transfers when `alloc` equals
    /// `self`'s allocator, otherwise copies and leaves `self` unchanged.
    fn take_in(&mut self, alloc: AllocatorHandle<'a>) -> Result<Self> {
        let alloc = alloc.resolve();
        if allocator_eq(alloc, self.allocator()) {
            Ok(self.take())
        } else {
            self.try_clone_in(AllocatorHandle::new(alloc))
        }
    }

    /// Move assignment: transfers when the allocators are equal (leaving
    /// `rhs` default-valued), otherwise copies (leaving `rhs` unchanged).
    fn assign_from(&mut self, rhs: &mut Self) -> Result<()> {
        if allocator_eq(self.allocator(), rhs.allocator()) {
            self.swap_same_allocator(rhs);
            drop(rhs.take());
            Ok(())
        } else {
            self.assign(rhs)
        }
    }
}

/// Exchanges the values of `a` and `b`, whatever their allocators.
///
/// With equal allocators this is [`AllocatorAware::swap_same_allocator`].
/// Otherwise each side receives a copy made with its own allocator; both
/// copies are made before either object is touched, so on error neither
/// value has changed.
pub fn swap<'a, T: AllocatorAware<'a>>(a: &mut T, b: &mut T) -> Result<()> {
    if allocator_eq(a.allocator(), b.allocator()) {
        a.swap_same_allocator(b);
        return Ok(());
    }

    let mut future_a = b.try_clone_in(AllocatorHandle::new(a.allocator()))?;
    let mut future_b = a.try_clone_in(AllocatorHandle::new(b.allocator()))?;
    a.swap_same_allocator(&mut future_a);
    b.swap_same_allocator(&mut future_b);
    Ok(())
}

impl<'a> AllocatorAware<'a> for crate::string::AllocString<'a> {
    fn allocator(&self) -> &'a dyn Allocator {
        crate::string::AllocString::allocator(self)
    }

    fn default_in(alloc: AllocatorHandle<'a>) -> Self {
        Self::new_in(alloc)
    }

    fn try_clone_in(&self, alloc: AllocatorHandle<'a>) -> Result<Self> {
        crate::string::AllocString::try_clone_in(self, alloc)
    }

    fn take(&mut self) -> Self {
        crate::string::AllocString::take(self)
    }

    fn assign(&mut self, rhs: &Self) -> Result<()> {
        crate::string::AllocString::assign(self, rhs.as_str())
    }

    fn swap_same_allocator(&mut self, other: &mut Self) {
        crate::string::AllocString::swap_same_allocator(self, other)
    }
}
