//! ## allot-types::fixed_array
//! **Fixed-length, allocator-propagating container**
//!
//! [`FixedArray`] wraps `[T; N]`. It never allocates on its own behalf; for
//! allocator-aware elements every copy, move and swap is forwarded to the
//! elements with the allocator the caller supplies.
//!
//! Element-wise *construction* is all-or-nothing: elements are built into an
//! uninitialised buffer and the already-built prefix is dropped if a later
//! element fails. Element-wise *assignment* is best-effort: elements before
//! the failing index keep their new values.

use std::mem::MaybeUninit;
use std::ops::{Index, IndexMut};
use std::ptr;
use std::slice;

use allot_core::alloc::{allocator_eq, AllocatorHandle};
use allot_core::aware::{self, AllocatorAware};
use allot_core::{Error, Result};

#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub struct FixedArray<T, const N: usize> {
    elements: [T; N],
}

/// A partially initialised `[T; N]` that drops only what it has built.
struct PartialArray<T, const N: usize> {
    slots: [MaybeUninit<T>; N],
    initialized: usize,
}

impl<T, const N: usize> PartialArray<T, N> {
    fn new() -> Self {
        Self {
            // SAFETY: an array of `MaybeUninit` needs no initialisation.
            slots: unsafe { MaybeUninit::<[MaybeUninit<T>; N]>::uninit().assume_init() },
            initialized: 0,
        }
    }

    fn push(&mut self, value: T) {
        debug_assert!(self.initialized < N);
        self.slots[self.initialized].write(value);
        self.initialized += 1;
    }

    fn finish(mut self) -> [T; N] {
        debug_assert_eq!(self.initialized, N);
        self.initialized = 0;
        // SAFETY: every slot was written; `initialized` is reset so the
        // drop below releases nothing.
        unsafe { ptr::read(&self.slots as *const [MaybeUninit<T>; N] as *const [T; N]) }
    }
}

impl<T, const N: usize> Drop for PartialArray<T, N> {
    fn drop(&mut self) {
        for slot in &mut self.slots[..self.initialized] {
            // SAFETY: slots below `initialized` hold live values.
            unsafe { slot.assume_init_drop() };
        }
    }
}

fn try_build<T, const N: usize>(mut make: impl FnMut(usize) -> Result<T>) -> Result<[T; N]> {
    let mut partial = PartialArray::<T, N>::new();
    for i in 0..N {
        partial.push(make(i)?);
    }
    Ok(partial.finish())
}

impl<T, const N: usize> FixedArray<T, N> {
    #[inline]
    pub const fn from_array(elements: [T; N]) -> Self {
        Self { elements }
    }

    #[inline]
    pub fn into_inner(self) -> [T; N] {
        self.elements
    }

    #[inline]
    pub const fn len(&self) -> usize {
        N
    }

    #[inline]
    pub const fn is_empty(&self) -> bool {
        N == 0
    }

    /// Checked access.
    pub fn at(&self, index: usize) -> Result<&T> {
        self.elements
            .get(index)
            .ok_or(Error::OutOfRange { index, len: N })
    }

    pub fn at_mut(&mut self, index: usize) -> Result<&mut T> {
        self.elements
            .get_mut(index)
            .ok_or(Error::OutOfRange { index, len: N })
    }

    #[inline]
    pub fn front(&self) -> Option<&T> {
        self.elements.first()
    }

    #[inline]
    pub fn back(&self) -> Option<&T> {
        self.elements.last()
    }

    #[inline]
    pub fn as_slice(&self) -> &[T] {
        &self.elements
    }

    #[inline]
    pub fn as_mut_slice(&mut self) -> &mut [T] {
        &mut self.elements
    }

    #[inline]
    pub fn iter(&self) -> slice::Iter<'_, T> {
        self.elements.iter()
    }

    #[inline]
    pub fn iter_mut(&mut self) -> slice::IterMut<'_, T> {
        self.elements.iter_mut()
    }

    /// Sets every element to a copy of `value`. Elements keep their
    /// allocators (`Clone::clone_from`).
    pub fn fill(&mut self, value: &T)
    where
        T: Clone,
    {
        for element in &mut self.elements {
            element.clone_from(value);
        }
    }
}

impl<T: Default, const N: usize> Default for FixedArray<T, N> {
    fn default() -> Self {
        Self::from_array(std::array::from_fn(|_| T::default()))
    }
}

impl<'a, T: AllocatorAware<'a>, const N: usize> FixedArray<T, N> {
    /// Every element default-valued with `alloc` (the default allocator is
    /// resolved once for the whole array).
    pub fn default_in(alloc: AllocatorHandle<'a>) -> Self {
        let alloc = AllocatorHandle::new(alloc.resolve());
        Self::from_array(std::array::from_fn(|_| T::default_in(alloc)))
    }

    /// Copies every element into `alloc`. On error nothing is left behind.
    pub fn try_clone_in(&self, alloc: AllocatorHandle<'a>) -> Result<Self> {
        let alloc = AllocatorHandle::new(alloc.resolve());
        try_build(|i| self.elements[i].try_clone_in(alloc)).map(Self::from_array)
    }

    /// Moves every element out; each keeps its own allocator and the source
    /// elements are left default-valued.
    pub fn take(&mut self) -> Self {
        Self::from_array(std::array::from_fn(|i| self.elements[i].take()))
    }

    /// Moves into `alloc`: elements already using `alloc` are transferred,
    /// the rest are copied. All copies are made first, so on error `self` is
    /// unchanged.
    pub fn take_in(&mut self, alloc: AllocatorHandle<'a>) -> Result<Self> {
        let alloc = alloc.resolve();
        let handle = AllocatorHandle::new(alloc);
        let mut copies: [Option<T>; N] = try_build(|i| {
            let element = &self.elements[i];
            if allocator_eq(element.allocator(), alloc) {
                Ok(None)
            } else {
                element.try_clone_in(handle).map(Some)
            }
        })?;
        Ok(Self::from_array(std::array::from_fn(|i| {
            match copies[i].take() {
                Some(copy) => copy,
                None => self.elements[i].take(),
            }
        })))
    }

    /// Element-wise copy assignment in index order; stops at the first
    /// failure.
    pub fn assign(&mut self, rhs: &Self) -> Result<()> {
        for (target, source) in self.elements.iter_mut().zip(rhs.elements.iter()) {
            target.assign(source)?;
        }
        Ok(())
    }

    /// Element-wise move assignment in index order; stops at the first
    /// failure.
    pub fn assign_from(&mut self, rhs: &mut Self) -> Result<()> {
        for (target, source) in self.elements.iter_mut().zip(rhs.elements.iter_mut()) {
            target.assign_from(source)?;
        }
        Ok(())
    }

    /// # Panics
    ///
    /// If any pair of corresponding elements uses different allocators.
    /// Every pair is checked first, so on panic neither array has changed.
    pub fn swap_same_allocator(&mut self, other: &mut Self) {
        assert!(
            self.elements
                .iter()
                .zip(other.elements.iter())
                .all(|(a, b)| allocator_eq(a.allocator(), b.allocator())),
            "swap requires every element pair to use the same allocator"
        );
        for (a, b) in self.elements.iter_mut().zip(other.elements.iter_mut()) {
            a.swap_same_allocator(b);
        }
    }
}

/// Element-wise [`allot_core::aware::swap`]; stops at the first failure.
pub fn swap<'a, T: AllocatorAware<'a>, const N: usize>(
    a: &mut FixedArray<T, N>,
    b: &mut FixedArray<T, N>,
) -> Result<()> {
    for (x, y) in a.elements.iter_mut().zip(b.elements.iter_mut()) {
        aware::swap(x, y)?;
    }
    Ok(())
}

impl<T, const N: usize> From<[T; N]> for FixedArray<T, N> {
    fn from(elements: [T; N]) -> Self {
        Self::from_array(elements)
    }
}

impl<T, const N: usize> Index<usize> for FixedArray<T, N> {
    type Output = T;

    fn index(&self, index: usize) -> &T {
        assert!(index < N, "index {index} out of range for FixedArray of length {N}");
        &self.elements[index]
    }
}

impl<T, const N: usize> IndexMut<usize> for FixedArray<T, N> {
    fn index_mut(&mut self, index: usize) -> &mut T {
        assert!(index < N, "index {index} out of range for FixedArray of length {N}");
        &mut self.elements[index]
    }
}

impl<'s, T, const N: usize> IntoIterator for &'s FixedArray<T, N> {
    type Item = &'s T;
    type IntoIter = slice::Iter<'s, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<'s, T, const N: usize> IntoIterator for &'s mut FixedArray<T, N> {
    type Item = &'s mut T;
    type IntoIter = slice::IterMut<'s, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter_mut()
    }
}

impl<T, const N: usize> IntoIterator for FixedArray<T, N> {
    type Item = T;
    type IntoIter = std::array::IntoIter<T, N>;

    fn into_iter(self) -> Self::IntoIter {
        self.elements.into_iter()
    }
}
