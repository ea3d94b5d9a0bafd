//! ## allot-core::string
//! **Allocator-aware text buffer**
//!
//! Short strings live inline and never allocate. Longer strings are stored in
//! a block obtained from the string's allocator, which is fixed when the
//! string is built and never changes afterwards.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::mem;
use std::ops::Deref;
use std::ptr::{self, NonNull};

use crate::alloc::{allocator_eq, Allocator, AllocatorHandle};
use crate::error::Result;

/// Longest string stored without allocating.
pub const INLINE_CAPACITY: usize = 19;

enum Repr {
    Inline {
        len: u8,
        buf: [u8; INLINE_CAPACITY],
    },
    Heap {
        ptr: NonNull<u8>,
        len: usize,
        cap: usize,
    },
}

impl Repr {
    const EMPTY: Repr = Repr::Inline {
        len: 0,
        buf: [0; INLINE_CAPACITY],
    };

    fn as_bytes(&self) -> &[u8] {
        match self {
            Repr::Inline { len, buf } => &buf[..*len as usize],
            // SAFETY: `ptr` owns `cap >= len` initialised-up-to-`len` bytes.
            Repr::Heap { ptr, len, .. } => unsafe {
                std::slice::from_raw_parts(ptr.as_ptr(), *len)
            },
        }
    }

    fn capacity(&self) -> usize {
        match self {
            Repr::Inline { .. } => INLINE_CAPACITY,
            Repr::Heap { cap, .. } => *cap,
        }
    }
}

/// A UTF-8 string whose heap storage comes from a caller-chosen allocator.
pub struct AllocString<'a> {
    repr: Repr,
    alloc: &'a dyn Allocator,
}

// SAFETY: the heap block is uniquely owned; allocators are `Send + Sync`.
unsafe impl Send for AllocString<'_> {}
unsafe impl Sync for AllocString<'_> {}

impl<'a> AllocString<'a> {
    /// An empty string; never allocates.
    pub fn new_in(alloc: impl Into<AllocatorHandle<'a>>) -> Self {
        Self {
            repr: Repr::EMPTY,
            alloc: alloc.into().resolve(),
        }
    }

    pub fn try_from_str_in(value: &str, alloc: impl Into<AllocatorHandle<'a>>) -> Result<Self> {
        let mut out = Self::new_in(alloc);
        out.assign(value)?;
        Ok(out)
    }

    /// Copies `self` into a new string using `alloc` (default when the
    /// handle is empty), never `self`'s allocator implicitly.
    pub fn try_clone_in(&self, alloc: impl Into<AllocatorHandle<'a>>) -> Result<Self> {
        Self::try_from_str_in(self.as_str(), alloc)
    }

    #[inline]
    pub fn allocator(&self) -> &'a dyn Allocator {
        self.alloc
    }

    #[inline]
    pub fn as_str(&self) -> &str {
        // SAFETY: only ever written from `&str`.
        unsafe { std::str::from_utf8_unchecked(self.repr.as_bytes()) }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.repr.as_bytes().len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.repr.capacity()
    }

    /// Replaces the contents with `value`.
    ///
    /// Reuses the current buffer when it is large enough. Otherwise the new
    /// buffer is obtained before the old one is released, so on
    /// allocation failure `self` is unchanged.
    pub fn assign(&mut self, value: &str) -> Result<()> {
        let bytes = value.as_bytes();
        match &mut self.repr {
            Repr::Inline { len, buf } if bytes.len() <= INLINE_CAPACITY => {
                buf[..bytes.len()].copy_from_slice(bytes);
                *len = bytes.len() as u8;
                return Ok(());
            }
            Repr::Heap { ptr, len, cap } if bytes.len() <= *cap => {
                // SAFETY: `cap >= bytes.len()` and `value` cannot alias a
                // buffer we hold mutably.
                unsafe { ptr::copy_nonoverlapping(bytes.as_ptr(), ptr.as_ptr(), bytes.len()) };
                *len = bytes.len();
                return Ok(());
            }
            _ => {}
        }

        let cap = bytes.len().max(self.capacity().saturating_mul(2));
        let new_ptr = self.alloc.allocate(cap)?;
        // SAFETY: fresh block of `cap >= bytes.len()` bytes.
        unsafe { ptr::copy_nonoverlapping(bytes.as_ptr(), new_ptr.as_ptr(), bytes.len()) };

        let old = mem::replace(
            &mut self.repr,
            Repr::Heap {
                ptr: new_ptr,
                len: bytes.len(),
                cap,
            },
        );
        self.free(old);
        Ok(())
    }

    /// Empties the string, keeping its buffer.
    pub fn clear(&mut self) {
        match &mut self.repr {
            Repr::Inline { len, .. } => *len = 0,
            Repr::Heap { len, .. } => *len = 0,
        }
    }

    /// Moves the contents into a new string that uses the same allocator,
    /// leaving `self` empty. Never allocates.
    pub fn take(&mut self) -> Self {
        Self {
            repr: mem::replace(&mut self.repr, Repr::EMPTY),
            alloc: self.alloc,
        }
    }

    /// Exchanges contents with `other`; neither allocator changes.
    ///
    /// # Panics
    ///
    /// If the two strings do not use equal allocators.
    pub fn swap_same_allocator(&mut self, other: &mut Self) {
        assert!(
            allocator_eq(self.alloc, other.alloc),
            "swap requires both strings to use the same allocator"
        );
        mem::swap(&mut self.repr, &mut other.repr);
    }

    fn free(&self, repr: Repr) {
        if let Repr::Heap { ptr, .. } = repr {
            // SAFETY: heap blocks are only ever allocated from `self.alloc`
            // (or an allocator equal to it, via `swap_same_allocator`).
            unsafe { self.alloc.deallocate(ptr) };
        }
    }
}

impl Drop for AllocString<'_> {
    fn drop(&mut self) {
        let repr = mem::replace(&mut self.repr, Repr::EMPTY);
        self.free(repr);
    }
}

impl Deref for AllocString<'_> {
    type Target = str;

    fn deref(&self) -> &str {
        self.as_str()
    }
}

impl PartialEq for AllocString<'_> {
    fn eq(&self, other: &Self) -> bool {
        self.as_str() == other.as_str()
    }
}

impl Eq for AllocString<'_> {}

impl PartialEq<str> for AllocString<'_> {
    fn eq(&self, other: &str) -> bool {
        self.as_str() == other
    }
}

impl PartialEq<&str> for AllocString<'_> {
    fn eq(&self, other: &&str) -> bool {
        self.as_str() == *other
    }
}

impl Hash for AllocString<'_> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.as_str().hash(state)
    }
}

impl fmt::Debug for AllocString<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self.as_str(), f)
    }
}

impl fmt::Display for AllocString<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl serde::Serialize for AllocString<'_> {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::alloc::TestAllocator;

    const LONG: &str = "a_sufficiently_long_string_that_will_allocate";

    #[test]
    fn short_strings_do_not_allocate() {
        let ta = TestAllocator::new("short");
        let s = AllocString::try_from_str_in("EDT", &ta).unwrap();
        assert_eq!(s, "EDT");
        assert_eq!(s.capacity(), INLINE_CAPACITY);
        assert_eq!(ta.num_allocations(), 0);
    }

    #[test]
    fn long_strings_allocate_from_their_allocator() {
        let ta = TestAllocator::new("long");
        {
            let s = AllocString::try_from_str_in(LONG, &ta).unwrap();
            assert_eq!(s.as_str(), LONG);
            assert_eq!(ta.num_blocks_in_use(), 1);
        }
        assert!(ta.status().is_ok());
    }

    #[test]
    fn assign_reuses_capacity() {
        let ta = TestAllocator::new("reuse");
        let mut s = AllocString::try_from_str_in(LONG, &ta).unwrap();
        s.assign("short").unwrap();
        s.assign(&LONG[1..]).unwrap();
        assert_eq!(ta.num_blocks_total(), 1);
        assert_eq!(s, &LONG[1..]);
    }

    #[test]
    fn failed_growth_leaves_value_unchanged() {
        let ta = TestAllocator::new("strong");
        let mut s = AllocString::try_from_str_in("keep", &ta).unwrap();
        ta.set_allocation_limit(Some(0));
        assert!(s.assign(LONG).unwrap_err().is_allocation_failure());
        assert_eq!(s, "keep");
        ta.set_allocation_limit(None);
    }

    #[test]
    fn take_transfers_without_allocating() {
        let ta = TestAllocator::new("take");
        let mut src = AllocString::try_from_str_in(LONG, &ta).unwrap();
        let moved = src.take();
        assert_eq!(moved, LONG);
        assert!(src.is_empty());
        assert_eq!(ta.num_allocations(), 1);
        assert!(allocator_eq(moved.allocator(), &ta));
    }

    #[test]
    fn clone_in_uses_the_requested_allocator() {
        let a = TestAllocator::new("a");
        let b = TestAllocator::new("b");
        let src = AllocString::try_from_str_in(LONG, &a).unwrap();
        let copy = src.try_clone_in(&b).unwrap();
        assert_eq!(copy, src);
        assert!(allocator_eq(copy.allocator(), &b));
        assert_eq!(b.num_blocks_in_use(), 1);
    }

    #[test]
    #[should_panic(expected = "same allocator")]
    fn swap_across_allocators_panics() {
        let a = TestAllocator::new("a");
        let b = TestAllocator::new("b");
        let mut x = AllocString::new_in(&a);
        let mut y = AllocString::new_in(&b);
        x.swap_same_allocator(&mut y);
    }

    proptest::proptest! {
        #[test]
        fn assign_sequence_matches_last_value(values in proptest::collection::vec(".{0,48}", 1..8)) {
            let ta = TestAllocator::new("sequence");
            {
                let mut s = AllocString::new_in(&ta);
                for value in &values {
                    s.assign(value).unwrap();
                    proptest::prop_assert_eq!(s.as_str(), value.as_str());
                    proptest::prop_assert!(s.capacity() >= s.len());
                }
                proptest::prop_assert!(ta.num_blocks_in_use() <= 1);
            }
            proptest::prop_assert!(ta.status().is_ok());
        }
    }
}
