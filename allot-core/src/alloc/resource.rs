//! The memory-resource capability and its `Allocator` refinement.

use std::alloc::Layout;
use std::ptr::{self, NonNull};

use crate::error::{Error, Result};

/// Alignment used by [`Allocator::allocate`]; sufficient for any scalar type.
pub const MAX_ALIGN: usize = 16;

/// Largest alignment any allocator in this crate will honour.
pub const MAX_SUPPORTED_ALIGN: usize = 4096;

#[repr(C, align(4096))]
struct ZeroSizeBlock([u8; 0]);

static ZERO_SIZE_BLOCK: ZeroSizeBlock = ZeroSizeBlock([]);

/// The non-null sentinel returned for zero-byte requests.
///
/// It is aligned to [`MAX_SUPPORTED_ALIGN`], is never dereferenced, and may be
/// handed back to `deallocate` with a size of zero.
#[inline]
pub fn zero_size_block() -> NonNull<u8> {
    NonNull::from(&ZERO_SIZE_BLOCK).cast()
}

#[inline]
pub fn is_zero_size_block(ptr: NonNull<u8>) -> bool {
    ptr == zero_size_block()
}

/// Validates a `(size, align)` request, returning its `Layout`.
pub(crate) fn checked_layout(size: usize, align: usize) -> Result<Layout> {
    if align > MAX_SUPPORTED_ALIGN {
        return Err(Error::allocation(size, align));
    }
    Layout::from_size_align(size, align).map_err(|_| Error::allocation(size, align))
}

/// Raw allocate/deallocate capability plus resource equality.
///
/// Implementations must be thread-safe: an allocator may be shared by any
/// number of objects living on any number of threads.
pub trait MemoryResource: Send + Sync {
    /// Returns a block of at least `size` bytes aligned to `align`.
    ///
    /// A zero-byte request is still a call the resource observes; it may
    /// return [`zero_size_block`].
    fn allocate_aligned(&self, size: usize, align: usize) -> Result<NonNull<u8>>;

    /// Releases a block obtained from `allocate_aligned` on this resource.
    ///
    /// # Safety
    ///
    /// `ptr` must have been returned by this resource (or one that
    /// `is_equal` to it) with exactly this `size` and `align`, and must not
    /// have been released already.
    unsafe fn deallocate_aligned(&self, ptr: NonNull<u8>, size: usize, align: usize);

    /// Whether memory from `other` may be released through `self`.
    ///
    /// Defaults to identity.
    fn is_equal(&self, other: &dyn MemoryResource) -> bool {
        ptr::addr_eq(self as *const Self, other as *const dyn MemoryResource)
    }
}

/// A [`MemoryResource`] that can also allocate by size alone and release
/// blocks without being told their size.
pub trait Allocator: MemoryResource {
    /// Returns a block of at least `size` bytes aligned to [`MAX_ALIGN`].
    fn allocate(&self, size: usize) -> Result<NonNull<u8>> {
        self.allocate_aligned(size, MAX_ALIGN)
    }

    /// Releases a block without its size; the allocator recovers the
    /// footprint itself.
    ///
    /// # Safety
    ///
    /// `ptr` must have been returned by `allocate` (or `allocate_aligned`)
    /// on this allocator and not released already.
    unsafe fn deallocate(&self, ptr: NonNull<u8>);

    /// Upcast used for [`MemoryResource::is_equal`] comparisons.
    fn as_resource(&self) -> &dyn MemoryResource;

    /// Human readable name used in logs and statistics.
    fn name(&self) -> &str {
        "allocator"
    }
}

/// Returns whether `a` and `b` are interchangeable for deallocation.
#[inline]
pub fn allocator_eq(a: &dyn Allocator, b: &dyn Allocator) -> bool {
    a.is_equal(b.as_resource())
}
