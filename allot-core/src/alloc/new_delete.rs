//! Heap-backed allocator used whenever no default has been installed.

use std::alloc::{self as heap, Layout};
use std::mem;
use std::ptr::NonNull;

use super::resource::{
    checked_layout, is_zero_size_block, zero_size_block, Allocator, MemoryResource, MAX_ALIGN,
};
use crate::error::{Error, Result};

/// Bytes reserved in front of every block for its `(size, align)` record.
const HEADER: usize = MAX_ALIGN;

const _: () = assert!(2 * mem::size_of::<usize>() <= HEADER);

/// Allocator backed by the global Rust heap.
///
/// Each block carries a small header recording its requested size and
/// alignment so that [`Allocator::deallocate`] needs only the address.
pub struct NewDeleteAllocator {
    _priv: (),
}

static NEW_DELETE: NewDeleteAllocator = NewDeleteAllocator { _priv: () };

impl NewDeleteAllocator {
    /// The process-wide instance.
    #[inline]
    pub fn singleton() -> &'static NewDeleteAllocator {
        &NEW_DELETE
    }

    #[inline]
    fn offset_for(align: usize) -> usize {
        align.max(HEADER)
    }

    fn outer_layout(size: usize, align: usize) -> Result<Layout> {
        let offset = Self::offset_for(align);
        let total = size
            .checked_add(offset)
            .ok_or(Error::allocation(size, align))?;
        checked_layout(total, align.max(MAX_ALIGN))
    }

    /// # Safety
    ///
    /// `ptr` must be a non-sentinel block returned by this allocator.
    unsafe fn read_header(ptr: NonNull<u8>) -> (usize, usize) {
        let header = unsafe { ptr.as_ptr().sub(HEADER) } as *const usize;
        unsafe { (header.read(), header.add(1).read()) }
    }

    /// # Safety
    ///
    /// `ptr` must be a live, non-sentinel block returned by this allocator.
    unsafe fn release(ptr: NonNull<u8>) {
        let (size, align) = unsafe { Self::read_header(ptr) };
        let offset = Self::offset_for(align);
        // The layout was valid when the block was handed out.
        if let Ok(layout) = Self::outer_layout(size, align) {
            unsafe { heap::dealloc(ptr.as_ptr().sub(offset), layout) };
        }
    }
}

impl MemoryResource for NewDeleteAllocator {
    fn allocate_aligned(&self, size: usize, align: usize) -> Result<NonNull<u8>> {
        checked_layout(size, align)?;
        if size == 0 {
            return Ok(zero_size_block());
        }

        let layout = Self::outer_layout(size, align)?;
        let offset = Self::offset_for(align);

        // SAFETY: `layout` has a non-zero size.
        let base = unsafe { heap::alloc(layout) };
        let base = NonNull::new(base).ok_or(Error::allocation(size, align))?;

        // SAFETY: `offset >= HEADER` and the block spans `offset + size` bytes,
        // so both the header and the user region are in bounds.
        unsafe {
            let user = base.as_ptr().add(offset);
            let header = user.sub(HEADER) as *mut usize;
            header.write(size);
            header.add(1).write(align);
            Ok(NonNull::new_unchecked(user))
        }
    }

    unsafe fn deallocate_aligned(&self, ptr: NonNull<u8>, size: usize, align: usize) {
        if is_zero_size_block(ptr) {
            return;
        }
        debug_assert_eq!(
            unsafe { Self::read_header(ptr) },
            (size, align),
            "deallocate_aligned called with a mismatched footprint"
        );
        unsafe { Self::release(ptr) }
    }
}

impl Allocator for NewDeleteAllocator {
    unsafe fn deallocate(&self, ptr: NonNull<u8>) {
        if is_zero_size_block(ptr) {
            return;
        }
        unsafe { Self::release(ptr) }
    }

    fn as_resource(&self) -> &dyn MemoryResource {
        self
    }

    fn name(&self) -> &str {
        "new_delete"
    }
}
