//! ## allot-core::alloc::test_allocator
//! **Instrumented allocator for verifying allocation behaviour**
//!
//! Tracks every outstanding block, counts calls, detects mismatched or
//! unknown deallocations and can be told to fail after a number of
//! successful allocations so that error paths can be driven exhaustively.

use std::alloc::{self as heap, Layout};
use std::collections::HashMap;
use std::ptr::NonNull;

use parking_lot::Mutex;
use tracing::{debug, error};

use super::resource::{
    checked_layout, is_zero_size_block, zero_size_block, Allocator, MemoryResource,
};
use super::stats::AllocatorStats;
use crate::error::{Error, Result};

/// Pattern written over released memory to expose use-after-free.
const SCRIBBLE: u8 = 0xa5;

#[derive(Default)]
struct State {
    blocks: HashMap<usize, Layout>,
    num_allocations: u64,
    num_deallocations: u64,
    num_blocks_in_use: usize,
    num_bytes_in_use: usize,
    num_blocks_max: usize,
    num_bytes_max: usize,
    num_blocks_total: usize,
    num_bytes_total: usize,
    num_mismatches: usize,
    last_allocated_bytes: usize,
    last_deallocated_bytes: usize,
    allocation_limit: Option<usize>,
}

/// Instrumented allocator.
pub struct TestAllocator {
    name: String,
    state: Mutex<State>,
}

impl TestAllocator {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            state: Mutex::new(State::default()),
        }
    }

    /// Allows the next `limit` allocations to succeed; every one after that
    /// fails with [`Error::AllocationFailure`]. `None` removes the limit.
    pub fn set_allocation_limit(&self, limit: Option<usize>) {
        self.state.lock().allocation_limit = limit;
    }

    pub fn allocation_limit(&self) -> Option<usize> {
        self.state.lock().allocation_limit
    }

    pub fn num_allocations(&self) -> u64 {
        self.state.lock().num_allocations
    }

    pub fn num_deallocations(&self) -> u64 {
        self.state.lock().num_deallocations
    }

    pub fn num_blocks_in_use(&self) -> usize {
        self.state.lock().num_blocks_in_use
    }

    pub fn num_bytes_in_use(&self) -> usize {
        self.state.lock().num_bytes_in_use
    }

    pub fn num_blocks_total(&self) -> usize {
        self.state.lock().num_blocks_total
    }

    pub fn num_mismatches(&self) -> usize {
        self.state.lock().num_mismatches
    }

    pub fn last_allocated_bytes(&self) -> usize {
        self.state.lock().last_allocated_bytes
    }

    pub fn last_deallocated_bytes(&self) -> usize {
        self.state.lock().last_deallocated_bytes
    }

    pub fn stats(&self) -> AllocatorStats {
        let state = self.state.lock();
        AllocatorStats {
            name: self.name.clone(),
            num_allocations: state.num_allocations,
            num_deallocations: state.num_deallocations,
            num_blocks_in_use: state.num_blocks_in_use,
            num_bytes_in_use: state.num_bytes_in_use,
            num_blocks_max: state.num_blocks_max,
            num_bytes_max: state.num_bytes_max,
            num_blocks_total: state.num_blocks_total,
            num_bytes_total: state.num_bytes_total,
            num_mismatches: state.num_mismatches,
        }
    }

    /// `Err(Error::Leak)` while any block is outstanding.
    pub fn status(&self) -> Result<()> {
        let state = self.state.lock();
        if state.num_blocks_in_use == 0 {
            Ok(())
        } else {
            Err(Error::Leak {
                name: self.name.clone(),
                blocks: state.num_blocks_in_use,
                bytes: state.num_bytes_in_use,
            })
        }
    }

    fn release(&self, ptr: NonNull<u8>, expected: Option<Layout>) {
        let mut state = self.state.lock();
        state.num_deallocations += 1;

        if is_zero_size_block(ptr) {
            state.last_deallocated_bytes = 0;
            debug!(allocator = %self.name, "deallocate zero-size block");
            return;
        }

        let addr = ptr.as_ptr() as usize;
        let Some(layout) = state.blocks.remove(&addr) else {
            state.num_mismatches += 1;
            error!(allocator = %self.name, addr, "deallocation of a block this allocator does not own");
            return;
        };

        if let Some(expected) = expected {
            if expected != layout {
                state.num_mismatches += 1;
                error!(
                    allocator = %self.name,
                    addr,
                    size = layout.size(),
                    align = layout.align(),
                    passed_size = expected.size(),
                    passed_align = expected.align(),
                    "deallocation with a mismatched footprint"
                );
            }
        }

        state.num_blocks_in_use -= 1;
        state.num_bytes_in_use -= layout.size();
        state.last_deallocated_bytes = layout.size();
        drop(state);

        debug!(allocator = %self.name, addr, size = layout.size(), "deallocate");
        // SAFETY: the block was allocated below with exactly `layout`.
        unsafe {
            ptr.as_ptr().write_bytes(SCRIBBLE, layout.size());
            heap::dealloc(ptr.as_ptr(), layout);
        }
    }
}

impl MemoryResource for TestAllocator {
    fn allocate_aligned(&self, size: usize, align: usize) -> Result<NonNull<u8>> {
        let mut state = self.state.lock();
        state.num_allocations += 1;

        if let Some(remaining) = state.allocation_limit.as_mut() {
            if *remaining == 0 {
                debug!(allocator = %self.name, size, align, "injected allocation failure");
                return Err(Error::AllocationFailure { size, align });
            }
            *remaining -= 1;
        }

        let layout = checked_layout(size, align)?;
        state.last_allocated_bytes = size;
        if size == 0 {
            debug!(allocator = %self.name, "allocate zero-size block");
            return Ok(zero_size_block());
        }

        // SAFETY: `layout` has a non-zero size.
        let ptr = NonNull::new(unsafe { heap::alloc(layout) })
            .ok_or(Error::AllocationFailure { size, align })?;

        state.blocks.insert(ptr.as_ptr() as usize, layout);
        state.num_blocks_in_use += 1;
        state.num_bytes_in_use += size;
        state.num_blocks_total += 1;
        state.num_bytes_total += size;
        state.num_blocks_max = state.num_blocks_max.max(state.num_blocks_in_use);
        state.num_bytes_max = state.num_bytes_max.max(state.num_bytes_in_use);
        drop(state);

        debug!(allocator = %self.name, addr = ptr.as_ptr() as usize, size, align, "allocate");
        Ok(ptr)
    }

    unsafe fn deallocate_aligned(&self, ptr: NonNull<u8>, size: usize, align: usize) {
        self.release(ptr, Layout::from_size_align(size, align).ok())
    }
}

impl Allocator for TestAllocator {
    unsafe fn deallocate(&self, ptr: NonNull<u8>) {
        self.release(ptr, None)
    }

    fn as_resource(&self) -> &dyn MemoryResource {
        self
    }

    fn name(&self) -> &str {
        &self.name
    }
}

impl Drop for TestAllocator {
    fn drop(&mut self) {
        let state = self.state.get_mut();
        if state.num_blocks_in_use != 0 {
            error!(
                allocator = %self.name,
                blocks = state.num_blocks_in_use,
                bytes = state.num_bytes_in_use,
                "memory leaked"
            );
        }
    }
}

impl std::fmt::Debug for TestAllocator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TestAllocator")
            .field("name", &self.name)
            .field("stats", &self.stats())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::alloc::MAX_ALIGN;
    use tracing_test::traced_test;

    #[test]
    fn counts_blocks_and_bytes() {
        let ta = TestAllocator::new("counts");
        let a = ta.allocate(10).unwrap();
        let b = ta.allocate_aligned(30, 8).unwrap();
        assert_eq!(ta.num_blocks_in_use(), 2);
        assert_eq!(ta.num_bytes_in_use(), 40);
        assert_eq!(ta.last_allocated_bytes(), 30);

        unsafe {
            ta.deallocate(a);
            ta.deallocate_aligned(b, 30, 8);
        }
        let stats = ta.stats();
        assert_eq!(stats.num_allocations, 2);
        assert_eq!(stats.num_deallocations, 2);
        assert_eq!(stats.num_blocks_max, 2);
        assert_eq!(stats.num_bytes_max, 40);
        assert!(stats.is_clean());
        assert!(ta.status().is_ok());
    }

    #[test]
    fn zero_size_allocations_are_observed() {
        let ta = TestAllocator::new("zero");
        let a = ta.allocate(0).unwrap();
        let b = ta.allocate(0).unwrap();
        assert_eq!(ta.num_allocations(), 2);
        assert_eq!(ta.num_blocks_in_use(), 0);

        unsafe {
            ta.deallocate_aligned(a, 0, MAX_ALIGN);
            ta.deallocate_aligned(b, 0, MAX_ALIGN);
        }
        assert_eq!(ta.num_deallocations(), 2);
        assert_eq!(ta.num_mismatches(), 0);
    }

    #[test]
    fn allocation_limit_injects_failures() {
        let ta = TestAllocator::new("limit");
        ta.set_allocation_limit(Some(1));
        let ok = ta.allocate(8).unwrap();
        let err = ta.allocate(8).unwrap_err();
        assert_eq!(err, Error::AllocationFailure { size: 8, align: MAX_ALIGN });
        assert_eq!(ta.num_blocks_in_use(), 1);

        ta.set_allocation_limit(None);
        unsafe { ta.deallocate(ok) };
        assert!(ta.status().is_ok());
    }

    #[test]
    fn leak_is_reported_by_status() {
        let ta = TestAllocator::new("leaky");
        let ptr = ta.allocate(16).unwrap();
        match ta.status() {
            Err(Error::Leak { blocks, bytes, .. }) => {
                assert_eq!(blocks, 1);
                assert_eq!(bytes, 16);
            }
            other => panic!("expected leak, got {other:?}"),
        }
        unsafe { ta.deallocate(ptr) };
    }

    #[traced_test]
    #[test]
    fn unknown_block_is_a_mismatch() {
        let ta = TestAllocator::new("owner");
        let other = TestAllocator::new("stranger");
        let ptr = other.allocate(8).unwrap();

        unsafe { ta.deallocate(ptr) };
        assert_eq!(ta.num_mismatches(), 1);
        assert!(logs_contain("does not own"));

        unsafe { other.deallocate(ptr) };
        assert!(other.status().is_ok());
    }

    #[traced_test]
    #[test]
    fn mismatched_footprint_is_reported_but_released() {
        let ta = TestAllocator::new("footprint");
        let ptr = ta.allocate_aligned(32, 8).unwrap();
        unsafe { ta.deallocate_aligned(ptr, 16, 8) };
        assert_eq!(ta.num_mismatches(), 1);
        assert_eq!(ta.num_blocks_in_use(), 0);
        assert!(logs_contain("mismatched footprint"));
    }
}
