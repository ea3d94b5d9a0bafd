//! Allocation-failure injection for exercising error paths.

use crate::alloc::TestAllocator;
use crate::error::{Error, Result};

/// Runs `body` repeatedly, first allowing zero allocations from `allocator`,
/// then one, then two, until `body` returns `Ok`.
///
/// `body` must restore whatever state it needs on each attempt; it is the
/// caller's job to check after each failed attempt that nothing changed.
/// Returns the number of failed attempts. Errors other than allocation
/// failures stop the loop and are returned.
pub fn exhaust_allocation_failures<F>(allocator: &TestAllocator, mut body: F) -> Result<usize>
where
    F: FnMut(usize) -> Result<()>,
{
    let mut limit = 0;
    let outcome = loop {
        allocator.set_allocation_limit(Some(limit));
        match body(limit) {
            Ok(()) => break Ok(limit),
            Err(Error::AllocationFailure { .. }) => limit += 1,
            Err(other) => break Err(other),
        }
    };
    allocator.set_allocation_limit(None);
    outcome
}
