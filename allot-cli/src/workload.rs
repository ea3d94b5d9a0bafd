//! Propagation workload for `allot stats`.
//!
//! Builds descriptors in one instrumented allocator, copies, moves and swaps
//! them across a second one, then reports both allocators' counters.

use allot_core::alloc::{AllocatorHandle, AllocatorStats, ManagedPtr, TestAllocator};
use allot_core::aware::AllocatorAware;
use allot_core::Result;
use allot_types::fixed_array::{self, FixedArray};
use allot_types::LocalTimeDescriptor;

const ZONES: [(i32, bool, &str); 3] = [
    (-14_400, true, "Eastern Daylight Time"),
    (7_200, true, "CEST"),
    (19_800, false, "India Standard Time"),
];

fn zones(alloc: &TestAllocator) -> Result<FixedArray<LocalTimeDescriptor<'_>, 3>> {
    let mut out: FixedArray<LocalTimeDescriptor<'_>, 3> =
        FixedArray::default_in(AllocatorHandle::from(alloc));
    for (slot, (offset, dst, text)) in out.iter_mut().zip(ZONES) {
        slot.set_utc_offset_in_seconds(offset)?;
        slot.set_dst_in_effect_flag(dst);
        slot.set_description(text)?;
    }
    Ok(out)
}

fn round(primary: &TestAllocator, secondary: &TestAllocator) -> Result<()> {
    let mut local = zones(primary)?;
    let mut remote = local.try_clone_in(AllocatorHandle::from(secondary))?;
    fixed_array::swap(&mut local, &mut remote)?;

    let mut moved = local.take_in(AllocatorHandle::from(secondary))?;
    moved.assign_from(&mut remote)?;

    let boxed = ManagedPtr::new_in(moved[0].try_clone_in(AllocatorHandle::from(primary))?, primary)?;
    let descriptor: &LocalTimeDescriptor<'_> = &boxed;
    tracing::debug!(%descriptor, "workload round complete");
    Ok(())
}

/// Runs the workload `rounds` times and returns one snapshot per allocator.
pub fn run(rounds: usize) -> Result<Vec<AllocatorStats>> {
    let primary = TestAllocator::new("primary");
    let secondary = TestAllocator::new("secondary");
    for _ in 0..rounds {
        round(&primary, &secondary)?;
    }
    primary.status()?;
    secondary.status()?;
    Ok(vec![primary.stats(), secondary.stats()])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn workload_leaves_allocators_clean() {
        let report = run(2).unwrap();
        assert_eq!(report.len(), 2);
        assert!(report.iter().all(AllocatorStats::is_clean));
        assert!(report.iter().all(|stats| stats.num_allocations > 0));
    }
}
