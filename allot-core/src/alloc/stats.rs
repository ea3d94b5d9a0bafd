//! ## allot-core::alloc::stats
//! **Allocation statistics snapshots**
//!
//! Counters reported by instrumented allocators. A snapshot is a plain value:
//! it is taken under the allocator's lock and never changes afterwards.

use serde::{Deserialize, Serialize};

/// Point-in-time allocation counters for one allocator.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AllocatorStats {
    /// Name of the allocator the snapshot was taken from.
    pub name: String,
    /// Calls to any allocate method, including zero-size and failed requests.
    pub num_allocations: u64,
    /// Calls to any deallocate method, including zero-size blocks.
    pub num_deallocations: u64,
    /// Blocks currently outstanding (zero-size blocks excluded).
    pub num_blocks_in_use: usize,
    /// Bytes currently outstanding.
    pub num_bytes_in_use: usize,
    /// High-water mark of `num_blocks_in_use`.
    pub num_blocks_max: usize,
    /// High-water mark of `num_bytes_in_use`.
    pub num_bytes_max: usize,
    /// Blocks ever handed out.
    pub num_blocks_total: usize,
    /// Bytes ever handed out.
    pub num_bytes_total: usize,
    /// Deallocations of unknown blocks or with a mismatched footprint.
    pub num_mismatches: usize,
}

impl AllocatorStats {
    /// No blocks outstanding and no mismatched deallocations.
    pub fn is_clean(&self) -> bool {
        self.num_blocks_in_use == 0 && self.num_bytes_in_use == 0 && self.num_mismatches == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_snapshot_is_clean() {
        assert!(AllocatorStats::default().is_clean());
    }

    #[test]
    fn outstanding_blocks_are_not_clean() {
        let stats = AllocatorStats {
            num_blocks_in_use: 1,
            num_bytes_in_use: 8,
            ..Default::default()
        };
        assert!(!stats.is_clean());
    }
}
