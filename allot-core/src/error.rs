use thiserror::Error;

/// Errors surfaced by allocators and allocator-aware types.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum Error {
    #[error("Allocation of {size} bytes (align {align}) failed")]
    AllocationFailure { size: usize, align: usize },

    #[error("Invalid value for {what}: {value}")]
    InvalidValue { what: &'static str, value: i64 },

    #[error("Index {index} out of range for length {len}")]
    OutOfRange { index: usize, len: usize },

    #[error("Default allocator is locked")]
    DefaultAllocatorLocked,

    #[error("Allocator '{name}' leaked {blocks} block(s) totalling {bytes} bytes")]
    Leak {
        name: String,
        blocks: usize,
        bytes: usize,
    },
}

impl Error {
    #[inline]
    pub(crate) fn allocation(size: usize, align: usize) -> Self {
        Error::AllocationFailure { size, align }
    }

    /// Returns `true` for allocation failures, the only error an allocator
    /// itself raises.
    pub fn is_allocation_failure(&self) -> bool {
        matches!(self, Error::AllocationFailure { .. })
    }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
