//! ## allot-core::alloc
//! **Allocator protocol, default allocator and typed construction helpers**
//!
//! ### Key Submodules:
//! - `resource`: the `MemoryResource` and `Allocator` traits
//! - `handle`: `AllocatorHandle`, the optional trailing constructor argument
//! - `default`: the process-wide default allocator and its scoped guard
//! - `new_delete`: the heap-backed fallback allocator
//! - `test_allocator`: an instrumented allocator with failure injection
//! - `object`: `new_object` / `delete_object`
//! - `managed`: `ManagedPtr`, an owning pointer that frees through its allocator
//! - `stats`: allocation statistics snapshots

pub mod default;
pub mod handle;
pub mod managed;
pub mod new_delete;
pub mod object;
pub mod resource;
pub mod stats;
pub mod test_allocator;

pub use default::{
    default_allocator, is_default_allocator_locked, lock_default_allocator, set_default_allocator,
    DefaultAllocatorGuard,
};
pub use handle::AllocatorHandle;
pub use managed::ManagedPtr;
pub use new_delete::NewDeleteAllocator;
pub use object::{delete_object, delete_object_raw, new_object, try_new_object};
pub use resource::{
    allocator_eq, is_zero_size_block, zero_size_block, Allocator, MemoryResource, MAX_ALIGN,
    MAX_SUPPORTED_ALIGN,
};
pub use stats::AllocatorStats;
pub use test_allocator::TestAllocator;
