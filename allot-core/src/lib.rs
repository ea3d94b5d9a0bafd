//! # allot-core
//!
//! Allocator protocol and allocator-propagation primitives.
//!
//! Every allocator-aware type in the workspace obtains its memory through a
//! `&dyn Allocator` that it captured at construction time. The reference is
//! borrowed, never owned: the allocator must outlive every object that uses
//! it, which the `'a` lifetime on the allocator-aware types enforces.
//!
//! ### Key Submodules:
//! - `alloc`: the `MemoryResource`/`Allocator` traits, the process-wide default
//!   allocator, the heap-backed and instrumented allocators, and typed
//!   construction helpers (`new_object`, `delete_object`, `ManagedPtr`)
//! - `aware`: the `AllocatorAware` propagation protocol
//! - `string`: an allocator-aware text buffer
//! - `testing`: allocation-failure injection loop

pub mod alloc;
pub mod aware;
pub mod error;
pub mod string;
pub mod testing;

pub mod prelude {
    pub use crate::alloc::*;
    pub use crate::aware::*;
    pub use crate::error::*;
    pub use crate::string::AllocString;
}

pub use error::{Error, Result};
