//! # allot-types
//!
//! Allocator-aware value types built on `allot-core`.
//!
//! - [`LocalTimeDescriptor`]: a value-semantic attribute type whose
//!   description is stored in memory from a caller-supplied allocator.
//! - [`FixedArray`]: a fixed-length container that never allocates itself and
//!   forwards allocator propagation to each element.
//! - [`print`]: the indented multi-line / single-line printer shared by the
//!   value types.

pub mod fixed_array;
pub mod local_time_descriptor;
pub mod print;

pub use fixed_array::FixedArray;
pub use local_time_descriptor::LocalTimeDescriptor;
