//! Process default allocator selection.

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::validation;

/// Which allocator the binary installs as the process default.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AllocatorKind {
    /// Heap-backed allocator.
    #[default]
    NewDelete,
    /// Instrumented allocator with counters and failure injection.
    Test,
}

#[derive(Debug, Serialize, Deserialize, Validate, Clone)]
#[validate(schema(function = validation::validate_allocation_limit))]
pub struct AllocatorConfig {
    #[serde(default)]
    pub default_kind: AllocatorKind,

    /// Name of the instrumented allocator when `default_kind` is `test`.
    #[serde(default = "default_test_allocator_name")]
    #[validate(custom(function = validation::validate_allocator_name))]
    pub test_allocator_name: String,

    /// Number of allocations the instrumented default allows before failing.
    #[serde(default)]
    pub allocation_limit: Option<usize>,

    /// Lock the default allocator once installed.
    #[serde(default)]
    pub lock_default: bool,
}

fn default_test_allocator_name() -> String {
    "default".into()
}

impl Default for AllocatorConfig {
    fn default() -> Self {
        Self {
            default_kind: AllocatorKind::default(),
            test_allocator_name: default_test_allocator_name(),
            allocation_limit: None,
            lock_default: false,
        }
    }
}
