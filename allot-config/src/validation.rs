//! Custom validation functions shared by the configuration sections.

use validator::ValidationError;

use crate::allocator::{AllocatorConfig, AllocatorKind};

const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// Accepts the `tracing` level names, case-insensitively.
pub fn validate_log_level(level: &str) -> Result<(), ValidationError> {
    if LOG_LEVELS.contains(&level.to_lowercase().as_str()) {
        Ok(())
    } else {
        Err(ValidationError::new("invalid_log_level"))
    }
}

/// Allocator names end up as metric label values.
pub fn validate_allocator_name(name: &str) -> Result<(), ValidationError> {
    let valid = !name.is_empty()
        && name.len() <= 64
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
    if valid {
        Ok(())
    } else {
        Err(ValidationError::new("invalid_allocator_name"))
    }
}

/// An allocation limit only makes sense for the instrumented allocator.
pub fn validate_allocation_limit(config: &AllocatorConfig) -> Result<(), ValidationError> {
    if config.allocation_limit.is_some() && config.default_kind != AllocatorKind::Test {
        return Err(ValidationError::new("allocation_limit_requires_test_allocator"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn log_levels() {
        assert!(validate_log_level("INFO").is_ok());
        assert!(validate_log_level("verbose").is_err());
    }

    #[test]
    fn allocator_names() {
        assert!(validate_allocator_name("cli-default_1").is_ok());
        assert!(validate_allocator_name("").is_err());
        assert!(validate_allocator_name("has space").is_err());
    }
}
