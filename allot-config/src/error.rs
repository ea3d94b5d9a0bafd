//! Failures reported by [`AllotConfig::load`](crate::AllotConfig::load) and
//! [`AllotConfig::load_from_path`](crate::AllotConfig::load_from_path).

use std::path::PathBuf;

use thiserror::Error;
use validator::{ValidationErrors, ValidationErrorsKind};

#[derive(Debug, Error)]
pub enum ConfigError {
    /// An explicitly requested file does not exist. The implicit
    /// `config/allot.yaml` is optional and never produces this.
    #[error("config file {} does not exist", .0.display())]
    FileNotFound(PathBuf),

    /// Every source merged, but a value is out of bounds, e.g. an unknown
    /// log level or an allocation limit on the heap allocator.
    #[error("config rejected: {}", describe(.0))]
    Validation(#[source] ValidationErrors),

    /// A source could not be read or did not deserialize into the schema.
    #[error("config could not be read: {0}")]
    Parsing(#[from] figment::Error),
}

impl From<ValidationErrors> for ConfigError {
    fn from(errors: ValidationErrors) -> Self {
        Self::Validation(errors)
    }
}

/// One `path: reason` entry per failed check, sorted, joined with `; `.
/// Nested sections are reported with dotted paths (`telemetry.log_level`).
fn describe(errors: &ValidationErrors) -> String {
    let mut entries = Vec::new();
    collect(errors, "", &mut entries);
    entries.sort();
    entries.join("; ")
}

fn collect(errors: &ValidationErrors, prefix: &str, out: &mut Vec<String>) {
    for (field, kind) in errors.errors() {
        // Struct-level checks are filed under `__all__`.
        let path = match (prefix.is_empty(), &**field) {
            (true, "__all__") => "config".to_string(),
            (false, "__all__") => prefix.to_string(),
            (true, name) => name.to_string(),
            (false, name) => format!("{prefix}.{name}"),
        };
        match kind {
            ValidationErrorsKind::Field(failures) => {
                for failure in failures {
                    let reason = failure.message.as_ref().unwrap_or(&failure.code);
                    out.push(format!("{path}: {reason}"));
                }
            }
            ValidationErrorsKind::Struct(inner) => collect(inner, &path, out),
            ValidationErrorsKind::List(items) => {
                for (index, inner) in items {
                    collect(inner, &format!("{path}[{index}]"), out);
                }
            }
        }
    }
}
