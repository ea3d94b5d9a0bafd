//! # Allot Telemetry
//!
//! Crate for logging and allocator metrics.

pub mod logging;
pub mod metrics;

pub use logging::EventLogger;
pub use metrics::MetricsRecorder;
