//! ## allot-telemetry::logging
//! **Structured logging with `tracing`**

use allot_core::alloc::AllocatorStats;
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::util::TryInitError;
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Clone)]
pub struct EventLogger;

impl EventLogger {
    /// Installs the global fmt subscriber. `RUST_LOG` wins over
    /// `default_level`. Fails if a subscriber is already installed.
    pub fn init(default_level: &str) -> Result<(), TryInitError> {
        use tracing_subscriber::layer::SubscriberExt;
        use tracing_subscriber::util::SubscriberInitExt;

        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(default_level));
        tracing_subscriber::registry()
            .with(filter)
            .with(
                fmt::layer()
                    .with_thread_names(true)
                    .with_span_events(FmtSpan::ENTER),
            )
            .try_init()
    }

    /// Emits one event summarising an allocator's counters.
    pub fn log_stats(stats: &AllocatorStats) {
        tracing::info!(
            allocator = %stats.name,
            allocations = stats.num_allocations,
            deallocations = stats.num_deallocations,
            blocks_in_use = stats.num_blocks_in_use,
            bytes_in_use = stats.num_bytes_in_use,
            blocks_max = stats.num_blocks_max,
            mismatches = stats.num_mismatches,
            "Allocator statistics"
        );
        if !stats.is_clean() {
            tracing::error!(allocator = %stats.name, "Allocator is not clean");
        }
    }
}
