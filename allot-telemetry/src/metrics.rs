//! ## allot-telemetry::metrics
//! **Prometheus allocator metrics**
//!
//! One time series per allocator name: blocks and bytes currently in use
//! (gauges) and cumulative allocation / deallocation calls (counters).

use allot_core::alloc::AllocatorStats;
use prometheus::{IntCounterVec, IntGaugeVec, Opts, Registry};

const LABEL: &str = "allocator";

#[derive(Debug, Clone)]
pub struct MetricsRecorder {
    pub registry: Registry,
    pub blocks_in_use: IntGaugeVec,
    pub bytes_in_use: IntGaugeVec,
    pub allocations: IntCounterVec,
    pub deallocations: IntCounterVec,
}

impl MetricsRecorder {
    pub fn new() -> Result<Self, prometheus::Error> {
        let registry = Registry::new();

        let blocks_in_use = IntGaugeVec::new(
            Opts::new("allot_blocks_in_use", "Blocks currently allocated"),
            &[LABEL],
        )?;
        let bytes_in_use = IntGaugeVec::new(
            Opts::new("allot_bytes_in_use", "Bytes currently allocated"),
            &[LABEL],
        )?;
        let allocations = IntCounterVec::new(
            Opts::new("allot_allocations_total", "Allocation requests"),
            &[LABEL],
        )?;
        let deallocations = IntCounterVec::new(
            Opts::new("allot_deallocations_total", "Deallocation requests"),
            &[LABEL],
        )?;

        registry.register(Box::new(blocks_in_use.clone()))?;
        registry.register(Box::new(bytes_in_use.clone()))?;
        registry.register(Box::new(allocations.clone()))?;
        registry.register(Box::new(deallocations.clone()))?;

        Ok(Self {
            registry,
            blocks_in_use,
            bytes_in_use,
            allocations,
            deallocations,
        })
    }

    /// Brings the series for `stats.name` up to date with a snapshot.
    ///
    /// Counters only move forward: a snapshot with fewer calls than already
    /// recorded leaves the counter unchanged.
    pub fn record(&self, stats: &AllocatorStats) {
        let labels = [stats.name.as_str()];
        self.blocks_in_use
            .with_label_values(&labels)
            .set(clamp(stats.num_blocks_in_use));
        self.bytes_in_use
            .with_label_values(&labels)
            .set(clamp(stats.num_bytes_in_use));

        let allocations = self.allocations.with_label_values(&labels);
        allocations.inc_by(stats.num_allocations.saturating_sub(allocations.get()));
        let deallocations = self.deallocations.with_label_values(&labels);
        deallocations.inc_by(stats.num_deallocations.saturating_sub(deallocations.get()));
    }

    pub fn gather_metrics(&self) -> Result<String, prometheus::Error> {
        use prometheus::Encoder;
        let encoder = prometheus::TextEncoder::new();
        let mut buffer = Vec::<u8>::new();
        encoder.encode(&self.registry.gather(), &mut buffer)?;
        String::from_utf8(buffer).map_err(|err| prometheus::Error::Msg(err.to_string()))
    }
}

fn clamp(value: usize) -> i64 {
    i64::try_from(value).unwrap_or(i64::MAX)
}
