//! ## allot-cli
//! **Command-line front end for the allocator-aware types**
//!
//! Loads configuration, installs the configured process default allocator,
//! then converts times, prints descriptors, or runs the accounting workload.

use anyhow::Context;
use clap::Parser;

use allot_config::{AllocatorKind, AllotConfig};
use allot_core::alloc::{self, TestAllocator};
use allot_telemetry::logging::EventLogger;

mod commands;
mod convert;
mod workload;

use commands::{Cli, Commands};

/// Installs the configured default allocator. Returns the instrumented one
/// when `default_kind` is `test` so its counters can be reported.
fn install_default_allocator(config: &AllotConfig) -> anyhow::Result<Option<&'static TestAllocator>> {
    let settings = &config.allocator;
    let installed = match settings.default_kind {
        AllocatorKind::NewDelete => None,
        AllocatorKind::Test => {
            let test: &'static TestAllocator =
                Box::leak(Box::new(TestAllocator::new(settings.test_allocator_name.clone())));
            test.set_allocation_limit(settings.allocation_limit);
            alloc::set_default_allocator(test).context("installing default allocator")?;
            Some(test)
        }
    };
    if settings.lock_default {
        alloc::lock_default_allocator();
    }
    Ok(installed)
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = match &cli.config {
        Some(path) => AllotConfig::load_from_path(path),
        None => AllotConfig::load(),
    }
    .context("loading configuration")?;

    EventLogger::init(&config.telemetry.log_level)
        .map_err(|err| anyhow::anyhow!("initialising logging: {err}"))?;
    let default = install_default_allocator(&config)?;
    tracing::debug!(?config, "configuration loaded");

    match cli.command {
        Commands::Convert(args) => commands::run_convert(args),
        Commands::Print(args) => commands::run_print(args),
        Commands::Stats(args) => commands::run_stats(args, &config, default),
    }
}
