use std::path::PathBuf;

use anyhow::Context;
use chrono::NaiveDateTime;
use clap::{Args, Parser, Subcommand};

use allot_config::AllotConfig;
use allot_core::alloc::TestAllocator;
use allot_telemetry::metrics::MetricsRecorder;
use allot_types::LocalTimeDescriptor;

use crate::{convert, workload};

#[derive(Parser)]
#[command(version, about)]
pub struct Cli {
    /// Configuration file; defaults to `config/allot.yaml` when present
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Convert between local time and UTC using a local time descriptor
    Convert(ConvertArgs),
    /// Print a local time descriptor
    Print(PrintArgs),
    /// Run an allocator propagation workload and report allocator statistics
    Stats(StatsArgs),
}

#[derive(Args, Debug, Clone)]
pub struct DescriptorArgs {
    /// Offset from UTC in seconds
    #[arg(long, allow_negative_numbers = true)]
    pub offset: i32,
    /// Daylight saving time is in effect
    #[arg(long)]
    pub dst: bool,
    #[arg(long, default_value = "")]
    pub description: String,
}

#[derive(Args, Debug, Clone)]
pub struct ConvertArgs {
    #[command(flatten)]
    pub descriptor: DescriptorArgs,
    /// Local time to convert to UTC (e.g. 2010-07-20T11:00:00)
    #[arg(long, conflicts_with = "utc", required_unless_present = "to_local")]
    pub local: Option<String>,
    /// Convert the UTC time given with `--utc` to local time instead
    #[arg(long, requires = "utc")]
    pub to_local: bool,
    #[arg(long)]
    pub utc: Option<String>,
}

#[derive(Args, Debug, Clone)]
pub struct PrintArgs {
    #[command(flatten)]
    pub descriptor: DescriptorArgs,
    /// Nesting level; negative suppresses the first line's indentation
    #[arg(long, default_value_t = 0, allow_negative_numbers = true)]
    pub level: i32,
    /// Spaces per level; negative prints a single line
    #[arg(long, default_value_t = 4, allow_negative_numbers = true)]
    pub spaces: i32,
}

#[derive(Args, Debug, Clone)]
pub struct StatsArgs {
    /// Repeat the workload this many times
    #[arg(long, default_value_t = 1)]
    pub rounds: usize,
}

fn descriptor(args: &DescriptorArgs) -> anyhow::Result<LocalTimeDescriptor<'static>> {
    LocalTimeDescriptor::try_new(args.offset, args.dst, &args.description)
        .context("building local time descriptor")
}

fn parse_time(value: &str) -> anyhow::Result<NaiveDateTime> {
    convert::parse_naive(value).with_context(|| format!("unrecognised date-time '{value}'"))
}

pub fn run_convert(args: ConvertArgs) -> anyhow::Result<()> {
    let descriptor = descriptor(&args.descriptor)?;
    match (args.to_local, args.local, args.utc) {
        (true, _, Some(utc)) => {
            let local = convert::utc_to_local(parse_time(&utc)?, &descriptor)?;
            println!("{}", local.to_rfc3339());
        }
        (false, Some(local), _) => {
            let utc = convert::local_to_utc(parse_time(&local)?, &descriptor)?;
            println!("{}", utc.to_rfc3339());
        }
        _ => anyhow::bail!("either --local or --to-local --utc is required"),
    }
    println!("{descriptor}");
    Ok(())
}

pub fn run_print(args: PrintArgs) -> anyhow::Result<()> {
    let descriptor = descriptor(&args.descriptor)?;
    let mut out = String::new();
    descriptor.print(&mut out, args.level, args.spaces)?;
    if args.spaces < 0 {
        out.push('\n');
    }
    print!("{out}");
    Ok(())
}

pub fn run_stats(
    args: StatsArgs,
    config: &AllotConfig,
    default: Option<&TestAllocator>,
) -> anyhow::Result<()> {
    let metrics = MetricsRecorder::new().context("registering allocator metrics")?;
    let report = workload::run(args.rounds)?;

    for stats in report.iter().chain(default.map(TestAllocator::stats).as_ref()) {
        metrics.record(stats);
        allot_telemetry::EventLogger::log_stats(stats);
        print!("{}", serde_yaml::to_string(stats)?);
        println!("---");
    }

    if config.telemetry.metrics.enabled {
        print!("{}", metrics.gather_metrics()?);
    }
    Ok(())
}
