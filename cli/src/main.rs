//! tee-pipeline: runs the transaction generator → tee → fraud/analytics
//! pipeline until the run duration elapses, then cancels and drains it.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use tracing::info;
use tracing_subscriber::EnvFilter;

use pipeline_core::config::PipelineConfig;
use pipeline_core::pipeline::run_pipeline;
use pipeline_core::stream::TieBreak;

/// Cancellable tee pipeline demo.
#[derive(Parser, Debug)]
#[command(name = "tee-pipeline")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// JSON config file; flags below override its values.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Number of transactions to generate.
    #[arg(long)]
    events: Option<usize>,

    /// Lowest generated amount (inclusive).
    #[arg(long)]
    min: Option<i64>,

    /// Highest generated amount (exclusive).
    #[arg(long)]
    max: Option<i64>,

    /// Delay between transactions, in milliseconds.
    #[arg(long)]
    delay_ms: Option<u64>,

    /// Amounts strictly above this are flagged.
    #[arg(long)]
    threshold: Option<i64>,

    /// Run time before cancellation, in milliseconds.
    #[arg(long)]
    run_ms: Option<u64>,

    /// Time allowed for stages to exit after cancellation, in milliseconds.
    #[arg(long)]
    grace_ms: Option<u64>,

    /// Seed for reproducible amounts.
    #[arg(long)]
    seed: Option<u64>,

    /// Branch preference when both tee outputs are ready.
    #[arg(long, value_enum)]
    tie_break: Option<TieBreakArg>,

    /// Log level (trace, debug, info, warn, error).
    #[arg(long, default_value = "info")]
    log_level: String,

    /// Print the final report as JSON on stdout.
    #[arg(long)]
    json: bool,
}

#[derive(Copy, Clone, Debug, ValueEnum)]
enum TieBreakArg {
    Arbitrary,
    InOrder,
}

impl From<TieBreakArg> for TieBreak {
    fn from(arg: TieBreakArg) -> Self {
        match arg {
            TieBreakArg::Arbitrary => TieBreak::Arbitrary,
            TieBreakArg::InOrder => TieBreak::InOrder,
        }
    }
}

fn main() -> Result<()> {
    let args = Args::parse();

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_names(true)
        .init();

    let config = build_config(&args)?;
    info!("tee-pipeline starting: {:?}", config);

    let report = run_pipeline(&config).context("pipeline did not shut down cleanly")?;

    info!("Pipeline report:\n{}", report.summary());
    if args.json {
        let json = serde_json::to_string_pretty(&report).context("serializing report")?;
        println!("{json}");
    }
    Ok(())
}

/// Defaults, then config file, then flags.
fn build_config(args: &Args) -> Result<PipelineConfig> {
    let mut config = match &args.config {
        Some(path) => PipelineConfig::from_json_file(path)
            .with_context(|| format!("loading config from {}", path.display()))?,
        None => PipelineConfig::default(),
    };

    if let Some(events) = args.events {
        config.event_count = events;
    }
    if let Some(min) = args.min {
        config.value_min = min;
    }
    if let Some(max) = args.max {
        config.value_max = max;
    }
    if let Some(ms) = args.delay_ms {
        config.event_delay = Duration::from_millis(ms);
    }
    if let Some(threshold) = args.threshold {
        config.threshold = threshold;
    }
    if let Some(ms) = args.run_ms {
        config.run_duration = Duration::from_millis(ms);
    }
    if let Some(ms) = args.grace_ms {
        config.grace_period = Duration::from_millis(ms);
    }
    if args.seed.is_some() {
        config.seed = args.seed;
    }
    if let Some(tie_break) = args.tie_break {
        config.tie_break = tie_break.into();
    }

    config.validate().context("invalid configuration")?;
    Ok(config)
}
