//! The `watch` command - polls a recorded domain until its job ends.

use super::print_record;
use clap::Args;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use virtjob::{DomainTrace, HostJobStatusResolver, JobMonitor, MonitorConfig, TraceDomain};

#[derive(Args)]
pub struct WatchArgs {
    /// Path to the recorded trace (TOML, or JSON with a .json extension)
    trace: PathBuf,

    /// Path to a monitor configuration file
    #[arg(long, short)]
    config: Option<PathBuf>,

    /// Poll interval in milliseconds (overrides the configuration file)
    #[arg(long)]
    poll_ms: Option<u64>,

    /// Give up after this many milliseconds (overrides the configuration file)
    #[arg(long)]
    timeout_ms: Option<u64>,

    /// Print every sampled record, not only the final one
    #[arg(long, short)]
    verbose: bool,

    /// Output in JSON format
    #[arg(long)]
    json: bool,
}

pub async fn run(args: WatchArgs) -> anyhow::Result<()> {
    let config = monitor_config(&args)?;

    let domain = TraceDomain::new(DomainTrace::load(&args.trace)?);
    let monitor = JobMonitor::new(Arc::new(HostJobStatusResolver::new()), config)?;

    let json = args.json;
    let mut print_error = None;
    let record = monitor
        .watch_with(&domain, |record| {
            if args.verbose && print_error.is_none() {
                print_error = print_record(record, json).err();
            }
        })
        .await?;

    if let Some(err) = print_error {
        return Err(err);
    }
    if !args.verbose {
        print_record(&record, json)?;
    }

    Ok(())
}

/// Loads `--config` if given, then applies the command-line overrides.
fn monitor_config(args: &WatchArgs) -> anyhow::Result<MonitorConfig> {
    let mut config = match &args.config {
        Some(path) => {
            let config = MonitorConfig::load(path)?;
            tracing::debug!("Loaded monitor config from {}", path.display());
            config
        }
        None => MonitorConfig::default(),
    };
    if let Some(ms) = args.poll_ms {
        tracing::debug!("Poll interval overridden to {} ms", ms);
        config = config.poll_interval(Duration::from_millis(ms));
    }
    if let Some(ms) = args.timeout_ms {
        tracing::debug!("Timeout overridden to {} ms", ms);
        config = config.timeout(Duration::from_millis(ms));
    }
    Ok(config)
}
