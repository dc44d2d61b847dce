//! The `inspect` command - resolves the job status of a recorded domain.

use super::print_record;
use clap::Args;
use std::path::PathBuf;
use virtjob::{DomainTrace, HostJobStatusResolver, TraceDomain};

#[derive(Args)]
pub struct InspectArgs {
    /// Path to the recorded trace (TOML, or JSON with a .json extension)
    trace: PathBuf,

    /// Number of status queries to issue
    #[arg(long, default_value = "1", value_parser = clap::value_parser!(u32).range(1..))]
    samples: u32,

    /// Output in JSON format, one record per line
    #[arg(long)]
    json: bool,
}

pub async fn run(args: InspectArgs) -> anyhow::Result<()> {
    let domain = TraceDomain::new(DomainTrace::load(&args.trace)?);
    let resolver = HostJobStatusResolver::new();

    for _ in 0..args.samples {
        let record = resolver.get_status(&domain).await?;
        print_record(&record, args.json)?;
    }

    if !args.json {
        println!(
            "Queries: job_stats={}, job_info={}, job_stats available={}",
            domain.job_stats_calls(),
            domain.job_info_calls(),
            resolver.job_stats_available()
        );
    }

    Ok(())
}
