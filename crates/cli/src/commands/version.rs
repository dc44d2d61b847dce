//! The `version` command - shows the build and the job queries it resolves through.

use clap::Args;
use serde_json::json;
use virtjob::{JOB_INFO_LEN, JOB_INFO_METHOD, JOB_STATS_METHOD};

#[derive(Args)]
pub struct VersionArgs {
    /// Output in JSON format
    #[arg(long)]
    json: bool,
}

pub fn run(args: VersionArgs) -> anyhow::Result<()> {
    if args.json {
        println!("{}", serde_json::to_string(&version_info())?);
    } else {
        println!("virtjob {}", env!("CARGO_PKG_VERSION"));
        println!("  keyed query: {JOB_STATS_METHOD}");
        println!("  positional query: {JOB_INFO_METHOD} ({JOB_INFO_LEN} values)");
    }
    Ok(())
}

fn version_info() -> serde_json::Value {
    json!({
        "version": env!("CARGO_PKG_VERSION"),
        "job_stats_method": JOB_STATS_METHOD,
        "job_info_method": JOB_INFO_METHOD,
        "job_info_len": JOB_INFO_LEN,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn json_names_both_queries() {
        let info = version_info();
        assert_eq!(info["version"], env!("CARGO_PKG_VERSION"));
        assert_eq!(info["job_stats_method"], "virDomainGetJobStats");
        assert_eq!(info["job_info_method"], "virDomainGetJobInfo");
        assert_eq!(info["job_info_len"], 12);
    }
}
