mod commands;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "virtjob")]
#[command(about = "Inspect hypervisor background job status from recorded traces")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Resolve the job status of a recorded domain
    Inspect(commands::inspect::InspectArgs),
    /// Poll a recorded domain until its job ends
    Watch(commands::watch::WatchArgs),
    /// Show version information
    Version(commands::version::VersionArgs),
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = run().await {
        eprintln!("Error: {e:?}");
        std::process::exit(1);
    }
}

async fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Inspect(args) => commands::inspect::run(args).await,
        Commands::Watch(args) => commands::watch::run(args).await,
        Commands::Version(args) => commands::version::run(args),
    }
}
