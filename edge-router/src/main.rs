//! Edge router entry point

use clap::Parser;
use edge_router::cli::{self, Cli, Commands};
use edge_router::config::RouterConfig;
use edge_router::logging::{self, LogConfig};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let _log_guard = match logging::init(&LogConfig::from_env()) {
        Ok(guard) => Some(guard),
        Err(e) => {
            tracing::warn!(error = %format!("{e:#}"), "File logging disabled");
            None
        }
    };

    if let Err(e) = run(cli).await {
        tracing::error!(error = %e, "edge-router failed");
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let config = cli.fleet.apply(RouterConfig::from_env())?;

    match cli.command {
        Some(Commands::Select(args)) => cli::select::execute(&args, &config).await,
        Some(Commands::Containers(args)) => cli::containers::execute(&args, &config).await,
        Some(Commands::Run(_)) | None => cli::run::execute(&config).await,
    }
}
