//! containers subcommand
//!
//! Probes the fleet once and prints every container ID with the number of
//! available nodes running it.

use crate::config::RouterConfig;
use clap::Args;

/// Arguments for the containers subcommand
#[derive(Args, Debug, Clone, Default)]
pub struct ContainersArgs {}

/// Execute the containers command
pub async fn execute(_args: &ContainersArgs, config: &RouterConfig) -> Result<(), anyhow::Error> {
    let monitor = super::probe_once(config).await?;
    let summaries = monitor.list_containers();
    println!("{}", serde_json::to_string_pretty(&summaries)?);
    Ok(())
}
