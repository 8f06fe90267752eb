//! run subcommand
//!
//! Runs the node monitor until Ctrl-C is received.

use crate::config::{load_node_list, RouterConfig};
use crate::health::NodeMonitor;
use clap::Args;
use tracing::{info, warn};

/// Arguments for the run subcommand
#[derive(Args, Debug, Clone, Default)]
pub struct RunArgs {}

/// Execute the run command
pub async fn execute(config: &RouterConfig) -> Result<(), anyhow::Error> {
    let nodes = load_node_list(&config.nodes_file)?;
    info!(
        nodes = nodes.len(),
        nodes_file = %config.nodes_file.display(),
        refresh_interval_secs = config.monitor.refresh_interval.as_secs_f64(),
        live_discovery = config.directory.is_some(),
        "Starting node monitor"
    );

    let monitor = NodeMonitor::from_config(config, nodes)?;
    let mut handle = monitor.clone().start();

    let interrupted = tokio::select! {
        result = tokio::signal::ctrl_c() => {
            if let Err(e) = result {
                warn!(error = %e, "Failed to listen for Ctrl-C; stopping monitor");
            }
            true
        }
        result = &mut handle => {
            result?;
            false
        }
    };

    if interrupted {
        monitor.stop();
        handle.await?;
    }

    info!(state = %monitor.state(), "Node monitor exited");
    Ok(())
}
