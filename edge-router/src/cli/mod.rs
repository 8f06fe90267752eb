//! CLI module for edge-router
//!
//! Provides command-line interface for running the node monitor and for
//! one-shot fleet queries.

pub mod containers;
pub mod run;
pub mod select;

use crate::common::error::{CommonError, RouterResult};
use crate::config::{DirectoryConfig, RouterConfig, DEFAULT_DIRECTORY_TIMEOUT_SECS};
use crate::health::NodeMonitor;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use std::time::Duration;

/// Edge router - Picks the least loaded worker node able to run a job
#[derive(Parser, Debug)]
#[command(name = "edge-router")]
#[command(version, about, long_about = None)]
#[command(after_help = r#"ENVIRONMENT VARIABLES:
    ROUTER_NODES_FILE               Static node list file (default: ips.txt)
    ROUTER_REFRESH_INTERVAL         Seconds between cycles (default: 30)
    ROUTER_PROBE_TIMEOUT_SECS       Per-node probe timeout (default: 3)
    ROUTER_API_URL                  Directory API for live node discovery
    ROUTER_DIRECTORY_TIMEOUT_SECS   Directory API timeout (default: 10)
    ROUTER_LOG_LEVEL                Console log filter (default: info)
    ROUTER_LOG_DIR                  JSON log file directory (default: temp dir)
"#)]
pub struct Cli {
    /// Overrides for environment configuration
    #[command(flatten)]
    pub fleet: FleetArgs,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the node monitor until interrupted (default)
    Run(run::RunArgs),
    /// Probe the fleet once and print the selected nodes
    Select(select::SelectArgs),
    /// Probe the fleet once and print container counts
    Containers(containers::ContainersArgs),
}

/// Configuration overrides shared by all subcommands
#[derive(Args, Debug, Clone, Default)]
pub struct FleetArgs {
    /// Static node list file (one hostname per line)
    #[arg(long, global = true)]
    pub nodes_file: Option<PathBuf>,

    /// Seconds between monitoring cycles (fractional allowed)
    #[arg(long, global = true)]
    pub refresh_interval: Option<f64>,

    /// Per-node probe timeout in seconds
    #[arg(long, global = true)]
    pub probe_timeout: Option<u64>,

    /// Directory API base URL for live node discovery
    #[arg(long, global = true)]
    pub api_url: Option<String>,
}

impl FleetArgs {
    /// Apply command-line overrides on top of `config`.
    pub fn apply(&self, mut config: RouterConfig) -> RouterResult<RouterConfig> {
        if let Some(path) = &self.nodes_file {
            config.nodes_file = path.clone();
        }
        if let Some(secs) = self.refresh_interval {
            config.monitor.refresh_interval = Duration::try_from_secs_f64(secs).map_err(|_| {
                CommonError::Validation(format!("invalid refresh interval: {secs}"))
            })?;
        }
        if let Some(secs) = self.probe_timeout {
            config.monitor.probe_timeout = Duration::from_secs(secs);
        }
        if let Some(api_url) = &self.api_url {
            let timeout = config
                .directory
                .as_ref()
                .map(|directory| directory.timeout)
                .unwrap_or(Duration::from_secs(DEFAULT_DIRECTORY_TIMEOUT_SECS));
            config.directory = DirectoryConfig::new(api_url, timeout);
        }
        config.validate()?;
        Ok(config)
    }
}

/// Build a monitor from configuration and run a single cycle.
pub(crate) async fn probe_once(config: &RouterConfig) -> anyhow::Result<NodeMonitor> {
    let nodes = crate::config::load_node_list(&config.nodes_file)?;
    let monitor = NodeMonitor::from_config(config, nodes)?;
    monitor.run_cycle().await;
    Ok(monitor)
}
