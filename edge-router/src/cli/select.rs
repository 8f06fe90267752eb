//! select subcommand
//!
//! Probes the fleet once and prints the least loaded nodes as a JSON array.

use crate::balancer::{SelectQuery, DEFAULT_SELECT_LIMIT};
use crate::config::RouterConfig;
use clap::Args;

/// Arguments for the select subcommand
#[derive(Args, Debug, Clone)]
pub struct SelectArgs {
    /// Container ID the node must run (repeatable)
    #[arg(short = 'c', long = "container", required = true)]
    pub containers: Vec<String>,

    /// Maximum number of nodes to print
    #[arg(short, long, default_value_t = DEFAULT_SELECT_LIMIT)]
    pub limit: usize,

    /// Number of best nodes to skip
    #[arg(short, long, default_value_t = 0)]
    pub offset: usize,
}

impl SelectArgs {
    /// Convert into a selection query
    pub fn query(&self) -> SelectQuery {
        SelectQuery::new(self.containers.iter().cloned())
            .with_limit(self.limit)
            .with_offset(self.offset)
    }
}

/// Execute the select command
pub async fn execute(args: &SelectArgs, config: &RouterConfig) -> Result<(), anyhow::Error> {
    let monitor = super::probe_once(config).await?;
    let nodes = monitor.select(&args.query());
    println!("{}", serde_json::to_string_pretty(&nodes)?);
    Ok(())
}
