//! Command-line configuration.
//!
//! Flags override the JSON config file, which overrides the defaults. With no
//! nodes given anywhere, the store starts with `node1..node4`.

use crate::commands::Command;
use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use store::{PartitionerKind, StoreConfig, StrategyKind};
use tracing::debug;
use tracing_subscriber::EnvFilter;

const DEFAULT_NODES: [&str; 4] = ["node1", "node2", "node3", "node4"];

#[derive(Debug, Parser)]
#[command(
    name = "kvring",
    version,
    about = "Sharded key-value store rebalancing inspector"
)]
pub struct CliConfig {
    /// Path to a JSON store config file.
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Initial nodes, comma separated.
    #[arg(short, long, global = true, value_delimiter = ',')]
    pub nodes: Vec<String>,

    /// Virtual nodes per node (consistent strategy only).
    #[arg(short, long, global = true)]
    pub replicas: Option<usize>,

    /// Store strategy: `consistent` or `rehashing`.
    #[arg(short, long, global = true)]
    pub strategy: Option<StrategyKind>,

    /// Digest function: `blake3` or `xxh3`.
    #[arg(short, long, global = true)]
    pub partitioner: Option<PartitionerKind>,

    /// Print results as JSON.
    #[arg(long, global = true)]
    pub json: bool,

    /// Log level used when `RUST_LOG` is unset.
    #[arg(long, global = true, default_value = "warn")]
    pub log_level: String,

    #[command(subcommand)]
    pub command: Command,
}

impl CliConfig {
    /// Resolve the store configuration from file and flags.
    pub fn store_config(&self) -> Result<StoreConfig> {
        let mut config = match &self.config {
            Some(path) => StoreConfig::from_file(path)
                .with_context(|| format!("loading {}", path.display()))?,
            None => StoreConfig::default(),
        };
        if !self.nodes.is_empty() {
            config.nodes = self.nodes.clone();
        }
        if config.nodes.is_empty() {
            config.nodes = DEFAULT_NODES.iter().map(|n| n.to_string()).collect();
        }
        if let Some(replicas) = self.replicas {
            config.replicas = replicas;
        }
        if let Some(strategy) = self.strategy {
            config.strategy = strategy;
        }
        if let Some(partitioner) = self.partitioner {
            config.partitioner = partitioner;
        }
        Ok(config)
    }

    /// Execute the selected command and print its result.
    pub fn run(&self) -> Result<()> {
        init_tracing(&self.log_level);

        let config = self.store_config()?;
        debug!(?config, "resolved store config");
        let result = self.command.execute(&config)?;

        if self.json {
            println!("{}", serde_json::to_string_pretty(&result)?);
        } else {
            print!("{result}");
        }
        Ok(())
    }
}

/// Install a console subscriber; `RUST_LOG` wins over `level`.
fn init_tracing(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    // A subscriber may already be installed when embedded; keep the existing one.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}
