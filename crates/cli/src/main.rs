//! CLI entry point for kvring.

use clap::Parser;
use kvring_cli::CliConfig;

fn main() -> anyhow::Result<()> {
    let config = CliConfig::parse();
    config.run()
}
