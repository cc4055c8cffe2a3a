use anyhow::Result;
use clap::Parser;
use tradesim::cli::Cli;
use tradesim::config::AppConfig;

mod main_runtime;

use main_runtime::init_logging;

fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = AppConfig::load_from(&cli.config_dir)?;
    let _guard = init_logging(&config.logging);

    cli.run(&config)
}
