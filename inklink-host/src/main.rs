use anyhow::{Context, Result};
use clap::Parser;
use inklink_host::cli::Cli;
use inklink_host::config::HostConfig;

fn main() -> Result<()> {
    let cli = Cli::parse();
    env_logger::init_from_env(env_logger::Env::new().default_filter_or(cli.log_level()));

    let mut config = match &cli.config {
        Some(path) => HostConfig::load(path)
            .with_context(|| format!("failed to load {}", path.display()))?,
        None => HostConfig::default(),
    };
    cli.apply(&mut config);

    let report = inklink_host::run(&config)?;
    println!("Image sent to slot {}: {}", config.transfer.slot, report);
    Ok(())
}
