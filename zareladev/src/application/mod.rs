pub mod handlers;

use crate::presentation::cli::{Cli, Commands};
use clap::Parser;
use zarela_core::config::Config;
use zarela_core::domain::Address;
use zarela_core::error::Result;

/// Config file (or defaults) with command-line overrides applied.
pub fn settings(cli: &Cli) -> Result<Config> {
    let mut cfg = Config::load(cli.config.as_deref())?;
    if let Some(g) = &cli.gateway {
        cfg.gateway_url = g.clone();
    }
    if let Some(r) = &cli.rpc {
        cfg.rpc_url = r.clone();
    }
    if let Some(a) = &cli.account {
        cfg.account = Some(Address::parse(a)?);
    }
    if let Some(o) = &cli.out {
        cfg.download_dir = o.clone();
    }
    if let Some(o) = &cli.orders {
        cfg.orders_dir = o.clone();
    }
    Ok(cfg)
}

pub async fn run() -> Result<()> {
    let cli = Cli::parse();
    let cfg = settings(&cli)?;
    tracing::debug!(
        gateway = %cfg.gateway_url,
        rpc = %cfg.rpc_url,
        download_dir = %cfg.download_dir.display(),
        "settings resolved"
    );
    match cli.command {
        Commands::Files { order } => handlers::handle_files(&cfg, order).await,
        Commands::Payload { order, selection } => {
            handlers::handle_payload(&cfg, order, &selection).await
        }
        Commands::Confirm { order, selection } => {
            handlers::handle_confirm(&cfg, order, &selection).await
        }
        Commands::Retrieve { hashes, limit } => {
            handlers::handle_retrieve(&cfg, &hashes, limit).await
        }
    }
}
