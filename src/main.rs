use std::env;
use anyhow::{Context, Result};
use log::{error, info};
use crate::config::load_config;
use crate::initialization::init;
use crate::logging::setup_logger;

mod config;
mod connection_checker;
mod dashboard;
mod document;
mod errors;
mod initialization;
mod logging;
mod manager_bms;
mod models;
mod pages;
mod poller;
mod status_fetcher;
mod worker;

const DEFAULT_CONFIG_PATH: &str = "config.toml";

#[tokio::main]
async fn main() -> Result<()> {
    let args = env::args().collect::<Vec<String>>();
    let config_path = get_config_path(&args);

    let config = load_config(&config_path)
        .with_context(|| format!("failed to load configuration from {}", config_path))?;
    let _handle = setup_logger(&config.general)?;

    let mgr = match init(&config) {
        Ok(m) => m,
        Err(e) => {
            error!("{}", e);
            return Err(e.into());
        }
    };

    if let Err(e) = worker::run(&config, mgr).await {
        error!("{}", e);
        return Err(e.into());
    }

    info!("bms-dash stopped");
    Ok(())
}

/// Returns the value of a `--config=<path>` argument, or the default config path
///
/// # Arguments
///
/// * 'args' - the command line arguments
fn get_config_path(args: &[String]) -> String {
    args.iter()
        .skip(1)
        .find_map(|a| a.strip_prefix("--config=").map(|p| p.to_string()))
        .unwrap_or_else(|| DEFAULT_CONFIG_PATH.to_string())
}
