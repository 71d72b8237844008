mod adb_client;
mod bridge;
mod cli;
mod config;
mod device;
mod dispatcher;
mod error;

use adb_client::AdbClient;
use anyhow::Result;
use colored::*;
use config::Config;
use dispatcher::Dispatcher;
use tracing_subscriber::EnvFilter;

fn init_logging(config: &Config) {
    let filter = EnvFilter::try_new(&config.log_filter).unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .without_time()
        .with_target(false)
        .init();
}

fn real_main() -> Result<()> {
    let config = Config::from_env();
    init_logging(&config);

    let args: Vec<String> = std::env::args_os()
        .map(|arg| arg.to_string_lossy().into_owned())
        .collect();
    let (selector, command) = cli::parse(&args).unwrap_or_else(|e| e.exit());

    let adb_client = AdbClient::new(&config)?;
    let dispatcher = Dispatcher::discover(adb_client)?;
    tracing::info!(devices = dispatcher.registry().len(), ?selector, "dispatching");
    dispatcher.dispatch(&selector, &command)
}

fn main() {
    if let Err(e) = real_main() {
        eprintln!("{} {}", "Error:".red(), e);
        std::process::exit(1);
    }
}
