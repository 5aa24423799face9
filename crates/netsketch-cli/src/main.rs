//! Netsketch CLI entry point

use std::process;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    let matches = netsketch_cli::cli().get_matches();

    let level = matches
        .get_one::<String>("log-level")
        .map_or("info", String::as_str);
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    if matches.get_flag("json-logs") {
        subscriber.json().init();
    } else {
        subscriber.init();
    }

    tracing::info!(version = netsketch_core::VERSION, "starting netsketch");

    if let Err(err) = netsketch_cli::run(&matches).await {
        tracing::error!("{err:#}");
        eprintln!("error: {err:#}");
        process::exit(1);
    }
}
