mod commands;
mod config;
mod error;

use clap::Parser;

use ledger_engine::Ledger;
use sensor_contract::SensorContract;

use crate::config::{Cli, SensorLedgerConfig};
use crate::error::CliError;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    if let Err(e) = run(&cli) {
        tracing::error!(error = %e, "command failed");
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

fn run(cli: &Cli) -> Result<(), CliError> {
    tracing::debug!(config = %cli.config, "loading configuration");
    let config = SensorLedgerConfig::load(&cli.config)?;

    let journal = commands::open_journal(&config.storage)?;
    let ledger = Ledger::open(journal)?;
    let contract = SensorContract::new(&config.contract)?;
    let events = ledger.subscribe(16)?;

    let output = commands::execute(&ledger, &contract, &cli.command)?;
    ledger.flush()?;

    for event in events.try_iter() {
        tracing::info!(event = %event.name, payload = %event.payload_text(), "ledger event");
    }

    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}
