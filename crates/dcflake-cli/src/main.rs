mod commands;
mod config;
mod telemetry;

use std::io::{self, BufWriter};

use clap::Parser;
use config::{AppConfig, CliArgs, Command};
use telemetry::init_telemetry;
use tracing::info;

fn main() -> anyhow::Result<()> {
    // Load from .env
    let _ = dotenvy::dotenv();
    let args = CliArgs::parse();
    init_telemetry()?;
    let config = AppConfig::try_from(args)?;

    if cfg!(debug_assertions) {
        info!("Starting dcflake with full config: {:#?}", config);
    } else {
        info!(
            identity = %config.identity,
            epoch_ms = config.epoch_ms(),
            "Starting dcflake"
        );
    }

    let mut out = BufWriter::new(io::stdout().lock());
    match &config.command {
        Command::Generate {
            count,
            threads,
            format,
        } => {
            let generator = config.generator();
            commands::generate::run(
                &generator,
                *count,
                *threads,
                *format,
                config.epoch_ms(),
                &mut out,
            )
        }
        Command::Decode { ids, json } => {
            commands::decode::run(ids, *json, config.epoch_ms(), &mut out)
        }
        Command::Inspect => commands::inspect::run(&config, &mut out),
    }
}
