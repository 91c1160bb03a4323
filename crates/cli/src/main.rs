use std::process::ExitCode;

use budgetkit_cli::Cli;
use budgetkit_core::{AppConfig, LogFormat};
use clap::Parser;
use tracing::Level;

fn init_logging(config: &AppConfig) {
    let log_level = config.logging.level.parse::<Level>().unwrap_or(Level::INFO);

    // stdout carries command payloads; logs go to stderr.
    match config.logging.format {
        LogFormat::Compact => {
            tracing_subscriber::fmt()
                .with_target(false)
                .with_max_level(log_level)
                .with_writer(std::io::stderr)
                .compact()
                .init();
        }
        LogFormat::Pretty => {
            tracing_subscriber::fmt()
                .with_target(false)
                .with_max_level(log_level)
                .with_writer(std::io::stderr)
                .pretty()
                .init();
        }
        LogFormat::Json => {
            tracing_subscriber::fmt()
                .with_target(false)
                .with_max_level(log_level)
                .with_writer(std::io::stderr)
                .json()
                .init();
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // A broken config still gets reported by the command itself, so logging
    // falls back to defaults here.
    let config = AppConfig::load(cli.load_options()).unwrap_or_default();
    init_logging(&config);

    let result = budgetkit_cli::run(cli).await;
    println!("{}", result.output);
    ExitCode::from(result.exit_code)
}
