pub mod commands;

use std::path::PathBuf;

use budgetkit_core::{ConfigOverrides, LoadOptions};
use budgetkit_export::SystemLauncher;
use chrono::{Local, NaiveDate};
use clap::{Parser, Subcommand};

use crate::commands::export::ExportArgs;
use crate::commands::share::ShareArgs;
use crate::commands::{CommandResult, SessionArgs};

#[derive(Debug, Parser)]
#[command(
    name = "budgetkit",
    about = "Budgetkit operator CLI",
    long_about = "Price web-project budgets from catalog files, export them as PDF or HTML, and hand share links to WhatsApp or email.",
    after_help = "Examples:\n  budgetkit catalog\n  budgetkit quote --project reformas --token rf_2026 --select own-logo\n  budgetkit export --project reformas --token rf_2026 --format pdf --out ./budgets\n  budgetkit doctor --json"
)]
pub struct Cli {
    #[arg(long, global = true, value_name = "PATH", help = "Config file (defaults to budgetkit.toml or config/budgetkit.toml)")]
    config: Option<PathBuf>,

    #[arg(long, global = true, value_name = "DIR", help = "Catalog directory, overriding config and env")]
    catalog_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    #[command(about = "List known projects and whether their catalogs load")]
    Catalog {
        #[arg(long, help = "Emit machine-readable JSON output")]
        json: bool,
    },
    #[command(about = "Open a budget session, apply selections and print the totals")]
    Quote {
        #[command(flatten)]
        session: SessionArgs,
        #[arg(long, help = "Emit machine-readable JSON output")]
        json: bool,
    },
    #[command(about = "Render the budget document and write it to the output directory")]
    Export(ExportArgs),
    #[command(about = "Build the WhatsApp or email hand-off for the current budget")]
    Share(ShareArgs),
    #[command(
        about = "Inspect effective configuration values with source attribution and redaction"
    )]
    Config,
    #[command(about = "Validate config, catalog directory, access tokens and PDF converter")]
    Doctor {
        #[arg(long, help = "Emit machine-readable JSON output")]
        json: bool,
    },
}

impl Cli {
    /// Config loading options implied by the global flags. An explicit
    /// `--config` must exist.
    pub fn load_options(&self) -> LoadOptions {
        LoadOptions {
            config_path: self.config.clone(),
            require_file: self.config.is_some(),
            overrides: ConfigOverrides {
                catalog_dir: self.catalog_dir.clone(),
                ..ConfigOverrides::default()
            },
        }
    }
}

pub async fn run(cli: Cli) -> CommandResult {
    let options = cli.load_options();
    let today = today();

    match cli.command {
        Command::Catalog { json } => commands::catalog::run(&options, json),
        Command::Quote { session, json } => commands::quote::run(&options, &session, json, today),
        Command::Export(args) => commands::export::run(&options, &args, today).await,
        Command::Share(args) => {
            commands::share::run(&options, &args, &SystemLauncher::detect(), today)
        }
        Command::Config => {
            CommandResult { exit_code: 0, output: commands::config::run(&options) }
        }
        Command::Doctor { json } => commands::doctor::run(&options, json, today),
    }
}

fn today() -> NaiveDate {
    Local::now().date_naive()
}
