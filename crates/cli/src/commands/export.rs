use std::path::PathBuf;

use budgetkit_core::{AppConfig, ApplicationError, BudgetSession, LoadOptions};
use budgetkit_export::{
    file_name, ArtifactWriter, DocumentRenderer, ExportError, ExportSettings, OutputFormat,
    ReportExporter,
};
use chrono::NaiveDate;
use clap::Args;
use serde::Serialize;
use tracing::info;

use crate::commands::{open_session, CommandResult, SessionArgs};

const COMMAND: &str = "export";

#[derive(Debug, Clone, Args)]
pub struct ExportArgs {
    #[command(flatten)]
    pub session: SessionArgs,
    #[arg(long, value_name = "html|pdf", help = "Output format (defaults to export.prefer_pdf)")]
    pub format: Option<OutputFormat>,
    #[arg(long, value_name = "DIR", help = "Output directory, overriding export.output_dir")]
    pub out: Option<PathBuf>,
}

#[derive(Debug, Serialize)]
struct ExportReport {
    command: &'static str,
    status: &'static str,
    session_id: String,
    path: String,
    requested_format: OutputFormat,
    format: OutputFormat,
    pages: usize,
}

pub async fn run(options: &LoadOptions, args: &ExportArgs, today: NaiveDate) -> CommandResult {
    let mut options = options.clone();
    if let Some(out) = &args.out {
        options.overrides.output_dir = Some(out.clone());
    }

    let (config, session) = match open_session(&options, &args.session, today) {
        Ok(opened) => opened,
        Err(error) => return CommandResult::from_error(COMMAND, error),
    };

    match export_session(&config, &session, args.format, today).await {
        Ok(report) => CommandResult::report(COMMAND, &report),
        Err(error) => CommandResult::from_error(COMMAND, ApplicationError::from(error)),
    }
}

async fn export_session(
    config: &AppConfig,
    session: &BudgetSession,
    format: Option<OutputFormat>,
    today: NaiveDate,
) -> Result<ExportReport, ExportError> {
    let snapshot = session.snapshot(today);
    let exporter =
        ReportExporter::new(ExportSettings::with_currency(config.export.currency_symbol.clone()));
    let document = exporter.export(&snapshot);

    let requested = format.unwrap_or(if config.export.prefer_pdf {
        OutputFormat::Pdf
    } else {
        OutputFormat::Html
    });
    let renderer = match requested {
        OutputFormat::Html => DocumentRenderer::html_only()?,
        OutputFormat::Pdf => DocumentRenderer::new(config.export.wkhtmltopdf_path.as_deref())?,
    };
    let artifact = renderer.render(&document, requested).await?;

    let name =
        file_name(&snapshot.catalog.project.company, snapshot.generated_on, artifact.extension());
    let path =
        ArtifactWriter::new(config.export.output_dir.clone()).write(&name, artifact.as_bytes())?;

    info!(
        event_name = "budget.cli.export_written",
        session_id = %session.id(),
        path = %path.display(),
        format = %artifact.format(),
        pages = document.page_count(),
        "budget document exported"
    );

    Ok(ExportReport {
        command: COMMAND,
        status: "ok",
        session_id: session.id().to_string(),
        path: path.display().to_string(),
        requested_format: requested,
        format: artifact.format(),
        pages: document.page_count(),
    })
}
