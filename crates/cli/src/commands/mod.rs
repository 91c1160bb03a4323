pub mod catalog;
pub mod config;
pub mod doctor;
pub mod export;
pub mod quote;
pub mod share;

use budgetkit_core::{AccessGate, AppConfig, ApplicationError, BudgetSession, LoadOptions};
use chrono::NaiveDate;
use clap::Args;
use serde::Serialize;
use tracing::{info, warn};
use uuid::Uuid;

#[derive(Debug, Clone)]
pub struct CommandResult {
    pub exit_code: u8,
    pub output: String,
}

#[derive(Debug, Serialize)]
struct CommandOutcome {
    command: String,
    status: String,
    error_class: Option<String>,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    correlation_id: Option<String>,
}

impl CommandResult {
    pub fn success(command: &str, message: impl Into<String>) -> Self {
        let payload = CommandOutcome {
            command: command.to_string(),
            status: "ok".to_string(),
            error_class: None,
            message: message.into(),
            correlation_id: None,
        };
        Self { exit_code: 0, output: serialize_payload(payload) }
    }

    pub fn failure(
        command: &str,
        error_class: &str,
        message: impl Into<String>,
        exit_code: u8,
    ) -> Self {
        let payload = CommandOutcome {
            command: command.to_string(),
            status: "error".to_string(),
            error_class: Some(error_class.to_string()),
            message: message.into(),
            correlation_id: None,
        };
        Self { exit_code, output: serialize_payload(payload) }
    }

    /// Failure payload for an application error. The message is the fixed
    /// visitor-facing text followed by the operator detail.
    pub fn from_error(command: &str, error: ApplicationError) -> Self {
        let (error_class, exit_code) = classify(&error);
        let detail = error.to_string();
        let interface = error.into_interface(Uuid::new_v4().to_string());

        warn!(
            event_name = "budget.cli.command_failed",
            command,
            error_class,
            correlation_id = %interface.correlation_id(),
            error = %detail,
            "command failed"
        );

        let payload = CommandOutcome {
            command: command.to_string(),
            status: "error".to_string(),
            error_class: Some(error_class.to_string()),
            message: format!("{} [{detail}]", interface.user_message()),
            correlation_id: Some(interface.correlation_id().to_string()),
        };
        Self { exit_code, output: serialize_payload(payload) }
    }

    /// Successful command with a command-specific JSON body.
    pub fn report<T: Serialize>(command: &str, report: &T) -> Self {
        match serde_json::to_string_pretty(report) {
            Ok(output) => Self { exit_code: 0, output },
            Err(error) => Self::failure(command, "serialization", error.to_string(), 1),
        }
    }

    pub fn text(output: impl Into<String>) -> Self {
        Self { exit_code: 0, output: output.into() }
    }
}

/// Error class and exit code for each application failure.
pub fn classify(error: &ApplicationError) -> (&'static str, u8) {
    match error {
        ApplicationError::Configuration(_) => ("config_validation", 2),
        ApplicationError::Access(_) => ("access_denied", 2),
        ApplicationError::Domain(_) | ApplicationError::Selection(_) => ("invalid_selection", 2),
        ApplicationError::CatalogUnavailable(_) => ("catalog_unavailable", 3),
        ApplicationError::Export(_) => ("export_failed", 4),
    }
}

fn serialize_payload(payload: CommandOutcome) -> String {
    serde_json::to_string(&payload).unwrap_or_else(|error| {
        format!(
            "{{\"command\":\"unknown\",\"status\":\"error\",\"error_class\":\"serialization\",\"message\":\"{}\"}}",
            error.to_string().replace('\\', "\\\\").replace('"', "\\\"")
        )
    })
}

/// Budget link parameters plus the selections to apply before the command runs.
#[derive(Debug, Clone, Args)]
pub struct SessionArgs {
    #[arg(long, help = "Project key from the budget link")]
    pub project: String,
    #[arg(long, help = "Access token from the budget link")]
    pub token: String,
    #[arg(
        long = "select",
        value_name = "SERVICE_ID",
        help = "Toggle a discount or extra service by id (repeatable)"
    )]
    pub select: Vec<String>,
    #[arg(
        long = "maintenance",
        value_name = "PLAN_ID",
        help = "Toggle a monthly maintenance plan by id (repeatable)"
    )]
    pub maintenance: Vec<String>,
}

/// Loads config, checks the token, opens the session and applies the
/// requested toggles in order.
pub fn open_session(
    options: &LoadOptions,
    args: &SessionArgs,
    today: NaiveDate,
) -> Result<(AppConfig, BudgetSession), ApplicationError> {
    let config = AppConfig::load(options.clone())?;
    let descriptor =
        config.access_gate().authorize(Some(&args.project), Some(&args.token), today)?;

    let provider = config.catalog_provider();
    let mut session = BudgetSession::open(&provider, descriptor)?;

    for id in &args.select {
        session.toggle_service_by_id(id)?;
    }
    for id in &args.maintenance {
        session.toggle_maintenance_by_id(id)?;
    }

    info!(
        event_name = "budget.cli.session_ready",
        session_id = %session.id(),
        project = %session.descriptor().project,
        services = session.engine().selected_services().len(),
        maintenance = session.engine().selected_maintenance().len(),
        "session opened from command line"
    );

    Ok((config, session))
}
