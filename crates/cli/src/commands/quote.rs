use budgetkit_core::{BudgetSession, DerivedTotals, LoadOptions, Money, ServiceKind};
use budgetkit_export::MoneyFormat;
use chrono::NaiveDate;
use serde::Serialize;

use crate::commands::{open_session, CommandResult, SessionArgs};

const COMMAND: &str = "quote";

#[derive(Debug, Serialize)]
struct QuotedService {
    id: String,
    title: String,
    kind: ServiceKind,
    delta: Money,
}

#[derive(Debug, Serialize)]
struct QuotedPlan {
    id: String,
    title: String,
    monthly: Money,
}

#[derive(Debug, Serialize)]
struct QuoteReport {
    command: &'static str,
    status: &'static str,
    session_id: String,
    project: String,
    company: String,
    client: String,
    services: Vec<QuotedService>,
    maintenance: Vec<QuotedPlan>,
    totals: DerivedTotals,
}

pub fn run(
    options: &LoadOptions,
    args: &SessionArgs,
    json_output: bool,
    today: NaiveDate,
) -> CommandResult {
    let (config, session) = match open_session(options, args, today) {
        Ok(opened) => opened,
        Err(error) => return CommandResult::from_error(COMMAND, error),
    };

    let report = build_report(&session);
    if json_output {
        return CommandResult::report(COMMAND, &report);
    }

    CommandResult::text(render_human(&report, &MoneyFormat::new(config.export.currency_symbol)))
}

fn build_report(session: &BudgetSession) -> QuoteReport {
    let engine = session.engine();

    QuoteReport {
        command: COMMAND,
        status: "ok",
        session_id: session.id().to_string(),
        project: session.descriptor().project.to_string(),
        company: session.catalog().project.company.clone(),
        client: session.descriptor().client.clone(),
        services: engine
            .selected_services()
            .iter()
            .map(|service| QuotedService {
                id: service.id.to_string(),
                title: service.title.clone(),
                kind: service.kind,
                delta: service.delta(),
            })
            .collect(),
        maintenance: engine
            .selected_maintenance()
            .iter()
            .map(|item| QuotedPlan {
                id: item.id.to_string(),
                title: item.title.clone(),
                monthly: item.price,
            })
            .collect(),
        totals: engine.totals(),
    }
}

fn render_human(report: &QuoteReport, money: &MoneyFormat) -> String {
    let mut lines = vec![format!(
        "budget for {} (project {}, client {})",
        report.company, report.project, report.client
    )];

    for service in &report.services {
        let signed = match service.kind {
            ServiceKind::Discount => money.saving(service.delta),
            ServiceKind::Addon => money.extra(service.delta),
        };
        lines.push(format!("- [{}] {} {}: {signed}", service.kind.label(), service.id, service.title));
    }
    for plan in &report.maintenance {
        lines.push(format!("- [MONTHLY] {} {}: {}", plan.id, plan.title, money.monthly(plan.monthly)));
    }

    let totals = &report.totals;
    lines.push(format!("base price: {}", money.amount(totals.base_price)));
    lines.push(format!("savings: {}", money.saving(totals.savings)));
    lines.push(format!("extras: {}", money.extra(totals.extras)));
    lines.push(format!("total: {}", money.amount(totals.total)));
    lines.push(format!("monthly maintenance: {}", money.monthly(totals.monthly)));

    lines.join("\n")
}
