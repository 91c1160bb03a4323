use budgetkit_core::{AppConfig, ApplicationError, BudgetSession, LoadOptions};
use budgetkit_export::{
    email_draft, mailto_link, message_summary, whatsapp_link, ChannelLauncher, ExportError,
    MoneyFormat,
};
use chrono::NaiveDate;
use clap::{Args, ValueEnum};
use serde::Serialize;

use crate::commands::{open_session, CommandResult, SessionArgs};

const COMMAND: &str = "share";

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum Channel {
    Whatsapp,
    Email,
}

#[derive(Debug, Clone, Args)]
pub struct ShareArgs {
    #[command(flatten)]
    pub session: SessionArgs,
    #[arg(long, value_enum, help = "Hand-off channel")]
    pub channel: Channel,
    #[arg(long, help = "Open the link with the system handler")]
    pub open: bool,
}

#[derive(Debug, Serialize)]
struct ShareReport {
    command: &'static str,
    status: &'static str,
    session_id: String,
    channel: Channel,
    recipient: String,
    link: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    subject: Option<String>,
    body: String,
    launched: bool,
}

pub fn run(
    options: &LoadOptions,
    args: &ShareArgs,
    launcher: &dyn ChannelLauncher,
    today: NaiveDate,
) -> CommandResult {
    let (config, session) = match open_session(options, &args.session, today) {
        Ok(opened) => opened,
        Err(error) => return CommandResult::from_error(COMMAND, error),
    };

    let Some(recipient) = recipient(&config, &session, args.channel) else {
        let key = match args.channel {
            Channel::Whatsapp => "share.whatsapp_number",
            Channel::Email => "share.email_address",
        };
        return CommandResult::from_error(
            COMMAND,
            ApplicationError::Configuration(format!(
                "{key} is not set and the catalog contact has no fallback"
            )),
        );
    };

    match build_share(&config, &session, args, recipient, launcher) {
        Ok(report) => CommandResult::report(COMMAND, &report),
        Err(error) => CommandResult::from_error(COMMAND, ApplicationError::from(error)),
    }
}

/// Configured recipient first, then the catalog contact.
fn recipient(config: &AppConfig, session: &BudgetSession, channel: Channel) -> Option<String> {
    let contact = session.catalog().contact();
    let candidates = match channel {
        Channel::Whatsapp => vec![
            config.share.whatsapp_number.clone(),
            contact.whatsapp.clone(),
            Some(contact.phone.clone()),
        ],
        Channel::Email => vec![config.share.email_address.clone(), Some(contact.email.clone())],
    };

    candidates.into_iter().flatten().find(|value| !value.trim().is_empty())
}

fn build_share(
    config: &AppConfig,
    session: &BudgetSession,
    args: &ShareArgs,
    recipient: String,
    launcher: &dyn ChannelLauncher,
) -> Result<ShareReport, ExportError> {
    let money = MoneyFormat::new(config.export.currency_symbol.clone());
    let project = &session.catalog().project;
    let totals = session.engine().totals();

    let (link, subject, body) = match args.channel {
        Channel::Whatsapp => {
            let text = message_summary(project, &totals, &money);
            (whatsapp_link(&recipient, &text)?, None, text)
        }
        Channel::Email => {
            let draft = email_draft(project, &totals, &money);
            let link = mailto_link(&recipient, &draft)?;
            (link, Some(draft.subject), draft.body)
        }
    };

    if args.open {
        launcher.open(&link)?;
    }

    Ok(ShareReport {
        command: COMMAND,
        status: "ok",
        session_id: session.id().to_string(),
        channel: args.channel,
        recipient,
        link,
        subject,
        body,
        launched: args.open,
    })
}
