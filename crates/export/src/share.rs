//! Plain-text budget summaries and the WhatsApp / email hand-off links.

use budgetkit_core::domain::project::ProjectCatalog;
use budgetkit_core::DerivedTotals;
use serde::Serialize;
use url::form_urlencoded::byte_serialize;
use url::Url;

use crate::error::ExportError;
use crate::format::MoneyFormat;

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct EmailDraft {
    pub subject: String,
    pub body: String,
}

pub fn message_summary(project: &ProjectCatalog, totals: &DerivedTotals, money: &MoneyFormat) -> String {
    [
        format!("Project: {}", project.company),
        format!("Total: {}", money.amount(totals.total)),
        format!("Savings: {}", money.saving(totals.savings)),
        format!("Extras: {}", money.extra(totals.extras)),
        format!("Monthly maintenance: {}", money.monthly(totals.monthly)),
    ]
    .join("\n")
}

pub fn email_draft(project: &ProjectCatalog, totals: &DerivedTotals, money: &MoneyFormat) -> EmailDraft {
    EmailDraft {
        subject: format!("Budget: {}", project.company),
        body: message_summary(project, totals, money),
    }
}

/// `https://wa.me/<digits>?text=<encoded>`. Everything but digits is dropped
/// from `number`.
pub fn whatsapp_link(number: &str, text: &str) -> Result<String, ExportError> {
    let digits: String = number.chars().filter(char::is_ascii_digit).collect();
    if digits.is_empty() {
        return Err(ExportError::InvalidRecipient(number.to_string()));
    }

    let mut url = Url::parse(&format!("https://wa.me/{digits}"))?;
    url.set_query(Some(&format!("text={}", encode_component(text))));
    Ok(url.into())
}

pub fn mailto_link(address: &str, draft: &EmailDraft) -> Result<String, ExportError> {
    let address = address.trim();
    let valid = address
        .split_once('@')
        .is_some_and(|(user, domain)| !user.is_empty() && !domain.is_empty());
    if !valid || address.contains(&['?', '&', ' '][..]) {
        return Err(ExportError::InvalidRecipient(address.to_string()));
    }

    let mut url = Url::parse(&format!("mailto:{address}"))?;
    url.set_query(Some(&format!(
        "subject={}&body={}",
        encode_component(&draft.subject),
        encode_component(&draft.body)
    )));
    Ok(url.into())
}

// Form encoding writes spaces as `+`, which mail clients keep literally.
fn encode_component(value: &str) -> String {
    byte_serialize(value.as_bytes()).collect::<String>().replace('+', "%20")
}
