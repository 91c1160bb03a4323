use std::collections::HashSet;

use crate::catalog::Catalog;
use crate::domain::money::Money;
use crate::domain::service::{ItemId, ServiceKind};
use crate::errors::DomainError;

/// Boundary checks applied before a catalog reaches a session.
///
/// Discounts may carry either sign. Add-ons and maintenance plans must not be
/// negative, otherwise the extras and monthly totals could go below zero.
/// Every price must stay within [`Money::MAX_CATALOG_AMOUNT`].
pub fn validate_catalog(catalog: &Catalog) -> Result<(), DomainError> {
    let project = &catalog.project;

    check_bounds("project", &project.id, project.base_price)?;
    for service in project.services.iter().chain(catalog.shared.services.iter()) {
        check_bounds("service", service.id.as_str(), service.price)?;
    }
    for item in &catalog.shared.maintenance {
        check_bounds("maintenance plan", item.id.as_str(), item.price)?;
    }

    if project.base_price.is_negative() {
        return Err(DomainError::InvariantViolation(format!(
            "project `{}` has a negative base price ({})",
            project.id, project.base_price
        )));
    }

    check_unique_ids(project.services.iter().map(|service| &service.id))?;
    check_unique_ids(catalog.shared.services.iter().map(|service| &service.id))?;
    check_unique_ids(catalog.shared.maintenance.iter().map(|item| &item.id))?;

    for service in project.services.iter().chain(catalog.shared.services.iter()) {
        if service.kind == ServiceKind::Addon && service.price.is_negative() {
            return Err(DomainError::InvariantViolation(format!(
                "add-on `{}` has a negative price ({})",
                service.id, service.price
            )));
        }
    }

    for item in &catalog.shared.maintenance {
        if item.price.is_negative() {
            return Err(DomainError::InvariantViolation(format!(
                "maintenance plan `{}` has a negative monthly price ({})",
                item.id, item.price
            )));
        }
    }

    if let Some(terms) = &catalog.shared.payment_terms {
        if !terms.split.is_complete() {
            return Err(DomainError::InvariantViolation(format!(
                "payment split {}% + {}% does not add up to 100%",
                terms.split.upfront_pct, terms.split.delivery_pct
            )));
        }
    }

    Ok(())
}

fn check_bounds(kind: &str, id: &str, price: Money) -> Result<(), DomainError> {
    if price.within_catalog_bounds() {
        return Ok(());
    }
    Err(DomainError::InvariantViolation(format!(
        "{kind} `{id}` has a price of {price}, outside +/-{}",
        Money::MAX_CATALOG_AMOUNT
    )))
}

fn check_unique_ids<'a>(ids: impl Iterator<Item = &'a ItemId>) -> Result<(), DomainError> {
    let mut seen = HashSet::new();
    for id in ids {
        if id.as_str().trim().is_empty() {
            return Err(DomainError::InvariantViolation("catalog item with an empty id".to_string()));
        }
        if !seen.insert(id) {
            return Err(DomainError::DuplicateItemId(id.to_string()));
        }
    }
    Ok(())
}
