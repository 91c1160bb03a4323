use budgetkit_core::{
    AppConfig, ApplicationError, CatalogError, CatalogProvider, LoadOptions, Money, ProjectKey,
};
use serde::Serialize;

use crate::commands::CommandResult;

const COMMAND: &str = "catalog";

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
enum ProjectStatus {
    Available,
    Unavailable,
    Invalid,
}

#[derive(Debug, Serialize)]
struct ProjectEntry {
    project: String,
    status: ProjectStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    company: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    base_price: Option<Money>,
    #[serde(skip_serializing_if = "Option::is_none")]
    services: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    maintenance: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<String>,
}

#[derive(Debug, Serialize)]
struct CatalogListing {
    catalog_dir: String,
    projects: Vec<ProjectEntry>,
}

pub fn run(options: &LoadOptions, json_output: bool) -> CommandResult {
    let config = match AppConfig::load(options.clone()) {
        Ok(config) => config,
        Err(error) => return CommandResult::from_error(COMMAND, ApplicationError::from(error)),
    };

    let provider = config.catalog_provider();
    let listing = CatalogListing {
        catalog_dir: config.catalog.dir.display().to_string(),
        projects: provider.projects().iter().map(|key| probe(&provider, key)).collect(),
    };

    if json_output {
        return CommandResult::report(COMMAND, &listing);
    }

    CommandResult::text(render_human(&listing))
}

fn probe(provider: &dyn CatalogProvider, key: &ProjectKey) -> ProjectEntry {
    let mut entry = ProjectEntry {
        project: key.to_string(),
        status: ProjectStatus::Available,
        company: None,
        base_price: None,
        services: None,
        maintenance: None,
        details: None,
    };

    match provider.load(key) {
        Ok(catalog) => {
            entry.company = Some(catalog.project.company.clone());
            entry.base_price = Some(catalog.project.base_price);
            entry.services = Some(catalog.selectable_services().len());
            entry.maintenance = Some(catalog.maintenance().len());
        }
        Err(error @ (CatalogError::Unavailable { .. } | CatalogError::NotFound(_))) => {
            entry.status = ProjectStatus::Unavailable;
            entry.details = Some(error.to_string());
        }
        Err(error) => {
            entry.status = ProjectStatus::Invalid;
            entry.details = Some(error.to_string());
        }
    }

    entry
}

fn render_human(listing: &CatalogListing) -> String {
    let mut lines = vec![format!("catalog directory: {}", listing.catalog_dir)];

    if listing.projects.is_empty() {
        lines.push("- no projects found".to_string());
    }

    for entry in &listing.projects {
        let line = match entry.status {
            ProjectStatus::Available => format!(
                "- [ok] {}: {} (base {}, {} services, {} maintenance plans)",
                entry.project,
                entry.company.as_deref().unwrap_or_default(),
                entry.base_price.unwrap_or_default(),
                entry.services.unwrap_or_default(),
                entry.maintenance.unwrap_or_default(),
            ),
            ProjectStatus::Unavailable => format!(
                "- [unavailable] {}: {}",
                entry.project,
                entry.details.as_deref().unwrap_or_default()
            ),
            ProjectStatus::Invalid => format!(
                "- [invalid] {}: {}",
                entry.project,
                entry.details.as_deref().unwrap_or_default()
            ),
        };
        lines.push(line);
    }

    lines.join("\n")
}
