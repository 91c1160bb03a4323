use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::{debug, info, warn};

use crate::catalog::{validate_catalog, Catalog, CatalogError, CatalogProvider, ProjectKey};
use crate::domain::project::ProjectCatalog;
use crate::domain::service::MaintenanceItem;
use crate::domain::shared::SharedCatalog;

const SHARED_FILE: &str = "common.json";
const MAINTENANCE_FILE: &str = "maintenance.json";
const PROJECTS_DIR: &str = "projects";

/// Reads catalogs from a directory laid out as:
///
/// ```text
/// <root>/common.json          shared metadata (optional)
/// <root>/maintenance.json     monthly plans (optional)
/// <root>/projects/<key>.json  one file per project
/// ```
#[derive(Clone, Debug)]
pub struct JsonCatalogProvider {
    root: PathBuf,
    aliases: BTreeMap<String, String>,
    unavailable: BTreeMap<String, String>,
}

#[derive(Debug, Deserialize)]
struct MaintenanceFile {
    #[serde(default, alias = "serviciosMantenimiento")]
    maintenance: Vec<MaintenanceItem>,
}

impl JsonCatalogProvider {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into(), aliases: BTreeMap::new(), unavailable: BTreeMap::new() }
    }

    /// Serve `alias` with the catalog stored under `target`.
    pub fn with_alias(mut self, alias: impl Into<String>, target: impl Into<String>) -> Self {
        self.aliases.insert(alias.into(), target.into());
        self
    }

    /// Declare a project key that is known but has no catalog yet.
    pub fn with_unavailable(mut self, project: impl Into<String>, reason: impl Into<String>) -> Self {
        self.unavailable.insert(project.into(), reason.into());
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn resolve<'a>(&'a self, project: &'a ProjectKey) -> &'a str {
        self.aliases.get(project.as_str()).map(String::as_str).unwrap_or(project.as_str())
    }

    fn load_shared(&self) -> Result<SharedCatalog, CatalogError> {
        let shared_path = self.root.join(SHARED_FILE);
        let mut shared = if shared_path.exists() {
            read_json::<SharedCatalog>(&shared_path)?
        } else {
            debug!(
                event_name = "budget.catalog.shared_missing",
                path = %shared_path.display(),
                "no shared catalog file, using empty shared metadata"
            );
            SharedCatalog::default()
        };

        let maintenance_path = self.root.join(MAINTENANCE_FILE);
        if maintenance_path.exists() {
            let file = read_json::<MaintenanceFile>(&maintenance_path)?;
            shared.maintenance.extend(file.maintenance);
        }

        Ok(shared)
    }
}

impl CatalogProvider for JsonCatalogProvider {
    fn load(&self, project: &ProjectKey) -> Result<Arc<Catalog>, CatalogError> {
        if let Some(reason) = self.unavailable.get(project.as_str()) {
            warn!(
                event_name = "budget.catalog.unavailable",
                project = %project,
                reason = %reason,
                "requested project has no catalog yet"
            );
            return Err(CatalogError::Unavailable { project: project.clone(), reason: reason.clone() });
        }

        let file_stem = self.resolve(project);
        if !is_safe_stem(file_stem) {
            return Err(CatalogError::NotFound(project.clone()));
        }

        let project_path = self.root.join(PROJECTS_DIR).join(format!("{file_stem}.json"));
        if !project_path.exists() {
            warn!(
                event_name = "budget.catalog.not_found",
                project = %project,
                path = %project_path.display(),
                "no catalog file for requested project"
            );
            return Err(CatalogError::NotFound(project.clone()));
        }

        let project_catalog = read_json::<ProjectCatalog>(&project_path)?;
        let catalog = Catalog::new(project_catalog, self.load_shared()?);
        validate_catalog(&catalog)
            .map_err(|source| CatalogError::Invalid { project: project.clone(), source })?;

        info!(
            event_name = "budget.catalog.loaded",
            project = %project,
            source_file = %project_path.display(),
            services = catalog.selectable_services().len(),
            maintenance = catalog.maintenance().len(),
            "catalog loaded"
        );

        Ok(Arc::new(catalog))
    }

    fn projects(&self) -> Vec<ProjectKey> {
        let mut keys: Vec<String> = fs::read_dir(self.root.join(PROJECTS_DIR))
            .map(|entries| {
                entries
                    .filter_map(Result::ok)
                    .map(|entry| entry.path())
                    .filter(|path| path.extension().is_some_and(|ext| ext == "json"))
                    .filter_map(|path| path.file_stem().map(|stem| stem.to_string_lossy().into_owned()))
                    .collect()
            })
            .unwrap_or_default();

        keys.extend(self.aliases.keys().cloned());
        keys.extend(self.unavailable.keys().cloned());
        keys.sort();
        keys.dedup();
        keys.into_iter().map(ProjectKey).collect()
    }
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, CatalogError> {
    let raw = fs::read_to_string(path)
        .map_err(|source| CatalogError::Read { path: path.to_path_buf(), source })?;
    serde_json::from_str(&raw).map_err(|source| CatalogError::Parse { path: path.to_path_buf(), source })
}

// Keys come from request parameters; they must not walk out of the projects dir.
fn is_safe_stem(stem: &str) -> bool {
    !stem.is_empty()
        && stem.chars().all(|ch| ch.is_ascii_alphanumeric() || ch == '-' || ch == '_')
}
