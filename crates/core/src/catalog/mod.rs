//! Catalog provider: the immutable source of selectable items and budget
//! metadata for one project.
//!
//! Catalogs are handed to sessions as `Arc<Catalog>` values. Nothing reads
//! them from ambient global state.

mod json;
mod validation;

use std::collections::HashMap;
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::project::ProjectCatalog;
use crate::domain::service::{ContactInfo, ItemId, MaintenanceItem, ServiceItem};
use crate::domain::shared::SharedCatalog;
use crate::errors::DomainError;

pub use json::JsonCatalogProvider;
pub use validation::validate_catalog;

#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProjectKey(pub String);

impl ProjectKey {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for ProjectKey {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for ProjectKey {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl fmt::Display for ProjectKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("no budget configuration exists for project `{0}`")]
    NotFound(ProjectKey),
    #[error("budget configuration for project `{project}` is not available yet: {reason}")]
    Unavailable { project: ProjectKey, reason: String },
    #[error("could not read catalog file `{path}`: {source}")]
    Read { path: PathBuf, source: std::io::Error },
    #[error("could not parse catalog file `{path}`: {source}")]
    Parse { path: PathBuf, source: serde_json::Error },
    #[error("catalog for project `{project}` is invalid: {source}")]
    Invalid { project: ProjectKey, source: DomainError },
}

/// Project metadata plus the shared, cross-project metadata it is quoted with.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Catalog {
    pub project: ProjectCatalog,
    pub shared: SharedCatalog,
}

impl Catalog {
    pub fn new(project: ProjectCatalog, shared: SharedCatalog) -> Self {
        Self { project, shared }
    }

    /// Contact line for footers and share texts. Shared contact details win;
    /// the project's own contact is used when the shared block is blank.
    pub fn contact(&self) -> &ContactInfo {
        let shared = &self.shared.contact;
        if shared.phone.trim().is_empty() && shared.email.trim().is_empty() {
            &self.project.contact
        } else {
            shared
        }
    }

    /// Selectable services, project entries first. Ids already seen are skipped.
    pub fn selectable_services(&self) -> Vec<&ServiceItem> {
        let mut seen = std::collections::HashSet::new();
        self.project
            .services
            .iter()
            .chain(self.shared.services.iter())
            .filter(|service| seen.insert(&service.id))
            .collect()
    }

    /// Full add-on listing for the document, shared entries first.
    pub fn listed_services(&self) -> impl Iterator<Item = &ServiceItem> {
        self.shared.services.iter().chain(self.project.services.iter())
    }

    pub fn find_service(&self, id: &ItemId) -> Option<&ServiceItem> {
        self.selectable_services().into_iter().find(|service| &service.id == id)
    }

    pub fn maintenance(&self) -> &[MaintenanceItem] {
        &self.shared.maintenance
    }

    pub fn find_maintenance(&self, id: &ItemId) -> Option<&MaintenanceItem> {
        self.shared.maintenance.iter().find(|item| &item.id == id)
    }
}

pub trait CatalogProvider: Send + Sync {
    fn load(&self, project: &ProjectKey) -> Result<Arc<Catalog>, CatalogError>;

    /// Keys this provider can be asked for, including ones that are known but
    /// not available yet.
    fn projects(&self) -> Vec<ProjectKey>;
}

#[derive(Default)]
pub struct InMemoryCatalogProvider {
    catalogs: HashMap<ProjectKey, Arc<Catalog>>,
}

impl InMemoryCatalogProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: impl Into<ProjectKey>, catalog: Catalog) -> Result<(), CatalogError> {
        let key = key.into();
        validate_catalog(&catalog)
            .map_err(|source| CatalogError::Invalid { project: key.clone(), source })?;
        self.catalogs.insert(key, Arc::new(catalog));
        Ok(())
    }

    pub fn with(mut self, key: impl Into<ProjectKey>, catalog: Catalog) -> Result<Self, CatalogError> {
        self.insert(key, catalog)?;
        Ok(self)
    }
}

impl CatalogProvider for InMemoryCatalogProvider {
    fn load(&self, project: &ProjectKey) -> Result<Arc<Catalog>, CatalogError> {
        self.catalogs.get(project).cloned().ok_or_else(|| CatalogError::NotFound(project.clone()))
    }

    fn projects(&self) -> Vec<ProjectKey> {
        let mut keys: Vec<_> = self.catalogs.keys().cloned().collect();
        keys.sort();
        keys
    }
}


#[cfg(test)]
mod tests {
    use super::fixtures;
    use super::{CatalogError, CatalogProvider, InMemoryCatalogProvider, ProjectKey};
    use crate::domain::service::{ContactInfo, ItemId};
    use crate::domain::money::Money;

    #[test]
    fn project_services_shadow_shared_services_with_the_same_id() {
        let catalog = fixtures::catalog();
        let blog = catalog.find_service(&ItemId::from("blog")).expect("blog exists");
        assert_eq!(blog.price, Money::new(150));

        let ids: Vec<_> =
            catalog.selectable_services().iter().map(|service| service.id.0.clone()).collect();
        assert_eq!(ids, vec!["own-logo", "blog", "own-texts"]);
    }

    #[test]
    fn contact_falls_back_to_project_contact() {
        let mut catalog = fixtures::catalog();
        assert_eq!(catalog.contact().email, "hello@example.com");

        catalog.shared.contact = ContactInfo::default();
        assert_eq!(catalog.contact().email, "project@example.com");
    }

    #[test]
    fn in_memory_provider_reports_unknown_projects() {
        let provider =
            InMemoryCatalogProvider::new().with("reformas", fixtures::catalog()).expect("valid");

        assert!(provider.load(&ProjectKey::from("reformas")).is_ok());
        assert!(matches!(
            provider.load(&ProjectKey::from("legal")),
            Err(CatalogError::NotFound(ref key)) if key.as_str() == "legal"
        ));
        assert_eq!(provider.projects(), vec![ProjectKey::from("reformas")]);
    }

    #[test]
    fn in_memory_provider_rejects_invalid_catalogs() {
        let mut catalog = fixtures::catalog();
        catalog.shared.maintenance.push(fixtures::maintenance("basic", 10));

        let result = InMemoryCatalogProvider::new().with("reformas", catalog);
        assert!(matches!(result, Err(CatalogError::Invalid { .. })));
    }
}
