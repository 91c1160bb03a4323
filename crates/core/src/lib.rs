pub mod access;
pub mod catalog;
pub mod config;
pub mod domain;
pub mod errors;
pub mod selection;
pub mod session;

pub use access::{AccessError, AccessGate, SessionDescriptor, TokenEntry, TokenGate};
pub use catalog::{
    Catalog, CatalogError, CatalogProvider, InMemoryCatalogProvider, JsonCatalogProvider,
    ProjectKey,
};
pub use config::{AppConfig, ConfigError, ConfigOverrides, LoadOptions, LogFormat};
pub use domain::money::Money;
pub use domain::project::ProjectCatalog;
pub use domain::service::{ContactInfo, ItemId, MaintenanceItem, ServiceItem, ServiceKind};
pub use domain::shared::SharedCatalog;
pub use errors::{ApplicationError, DomainError, InterfaceError};
pub use selection::{DerivedTotals, Membership, SelectionEngine, SelectionState};
pub use session::{BudgetSession, ExportSnapshot, SessionError};
