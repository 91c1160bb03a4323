use std::sync::Arc;

use chrono::NaiveDate;
use thiserror::Error;
use tracing::{debug, info};
use uuid::Uuid;

use crate::access::SessionDescriptor;
use crate::catalog::{Catalog, CatalogError, CatalogProvider};
use crate::domain::service::{ItemId, MaintenanceItem, ServiceItem, ServiceKind};
use crate::selection::{DerivedTotals, Membership, SelectionEngine, SelectionState};

#[derive(Debug, Error)]
pub enum SessionError {
    #[error(transparent)]
    Catalog(#[from] CatalogError),
    #[error("service `{0}` is not offered for this project")]
    UnknownService(String),
    #[error("maintenance plan `{0}` is not offered for this project")]
    UnknownMaintenance(String),
}

/// One visitor's budgeting session over a single project catalog.
pub struct BudgetSession {
    id: Uuid,
    descriptor: SessionDescriptor,
    catalog: Arc<Catalog>,
    engine: SelectionEngine,
}

/// Everything the exporter reads. Built from a session; never fed back into it.
#[derive(Clone, Debug)]
pub struct ExportSnapshot {
    pub catalog: Arc<Catalog>,
    pub client: String,
    pub selection: SelectionState,
    pub totals: DerivedTotals,
    pub generated_on: NaiveDate,
}

impl ExportSnapshot {
    pub fn new(
        catalog: Arc<Catalog>,
        client: impl Into<String>,
        engine: &SelectionEngine,
        generated_on: NaiveDate,
    ) -> Self {
        Self {
            catalog,
            client: client.into(),
            selection: engine.state().clone(),
            totals: engine.totals(),
            generated_on,
        }
    }
}

impl BudgetSession {
    pub fn open(
        provider: &dyn CatalogProvider,
        descriptor: SessionDescriptor,
    ) -> Result<Self, SessionError> {
        let catalog = provider.load(&descriptor.project)?;
        Ok(Self::with_catalog(descriptor, catalog))
    }

    pub fn with_catalog(descriptor: SessionDescriptor, catalog: Arc<Catalog>) -> Self {
        let id = Uuid::new_v4();
        let engine = SelectionEngine::new(catalog.project.base_price);
        info!(
            event_name = "budget.session.opened",
            session_id = %id,
            project = %descriptor.project,
            client = %descriptor.client,
            base_price = %catalog.project.base_price,
            "budget session opened"
        );
        Self { id, descriptor, catalog, engine }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn descriptor(&self) -> &SessionDescriptor {
        &self.descriptor
    }

    pub fn catalog(&self) -> &Arc<Catalog> {
        &self.catalog
    }

    pub fn engine(&self) -> &SelectionEngine {
        &self.engine
    }

    pub fn engine_mut(&mut self) -> &mut SelectionEngine {
        &mut self.engine
    }

    pub fn discount_candidates(&self) -> Vec<&ServiceItem> {
        self.candidates(ServiceKind::Discount)
    }

    pub fn addon_candidates(&self) -> Vec<&ServiceItem> {
        self.candidates(ServiceKind::Addon)
    }

    pub fn maintenance_candidates(&self) -> &[MaintenanceItem] {
        self.catalog.maintenance()
    }

    fn candidates(&self, kind: ServiceKind) -> Vec<&ServiceItem> {
        self.catalog
            .selectable_services()
            .into_iter()
            .filter(|service| service.kind == kind)
            .collect()
    }

    pub fn toggle_service_by_id(&mut self, id: &str) -> Result<Membership, SessionError> {
        let service = self
            .catalog
            .find_service(&ItemId::from(id))
            .ok_or_else(|| SessionError::UnknownService(id.to_string()))?;
        let membership = self.engine.toggle_service(service);
        debug!(
            event_name = "budget.selection.toggled",
            session_id = %self.id,
            item_id = %id,
            membership = ?membership,
            total = %self.engine.total_price(),
            "service toggled"
        );
        Ok(membership)
    }

    pub fn toggle_maintenance_by_id(&mut self, id: &str) -> Result<Membership, SessionError> {
        let item = self
            .catalog
            .find_maintenance(&ItemId::from(id))
            .ok_or_else(|| SessionError::UnknownMaintenance(id.to_string()))?;
        let membership = self.engine.toggle_maintenance(item);
        debug!(
            event_name = "budget.selection.toggled",
            session_id = %self.id,
            item_id = %id,
            membership = ?membership,
            monthly = %self.engine.monthly_price(),
            "maintenance plan toggled"
        );
        Ok(membership)
    }

    pub fn clear_all(&mut self) {
        self.engine.clear_all();
        debug!(event_name = "budget.selection.cleared", session_id = %self.id, "selection cleared");
    }

    pub fn snapshot(&self, generated_on: NaiveDate) -> ExportSnapshot {
        ExportSnapshot::new(
            Arc::clone(&self.catalog),
            self.descriptor.client.clone(),
            &self.engine,
            generated_on,
        )
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::{BudgetSession, SessionError};
    use crate::access::SessionDescriptor;
    use crate::catalog::{fixtures, CatalogError, InMemoryCatalogProvider, ProjectKey};
    use crate::domain::money::Money;
    use crate::selection::Membership;

    fn provider() -> InMemoryCatalogProvider {
        InMemoryCatalogProvider::new().with("reformas", fixtures::catalog()).expect("valid catalog")
    }

    fn descriptor(project: &str) -> SessionDescriptor {
        SessionDescriptor { client: "García Reformas S.L.".to_string(), project: ProjectKey::from(project) }
    }

    #[test]
    fn session_is_seeded_with_the_project_base_price() {
        let session = BudgetSession::open(&provider(), descriptor("reformas")).expect("opens");
        assert_eq!(session.engine().total_price(), Money::new(2000));
        assert!(!session.engine().has_selections());
    }

    #[test]
    fn unknown_project_is_a_catalog_error() {
        let result = BudgetSession::open(&provider(), descriptor("legal"));
        assert!(matches!(result, Err(SessionError::Catalog(CatalogError::NotFound(_)))));
    }

    #[test]
    fn candidates_are_partitioned_by_kind() {
        let session = BudgetSession::open(&provider(), descriptor("reformas")).expect("opens");

        let discounts: Vec<_> = session.discount_candidates().iter().map(|s| s.id.0.clone()).collect();
        let addons: Vec<_> = session.addon_candidates().iter().map(|s| s.id.0.clone()).collect();

        assert_eq!(discounts, vec!["own-logo", "own-texts"]);
        assert_eq!(addons, vec!["blog"]);
        assert_eq!(session.maintenance_candidates().len(), 2);
    }

    #[test]
    fn toggling_by_id_drives_the_engine() {
        let mut session = BudgetSession::open(&provider(), descriptor("reformas")).expect("opens");

        assert_eq!(session.toggle_service_by_id("own-logo").expect("known"), Membership::Selected);
        assert_eq!(session.toggle_service_by_id("blog").expect("known"), Membership::Selected);
        assert_eq!(session.toggle_maintenance_by_id("pro").expect("known"), Membership::Selected);

        let totals = session.engine().totals();
        assert_eq!(totals.savings, Money::new(300));
        assert_eq!(totals.extras, Money::new(150));
        assert_eq!(totals.monthly, Money::new(45));
        assert_eq!(totals.total, Money::new(1850));

        session.clear_all();
        assert_eq!(session.engine().total_price(), Money::new(2000));
    }

    #[test]
    fn unknown_ids_are_reported() {
        let mut session = BudgetSession::open(&provider(), descriptor("reformas")).expect("opens");
        assert!(matches!(
            session.toggle_service_by_id("nope"),
            Err(SessionError::UnknownService(ref id)) if id == "nope"
        ));
        assert!(matches!(
            session.toggle_maintenance_by_id("nope"),
            Err(SessionError::UnknownMaintenance(_))
        ));
    }

    #[test]
    fn snapshot_captures_current_totals() {
        let mut session = BudgetSession::open(&provider(), descriptor("reformas")).expect("opens");
        session.toggle_service_by_id("blog").expect("known");

        let date = NaiveDate::from_ymd_opt(2026, 10, 14).expect("date");
        let snapshot = session.snapshot(date);
        session.clear_all();

        assert_eq!(snapshot.totals.total, Money::new(2150));
        assert_eq!(snapshot.selection.services().len(), 1);
        assert_eq!(snapshot.client, "García Reformas S.L.");
        assert_eq!(snapshot.generated_on, date);
    }
}
