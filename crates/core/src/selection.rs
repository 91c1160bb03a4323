//! Selection engine: toggle state over a fixed base price.
//!
//! The engine stores only which items are selected. Savings, extras, the
//! monthly price and the total are derived from those sets on every read, so
//! they can never disagree with the current selection.

use serde::{Deserialize, Serialize};

use crate::domain::money::Money;
use crate::domain::service::{ItemId, MaintenanceItem, ServiceItem, ServiceKind};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Membership {
    Selected,
    Deselected,
}

/// Selected items in the order they were picked. Ids are unique within each set.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectionState {
    base_price: Money,
    services: Vec<ServiceItem>,
    maintenance: Vec<MaintenanceItem>,
}

impl SelectionState {
    pub fn base_price(&self) -> Money {
        self.base_price
    }

    pub fn services(&self) -> &[ServiceItem] {
        &self.services
    }

    pub fn maintenance(&self) -> &[MaintenanceItem] {
        &self.maintenance
    }

    pub fn is_empty(&self) -> bool {
        self.services.is_empty() && self.maintenance.is_empty()
    }

    pub fn totals(&self) -> DerivedTotals {
        let savings = self.sum_services(ServiceKind::Discount);
        let extras = self.sum_services(ServiceKind::Addon);
        let monthly = self.maintenance.iter().map(|item| item.price).sum();

        DerivedTotals {
            base_price: self.base_price,
            savings,
            extras,
            monthly,
            total: self.base_price - savings + extras,
        }
    }

    fn sum_services(&self, kind: ServiceKind) -> Money {
        self.services
            .iter()
            .filter(|service| service.kind == kind)
            .map(|service| match kind {
                ServiceKind::Discount => service.magnitude(),
                ServiceKind::Addon => service.price,
            })
            .sum()
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DerivedTotals {
    pub base_price: Money,
    /// Always non-negative: sum of `|price|` over selected discounts.
    pub savings: Money,
    pub extras: Money,
    pub monthly: Money,
    pub total: Money,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SelectionEngine {
    state: SelectionState,
}

impl SelectionEngine {
    pub fn new(base_price: Money) -> Self {
        Self {
            state: SelectionState { base_price, services: Vec::new(), maintenance: Vec::new() },
        }
    }

    /// Removes `service` when its id is selected, adds it otherwise. Catalog
    /// membership is the caller's concern.
    pub fn toggle_service(&mut self, service: &ServiceItem) -> Membership {
        toggle(&mut self.state.services, service, |item| &item.id)
    }

    pub fn toggle_maintenance(&mut self, item: &MaintenanceItem) -> Membership {
        toggle(&mut self.state.maintenance, item, |item| &item.id)
    }

    /// Empties both sets. The base price is kept.
    pub fn clear_all(&mut self) {
        self.state.services.clear();
        self.state.maintenance.clear();
    }

    pub fn is_service_selected(&self, id: &ItemId) -> bool {
        self.state.services.iter().any(|service| &service.id == id)
    }

    pub fn is_maintenance_selected(&self, id: &ItemId) -> bool {
        self.state.maintenance.iter().any(|item| &item.id == id)
    }

    pub fn selected_services(&self) -> &[ServiceItem] {
        self.state.services()
    }

    pub fn selected_maintenance(&self) -> &[MaintenanceItem] {
        self.state.maintenance()
    }

    pub fn has_selections(&self) -> bool {
        !self.state.is_empty()
    }

    pub fn state(&self) -> &SelectionState {
        &self.state
    }

    pub fn base_price(&self) -> Money {
        self.state.base_price
    }

    pub fn savings(&self) -> Money {
        self.state.sum_services(ServiceKind::Discount)
    }

    pub fn extras(&self) -> Money {
        self.state.sum_services(ServiceKind::Addon)
    }

    pub fn monthly_price(&self) -> Money {
        self.state.maintenance.iter().map(|item| item.price).sum()
    }

    pub fn total_price(&self) -> Money {
        self.state.base_price - self.savings() + self.extras()
    }

    pub fn totals(&self) -> DerivedTotals {
        self.state.totals()
    }
}

fn toggle<T: Clone>(set: &mut Vec<T>, item: &T, id: impl Fn(&T) -> &ItemId) -> Membership {
    let key = id(item);
    if let Some(position) = set.iter().position(|existing| id(existing) == key) {
        set.remove(position);
        Membership::Deselected
    } else {
        set.push(item.clone());
        Membership::Selected
    }
}
