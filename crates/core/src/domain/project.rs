use serde::{Deserialize, Serialize};

use crate::domain::money::Money;
use crate::domain::service::{ContactInfo, ServiceItem};

/// Per-project budget metadata. Loaded once per session and never mutated.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectCatalog {
    pub id: String,
    #[serde(alias = "empresa")]
    pub company: String,
    #[serde(alias = "precioBase")]
    pub base_price: Money,
    #[serde(default, alias = "tecnologia")]
    pub technology: String,
    #[serde(default, alias = "tiempo")]
    pub timeline: String,
    #[serde(default, alias = "descripcion")]
    pub description: String,
    #[serde(default, alias = "alcanceDelProyecto")]
    pub scope: Vec<String>,
    #[serde(default, alias = "desglose")]
    pub breakdown: Vec<BreakdownCategory>,
    #[serde(default, alias = "serviciosExtra")]
    pub services: Vec<ServiceItem>,
    #[serde(alias = "contacto")]
    pub contact: ContactInfo,
    #[serde(default, alias = "paginasYFuncionalidades")]
    pub pages_and_features: Option<PagesAndFeatures>,
    #[serde(default, alias = "cronograma")]
    pub schedule: Vec<SchedulePhase>,
    #[serde(default, alias = "cronogramaSiAdicionales")]
    pub schedule_extras: Option<ScheduleExtras>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BreakdownCategory {
    #[serde(alias = "categoria")]
    pub category: String,
    #[serde(alias = "precio")]
    pub price: Money,
    #[serde(default)]
    pub items: Vec<BreakdownItem>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BreakdownItem {
    #[serde(alias = "concepto")]
    pub concept: String,
    #[serde(default, alias = "descripcion")]
    pub description: String,
    #[serde(alias = "precio")]
    pub price: Money,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PagesAndFeatures {
    #[serde(default, alias = "paginasPrincipales")]
    pub main_pages: Vec<PageSummary>,
    #[serde(default, alias = "integracionesTecnicas")]
    pub integrations: Vec<String>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageSummary {
    #[serde(alias = "nombre")]
    pub name: String,
    #[serde(default, alias = "descripcion")]
    pub description: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchedulePhase {
    #[serde(alias = "semana")]
    pub week: u32,
    #[serde(alias = "tareas")]
    pub tasks: String,
    #[serde(default, alias = "entregables")]
    pub deliverables: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleExtras {
    #[serde(alias = "titulo")]
    pub title: String,
    #[serde(default, alias = "tiemposExtra")]
    pub extra_times: Vec<ExtraTime>,
    #[serde(default, alias = "nota")]
    pub note: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtraTime {
    #[serde(alias = "servicio")]
    pub service: String,
    #[serde(alias = "tiempo")]
    pub time: String,
}

impl PagesAndFeatures {
    pub fn is_empty(&self) -> bool {
        self.main_pages.is_empty() && self.integrations.is_empty()
    }
}
