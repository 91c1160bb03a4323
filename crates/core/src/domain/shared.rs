//! Cross-project metadata: payment terms, infrastructure options, standard
//! clarifications and the shared service and maintenance lists.
//!
//! Every block except the contact line is optional. The exporter skips
//! whatever is absent.

use serde::{Deserialize, Serialize};

use crate::domain::money::Money;
use crate::domain::service::{ContactInfo, MaintenanceItem, ServiceItem};

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SharedCatalog {
    #[serde(default, alias = "formaPago")]
    pub payment_terms: Option<PaymentTerms>,
    #[serde(default, alias = "infraestructuraTecnica")]
    pub infrastructure: Option<Infrastructure>,
    #[serde(default, alias = "aclaraciones")]
    pub clarifications: Option<Clarifications>,
    #[serde(default, alias = "ejemplosCostesMenuales", alias = "ejemplosCostesMensuales")]
    pub monthly_cost_examples: Option<MonthlyCostExamples>,
    #[serde(default, alias = "siguientePaso")]
    pub next_steps: Option<NextSteps>,
    #[serde(default, alias = "validezPresupuesto")]
    pub validity: Option<String>,
    #[serde(default, alias = "contacto")]
    pub contact: ContactInfo,
    #[serde(default, alias = "serviciosExtra")]
    pub services: Vec<ServiceItem>,
    #[serde(default, alias = "serviciosMantenimiento")]
    pub maintenance: Vec<MaintenanceItem>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentTerms {
    #[serde(default, alias = "descripcion")]
    pub description: String,
    #[serde(alias = "porcentajes")]
    pub split: PaymentSplit,
    #[serde(default, alias = "metodos")]
    pub methods: Vec<String>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentSplit {
    #[serde(alias = "inicio")]
    pub upfront_pct: u8,
    #[serde(alias = "produccion")]
    pub delivery_pct: u8,
}

impl PaymentSplit {
    pub fn is_complete(&self) -> bool {
        u16::from(self.upfront_pct) + u16::from(self.delivery_pct) == 100
    }

    /// Amounts due at kickoff and on delivery for a given total.
    pub fn installments(&self, total: Money) -> (Money, Money) {
        (total.percentage(self.upfront_pct), total.percentage(self.delivery_pct))
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Infrastructure {
    #[serde(default, alias = "sistemaEmails")]
    pub email: Option<EmailSystem>,
    #[serde(default, alias = "hostingServidores")]
    pub hosting: Option<Hosting>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmailSystem {
    #[serde(default, alias = "descripcion")]
    pub description: String,
    #[serde(default, alias = "opciones")]
    pub options: Vec<EmailOption>,
    #[serde(default, alias = "configuracion")]
    pub setup: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmailOption {
    #[serde(alias = "nombre")]
    pub name: String,
    #[serde(default, alias = "descripcion")]
    pub description: String,
    #[serde(default, alias = "coste")]
    pub cost: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Hosting {
    #[serde(default, alias = "descripcion")]
    pub description: String,
    #[serde(default, alias = "opciones")]
    pub options: Vec<HostingOption>,
    #[serde(default, alias = "decision")]
    pub decision: Option<HostingDecision>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct HostingOption {
    #[serde(alias = "tipo")]
    pub kind: String,
    #[serde(alias = "nombre")]
    pub name: String,
    #[serde(default, alias = "coste")]
    pub cost: String,
    #[serde(default, alias = "incluye")]
    pub includes: Vec<String>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct HostingDecision {
    #[serde(alias = "titulo")]
    pub title: String,
    #[serde(default, alias = "opciones")]
    pub options: Vec<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Clarifications {
    #[serde(default, alias = "incluido")]
    pub included: Vec<String>,
    #[serde(default, alias = "noIncluido")]
    pub excluded: Vec<String>,
    #[serde(default)]
    pub topics: Vec<ClarificationTopic>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClarificationTopic {
    #[serde(alias = "titulo")]
    pub title: String,
    #[serde(default, alias = "incluido")]
    pub included: String,
    #[serde(default, alias = "noIncluido")]
    pub excluded: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonthlyCostExamples {
    #[serde(alias = "titulo")]
    pub title: String,
    #[serde(default, alias = "casos")]
    pub cases: Vec<MonthlyCostCase>,
    #[serde(default, alias = "nota")]
    pub note: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonthlyCostCase {
    #[serde(alias = "nombre")]
    pub name: String,
    #[serde(default, alias = "componentes")]
    pub components: Vec<CostComponent>,
    pub total: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CostComponent {
    #[serde(alias = "concepto")]
    pub concept: String,
    #[serde(alias = "coste")]
    pub cost: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct NextSteps {
    #[serde(alias = "titulo")]
    pub title: String,
    #[serde(default, alias = "objetivos")]
    pub goals: Vec<String>,
}

impl SharedCatalog {
    pub fn validity_or_default(&self) -> &str {
        self.validity.as_deref().unwrap_or("30 days")
    }
}
