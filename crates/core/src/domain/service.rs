use serde::{Deserialize, Serialize};

use crate::domain::money::Money;

#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ItemId(pub String);

impl ItemId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for ItemId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl std::fmt::Display for ItemId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// What selecting a service does to the one-time total.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ServiceKind {
    /// Something the client already provides; selecting it lowers the total.
    #[serde(alias = "ahorro")]
    Discount,
    /// Paid extra work; selecting it raises the total.
    #[serde(alias = "extra")]
    Addon,
}

impl ServiceKind {
    pub fn label(self) -> &'static str {
        match self {
            Self::Discount => "DISCOUNT",
            Self::Addon => "EXTRA SERVICE",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceItem {
    pub id: ItemId,
    #[serde(alias = "titulo")]
    pub title: String,
    #[serde(default, alias = "descripcion")]
    pub description: String,
    /// Stored as the catalog wrote it. Discounts may be written negative or
    /// positive; only `kind` decides the direction.
    #[serde(alias = "precio")]
    pub price: Money,
    #[serde(alias = "tipo")]
    pub kind: ServiceKind,
    #[serde(default, alias = "seccion")]
    pub section: String,
}

impl ServiceItem {
    /// Contribution to the one-time total: `-|price|` for discounts, `price` for add-ons.
    pub fn delta(&self) -> Money {
        match self.kind {
            ServiceKind::Discount => -self.price.abs(),
            ServiceKind::Addon => self.price,
        }
    }

    pub fn magnitude(&self) -> Money {
        self.price.abs()
    }

    pub fn is_discount(&self) -> bool {
        self.kind == ServiceKind::Discount
    }
}

/// A recurring monthly plan, independent of the one-time total.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MaintenanceItem {
    pub id: ItemId,
    #[serde(alias = "titulo")]
    pub title: String,
    #[serde(default, alias = "descripcion")]
    pub description: String,
    #[serde(alias = "precio")]
    pub price: Money,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactInfo {
    #[serde(alias = "telefono")]
    pub phone: String,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub whatsapp: Option<String>,
    #[serde(default, alias = "direccion", skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
}

impl ContactInfo {
    pub fn footer_line(&self) -> String {
        format!("{} | {}", self.phone, self.email)
    }
}
