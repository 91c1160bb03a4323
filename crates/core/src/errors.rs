use thiserror::Error;

use crate::access::AccessError;
use crate::catalog::CatalogError;
use crate::config::ConfigError;
use crate::session::SessionError;

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum DomainError {
    #[error("duplicate item id `{0}` in catalog")]
    DuplicateItemId(String),
    #[error("domain invariant violation: {0}")]
    InvariantViolation(String),
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum ApplicationError {
    #[error(transparent)]
    Domain(#[from] DomainError),
    #[error("access denied: {0}")]
    Access(String),
    #[error("budget configuration unavailable: {0}")]
    CatalogUnavailable(String),
    #[error("selection failure: {0}")]
    Selection(String),
    #[error("export failure: {0}")]
    Export(String),
    #[error("configuration failure: {0}")]
    Configuration(String),
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum InterfaceError {
    #[error("bad request: {message}")]
    BadRequest { message: String, correlation_id: String },
    #[error("unauthorized: {message}")]
    Unauthorized { message: String, correlation_id: String },
    #[error("configuration unavailable: {message}")]
    NotAvailable { message: String, correlation_id: String },
    #[error("internal error: {message}")]
    Internal { message: String, correlation_id: String },
}

impl InterfaceError {
    pub fn user_message(&self) -> &'static str {
        match self {
            Self::BadRequest { .. } => {
                "The request could not be processed. Check inputs and try again."
            }
            Self::Unauthorized { .. } => {
                "This budget link is not valid. Ask for a new link to continue."
            }
            Self::NotAvailable { .. } => "The requested budget configuration is not available.",
            Self::Internal { .. } => "An unexpected internal error occurred.",
        }
    }

    pub fn correlation_id(&self) -> &str {
        match self {
            Self::BadRequest { correlation_id, .. }
            | Self::Unauthorized { correlation_id, .. }
            | Self::NotAvailable { correlation_id, .. }
            | Self::Internal { correlation_id, .. } => correlation_id,
        }
    }
}

impl ApplicationError {
    pub fn into_interface(self, correlation_id: impl Into<String>) -> InterfaceError {
        let correlation_id = correlation_id.into();
        let mut mapped = InterfaceError::from(self);
        match &mut mapped {
            InterfaceError::BadRequest { correlation_id: id, .. }
            | InterfaceError::Unauthorized { correlation_id: id, .. }
            | InterfaceError::NotAvailable { correlation_id: id, .. }
            | InterfaceError::Internal { correlation_id: id, .. } => *id = correlation_id,
        }
        mapped
    }
}

impl From<CatalogError> for ApplicationError {
    fn from(value: CatalogError) -> Self {
        Self::CatalogUnavailable(value.to_string())
    }
}

impl From<AccessError> for ApplicationError {
    fn from(value: AccessError) -> Self {
        Self::Access(value.to_string())
    }
}

impl From<ConfigError> for ApplicationError {
    fn from(value: ConfigError) -> Self {
        Self::Configuration(value.to_string())
    }
}

impl From<SessionError> for ApplicationError {
    fn from(value: SessionError) -> Self {
        match value {
            SessionError::Catalog(error) => Self::from(error),
            other => Self::Selection(other.to_string()),
        }
    }
}

impl From<ApplicationError> for InterfaceError {
    fn from(value: ApplicationError) -> Self {
        let correlation_id = "unassigned".to_owned();
        match value {
            ApplicationError::Domain(_) | ApplicationError::Selection(_) => Self::BadRequest {
                message: "selection or catalog validation failed".to_owned(),
                correlation_id,
            },
            ApplicationError::Access(message) => Self::Unauthorized { message, correlation_id },
            ApplicationError::CatalogUnavailable(message) => {
                Self::NotAvailable { message, correlation_id }
            }
            ApplicationError::Export(message) | ApplicationError::Configuration(message) => {
                Self::Internal { message, correlation_id }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::catalog::{CatalogError, ProjectKey};
    use crate::errors::{ApplicationError, DomainError, InterfaceError};

    #[test]
    fn domain_error_maps_to_bad_request_interface_error() {
        let interface =
            ApplicationError::from(DomainError::DuplicateItemId("seo".to_owned())).into_interface("req-1");

        assert!(matches!(
            interface,
            InterfaceError::BadRequest {
                ref correlation_id,
                ..
            } if correlation_id == "req-1"
        ));
    }

    #[test]
    fn unknown_project_surfaces_fixed_user_message() {
        let interface =
            ApplicationError::from(CatalogError::NotFound(ProjectKey::from("legal-2")))
                .into_interface("req-2");

        assert!(matches!(interface, InterfaceError::NotAvailable { .. }));
        assert_eq!(
            interface.user_message(),
            "The requested budget configuration is not available."
        );
        assert_eq!(interface.correlation_id(), "req-2");
    }

    #[test]
    fn export_error_maps_to_internal() {
        let interface =
            ApplicationError::Export("disk full".to_owned()).into_interface("req-3");

        assert!(matches!(interface, InterfaceError::Internal { .. }));
        assert_eq!(interface.user_message(), "An unexpected internal error occurred.");
    }

    #[test]
    fn access_error_maps_to_unauthorized() {
        let interface =
            ApplicationError::Access("invalid token".to_owned()).into_interface("req-4");

        assert!(matches!(interface, InterfaceError::Unauthorized { .. }));
    }
}
