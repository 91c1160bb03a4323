//! Token gate in front of budget sessions.
//!
//! The selection engine and exporter never see tokens. They receive a
//! [`SessionDescriptor`] produced here (or by any other [`AccessGate`]).

use chrono::NaiveDate;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;

use crate::catalog::ProjectKey;

/// A validated visitor: who they are and which project they may price.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionDescriptor {
    pub client: String,
    pub project: ProjectKey,
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum AccessError {
    #[error("missing project or token parameters")]
    MissingParameters,
    #[error("invalid or inactive token for project `{0}`")]
    InvalidToken(String),
    #[error("token for project `{project}` expired on {expired_on}")]
    Expired { project: String, expired_on: NaiveDate },
}

pub trait AccessGate: Send + Sync {
    fn authorize(
        &self,
        project: Option<&str>,
        token: Option<&str>,
        today: NaiveDate,
    ) -> Result<SessionDescriptor, AccessError>;
}

#[derive(Clone, Debug)]
pub struct TokenEntry {
    pub project: String,
    pub token: SecretString,
    pub client: String,
    /// Last day the token is accepted.
    pub expires: Option<NaiveDate>,
    pub active: bool,
}

#[derive(Clone, Debug, Default)]
pub struct TokenGate {
    entries: Vec<TokenEntry>,
}

impl TokenGate {
    pub fn new(entries: Vec<TokenEntry>) -> Self {
        Self { entries }
    }

    pub fn entries(&self) -> &[TokenEntry] {
        &self.entries
    }
}

impl AccessGate for TokenGate {
    fn authorize(
        &self,
        project: Option<&str>,
        token: Option<&str>,
        today: NaiveDate,
    ) -> Result<SessionDescriptor, AccessError> {
        let (Some(project), Some(token)) = (
            project.map(str::trim).filter(|value| !value.is_empty()),
            token.map(str::trim).filter(|value| !value.is_empty()),
        ) else {
            return Err(AccessError::MissingParameters);
        };

        let entry = self
            .entries
            .iter()
            .find(|entry| {
                entry.active && entry.project == project && entry.token.expose_secret() == token
            })
            .ok_or_else(|| AccessError::InvalidToken(project.to_string()))?;

        if let Some(expires) = entry.expires {
            if today > expires {
                warn!(
                    event_name = "budget.access.token_expired",
                    project = %project,
                    expired_on = %expires,
                    "token expired for project"
                );
                return Err(AccessError::Expired { project: project.to_string(), expired_on: expires });
            }
        }

        Ok(SessionDescriptor { client: entry.client.clone(), project: ProjectKey::from(project) })
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::{AccessError, AccessGate, TokenEntry, TokenGate};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
    }

    fn gate() -> TokenGate {
        TokenGate::new(vec![
            TokenEntry {
                project: "reformas".to_string(),
                token: "rf_abc123".to_string().into(),
                client: "García Reformas S.L.".to_string(),
                expires: Some(date(2026, 12, 31)),
                active: true,
            },
            TokenEntry {
                project: "legal".to_string(),
                token: "lg_xyz789".to_string().into(),
                client: "Bufete López".to_string(),
                expires: None,
                active: false,
            },
            TokenEntry {
                project: "demo".to_string(),
                token: "demo_token".to_string().into(),
                client: "Demo".to_string(),
                expires: None,
                active: true,
            },
        ])
    }

    #[test]
    fn valid_token_yields_descriptor() {
        let descriptor = gate()
            .authorize(Some("reformas"), Some("rf_abc123"), date(2026, 10, 1))
            .expect("authorized");

        assert_eq!(descriptor.client, "García Reformas S.L.");
        assert_eq!(descriptor.project.as_str(), "reformas");
    }

    #[test]
    fn missing_parameters_are_rejected() {
        let gate = gate();
        let today = date(2026, 10, 1);
        assert_eq!(gate.authorize(None, Some("x"), today), Err(AccessError::MissingParameters));
        assert_eq!(gate.authorize(Some("demo"), Some("  "), today), Err(AccessError::MissingParameters));
    }

    #[test]
    fn wrong_token_or_inactive_entry_is_invalid() {
        let gate = gate();
        let today = date(2026, 10, 1);
        assert!(matches!(
            gate.authorize(Some("reformas"), Some("lg_xyz789"), today),
            Err(AccessError::InvalidToken(_))
        ));
        assert!(matches!(
            gate.authorize(Some("legal"), Some("lg_xyz789"), today),
            Err(AccessError::InvalidToken(_))
        ));
    }

    #[test]
    fn expiry_date_is_the_last_valid_day() {
        let gate = gate();
        assert!(gate.authorize(Some("reformas"), Some("rf_abc123"), date(2026, 12, 31)).is_ok());
        assert!(matches!(
            gate.authorize(Some("reformas"), Some("rf_abc123"), date(2027, 1, 1)),
            Err(AccessError::Expired { .. })
        ));
    }

    #[test]
    fn tokens_without_expiry_never_expire() {
        assert!(gate().authorize(Some("demo"), Some("demo_token"), date(2099, 1, 1)).is_ok());
    }
}
