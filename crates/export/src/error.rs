use std::path::PathBuf;

use budgetkit_core::ApplicationError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("template error: {0}")]
    Template(String),
    #[error("conversion error: {0}")]
    Conversion(String),
    #[error("invalid artifact name `{0}`")]
    InvalidArtifactName(String),
    #[error("could not write artifact `{path}`: {source}")]
    Artifact { path: PathBuf, source: std::io::Error },
    #[error("invalid share recipient `{0}`")]
    InvalidRecipient(String),
    #[error("could not build share link: {0}")]
    Link(#[from] url::ParseError),
    #[error("no system opener is available to launch `{0}`")]
    LauncherUnavailable(String),
    #[error("could not launch `{program}`: {source}")]
    Launch { program: PathBuf, source: std::io::Error },
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<ExportError> for ApplicationError {
    fn from(error: ExportError) -> Self {
        ApplicationError::Export(error.to_string())
    }
}
