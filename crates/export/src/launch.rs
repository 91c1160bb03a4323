//! Hand-off of share links to the platform (browser, mail client).

use std::path::PathBuf;
use std::process::{Command, Stdio};
use std::sync::Mutex;

use tracing::info;

use crate::error::ExportError;

pub trait ChannelLauncher: Send + Sync {
    fn open(&self, target: &str) -> Result<(), ExportError>;
}

/// Spawns the platform opener and returns without waiting for it.
#[derive(Clone, Debug)]
pub struct SystemLauncher {
    program: Option<PathBuf>,
}

impl SystemLauncher {
    pub fn detect() -> Self {
        let candidates: &[&str] = if cfg!(target_os = "macos") {
            &["open"]
        } else if cfg!(target_os = "windows") {
            &["explorer"]
        } else {
            &["xdg-open", "gio", "sensible-browser"]
        };

        let program = candidates.iter().find_map(|name| which::which(name).ok());
        Self { program }
    }

    pub fn with_program(program: impl Into<PathBuf>) -> Self {
        Self { program: Some(program.into()) }
    }

    pub fn program(&self) -> Option<&PathBuf> {
        self.program.as_ref()
    }
}

impl ChannelLauncher for SystemLauncher {
    fn open(&self, target: &str) -> Result<(), ExportError> {
        let program =
            self.program.as_ref().ok_or_else(|| ExportError::LauncherUnavailable(target.to_string()))?;

        let mut command = Command::new(program);
        if program.file_stem().is_some_and(|stem| stem == "gio") {
            command.arg("open");
        }
        command
            .arg(target)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|source| ExportError::Launch { program: program.clone(), source })?;

        info!(
            event_name = "budget.share.launched",
            program = %program.display(),
            "share link handed to system opener"
        );
        Ok(())
    }
}

/// Keeps every opened target in memory.
#[derive(Debug, Default)]
pub struct RecordingLauncher {
    opened: Mutex<Vec<String>>,
}

impl RecordingLauncher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn opened(&self) -> Vec<String> {
        match self.opened.lock() {
            Ok(opened) => opened.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }
}

impl ChannelLauncher for RecordingLauncher {
    fn open(&self, target: &str) -> Result<(), ExportError> {
        let mut opened = match self.opened.lock() {
            Ok(opened) => opened,
            Err(poisoned) => poisoned.into_inner(),
        };
        opened.push(target.to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::{ChannelLauncher, RecordingLauncher, SystemLauncher};
    use crate::error::ExportError;

    #[test]
    fn recording_launcher_keeps_targets_in_order() {
        let launcher = RecordingLauncher::new();
        launcher.open("https://wa.me/34600000000?text=hi").expect("open");
        launcher.open("mailto:a@example.com").expect("open");

        assert_eq!(
            launcher.opened(),
            vec!["https://wa.me/34600000000?text=hi".to_string(), "mailto:a@example.com".to_string()]
        );
    }

    #[test]
    fn missing_program_is_reported() {
        let launcher = SystemLauncher { program: None };
        assert!(matches!(
            launcher.open("mailto:a@example.com"),
            Err(ExportError::LauncherUnavailable(_))
        ));
    }

    #[test]
    fn spawn_failure_names_the_program() {
        let launcher = SystemLauncher::with_program("/nonexistent/budgetkit-opener");
        assert!(matches!(launcher.open("mailto:a@example.com"), Err(ExportError::Launch { .. })));
    }
}
