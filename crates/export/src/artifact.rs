use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use tempfile::NamedTempFile;
use tracing::{info, warn};

use crate::error::ExportError;

/// `Budget-<Company>-<YYYY-MM-DD>.<extension>`.
///
/// Characters other than ASCII letters, digits and whitespace are dropped
/// from the company name; whitespace runs become a single `-`.
pub fn file_name(company: &str, date: NaiveDate, extension: &str) -> String {
    let cleaned: String = company
        .chars()
        .filter(|ch| ch.is_ascii_alphanumeric() || ch.is_whitespace())
        .collect();
    let slug = cleaned.split_whitespace().collect::<Vec<_>>().join("-");
    let date = date.format("%Y-%m-%d");

    if slug.is_empty() {
        format!("Budget-{date}.{extension}")
    } else {
        format!("Budget-{slug}-{date}.{extension}")
    }
}

/// Writes artifacts into one directory. A write either lands complete under
/// its final name or leaves nothing behind.
#[derive(Clone, Debug)]
pub struct ArtifactWriter {
    dir: PathBuf,
}

impl ArtifactWriter {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn write(&self, name: &str, bytes: &[u8]) -> Result<PathBuf, ExportError> {
        let is_plain_name = !name.is_empty()
            && Path::new(name).file_name().is_some_and(|file| file == name);
        if !is_plain_name {
            return Err(ExportError::InvalidArtifactName(name.to_string()));
        }

        let target = self.dir.join(name);
        let artifact_error = |source| ExportError::Artifact { path: target.clone(), source };

        fs::create_dir_all(&self.dir).map_err(artifact_error)?;

        let mut temp = NamedTempFile::new_in(&self.dir).map_err(artifact_error)?;
        temp.write_all(bytes).map_err(artifact_error)?;
        temp.as_file().sync_all().map_err(artifact_error)?;

        // On failure the returned handle still owns the temp file and removes it on drop.
        temp.persist(&target).map_err(|e| {
            warn!(
                event_name = "budget.export.write_failed",
                path = %target.display(),
                error = %e.error,
                "artifact was not written"
            );
            ExportError::Artifact { path: target.clone(), source: e.error }
        })?;

        info!(
            event_name = "budget.export.written",
            path = %target.display(),
            bytes = bytes.len(),
            "artifact written"
        );
        Ok(target)
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use chrono::NaiveDate;
    use tempfile::TempDir;

    use super::{file_name, ArtifactWriter};
    use crate::error::ExportError;

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, 14).expect("date")
    }

    #[test]
    fn file_name_is_sanitized_and_dated() {
        assert_eq!(file_name("Acme Web  Studio", date(), "pdf"), "Budget-Acme-Web-Studio-2026-10-14.pdf");
        assert_eq!(file_name("García Reformas S.L.", date(), "pdf"), "Budget-Garca-Reformas-SL-2026-10-14.pdf");
        assert_eq!(file_name("***", date(), "html"), "Budget-2026-10-14.html");
    }

    #[test]
    fn write_persists_complete_file() {
        let dir = TempDir::new().expect("temp dir");
        let writer = ArtifactWriter::new(dir.path().join("out"));

        let path = writer.write("Budget-Acme-2026-10-14.html", b"<html></html>").expect("write");

        assert_eq!(fs::read(&path).expect("read back"), b"<html></html>");
        let entries: Vec<_> = fs::read_dir(writer.dir()).expect("list").collect();
        assert_eq!(entries.len(), 1);
    }

    #[test]
    fn failed_write_leaves_no_file_behind() {
        let dir = TempDir::new().expect("temp dir");
        let blocked = dir.path().join("Budget-Acme-2026-10-14.pdf");
        fs::create_dir(&blocked).expect("blocking directory");
        fs::write(blocked.join("keep"), b"x").expect("non-empty directory");

        let writer = ArtifactWriter::new(dir.path());
        let result = writer.write("Budget-Acme-2026-10-14.pdf", b"%PDF-1.4");

        assert!(matches!(result, Err(ExportError::Artifact { .. })));
        let names: Vec<_> = fs::read_dir(dir.path())
            .expect("list")
            .map(|entry| entry.expect("entry").file_name())
            .collect();
        assert_eq!(names, vec![std::ffi::OsString::from("Budget-Acme-2026-10-14.pdf")]);
    }

    #[test]
    fn names_with_separators_are_rejected() {
        let dir = TempDir::new().expect("temp dir");
        let writer = ArtifactWriter::new(dir.path());

        assert!(matches!(
            writer.write("../escape.pdf", b""),
            Err(ExportError::InvalidArtifactName(_))
        ));
        assert!(matches!(writer.write("", b""), Err(ExportError::InvalidArtifactName(_))));
    }
}
