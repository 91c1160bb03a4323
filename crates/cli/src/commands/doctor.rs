use std::path::Path;

use anyhow::{bail, Context};
use budgetkit_core::{AppConfig, CatalogError, CatalogProvider, LoadOptions};
use budgetkit_export::DocumentRenderer;
use chrono::NaiveDate;
use serde::Serialize;

use crate::commands::CommandResult;

/// Exit code when at least one readiness check fails.
pub const DOCTOR_FAILED_EXIT_CODE: u8 = 5;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
enum CheckStatus {
    Pass,
    Fail,
    Skipped,
}

#[derive(Debug, Serialize)]
struct DoctorCheck {
    name: &'static str,
    status: CheckStatus,
    details: String,
}

#[derive(Debug, Serialize)]
struct DoctorReport {
    overall_status: CheckStatus,
    summary: String,
    checks: Vec<DoctorCheck>,
}

pub fn run(options: &LoadOptions, json_output: bool, today: NaiveDate) -> CommandResult {
    let report = build_report(options, today);
    let exit_code =
        if report.overall_status == CheckStatus::Fail { DOCTOR_FAILED_EXIT_CODE } else { 0 };

    let output = if json_output {
        serde_json::to_string_pretty(&report).unwrap_or_else(|error| {
            format!(
                "{{\"overall_status\":\"fail\",\"summary\":\"doctor serialization failed\",\"error\":\"{}\"}}",
                escape_json(&error.to_string())
            )
        })
    } else {
        render_human(&report)
    };

    CommandResult { exit_code, output }
}

fn build_report(options: &LoadOptions, today: NaiveDate) -> DoctorReport {
    let mut checks = Vec::new();

    match AppConfig::load(options.clone()) {
        Ok(config) => {
            checks.push(DoctorCheck {
                name: "config_validation",
                status: CheckStatus::Pass,
                details: "configuration loaded and validated".to_string(),
            });
            checks.push(check_catalog_directory(&config));
            checks.push(check_access_tokens(&config, today));
            checks.push(check_output_directory(&config));
            checks.push(check_pdf_converter(&config));
        }
        Err(error) => {
            checks.push(DoctorCheck {
                name: "config_validation",
                status: CheckStatus::Fail,
                details: error.to_string(),
            });
            for name in ["catalog_directory", "access_tokens", "output_directory", "pdf_converter"] {
                checks.push(DoctorCheck {
                    name,
                    status: CheckStatus::Skipped,
                    details: "skipped because configuration did not load".to_string(),
                });
            }
        }
    }

    // Skipped checks do not fail the report.
    let any_fail = checks.iter().any(|check| check.status == CheckStatus::Fail);
    let overall_status = if any_fail { CheckStatus::Fail } else { CheckStatus::Pass };
    let summary = if any_fail {
        "doctor: one or more readiness checks failed".to_string()
    } else {
        "doctor: all readiness checks passed".to_string()
    };

    DoctorReport { overall_status, summary, checks }
}

fn check_catalog_directory(config: &AppConfig) -> DoctorCheck {
    let dir = &config.catalog.dir;
    if !dir.is_dir() {
        return DoctorCheck {
            name: "catalog_directory",
            status: CheckStatus::Fail,
            details: format!("catalog directory `{}` does not exist", dir.display()),
        };
    }

    let provider = config.catalog_provider();
    let mut available = 0;
    let mut unavailable = 0;
    let mut broken = Vec::new();

    for key in provider.projects() {
        match provider.load(&key) {
            Ok(_) => available += 1,
            Err(CatalogError::Unavailable { .. } | CatalogError::NotFound(_)) => unavailable += 1,
            Err(error) => broken.push(error.to_string()),
        }
    }

    if !broken.is_empty() {
        return DoctorCheck {
            name: "catalog_directory",
            status: CheckStatus::Fail,
            details: broken.join("; "),
        };
    }
    if available == 0 {
        return DoctorCheck {
            name: "catalog_directory",
            status: CheckStatus::Fail,
            details: format!("no loadable project catalogs under `{}`", dir.display()),
        };
    }

    DoctorCheck {
        name: "catalog_directory",
        status: CheckStatus::Pass,
        details: format!("{available} project(s) available, {unavailable} not available yet"),
    }
}

fn check_access_tokens(config: &AppConfig, today: NaiveDate) -> DoctorCheck {
    let tokens = &config.access.tokens;
    let usable = tokens
        .iter()
        .filter(|entry| entry.active && entry.expires.map_or(true, |expires| today <= expires))
        .count();

    if usable == 0 {
        return DoctorCheck {
            name: "access_tokens",
            status: CheckStatus::Fail,
            details: format!(
                "no active, unexpired tokens ({} configured); no budget link can open a session",
                tokens.len()
            ),
        };
    }

    DoctorCheck {
        name: "access_tokens",
        status: CheckStatus::Pass,
        details: format!("{usable} of {} token(s) usable", tokens.len()),
    }
}

fn check_output_directory(config: &AppConfig) -> DoctorCheck {
    match probe_output_dir(&config.export.output_dir) {
        Ok(details) => DoctorCheck { name: "output_directory", status: CheckStatus::Pass, details },
        Err(error) => DoctorCheck {
            name: "output_directory",
            status: CheckStatus::Fail,
            details: format!("{error:#}"),
        },
    }
}

fn probe_output_dir(dir: &Path) -> anyhow::Result<String> {
    if dir.exists() {
        let metadata = dir
            .metadata()
            .with_context(|| format!("could not inspect output directory `{}`", dir.display()))?;
        if !metadata.is_dir() {
            bail!("output path `{}` is not a directory", dir.display());
        }
        if metadata.permissions().readonly() {
            bail!("output directory `{}` is read-only", dir.display());
        }
        return Ok(format!("writing artifacts to `{}`", dir.display()));
    }

    Ok(format!("`{}` will be created on first export", dir.display()))
}

fn check_pdf_converter(config: &AppConfig) -> DoctorCheck {
    if !config.export.prefer_pdf {
        return DoctorCheck {
            name: "pdf_converter",
            status: CheckStatus::Skipped,
            details: "export.prefer_pdf is false; exports default to HTML".to_string(),
        };
    }

    match DocumentRenderer::new(config.export.wkhtmltopdf_path.as_deref()) {
        Ok(renderer) => match renderer.converter() {
            Some(path) => DoctorCheck {
                name: "pdf_converter",
                status: CheckStatus::Pass,
                details: format!("wkhtmltopdf found at `{path}`"),
            },
            None => DoctorCheck {
                name: "pdf_converter",
                status: CheckStatus::Skipped,
                details: "wkhtmltopdf not found; PDF exports fall back to HTML".to_string(),
            },
        },
        Err(error) => DoctorCheck {
            name: "pdf_converter",
            status: CheckStatus::Fail,
            details: error.to_string(),
        },
    }
}

fn render_human(report: &DoctorReport) -> String {
    let mut lines = Vec::new();
    lines.push(report.summary.clone());

    for check in &report.checks {
        let marker = match check.status {
            CheckStatus::Pass => "ok",
            CheckStatus::Fail => "fail",
            CheckStatus::Skipped => "skip",
        };
        lines.push(format!("- [{marker}] {}: {}", check.name, check.details));
    }

    lines.join("\n")
}

fn escape_json(value: &str) -> String {
    value.replace('\\', "\\\\").replace('"', "\\\"")
}
