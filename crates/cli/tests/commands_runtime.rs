use std::env;
use std::fs;
use std::path::PathBuf;
use std::sync::{Mutex, OnceLock};

use budgetkit_cli::commands::export::ExportArgs;
use budgetkit_cli::commands::share::{Channel, ShareArgs};
use budgetkit_cli::commands::{catalog, config, doctor, export, quote, share, SessionArgs};
use budgetkit_core::LoadOptions;
use budgetkit_export::{OutputFormat, RecordingLauncher};
use chrono::NaiveDate;
use serde_json::Value;
use tempfile::TempDir;

const PROJECT: &str = r#"{
    "id": "reformas",
    "empresa": "García Reformas S.L.",
    "precioBase": 2000,
    "tecnologia": "Astro",
    "tiempo": "4 weeks",
    "descripcion": "Corporate website",
    "desglose": [{"categoria": "Development", "precio": 2000, "items": []}],
    "serviciosExtra": [
        {"id": "own-logo", "titulo": "Own logo", "precio": -300, "tipo": "ahorro", "seccion": "Branding"},
        {"id": "blog", "titulo": "Blog", "precio": 150, "tipo": "extra", "seccion": "Content"}
    ],
    "contacto": {"telefono": "+34 600 000 000", "email": "project@example.com"}
}"#;

const SHARED: &str = r#"{
    "validezPresupuesto": "15 days",
    "contacto": {"telefono": "+34 611 111 111", "email": "hello@example.com"},
    "serviciosExtra": [
        {"id": "own-texts", "titulo": "Own texts", "precio": 200, "tipo": "ahorro", "seccion": "Content"}
    ]
}"#;

const MAINTENANCE: &str = r#"{
    "serviciosMantenimiento": [
        {"id": "basic", "titulo": "Basic maintenance", "precio": 25}
    ]
}"#;

struct Fixture {
    _dir: TempDir,
    config_path: PathBuf,
    out_dir: PathBuf,
}

impl Fixture {
    fn options(&self) -> LoadOptions {
        LoadOptions {
            config_path: Some(self.config_path.clone()),
            require_file: true,
            ..LoadOptions::default()
        }
    }
}

fn fixture(share_section: &str) -> Fixture {
    let dir = TempDir::new().expect("temp dir");
    let catalog_dir = dir.path().join("catalog");
    fs::create_dir_all(catalog_dir.join("projects")).expect("catalog dir");
    fs::write(catalog_dir.join("projects/reformas.json"), PROJECT).expect("project file");
    fs::write(catalog_dir.join("common.json"), SHARED).expect("shared file");
    fs::write(catalog_dir.join("maintenance.json"), MAINTENANCE).expect("maintenance file");

    let out_dir = dir.path().join("out");
    let config_path = dir.path().join("budgetkit.toml");
    let body = format!(
        r#"
[catalog]
dir = "{catalog}"

[catalog.unavailable]
legal = "catalog in preparation"

[export]
output_dir = "{out}"
prefer_pdf = false

{share_section}

[[access.tokens]]
project = "reformas"
token = "rf_2026"
client = "García Reformas S.L."

[[access.tokens]]
project = "reformas"
token = "rf_2025"
client = "García Reformas S.L."
expires = "2026-01-31"

[[access.tokens]]
project = "ghost"
token = "gh_2026"
client = "Nobody"
"#,
        catalog = catalog_dir.display(),
        out = out_dir.display(),
    );
    fs::write(&config_path, body).expect("config file");

    Fixture { _dir: dir, config_path, out_dir }
}

fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 10, 14).expect("date")
}

fn session_args(project: &str, token: &str, select: &[&str], maintenance: &[&str]) -> SessionArgs {
    SessionArgs {
        project: project.to_string(),
        token: token.to_string(),
        select: select.iter().map(|id| id.to_string()).collect(),
        maintenance: maintenance.iter().map(|id| id.to_string()).collect(),
    }
}

#[test]
fn catalog_lists_available_and_unavailable_projects() {
    with_env(&[], || {
        let fixture = fixture("");
        let result = catalog::run(&fixture.options(), true);
        assert_eq!(result.exit_code, 0);

        let payload = parse_payload(&result.output);
        let projects = payload["projects"].as_array().expect("projects array");
        let status_of = |key: &str| {
            projects
                .iter()
                .find(|entry| entry["project"] == key)
                .map(|entry| entry["status"].clone())
                .unwrap_or(Value::Null)
        };

        assert_eq!(status_of("reformas"), "available");
        assert_eq!(status_of("demo"), "available");
        assert_eq!(status_of("legal"), "unavailable");
    });
}

#[test]
fn quote_applies_selections_and_reports_totals() {
    with_env(&[], || {
        let fixture = fixture("");
        let args = session_args("reformas", "rf_2026", &["own-logo", "blog"], &["basic"]);
        let result = quote::run(&fixture.options(), &args, true, today());
        assert_eq!(result.exit_code, 0, "unexpected failure: {}", result.output);

        let payload = parse_payload(&result.output);
        assert_eq!(payload["command"], "quote");
        assert_eq!(payload["client"], "García Reformas S.L.");
        assert_eq!(payload["totals"]["base_price"], 2000);
        assert_eq!(payload["totals"]["savings"], 300);
        assert_eq!(payload["totals"]["extras"], 150);
        assert_eq!(payload["totals"]["monthly"], 25);
        assert_eq!(payload["totals"]["total"], 1850);
        assert_eq!(payload["services"][0]["delta"], -300);
        assert_eq!(payload["services"][0]["kind"], "discount");
    });
}

#[test]
fn quote_toggling_twice_deselects() {
    with_env(&[], || {
        let fixture = fixture("");
        let args = session_args("reformas", "rf_2026", &["blog", "blog"], &[]);
        let result = quote::run(&fixture.options(), &args, false, today());
        assert_eq!(result.exit_code, 0);
        assert!(result.output.contains("total: 2000 €"));
        assert!(result.output.contains("savings: -0 €"));
        assert!(!result.output.contains("[EXTRA SERVICE]"));
    });
}

#[test]
fn quote_rejects_unknown_token_with_fixed_message() {
    with_env(&[], || {
        let fixture = fixture("");
        let args = session_args("reformas", "wrong", &[], &[]);
        let result = quote::run(&fixture.options(), &args, true, today());
        assert_eq!(result.exit_code, 2);

        let payload = parse_payload(&result.output);
        assert_eq!(payload["status"], "error");
        assert_eq!(payload["error_class"], "access_denied");
        let message = payload["message"].as_str().unwrap_or_default();
        assert!(message.starts_with("This budget link is not valid."));
        assert!(payload["correlation_id"].is_string());
    });
}

#[test]
fn quote_rejects_expired_token() {
    with_env(&[], || {
        let fixture = fixture("");
        let args = session_args("reformas", "rf_2025", &[], &[]);
        let result = quote::run(&fixture.options(), &args, true, today());
        assert_eq!(result.exit_code, 2);

        let payload = parse_payload(&result.output);
        assert_eq!(payload["error_class"], "access_denied");
        assert!(payload["message"].as_str().unwrap_or_default().contains("expired on 2026-01-31"));
    });
}

#[test]
fn quote_reports_missing_catalog_with_catalog_exit_code() {
    with_env(&[], || {
        let fixture = fixture("");
        let args = session_args("ghost", "gh_2026", &[], &[]);
        let result = quote::run(&fixture.options(), &args, true, today());
        assert_eq!(result.exit_code, 3);

        let payload = parse_payload(&result.output);
        assert_eq!(payload["error_class"], "catalog_unavailable");
        assert!(payload["message"]
            .as_str()
            .unwrap_or_default()
            .starts_with("The requested budget configuration is not available."));
    });
}

#[test]
fn quote_rejects_unknown_service_id() {
    with_env(&[], || {
        let fixture = fixture("");
        let args = session_args("reformas", "rf_2026", &["hosting"], &[]);
        let result = quote::run(&fixture.options(), &args, true, today());
        assert_eq!(result.exit_code, 2);
        assert_eq!(parse_payload(&result.output)["error_class"], "invalid_selection");
    });
}

#[test]
fn missing_explicit_config_file_is_a_config_failure() {
    with_env(&[], || {
        let options = LoadOptions {
            config_path: Some(PathBuf::from("/nonexistent/budgetkit.toml")),
            require_file: true,
            ..LoadOptions::default()
        };
        let result = quote::run(&options, &session_args("reformas", "rf_2026", &[], &[]), true, today());
        assert_eq!(result.exit_code, 2);
        assert_eq!(parse_payload(&result.output)["error_class"], "config_validation");
    });
}

#[test]
fn export_writes_dated_html_artifact() {
    with_env(&[], || {
        let fixture = fixture("");
        let args = ExportArgs {
            session: session_args("reformas", "rf_2026", &["own-logo"], &[]),
            format: Some(OutputFormat::Html),
            out: None,
        };

        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .expect("runtime");
        let result = runtime.block_on(export::run(&fixture.options(), &args, today()));
        assert_eq!(result.exit_code, 0, "unexpected failure: {}", result.output);

        let payload = parse_payload(&result.output);
        assert_eq!(payload["format"], "html");
        let path = PathBuf::from(payload["path"].as_str().expect("path"));
        assert_eq!(path, fixture.out_dir.join("Budget-Garca-Reformas-SL-2026-10-14.html"));

        let html = fs::read_to_string(path).expect("artifact");
        assert!(html.contains("Total price: 1700 € (VAT not included)"));
    });
}

#[test]
fn export_out_flag_overrides_output_dir() {
    with_env(&[], || {
        let fixture = fixture("");
        let elsewhere = TempDir::new().expect("temp dir");
        let args = ExportArgs {
            session: session_args("reformas", "rf_2026", &[], &[]),
            format: Some(OutputFormat::Html),
            out: Some(elsewhere.path().to_path_buf()),
        };

        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .expect("runtime");
        let result = runtime.block_on(export::run(&fixture.options(), &args, today()));
        assert_eq!(result.exit_code, 0, "unexpected failure: {}", result.output);
        assert!(elsewhere.path().join("Budget-Garca-Reformas-SL-2026-10-14.html").exists());
        assert!(!fixture.out_dir.exists());
    });
}

#[test]
fn share_whatsapp_builds_link_and_hands_it_to_the_launcher() {
    with_env(&[], || {
        let fixture = fixture("[share]\nwhatsapp_number = \"+34 622 428 891\"");
        let launcher = RecordingLauncher::new();
        let args = ShareArgs {
            session: session_args("reformas", "rf_2026", &["own-logo"], &[]),
            channel: Channel::Whatsapp,
            open: true,
        };

        let result = share::run(&fixture.options(), &args, &launcher, today());
        assert_eq!(result.exit_code, 0, "unexpected failure: {}", result.output);

        let payload = parse_payload(&result.output);
        let link = payload["link"].as_str().expect("link").to_string();
        assert!(link.starts_with("https://wa.me/34622428891?text="));
        assert!(payload["body"].as_str().unwrap_or_default().contains("Savings: -300 €"));
        assert_eq!(payload["launched"], true);
        assert_eq!(launcher.opened(), vec![link]);
    });
}

#[test]
fn share_email_falls_back_to_catalog_contact() {
    with_env(&[], || {
        let fixture = fixture("");
        let launcher = RecordingLauncher::new();
        let args = ShareArgs {
            session: session_args("reformas", "rf_2026", &[], &[]),
            channel: Channel::Email,
            open: false,
        };

        let result = share::run(&fixture.options(), &args, &launcher, today());
        assert_eq!(result.exit_code, 0, "unexpected failure: {}", result.output);

        let payload = parse_payload(&result.output);
        assert_eq!(payload["recipient"], "hello@example.com");
        assert_eq!(payload["subject"], "Budget: García Reformas S.L.");
        assert!(payload["link"].as_str().unwrap_or_default().starts_with("mailto:hello@example.com?subject="));
        assert!(launcher.opened().is_empty());
    });
}

#[test]
fn config_attributes_sources_and_redacts_tokens() {
    with_env(&[("BUDGETKIT_EXPORT_CURRENCY_SYMBOL", "$")], || {
        let fixture = fixture("");
        let output = config::run(&fixture.options());

        assert!(output.starts_with("effective config (source precedence: env > file > default):"));
        assert!(output.contains(
            "- export.currency_symbol = $ (source: env (BUDGETKIT_EXPORT_CURRENCY_SYMBOL))"
        ));
        assert!(output.contains(&format!("(source: file ({}))", fixture.config_path.display())));
        assert!(output.contains("- logging.level = info (source: default)"));
        assert!(output.contains("reformas: rf_*** for García Reformas S.L."));
        assert!(!output.contains("rf_2026"));
        assert!(!output.contains("gh_2026"));
    });
}

#[test]
fn doctor_reports_readiness_as_json() {
    with_env(&[], || {
        let fixture = fixture("");
        let result = doctor::run(&fixture.options(), true, today());
        assert_eq!(result.exit_code, 0);
        let payload = parse_payload(&result.output);

        assert_eq!(payload["overall_status"], "pass");
        let checks = payload["checks"].as_array().expect("checks");
        let status_of = |name: &str| {
            checks
                .iter()
                .find(|check| check["name"] == name)
                .map(|check| check["status"].clone())
                .unwrap_or(Value::Null)
        };
        assert_eq!(status_of("config_validation"), "pass");
        assert_eq!(status_of("catalog_directory"), "pass");
        assert_eq!(status_of("access_tokens"), "pass");
        assert_eq!(status_of("output_directory"), "pass");
        assert_eq!(status_of("pdf_converter"), "skipped");
    });
}

#[test]
fn doctor_fails_when_catalog_directory_is_missing() {
    with_env(&[("BUDGETKIT_CATALOG_DIR", "/nonexistent/catalog")], || {
        let fixture = fixture("");
        let result = doctor::run(&fixture.options(), false, today());
        assert_eq!(result.exit_code, doctor::DOCTOR_FAILED_EXIT_CODE);
        let output = result.output;

        assert!(output.starts_with("doctor: one or more readiness checks failed"));
        assert!(output.contains("- [fail] catalog_directory: catalog directory `/nonexistent/catalog` does not exist"));
    });
}

fn parse_payload(output: &str) -> Value {
    serde_json::from_str(output).expect("command output should be valid JSON")
}

fn with_env(vars: &[(&str, &str)], test_fn: impl FnOnce()) {
    static ENV_LOCK: OnceLock<Mutex<()>> = OnceLock::new();
    let _guard =
        ENV_LOCK.get_or_init(|| Mutex::new(())).lock().expect("env mutex should not be poisoned");

    let keys = [
        "BUDGETKIT_CATALOG_DIR",
        "BUDGETKIT_EXPORT_OUTPUT_DIR",
        "BUDGETKIT_EXPORT_CURRENCY_SYMBOL",
        "BUDGETKIT_EXPORT_WKHTMLTOPDF_PATH",
        "BUDGETKIT_EXPORT_PREFER_PDF",
        "BUDGETKIT_SHARE_WHATSAPP_NUMBER",
        "BUDGETKIT_SHARE_EMAIL_ADDRESS",
        "BUDGETKIT_LOGGING_LEVEL",
        "BUDGETKIT_LOGGING_FORMAT",
        "BUDGETKIT_LOG_LEVEL",
        "BUDGETKIT_LOG_FORMAT",
    ];

    let previous_values: Vec<(&str, Option<String>)> =
        keys.iter().map(|key| (*key, env::var(key).ok())).collect();

    for key in &keys {
        env::remove_var(key);
    }
    for (key, value) in vars {
        env::set_var(key, value);
    }

    test_fn();

    for (key, value) in previous_values {
        if let Some(value) = value {
            env::set_var(key, value);
        } else {
            env::remove_var(key);
        }
    }
}
