use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use budgetkit_core::{AppConfig, LoadOptions, TokenEntry};
use secrecy::ExposeSecret;
use toml::Value;

pub fn run(options: &LoadOptions) -> String {
    let config = match AppConfig::load(options.clone()) {
        Ok(config) => config,
        Err(error) => return format!("config validation failed: {error}"),
    };

    let config_file_path = detect_config_path(options.config_path.as_deref());
    let config_file_doc = load_config_file_doc(config_file_path.as_deref());
    let source = |key_path: &str, env_keys: &[&str]| {
        field_source(key_path, env_keys, config_file_doc.as_ref(), config_file_path.as_deref())
    };

    let mut lines = vec!["effective config (source precedence: env > file > default):".to_string()];

    let catalog_dir_source = if options.overrides.catalog_dir.is_some() {
        "flag (--catalog-dir)".to_string()
    } else {
        source("catalog.dir", &["BUDGETKIT_CATALOG_DIR"])
    };
    lines.push(render_line(
        "catalog.dir",
        &config.catalog.dir.display().to_string(),
        catalog_dir_source,
    ));
    lines.push(render_line(
        "catalog.aliases",
        &render_map(config.catalog.aliases.iter()),
        source("catalog.aliases", &[]),
    ));
    lines.push(render_line(
        "catalog.unavailable",
        &render_map(config.catalog.unavailable.iter()),
        source("catalog.unavailable", &[]),
    ));

    lines.push(render_line(
        "export.output_dir",
        &config.export.output_dir.display().to_string(),
        source("export.output_dir", &["BUDGETKIT_EXPORT_OUTPUT_DIR"]),
    ));
    lines.push(render_line(
        "export.currency_symbol",
        &config.export.currency_symbol,
        source("export.currency_symbol", &["BUDGETKIT_EXPORT_CURRENCY_SYMBOL"]),
    ));
    lines.push(render_line(
        "export.wkhtmltopdf_path",
        config.export.wkhtmltopdf_path.as_deref().unwrap_or("<unset>"),
        source("export.wkhtmltopdf_path", &["BUDGETKIT_EXPORT_WKHTMLTOPDF_PATH"]),
    ));
    lines.push(render_line(
        "export.prefer_pdf",
        &config.export.prefer_pdf.to_string(),
        source("export.prefer_pdf", &["BUDGETKIT_EXPORT_PREFER_PDF"]),
    ));

    lines.push(render_line(
        "share.whatsapp_number",
        config.share.whatsapp_number.as_deref().unwrap_or("<unset>"),
        source("share.whatsapp_number", &["BUDGETKIT_SHARE_WHATSAPP_NUMBER"]),
    ));
    lines.push(render_line(
        "share.email_address",
        config.share.email_address.as_deref().unwrap_or("<unset>"),
        source("share.email_address", &["BUDGETKIT_SHARE_EMAIL_ADDRESS"]),
    ));

    lines.push(render_line(
        "access.tokens",
        &render_tokens(&config.access.tokens),
        source("access.tokens", &[]),
    ));

    lines.push(render_line(
        "logging.level",
        &config.logging.level,
        source("logging.level", &["BUDGETKIT_LOGGING_LEVEL", "BUDGETKIT_LOG_LEVEL"]),
    ));
    lines.push(render_line(
        "logging.format",
        &format!("{:?}", config.logging.format),
        source("logging.format", &["BUDGETKIT_LOGGING_FORMAT", "BUDGETKIT_LOG_FORMAT"]),
    ));

    lines.join("\n")
}

fn detect_config_path(explicit_path: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit_path {
        return path.exists().then(|| path.to_path_buf());
    }

    let root = PathBuf::from("budgetkit.toml");
    if root.exists() {
        return Some(root);
    }

    let nested = PathBuf::from("config/budgetkit.toml");
    if nested.exists() {
        return Some(nested);
    }

    None
}

fn load_config_file_doc(path: Option<&Path>) -> Option<Value> {
    let path = path?;
    let raw = fs::read_to_string(path).ok()?;
    raw.parse::<Value>().ok()
}

fn field_source(
    key_path: &str,
    env_keys: &[&str],
    config_file_doc: Option<&Value>,
    config_file_path: Option<&Path>,
) -> String {
    if let Some(env_key) = env_keys.iter().find(|key| env::var_os(key).is_some()) {
        return format!("env ({env_key})");
    }

    if let Some(doc) = config_file_doc {
        if contains_path(doc, key_path) {
            let file_path = config_file_path
                .map(|path| path.display().to_string())
                .unwrap_or_else(|| "config file".to_string());
            return format!("file ({file_path})");
        }
    }

    "default".to_string()
}

fn contains_path(root: &Value, key_path: &str) -> bool {
    let mut current = root;
    for key in key_path.split('.') {
        let Some(next) = current.get(key) else {
            return false;
        };
        current = next;
    }
    true
}

fn render_line(key: &str, value: &str, source: String) -> String {
    format!("- {key} = {value} (source: {source})")
}

fn render_map<'a>(entries: impl Iterator<Item = (&'a String, &'a String)>) -> String {
    let rendered: Vec<String> = entries.map(|(key, value)| format!("{key} -> {value}")).collect();
    if rendered.is_empty() {
        "<none>".to_string()
    } else {
        rendered.join(", ")
    }
}

fn render_tokens(tokens: &[TokenEntry]) -> String {
    if tokens.is_empty() {
        return "<none>".to_string();
    }

    tokens
        .iter()
        .map(|entry| {
            let mut rendered = format!(
                "{}: {} for {}",
                entry.project,
                redact_token(entry.token.expose_secret()),
                entry.client
            );
            if let Some(expires) = entry.expires {
                rendered.push_str(&format!(" until {expires}"));
            }
            if !entry.active {
                rendered.push_str(" (inactive)");
            }
            rendered
        })
        .collect::<Vec<_>>()
        .join(", ")
}

fn redact_token(token: &str) -> String {
    let trimmed = token.trim();
    if trimmed.is_empty() {
        return "<empty>".to_string();
    }

    if let Some(split) = trimmed.find(&['_', '-'][..]) {
        return format!("{}***", &trimmed[..=split]);
    }

    "<redacted>".to_string()
}
