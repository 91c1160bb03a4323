use std::collections::BTreeMap;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::access::{TokenEntry, TokenGate};
use crate::catalog::JsonCatalogProvider;

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub catalog: CatalogConfig,
    pub export: ExportConfig,
    pub share: ShareConfig,
    pub access: AccessConfig,
    pub logging: LoggingConfig,
}

#[derive(Clone, Debug)]
pub struct CatalogConfig {
    pub dir: PathBuf,
    pub aliases: BTreeMap<String, String>,
    pub unavailable: BTreeMap<String, String>,
}

#[derive(Clone, Debug)]
pub struct ExportConfig {
    pub output_dir: PathBuf,
    pub currency_symbol: String,
    pub wkhtmltopdf_path: Option<String>,
    pub prefer_pdf: bool,
}

#[derive(Clone, Debug)]
pub struct ShareConfig {
    pub whatsapp_number: Option<String>,
    pub email_address: Option<String>,
}

#[derive(Clone, Debug, Default)]
pub struct AccessConfig {
    pub tokens: Vec<TokenEntry>,
}

#[derive(Clone, Debug)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    Compact,
    Pretty,
    Json,
}

#[derive(Clone, Debug, Default)]
pub struct ConfigOverrides {
    pub catalog_dir: Option<PathBuf>,
    pub output_dir: Option<PathBuf>,
    pub log_level: Option<String>,
    pub prefer_pdf: Option<bool>,
}

#[derive(Clone, Debug, Default)]
pub struct LoadOptions {
    pub config_path: Option<PathBuf>,
    pub require_file: bool,
    pub overrides: ConfigOverrides,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read config file `{path}`: {source}")]
    ReadFile { path: PathBuf, source: std::io::Error },
    #[error("could not parse config file `{path}`: {source}")]
    ParseFile { path: PathBuf, source: toml::de::Error },
    #[error("required config file was not found: `{0}`")]
    MissingConfigFile(PathBuf),
    #[error("environment variable interpolation failed for `{var}`")]
    MissingEnvInterpolation { var: String },
    #[error("unterminated environment interpolation expression")]
    UnterminatedInterpolation,
    #[error("invalid environment override for `{key}`: `{value}`")]
    InvalidEnvOverride { key: String, value: String },
    #[error("configuration validation failed: {0}")]
    Validation(String),
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            catalog: CatalogConfig {
                dir: PathBuf::from("catalog"),
                aliases: BTreeMap::from([("demo".to_string(), "reformas".to_string())]),
                unavailable: BTreeMap::new(),
            },
            export: ExportConfig {
                output_dir: PathBuf::from("."),
                currency_symbol: "€".to_string(),
                wkhtmltopdf_path: None,
                prefer_pdf: true,
            },
            share: ShareConfig { whatsapp_number: None, email_address: None },
            access: AccessConfig::default(),
            logging: LoggingConfig { level: "info".to_string(), format: LogFormat::Compact },
        }
    }
}

impl std::str::FromStr for LogFormat {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "compact" => Ok(Self::Compact),
            "pretty" => Ok(Self::Pretty),
            "json" => Ok(Self::Json),
            other => Err(ConfigError::Validation(format!(
                "unsupported log format `{other}` (expected compact|pretty|json)"
            ))),
        }
    }
}

impl AppConfig {
    pub fn load(options: LoadOptions) -> Result<Self, ConfigError> {
        let mut config = Self::default();
        let maybe_path = resolve_config_path(options.config_path.as_deref());

        if let Some(path) = maybe_path {
            let patch = read_patch(&path)?;
            config.apply_patch(patch);
        } else if options.require_file {
            let expected = options.config_path.unwrap_or_else(|| PathBuf::from("budgetkit.toml"));
            return Err(ConfigError::MissingConfigFile(expected));
        }

        config.apply_env_overrides()?;
        config.apply_overrides(options.overrides);
        config.validate()?;

        Ok(config)
    }

    pub fn catalog_provider(&self) -> JsonCatalogProvider {
        let provider = JsonCatalogProvider::new(&self.catalog.dir);
        let provider = self
            .catalog
            .aliases
            .iter()
            .fold(provider, |provider, (alias, target)| provider.with_alias(alias, target));
        self.catalog
            .unavailable
            .iter()
            .fold(provider, |provider, (project, reason)| provider.with_unavailable(project, reason))
    }

    pub fn access_gate(&self) -> TokenGate {
        TokenGate::new(self.access.tokens.clone())
    }

    fn apply_patch(&mut self, patch: ConfigPatch) {
        if let Some(catalog) = patch.catalog {
            if let Some(dir) = catalog.dir {
                self.catalog.dir = dir;
            }
            if let Some(aliases) = catalog.aliases {
                self.catalog.aliases.extend(aliases);
            }
            if let Some(unavailable) = catalog.unavailable {
                self.catalog.unavailable.extend(unavailable);
            }
        }

        if let Some(export) = patch.export {
            if let Some(output_dir) = export.output_dir {
                self.export.output_dir = output_dir;
            }
            if let Some(currency_symbol) = export.currency_symbol {
                self.export.currency_symbol = currency_symbol;
            }
            if let Some(wkhtmltopdf_path) = export.wkhtmltopdf_path {
                self.export.wkhtmltopdf_path = Some(wkhtmltopdf_path);
            }
            if let Some(prefer_pdf) = export.prefer_pdf {
                self.export.prefer_pdf = prefer_pdf;
            }
        }

        if let Some(share) = patch.share {
            if let Some(whatsapp_number) = share.whatsapp_number {
                self.share.whatsapp_number = Some(whatsapp_number);
            }
            if let Some(email_address) = share.email_address {
                self.share.email_address = Some(email_address);
            }
        }

        if let Some(access) = patch.access {
            self.access.tokens.extend(access.tokens.into_iter().map(|token| TokenEntry {
                project: token.project,
                token: SecretString::from(token.token),
                client: token.client,
                expires: token.expires,
                active: token.active.unwrap_or(true),
            }));
        }

        if let Some(logging) = patch.logging {
            if let Some(level) = logging.level {
                self.logging.level = level;
            }
            if let Some(format) = logging.format {
                self.logging.format = format;
            }
        }
    }

    fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        if let Some(value) = read_env("BUDGETKIT_CATALOG_DIR") {
            self.catalog.dir = PathBuf::from(value);
        }

        if let Some(value) = read_env("BUDGETKIT_EXPORT_OUTPUT_DIR") {
            self.export.output_dir = PathBuf::from(value);
        }
        if let Some(value) = read_env("BUDGETKIT_EXPORT_CURRENCY_SYMBOL") {
            self.export.currency_symbol = value;
        }
        if let Some(value) = read_env("BUDGETKIT_EXPORT_WKHTMLTOPDF_PATH") {
            self.export.wkhtmltopdf_path = Some(value);
        }
        if let Some(value) = read_env("BUDGETKIT_EXPORT_PREFER_PDF") {
            self.export.prefer_pdf = parse_bool("BUDGETKIT_EXPORT_PREFER_PDF", &value)?;
        }

        if let Some(value) = read_env("BUDGETKIT_SHARE_WHATSAPP_NUMBER") {
            self.share.whatsapp_number = Some(value);
        }
        if let Some(value) = read_env("BUDGETKIT_SHARE_EMAIL_ADDRESS") {
            self.share.email_address = Some(value);
        }

        let log_level =
            read_env("BUDGETKIT_LOGGING_LEVEL").or_else(|| read_env("BUDGETKIT_LOG_LEVEL"));
        if let Some(value) = log_level {
            self.logging.level = value;
        }
        let log_format =
            read_env("BUDGETKIT_LOGGING_FORMAT").or_else(|| read_env("BUDGETKIT_LOG_FORMAT"));
        if let Some(value) = log_format {
            self.logging.format = value.parse()?;
        }

        Ok(())
    }

    fn apply_overrides(&mut self, overrides: ConfigOverrides) {
        if let Some(catalog_dir) = overrides.catalog_dir {
            self.catalog.dir = catalog_dir;
        }
        if let Some(output_dir) = overrides.output_dir {
            self.export.output_dir = output_dir;
        }
        if let Some(log_level) = overrides.log_level {
            self.logging.level = log_level;
        }
        if let Some(prefer_pdf) = overrides.prefer_pdf {
            self.export.prefer_pdf = prefer_pdf;
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_catalog(&self.catalog)?;
        validate_export(&self.export)?;
        validate_share(&self.share)?;
        validate_access(&self.access)?;
        validate_logging(&self.logging)?;
        Ok(())
    }
}

fn resolve_config_path(explicit_path: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit_path {
        return path.exists().then_some(path.to_path_buf());
    }

    [PathBuf::from("budgetkit.toml"), PathBuf::from("config/budgetkit.toml")]
        .into_iter()
        .find(|path| path.exists())
}

fn read_patch(path: &Path) -> Result<ConfigPatch, ConfigError> {
    let raw = fs::read_to_string(path)
        .map_err(|source| ConfigError::ReadFile { path: path.to_path_buf(), source })?;

    let interpolated = interpolate_env_vars(&raw)?;
    toml::from_str::<ConfigPatch>(&interpolated)
        .map_err(|source| ConfigError::ParseFile { path: path.to_path_buf(), source })
}

fn interpolate_env_vars(input: &str) -> Result<String, ConfigError> {
    let mut output = String::with_capacity(input.len());
    let mut chars = input.chars().peekable();

    while let Some(ch) = chars.next() {
        if ch == '$' && matches!(chars.peek(), Some('{')) {
            chars.next();
            let mut key = String::new();

            loop {
                match chars.next() {
                    Some('}') => break,
                    Some(next) => key.push(next),
                    None => return Err(ConfigError::UnterminatedInterpolation),
                }
            }

            let value = env::var(&key)
                .map_err(|_| ConfigError::MissingEnvInterpolation { var: key.clone() })?;
            output.push_str(&value);
            continue;
        }

        output.push(ch);
    }

    Ok(output)
}

fn validate_catalog(catalog: &CatalogConfig) -> Result<(), ConfigError> {
    if catalog.dir.as_os_str().is_empty() {
        return Err(ConfigError::Validation("catalog.dir must not be empty".to_string()));
    }

    for (alias, target) in &catalog.aliases {
        if target.trim().is_empty() {
            return Err(ConfigError::Validation(format!(
                "catalog.aliases.{alias} must name a project file"
            )));
        }
        if alias == target {
            return Err(ConfigError::Validation(format!(
                "catalog.aliases.{alias} points at itself"
            )));
        }
    }

    Ok(())
}

fn validate_export(export: &ExportConfig) -> Result<(), ConfigError> {
    if export.output_dir.as_os_str().is_empty() {
        return Err(ConfigError::Validation("export.output_dir must not be empty".to_string()));
    }
    if export.currency_symbol.trim().is_empty() {
        return Err(ConfigError::Validation(
            "export.currency_symbol must not be empty".to_string(),
        ));
    }
    if let Some(path) = &export.wkhtmltopdf_path {
        if path.trim().is_empty() {
            return Err(ConfigError::Validation(
                "export.wkhtmltopdf_path must not be blank when set".to_string(),
            ));
        }
    }
    Ok(())
}

fn validate_share(share: &ShareConfig) -> Result<(), ConfigError> {
    if let Some(number) = &share.whatsapp_number {
        let digits = number.trim().trim_start_matches('+');
        let valid = !digits.is_empty()
            && digits.chars().all(|ch| ch.is_ascii_digit() || ch == ' ');
        if !valid {
            return Err(ConfigError::Validation(
                "share.whatsapp_number must be an international number such as `+34600000000`"
                    .to_string(),
            ));
        }
    }

    if let Some(address) = &share.email_address {
        let valid = address
            .split_once('@')
            .is_some_and(|(user, domain)| !user.is_empty() && domain.contains('.'));
        if !valid {
            return Err(ConfigError::Validation(
                "share.email_address must be a plain address such as `budgets@example.com`"
                    .to_string(),
            ));
        }
    }

    Ok(())
}

fn validate_access(access: &AccessConfig) -> Result<(), ConfigError> {
    for (index, entry) in access.tokens.iter().enumerate() {
        if entry.project.trim().is_empty() {
            return Err(ConfigError::Validation(format!(
                "access.tokens[{index}].project is required"
            )));
        }
        if entry.token.expose_secret().trim().is_empty() {
            return Err(ConfigError::Validation(format!(
                "access.tokens[{index}].token is required"
            )));
        }
        if entry.client.trim().is_empty() {
            return Err(ConfigError::Validation(format!(
                "access.tokens[{index}].client is required"
            )));
        }

        let duplicate = access.tokens[..index].iter().any(|earlier| {
            earlier.project == entry.project
                && earlier.token.expose_secret() == entry.token.expose_secret()
        });
        if duplicate {
            return Err(ConfigError::Validation(format!(
                "access.tokens[{index}] repeats a project/token pair"
            )));
        }
    }
    Ok(())
}

fn validate_logging(logging: &LoggingConfig) -> Result<(), ConfigError> {
    let level = logging.level.trim().to_ascii_lowercase();
    match level.as_str() {
        "trace" | "debug" | "info" | "warn" | "error" => Ok(()),
        _ => Err(ConfigError::Validation(
            "logging.level must be one of trace|debug|info|warn|error".to_string(),
        )),
    }
}

fn read_env(key: &str) -> Option<String> {
    env::var(key).ok().filter(|value| !value.trim().is_empty())
}

fn parse_bool(key: &str, value: &str) -> Result<bool, ConfigError> {
    value.parse::<bool>().map_err(|_| ConfigError::InvalidEnvOverride {
        key: key.to_string(),
        value: value.to_string(),
    })
}

#[derive(Debug, Default, Deserialize)]
struct ConfigPatch {
    catalog: Option<CatalogPatch>,
    export: Option<ExportPatch>,
    share: Option<SharePatch>,
    access: Option<AccessPatch>,
    logging: Option<LoggingPatch>,
}

#[derive(Debug, Default, Deserialize)]
struct CatalogPatch {
    dir: Option<PathBuf>,
    aliases: Option<BTreeMap<String, String>>,
    unavailable: Option<BTreeMap<String, String>>,
}

#[derive(Debug, Default, Deserialize)]
struct ExportPatch {
    output_dir: Option<PathBuf>,
    currency_symbol: Option<String>,
    wkhtmltopdf_path: Option<String>,
    prefer_pdf: Option<bool>,
}

#[derive(Debug, Default, Deserialize)]
struct SharePatch {
    whatsapp_number: Option<String>,
    email_address: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct AccessPatch {
    #[serde(default)]
    tokens: Vec<TokenPatch>,
}

#[derive(Debug, Deserialize)]
struct TokenPatch {
    project: String,
    token: String,
    client: String,
    expires: Option<NaiveDate>,
    active: Option<bool>,
}

#[derive(Debug, Default, Deserialize)]
struct LoggingPatch {
    level: Option<String>,
    format: Option<LogFormat>,
}
