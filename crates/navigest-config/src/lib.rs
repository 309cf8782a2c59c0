//! Shared configuration for NAVIGEST tools.
//!
//! A TOML file in the platform config directory, merged over built-in
//! defaults and `NAVIGEST_*` environment variables, validated and translated
//! into `navigest_core::DirectoryConfig` plus a dial code catalog.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use navigest_core::phone::{DEFAULT_COUNTRY, MAX_DIAL_DIGITS, PHONE_BODY_MAX};
use navigest_core::{CodeFormat, CoreError, DialCodeCatalog, DirectoryConfig, normalize_prefix};

/// Upper bound for the search quiet period.
const MAX_DEBOUNCE_MS: u64 = 10_000;

/// Widest zero-padding accepted for client codes.
const MAX_CODE_WIDTH: usize = 12;

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("failed to serialize config: {0}")]
    Serialization(#[from] toml::ser::Error),

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

impl From<ConfigError> for CoreError {
    fn from(err: ConfigError) -> Self {
        Self::Config {
            message: err.to_string(),
        }
    }
}

fn invalid(field: &str, reason: impl Into<String>) -> ConfigError {
    ConfigError::Validation {
        field: field.into(),
        reason: reason.into(),
    }
}

// ── TOML config structs ─────────────────────────────────────────────

/// Top-level TOML configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub codes: Codes,

    #[serde(default)]
    pub phone: Phone,

    #[serde(default)]
    pub search: Search,

    /// Countries appended to the built-in dial code table.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub dial_codes: Vec<ExtraDialCode>,
}

/// Client code rendering.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Codes {
    #[serde(default = "default_code_prefix")]
    pub prefix: String,

    #[serde(default = "default_min_width")]
    pub min_width: usize,
}

impl Default for Codes {
    fn default() -> Self {
        Self {
            prefix: default_code_prefix(),
            min_width: default_min_width(),
        }
    }
}

fn default_code_prefix() -> String {
    CodeFormat::default().prefix
}
fn default_min_width() -> usize {
    CodeFormat::default().min_width
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Phone {
    /// Maximum digits in a phone body.
    #[serde(default = "default_body_max")]
    pub body_max: usize,

    /// ISO code of the domestic country.
    #[serde(default = "default_country")]
    pub default_country: String,
}

impl Default for Phone {
    fn default() -> Self {
        Self {
            body_max: default_body_max(),
            default_country: default_country(),
        }
    }
}

fn default_body_max() -> usize {
    PHONE_BODY_MAX
}
fn default_country() -> String {
    DEFAULT_COUNTRY.into()
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Search {
    /// Quiet period before a typed filter is applied, in milliseconds.
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,
}

impl Default for Search {
    fn default() -> Self {
        Self {
            debounce_ms: default_debounce_ms(),
        }
    }
}

fn default_debounce_ms() -> u64 {
    300
}

/// An extra country for the dial code catalog.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct ExtraDialCode {
    /// Two-letter ISO code (e.g., "XK").
    pub iso: String,
    pub name: String,
    /// Calling code, with or without a leading `+`.
    pub digits: String,
}

// ── Translation ─────────────────────────────────────────────────────

impl Config {
    /// Validate and convert into the engine's runtime configuration.
    pub fn to_directory_config(&self) -> Result<DirectoryConfig, ConfigError> {
        let prefix = self.codes.prefix.trim();
        if prefix.is_empty() {
            return Err(invalid("codes.prefix", "must not be empty"));
        }
        if !(1..=MAX_CODE_WIDTH).contains(&self.codes.min_width) {
            return Err(invalid(
                "codes.min_width",
                format!("expected 1..={MAX_CODE_WIDTH}, got {}", self.codes.min_width),
            ));
        }
        if !(1..=PHONE_BODY_MAX).contains(&self.phone.body_max) {
            return Err(invalid(
                "phone.body_max",
                format!("expected 1..={PHONE_BODY_MAX}, got {}", self.phone.body_max),
            ));
        }
        if self.search.debounce_ms > MAX_DEBOUNCE_MS {
            return Err(invalid(
                "search.debounce_ms",
                format!("at most {MAX_DEBOUNCE_MS}, got {}", self.search.debounce_ms),
            ));
        }

        Ok(DirectoryConfig {
            code_format: CodeFormat {
                prefix: prefix.to_owned(),
                min_width: self.codes.min_width,
            },
            phone_body_max: self.phone.body_max,
            search_debounce: Duration::from_millis(self.search.debounce_ms),
            default_country: validate_iso("phone.default_country", &self.phone.default_country)?,
        })
    }

    /// Seed a dial code catalog and append the configured extra countries.
    ///
    /// The default country must resolve once the extras are in.
    pub fn build_catalog(&self) -> Result<Arc<DialCodeCatalog>, ConfigError> {
        let default_country = validate_iso("phone.default_country", &self.phone.default_country)?;

        let mut extras = Vec::with_capacity(self.dial_codes.len());
        for (i, extra) in self.dial_codes.iter().enumerate() {
            let field = format!("dial_codes[{i}]");
            let iso = validate_iso(&field, &extra.iso)?;
            let name = extra.name.trim();
            if name.is_empty() {
                return Err(invalid(&field, "name must not be empty"));
            }
            let prefix = normalize_prefix(&extra.digits);
            let digits = prefix.trim_start_matches('+');
            if digits.is_empty() || digits.len() > MAX_DIAL_DIGITS {
                return Err(invalid(
                    &field,
                    format!("expected 1 to {MAX_DIAL_DIGITS} digits, got '{}'", extra.digits),
                ));
            }
            extras.push((iso, name.to_owned(), digits.to_owned()));
        }

        let catalog = DialCodeCatalog::seeded(&default_country);
        catalog.extend_countries(
            extras
                .iter()
                .map(|(iso, name, digits)| (iso.as_str(), name.as_str(), digits.as_str())),
        );

        if catalog.find_by_short_code(&default_country).is_none() {
            return Err(invalid(
                "phone.default_country",
                format!("'{default_country}' is not a known country"),
            ));
        }
        Ok(Arc::new(catalog))
    }
}

fn validate_iso(field: &str, raw: &str) -> Result<String, ConfigError> {
    let iso = raw.trim().to_uppercase();
    if iso.len() == 2 && iso.chars().all(|c| c.is_ascii_alphabetic()) {
        Ok(iso)
    } else {
        Err(invalid(
            field,
            format!("expected a two-letter country code, got '{raw}'"),
        ))
    }
}

// ── Config file path ────────────────────────────────────────────────

/// Resolve the config file path via XDG / platform conventions.
pub fn config_path() -> PathBuf {
    ProjectDirs::from("pt", "navigest", "navigest").map_or_else(
        || {
            let mut p = dirs_fallback();
            p.push("config.toml");
            p
        },
        |dirs| dirs.config_dir().join("config.toml"),
    )
}

fn dirs_fallback() -> PathBuf {
    let mut p = PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".into()));
    p.push(".config");
    p.push("navigest");
    p
}

// ── Config loading ──────────────────────────────────────────────────

/// Load the config from the canonical path and the environment.
pub fn load_config() -> Result<Config, ConfigError> {
    load_config_from(&config_path())
}

/// Load the config from `path` merged over defaults, then `NAVIGEST_*`
/// variables (`NAVIGEST_CODES__PREFIX=CLI`). A missing file is not an error.
pub fn load_config_from(path: &Path) -> Result<Config, ConfigError> {
    let figment = Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(path))
        .merge(Env::prefixed("NAVIGEST_").split("__"));

    let config: Config = figment.extract()?;
    Ok(config)
}

/// Load config, returning a default if it can't be read.
pub fn load_config_or_default() -> Config {
    load_config().unwrap_or_default()
}

// ── Config saving ───────────────────────────────────────────────────

/// Serialize config to TOML and write to the canonical config path.
pub fn save_config(cfg: &Config) -> Result<(), ConfigError> {
    save_config_to(cfg, &config_path())
}

pub fn save_config_to(cfg: &Config, path: &Path) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let toml_str = toml::to_string_pretty(cfg)?;
    std::fs::write(path, toml_str)?;
    Ok(())
}
