//! CLI error types with miette diagnostics.
//!
//! Maps `CoreError` and `ConfigError` into user-facing errors with help text.

use miette::Diagnostic;
use thiserror::Error;

use navigest_config::ConfigError;
use navigest_core::{CoreError, StoreError};

/// Process exit codes.
pub mod exit_code {
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const INVALID_DATA: i32 = 3;
    pub const CONFLICT: i32 = 6;
    pub const UNAVAILABLE: i32 = 7;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Input ────────────────────────────────────────────────────────

    #[error("{message}")]
    #[diagnostic(code(navigest::validation))]
    Validation { message: String },

    #[error("{invalid} of {total} client records failed validation")]
    #[diagnostic(
        code(navigest::invalid_records),
        help("The report above lists the failing records and the reason for each.")
    )]
    InvalidRecords { invalid: usize, total: usize },

    #[error("Invalid client file {path}: {reason}")]
    #[diagnostic(
        code(navigest::from_file),
        help("Expected a JSON array of client records, e.g. [{{\"code\": \"CL000001\", \"name\": \"...\"}}]")
    )]
    ClientFile { path: String, reason: String },

    // ── Engine ───────────────────────────────────────────────────────

    #[error("Could not obtain a client code: {reason}")]
    #[diagnostic(
        code(navigest::allocation_unavailable),
        help("The code sequence is unreachable. Retry once the database is back.")
    )]
    AllocationUnavailable { reason: String },

    #[error("Client {code}: {message}")]
    #[diagnostic(code(navigest::conflict))]
    Conflict { code: String, message: String },

    #[error(transparent)]
    #[diagnostic(code(navigest::store))]
    Store(StoreError),

    // ── Configuration ────────────────────────────────────────────────

    #[error("Invalid configuration: {reason}")]
    #[diagnostic(
        code(navigest::config),
        help(
            "Check the config file at {path}\n\
             Or recreate it with: navigest config init --force"
        )
    )]
    Config { path: String, reason: String },

    #[error("Configuration file already exists at {path}")]
    #[diagnostic(
        code(navigest::config_exists),
        help("Use --force to overwrite it.")
    )]
    ConfigExists { path: String },

    // ── IO / Serialization ────────────────────────────────────────────

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("Failed to render JSON: {0}")]
    #[diagnostic(code(navigest::json))]
    Json(#[from] serde_json::Error),

    #[error("Failed to render YAML: {0}")]
    #[diagnostic(code(navigest::yaml))]
    Yaml(#[from] serde_yaml::Error),

    #[error("Failed to render TOML: {0}")]
    #[diagnostic(code(navigest::toml))]
    Toml(#[from] toml::ser::Error),
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Validation { .. } | Self::ConfigExists { .. } => exit_code::USAGE,
            Self::InvalidRecords { .. } | Self::ClientFile { .. } => exit_code::INVALID_DATA,
            Self::Conflict { .. } => exit_code::CONFLICT,
            Self::AllocationUnavailable { .. } | Self::Store(StoreError::Unavailable { .. }) => {
                exit_code::UNAVAILABLE
            }
            _ => exit_code::GENERAL,
        }
    }

    /// Config error tagged with the file it came from.
    pub fn config(path: &std::path::Path, err: &ConfigError) -> Self {
        Self::Config {
            path: path.display().to_string(),
            reason: err.to_string(),
        }
    }
}

// ── CoreError → CliError mapping ─────────────────────────────────────

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::Validation(e) => Self::Validation {
                message: e.to_string(),
            },
            CoreError::AllocationUnavailable { reason } => Self::AllocationUnavailable { reason },
            CoreError::PersistenceConflict { code } => Self::Conflict {
                code,
                message: "code collided again after re-allocation".into(),
            },
            CoreError::DependencyConflict { code, message } => Self::Conflict { code, message },
            CoreError::Store(e) => Self::Store(e),
            CoreError::Config { message } => Self::Config {
                path: navigest_config::config_path().display().to_string(),
                reason: message,
            },
        }
    }
}

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::Io(e) => Self::Io(e),
            other => Self::config(&navigest_config::config_path(), &other),
        }
    }
}
