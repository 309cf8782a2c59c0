// ── Runtime directory configuration ──
//
// Tuning for a `ClientDirectory`. Built by the caller (the config crate
// translates the TOML file into it); core never reads config files.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::phone::{DEFAULT_COUNTRY, PHONE_BODY_MAX};

/// Default quiet period before a search is applied.
pub const DEFAULT_SEARCH_DEBOUNCE: Duration = Duration::from_millis(300);

/// How client codes are rendered from the sequence counter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CodeFormat {
    /// Fixed leading text (`"CL"`).
    pub prefix: String,
    /// Minimum number of digits; the counter is zero-padded to it.
    /// Wider counters render unpadded.
    pub min_width: usize,
}

impl CodeFormat {
    pub fn render(&self, counter: u64) -> String {
        format!("{}{counter:0width$}", self.prefix, width = self.min_width)
    }
}

impl Default for CodeFormat {
    fn default() -> Self {
        Self {
            prefix: "CL".into(),
            min_width: 6,
        }
    }
}

/// Configuration for one client directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectoryConfig {
    pub code_format: CodeFormat,
    /// Maximum number of digits in a phone body.
    pub phone_body_max: usize,
    /// Quiet period for debounced search.
    pub search_debounce: Duration,
    /// ISO code of the domestic country (external flag, default dial code).
    pub default_country: String,
}

impl Default for DirectoryConfig {
    fn default() -> Self {
        Self {
            code_format: CodeFormat::default(),
            phone_body_max: PHONE_BODY_MAX,
            search_debounce: DEFAULT_SEARCH_DEBOUNCE,
            default_country: DEFAULT_COUNTRY.into(),
        }
    }
}
