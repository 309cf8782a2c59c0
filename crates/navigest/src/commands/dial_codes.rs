//! Dial code catalog command handler.

use std::sync::Arc;

use tabled::Tabled;

use navigest_core::DialCode;

use crate::cli::{DialCodesArgs, GlobalOpts};
use crate::error::CliError;
use crate::output;

use super::Engine;

// ── Table row ───────────────────────────────────────────────────────

#[derive(Tabled)]
struct DialCodeRow {
    #[tabled(rename = "Flag")]
    flag: String,
    #[tabled(rename = "Code")]
    code: String,
    #[tabled(rename = "Country")]
    country: String,
    #[tabled(rename = "Prefix")]
    prefix: String,
}

impl From<&Arc<DialCode>> for DialCodeRow {
    fn from(d: &Arc<DialCode>) -> Self {
        Self {
            flag: d.flag_emoji().to_owned(),
            code: d.short_code().to_owned(),
            country: d.country_name().to_owned(),
            prefix: d.normalized_prefix().to_owned(),
        }
    }
}

// ── Handler ─────────────────────────────────────────────────────────

pub fn handle(args: &DialCodesArgs, engine: &Engine, global: &GlobalOpts) -> Result<(), CliError> {
    let entries = engine.catalog.search(args.search.as_deref().unwrap_or_default());
    tracing::debug!(matches = entries.len(), "dial code search");

    let out = output::render_list(
        &global.output,
        &entries,
        |d| DialCodeRow::from(d),
        |d| d.picker_display(),
    )?;
    output::print_output(&out, global.quiet);
    Ok(())
}
