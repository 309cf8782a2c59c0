//! Currency command handler.

use serde::Serialize;
use tabled::Tabled;

use navigest_core::{format_credit, parse_credit};

use crate::cli::{CurrencyArgs, GlobalOpts};
use crate::error::CliError;
use crate::output;

// ── Table row ───────────────────────────────────────────────────────

#[derive(Serialize)]
struct CreditView {
    input: String,
    canonical: String,
    /// Whether the input parsed as an amount; unparseable input renders as zero.
    parsed: bool,
}

#[derive(Tabled)]
struct CreditRow {
    #[tabled(rename = "Input")]
    input: String,
    #[tabled(rename = "Canonical")]
    canonical: String,
    #[tabled(rename = "Parsed")]
    parsed: String,
}

impl From<&CreditView> for CreditRow {
    fn from(v: &CreditView) -> Self {
        Self {
            input: v.input.clone(),
            canonical: v.canonical.clone(),
            parsed: if v.parsed { "yes" } else { "no" }.into(),
        }
    }
}

// ── Handler ─────────────────────────────────────────────────────────

pub fn handle(args: &CurrencyArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let views: Vec<CreditView> = args
        .values
        .iter()
        .map(|raw| CreditView {
            input: raw.clone(),
            canonical: format_credit(raw),
            parsed: parse_credit(raw).is_some(),
        })
        .collect();

    let out = output::render_list(
        &global.output,
        &views,
        |v| CreditRow::from(v),
        |v| v.canonical.clone(),
    )?;
    output::print_output(&out, global.quiet);
    Ok(())
}
