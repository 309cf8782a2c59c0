//! Client list command handlers.
//!
//! Clients come from a JSON export and are served through an in-memory
//! store, so `list` goes through the same load/filter path as the app.

use std::path::Path;
use std::sync::Arc;

use serde::Serialize;
use tabled::Tabled;
use tracing::{info, warn};

use navigest_core::{
    ClientDirectory, ClientDraft, ClientEntry, ClientRecord, DialCodeCatalog, MemoryStore, validate,
};

use crate::cli::{ClientsArgs, ClientsCommand, GlobalOpts};
use crate::error::CliError;
use crate::output;

use super::Engine;

// ── Table rows ──────────────────────────────────────────────────────

#[derive(Tabled)]
struct ClientRow {
    #[tabled(rename = "Code")]
    code: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Phone")]
    phone: String,
    #[tabled(rename = "Email")]
    email: String,
    #[tabled(rename = "Salesperson")]
    salesperson: String,
    #[tabled(rename = "Credit")]
    credit: String,
    #[tabled(rename = "Ext")]
    external: String,
}

impl From<&Arc<ClientRecord>> for ClientRow {
    fn from(c: &Arc<ClientRecord>) -> Self {
        Self {
            code: c.code.clone(),
            name: c.name.clone(),
            phone: c.display_phone(),
            email: c.email.clone(),
            salesperson: c.salesperson.clone(),
            credit: c.credit_value.clone(),
            external: if c.external_flag { "yes" } else { "" }.into(),
        }
    }
}

/// Outcome of checking one exported record.
#[derive(Serialize)]
struct CheckReport {
    code: String,
    name: String,
    valid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
    /// Whether canonicalization rewrote any field.
    changed: bool,
    /// The record as it would be saved. Absent when invalid.
    #[serde(skip_serializing_if = "Option::is_none")]
    canonical: Option<ClientRecord>,
}

#[derive(Tabled)]
struct CheckRow {
    #[tabled(rename = "Code")]
    code: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Status")]
    status: String,
    #[tabled(rename = "Phone")]
    phone: String,
    #[tabled(rename = "Credit")]
    credit: String,
}

fn check_row(r: &CheckReport, color: bool) -> CheckRow {
    let status = match (&r.error, r.changed) {
        (Some(e), _) => e.clone(),
        (None, true) => "ok (canonicalized)".into(),
        (None, false) => "ok".into(),
    };
    CheckRow {
        code: r.code.clone(),
        name: r.name.clone(),
        status: output::status_text(&status, r.valid, color),
        phone: r
            .canonical
            .as_ref()
            .map(ClientRecord::display_phone)
            .unwrap_or_default(),
        credit: r
            .canonical
            .as_ref()
            .map(|c| c.credit_value.clone())
            .unwrap_or_default(),
    }
}

// ── Helpers ─────────────────────────────────────────────────────────

fn read_clients(path: &Path) -> Result<Vec<ClientRecord>, CliError> {
    let file_err = |reason: String| CliError::ClientFile {
        path: path.display().to_string(),
        reason,
    };
    let contents = std::fs::read_to_string(path).map_err(|e| file_err(e.to_string()))?;
    serde_json::from_str(&contents).map_err(|e| file_err(format!("invalid JSON: {e}")))
}

/// Run a stored record through the edit form and the save-time rules.
fn check_record(record: &ClientRecord, catalog: &DialCodeCatalog, phone_body_max: usize) -> CheckReport {
    let draft = ClientDraft::from_record(record, catalog);
    let mut candidate = draft.into_record();

    match validate(&mut candidate, phone_body_max) {
        Ok(()) => {
            candidate.normalize();
            CheckReport {
                code: record.code.clone(),
                name: candidate.name.clone(),
                valid: true,
                error: None,
                changed: &candidate != record,
                canonical: Some(candidate),
            }
        }
        Err(e) => CheckReport {
            code: record.code.clone(),
            name: record.name.clone(),
            valid: false,
            error: Some(e.to_string()),
            changed: false,
            canonical: None,
        },
    }
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(args: ClientsArgs, engine: &Engine, global: &GlobalOpts) -> Result<(), CliError> {
    match args.command {
        ClientsCommand::List { from_file, search } => {
            let records = read_clients(&from_file)?;
            let total = records.len();

            let store = MemoryStore::new();
            store.seed(records);
            if store.len() < total {
                warn!(
                    duplicates = total - store.len(),
                    "duplicate client codes in file, later rows win"
                );
            }

            let directory = ClientDirectory::with_catalog(
                Arc::new(store),
                engine.directory.clone(),
                Arc::clone(&engine.catalog),
            );
            directory.load().await?;
            if let Some(query) = search.as_deref() {
                directory.search_now(query).await;
            }

            let clients: Vec<Arc<ClientRecord>> =
                directory.projection().iter().map(ClientEntry::load).collect();
            let out = output::render_list(
                &global.output,
                &clients,
                |c| ClientRow::from(c),
                |c| c.code.clone(),
            )?;
            output::print_output(&out, global.quiet);
            Ok(())
        }

        ClientsCommand::Check { from_file } => {
            let records = read_clients(&from_file)?;
            let reports: Vec<CheckReport> = records
                .iter()
                .map(|r| check_record(r, &engine.catalog, engine.directory.phone_body_max))
                .collect();

            let total = reports.len();
            let invalid = reports.iter().filter(|r| !r.valid).count();
            info!(total, invalid, "client file checked");

            let color = output::should_color(&global.color);
            let out = output::render_list(
                &global.output,
                &reports,
                |r| check_row(r, color),
                |r| {
                    let status = r.error.as_deref().unwrap_or("ok");
                    format!("{}\t{status}", r.code)
                },
            )?;
            output::print_output(&out, global.quiet);

            if invalid > 0 {
                return Err(CliError::InvalidRecords { invalid, total });
            }
            Ok(())
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn record() -> ClientRecord {
        ClientRecord {
            code: "CL000001".into(),
            name: "  Ana   Lopes ".into(),
            phone_body: "00351912345678".into(),
            email: "ana@example.pt".into(),
            salesperson: "rui".into(),
            credit_value: "1.234,5".into(),
            ..ClientRecord::default()
        }
    }

    #[test]
    fn check_canonicalizes_valid_record() {
        let catalog = DialCodeCatalog::default();
        let report = check_record(&record(), &catalog, 20);

        assert!(report.valid);
        assert!(report.changed);
        let canonical = report.canonical.unwrap();
        assert_eq!(canonical.name, "Ana Lopes");
        assert_eq!(canonical.dial_prefix, "+351");
        assert_eq!(canonical.phone_body, "912 345 678");
        assert_eq!(canonical.salesperson, "RUI");
        assert_eq!(canonical.credit_value, "1 234,50€");
    }

    #[test]
    fn check_reports_first_failing_rule() {
        let catalog = DialCodeCatalog::default();
        let mut bad = record();
        bad.email = String::new();
        let report = check_record(&bad, &catalog, 20);

        assert!(!report.valid);
        assert_eq!(report.error.as_deref(), Some("Email is required"));
        assert!(report.canonical.is_none());
    }
}
