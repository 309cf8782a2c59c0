// ── Edit buffer ──
//
// A `ClientDraft` is the record being edited plus the state the edit form
// keeps beside it: code status, the selected dial code and the phone body
// as typed. Phone fields stay in sync the way the form expects: changing
// the dial code re-strips the body, typing a body that repeats the prefix
// drops the duplicate, and the external flag follows the dial code.

use std::sync::Arc;

use serde::Serialize;

use super::client::{ClientRecord, CodeStatus};
use super::dial_code::DialCode;
use crate::currency::format_credit;
use crate::phone::{DialCodeCatalog, normalize_body, split_phone, strip_known_prefix};

#[derive(Debug, Clone, Serialize)]
pub struct ClientDraft {
    record: ClientRecord,
    status: CodeStatus,
    dial: Arc<DialCode>,
}

impl ClientDraft {
    /// Empty form for a new client. `preview` is the code the store would
    /// hand out next, when it could be read.
    pub fn new_template(preview: Option<String>, catalog: &DialCodeCatalog) -> Self {
        let (code, status) = match preview {
            Some(code) if !code.trim().is_empty() => (code, CodeStatus::Preview),
            _ => (String::new(), CodeStatus::Unassigned),
        };

        let mut draft = Self {
            record: ClientRecord {
                code,
                ..ClientRecord::template()
            },
            status,
            dial: catalog.no_prefix(),
        };
        draft.apply_external_flag(catalog);
        draft
    }

    /// Start editing a stored client. The stored phone is split against the
    /// stored prefix; an unknown prefix gets a custom catalog entry.
    pub fn from_record(record: &ClientRecord, catalog: &DialCodeCatalog) -> Self {
        let mut draft = Self {
            record: record.clone(),
            status: CodeStatus::Committed,
            dial: catalog.no_prefix(),
        };
        draft.set_phone(&record.phone_body, &record.dial_prefix, catalog);
        draft
    }

    /// Replace both phone fields from a full number, using `model_prefix`
    /// when the record already names one.
    pub fn set_phone(&mut self, raw: &str, model_prefix: &str, catalog: &DialCodeCatalog) {
        let split = split_phone(raw, model_prefix);
        self.dial = catalog.ensure_for_prefix(&split.prefix);
        self.sync_phone(&split.body, catalog);
    }

    /// The user picked another dial code.
    pub fn set_dial_code(&mut self, dial: Arc<DialCode>, catalog: &DialCodeCatalog) {
        self.dial = dial;
        let body = self.record.phone_body.clone();
        self.sync_phone(&body, catalog);
    }

    /// The user typed into the phone body field.
    pub fn set_phone_body(&mut self, text: &str, catalog: &DialCodeCatalog) {
        self.sync_phone(text, catalog);
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.record.name = name.into();
    }

    pub fn set_email(&mut self, email: impl Into<String>) {
        self.record.email = email.into();
    }

    pub fn set_salesperson(&mut self, salesperson: impl Into<String>) {
        self.record.salesperson = salesperson.into();
    }

    pub fn set_cancelled(&mut self, cancelled: bool) {
        self.record.cancelled_flag = cancelled;
    }

    /// Raw credit text as typed. Canonicalized by [`Self::format_credit`]
    /// or on save.
    pub fn set_credit_value(&mut self, raw: impl Into<String>) {
        self.record.credit_value = raw.into();
    }

    /// Canonicalize the credit field (the form does this on blur).
    /// Returns `true` when the text changed.
    pub fn format_credit(&mut self) -> bool {
        let formatted = format_credit(&self.record.credit_value);
        if formatted == self.record.credit_value {
            return false;
        }
        self.record.credit_value = formatted;
        true
    }

    pub fn record(&self) -> &ClientRecord {
        &self.record
    }

    pub fn code(&self) -> &str {
        &self.record.code
    }

    pub fn status(&self) -> CodeStatus {
        self.status
    }

    pub fn dial_code(&self) -> &Arc<DialCode> {
        &self.dial
    }

    pub fn phone_body(&self) -> &str {
        &self.record.phone_body
    }

    pub fn into_record(self) -> ClientRecord {
        self.record
    }

    // ── Crate-internal transitions ───────────────────────────────────

    /// A durable code replaced whatever was shown.
    pub(crate) fn commit_code(&mut self, code: String) {
        self.record.code = code;
        self.status = CodeStatus::Committed;
    }

    /// Adopt the canonical record produced by a successful validation.
    pub(crate) fn adopt(&mut self, record: ClientRecord) {
        self.record = record;
    }

    fn sync_phone(&mut self, body: &str, catalog: &DialCodeCatalog) {
        let prefix = self.dial.normalized_prefix();
        self.record.phone_body = normalize_body(&strip_known_prefix(body, prefix));
        self.record.dial_prefix = prefix.to_owned();
        self.apply_external_flag(catalog);
    }

    fn apply_external_flag(&mut self, catalog: &DialCodeCatalog) {
        self.record.external_flag = catalog.is_external(&self.dial);
    }
}
