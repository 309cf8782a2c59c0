// ── Client domain types ──

use std::fmt;
use std::sync::Arc;

use arc_swap::ArcSwap;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use crate::currency::format_credit;
use crate::phone::{normalize_body, normalize_prefix};

/// Lifecycle of a record's code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Display, EnumString, Serialize, Deserialize)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum CodeStatus {
    /// No code could be previewed; one is allocated on save.
    #[default]
    Unassigned,
    /// Shown to the user, not yet durable. May change on save.
    Preview,
    /// Durable. Never recomputed.
    Committed,
}

impl CodeStatus {
    /// Whether saving must allocate a fresh code first.
    pub fn needs_allocation(self) -> bool {
        !matches!(self, Self::Committed)
    }
}

/// The canonical client record.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
#[allow(clippy::struct_excessive_bools)]
pub struct ClientRecord {
    pub code: String,
    pub name: String,
    pub phone_body: String,
    pub dial_prefix: String,
    pub email: String,
    pub external_flag: bool,
    pub cancelled_flag: bool,
    pub salesperson: String,
    pub credit_value: String,
    pub folders_provisioned: bool,
}

impl ClientRecord {
    /// An empty record as shown by a fresh edit form.
    pub fn template() -> Self {
        Self {
            credit_value: format_credit(""),
            ..Self::default()
        }
    }

    /// Canonicalize every field in place.
    ///
    /// Names are trimmed with whitespace runs collapsed, the salesperson is
    /// upper-cased, phone and credit fields go through their canonicalizers.
    pub fn normalize(&mut self) {
        self.code = self.code.trim().to_owned();
        self.name = collapse_whitespace(&self.name);
        self.phone_body = normalize_body(&self.phone_body);
        self.dial_prefix = normalize_prefix(&self.dial_prefix);
        self.email = self.email.trim().to_owned();
        self.salesperson = collapse_whitespace(&self.salesperson).to_uppercase();
        self.credit_value = format_credit(&self.credit_value);
    }

    /// Full phone number as displayed: prefix and body separated by a space.
    pub fn display_phone(&self) -> String {
        match (self.dial_prefix.is_empty(), self.phone_body.is_empty()) {
            (_, true) => String::new(),
            (true, false) => self.phone_body.clone(),
            (false, false) => format!("{} {}", self.dial_prefix, self.phone_body),
        }
    }

    /// Case-insensitive substring match over name, code and email.
    /// `needle` must already be lowercase.
    pub(crate) fn matches_query(&self, needle: &str) -> bool {
        self.name.to_lowercase().contains(needle)
            || self.code.to_lowercase().contains(needle)
            || self.email.to_lowercase().contains(needle)
    }
}

/// Trim and fold runs of whitespace into a single space.
pub(crate) fn collapse_whitespace(input: &str) -> String {
    input.split_whitespace().collect::<Vec<_>>().join(" ")
}

// ── ClientEntry ─────────────────────────────────────────────────────

/// Shared handle to a cached client.
///
/// Cache, projection and selection all hold clones of the same handle.
/// Updating the record swaps the value behind it, so every holder sees the
/// new fields while entity identity stays the same.
#[derive(Clone)]
pub struct ClientEntry(Arc<ArcSwap<ClientRecord>>);

impl ClientEntry {
    pub fn new(record: ClientRecord) -> Self {
        Self(Arc::new(ArcSwap::from_pointee(record)))
    }

    /// Current value (cheap `Arc` clone).
    pub fn load(&self) -> Arc<ClientRecord> {
        self.0.load_full()
    }

    pub fn code(&self) -> String {
        self.0.load().code.clone()
    }

    pub(crate) fn has_code(&self, code: &str) -> bool {
        self.0.load().code == code
    }

    /// Replace the record, returning the previous value.
    pub(crate) fn replace(&self, record: ClientRecord) -> Arc<ClientRecord> {
        self.0.swap(Arc::new(record))
    }

    /// Whether both handles point at the same entity.
    pub fn same_entity(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl fmt::Debug for ClientEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ClientEntry").field(&*self.0.load()).finish()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn template_has_zero_credit() {
        let record = ClientRecord::template();
        assert_eq!(record.credit_value, "0,00€");
        assert!(record.code.is_empty());
    }

    #[test]
    fn normalize_cleans_every_field() {
        let mut record = ClientRecord {
            code: "  CL000001 ".into(),
            name: "  João   Silva ".into(),
            phone_body: "912345678".into(),
            dial_prefix: "00351".into(),
            email: " joao@example.pt ".into(),
            salesperson: " ana  maria ".into(),
            credit_value: "1234.5".into(),
            ..ClientRecord::default()
        };
        record.normalize();

        assert_eq!(record.code, "CL000001");
        assert_eq!(record.name, "João Silva");
        assert_eq!(record.phone_body, "912 345 678");
        assert_eq!(record.dial_prefix, "+351");
        assert_eq!(record.email, "joao@example.pt");
        assert_eq!(record.salesperson, "ANA MARIA");
        assert_eq!(record.credit_value, "1 234,50€");
    }

    #[test]
    fn display_phone_joins_prefix_and_body() {
        let record = ClientRecord {
            phone_body: "912 345 678".into(),
            dial_prefix: "+351".into(),
            ..ClientRecord::default()
        };
        assert_eq!(record.display_phone(), "+351 912 345 678");
    }

    #[test]
    fn entry_replace_is_visible_through_clones() {
        let entry = ClientEntry::new(ClientRecord {
            code: "CL1".into(),
            name: "Before".into(),
            ..ClientRecord::default()
        });
        let other = entry.clone();

        entry.replace(ClientRecord {
            code: "CL1".into(),
            name: "After".into(),
            ..ClientRecord::default()
        });

        assert_eq!(other.load().name, "After");
        assert!(entry.same_entity(&other));
    }

    #[test]
    fn partial_export_fills_missing_fields() {
        let record: ClientRecord = serde_json::from_str(
            r#"{"code": "CL000001", "name": "Ana", "external_flag": true}"#,
        )
        .unwrap();

        assert_eq!(record.code, "CL000001");
        assert!(record.external_flag);
        assert!(record.email.is_empty());
        assert!(!record.folders_provisioned);
    }

    #[test]
    fn code_status_serializes_snake_case() {
        let json = serde_json::to_string(&CodeStatus::Committed).unwrap();
        assert_eq!(json, r#""committed""#);
        let back: CodeStatus = serde_json::from_str(r#""unassigned""#).unwrap();
        assert_eq!(back, CodeStatus::Unassigned);
    }

    #[test]
    fn code_status_allocation_rules() {
        assert!(CodeStatus::Unassigned.needs_allocation());
        assert!(CodeStatus::Preview.needs_allocation());
        assert!(!CodeStatus::Committed.needs_allocation());
        assert_eq!(CodeStatus::Preview.to_string(), "preview");
    }
}
