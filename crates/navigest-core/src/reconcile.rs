// ── Cache / projection reconciliation ──
//
// The reconciler owns three views of the client list:
//   cache      every known client, the source of truth for filtering
//   projection the ordered, filtered subset a UI renders
//   selection  at most one entry, always one that is projected or just saved
//
// All three hold clones of the same `ClientEntry` handles, so updating a
// cached client is visible everywhere without re-inserting it. Mutation is
// `&mut self`: one owner applies operations in call order.

use std::sync::Arc;

use tokio::sync::watch;
use tracing::debug;

use crate::currency::format_credit;
use crate::error::ValidationError;
use crate::model::{ClientEntry, ClientRecord};
use crate::notify::{CanonicalField, ChangeEvent, Notifier};
use crate::phone::{digit_count, normalize_body};

/// Check a record before it is saved, first failing rule only.
///
/// Rules run in priority order: name, phone, email, salesperson, then the
/// phone digit limit. On success the phone body and credit value are
/// rewritten in canonical form; on failure `record` is left untouched.
pub fn validate(record: &mut ClientRecord, phone_body_max: usize) -> Result<(), ValidationError> {
    if is_blank(&record.name) {
        return Err(ValidationError::MissingName);
    }
    if is_blank(&record.phone_body) {
        return Err(ValidationError::MissingPhone);
    }
    if is_blank(&record.email) {
        return Err(ValidationError::MissingEmail);
    }
    if is_blank(&record.salesperson) {
        return Err(ValidationError::MissingSalesperson);
    }

    let digits = digit_count(&record.phone_body);
    if digits == 0 {
        return Err(ValidationError::MissingPhone);
    }
    if digits > phone_body_max {
        return Err(ValidationError::PhoneTooLong {
            max: phone_body_max,
            actual: digits,
        });
    }

    record.phone_body = normalize_body(&record.phone_body);
    record.credit_value = format_credit(&record.credit_value);
    Ok(())
}

fn is_blank(value: &str) -> bool {
    value.trim().is_empty()
}

/// Canonical fields that differ between two versions of a record.
fn changed_fields(before: &ClientRecord, after: &ClientRecord) -> Vec<CanonicalField> {
    [
        (CanonicalField::Code, before.code != after.code),
        (CanonicalField::PhoneBody, before.phone_body != after.phone_body),
        (CanonicalField::DialPrefix, before.dial_prefix != after.dial_prefix),
        (CanonicalField::CreditValue, before.credit_value != after.credit_value),
    ]
    .into_iter()
    .filter_map(|(field, changed)| changed.then_some(field))
    .collect()
}

pub struct Reconciler {
    cache: Vec<ClientEntry>,
    projection: Vec<ClientEntry>,
    selected: Option<ClientEntry>,
    /// Trimmed, lowercased filter currently applied.
    query: String,
    phone_body_max: usize,
    notifier: Arc<Notifier>,
    projection_tx: watch::Sender<Arc<Vec<ClientEntry>>>,
}

impl Reconciler {
    pub fn new(notifier: Arc<Notifier>, phone_body_max: usize) -> Self {
        let (projection_tx, _) = watch::channel(Arc::new(Vec::new()));
        Self {
            cache: Vec::new(),
            projection: Vec::new(),
            selected: None,
            query: String::new(),
            phone_body_max,
            notifier,
            projection_tx,
        }
    }

    pub fn validate(&self, record: &mut ClientRecord) -> Result<(), ValidationError> {
        validate(record, self.phone_body_max)
    }

    /// Insert a saved record, or update the cached client with its code.
    ///
    /// New clients are appended to cache and projection and become the
    /// selection. Known clients keep their handle and projection position.
    pub fn upsert(&mut self, record: &ClientRecord) -> ClientEntry {
        let mut normalized = record.clone();
        normalized.normalize();
        let code = normalized.code.clone();

        if let Some(entry) = self.find(&code) {
            let previous = entry.replace(normalized);
            let fields = changed_fields(&previous, &entry.load());
            debug!(code = %code, changed = fields.len(), "reconcile: updated cached client");
            self.emit_fields(&code, fields);

            self.publish_projection();
            if self.selected.as_ref().is_some_and(|s| s.has_code(&code)) {
                self.selected = Some(entry.clone());
                self.announce_selection();
            }
            entry
        } else {
            let fields = changed_fields(record, &normalized);
            let entry = ClientEntry::new(normalized);
            self.cache.push(entry.clone());
            self.projection.push(entry.clone());
            debug!(code = %code, cached = self.cache.len(), "reconcile: added client");
            self.emit_fields(&code, fields);

            self.publish_projection();
            self.set_selection(Some(entry.clone()));
            entry
        }
    }

    /// Drop a client from cache and projection. A removed selection becomes
    /// empty, never the next entry.
    pub fn remove(&mut self, code: &str) -> Option<ClientEntry> {
        let index = self.cache.iter().position(|e| e.has_code(code))?;
        let removed = self.cache.remove(index);
        self.projection.retain(|e| !e.same_entity(&removed));
        debug!(code, cached = self.cache.len(), "reconcile: removed client");

        self.publish_projection();
        if self.selected.as_ref().is_some_and(|s| s.same_entity(&removed)) {
            self.set_selection(None);
        }
        Some(removed)
    }

    /// Rebuild the projection from the cache for `query`.
    ///
    /// Matching is a case-insensitive substring test over name, code and
    /// email. The selection survives when its code is still projected.
    pub fn apply_filter(&mut self, query: &str) {
        self.query = query.trim().to_lowercase();
        self.projection = self.filtered();
        debug!(
            query = %self.query,
            projected = self.projection.len(),
            "reconcile: filter applied"
        );
        self.publish_projection();
        self.reselect_by_code();
    }

    /// Replace the whole cache with a fresh load, in one step.
    ///
    /// Clients that were already cached keep their handle. The current
    /// filter is re-applied and the selection is kept by code.
    pub fn replace_all(&mut self, records: Vec<ClientRecord>) {
        let mut previous = std::mem::take(&mut self.cache);
        self.cache = records
            .into_iter()
            .map(|mut record| {
                record.normalize();
                match previous.iter().position(|e| e.has_code(&record.code)) {
                    Some(i) => {
                        let entry = previous.swap_remove(i);
                        entry.replace(record);
                        entry
                    }
                    None => ClientEntry::new(record),
                }
            })
            .collect();
        self.projection = self.filtered();
        debug!(
            cached = self.cache.len(),
            projected = self.projection.len(),
            "reconcile: cache replaced"
        );
        self.publish_projection();
        self.reselect_by_code();
    }

    /// Select the first projected client when nothing is selected.
    pub fn ensure_selection(&mut self) {
        if self.selected.is_some() {
            return;
        }
        if let Some(first) = self.projection.first().cloned() {
            self.set_selection(Some(first));
        }
    }

    /// Select a cached client by code.
    pub fn select(&mut self, code: &str) -> Option<ClientEntry> {
        let entry = self.find(code)?;
        self.set_selection(Some(entry.clone()));
        Some(entry)
    }

    pub fn clear_selection(&mut self) {
        self.set_selection(None);
    }

    /// Update the folders flag of a cached client. Returns `false` when the
    /// code is not cached.
    pub fn set_folders_provisioned(&mut self, code: &str, provisioned: bool) -> bool {
        let Some(entry) = self.find(code) else {
            return false;
        };
        let current = entry.load();
        if current.folders_provisioned != provisioned {
            entry.replace(ClientRecord {
                folders_provisioned: provisioned,
                ..ClientRecord::clone(&current)
            });
            self.publish_projection();
        }
        true
    }

    /// Exact, case-sensitive lookup by code.
    pub fn find(&self, code: &str) -> Option<ClientEntry> {
        self.cache.iter().find(|e| e.has_code(code)).cloned()
    }

    // ── Snapshot accessors ───────────────────────────────────────────

    pub fn cache(&self) -> &[ClientEntry] {
        &self.cache
    }

    pub fn projection(&self) -> &[ClientEntry] {
        &self.projection
    }

    pub fn selected(&self) -> Option<&ClientEntry> {
        self.selected.as_ref()
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn subscribe_projection(&self) -> watch::Receiver<Arc<Vec<ClientEntry>>> {
        self.projection_tx.subscribe()
    }

    // ── Private helpers ──────────────────────────────────────────────

    fn filtered(&self) -> Vec<ClientEntry> {
        if self.query.is_empty() {
            return self.cache.clone();
        }
        self.cache
            .iter()
            .filter(|e| e.load().matches_query(&self.query))
            .cloned()
            .collect()
    }

    fn reselect_by_code(&mut self) {
        let Some(current) = self.selected.as_ref() else {
            return;
        };
        let code = current.code();
        let kept = self.projection.iter().find(|e| e.has_code(&code)).cloned();
        self.set_selection(kept);
    }

    /// Move the selection, notifying only when it actually changed.
    fn set_selection(&mut self, next: Option<ClientEntry>) {
        let unchanged = match (&self.selected, &next) {
            (None, None) => true,
            (Some(a), Some(b)) => a.same_entity(b),
            _ => false,
        };
        if unchanged {
            return;
        }
        self.selected = next;
        self.announce_selection();
    }

    fn announce_selection(&self) {
        self.notifier.emit(&ChangeEvent::SelectionChanged {
            selected: self.selected.clone(),
        });
    }

    fn publish_projection(&self) {
        let snapshot = Arc::new(self.projection.clone());
        self.projection_tx.send_replace(Arc::clone(&snapshot));
        self.notifier
            .emit(&ChangeEvent::ProjectionChanged { projection: snapshot });
    }

    fn emit_fields(&self, code: &str, fields: Vec<CanonicalField>) {
        if fields.is_empty() {
            return;
        }
        self.notifier.emit(&ChangeEvent::FieldsChanged {
            code: code.to_owned(),
            fields,
        });
    }
}

impl std::fmt::Debug for Reconciler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Reconciler")
            .field("cached", &self.cache.len())
            .field("projected", &self.projection.len())
            .field("selected", &self.selected.as_ref().map(ClientEntry::code))
            .field("query", &self.query)
            .finish_non_exhaustive()
    }
}
