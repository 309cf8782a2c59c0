// ── In-memory client store ──
//
// Concurrent reference implementation of `ClientStore`. Rows live in a
// `DashMap`, the sequence is an `AtomicU64` bumped with `fetch_add`, so
// allocation is atomic without any application-level locking. Latency, an
// offline switch and a read-only switch let tests exercise slow and failing
// backends.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::Duration;

use dashmap::mapref::entry::Entry;
use dashmap::{DashMap, DashSet};
use tracing::trace;

use super::{ClientStore, StoreError, WriteMode};
use crate::model::ClientRecord;

const DEPENDENTS_MESSAGE: &str = "Cannot delete: the client has associated services.";

pub struct MemoryStore {
    /// Primary storage: client code -> row.
    rows: DashMap<String, ClientRecord>,

    /// Next value the sequence hands out.
    next_sequence: AtomicU64,

    /// Client code -> number of records referencing it.
    dependents: DashMap<String, usize>,

    salespeople: DashSet<String>,

    offline: AtomicBool,
    read_only: AtomicBool,
    latency: Duration,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            rows: DashMap::new(),
            next_sequence: AtomicU64::new(1),
            dependents: DashMap::new(),
            salespeople: DashSet::new(),
            offline: AtomicBool::new(false),
            read_only: AtomicBool::new(false),
            latency: Duration::ZERO,
        }
    }

    /// Delay every call by `latency`.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    /// Start the sequence at `next` instead of 1.
    pub fn with_next_sequence(self, next: u64) -> Self {
        self.next_sequence.store(next, Ordering::SeqCst);
        self
    }

    pub fn with_salespeople<I, S>(self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for name in names {
            self.salespeople.insert(name.into());
        }
        self
    }

    /// Insert rows as they are, without touching the sequence.
    pub fn seed<I>(&self, records: I)
    where
        I: IntoIterator<Item = ClientRecord>,
    {
        for record in records {
            self.rows.insert(record.code.clone(), record);
        }
    }

    /// Register a record that references `code`, blocking its deletion.
    pub fn add_dependent(&self, code: &str) {
        *self.dependents.entry(code.to_owned()).or_insert(0) += 1;
    }

    /// Simulate losing (or regaining) the backend.
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    /// Reject row writes while the sequence keeps working.
    pub fn set_read_only(&self, read_only: bool) {
        self.read_only.store(read_only, Ordering::SeqCst);
    }

    pub fn get(&self, code: &str) -> Option<ClientRecord> {
        self.rows.get(code).map(|r| r.value().clone())
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    // ── Private helpers ──────────────────────────────────────────────

    async fn round_trip(&self) -> Result<(), StoreError> {
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
        if self.offline.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable {
                reason: "in-memory store is offline".into(),
            });
        }
        Ok(())
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ClientStore for MemoryStore {
    async fn peek_next_sequence(&self) -> Result<u64, StoreError> {
        self.round_trip().await?;
        Ok(self.next_sequence.load(Ordering::SeqCst))
    }

    async fn allocate_sequence(&self) -> Result<u64, StoreError> {
        self.round_trip().await?;
        let value = self.next_sequence.fetch_add(1, Ordering::SeqCst);
        trace!(value, "sequence allocated");
        Ok(value)
    }

    async fn list_clients(&self, filter: Option<&str>) -> Result<Vec<ClientRecord>, StoreError> {
        self.round_trip().await?;

        let needle = filter.map(|f| f.trim().to_lowercase()).unwrap_or_default();
        let mut rows: Vec<ClientRecord> = self
            .rows
            .iter()
            .map(|r| r.value().clone())
            .filter(|r| needle.is_empty() || r.matches_query(&needle))
            .collect();
        rows.sort_by(|a, b| a.name.cmp(&b.name).then_with(|| a.code.cmp(&b.code)));
        Ok(rows)
    }

    async fn upsert_client(&self, record: &ClientRecord, mode: WriteMode) -> Result<bool, StoreError> {
        self.round_trip().await?;
        if self.read_only.load(Ordering::SeqCst) {
            return Err(StoreError::Backend {
                message: "in-memory store is read-only".into(),
            });
        }

        match (self.rows.entry(record.code.clone()), mode) {
            (Entry::Occupied(_), WriteMode::Insert) => Err(StoreError::Duplicate {
                code: record.code.clone(),
            }),
            (Entry::Occupied(mut row), WriteMode::Upsert) => {
                if row.get() == record {
                    return Ok(false);
                }
                row.insert(record.clone());
                Ok(true)
            }
            (Entry::Vacant(slot), _) => {
                slot.insert(record.clone());
                Ok(true)
            }
        }
    }

    async fn delete_client(&self, code: &str) -> Result<bool, StoreError> {
        self.round_trip().await?;

        if self.dependents.get(code).is_some_and(|n| *n > 0) {
            return Err(StoreError::Dependents {
                code: code.to_owned(),
                message: DEPENDENTS_MESSAGE.into(),
            });
        }
        Ok(self.rows.remove(code).is_some())
    }

    async fn list_salespeople(&self) -> Result<Vec<String>, StoreError> {
        self.round_trip().await?;
        let mut names: Vec<String> = self.salespeople.iter().map(|n| n.key().clone()).collect();
        names.sort();
        Ok(names)
    }

    async fn mark_folders_provisioned(&self, code: &str) -> Result<bool, StoreError> {
        self.round_trip().await?;
        Ok(self
            .rows
            .get_mut(code)
            .map(|mut row| row.folders_provisioned = true)
            .is_some())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn record(code: &str, name: &str) -> ClientRecord {
        ClientRecord {
            code: code.into(),
            name: name.into(),
            ..ClientRecord::default()
        }
    }

    #[tokio::test]
    async fn peek_does_not_consume() {
        let store = MemoryStore::new();
        assert_eq!(store.peek_next_sequence().await.unwrap(), 1);
        assert_eq!(store.peek_next_sequence().await.unwrap(), 1);
        assert_eq!(store.allocate_sequence().await.unwrap(), 1);
        assert_eq!(store.peek_next_sequence().await.unwrap(), 2);
    }

    #[tokio::test]
    async fn insert_collides_on_existing_code() {
        let store = MemoryStore::new();
        store.seed([record("CL000001", "Ana")]);

        let err = store
            .upsert_client(&record("CL000001", "Rui"), WriteMode::Insert)
            .await
            .unwrap_err();
        assert_eq!(
            err,
            StoreError::Duplicate {
                code: "CL000001".into()
            }
        );
        assert_eq!(store.get("CL000001").unwrap().name, "Ana");
    }

    #[tokio::test]
    async fn upsert_reports_unchanged_rows() {
        let store = MemoryStore::new();
        let ana = record("CL000001", "Ana");
        assert!(store.upsert_client(&ana, WriteMode::Upsert).await.unwrap());
        assert!(!store.upsert_client(&ana, WriteMode::Upsert).await.unwrap());
        assert!(
            store
                .upsert_client(&record("CL000001", "Ana Maria"), WriteMode::Upsert)
                .await
                .unwrap()
        );
    }

    #[tokio::test]
    async fn list_is_ordered_by_name_and_filtered() {
        let store = MemoryStore::new();
        store.seed([
            record("CL2", "Maria"),
            record("CL1", "João Silva"),
            record("CL3", "Bruno"),
        ]);

        let all = store.list_clients(None).await.unwrap();
        let names: Vec<_> = all.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, ["Bruno", "João Silva", "Maria"]);

        let filtered = store.list_clients(Some(" JOÃO ")).await.unwrap();
        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[0].code, "CL1");
    }

    #[tokio::test]
    async fn delete_refused_with_dependents() {
        let store = MemoryStore::new();
        store.seed([record("CL1", "Ana")]);
        store.add_dependent("CL1");

        let err = store.delete_client("CL1").await.unwrap_err();
        assert!(matches!(err, StoreError::Dependents { .. }));
        assert_eq!(store.len(), 1);
        assert!(!store.delete_client("CL9").await.unwrap());
    }

    #[tokio::test]
    async fn offline_store_fails_every_call() {
        let store = MemoryStore::new();
        store.set_offline(true);
        assert!(matches!(
            store.allocate_sequence().await,
            Err(StoreError::Unavailable { .. })
        ));
        store.set_offline(false);
        assert_eq!(store.allocate_sequence().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn read_only_store_still_allocates() {
        let store = MemoryStore::new();
        store.set_read_only(true);

        assert_eq!(store.allocate_sequence().await.unwrap(), 1);
        let err = store
            .upsert_client(&record("CL000001", "Ana"), WriteMode::Insert)
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Backend { .. }));
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn salespeople_are_sorted() {
        let store = MemoryStore::new().with_salespeople(["RUI", "ANA"]);
        assert_eq!(store.list_salespeople().await.unwrap(), ["ANA", "RUI"]);
    }

    #[tokio::test]
    async fn folders_flag_is_persisted() {
        let store = MemoryStore::new();
        store.seed([record("CL1", "Ana")]);
        assert!(store.mark_folders_provisioned("CL1").await.unwrap());
        assert!(store.get("CL1").unwrap().folders_provisioned);
        assert!(!store.mark_folders_provisioned("CL2").await.unwrap());
    }
}
