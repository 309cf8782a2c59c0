// ── Persistence collaborator ──
//
// The engine never talks to a database directly. Everything durable goes
// through `ClientStore`: the sequence counter, client rows and the
// dependent-record check performed on delete.

mod memory;

use std::future::Future;

use strum::Display;
use thiserror::Error;

use crate::model::ClientRecord;

pub use memory::MemoryStore;

/// Errors reported by a `ClientStore`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// The backend could not be reached.
    #[error("Store unavailable: {reason}")]
    Unavailable { reason: String },

    /// A unique-key collision on insert.
    #[error("Client code {code} already exists")]
    Duplicate { code: String },

    /// Deletion refused because other records reference the client.
    #[error("{message}")]
    Dependents { code: String, message: String },

    /// Any other backend failure.
    #[error("Store error: {message}")]
    Backend { message: String },
}

/// How `upsert_client` treats an existing row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[strum(serialize_all = "snake_case")]
pub enum WriteMode {
    /// The code was just allocated; an existing row is a collision.
    Insert,
    /// Update the row for this code, inserting when absent.
    Upsert,
}

/// Durable storage for clients and the client code sequence.
///
/// Implementations must make `allocate_sequence` atomic: concurrent callers
/// never receive the same value.
pub trait ClientStore: Send + Sync + 'static {
    /// The value `allocate_sequence` would return next. Does not consume it.
    fn peek_next_sequence(&self) -> impl Future<Output = Result<u64, StoreError>> + Send;

    /// Consume and return the next sequence value.
    fn allocate_sequence(&self) -> impl Future<Output = Result<u64, StoreError>> + Send;

    /// Clients ordered by name, optionally narrowed by a case-insensitive
    /// substring of name, code or email.
    fn list_clients(
        &self,
        filter: Option<&str>,
    ) -> impl Future<Output = Result<Vec<ClientRecord>, StoreError>> + Send;

    /// Write a client row. Returns `false` when no row was affected.
    fn upsert_client(
        &self,
        record: &ClientRecord,
        mode: WriteMode,
    ) -> impl Future<Output = Result<bool, StoreError>> + Send;

    /// Remove a client row. Returns `false` when no row matched.
    fn delete_client(&self, code: &str) -> impl Future<Output = Result<bool, StoreError>> + Send;

    /// Names the salesperson field may take, in display order.
    fn list_salespeople(&self) -> impl Future<Output = Result<Vec<String>, StoreError>> + Send;

    /// Record that the client's folders exist. Returns `false` when no row
    /// matched.
    fn mark_folders_provisioned(
        &self,
        code: &str,
    ) -> impl Future<Output = Result<bool, StoreError>> + Send;
}
