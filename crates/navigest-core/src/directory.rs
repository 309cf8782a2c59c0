// ── Client directory ──
//
// Async orchestrator over the engine: loads clients from the store into the
// reconciler, hands out drafts with a previewed code, commits codes on save,
// deletes, and runs debounced searches. Reconciler state sits behind one
// async mutex so operations apply in call order; loads and searches carry a
// cancellation token that is checked under that mutex, so a superseded
// request can never overwrite a newer one.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::{Mutex, watch};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::config::DirectoryConfig;
use crate::debounce::Debouncer;
use crate::error::CoreError;
use crate::model::{ClientDraft, ClientEntry};
use crate::notify::{ChangeEvent, ListenerId, Notifier};
use crate::phone::DialCodeCatalog;
use crate::reconcile::{self, Reconciler};
use crate::sequence::SequenceAllocator;
use crate::store::{ClientStore, StoreError, WriteMode};
use crate::stream::ProjectionStream;

// ── Outcomes ────────────────────────────────────────────────────────

/// Result of a `load` call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum LoadOutcome {
    /// The cache was replaced with `count` clients.
    Loaded { count: usize },
    /// Already loaded; nothing fetched.
    Cached,
    /// A newer load started first. State was left untouched.
    Superseded,
}

/// A previewed code that was replaced by a different committed one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CodeAdjustment {
    pub previous: String,
    pub committed: String,
}

/// Result of a successful `save`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SaveOutcome {
    /// Committed code of the saved client.
    pub code: String,
    /// Whether the store reported an affected row. `false` means the
    /// stored row already matched and the cache was left alone.
    pub changed: bool,
    /// Whether the client was not cached before.
    pub created: bool,
    pub adjustment: Option<CodeAdjustment>,
}

// ── ClientDirectory ─────────────────────────────────────────────────

/// Client list engine bound to one store.
///
/// Cheaply cloneable via `Arc<DirectoryInner>`; clones share state.
pub struct ClientDirectory<S: ClientStore> {
    inner: Arc<DirectoryInner<S>>,
}

impl<S: ClientStore> Clone for ClientDirectory<S> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

struct DirectoryInner<S: ClientStore> {
    store: Arc<S>,
    allocator: SequenceAllocator<S>,
    catalog: Arc<DialCodeCatalog>,
    config: DirectoryConfig,
    notifier: Arc<Notifier>,
    state: Mutex<Reconciler>,
    projection: watch::Receiver<Arc<Vec<ClientEntry>>>,
    load_token: Mutex<CancellationToken>,
    search: Debouncer,
    last_load: watch::Sender<Option<DateTime<Utc>>>,
}

impl<S: ClientStore> ClientDirectory<S> {
    /// Directory with a freshly seeded dial code catalog.
    pub fn new(store: Arc<S>, config: DirectoryConfig) -> Self {
        let catalog = Arc::new(DialCodeCatalog::seeded(&config.default_country));
        Self::with_catalog(store, config, catalog)
    }

    /// Directory sharing an existing catalog.
    pub fn with_catalog(
        store: Arc<S>,
        config: DirectoryConfig,
        catalog: Arc<DialCodeCatalog>,
    ) -> Self {
        let notifier = Arc::new(Notifier::new());
        let reconciler = Reconciler::new(Arc::clone(&notifier), config.phone_body_max);
        let projection = reconciler.subscribe_projection();
        let (last_load, _) = watch::channel(None);

        Self {
            inner: Arc::new(DirectoryInner {
                allocator: SequenceAllocator::new(Arc::clone(&store), config.code_format.clone()),
                store,
                catalog,
                search: Debouncer::new(config.search_debounce),
                config,
                notifier,
                state: Mutex::new(reconciler),
                projection,
                load_token: Mutex::new(CancellationToken::new()),
                last_load,
            }),
        }
    }

    // ── Loading ──────────────────────────────────────────────────────

    /// Fetch every client and replace the cache.
    ///
    /// Starting a load supersedes any load still in flight. The current
    /// filter is re-applied and, when nothing is selected, the first
    /// projected client becomes the selection.
    pub async fn load(&self) -> Result<LoadOutcome, CoreError> {
        let token = {
            let mut pending = self.inner.load_token.lock().await;
            pending.cancel();
            *pending = CancellationToken::new();
            pending.clone()
        };

        let fetched = tokio::select! {
            biased;
            () = token.cancelled() => {
                warn!("client load superseded while fetching");
                return Ok(LoadOutcome::Superseded);
            }
            result = self.inner.store.list_clients(None) => result,
        };

        let mut state = self.inner.state.lock().await;
        if token.is_cancelled() {
            warn!("client load superseded before apply");
            return Ok(LoadOutcome::Superseded);
        }
        let records = fetched?;
        let count = records.len();

        state.replace_all(records);
        state.ensure_selection();
        drop(state);

        self.inner.last_load.send_replace(Some(Utc::now()));
        info!(count, "clients loaded");
        Ok(LoadOutcome::Loaded { count })
    }

    /// Load unless a load already completed.
    pub async fn ensure_loaded(&self) -> Result<LoadOutcome, CoreError> {
        if self.last_load().is_some() {
            return Ok(LoadOutcome::Cached);
        }
        self.load().await
    }

    pub fn last_load(&self) -> Option<DateTime<Utc>> {
        *self.inner.last_load.borrow()
    }

    // ── Drafts ───────────────────────────────────────────────────────

    /// Empty draft for a new client, showing a previewed code.
    ///
    /// The selection is cleared. When the preview cannot be read the draft
    /// starts without a code; one is allocated on save.
    pub async fn new_draft(&self) -> ClientDraft {
        self.clear_selection().await;

        let preview = match self.inner.allocator.peek_next().await {
            Ok(code) => Some(code),
            Err(e) => {
                warn!(error = %e, "code preview unavailable");
                None
            }
        };
        ClientDraft::new_template(preview, &self.inner.catalog)
    }

    /// Select a cached client and open it for editing.
    pub async fn edit(&self, code: &str) -> Option<ClientDraft> {
        let entry = self.inner.state.lock().await.select(code)?;
        Some(ClientDraft::from_record(&entry.load(), &self.inner.catalog))
    }

    // ── Saving ───────────────────────────────────────────────────────

    /// Validate and persist a draft.
    ///
    /// Drafts whose code is only a preview (or missing) get a freshly
    /// allocated code and are inserted; a collision on that insert is
    /// retried once with another code. Committed drafts are upserted.
    /// The draft's code is committed only once the store accepted the
    /// write: on any failure it keeps its previous code and status.
    pub async fn save(&self, draft: &mut ClientDraft) -> Result<SaveOutcome, CoreError> {
        let mut candidate = draft.record().clone();
        reconcile::validate(&mut candidate, self.inner.config.phone_body_max)?;
        candidate.normalize();
        draft.adopt(candidate.clone());

        let mode = if draft.status().needs_allocation() {
            candidate.code = self.inner.allocator.allocate().await?;
            WriteMode::Insert
        } else {
            WriteMode::Upsert
        };

        let mut collided = None;
        let changed = match self.inner.store.upsert_client(&candidate, mode).await {
            Ok(changed) => changed,
            Err(StoreError::Duplicate { code }) if mode == WriteMode::Insert => {
                warn!(code = %code, "client code already taken, re-allocating");
                candidate.code = self.inner.allocator.allocate().await?;
                collided = Some(code);

                match self.inner.store.upsert_client(&candidate, WriteMode::Insert).await {
                    Ok(changed) => changed,
                    Err(StoreError::Duplicate { code }) => {
                        warn!(code = %code, "client code collided twice");
                        return Err(CoreError::PersistenceConflict { code });
                    }
                    Err(e) => return Err(e.into()),
                }
            }
            Err(e) => return Err(e.into()),
        };

        let adjustment = if mode == WriteMode::Insert {
            let shown = draft.code().trim();
            let previous = if shown.is_empty() { collided } else { Some(shown.to_owned()) };
            previous
                .filter(|previous| *previous != candidate.code)
                .map(|previous| CodeAdjustment {
                    previous,
                    committed: candidate.code.clone(),
                })
        } else {
            None
        };
        draft.commit_code(candidate.code.clone());

        let created = {
            let mut state = self.inner.state.lock().await;
            let created = changed && state.find(&candidate.code).is_none();
            if changed {
                state.upsert(&candidate);
            }
            created
        };

        if let Some(adj) = &adjustment {
            info!(previous = %adj.previous, committed = %adj.committed, "client code adjusted");
            self.inner.notifier.emit(&ChangeEvent::CodeAdjusted {
                previous: adj.previous.clone(),
                committed: adj.committed.clone(),
            });
        }

        if changed {
            info!(code = %candidate.code, created, "client saved");
        } else {
            debug!(code = %candidate.code, "client unchanged");
        }

        Ok(SaveOutcome {
            code: candidate.code,
            changed,
            created,
            adjustment,
        })
    }

    // ── Deleting ─────────────────────────────────────────────────────

    /// Delete a client. Returns `false` when the store had no such row.
    ///
    /// A refusal because other records reference the client is reported
    /// as `DependencyConflict` with the store's message, and leaves cache
    /// and projection untouched.
    pub async fn delete(&self, code: &str) -> Result<bool, CoreError> {
        match self.inner.store.delete_client(code).await {
            Ok(true) => {
                self.inner.state.lock().await.remove(code);
                info!(code, "client deleted");
                Ok(true)
            }
            Ok(false) => {
                debug!(code, "no client row deleted");
                Ok(false)
            }
            Err(StoreError::Dependents { code, message }) => {
                warn!(code = %code, "client deletion refused: dependents");
                Err(CoreError::DependencyConflict { code, message })
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Mark a client's folders as created, in the store and the cache.
    pub async fn mark_folders_provisioned(&self, code: &str) -> Result<bool, CoreError> {
        let marked = self.inner.store.mark_folders_provisioned(code).await?;
        if marked {
            self.inner
                .state
                .lock()
                .await
                .set_folders_provisioned(code, true);
        }
        Ok(marked)
    }

    // ── Searching ────────────────────────────────────────────────────

    /// Debounced filter: applied after the quiet period unless another
    /// search arrives first. The handle resolves to whether it ran.
    pub async fn search(&self, query: &str) -> JoinHandle<bool> {
        let inner = Arc::clone(&self.inner);
        let query = query.to_owned();

        self.inner
            .search
            .schedule(move |token| async move {
                let mut state = inner.state.lock().await;
                if token.is_cancelled() {
                    debug!(query = %query, "search superseded before apply");
                    return;
                }
                state.apply_filter(&query);
            })
            .await
    }

    /// Apply a filter immediately, superseding any pending search.
    pub async fn search_now(&self, query: &str) {
        self.inner.search.supersede().await;
        self.inner.state.lock().await.apply_filter(query);
    }

    pub async fn query(&self) -> String {
        self.inner.state.lock().await.query().to_owned()
    }

    // ── Selection ────────────────────────────────────────────────────

    pub async fn select(&self, code: &str) -> Option<ClientEntry> {
        self.inner.state.lock().await.select(code)
    }

    pub async fn clear_selection(&self) {
        self.inner.state.lock().await.clear_selection();
    }

    pub async fn selection(&self) -> Option<ClientEntry> {
        self.inner.state.lock().await.selected().cloned()
    }

    // ── Views & subscriptions ────────────────────────────────────────

    /// Current projection snapshot (no lock taken).
    pub fn projection(&self) -> Arc<Vec<ClientEntry>> {
        self.inner.projection.borrow().clone()
    }

    pub fn projection_stream(&self) -> ProjectionStream {
        ProjectionStream::new(self.inner.projection.clone())
    }

    /// Every cached client, regardless of the filter.
    pub async fn cached(&self) -> Vec<ClientEntry> {
        self.inner.state.lock().await.cache().to_vec()
    }

    /// Register a change listener. It runs synchronously after each
    /// mutation and must not block.
    pub fn subscribe<F>(&self, listener: F) -> ListenerId
    where
        F: Fn(&ChangeEvent) + Send + Sync + 'static,
    {
        self.inner.notifier.subscribe(listener)
    }

    pub fn unsubscribe(&self, id: ListenerId) -> bool {
        self.inner.notifier.unsubscribe(id)
    }

    pub async fn salespeople(&self) -> Result<Vec<String>, CoreError> {
        Ok(self.inner.store.list_salespeople().await?)
    }

    pub fn catalog(&self) -> &Arc<DialCodeCatalog> {
        &self.inner.catalog
    }

    pub fn config(&self) -> &DirectoryConfig {
        &self.inner.config
    }

    pub fn store(&self) -> &Arc<S> {
        &self.inner.store
    }
}
