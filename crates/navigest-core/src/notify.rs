// ── Change notification ──
//
// Plain listener list. Callbacks run synchronously, in registration order,
// right after the mutation that caused them. Payloads carry snapshots so a
// listener never needs to read back from the directory.

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use arc_swap::ArcSwap;
use strum::Display;

use crate::model::ClientEntry;

/// Canonicalized record fields a UI may want to re-render.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
#[strum(serialize_all = "snake_case")]
pub enum CanonicalField {
    Code,
    PhoneBody,
    DialPrefix,
    CreditValue,
}

#[derive(Debug, Clone)]
pub enum ChangeEvent {
    /// The ordered, filtered view changed.
    ProjectionChanged { projection: Arc<Vec<ClientEntry>> },
    /// The selection moved (or was cleared).
    SelectionChanged { selected: Option<ClientEntry> },
    /// Canonical fields of a stored client changed.
    FieldsChanged {
        code: String,
        fields: Vec<CanonicalField>,
    },
    /// A previewed code was replaced by a different committed one.
    CodeAdjusted { previous: String, committed: String },
}

/// Handle returned by `subscribe`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ListenerId(u64);

type Listener = dyn Fn(&ChangeEvent) + Send + Sync;

#[derive(Default)]
pub struct Notifier {
    next_id: AtomicU64,
    listeners: ArcSwap<Vec<(ListenerId, Arc<Listener>)>>,
}

impl Notifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe<F>(&self, listener: F) -> ListenerId
    where
        F: Fn(&ChangeEvent) + Send + Sync + 'static,
    {
        let id = ListenerId(self.next_id.fetch_add(1, Ordering::Relaxed));
        let listener: Arc<Listener> = Arc::new(listener);
        self.listeners.rcu(|current| {
            let mut next = Vec::clone(current);
            next.push((id, Arc::clone(&listener)));
            next
        });
        id
    }

    /// Returns `false` when `id` was not registered.
    pub fn unsubscribe(&self, id: ListenerId) -> bool {
        let mut removed = false;
        self.listeners.rcu(|current| {
            let next: Vec<_> = current.iter().filter(|(lid, _)| *lid != id).cloned().collect();
            removed = next.len() != current.len();
            next
        });
        removed
    }

    pub fn emit(&self, event: &ChangeEvent) {
        let listeners = self.listeners.load();
        for (_, listener) in listeners.iter() {
            listener(event);
        }
    }

    pub fn len(&self) -> usize {
        self.listeners.load().len()
    }

    pub fn is_empty(&self) -> bool {
        self.listeners.load().is_empty()
    }
}

impl fmt::Debug for Notifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Notifier")
            .field("listeners", &self.len())
            .finish_non_exhaustive()
    }
}
