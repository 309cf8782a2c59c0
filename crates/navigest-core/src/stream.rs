// ── Projection subscriptions ──
//
// Async alternative to the listener list: a watch-backed view of the
// projection that can be awaited or turned into a `Stream`.

use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use futures_core::Stream;
use tokio::sync::watch;
use tokio_stream::wrappers::WatchStream;

use crate::model::ClientEntry;

type Snapshot = Arc<Vec<ClientEntry>>;

/// A subscription to the directory's projection.
///
/// Holds the snapshot seen at creation and yields a new one each time the
/// projection is republished.
pub struct ProjectionStream {
    current: Snapshot,
    receiver: watch::Receiver<Snapshot>,
}

impl ProjectionStream {
    pub(crate) fn new(receiver: watch::Receiver<Snapshot>) -> Self {
        let current = receiver.borrow().clone();
        Self { current, receiver }
    }

    /// Snapshot captured at creation (or at the last `changed`).
    pub fn current(&self) -> &Snapshot {
        &self.current
    }

    /// Latest snapshot, which may be newer than `current`.
    pub fn latest(&self) -> Snapshot {
        self.receiver.borrow().clone()
    }

    /// Wait for the next republish. `None` once the directory is gone.
    pub async fn changed(&mut self) -> Option<Snapshot> {
        self.receiver.changed().await.ok()?;
        let snap = self.receiver.borrow_and_update().clone();
        self.current = Arc::clone(&snap);
        Some(snap)
    }

    /// Convert into a `Stream`. The first item is the latest snapshot.
    pub fn into_stream(self) -> ProjectionWatchStream {
        ProjectionWatchStream {
            inner: WatchStream::new(self.receiver),
        }
    }
}

/// `Stream` adapter over the projection's `watch::Receiver`.
pub struct ProjectionWatchStream {
    inner: WatchStream<Snapshot>,
}

impl Stream for ProjectionWatchStream {
    type Item = Snapshot;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        Pin::new(&mut self.inner).poll_next(cx)
    }
}
