// ── Client code allocation ──
//
// Codes come from the store's counter only. `peek_next` shows what would be
// issued without consuming it; `allocate` consumes. Any store failure is an
// `AllocationUnavailable`: codes are never made up locally.

use std::sync::Arc;

use tracing::{debug, warn};

use crate::config::CodeFormat;
use crate::error::CoreError;
use crate::store::ClientStore;

pub struct SequenceAllocator<S> {
    store: Arc<S>,
    format: CodeFormat,
}

impl<S: ClientStore> SequenceAllocator<S> {
    pub fn new(store: Arc<S>, format: CodeFormat) -> Self {
        Self { store, format }
    }

    /// The code the next `allocate` would return. Stable until someone
    /// allocates.
    pub async fn peek_next(&self) -> Result<String, CoreError> {
        let next = self.store.peek_next_sequence().await.map_err(|e| {
            warn!(error = %e, "sequence peek failed");
            CoreError::allocation(&e)
        })?;
        Ok(self.format.render(next))
    }

    /// Consume the next code.
    pub async fn allocate(&self) -> Result<String, CoreError> {
        let value = self.store.allocate_sequence().await.map_err(|e| {
            warn!(error = %e, "sequence allocation failed");
            CoreError::allocation(&e)
        })?;
        let code = self.format.render(value);
        debug!(code = %code, "client code allocated");
        Ok(code)
    }

    pub fn format(&self) -> &CodeFormat {
        &self.format
    }
}

impl<S> Clone for SequenceAllocator<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            format: self.format.clone(),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    fn allocator() -> (Arc<MemoryStore>, SequenceAllocator<MemoryStore>) {
        let store = Arc::new(MemoryStore::new());
        let allocator = SequenceAllocator::new(Arc::clone(&store), CodeFormat::default());
        (store, allocator)
    }

    #[tokio::test]
    async fn repeated_peeks_agree() {
        let (_, allocator) = allocator();
        let first = allocator.peek_next().await.unwrap();
        for _ in 0..5 {
            assert_eq!(allocator.peek_next().await.unwrap(), first);
        }
        assert_eq!(first, "CL000001");
    }

    #[tokio::test]
    async fn peek_after_allocate_moves_on() {
        let (_, allocator) = allocator();
        let allocated = allocator.allocate().await.unwrap();
        let peeked = allocator.peek_next().await.unwrap();
        assert_eq!(allocated, "CL000001");
        assert_ne!(peeked, allocated);
    }

    #[tokio::test]
    async fn offline_store_is_allocation_unavailable() {
        let (store, allocator) = allocator();
        store.set_offline(true);

        assert!(matches!(
            allocator.peek_next().await,
            Err(CoreError::AllocationUnavailable { .. })
        ));
        assert!(matches!(
            allocator.allocate().await,
            Err(CoreError::AllocationUnavailable { .. })
        ));
    }

    #[tokio::test]
    async fn wide_counter_is_not_refused() {
        let store = Arc::new(MemoryStore::new().with_next_sequence(1_000_000));
        let allocator = SequenceAllocator::new(store, CodeFormat::default());
        assert_eq!(allocator.allocate().await.unwrap(), "CL1000000");
    }
}
