#![allow(clippy::unwrap_used)]
// Integration tests for `SequenceAllocator` under concurrency.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use navigest_core::{CodeFormat, CoreError, MemoryStore, SequenceAllocator};

// ── Helpers ─────────────────────────────────────────────────────────

fn allocator(store: MemoryStore) -> SequenceAllocator<MemoryStore> {
    SequenceAllocator::new(Arc::new(store), CodeFormat::default())
}

// ── Tests ───────────────────────────────────────────────────────────

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_allocations_are_distinct() {
    let allocator = allocator(MemoryStore::new().with_latency(Duration::from_millis(1)));

    let mut tasks = Vec::new();
    for _ in 0..32 {
        let allocator = allocator.clone();
        tasks.push(tokio::spawn(async move { allocator.allocate().await }));
    }

    let mut codes = HashSet::new();
    for task in tasks {
        assert!(codes.insert(task.await.unwrap().unwrap()));
    }

    assert_eq!(codes.len(), 32);
    assert!(codes.contains("CL000001"));
    assert!(codes.contains("CL000032"));
    assert_eq!(allocator.peek_next().await.unwrap(), "CL000033");
}

#[tokio::test]
async fn test_peek_is_stable_until_allocation() {
    let allocator = allocator(MemoryStore::new().with_next_sequence(41));

    assert_eq!(allocator.peek_next().await.unwrap(), "CL000041");
    assert_eq!(allocator.peek_next().await.unwrap(), "CL000041");
    assert_eq!(allocator.allocate().await.unwrap(), "CL000041");
    assert_eq!(allocator.peek_next().await.unwrap(), "CL000042");
}

#[tokio::test]
async fn test_offline_store_is_allocation_unavailable() {
    let store = MemoryStore::new();
    store.set_offline(true);
    let allocator = allocator(store);

    let peek = allocator.peek_next().await;
    assert!(
        matches!(peek, Err(CoreError::AllocationUnavailable { .. })),
        "expected allocation unavailable, got: {peek:?}"
    );
    assert!(matches!(
        allocator.allocate().await,
        Err(CoreError::AllocationUnavailable { .. })
    ));
}

#[tokio::test]
async fn test_custom_format_is_applied() {
    let format = CodeFormat {
        prefix: "CLI".into(),
        min_width: 3,
    };
    let allocator = SequenceAllocator::new(Arc::new(MemoryStore::new()), format);

    assert_eq!(allocator.allocate().await.unwrap(), "CLI001");
}
