use std::sync::Arc;
use std::sync::atomic::Ordering;

use super::*;
use crate::state::test_helpers::{FlakyStore, ids, numbers, seed_project};

/// Seed `[1, 2, 3]`, delete the middle row without renumbering.
async fn project_with_gap(store: &FlakyStore) -> (Uuid, Vec<Uuid>) {
    let (project_id, pages) = seed_project(store, 3).await;
    assert!(store.delete_page(pages[1].id).await.unwrap());
    (project_id, vec![pages[0].id, pages[2].id])
}

// =============================================================================
// STRATEGY SELECTION
// =============================================================================

#[tokio::test]
async fn primary_success_skips_fallback() {
    let store = FlakyStore::new();
    let (project_id, survivors) = project_with_gap(&store).await;

    let used = RenumberStrategy::new(true)
        .execute(&store, project_id, RenumberOp::AfterDeletion { deleted_number: 2 })
        .await
        .unwrap();

    assert_eq!(used, "transactional");
    assert_eq!(store.rpc_calls.load(Ordering::SeqCst), 1);
    assert_eq!(store.row_writes.load(Ordering::SeqCst), 0);
    assert_eq!(numbers(&store, project_id).await, vec![1, 2]);
    assert_eq!(ids(&store, project_id).await, survivors);
}

#[tokio::test]
async fn rpc_failure_falls_back_to_sequential() {
    let store = FlakyStore::new();
    store.fail_rpc.store(true, Ordering::SeqCst);
    let (project_id, survivors) = project_with_gap(&store).await;

    let used = RenumberStrategy::new(true)
        .execute(&store, project_id, RenumberOp::AfterDeletion { deleted_number: 2 })
        .await
        .unwrap();

    assert_eq!(used, "sequential");
    assert_eq!(numbers(&store, project_id).await, vec![1, 2]);
    assert_eq!(ids(&store, project_id).await, survivors);
}

#[tokio::test]
async fn no_fallback_surfaces_primary_error() {
    let store = FlakyStore::new();
    store.fail_rpc.store(true, Ordering::SeqCst);
    let (project_id, _) = project_with_gap(&store).await;

    let result = RenumberStrategy::new(false)
        .execute(&store, project_id, RenumberOp::AfterDeletion { deleted_number: 2 })
        .await;

    assert!(matches!(result, Err(StoreError::Unavailable(_))));
    assert_eq!(numbers(&store, project_id).await, vec![1, 3]);
    assert_eq!(store.row_writes.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn fallback_failure_surfaces_error() {
    let store = FlakyStore::new();
    store.fail_rpc.store(true, Ordering::SeqCst);
    store.fail_row_writes.store(true, Ordering::SeqCst);
    let (project_id, _) = project_with_gap(&store).await;

    let err = RenumberStrategy::new(true)
        .execute(&store, project_id, RenumberOp::AfterDeletion { deleted_number: 2 })
        .await
        .unwrap_err();

    assert!(err.to_string().contains("row write"));
}

struct Counting(Arc<std::sync::atomic::AtomicUsize>);

#[async_trait::async_trait]
impl Renumberer for Counting {
    fn name(&self) -> &'static str {
        "counting"
    }

    async fn apply(&self, _store: &dyn PageStore, _project_id: Uuid, _op: RenumberOp<'_>) -> Result<(), StoreError> {
        self.0.fetch_add(1, Ordering::SeqCst);
        Err(StoreError::Unavailable("counting".into()))
    }
}

#[tokio::test]
async fn custom_strategies_run_in_order() {
    let store = FlakyStore::new();
    let (project_id, _) = project_with_gap(&store).await;
    let calls = Arc::new(std::sync::atomic::AtomicUsize::new(0));

    let strategy = RenumberStrategy::with(Box::new(Counting(calls.clone())), Some(Box::new(SequentialRenumberer)));
    let used = strategy
        .execute(&store, project_id, RenumberOp::AfterDeletion { deleted_number: 2 })
        .await
        .unwrap();

    assert_eq!(used, "sequential");
    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert_eq!(numbers(&store, project_id).await, vec![1, 2]);
}

// =============================================================================
// SEQUENTIAL
// =============================================================================

#[tokio::test]
async fn compact_rewrites_only_changed_rows() {
    let store = FlakyStore::new();
    let (project_id, pages) = seed_project(&store, 4).await;
    assert!(store.delete_page(pages[1].id).await.unwrap());

    let written = SequentialRenumberer.compact(&store, project_id).await.unwrap();

    assert_eq!(written, 2);
    assert_eq!(numbers(&store, project_id).await, vec![1, 2, 3]);
    assert_eq!(ids(&store, project_id).await, vec![pages[0].id, pages[2].id, pages[3].id]);
}

#[tokio::test]
async fn compact_on_consistent_project_is_noop() {
    let store = FlakyStore::new();
    let (project_id, _) = seed_project(&store, 3).await;

    assert_eq!(SequentialRenumberer.compact(&store, project_id).await.unwrap(), 0);
    assert_eq!(store.row_writes.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn sequential_reorder_writes_each_update() {
    let store = FlakyStore::new();
    let (project_id, pages) = seed_project(&store, 3).await;
    let updates = [
        PageOrder { page_id: pages[0].id, page_number: 3 },
        PageOrder { page_id: pages[1].id, page_number: 1 },
        PageOrder { page_id: pages[2].id, page_number: 2 },
    ];

    SequentialRenumberer.apply(&store, project_id, RenumberOp::Reorder(&updates)).await.unwrap();

    assert_eq!(store.row_writes.load(Ordering::SeqCst), 3);
    assert_eq!(ids(&store, project_id).await, vec![pages[1].id, pages[2].id, pages[0].id]);
}
