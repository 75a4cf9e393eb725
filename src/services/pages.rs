//! Page service — page CRUD plus the ordinal-preserving operations.
//!
//! DESIGN
//! ======
//! Within a project, `page_number` values are exactly `1..N` between calls.
//! Structural changes (create at a position, delete, reorder, renumber) are
//! validated against a fresh listing first and rejected before any write, then
//! applied through [`RenumberStrategy`], which prefers the store's atomic RPCs
//! and falls back to sequential row writes.
//!
//! Every mutating operation runs in a spawned task bounded by the configured
//! timeout. On timeout the caller gets [`PageError::Timeout`] but the task
//! keeps running to completion, so a renumbering pass is never abandoned
//! half-way by a disconnecting client.
//!
//! Concurrent structural changes to one project are last-committed-wins;
//! [`PageService::validate`] reports drift and [`PageService::repair`]
//! compacts the ordinals again.

use std::collections::HashSet;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::error::ErrorCode;

use super::page_store::{Page, PageChanges, PageOrder, PageStatus, PageStore, StoreError};
use super::renumber::{RenumberOp, RenumberStrategy, SequentialRenumberer};

// =============================================================================
// TYPES
// =============================================================================

#[derive(Debug, thiserror::Error)]
pub enum PageError {
    #[error("page not found: {0}")]
    NotFound(Uuid),
    #[error("page {0} is the last page of its project")]
    LastPage(Uuid),
    #[error("invalid page sequence: {0}")]
    InvalidSequence(String),
    #[error("{op} timed out")]
    Timeout { op: &'static str },
    #[error(transparent)]
    Persistence(#[from] StoreError),
}

impl ErrorCode for PageError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::NotFound(_) => "E_PAGE_NOT_FOUND",
            Self::LastPage(_) => "E_LAST_PAGE",
            Self::InvalidSequence(_) => "E_INVALID_SEQUENCE",
            Self::Timeout { .. } => "E_TIMEOUT",
            Self::Persistence(err) => err.error_code(),
        }
    }

    fn retryable(&self) -> bool {
        match self {
            Self::Timeout { .. } => true,
            Self::Persistence(err) => err.retryable(),
            _ => false,
        }
    }
}

/// Payload for a new page. `position` inserts at `1..=N+1`; absent appends.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NewPage {
    pub title: Option<String>,
    pub content: Option<serde_json::Value>,
    pub status: Option<PageStatus>,
    pub position: Option<i32>,
}

/// Result of checking a project's ordinals against `1..N`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationReport {
    pub project_id: Uuid,
    pub page_count: usize,
    pub is_valid: bool,
    /// Ordinals in `1..=N` held by no page.
    pub missing: Vec<i32>,
    /// Ordinals held by more than one page.
    pub duplicates: Vec<i32>,
    /// Ordinals outside `1..=N`.
    pub out_of_range: Vec<i32>,
}

// =============================================================================
// SERVICE
// =============================================================================

pub struct PageService {
    ops: PageOps,
    timeout: Duration,
}

/// Store and strategy handles moved into each spawned operation.
#[derive(Clone)]
struct PageOps {
    store: Arc<dyn PageStore>,
    strategy: Arc<RenumberStrategy>,
}

impl PageService {
    #[must_use]
    pub fn new(store: Arc<dyn PageStore>, strategy: RenumberStrategy, timeout: Duration) -> Self {
        Self { ops: PageOps { store, strategy: Arc::new(strategy) }, timeout }
    }

    /// Run `fut` on its own task and wait at most `self.timeout` for it.
    async fn bounded<T, F>(&self, op: &'static str, fut: F) -> Result<T, PageError>
    where
        T: Send + 'static,
        F: Future<Output = Result<T, PageError>> + Send + 'static,
    {
        let task = tokio::spawn(fut);
        match tokio::time::timeout(self.timeout, task).await {
            Ok(Ok(result)) => result,
            Ok(Err(join_err)) => Err(StoreError::Unavailable(format!("{op} task failed: {join_err}")).into()),
            Err(_) => {
                warn!(op, timeout_ms = self.timeout.as_millis(), "page operation timed out; task left running");
                Err(PageError::Timeout { op })
            }
        }
    }

    /// Pages of a project in reading order.
    ///
    /// # Errors
    ///
    /// Returns a persistence error if the store fails.
    pub async fn list_pages(&self, project_id: Uuid) -> Result<Vec<Page>, PageError> {
        Ok(self.ops.store.list_pages(project_id).await?)
    }

    /// # Errors
    ///
    /// Returns `NotFound` for unknown ids.
    pub async fn get_page(&self, page_id: Uuid) -> Result<Page, PageError> {
        self.ops.get(page_id).await
    }

    /// Create a page, appended or inserted at `new.position`.
    ///
    /// # Errors
    ///
    /// Returns `InvalidSequence` for a position outside `1..=N+1`.
    pub async fn create_page(&self, project_id: Uuid, new: NewPage) -> Result<Page, PageError> {
        let ops = self.ops.clone();
        self.bounded("create_page", async move { ops.create(project_id, new).await }).await
    }

    /// Edit title, content or status. Ordinals are untouched.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` for unknown ids.
    pub async fn update_page(&self, page_id: Uuid, changes: PageChanges) -> Result<Page, PageError> {
        let ops = self.ops.clone();
        self.bounded("update_page", async move {
            ops.store.update_page(page_id, &changes).await?.ok_or(PageError::NotFound(page_id))
        })
        .await
    }

    /// Delete a page and close the gap it leaves. Returns the remaining pages.
    ///
    /// # Errors
    ///
    /// Returns `NotFound`, `LastPage` when it is the project's only page, or a
    /// persistence error when both renumbering strategies fail.
    pub async fn delete_page(&self, page_id: Uuid) -> Result<Vec<Page>, PageError> {
        let ops = self.ops.clone();
        self.bounded("delete_page", async move { ops.delete(page_id).await }).await
    }

    /// Assign every page of the project a new ordinal.
    ///
    /// # Errors
    ///
    /// Returns `InvalidSequence` unless `orders` covers each page exactly once
    /// with the ordinals `1..=N`.
    pub async fn reorder_pages(&self, project_id: Uuid, orders: Vec<PageOrder>) -> Result<Vec<Page>, PageError> {
        let ops = self.ops.clone();
        self.bounded("reorder_pages", async move { ops.reorder(project_id, &orders).await }).await
    }

    /// Move one page to `new_number`, swapping with the page already there.
    ///
    /// # Errors
    ///
    /// Returns `NotFound`, or `InvalidSequence` for a number outside `1..=N`.
    pub async fn renumber_page(&self, page_id: Uuid, new_number: i32) -> Result<Vec<Page>, PageError> {
        let ops = self.ops.clone();
        self.bounded("renumber_page", async move { ops.renumber(page_id, new_number).await }).await
    }

    /// Read-only ordinal check.
    ///
    /// # Errors
    ///
    /// Returns a persistence error if the store fails.
    pub async fn validate(&self, project_id: Uuid) -> Result<ValidationReport, PageError> {
        let pages = self.ops.store.list_pages(project_id).await?;
        let numbers: Vec<i32> = pages.iter().map(|p| p.page_number).collect();
        Ok(validate_numbers(project_id, &numbers))
    }

    /// Reassign `1..N` in current order and report the result.
    ///
    /// # Errors
    ///
    /// Returns a persistence error if a write fails.
    pub async fn repair(&self, project_id: Uuid) -> Result<ValidationReport, PageError> {
        let ops = self.ops.clone();
        self.bounded("repair", async move {
            let rewritten = SequentialRenumberer.compact(&*ops.store, project_id).await?;
            info!(%project_id, rewritten, "project ordinals repaired");
            let pages = ops.store.list_pages(project_id).await?;
            let numbers: Vec<i32> = pages.iter().map(|p| p.page_number).collect();
            Ok::<_, PageError>(validate_numbers(project_id, &numbers))
        })
        .await
    }
}

impl PageOps {
    async fn get(&self, page_id: Uuid) -> Result<Page, PageError> {
        self.store.get_page(page_id).await?.ok_or(PageError::NotFound(page_id))
    }

    async fn create(&self, project_id: Uuid, new: NewPage) -> Result<Page, PageError> {
        let existing = self.store.list_pages(project_id).await?;
        let count = ordinal(existing.len());
        let appended = count + 1;
        let position = new.position.unwrap_or(appended);
        if !(1..=appended).contains(&position) {
            return Err(PageError::InvalidSequence(format!("position {position} outside 1..={appended}")));
        }

        let page = Page {
            id: Uuid::new_v4(),
            project_id,
            page_number: appended,
            title: new.title.unwrap_or_else(|| format!("Page {position}")),
            content: new.content.unwrap_or_else(|| serde_json::json!({})),
            status: new.status.unwrap_or_default(),
        };
        self.store.insert_page(&page).await?;

        if position < appended {
            let mut updates: Vec<PageOrder> = existing
                .iter()
                .filter(|p| p.page_number >= position)
                .map(|p| PageOrder { page_id: p.id, page_number: p.page_number + 1 })
                .collect();
            updates.push(PageOrder { page_id: page.id, page_number: position });
            if let Err(err) = self.strategy.execute(&*self.store, project_id, RenumberOp::Reorder(&updates)).await {
                match self.store.delete_page(page.id).await {
                    Ok(true) => warn!(%project_id, page_id = %page.id, error = %err, "insert renumber failed; page removed"),
                    Ok(false) => warn!(%project_id, page_id = %page.id, error = %err, "insert renumber failed; page already gone"),
                    Err(cleanup) => error!(
                        %project_id,
                        page_id = %page.id,
                        error = %err,
                        cleanup_error = %cleanup,
                        "insert renumber failed and the new page could not be removed"
                    ),
                }
                return Err(err.into());
            }
        }

        info!(%project_id, page_id = %page.id, position, "page created");
        self.get(page.id).await
    }

    async fn delete(&self, page_id: Uuid) -> Result<Vec<Page>, PageError> {
        let page = self.get(page_id).await?;
        let project_id = page.project_id;
        let siblings = self.store.list_pages(project_id).await?;
        if siblings.len() <= 1 {
            return Err(PageError::LastPage(page_id));
        }

        if !self.store.delete_page(page_id).await? {
            return Err(PageError::NotFound(page_id));
        }
        let strategy = self
            .strategy
            .execute(&*self.store, project_id, RenumberOp::AfterDeletion { deleted_number: page.page_number })
            .await?;

        info!(%project_id, %page_id, deleted_number = page.page_number, strategy, "page deleted");
        Ok(self.store.list_pages(project_id).await?)
    }

    async fn reorder(&self, project_id: Uuid, orders: &[PageOrder]) -> Result<Vec<Page>, PageError> {
        validate_sequence(orders)?;
        let pages = self.store.list_pages(project_id).await?;
        if orders.len() != pages.len() {
            return Err(PageError::InvalidSequence(format!(
                "payload has {} pages, project has {}",
                orders.len(),
                pages.len()
            )));
        }
        let members: HashSet<Uuid> = pages.iter().map(|p| p.id).collect();
        if let Some(stray) = orders.iter().find(|o| !members.contains(&o.page_id)) {
            return Err(PageError::InvalidSequence(format!(
                "page {} is not part of project {project_id}",
                stray.page_id
            )));
        }

        let strategy = self.strategy.execute(&*self.store, project_id, RenumberOp::Reorder(orders)).await?;
        info!(%project_id, pages = orders.len(), strategy, "pages reordered");
        Ok(self.store.list_pages(project_id).await?)
    }

    async fn renumber(&self, page_id: Uuid, new_number: i32) -> Result<Vec<Page>, PageError> {
        let page = self.get(page_id).await?;
        let project_id = page.project_id;
        let pages = self.store.list_pages(project_id).await?;
        let count = ordinal(pages.len());
        if !(1..=count).contains(&new_number) {
            return Err(PageError::InvalidSequence(format!("page number {new_number} outside 1..={count}")));
        }
        if new_number == page.page_number {
            return Ok(pages);
        }

        let mut updates = vec![PageOrder { page_id, page_number: new_number }];
        if let Some(occupant) = pages.iter().find(|p| p.page_number == new_number && p.id != page_id) {
            updates.push(PageOrder { page_id: occupant.id, page_number: page.page_number });
        }
        let strategy = self.strategy.execute(&*self.store, project_id, RenumberOp::Reorder(&updates)).await?;

        info!(%project_id, %page_id, from = page.page_number, to = new_number, strategy, "page renumbered");
        Ok(self.store.list_pages(project_id).await?)
    }
}

// =============================================================================
// VALIDATION
// =============================================================================

fn ordinal(len: usize) -> i32 {
    i32::try_from(len).unwrap_or(i32::MAX)
}

/// Reject payloads whose ordinals are not exactly `1..=M` or that name a page
/// twice.
///
/// # Errors
///
/// Returns `InvalidSequence` describing the first problem found.
pub fn validate_sequence(orders: &[PageOrder]) -> Result<(), PageError> {
    if orders.is_empty() {
        return Err(PageError::InvalidSequence("no pages given".into()));
    }
    let mut seen = HashSet::new();
    if let Some(dup) = orders.iter().find(|o| !seen.insert(o.page_id)) {
        return Err(PageError::InvalidSequence(format!("page {} listed more than once", dup.page_id)));
    }

    let mut sorted: Vec<i32> = orders.iter().map(|o| o.page_number).collect();
    sorted.sort_unstable();
    for (expected, actual) in (1..).zip(&sorted) {
        if *actual != expected {
            return Err(PageError::InvalidSequence(format!(
                "expected page numbers 1..={}, got {sorted:?}",
                sorted.len()
            )));
        }
    }
    Ok(())
}

/// Compare `numbers` against `1..=numbers.len()`.
#[must_use]
pub fn validate_numbers(project_id: Uuid, numbers: &[i32]) -> ValidationReport {
    let count = ordinal(numbers.len());
    let mut sorted = numbers.to_vec();
    sorted.sort_unstable();

    let mut duplicates: Vec<i32> = sorted.windows(2).filter(|w| w[0] == w[1]).map(|w| w[0]).collect();
    duplicates.dedup();
    let mut out_of_range: Vec<i32> = sorted.iter().copied().filter(|n| !(1..=count).contains(n)).collect();
    out_of_range.dedup();
    let missing: Vec<i32> = (1..=count).filter(|n| sorted.binary_search(n).is_err()).collect();

    ValidationReport {
        project_id,
        page_count: numbers.len(),
        is_valid: missing.is_empty() && duplicates.is_empty() && out_of_range.is_empty(),
        missing,
        duplicates,
        out_of_range,
    }
}

#[cfg(test)]
#[path = "pages_test.rs"]
mod tests;
