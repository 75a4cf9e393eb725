//! Renumbering strategies — how ordinal changes reach the store.
//!
//! DESIGN
//! ======
//! Two [`Renumberer`]s implement the same operations:
//!
//! - [`TransactionalRenumberer`] calls the store's atomic RPCs. Either the
//!   whole change commits or nothing does.
//! - [`SequentialRenumberer`] composes single-row writes. After a deletion it
//!   re-sorts every remaining page and reassigns `1..N`; for a reorder it
//!   writes each requested ordinal in turn.
//!
//! [`RenumberStrategy`] runs the primary and, if it fails and a fallback is
//! configured, the fallback. Only the fallback's error reaches the caller.

use tracing::{error, warn};
use uuid::Uuid;

use super::page_store::{PageOrder, PageStore, StoreError};

/// An ordinal change to apply to one project.
#[derive(Debug, Clone, Copy)]
pub enum RenumberOp<'a> {
    /// A page holding `deleted_number` was removed.
    AfterDeletion { deleted_number: i32 },
    /// Assign these ordinals.
    Reorder(&'a [PageOrder]),
}

impl RenumberOp<'_> {
    fn label(&self) -> &'static str {
        match self {
            Self::AfterDeletion { .. } => "after_deletion",
            Self::Reorder(_) => "reorder",
        }
    }
}

#[async_trait::async_trait]
pub trait Renumberer: Send + Sync {
    fn name(&self) -> &'static str;

    async fn apply(&self, store: &dyn PageStore, project_id: Uuid, op: RenumberOp<'_>) -> Result<(), StoreError>;
}

pub struct TransactionalRenumberer;

#[async_trait::async_trait]
impl Renumberer for TransactionalRenumberer {
    fn name(&self) -> &'static str {
        "transactional"
    }

    async fn apply(&self, store: &dyn PageStore, project_id: Uuid, op: RenumberOp<'_>) -> Result<(), StoreError> {
        match op {
            RenumberOp::AfterDeletion { deleted_number } => {
                store.renumber_pages_after_deletion(project_id, deleted_number).await
            }
            RenumberOp::Reorder(updates) => store.reorder_pages_transaction(project_id, updates).await,
        }
    }
}

pub struct SequentialRenumberer;

impl SequentialRenumberer {
    /// Reassign `1..N` to a project's pages in their current order.
    /// Returns how many rows were rewritten.
    ///
    /// # Errors
    ///
    /// Returns the first store error; earlier writes stay applied.
    pub async fn compact(&self, store: &dyn PageStore, project_id: Uuid) -> Result<usize, StoreError> {
        let pages = store.list_pages(project_id).await?;
        let mut written = 0;
        for (expected, page) in (1..).zip(pages.iter()) {
            if page.page_number != expected {
                store.set_page_number(page.id, expected).await?;
                written += 1;
            }
        }
        Ok(written)
    }
}

#[async_trait::async_trait]
impl Renumberer for SequentialRenumberer {
    fn name(&self) -> &'static str {
        "sequential"
    }

    async fn apply(&self, store: &dyn PageStore, project_id: Uuid, op: RenumberOp<'_>) -> Result<(), StoreError> {
        match op {
            RenumberOp::AfterDeletion { .. } => self.compact(store, project_id).await.map(|_| ()),
            RenumberOp::Reorder(updates) => {
                for update in updates {
                    store.set_page_number(update.page_id, update.page_number).await?;
                }
                Ok(())
            }
        }
    }
}

/// Primary strategy with an optional fallback.
pub struct RenumberStrategy {
    primary: Box<dyn Renumberer>,
    fallback: Option<Box<dyn Renumberer>>,
}

impl RenumberStrategy {
    /// Transactional first; sequential fallback when `fallback_enabled`.
    #[must_use]
    pub fn new(fallback_enabled: bool) -> Self {
        let fallback: Option<Box<dyn Renumberer>> =
            if fallback_enabled { Some(Box::new(SequentialRenumberer)) } else { None };
        Self::with(Box::new(TransactionalRenumberer), fallback)
    }

    #[must_use]
    pub fn with(primary: Box<dyn Renumberer>, fallback: Option<Box<dyn Renumberer>>) -> Self {
        Self { primary, fallback }
    }

    /// Apply `op`, falling back if the primary fails. Returns the name of the
    /// strategy that succeeded.
    ///
    /// # Errors
    ///
    /// Returns the primary's error when no fallback is configured, otherwise
    /// the fallback's error.
    pub async fn execute(
        &self,
        store: &dyn PageStore,
        project_id: Uuid,
        op: RenumberOp<'_>,
    ) -> Result<&'static str, StoreError> {
        let primary_err = match self.primary.apply(store, project_id, op).await {
            Ok(()) => return Ok(self.primary.name()),
            Err(err) => err,
        };
        let Some(fallback) = &self.fallback else {
            error!(%project_id, op = op.label(), strategy = self.primary.name(), error = %primary_err, "renumber failed");
            return Err(primary_err);
        };

        warn!(
            %project_id,
            op = op.label(),
            strategy = self.primary.name(),
            fallback = fallback.name(),
            error = %primary_err,
            "renumber failed; falling back"
        );
        match fallback.apply(store, project_id, op).await {
            Ok(()) => Ok(fallback.name()),
            Err(err) => {
                error!(%project_id, op = op.label(), strategy = fallback.name(), error = %err, "fallback renumber failed");
                Err(err)
            }
        }
    }
}

#[cfg(test)]
#[path = "renumber_test.rs"]
mod tests;
