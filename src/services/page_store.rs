//! Page rows and the storage seam the numbering service runs against.
//!
//! DESIGN
//! ======
//! [`PageStore`] exposes plain row CRUD, which the sequential renumbering
//! strategy composes, plus two RPC-style operations the backing store must
//! execute atomically: `renumber_pages_after_deletion` and
//! `reorder_pages_transaction`. Postgres implements the latter as plpgsql
//! functions (see `db/migrations`); the in-memory store applies them under a
//! single write lock.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

// =============================================================================
// TYPES
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PageStatus {
    #[default]
    Draft,
    InProgress,
    Completed,
}

impl PageStatus {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::InProgress => "in_progress",
            Self::Completed => "completed",
        }
    }

    #[must_use]
    pub fn from_str(raw: &str) -> Option<Self> {
        match raw {
            "draft" => Some(Self::Draft),
            "in_progress" => Some(Self::InProgress),
            "completed" => Some(Self::Completed),
            _ => None,
        }
    }
}

/// One page of a project. `page_number` is the 1-based reading order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page {
    pub id: Uuid,
    pub project_id: Uuid,
    pub page_number: i32,
    pub title: String,
    /// Serialized page layout (panels, bubbles, sprites).
    pub content: serde_json::Value,
    pub status: PageStatus,
}

/// Target ordinal for one page in a reorder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageOrder {
    pub page_id: Uuid,
    #[serde(alias = "new_page_number")]
    pub page_number: i32,
}

/// Editable page fields. Ordinals are changed only through the numbering
/// operations.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct PageChanges {
    pub title: Option<String>,
    pub content: Option<serde_json::Value>,
    pub status: Option<PageStatus>,
}

impl PageChanges {
    pub fn apply_to(&self, page: &mut Page) {
        if let Some(title) = &self.title {
            page.title.clone_from(title);
        }
        if let Some(content) = &self.content {
            page.content.clone_from(content);
        }
        if let Some(status) = self.status {
            page.status = status;
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

impl crate::error::ErrorCode for StoreError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::Database(_) => "E_DATABASE",
            Self::Unavailable(_) => "E_STORE_UNAVAILABLE",
        }
    }

    fn retryable(&self) -> bool {
        true
    }
}

// =============================================================================
// STORE TRAIT
// =============================================================================

/// Storage backend for pages. Enables swapping Postgres for memory and
/// injecting faults in tests.
#[async_trait::async_trait]
pub trait PageStore: Send + Sync {
    /// All pages of a project ordered by `(page_number, id)`.
    async fn list_pages(&self, project_id: Uuid) -> Result<Vec<Page>, StoreError>;

    async fn get_page(&self, page_id: Uuid) -> Result<Option<Page>, StoreError>;

    async fn insert_page(&self, page: &Page) -> Result<(), StoreError>;

    /// Apply `changes` and return the updated row, or `None` if absent.
    async fn update_page(&self, page_id: Uuid, changes: &PageChanges) -> Result<Option<Page>, StoreError>;

    /// Returns `false` when no row was deleted.
    async fn delete_page(&self, page_id: Uuid) -> Result<bool, StoreError>;

    /// Single-row ordinal write. Not atomic with anything else.
    async fn set_page_number(&self, page_id: Uuid, page_number: i32) -> Result<(), StoreError>;

    /// Atomically decrement every ordinal above `deleted_number`.
    async fn renumber_pages_after_deletion(&self, project_id: Uuid, deleted_number: i32) -> Result<(), StoreError>;

    /// Atomically apply every update, or none of them.
    async fn reorder_pages_transaction(&self, project_id: Uuid, updates: &[PageOrder]) -> Result<(), StoreError>;
}
