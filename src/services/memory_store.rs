//! In-memory [`PageStore`] for local development and tests.
//!
//! Every call takes the lock once, so the RPC-style operations are atomic with
//! respect to other calls on the same store.

use std::collections::HashMap;

use tokio::sync::RwLock;
use uuid::Uuid;

use super::page_store::{Page, PageChanges, PageOrder, PageStore, StoreError};

#[derive(Default)]
pub struct MemoryPageStore {
    pages: RwLock<HashMap<Uuid, Page>>,
}

impl MemoryPageStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait::async_trait]
impl PageStore for MemoryPageStore {
    async fn list_pages(&self, project_id: Uuid) -> Result<Vec<Page>, StoreError> {
        let pages = self.pages.read().await;
        let mut out: Vec<Page> = pages.values().filter(|p| p.project_id == project_id).cloned().collect();
        out.sort_by(|a, b| a.page_number.cmp(&b.page_number).then_with(|| a.id.cmp(&b.id)));
        Ok(out)
    }

    async fn get_page(&self, page_id: Uuid) -> Result<Option<Page>, StoreError> {
        Ok(self.pages.read().await.get(&page_id).cloned())
    }

    async fn insert_page(&self, page: &Page) -> Result<(), StoreError> {
        let mut pages = self.pages.write().await;
        if pages.contains_key(&page.id) {
            return Err(StoreError::Unavailable(format!("duplicate page id {}", page.id)));
        }
        pages.insert(page.id, page.clone());
        Ok(())
    }

    async fn update_page(&self, page_id: Uuid, changes: &PageChanges) -> Result<Option<Page>, StoreError> {
        let mut pages = self.pages.write().await;
        Ok(pages.get_mut(&page_id).map(|page| {
            changes.apply_to(page);
            page.clone()
        }))
    }

    async fn delete_page(&self, page_id: Uuid) -> Result<bool, StoreError> {
        Ok(self.pages.write().await.remove(&page_id).is_some())
    }

    async fn set_page_number(&self, page_id: Uuid, page_number: i32) -> Result<(), StoreError> {
        let mut pages = self.pages.write().await;
        let page = pages
            .get_mut(&page_id)
            .ok_or_else(|| StoreError::Unavailable(format!("page {page_id} vanished")))?;
        page.page_number = page_number;
        Ok(())
    }

    async fn renumber_pages_after_deletion(&self, project_id: Uuid, deleted_number: i32) -> Result<(), StoreError> {
        let mut pages = self.pages.write().await;
        for page in pages.values_mut() {
            if page.project_id == project_id && page.page_number > deleted_number {
                page.page_number -= 1;
            }
        }
        Ok(())
    }

    async fn reorder_pages_transaction(&self, project_id: Uuid, updates: &[PageOrder]) -> Result<(), StoreError> {
        let mut pages = self.pages.write().await;
        // Check everything before touching anything.
        for update in updates {
            match pages.get(&update.page_id) {
                Some(page) if page.project_id == project_id => {}
                _ => {
                    return Err(StoreError::Unavailable(format!(
                        "page {} is not part of project {project_id}",
                        update.page_id
                    )));
                }
            }
        }
        for update in updates {
            if let Some(page) = pages.get_mut(&update.page_id) {
                page.page_number = update.page_number;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "memory_store_test.rs"]
mod tests;
