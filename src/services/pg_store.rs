//! Postgres-backed [`PageStore`].
//!
//! Row CRUD uses plain queries. The two atomic operations call the plpgsql
//! functions installed by `db/migrations`, each of which runs in the
//! statement's implicit transaction.

use sqlx::PgPool;
use sqlx::types::Json;
use tracing::warn;
use uuid::Uuid;

use super::page_store::{Page, PageChanges, PageOrder, PageStatus, PageStore, StoreError};

type PageRow = (Uuid, Uuid, i32, String, serde_json::Value, String);

const PAGE_COLUMNS: &str = "id, project_id, page_number, title, content, status";

fn page_from_row((id, project_id, page_number, title, content, status): PageRow) -> Page {
    let status = PageStatus::from_str(&status).unwrap_or_else(|| {
        warn!(page_id = %id, status = %status, "unknown page status; treating as draft");
        PageStatus::default()
    });
    Page { id, project_id, page_number, title, content, status }
}

#[derive(Clone)]
pub struct PgPageStore {
    pool: PgPool,
}

impl PgPageStore {
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl PageStore for PgPageStore {
    async fn list_pages(&self, project_id: Uuid) -> Result<Vec<Page>, StoreError> {
        let rows = sqlx::query_as::<_, PageRow>(&format!(
            "SELECT {PAGE_COLUMNS} FROM pages WHERE project_id = $1 ORDER BY page_number ASC, id ASC"
        ))
        .bind(project_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(page_from_row).collect())
    }

    async fn get_page(&self, page_id: Uuid) -> Result<Option<Page>, StoreError> {
        let row = sqlx::query_as::<_, PageRow>(&format!("SELECT {PAGE_COLUMNS} FROM pages WHERE id = $1"))
            .bind(page_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(page_from_row))
    }

    async fn insert_page(&self, page: &Page) -> Result<(), StoreError> {
        sqlx::query(
            "INSERT INTO pages (id, project_id, page_number, title, content, status)
             VALUES ($1, $2, $3, $4, $5, $6)",
        )
        .bind(page.id)
        .bind(page.project_id)
        .bind(page.page_number)
        .bind(&page.title)
        .bind(&page.content)
        .bind(page.status.as_str())
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn update_page(&self, page_id: Uuid, changes: &PageChanges) -> Result<Option<Page>, StoreError> {
        let row = sqlx::query_as::<_, PageRow>(&format!(
            "UPDATE pages
             SET title = COALESCE($2, title),
                 content = COALESCE($3, content),
                 status = COALESCE($4, status),
                 updated_at = now()
             WHERE id = $1
             RETURNING {PAGE_COLUMNS}"
        ))
        .bind(page_id)
        .bind(changes.title.as_deref())
        .bind(changes.content.as_ref())
        .bind(changes.status.map(PageStatus::as_str))
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(page_from_row))
    }

    async fn delete_page(&self, page_id: Uuid) -> Result<bool, StoreError> {
        let result = sqlx::query("DELETE FROM pages WHERE id = $1")
            .bind(page_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn set_page_number(&self, page_id: Uuid, page_number: i32) -> Result<(), StoreError> {
        let result = sqlx::query("UPDATE pages SET page_number = $2, updated_at = now() WHERE id = $1")
            .bind(page_id)
            .bind(page_number)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(StoreError::Unavailable(format!("page {page_id} vanished")));
        }
        Ok(())
    }

    async fn renumber_pages_after_deletion(&self, project_id: Uuid, deleted_number: i32) -> Result<(), StoreError> {
        sqlx::query("SELECT renumber_pages_after_deletion($1, $2)")
            .bind(project_id)
            .bind(deleted_number)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn reorder_pages_transaction(&self, project_id: Uuid, updates: &[PageOrder]) -> Result<(), StoreError> {
        sqlx::query("SELECT reorder_pages_transaction($1, $2)")
            .bind(project_id)
            .bind(Json(updates))
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}

#[cfg(test)]
#[path = "pg_store_test.rs"]
mod tests;
