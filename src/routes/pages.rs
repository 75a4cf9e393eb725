//! Page routes — thin handlers over the page service.
//!
//! Handlers extract path and body, call the service, and map [`PageError`]
//! to a status plus the JSON error envelope.

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use serde::Deserialize;
use uuid::Uuid;

use crate::error::ApiError;
use crate::services::page_store::{Page, PageChanges, PageOrder};
use crate::services::pages::{NewPage, PageError, ValidationReport};
use crate::state::AppState;

pub(crate) fn page_error_to_status(err: &PageError) -> StatusCode {
    match err {
        PageError::NotFound(_) => StatusCode::NOT_FOUND,
        PageError::LastPage(_) => StatusCode::CONFLICT,
        PageError::InvalidSequence(_) => StatusCode::UNPROCESSABLE_ENTITY,
        PageError::Timeout { .. } => StatusCode::GATEWAY_TIMEOUT,
        PageError::Persistence(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl From<PageError> for ApiError {
    fn from(err: PageError) -> Self {
        Self::new(page_error_to_status(&err), &err)
    }
}

#[derive(Debug, Deserialize)]
pub struct ReorderBody {
    #[serde(alias = "pageOrders")]
    pub pages: Vec<PageOrder>,
}

#[derive(Debug, Deserialize)]
pub struct RenumberBody {
    #[serde(alias = "new_page_number")]
    pub page_number: i32,
}

/// `GET /api/projects/{project_id}/pages`
pub async fn list_pages(
    State(state): State<AppState>,
    Path(project_id): Path<Uuid>,
) -> Result<Json<Vec<Page>>, ApiError> {
    Ok(Json(state.pages.list_pages(project_id).await?))
}

/// `POST /api/projects/{project_id}/pages`: append, or insert at `position`.
pub async fn create_page(
    State(state): State<AppState>,
    Path(project_id): Path<Uuid>,
    Json(body): Json<NewPage>,
) -> Result<(StatusCode, Json<Page>), ApiError> {
    let page = state.pages.create_page(project_id, body).await?;
    Ok((StatusCode::CREATED, Json(page)))
}

/// `PUT /api/projects/{project_id}/pages/reorder`
pub async fn reorder_pages(
    State(state): State<AppState>,
    Path(project_id): Path<Uuid>,
    Json(body): Json<ReorderBody>,
) -> Result<Json<Vec<Page>>, ApiError> {
    Ok(Json(state.pages.reorder_pages(project_id, body.pages).await?))
}

/// `GET /api/projects/{project_id}/pages/validate`
pub async fn validate_pages(
    State(state): State<AppState>,
    Path(project_id): Path<Uuid>,
) -> Result<Json<ValidationReport>, ApiError> {
    Ok(Json(state.pages.validate(project_id).await?))
}

/// `POST /api/projects/{project_id}/pages/repair`
pub async fn repair_pages(
    State(state): State<AppState>,
    Path(project_id): Path<Uuid>,
) -> Result<Json<ValidationReport>, ApiError> {
    Ok(Json(state.pages.repair(project_id).await?))
}

/// `GET /api/pages/{page_id}`
pub async fn get_page(State(state): State<AppState>, Path(page_id): Path<Uuid>) -> Result<Json<Page>, ApiError> {
    Ok(Json(state.pages.get_page(page_id).await?))
}

/// `PATCH /api/pages/{page_id}`: title, content and status only.
pub async fn update_page(
    State(state): State<AppState>,
    Path(page_id): Path<Uuid>,
    Json(changes): Json<PageChanges>,
) -> Result<Json<Page>, ApiError> {
    Ok(Json(state.pages.update_page(page_id, changes).await?))
}

/// `DELETE /api/pages/{page_id}`: returns the project's remaining pages.
pub async fn delete_page(
    State(state): State<AppState>,
    Path(page_id): Path<Uuid>,
) -> Result<Json<Vec<Page>>, ApiError> {
    Ok(Json(state.pages.delete_page(page_id).await?))
}

/// `PUT /api/pages/{page_id}/number`: swap into `page_number`.
pub async fn renumber_page(
    State(state): State<AppState>,
    Path(page_id): Path<Uuid>,
    Json(body): Json<RenumberBody>,
) -> Result<Json<Vec<Page>>, ApiError> {
    Ok(Json(state.pages.renumber_page(page_id, body.page_number).await?))
}

#[cfg(test)]
#[path = "pages_test.rs"]
mod tests;
