//! Router assembly.
//!
//! SYSTEM CONTEXT
//! ==============
//! This module binds the page API under a single Axum router. Project-scoped
//! routes list, create, reorder, validate and repair; page-scoped routes read,
//! edit, delete and renumber one page.

pub mod pages;

use axum::Router;
use axum::http::StatusCode;
use axum::routing::{get, post, put};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::state::AppState;

/// Build the application router.
pub fn app(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route(
            "/api/projects/{project_id}/pages",
            get(pages::list_pages).post(pages::create_page),
        )
        .route("/api/projects/{project_id}/pages/reorder", put(pages::reorder_pages))
        .route("/api/projects/{project_id}/pages/validate", get(pages::validate_pages))
        .route("/api/projects/{project_id}/pages/repair", post(pages::repair_pages))
        .route(
            "/api/pages/{page_id}",
            get(pages::get_page)
                .patch(pages::update_page)
                .delete(pages::delete_page),
        )
        .route("/api/pages/{page_id}/number", put(pages::renumber_page))
        .route("/healthz", get(healthz))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn healthz() -> StatusCode {
    StatusCode::OK
}

#[cfg(test)]
#[path = "mod_test.rs"]
mod tests;
