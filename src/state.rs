//! Shared application state.
//!
//! DESIGN
//! ======
//! `AppState` is injected into Axum handlers via the `State` extractor. It
//! holds the page service, which owns the store and the renumbering strategy.
//! Pages live in the store; nothing is cached here between requests.

use std::sync::Arc;

use crate::services::pages::PageService;

/// Shared application state, injected into Axum handlers via State extractor.
/// Clone is required by Axum; all inner fields are Arc-wrapped.
#[derive(Clone)]
pub struct AppState {
    pub pages: Arc<PageService>,
}

impl AppState {
    #[must_use]
    pub fn new(pages: PageService) -> Self {
        Self { pages: Arc::new(pages) }
    }
}

// =============================================================================
// TEST HELPERS
// =============================================================================

#[cfg(test)]
#[path = "state_helpers_test.rs"]
pub mod test_helpers;
