//! Course progress HTTP service.
//!
//! Public routes (health, catalog, completion stats, signup) are merged with
//! routes that resolve the caller through the `SessionUser` and `AdminUser`
//! extractors.

#![forbid(unsafe_code)]

pub mod api;
pub mod config;
pub mod error;

use axum::Router;
use services::AppServices;
use tower_http::trace::TraceLayer;

/// Shared state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub services: AppServices,
}

impl AppState {
    #[must_use]
    pub fn new(services: AppServices) -> Self {
        Self { services }
    }
}

/// Build the application router.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .merge(api::health::health_routes())
        .merge(api::course::course_routes())
        .merge(api::progress::progress_routes())
        .merge(api::comments::comment_routes())
        .merge(api::users::user_routes())
        .merge(api::admin::admin_routes())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
