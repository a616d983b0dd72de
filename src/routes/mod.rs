//! Route tables and the assembled application router.

mod auth;
mod common;
mod student;

pub use auth::auth_routes;
pub use common::common_routes;
pub use student::student_routes;

use crate::state::AppState;
use axum::{extract::DefaultBodyLimit, Router};
use tower_http::{limit::RequestBodyLimitLayer, trace::TraceLayer};

/// Full application: common routes at the root, auth and students under `/api`.
pub fn app(state: AppState, max_body_bytes: usize) -> Router {
    let api = Router::new()
        .merge(auth_routes(state.clone()))
        .merge(student_routes(state.clone()));

    Router::new()
        .merge(common_routes(state))
        .nest("/api", api)
        // Extractors otherwise cap buffered bodies at axum's 2 MiB default.
        .layer(DefaultBodyLimit::max(max_body_bytes))
        .layer(RequestBodyLimitLayer::new(max_body_bytes))
        .layer(TraceLayer::new_for_http())
}
