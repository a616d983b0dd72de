//! Token exchange route under `/api`.

use crate::handlers::auth::obtain_token;
use crate::state::AppState;
use axum::{routing::post, Router};

pub fn auth_routes(state: AppState) -> Router {
    Router::new()
        .route("/auth", post(obtain_token))
        .with_state(state)
}
