//! Student collection and item routes under `/api`.

use crate::handlers::student::{create, delete as delete_handler, list, retrieve, update};
use crate::state::AppState;
use axum::{routing::get, Router};

pub fn student_routes(state: AppState) -> Router {
    Router::new()
        .route("/student_list", get(list).post(create))
        .route(
            "/student_list/:student_id",
            get(retrieve).put(update).delete(delete_handler),
        )
        .with_state(state)
}
