//! `POST /api/auth`: exchange credentials for a token.

use crate::auth::obtain_token as exchange;
use crate::error::AppError;
use crate::extractors::Payload;
use crate::model::TokenResponse;
use crate::response;
use crate::state::AppState;
use axum::{extract::State, response::IntoResponse};

pub async fn obtain_token(
    State(state): State<AppState>,
    Payload(body): Payload,
) -> Result<impl IntoResponse, AppError> {
    let token = exchange(state.auth.as_ref(), &body).await?;
    Ok(response::ok(TokenResponse { token: token.key }))
}
