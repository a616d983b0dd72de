//! Student handlers. Collection: list, create. Item (by `student_id`): retrieve, update, delete.
//! Every handler requires [`AuthUser`].

use crate::error::AppError;
use crate::extractors::{AuthUser, Payload};
use crate::response;
use crate::service::CrudService;
use crate::state::AppState;
use axum::{
    extract::{Path, State},
    response::IntoResponse,
};

pub async fn list(
    State(state): State<AppState>,
    _user: AuthUser,
) -> Result<impl IntoResponse, AppError> {
    let rows = CrudService::list(state.students.as_ref()).await?;
    Ok(response::ok(rows))
}

pub async fn create(
    State(state): State<AppState>,
    _user: AuthUser,
    Payload(body): Payload,
) -> Result<impl IntoResponse, AppError> {
    let row = CrudService::create(state.students.as_ref(), &body).await?;
    Ok(response::created(row))
}

pub async fn retrieve(
    State(state): State<AppState>,
    _user: AuthUser,
    Path(student_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let row = CrudService::retrieve(state.students.as_ref(), &student_id).await?;
    Ok(response::ok(row))
}

/// Answers 201 like create does.
pub async fn update(
    State(state): State<AppState>,
    _user: AuthUser,
    Path(student_id): Path<String>,
    Payload(body): Payload,
) -> Result<impl IntoResponse, AppError> {
    let row = CrudService::update(state.students.as_ref(), &student_id, &body).await?;
    Ok(response::created(row))
}

pub async fn delete(
    State(state): State<AppState>,
    _user: AuthUser,
    Path(student_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    CrudService::delete(state.students.as_ref(), &student_id).await?;
    Ok(response::no_content())
}
