//! Teacher catalogue handlers.

use axum::extract::{Path, State};
use axum::Json;
use uuid::Uuid;

use classbook_booking::Teacher;

use crate::auth::AuthUser;
use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

pub async fn list(_user: AuthUser, State(state): State<AppState>) -> ApiResult<Json<Vec<Teacher>>> {
    Ok(Json(state.teachers.find_all().await?))
}

pub async fn get(
    _user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<Teacher>> {
    state
        .teachers
        .find_by_id(id)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::NotFound("teacher not found".into()))
}
