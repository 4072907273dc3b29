//! User account handlers.

use axum::extract::{Path, State};
use axum::Json;
use uuid::Uuid;

use classbook_booking::Identity;

use crate::auth::AuthUser;
use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

pub async fn get(
    _user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<Identity>> {
    state
        .identities
        .find_by_id(id)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::NotFound("user not found".into()))
}

/// Account deletion is owner-only: the authenticated subject must match
/// the account being deleted.
pub async fn delete(
    user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<()> {
    let identity = state
        .identities
        .find_by_id(id)
        .await?
        .ok_or_else(|| ApiError::NotFound("user not found".into()))?;

    if identity.email != user.subject {
        return Err(ApiError::Unauthorized);
    }

    state.identities.delete_by_id(id).await?;
    tracing::info!(user_id = %id, "account deleted");
    Ok(())
}
