//! Session CRUD and roster handlers: thin pass-through to the engine.

use axum::extract::{Path, State};
use axum::Json;
use serde::Deserialize;
use time::OffsetDateTime;
use uuid::Uuid;

use classbook_booking::Session;

use crate::auth::AuthUser;
use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionRequest {
    pub name: String,
    pub description: String,
    #[serde(with = "time::serde::rfc3339")]
    pub date: OffsetDateTime,
    pub teacher_id: Uuid,
    /// Absent normalizes to an empty roster.
    pub participants: Option<Vec<Uuid>>,
}

impl SessionRequest {
    fn into_session(self) -> Session {
        let mut session = Session::new(self.name, self.description, self.date, self.teacher_id);
        session.participants = self.participants.unwrap_or_default();
        session
    }
}

pub async fn list(_user: AuthUser, State(state): State<AppState>) -> ApiResult<Json<Vec<Session>>> {
    Ok(Json(state.sessions.list().await?))
}

/// An absent session is a plain 404 on the read path, not a domain error.
pub async fn get(
    _user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<Session>> {
    state
        .sessions
        .get(id)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::NotFound("session not found".into()))
}

pub async fn create(
    _user: AuthUser,
    State(state): State<AppState>,
    Json(body): Json<SessionRequest>,
) -> ApiResult<Json<Session>> {
    Ok(Json(state.sessions.create(body.into_session()).await?))
}

/// Upsert: the payload is stored under the path id whether or not a
/// session already exists there.
pub async fn update(
    _user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(body): Json<SessionRequest>,
) -> ApiResult<Json<Session>> {
    Ok(Json(state.sessions.update(id, body.into_session()).await?))
}

pub async fn delete(
    _user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<()> {
    state.sessions.delete(id).await?;
    Ok(())
}

pub async fn join(
    _user: AuthUser,
    State(state): State<AppState>,
    Path((id, user_id)): Path<(Uuid, Uuid)>,
) -> ApiResult<Json<Session>> {
    Ok(Json(state.sessions.join(id, user_id).await?))
}

pub async fn leave(
    _user: AuthUser,
    State(state): State<AppState>,
    Path((id, user_id)): Path<(Uuid, Uuid)>,
) -> ApiResult<Json<Session>> {
    Ok(Json(state.sessions.leave(id, user_id).await?))
}
