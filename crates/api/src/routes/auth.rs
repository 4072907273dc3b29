//! Registration and login handlers.

use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use classbook_booking::Identity;

use crate::auth::{hash_password, verify_password};
use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignupRequest {
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JwtResponse {
    pub token: String,
    #[serde(rename = "type")]
    pub token_type: &'static str,
    pub id: Uuid,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub admin: bool,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

pub async fn register(
    State(state): State<AppState>,
    Json(signup): Json<SignupRequest>,
) -> ApiResult<Json<MessageResponse>> {
    if state.identities.exists_by_subject(&signup.email).await? {
        return Err(ApiError::BadRequest("Error: Email is already taken!".into()));
    }

    // argon2 takes long enough to stall a runtime worker; hash off it.
    let password = signup.password;
    let password_hash = tokio::task::spawn_blocking(move || hash_password(&password))
        .await
        .map_err(|err| {
            tracing::error!(error = %err, "password hashing task failed");
            ApiError::Internal
        })?
        .map_err(|err| {
            tracing::error!(error = %err, "password hashing failed");
            ApiError::Internal
        })?;

    let identity = Identity::new(
        signup.email,
        signup.first_name,
        signup.last_name,
        password_hash,
    );
    let identity = state.identities.save(identity).await?;
    tracing::info!(user_id = %identity.id, "user registered");

    Ok(Json(MessageResponse {
        message: "User registered successfully!".into(),
    }))
}

pub async fn login(
    State(state): State<AppState>,
    Json(login): Json<LoginRequest>,
) -> ApiResult<Json<JwtResponse>> {
    let identity = state
        .identities
        .find_by_subject(&login.email)
        .await?
        .ok_or(ApiError::Unauthorized)?;

    let password = login.password;
    let stored_hash = identity.password_hash.clone();
    let credentials_ok =
        tokio::task::spawn_blocking(move || verify_password(&password, &stored_hash))
            .await
            .map_err(|err| {
                tracing::error!(error = %err, "credential check task failed");
                ApiError::Internal
            })?;
    if !credentials_ok {
        tracing::debug!(subject = %login.email, "bad credentials");
        return Err(ApiError::Unauthorized);
    }

    let token = state
        .jwt_manager
        .issue(&identity.email, OffsetDateTime::now_utc())
        .map_err(|err| {
            tracing::error!(error = %err, "token signing failed");
            ApiError::Internal
        })?;

    Ok(Json(JwtResponse {
        token,
        token_type: "Bearer",
        id: identity.id,
        username: identity.email,
        first_name: identity.first_name,
        last_name: identity.last_name,
        admin: identity.admin,
    }))
}
