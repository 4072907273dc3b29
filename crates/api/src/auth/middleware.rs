//! Authentication middleware for Axum.
//!
//! The `authenticate` layer is silent: any failure (missing header, bad
//! prefix, bad signature, expired token, unknown subject, store failure)
//! leaves the request unauthenticated and passes it through. Whether an
//! unauthenticated request is acceptable is the downstream handler's
//! decision; handlers that take an [`AuthUser`] argument reject with 401.

use std::sync::Arc;

use axum::extract::{FromRequestParts, Request, State};
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use axum::http::StatusCode;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use time::OffsetDateTime;
use uuid::Uuid;

use classbook_booking::IdentityStore;

use super::jwt::JwtManager;

/// State needed for authentication.
#[derive(Clone)]
pub struct AuthState {
    pub jwt_manager: JwtManager,
    pub identities: Arc<dyn IdentityStore>,
}

/// Request-scoped identity, built per request and discarded with it.
/// A projection of the stored identity; persistence details stay out.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub id: Uuid,
    /// Token subject: the identity's email.
    pub subject: String,
    pub admin: bool,
}

#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("Authentication required")]
    MissingAuth,
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let status = match self {
            AuthError::MissingAuth => StatusCode::UNAUTHORIZED,
        };

        let body = Json(json!({
            "error": self.to_string(),
            "code": status.as_u16()
        }));

        (status, body).into_response()
    }
}

/// Guarded handlers take `AuthUser` as an argument; absence of the
/// extension (the layer stayed silent) rejects with 401.
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthUser>()
            .cloned()
            .ok_or(AuthError::MissingAuth)
    }
}

/// Extract the bearer token from the Authorization header. The `"Bearer "`
/// prefix is exact and case-sensitive; anything else is no token.
fn extract_bearer_token(request: &Request) -> Option<&str> {
    request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|header| header.strip_prefix("Bearer "))
}

/// Middleware establishing request identity from a bearer token.
///
/// Exactly one identity lookup happens per request carrying a verified
/// token; requests without one never touch the store.
pub async fn authenticate(
    State(auth_state): State<AuthState>,
    mut request: Request,
    next: Next,
) -> Response {
    let auth_user = match extract_bearer_token(&request) {
        Some(token) => identify(&auth_state, token).await,
        None => None,
    };
    if let Some(auth_user) = auth_user {
        tracing::debug!(subject = %auth_user.subject, "request authenticated");
        request.extensions_mut().insert(auth_user);
    }

    next.run(request).await
}

async fn identify(auth_state: &AuthState, token: &str) -> Option<AuthUser> {
    let subject = match auth_state
        .jwt_manager
        .verify(token, OffsetDateTime::now_utc())
    {
        Ok(subject) => subject,
        Err(err) => {
            tracing::debug!(error = %err, "rejected bearer token");
            return None;
        }
    };

    // Fail-closed: a store failure reads the same as an absent identity.
    match auth_state.identities.find_by_subject(&subject).await {
        Ok(Some(identity)) => Some(AuthUser {
            id: identity.id,
            subject: identity.email,
            admin: identity.admin,
        }),
        Ok(None) => {
            tracing::debug!(subject = %subject, "token subject has no identity");
            None
        }
        Err(err) => {
            tracing::warn!(error = %err, "identity lookup failed during authentication");
            None
        }
    }
}
