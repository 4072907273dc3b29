//! Route table and router assembly.

pub mod auth;
pub mod sessions;
pub mod teachers;
pub mod users;

use axum::routing::{get, post};
use axum::{middleware, Router};

use crate::state::AppState;

/// Build the full application router. The authentication layer wraps every
/// route; it only establishes identity, individual handlers decide whether
/// they require it.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/api/auth/register", post(auth::register))
        .route("/api/auth/login", post(auth::login))
        .route("/api/session", get(sessions::list).post(sessions::create))
        .route(
            "/api/session/{id}",
            get(sessions::get)
                .put(sessions::update)
                .delete(sessions::delete),
        )
        .route(
            "/api/session/{id}/participate/{user_id}",
            post(sessions::join).delete(sessions::leave),
        )
        .route("/api/teacher", get(teachers::list))
        .route("/api/teacher/{id}", get(teachers::get))
        .route("/api/user/{id}", get(users::get).delete(users::delete))
        .layer(middleware::from_fn_with_state(
            state.auth_state(),
            crate::auth::authenticate,
        ))
        .with_state(state)
}
