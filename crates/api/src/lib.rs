// Test code patterns:
#![cfg_attr(test, allow(clippy::expect_used))]
#![cfg_attr(test, allow(clippy::unwrap_used))]

//! classbook API Library
//!
//! HTTP surface of the classbook booking backend: configuration, the
//! token codec and authentication middleware, and thin route handlers
//! over the `classbook-booking` domain crate.

pub mod auth;
pub mod config;
pub mod error;
pub mod routes;
pub mod state;

pub use config::Config;
pub use error::{ApiError, ApiResult};
pub use routes::create_router;
pub use state::AppState;
