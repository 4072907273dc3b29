// Test code patterns (expected in test files):
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! classbook booking domain
//!
//! The data model, storage collaborators, and the session participation
//! engine. The HTTP surface lives in `classbook-api`; this crate never
//! touches a request.
//!
//! ## Invariants
//!
//! - A session roster never contains a duplicate participant id.
//! - Roster order is join order.
//! - `SessionService::join` / `leave` are the only roster mutators after
//!   a session exists.

pub mod error;
pub mod model;
pub mod sessions;
pub mod store;

#[cfg(test)]
mod edge_case_tests;

pub use error::{BookingError, BookingResult};
pub use model::{Identity, Session, Teacher};
pub use sessions::SessionService;
pub use store::{
    IdentityStore, MemoryIdentityStore, MemoryRosterStore, MemoryTeacherStore, PgIdentityStore,
    PgRosterStore, PgTeacherStore, RosterStore, StoreError, StoreResult, TeacherStore,
};
