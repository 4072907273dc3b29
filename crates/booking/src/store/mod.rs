//! Storage collaborators behind object-safe async traits.
//!
//! The engine and the auth pipeline only ever see these traits; the
//! Postgres and in-memory backends are interchangeable.

pub mod memory;
pub mod postgres;

use async_trait::async_trait;
use uuid::Uuid;

use crate::model::{Identity, Session, Teacher};

pub use memory::{MemoryIdentityStore, MemoryRosterStore, MemoryTeacherStore};
pub use postgres::{PgIdentityStore, PgRosterStore, PgTeacherStore};

pub type StoreResult<T> = Result<T, StoreError>;

/// Infrastructure failure inside a store backend.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Lookup and persistence of [`Identity`] records, keyed by id or by
/// subject (email).
#[async_trait]
pub trait IdentityStore: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> StoreResult<Option<Identity>>;
    async fn find_by_subject(&self, subject: &str) -> StoreResult<Option<Identity>>;
    async fn exists_by_subject(&self, subject: &str) -> StoreResult<bool>;
    /// Insert-or-replace by id.
    async fn save(&self, identity: Identity) -> StoreResult<Identity>;
    async fn delete_by_id(&self, id: Uuid) -> StoreResult<()>;
}

/// Persistence of sessions together with their participant roster.
#[async_trait]
pub trait RosterStore: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> StoreResult<Option<Session>>;
    async fn find_all(&self) -> StoreResult<Vec<Session>>;
    /// Insert-or-replace by id, roster included.
    async fn save(&self, session: Session) -> StoreResult<Session>;
    async fn delete_by_id(&self, id: Uuid) -> StoreResult<()>;
}

/// Read-only access to the teacher catalogue.
#[async_trait]
pub trait TeacherStore: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> StoreResult<Option<Teacher>>;
    async fn find_all(&self) -> StoreResult<Vec<Teacher>>;
}
