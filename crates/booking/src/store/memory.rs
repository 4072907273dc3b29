//! In-memory store backends.
//!
//! Back the unit tests and `DATABASE_URL`-less dev runs. Each store is a
//! shared `RwLock<HashMap>`; a clone observes the same data.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::model::{Identity, Session, Teacher};
use crate::store::{IdentityStore, RosterStore, StoreResult, TeacherStore};

#[derive(Clone, Default)]
pub struct MemoryIdentityStore {
    identities: Arc<RwLock<HashMap<Uuid, Identity>>>,
}

impl MemoryIdentityStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl IdentityStore for MemoryIdentityStore {
    async fn find_by_id(&self, id: Uuid) -> StoreResult<Option<Identity>> {
        Ok(self.identities.read().await.get(&id).cloned())
    }

    async fn find_by_subject(&self, subject: &str) -> StoreResult<Option<Identity>> {
        let identities = self.identities.read().await;
        Ok(identities.values().find(|i| i.email == subject).cloned())
    }

    async fn exists_by_subject(&self, subject: &str) -> StoreResult<bool> {
        let identities = self.identities.read().await;
        Ok(identities.values().any(|i| i.email == subject))
    }

    async fn save(&self, identity: Identity) -> StoreResult<Identity> {
        self.identities
            .write()
            .await
            .insert(identity.id, identity.clone());
        Ok(identity)
    }

    async fn delete_by_id(&self, id: Uuid) -> StoreResult<()> {
        self.identities.write().await.remove(&id);
        Ok(())
    }
}

#[derive(Clone, Default)]
pub struct MemoryRosterStore {
    sessions: Arc<RwLock<HashMap<Uuid, Session>>>,
}

impl MemoryRosterStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl RosterStore for MemoryRosterStore {
    async fn find_by_id(&self, id: Uuid) -> StoreResult<Option<Session>> {
        Ok(self.sessions.read().await.get(&id).cloned())
    }

    async fn find_all(&self) -> StoreResult<Vec<Session>> {
        let sessions = self.sessions.read().await;
        let mut all: Vec<Session> = sessions.values().cloned().collect();
        all.sort_by_key(|s| s.created_at);
        Ok(all)
    }

    async fn save(&self, session: Session) -> StoreResult<Session> {
        self.sessions
            .write()
            .await
            .insert(session.id, session.clone());
        Ok(session)
    }

    async fn delete_by_id(&self, id: Uuid) -> StoreResult<()> {
        self.sessions.write().await.remove(&id);
        Ok(())
    }
}

#[derive(Clone, Default)]
pub struct MemoryTeacherStore {
    teachers: Arc<RwLock<HashMap<Uuid, Teacher>>>,
}

impl MemoryTeacherStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the catalogue; teachers are read-only through the trait.
    pub async fn insert(&self, teacher: Teacher) {
        self.teachers.write().await.insert(teacher.id, teacher);
    }
}

#[async_trait]
impl TeacherStore for MemoryTeacherStore {
    async fn find_by_id(&self, id: Uuid) -> StoreResult<Option<Teacher>> {
        Ok(self.teachers.read().await.get(&id).cloned())
    }

    async fn find_all(&self) -> StoreResult<Vec<Teacher>> {
        let teachers = self.teachers.read().await;
        let mut all: Vec<Teacher> = teachers.values().cloned().collect();
        all.sort_by(|a, b| a.last_name.cmp(&b.last_name));
        Ok(all)
    }
}
