//! Application state

use std::sync::Arc;

use sqlx::PgPool;

use classbook_booking::{
    IdentityStore, MemoryIdentityStore, MemoryRosterStore, MemoryTeacherStore, PgIdentityStore,
    PgRosterStore, PgTeacherStore, SessionService, TeacherStore,
};

use crate::auth::{AuthState, JwtManager};
use crate::config::Config;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub jwt_manager: JwtManager,
    pub identities: Arc<dyn IdentityStore>,
    pub teachers: Arc<dyn TeacherStore>,
    pub sessions: SessionService,
}

impl AppState {
    /// State backed by Postgres stores.
    pub fn with_postgres(pool: PgPool, config: Config) -> Self {
        let identities: Arc<dyn IdentityStore> = Arc::new(PgIdentityStore::new(pool.clone()));
        let teachers: Arc<dyn TeacherStore> = Arc::new(PgTeacherStore::new(pool.clone()));
        let rosters = Arc::new(PgRosterStore::new(pool));
        Self::assemble(config, identities, teachers, rosters)
    }

    /// State backed by in-memory stores; nothing survives a restart.
    pub fn in_memory(config: Config) -> Self {
        let identities: Arc<dyn IdentityStore> = Arc::new(MemoryIdentityStore::new());
        let teachers: Arc<dyn TeacherStore> = Arc::new(MemoryTeacherStore::new());
        let rosters = Arc::new(MemoryRosterStore::new());
        Self::assemble(config, identities, teachers, rosters)
    }

    fn assemble(
        config: Config,
        identities: Arc<dyn IdentityStore>,
        teachers: Arc<dyn TeacherStore>,
        rosters: Arc<dyn classbook_booking::RosterStore>,
    ) -> Self {
        let jwt_manager = JwtManager::new(&config.jwt_secret, config.jwt_ttl);
        let sessions = SessionService::new(rosters, identities.clone());

        Self {
            config,
            jwt_manager,
            identities,
            teachers,
            sessions,
        }
    }

    /// Get auth state for middleware
    pub fn auth_state(&self) -> AuthState {
        AuthState {
            jwt_manager: self.jwt_manager.clone(),
            identities: self.identities.clone(),
        }
    }
}
