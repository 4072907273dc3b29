//! Postgres store backends.
//!
//! The roster lives in a `session_participants` child table with a
//! `(session_id, user_id)` unique key and a `position` column preserving
//! join order. `PgRosterStore::save` replaces the roster inside one
//! transaction, so a session row and its roster never diverge. See
//! `db/schema.sql` for the full DDL.

use async_trait::async_trait;
use sqlx::{FromRow, PgPool};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::model::{Identity, Session, Teacher};
use crate::store::{IdentityStore, RosterStore, StoreResult, TeacherStore};

#[derive(Clone)]
pub struct PgIdentityStore {
    pool: PgPool,
}

impl PgIdentityStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, FromRow)]
struct IdentityRow {
    id: Uuid,
    email: String,
    first_name: String,
    last_name: String,
    password_hash: String,
    admin: bool,
    created_at: OffsetDateTime,
    updated_at: OffsetDateTime,
}

impl From<IdentityRow> for Identity {
    fn from(row: IdentityRow) -> Self {
        Identity {
            id: row.id,
            email: row.email,
            first_name: row.first_name,
            last_name: row.last_name,
            password_hash: row.password_hash,
            admin: row.admin,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[async_trait]
impl IdentityStore for PgIdentityStore {
    async fn find_by_id(&self, id: Uuid) -> StoreResult<Option<Identity>> {
        let row: Option<IdentityRow> = sqlx::query_as(
            "SELECT id, email, first_name, last_name, password_hash, admin, created_at, updated_at
             FROM users WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Identity::from))
    }

    async fn find_by_subject(&self, subject: &str) -> StoreResult<Option<Identity>> {
        let row: Option<IdentityRow> = sqlx::query_as(
            "SELECT id, email, first_name, last_name, password_hash, admin, created_at, updated_at
             FROM users WHERE email = $1",
        )
        .bind(subject)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Identity::from))
    }

    async fn exists_by_subject(&self, subject: &str) -> StoreResult<bool> {
        let found: Option<(bool,)> = sqlx::query_as("SELECT TRUE FROM users WHERE email = $1")
            .bind(subject)
            .fetch_optional(&self.pool)
            .await?;

        Ok(found.is_some())
    }

    async fn save(&self, identity: Identity) -> StoreResult<Identity> {
        sqlx::query(
            r#"
            INSERT INTO users (id, email, first_name, last_name, password_hash, admin, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            ON CONFLICT (id) DO UPDATE SET
                email = EXCLUDED.email,
                first_name = EXCLUDED.first_name,
                last_name = EXCLUDED.last_name,
                password_hash = EXCLUDED.password_hash,
                admin = EXCLUDED.admin,
                updated_at = EXCLUDED.updated_at
            "#,
        )
        .bind(identity.id)
        .bind(&identity.email)
        .bind(&identity.first_name)
        .bind(&identity.last_name)
        .bind(&identity.password_hash)
        .bind(identity.admin)
        .bind(identity.created_at)
        .bind(identity.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(identity)
    }

    async fn delete_by_id(&self, id: Uuid) -> StoreResult<()> {
        sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }
}

#[derive(Clone)]
pub struct PgRosterStore {
    pool: PgPool,
}

impl PgRosterStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn participants_for(&self, session_id: Uuid) -> StoreResult<Vec<Uuid>> {
        let rows: Vec<(Uuid,)> = sqlx::query_as(
            "SELECT user_id FROM session_participants WHERE session_id = $1 ORDER BY position",
        )
        .bind(session_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(|(id,)| id).collect())
    }
}

#[derive(Debug, FromRow)]
struct SessionRow {
    id: Uuid,
    name: String,
    description: String,
    date: OffsetDateTime,
    teacher_id: Uuid,
    created_at: OffsetDateTime,
    updated_at: OffsetDateTime,
}

impl SessionRow {
    fn into_session(self, participants: Vec<Uuid>) -> Session {
        Session {
            id: self.id,
            name: self.name,
            description: self.description,
            date: self.date,
            teacher_id: self.teacher_id,
            participants,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

#[async_trait]
impl RosterStore for PgRosterStore {
    async fn find_by_id(&self, id: Uuid) -> StoreResult<Option<Session>> {
        let row: Option<SessionRow> = sqlx::query_as(
            "SELECT id, name, description, date, teacher_id, created_at, updated_at
             FROM sessions WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(row) => {
                let participants = self.participants_for(row.id).await?;
                Ok(Some(row.into_session(participants)))
            }
            None => Ok(None),
        }
    }

    async fn find_all(&self) -> StoreResult<Vec<Session>> {
        let rows: Vec<SessionRow> = sqlx::query_as(
            "SELECT id, name, description, date, teacher_id, created_at, updated_at
             FROM sessions ORDER BY created_at",
        )
        .fetch_all(&self.pool)
        .await?;

        let links: Vec<(Uuid, Uuid)> = sqlx::query_as(
            "SELECT session_id, user_id FROM session_participants ORDER BY session_id, position",
        )
        .fetch_all(&self.pool)
        .await?;

        let mut sessions = Vec::with_capacity(rows.len());
        for row in rows {
            let participants = links
                .iter()
                .filter(|(sid, _)| *sid == row.id)
                .map(|(_, uid)| *uid)
                .collect();
            sessions.push(row.into_session(participants));
        }

        Ok(sessions)
    }

    async fn save(&self, session: Session) -> StoreResult<Session> {
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO sessions (id, name, description, date, teacher_id, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            ON CONFLICT (id) DO UPDATE SET
                name = EXCLUDED.name,
                description = EXCLUDED.description,
                date = EXCLUDED.date,
                teacher_id = EXCLUDED.teacher_id,
                updated_at = EXCLUDED.updated_at
            "#,
        )
        .bind(session.id)
        .bind(&session.name)
        .bind(&session.description)
        .bind(session.date)
        .bind(session.teacher_id)
        .bind(session.created_at)
        .bind(session.updated_at)
        .execute(&mut *tx)
        .await?;

        // Replace the roster wholesale; the unique key on
        // (session_id, user_id) backstops the engine's duplicate check.
        sqlx::query("DELETE FROM session_participants WHERE session_id = $1")
            .bind(session.id)
            .execute(&mut *tx)
            .await?;

        for (position, user_id) in session.participants.iter().enumerate() {
            sqlx::query(
                "INSERT INTO session_participants (session_id, user_id, position)
                 VALUES ($1, $2, $3)",
            )
            .bind(session.id)
            .bind(user_id)
            .bind(position as i32)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;

        Ok(session)
    }

    async fn delete_by_id(&self, id: Uuid) -> StoreResult<()> {
        // ON DELETE CASCADE clears session_participants.
        sqlx::query("DELETE FROM sessions WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }
}

#[derive(Clone)]
pub struct PgTeacherStore {
    pool: PgPool,
}

impl PgTeacherStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TeacherStore for PgTeacherStore {
    async fn find_by_id(&self, id: Uuid) -> StoreResult<Option<Teacher>> {
        let teacher: Option<Teacher> = sqlx::query_as(
            "SELECT id, first_name, last_name, created_at, updated_at FROM teachers WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(teacher)
    }

    async fn find_all(&self) -> StoreResult<Vec<Teacher>> {
        let teachers: Vec<Teacher> = sqlx::query_as(
            "SELECT id, first_name, last_name, created_at, updated_at
             FROM teachers ORDER BY last_name",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(teachers)
    }
}
