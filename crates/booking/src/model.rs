//! Domain entities shared by the stores and the participation engine.

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

/// A registered account. The email doubles as the token subject and is
/// unique across the identity store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Identity {
    pub id: Uuid,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    /// PHC-format password hash. Never serialized out through the API layer.
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub admin: bool,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

impl Identity {
    pub fn new(email: String, first_name: String, last_name: String, password_hash: String) -> Self {
        let now = OffsetDateTime::now_utc();
        Self {
            id: Uuid::new_v4(),
            email,
            first_name,
            last_name,
            password_hash,
            admin: false,
            created_at: now,
            updated_at: now,
        }
    }
}

/// An instructor running sessions. Read-only catalogue data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Teacher {
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

/// A scheduled group session and its roster.
///
/// `participants` is ordered by join time and never contains a duplicate
/// id; `SessionService::join`/`leave` are the only roster mutators.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    #[serde(with = "time::serde::rfc3339")]
    pub date: OffsetDateTime,
    pub teacher_id: Uuid,
    pub participants: Vec<Uuid>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

impl Session {
    pub fn new(name: String, description: String, date: OffsetDateTime, teacher_id: Uuid) -> Self {
        let now = OffsetDateTime::now_utc();
        Self {
            id: Uuid::new_v4(),
            name,
            description,
            date,
            teacher_id,
            participants: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }
}
