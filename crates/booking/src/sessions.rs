//! Session participation engine.
//!
//! `SessionService` owns every roster mutation. Membership invariants:
//! no duplicate participant on a roster, no leave without a prior join.
//! Roster mutation is serialized per session id so two concurrent joins
//! for the same (session, user) pair cannot both pass the duplicate check.
//! Lock entries live only while a mutation is in flight; the map holds
//! nothing when the service is idle.

use std::collections::HashMap;
use std::sync::Arc;

use time::OffsetDateTime;
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::error::{BookingError, BookingResult};
use crate::model::Session;
use crate::store::{IdentityStore, RosterStore};

/// Per-session mutation locks, keyed by session id.
type RosterLocks = Arc<Mutex<HashMap<Uuid, Arc<Mutex<()>>>>>;

#[derive(Clone)]
pub struct SessionService {
    rosters: Arc<dyn RosterStore>,
    identities: Arc<dyn IdentityStore>,
    locks: RosterLocks,
}

impl SessionService {
    pub fn new(rosters: Arc<dyn RosterStore>, identities: Arc<dyn IdentityStore>) -> Self {
        Self {
            rosters,
            identities,
            locks: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    async fn roster_lock(&self, session_id: Uuid) -> Arc<Mutex<()>> {
        let mut locks = self.locks.lock().await;
        locks.entry(session_id).or_default().clone()
    }

    /// Drop the map entry once no other task holds it, so ids that never
    /// resolve to a session (or sessions that go quiet) don't pin an
    /// `Arc<Mutex<()>>` for the process lifetime.
    async fn discard_unused_lock(&self, session_id: Uuid, lock: Arc<Mutex<()>>) {
        drop(lock);
        let mut locks = self.locks.lock().await;
        if locks
            .get(&session_id)
            .is_some_and(|entry| Arc::strong_count(entry) == 1)
        {
            locks.remove(&session_id);
        }
    }

    /// Persist a new session. A caller-supplied roster is kept but
    /// deduplicated, preserving first-seen order.
    pub async fn create(&self, mut session: Session) -> BookingResult<Session> {
        dedup_roster(&mut session.participants);
        let session = self.rosters.save(session).await?;
        tracing::info!(session_id = %session.id, name = %session.name, "session created");
        Ok(session)
    }

    pub async fn list(&self) -> BookingResult<Vec<Session>> {
        Ok(self.rosters.find_all().await?)
    }

    /// Absence is a valid outcome here, not an error; the read path
    /// decides what an absent session means.
    pub async fn get(&self, session_id: Uuid) -> BookingResult<Option<Session>> {
        Ok(self.rosters.find_by_id(session_id).await?)
    }

    /// Overwrite the session stored under `session_id`. Deliberately an
    /// upsert, with no pre-existence check: callers may create ids
    /// upstream.
    pub async fn update(&self, session_id: Uuid, mut session: Session) -> BookingResult<Session> {
        session.id = session_id;
        session.updated_at = OffsetDateTime::now_utc();
        dedup_roster(&mut session.participants);
        Ok(self.rosters.save(session).await?)
    }

    /// Unconditional delete; idempotent.
    pub async fn delete(&self, session_id: Uuid) -> BookingResult<()> {
        self.rosters.delete_by_id(session_id).await?;
        tracing::info!(session_id = %session_id, "session deleted");
        Ok(())
    }

    /// Add `user_id` to the roster.
    ///
    /// Fails `NotFound` when the session or the identity is absent,
    /// `Conflict` when the user already participates.
    pub async fn join(&self, session_id: Uuid, user_id: Uuid) -> BookingResult<Session> {
        let lock = self.roster_lock(session_id).await;
        let guard = lock.lock().await;
        let result = self.join_roster(session_id, user_id).await;
        drop(guard);
        self.discard_unused_lock(session_id, lock).await;
        result
    }

    async fn join_roster(&self, session_id: Uuid, user_id: Uuid) -> BookingResult<Session> {
        let mut session = self
            .rosters
            .find_by_id(session_id)
            .await?
            .ok_or(BookingError::NotFound("session"))?;

        if self.identities.find_by_id(user_id).await?.is_none() {
            return Err(BookingError::NotFound("user"));
        }

        if session.participants.contains(&user_id) {
            return Err(BookingError::Conflict("user already participates in this session"));
        }

        session.participants.push(user_id);
        session.updated_at = OffsetDateTime::now_utc();
        let session = self.rosters.save(session).await?;
        tracing::info!(session_id = %session_id, user_id = %user_id, "participant joined");
        Ok(session)
    }

    /// Remove `user_id` from the roster.
    ///
    /// Check order matters: an absent session is `NotFound`, a present
    /// session without the user on its roster is `Conflict`.
    pub async fn leave(&self, session_id: Uuid, user_id: Uuid) -> BookingResult<Session> {
        let lock = self.roster_lock(session_id).await;
        let guard = lock.lock().await;
        let result = self.leave_roster(session_id, user_id).await;
        drop(guard);
        self.discard_unused_lock(session_id, lock).await;
        result
    }

    async fn leave_roster(&self, session_id: Uuid, user_id: Uuid) -> BookingResult<Session> {
        let mut session = self
            .rosters
            .find_by_id(session_id)
            .await?
            .ok_or(BookingError::NotFound("session"))?;

        if !session.participants.contains(&user_id) {
            return Err(BookingError::Conflict("user does not participate in this session"));
        }

        session.participants.retain(|p| *p != user_id);
        session.updated_at = OffsetDateTime::now_utc();
        let session = self.rosters.save(session).await?;
        tracing::info!(session_id = %session_id, user_id = %user_id, "participant left");
        Ok(session)
    }
}

fn dedup_roster(participants: &mut Vec<Uuid>) {
    let mut seen = Vec::with_capacity(participants.len());
    participants.retain(|id| {
        if seen.contains(id) {
            false
        } else {
            seen.push(*id);
            true
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Identity;
    use crate::store::{MemoryIdentityStore, MemoryRosterStore};

    fn service() -> (SessionService, MemoryIdentityStore, MemoryRosterStore) {
        let identities = MemoryIdentityStore::new();
        let rosters = MemoryRosterStore::new();
        let service = SessionService::new(
            Arc::new(rosters.clone()),
            Arc::new(identities.clone()),
        );
        (service, identities, rosters)
    }

    fn yoga_session() -> Session {
        Session::new(
            "Yoga Session".into(),
            "Morning yoga".into(),
            OffsetDateTime::now_utc(),
            Uuid::new_v4(),
        )
    }

    async fn registered_user(identities: &MemoryIdentityStore) -> Uuid {
        let identity = Identity::new(
            format!("{}@test.com", Uuid::new_v4()),
            "John".into(),
            "Doe".into(),
            "hash".into(),
        );
        let id = identity.id;
        identities.save(identity).await.unwrap();
        id
    }

    #[tokio::test]
    async fn create_persists_session() {
        let (service, _, rosters) = service();
        let session = service.create(yoga_session()).await.unwrap();

        let stored = rosters.find_by_id(session.id).await.unwrap().unwrap();
        assert_eq!(stored.name, "Yoga Session");
        assert!(stored.participants.is_empty());
    }

    #[tokio::test]
    async fn get_returns_none_for_unknown_id() {
        let (service, _, _) = service();
        assert!(service.get(Uuid::new_v4()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn list_returns_all_sessions() {
        let (service, _, _) = service();
        service.create(yoga_session()).await.unwrap();
        service.create(yoga_session()).await.unwrap();

        assert_eq!(service.list().await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn join_appends_in_join_order() {
        let (service, identities, _) = service();
        let session = service.create(yoga_session()).await.unwrap();
        let alice = registered_user(&identities).await;
        let bob = registered_user(&identities).await;

        service.join(session.id, alice).await.unwrap();
        let updated = service.join(session.id, bob).await.unwrap();

        assert_eq!(updated.participants, vec![alice, bob]);
    }

    #[tokio::test]
    async fn join_unknown_session_is_not_found() {
        let (service, identities, _) = service();
        let alice = registered_user(&identities).await;

        let err = service.join(Uuid::new_v4(), alice).await.unwrap_err();
        assert!(matches!(err, BookingError::NotFound(_)));
    }

    #[tokio::test]
    async fn join_unknown_user_is_not_found() {
        let (service, _, _) = service();
        let session = service.create(yoga_session()).await.unwrap();

        let err = service.join(session.id, Uuid::new_v4()).await.unwrap_err();
        assert!(matches!(err, BookingError::NotFound(_)));
    }

    #[tokio::test]
    async fn duplicate_join_is_conflict_and_roster_unchanged() {
        let (service, identities, _) = service();
        let session = service.create(yoga_session()).await.unwrap();
        let alice = registered_user(&identities).await;

        service.join(session.id, alice).await.unwrap();
        let err = service.join(session.id, alice).await.unwrap_err();
        assert!(matches!(err, BookingError::Conflict(_)));

        let roster = service.get(session.id).await.unwrap().unwrap().participants;
        assert_eq!(roster, vec![alice]);
    }

    #[tokio::test]
    async fn leave_removes_participant() {
        let (service, identities, _) = service();
        let session = service.create(yoga_session()).await.unwrap();
        let alice = registered_user(&identities).await;

        service.join(session.id, alice).await.unwrap();
        service.leave(session.id, alice).await.unwrap();

        let roster = service.get(session.id).await.unwrap().unwrap().participants;
        assert!(roster.is_empty());
    }

    #[tokio::test]
    async fn leave_without_join_is_conflict() {
        let (service, identities, _) = service();
        let session = service.create(yoga_session()).await.unwrap();
        let alice = registered_user(&identities).await;

        let err = service.leave(session.id, alice).await.unwrap_err();
        assert!(matches!(err, BookingError::Conflict(_)));
    }

    #[tokio::test]
    async fn leave_unknown_session_is_not_found_not_conflict() {
        let (service, identities, _) = service();
        let alice = registered_user(&identities).await;

        let err = service.leave(Uuid::new_v4(), alice).await.unwrap_err();
        assert!(matches!(err, BookingError::NotFound(_)));
    }

    #[tokio::test]
    async fn update_overwrites_mutable_fields() {
        let (service, _, _) = service();
        let session = service.create(yoga_session()).await.unwrap();

        let mut changed = session.clone();
        changed.name = "Updated Yoga Session".into();
        let updated = service.update(session.id, changed).await.unwrap();

        assert_eq!(updated.id, session.id);
        assert_eq!(updated.name, "Updated Yoga Session");
    }

    #[tokio::test]
    async fn failed_joins_do_not_retain_lock_entries() {
        let (service, identities, _) = service();
        let alice = registered_user(&identities).await;

        for _ in 0..100 {
            let err = service.join(Uuid::new_v4(), alice).await.unwrap_err();
            assert!(matches!(err, BookingError::NotFound(_)));
        }

        assert!(service.locks.lock().await.is_empty());
    }

    #[tokio::test]
    async fn lock_map_is_empty_once_mutations_settle() {
        let (service, identities, _) = service();
        let session = service.create(yoga_session()).await.unwrap();
        let alice = registered_user(&identities).await;

        service.join(session.id, alice).await.unwrap();
        let _ = service.join(session.id, alice).await.unwrap_err();
        service.leave(session.id, alice).await.unwrap();

        assert!(service.locks.lock().await.is_empty());
    }

    #[tokio::test]
    async fn delete_is_idempotent() {
        let (service, _, _) = service();
        let session = service.create(yoga_session()).await.unwrap();

        service.delete(session.id).await.unwrap();
        service.delete(session.id).await.unwrap();

        assert!(service.get(session.id).await.unwrap().is_none());
    }
}
