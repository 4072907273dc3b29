//! Edge-case tests for the participation engine
//!
//! Covers the corners the happy-path tests in `sessions.rs` don't:
//! concurrent mutation, roster normalization, upsert semantics, and
//! full join/leave lifecycles.

use std::sync::Arc;

use time::OffsetDateTime;
use uuid::Uuid;

use crate::error::BookingError;
use crate::model::{Identity, Session};
use crate::sessions::SessionService;
use crate::store::{IdentityStore, MemoryIdentityStore, MemoryRosterStore, RosterStore};

fn service() -> (SessionService, MemoryIdentityStore, MemoryRosterStore) {
    let identities = MemoryIdentityStore::new();
    let rosters = MemoryRosterStore::new();
    let service = SessionService::new(Arc::new(rosters.clone()), Arc::new(identities.clone()));
    (service, identities, rosters)
}

fn pilates_session() -> Session {
    Session::new(
        "Pilates Session".into(),
        "Evening pilates".into(),
        OffsetDateTime::now_utc(),
        Uuid::new_v4(),
    )
}

async fn registered_user(identities: &MemoryIdentityStore) -> Uuid {
    let identity = Identity::new(
        format!("{}@test.com", Uuid::new_v4()),
        "Jane".into(),
        "Smith".into(),
        "hash".into(),
    );
    let id = identity.id;
    identities.save(identity).await.unwrap();
    id
}

#[tokio::test]
async fn concurrent_duplicate_joins_admit_exactly_one() {
    let (service, identities, _) = service();
    let session = service.create(pilates_session()).await.unwrap();
    let alice = registered_user(&identities).await;

    let a = {
        let service = service.clone();
        let sid = session.id;
        tokio::spawn(async move { service.join(sid, alice).await })
    };
    let b = {
        let service = service.clone();
        let sid = session.id;
        tokio::spawn(async move { service.join(sid, alice).await })
    };

    let results = [a.await.unwrap(), b.await.unwrap()];
    let successes = results.iter().filter(|r| r.is_ok()).count();
    assert_eq!(successes, 1);

    let roster = service.get(session.id).await.unwrap().unwrap().participants;
    assert_eq!(roster, vec![alice]);
}

#[tokio::test]
async fn concurrent_joins_of_distinct_users_all_land() {
    let (service, identities, _) = service();
    let session = service.create(pilates_session()).await.unwrap();

    let mut handles = Vec::new();
    for _ in 0..8 {
        let user = registered_user(&identities).await;
        let service = service.clone();
        let sid = session.id;
        handles.push(tokio::spawn(async move { service.join(sid, user).await }));
    }
    for handle in handles {
        handle.await.unwrap().unwrap();
    }

    let roster = service.get(session.id).await.unwrap().unwrap().participants;
    assert_eq!(roster.len(), 8);
}

#[tokio::test]
async fn create_deduplicates_caller_supplied_roster() {
    let (service, identities, _) = service();
    let alice = registered_user(&identities).await;
    let bob = registered_user(&identities).await;

    let mut session = pilates_session();
    session.participants = vec![alice, bob, alice, alice];
    let created = service.create(session).await.unwrap();

    assert_eq!(created.participants, vec![alice, bob]);
}

#[tokio::test]
async fn update_is_an_upsert_for_unknown_id() {
    let (service, _, rosters) = service();
    let fresh_id = Uuid::new_v4();

    let updated = service.update(fresh_id, pilates_session()).await.unwrap();

    assert_eq!(updated.id, fresh_id);
    assert!(rosters.find_by_id(fresh_id).await.unwrap().is_some());
}

#[tokio::test]
async fn update_keeps_roster_duplicate_free() {
    let (service, identities, _) = service();
    let session = service.create(pilates_session()).await.unwrap();
    let alice = registered_user(&identities).await;

    let mut changed = session.clone();
    changed.participants = vec![alice, alice];
    let updated = service.update(session.id, changed).await.unwrap();

    assert_eq!(updated.participants, vec![alice]);
}

#[tokio::test]
async fn full_lifecycle_join_conflict_leave_conflict() {
    let (service, identities, _) = service();
    let session = service.create(pilates_session()).await.unwrap();
    let alice = registered_user(&identities).await;

    service.join(session.id, alice).await.unwrap();
    assert!(matches!(
        service.join(session.id, alice).await.unwrap_err(),
        BookingError::Conflict(_)
    ));
    service.leave(session.id, alice).await.unwrap();
    assert!(matches!(
        service.leave(session.id, alice).await.unwrap_err(),
        BookingError::Conflict(_)
    ));

    let roster = service.get(session.id).await.unwrap().unwrap().participants;
    assert!(roster.is_empty());
}

#[tokio::test]
async fn leave_preserves_order_of_remaining_participants() {
    let (service, identities, _) = service();
    let session = service.create(pilates_session()).await.unwrap();
    let users = [
        registered_user(&identities).await,
        registered_user(&identities).await,
        registered_user(&identities).await,
    ];
    for user in users {
        service.join(session.id, user).await.unwrap();
    }

    service.leave(session.id, users[1]).await.unwrap();

    let roster = service.get(session.id).await.unwrap().unwrap().participants;
    assert_eq!(roster, vec![users[0], users[2]]);
}

#[tokio::test]
async fn join_after_session_deleted_is_not_found() {
    let (service, identities, _) = service();
    let session = service.create(pilates_session()).await.unwrap();
    let alice = registered_user(&identities).await;

    service.delete(session.id).await.unwrap();

    assert!(matches!(
        service.join(session.id, alice).await.unwrap_err(),
        BookingError::NotFound(_)
    ));
}

#[tokio::test]
async fn deleted_identity_cannot_join() {
    let (service, identities, _) = service();
    let session = service.create(pilates_session()).await.unwrap();
    let alice = registered_user(&identities).await;
    identities.delete_by_id(alice).await.unwrap();

    assert!(matches!(
        service.join(session.id, alice).await.unwrap_err(),
        BookingError::NotFound(_)
    ));
}
