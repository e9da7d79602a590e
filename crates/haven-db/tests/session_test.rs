//! Integration tests for session resolution using in-memory SurrealDB.

use chrono::{Duration, Utc};
use haven_core::models::organization::CreateOrganization;
use haven_core::models::session::CreateSession;
use haven_core::models::user::CreateUser;
use haven_core::repository::{
    OrganizationRepository, SessionRepository, SessionResolver, UserRepository,
};
use haven_db::repository::{
    SurrealOrganizationRepository, SurrealSessionRepository, SurrealUserRepository,
    hash_session_token,
};
use surrealdb::Surreal;
use surrealdb::engine::local::Mem;

type Db = surrealdb::engine::local::Db;

async fn setup() -> (Surreal<Db>, uuid::Uuid, uuid::Uuid) {
    let db = Surreal::new::<Mem>(()).await.unwrap();
    db.use_ns("test").use_db("test").await.unwrap();
    haven_db::run_migrations(&db).await.unwrap();

    let user_repo = SurrealUserRepository::new(db.clone());
    let user = user_repo
        .create(CreateUser {
            email: "alice@example.com".into(),
            name: "Alice".into(),
        })
        .await
        .unwrap();

    let org_repo = SurrealOrganizationRepository::new(db.clone());
    let org = org_repo
        .create(CreateOrganization {
            name: "Northwind Properties".into(),
            slug: "northwind".into(),
            agent_owner_id: user.id,
        })
        .await
        .unwrap();

    (db, user.id, org.id)
}

#[tokio::test]
async fn resolves_valid_token() {
    let (db, user_id, org_id) = setup().await;
    let repo = SurrealSessionRepository::new(db);

    repo.create(CreateSession {
        user_id,
        token_hash: hash_session_token("tok-123"),
        organization_id: Some(org_id),
        team_id: None,
        expires_at: Utc::now() + Duration::hours(1),
    })
    .await
    .unwrap();

    let data = repo.resolve_session("tok-123").await.unwrap().unwrap();
    assert_eq!(data.user.id, user_id);
    assert_eq!(data.user.email, "alice@example.com");
    assert_eq!(data.organization_id, Some(org_id));
    assert_eq!(data.team_id, None);
}

#[tokio::test]
async fn unknown_token_resolves_to_none() {
    let (db, _, _) = setup().await;
    let repo = SurrealSessionRepository::new(db);

    assert!(repo.resolve_session("no-such-token").await.unwrap().is_none());
}

#[tokio::test]
async fn expired_session_resolves_to_none() {
    let (db, user_id, org_id) = setup().await;
    let repo = SurrealSessionRepository::new(db);

    repo.create(CreateSession {
        user_id,
        token_hash: hash_session_token("tok-old"),
        organization_id: Some(org_id),
        team_id: None,
        expires_at: Utc::now() - Duration::minutes(5),
    })
    .await
    .unwrap();

    assert!(repo.resolve_session("tok-old").await.unwrap().is_none());
}

#[tokio::test]
async fn invalidated_session_resolves_to_none() {
    let (db, user_id, _) = setup().await;
    let repo = SurrealSessionRepository::new(db);

    let session = repo
        .create(CreateSession {
            user_id,
            token_hash: hash_session_token("tok-bye"),
            organization_id: None,
            team_id: None,
            expires_at: Utc::now() + Duration::hours(1),
        })
        .await
        .unwrap();

    repo.invalidate(session.id).await.unwrap();

    assert!(repo.resolve_session("tok-bye").await.unwrap().is_none());
}
