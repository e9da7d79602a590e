//! Integration tests for the per-resource permission override store
//! using in-memory SurrealDB.

use haven_core::access::{Action, ResourceType};
use haven_core::repository::ResourcePermissionRepository;
use haven_db::repository::SurrealResourcePermissionRepository;
use surrealdb::Surreal;
use surrealdb::engine::local::Mem;
use uuid::Uuid;

type Db = surrealdb::engine::local::Db;

async fn setup() -> SurrealResourcePermissionRepository<Db> {
    let db = Surreal::new::<Mem>(()).await.unwrap();
    db.use_ns("test").use_db("test").await.unwrap();
    haven_db::run_migrations(&db).await.unwrap();
    SurrealResourcePermissionRepository::new(db)
}

#[tokio::test]
async fn grant_then_check() {
    let repo = setup().await;
    let team_id = Uuid::new_v4();
    let resource_id = Uuid::new_v4();

    assert!(
        !repo
            .has_override(team_id, ResourceType::Invoice, Action::View, resource_id)
            .await
            .unwrap()
    );

    repo.grant(team_id, ResourceType::Invoice, Action::View, resource_id)
        .await
        .unwrap();

    assert!(
        repo.has_override(team_id, ResourceType::Invoice, Action::View, resource_id)
            .await
            .unwrap()
    );
}

#[tokio::test]
async fn grant_is_idempotent() {
    let repo = setup().await;
    let team_id = Uuid::new_v4();
    let resource_id = Uuid::new_v4();

    repo.grant(team_id, ResourceType::Lease, Action::Update, resource_id)
        .await
        .unwrap();
    // Granting an already-granted permission is a no-op success.
    repo.grant(team_id, ResourceType::Lease, Action::Update, resource_id)
        .await
        .unwrap();

    assert!(
        repo.has_override(team_id, ResourceType::Lease, Action::Update, resource_id)
            .await
            .unwrap()
    );

    // A single revoke returns the store to the ungranted state.
    repo.revoke(team_id, ResourceType::Lease, Action::Update, resource_id)
        .await
        .unwrap();
    assert!(
        !repo
            .has_override(team_id, ResourceType::Lease, Action::Update, resource_id)
            .await
            .unwrap()
    );
}

#[tokio::test]
async fn revoke_without_grant_is_noop() {
    let repo = setup().await;

    repo.revoke(
        Uuid::new_v4(),
        ResourceType::Maintenance,
        Action::Delete,
        Uuid::new_v4(),
    )
    .await
    .unwrap();
}

#[tokio::test]
async fn tuples_are_independent() {
    let repo = setup().await;
    let team_id = Uuid::new_v4();
    let resource_id = Uuid::new_v4();

    repo.grant(team_id, ResourceType::Report, Action::View, resource_id)
        .await
        .unwrap();

    // Same resource, different action: not granted.
    assert!(
        !repo
            .has_override(team_id, ResourceType::Report, Action::Delete, resource_id)
            .await
            .unwrap()
    );
    // Same action, different team: not granted.
    assert!(
        !repo
            .has_override(Uuid::new_v4(), ResourceType::Report, Action::View, resource_id)
            .await
            .unwrap()
    );
    // Same everything, different resource: not granted.
    assert!(
        !repo
            .has_override(team_id, ResourceType::Report, Action::View, Uuid::new_v4())
            .await
            .unwrap()
    );
}
