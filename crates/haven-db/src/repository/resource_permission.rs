//! SurrealDB implementation of [`ResourcePermissionRepository`].
//!
//! The record id is derived from the (team, resource type, resource id,
//! action) tuple, which makes grant an idempotent UPSERT and revoke an
//! idempotent DELETE with no separate uniqueness bookkeeping.

use haven_core::access::{Action, ResourceType};
use haven_core::error::HavenResult;
use haven_core::repository::ResourcePermissionRepository;
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use uuid::Uuid;

use crate::error::DbError;

#[derive(Debug, SurrealValue)]
struct OverrideRow {
    #[allow(dead_code)]
    team_id: String,
}

fn record_key(
    team_id: Uuid,
    resource_type: ResourceType,
    action: Action,
    resource_id: Uuid,
) -> String {
    format!("{team_id}_{resource_type}_{action}_{resource_id}")
}

/// SurrealDB implementation of the per-resource override store.
#[derive(Clone)]
pub struct SurrealResourcePermissionRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealResourcePermissionRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }
}

impl<C: Connection> ResourcePermissionRepository for SurrealResourcePermissionRepository<C> {
    async fn has_override(
        &self,
        team_id: Uuid,
        resource_type: ResourceType,
        action: Action,
        resource_id: Uuid,
    ) -> HavenResult<bool> {
        let key = record_key(team_id, resource_type, action, resource_id);

        let mut result = self
            .db
            .query("SELECT team_id FROM type::record('resource_permission', $id)")
            .bind(("id", key))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<OverrideRow> = result.take(0).map_err(DbError::from)?;
        Ok(!rows.is_empty())
    }

    async fn grant(
        &self,
        team_id: Uuid,
        resource_type: ResourceType,
        action: Action,
        resource_id: Uuid,
    ) -> HavenResult<()> {
        let key = record_key(team_id, resource_type, action, resource_id);

        self.db
            .query(
                "UPSERT type::record('resource_permission', $id) SET \
                 team_id = $team_id, resource_type = $resource_type, \
                 resource_id = $resource_id, action = $action",
            )
            .bind(("id", key))
            .bind(("team_id", team_id.to_string()))
            .bind(("resource_type", resource_type.as_str()))
            .bind(("resource_id", resource_id.to_string()))
            .bind(("action", action.as_str()))
            .await
            .map_err(DbError::from)?
            .check()
            .map_err(DbError::from)?;

        Ok(())
    }

    async fn revoke(
        &self,
        team_id: Uuid,
        resource_type: ResourceType,
        action: Action,
        resource_id: Uuid,
    ) -> HavenResult<()> {
        let key = record_key(team_id, resource_type, action, resource_id);

        self.db
            .query("DELETE type::record('resource_permission', $id)")
            .bind(("id", key))
            .await
            .map_err(DbError::from)?
            .check()
            .map_err(DbError::from)?;

        Ok(())
    }
}
