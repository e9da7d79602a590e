//! SurrealDB implementation of [`TeamPropertyRepository`].
//!
//! `assign` has full-replace semantics: the stored set is diffed
//! against the requested set and only the difference is written, all
//! inside one transaction. Every requested property must belong to the
//! team's organization or the whole call is rejected.

use std::collections::HashSet;

use haven_core::error::HavenResult;
use haven_core::repository::{AssignmentDiff, TeamPropertyRepository};
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use uuid::Uuid;

use crate::error::DbError;
use crate::repository::parse_uuid;

#[derive(Debug, SurrealValue)]
struct TeamRow {
    organization_id: String,
}

#[derive(Debug, SurrealValue)]
struct PropertyIdRow {
    property_id: String,
}

#[derive(Debug, SurrealValue)]
struct CountRow {
    total: u64,
}

/// SurrealDB implementation of the team-property assignment store.
#[derive(Clone)]
pub struct SurrealTeamPropertyRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealTeamPropertyRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }

    async fn assigned_ids(&self, team_id: Uuid) -> Result<HashSet<Uuid>, DbError> {
        let mut result = self
            .db
            .query(
                "SELECT property_id FROM team_property \
                 WHERE team_id = $team_id",
            )
            .bind(("team_id", team_id.to_string()))
            .await?;

        let rows: Vec<PropertyIdRow> = result.take(0)?;
        rows.iter()
            .map(|row| parse_uuid("property", &row.property_id))
            .collect()
    }
}

impl<C: Connection> TeamPropertyRepository for SurrealTeamPropertyRepository<C> {
    async fn is_assigned(&self, team_id: Uuid, property_id: Uuid) -> HavenResult<bool> {
        let mut result = self
            .db
            .query(
                "SELECT count() AS total FROM team_property \
                 WHERE team_id = $team_id \
                 AND property_id = $property_id GROUP ALL",
            )
            .bind(("team_id", team_id.to_string()))
            .bind(("property_id", property_id.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<CountRow> = result.take(0).map_err(DbError::from)?;
        Ok(rows.first().map(|r| r.total).unwrap_or(0) > 0)
    }

    async fn property_ids_for_team(&self, team_id: Uuid) -> HavenResult<HashSet<Uuid>> {
        self.assigned_ids(team_id).await.map_err(Into::into)
    }

    async fn assign(
        &self,
        team_id: Uuid,
        property_ids: HashSet<Uuid>,
    ) -> HavenResult<AssignmentDiff> {
        let team_id_str = team_id.to_string();

        // 1. The team must exist; its organization scopes the validation.
        let mut result = self
            .db
            .query("SELECT organization_id FROM type::record('team', $id)")
            .bind(("id", team_id_str.clone()))
            .await
            .map_err(DbError::from)?;
        let teams: Vec<TeamRow> = result.take(0).map_err(DbError::from)?;
        let team = teams.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "team".into(),
            id: team_id_str.clone(),
        })?;

        // 2. Every requested property must belong to that organization.
        //    Nothing is applied when any of them fails the check.
        if !property_ids.is_empty() {
            let id_strings: Vec<String> = property_ids.iter().map(|p| p.to_string()).collect();
            let mut result = self
                .db
                .query(
                    "SELECT count() AS total FROM property \
                     WHERE organization_id = $organization_id \
                     AND meta::id(id) IN $ids GROUP ALL",
                )
                .bind(("organization_id", team.organization_id.clone()))
                .bind(("ids", id_strings))
                .await
                .map_err(DbError::from)?;
            let rows: Vec<CountRow> = result.take(0).map_err(DbError::from)?;
            let matched = rows.first().map(|r| r.total).unwrap_or(0);

            if matched != property_ids.len() as u64 {
                return Err(DbError::Validation(format!(
                    "{} of {} properties do not belong to the team's organization",
                    property_ids.len() as u64 - matched,
                    property_ids.len(),
                ))
                .into());
            }
        }

        // 3. Diff against the current assignment.
        let current = self.assigned_ids(team_id).await?;
        let to_add: Vec<Uuid> = property_ids.difference(&current).copied().collect();
        let to_remove: Vec<Uuid> = current.difference(&property_ids).copied().collect();

        let diff = AssignmentDiff {
            added: to_add.len() as u64,
            removed: to_remove.len() as u64,
        };

        if to_add.is_empty() && to_remove.is_empty() {
            return Ok(diff);
        }

        // 4. Apply adds and removes together, atomically.
        let mut statements = vec!["BEGIN TRANSACTION".to_string()];
        if !to_remove.is_empty() {
            let removed: Vec<String> = to_remove.iter().map(|p| format!("'{p}'")).collect();
            statements.push(format!(
                "DELETE team_property WHERE team_id = $team_id \
                 AND property_id IN [{}]",
                removed.join(", "),
            ));
        }
        for property_id in &to_add {
            statements.push(format!(
                "CREATE team_property SET team_id = $team_id, \
                 property_id = '{property_id}'",
            ));
        }
        statements.push("COMMIT TRANSACTION".to_string());

        self.db
            .query(statements.join("; "))
            .bind(("team_id", team_id_str))
            .await
            .map_err(DbError::from)?
            .check()
            .map_err(DbError::from)?;

        Ok(diff)
    }
}
