//! SurrealDB implementation of [`TeamRepository`].

use chrono::{DateTime, Utc};
use haven_core::error::HavenResult;
use haven_core::models::team::{CreateTeam, Team};
use haven_core::repository::TeamRepository;
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use uuid::Uuid;

use crate::error::DbError;
use crate::repository::parse_uuid;

#[derive(Debug, SurrealValue)]
struct TeamRow {
    organization_id: String,
    name: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TeamRow {
    fn try_into_team(self, id: Uuid) -> Result<Team, DbError> {
        let organization_id = parse_uuid("organization", &self.organization_id)?;
        Ok(Team {
            id,
            organization_id,
            name: self.name,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

#[derive(Debug, SurrealValue)]
struct TeamRowWithId {
    record_id: String,
    organization_id: String,
    name: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

/// SurrealDB implementation of the Team repository.
#[derive(Clone)]
pub struct SurrealTeamRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealTeamRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }
}

impl<C: Connection> TeamRepository for SurrealTeamRepository<C> {
    async fn create(&self, input: CreateTeam) -> HavenResult<Team> {
        let id = Uuid::new_v4();
        let id_str = id.to_string();

        let result = self
            .db
            .query(
                "CREATE type::record('team', $id) SET \
                 organization_id = $organization_id, name = $name",
            )
            .bind(("id", id_str.clone()))
            .bind(("organization_id", input.organization_id.to_string()))
            .bind(("name", input.name))
            .await
            .map_err(DbError::from)?;

        let mut result = result.check().map_err(DbError::from)?;

        let rows: Vec<TeamRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "team".into(),
            id: id_str,
        })?;

        row.try_into_team(id).map_err(Into::into)
    }

    async fn get_by_id(&self, id: Uuid) -> HavenResult<Team> {
        let id_str = id.to_string();

        let mut result = self
            .db
            .query("SELECT * FROM type::record('team', $id)")
            .bind(("id", id_str.clone()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<TeamRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "team".into(),
            id: id_str,
        })?;

        row.try_into_team(id).map_err(Into::into)
    }

    async fn list_by_organization(&self, organization_id: Uuid) -> HavenResult<Vec<Team>> {
        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * FROM team \
                 WHERE organization_id = $organization_id \
                 ORDER BY created_at ASC",
            )
            .bind(("organization_id", organization_id.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<TeamRowWithId> = result.take(0).map_err(DbError::from)?;

        rows.into_iter()
            .map(|row| {
                let id = parse_uuid("team", &row.record_id)?;
                TeamRow {
                    organization_id: row.organization_id,
                    name: row.name,
                    created_at: row.created_at,
                    updated_at: row.updated_at,
                }
                .try_into_team(id)
            })
            .collect::<Result<Vec<_>, DbError>>()
            .map_err(Into::into)
    }
}
