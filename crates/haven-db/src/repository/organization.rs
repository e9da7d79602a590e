//! SurrealDB implementation of [`OrganizationRepository`].

use chrono::{DateTime, Utc};
use haven_core::error::HavenResult;
use haven_core::models::organization::{CreateOrganization, Organization};
use haven_core::repository::OrganizationRepository;
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use uuid::Uuid;

use crate::error::DbError;
use crate::repository::parse_uuid;

#[derive(Debug, SurrealValue)]
struct OrganizationRow {
    name: String,
    slug: String,
    agent_owner_id: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl OrganizationRow {
    fn try_into_organization(self, id: Uuid) -> Result<Organization, DbError> {
        let agent_owner_id = parse_uuid("agent_owner", &self.agent_owner_id)?;
        Ok(Organization {
            id,
            name: self.name,
            slug: self.slug,
            agent_owner_id,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

/// SurrealDB implementation of the Organization repository.
#[derive(Clone)]
pub struct SurrealOrganizationRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealOrganizationRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }
}

impl<C: Connection> OrganizationRepository for SurrealOrganizationRepository<C> {
    async fn create(&self, input: CreateOrganization) -> HavenResult<Organization> {
        let id = Uuid::new_v4();
        let id_str = id.to_string();

        let result = self
            .db
            .query(
                "CREATE type::record('organization', $id) SET \
                 name = $name, slug = $slug, \
                 agent_owner_id = $agent_owner_id",
            )
            .bind(("id", id_str.clone()))
            .bind(("name", input.name))
            .bind(("slug", input.slug))
            .bind(("agent_owner_id", input.agent_owner_id.to_string()))
            .await
            .map_err(DbError::from)?;

        let mut result = result.check().map_err(DbError::from)?;

        let rows: Vec<OrganizationRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "organization".into(),
            id: id_str,
        })?;

        row.try_into_organization(id).map_err(Into::into)
    }

    async fn get_by_id(&self, id: Uuid) -> HavenResult<Organization> {
        let id_str = id.to_string();

        let mut result = self
            .db
            .query("SELECT * FROM type::record('organization', $id)")
            .bind(("id", id_str.clone()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<OrganizationRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "organization".into(),
            id: id_str,
        })?;

        row.try_into_organization(id).map_err(Into::into)
    }
}
