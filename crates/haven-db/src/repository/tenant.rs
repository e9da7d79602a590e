//! SurrealDB implementation of [`TenantRepository`].

use chrono::{DateTime, Utc};
use haven_core::error::HavenResult;
use haven_core::models::tenant::{CreateTenant, Tenant};
use haven_core::repository::TenantRepository;
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use uuid::Uuid;

use crate::error::DbError;
use crate::repository::parse_uuid;

#[derive(Debug, SurrealValue)]
struct TenantRow {
    organization_id: String,
    name: String,
    email: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TenantRow {
    fn try_into_tenant(self, id: Uuid) -> Result<Tenant, DbError> {
        let organization_id = parse_uuid("organization", &self.organization_id)?;
        Ok(Tenant {
            id,
            organization_id,
            name: self.name,
            email: self.email,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

/// SurrealDB implementation of the Tenant repository.
#[derive(Clone)]
pub struct SurrealTenantRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealTenantRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }
}

impl<C: Connection> TenantRepository for SurrealTenantRepository<C> {
    async fn create(&self, input: CreateTenant) -> HavenResult<Tenant> {
        let id = Uuid::new_v4();
        let id_str = id.to_string();

        let result = self
            .db
            .query(
                "CREATE type::record('tenant', $id) SET \
                 organization_id = $organization_id, \
                 name = $name, email = $email",
            )
            .bind(("id", id_str.clone()))
            .bind(("organization_id", input.organization_id.to_string()))
            .bind(("name", input.name))
            .bind(("email", input.email))
            .await
            .map_err(DbError::from)?;

        let mut result = result.check().map_err(DbError::from)?;

        let rows: Vec<TenantRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "tenant".into(),
            id: id_str,
        })?;

        row.try_into_tenant(id).map_err(Into::into)
    }

    async fn get_by_id(&self, id: Uuid) -> HavenResult<Tenant> {
        let id_str = id.to_string();

        let mut result = self
            .db
            .query("SELECT * FROM type::record('tenant', $id)")
            .bind(("id", id_str.clone()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<TenantRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "tenant".into(),
            id: id_str,
        })?;

        row.try_into_tenant(id).map_err(Into::into)
    }
}
