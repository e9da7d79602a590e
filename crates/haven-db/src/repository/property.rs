//! SurrealDB implementation of [`PropertyRepository`].

use chrono::{DateTime, Utc};
use haven_core::error::HavenResult;
use haven_core::models::property::{CreateProperty, Property};
use haven_core::repository::PropertyRepository;
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use uuid::Uuid;

use crate::error::DbError;
use crate::repository::parse_uuid;

#[derive(Debug, SurrealValue)]
struct PropertyRow {
    organization_id: String,
    name: String,
    address: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl PropertyRow {
    fn try_into_property(self, id: Uuid) -> Result<Property, DbError> {
        let organization_id = parse_uuid("organization", &self.organization_id)?;
        Ok(Property {
            id,
            organization_id,
            name: self.name,
            address: self.address,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

#[derive(Debug, SurrealValue)]
struct PropertyRowWithId {
    record_id: String,
    organization_id: String,
    name: String,
    address: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

/// SurrealDB implementation of the Property repository.
#[derive(Clone)]
pub struct SurrealPropertyRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealPropertyRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }
}

impl<C: Connection> PropertyRepository for SurrealPropertyRepository<C> {
    async fn create(&self, input: CreateProperty) -> HavenResult<Property> {
        let id = Uuid::new_v4();
        let id_str = id.to_string();

        let result = self
            .db
            .query(
                "CREATE type::record('property', $id) SET \
                 organization_id = $organization_id, \
                 name = $name, address = $address",
            )
            .bind(("id", id_str.clone()))
            .bind(("organization_id", input.organization_id.to_string()))
            .bind(("name", input.name))
            .bind(("address", input.address))
            .await
            .map_err(DbError::from)?;

        let mut result = result.check().map_err(DbError::from)?;

        let rows: Vec<PropertyRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "property".into(),
            id: id_str,
        })?;

        row.try_into_property(id).map_err(Into::into)
    }

    async fn get_by_id(&self, id: Uuid) -> HavenResult<Property> {
        let id_str = id.to_string();

        let mut result = self
            .db
            .query("SELECT * FROM type::record('property', $id)")
            .bind(("id", id_str.clone()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<PropertyRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "property".into(),
            id: id_str,
        })?;

        row.try_into_property(id).map_err(Into::into)
    }

    async fn list_by_organization(&self, organization_id: Uuid) -> HavenResult<Vec<Property>> {
        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * FROM property \
                 WHERE organization_id = $organization_id \
                 ORDER BY created_at ASC",
            )
            .bind(("organization_id", organization_id.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<PropertyRowWithId> = result.take(0).map_err(DbError::from)?;

        rows.into_iter()
            .map(|row| {
                let id = parse_uuid("property", &row.record_id)?;
                PropertyRow {
                    organization_id: row.organization_id,
                    name: row.name,
                    address: row.address,
                    created_at: row.created_at,
                    updated_at: row.updated_at,
                }
                .try_into_property(id)
            })
            .collect::<Result<Vec<_>, DbError>>()
            .map_err(Into::into)
    }
}
