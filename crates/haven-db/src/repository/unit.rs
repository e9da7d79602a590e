//! SurrealDB implementation of [`UnitRepository`].

use chrono::{DateTime, Utc};
use haven_core::error::HavenResult;
use haven_core::models::unit::{CreateUnit, Unit};
use haven_core::repository::UnitRepository;
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use uuid::Uuid;

use crate::error::DbError;
use crate::repository::parse_uuid;

#[derive(Debug, SurrealValue)]
struct UnitRow {
    property_id: String,
    label: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl UnitRow {
    fn try_into_unit(self, id: Uuid) -> Result<Unit, DbError> {
        let property_id = parse_uuid("property", &self.property_id)?;
        Ok(Unit {
            id,
            property_id,
            label: self.label,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

/// SurrealDB implementation of the Unit repository.
#[derive(Clone)]
pub struct SurrealUnitRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealUnitRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }
}

impl<C: Connection> UnitRepository for SurrealUnitRepository<C> {
    async fn create(&self, input: CreateUnit) -> HavenResult<Unit> {
        let id = Uuid::new_v4();
        let id_str = id.to_string();

        let result = self
            .db
            .query(
                "CREATE type::record('unit', $id) SET \
                 property_id = $property_id, label = $label",
            )
            .bind(("id", id_str.clone()))
            .bind(("property_id", input.property_id.to_string()))
            .bind(("label", input.label))
            .await
            .map_err(DbError::from)?;

        let mut result = result.check().map_err(DbError::from)?;

        let rows: Vec<UnitRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "unit".into(),
            id: id_str,
        })?;

        row.try_into_unit(id).map_err(Into::into)
    }

    async fn get_by_id(&self, id: Uuid) -> HavenResult<Unit> {
        let id_str = id.to_string();

        let mut result = self
            .db
            .query("SELECT * FROM type::record('unit', $id)")
            .bind(("id", id_str.clone()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<UnitRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "unit".into(),
            id: id_str,
        })?;

        row.try_into_unit(id).map_err(Into::into)
    }
}
