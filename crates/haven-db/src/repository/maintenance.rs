//! SurrealDB implementation of [`MaintenanceRequestRepository`].

use chrono::{DateTime, Utc};
use haven_core::error::HavenResult;
use haven_core::models::maintenance::{
    CreateMaintenanceRequest, MaintenanceRequest, MaintenanceStatus,
};
use haven_core::repository::MaintenanceRequestRepository;
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use uuid::Uuid;

use crate::error::DbError;
use crate::repository::parse_uuid;

#[derive(Debug, SurrealValue)]
struct MaintenanceRow {
    property_id: String,
    unit_id: Option<String>,
    summary: String,
    status: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl MaintenanceRow {
    fn try_into_request(self, id: Uuid) -> Result<MaintenanceRequest, DbError> {
        let property_id = parse_uuid("property", &self.property_id)?;
        let unit_id = self
            .unit_id
            .as_deref()
            .map(|u| parse_uuid("unit", u))
            .transpose()?;
        let status: MaintenanceStatus = self
            .status
            .parse()
            .map_err(|_| DbError::Decode(format!("invalid maintenance status: {}", self.status)))?;
        Ok(MaintenanceRequest {
            id,
            property_id,
            unit_id,
            summary: self.summary,
            status,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

/// SurrealDB implementation of the MaintenanceRequest repository.
#[derive(Clone)]
pub struct SurrealMaintenanceRequestRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealMaintenanceRequestRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }
}

impl<C: Connection> MaintenanceRequestRepository for SurrealMaintenanceRequestRepository<C> {
    async fn create(&self, input: CreateMaintenanceRequest) -> HavenResult<MaintenanceRequest> {
        let id = Uuid::new_v4();
        let id_str = id.to_string();

        // New requests always start out open.
        let result = self
            .db
            .query(
                "CREATE type::record('maintenance_request', $id) SET \
                 property_id = $property_id, unit_id = $unit_id, \
                 summary = $summary, status = 'open'",
            )
            .bind(("id", id_str.clone()))
            .bind(("property_id", input.property_id.to_string()))
            .bind(("unit_id", input.unit_id.map(|u| u.to_string())))
            .bind(("summary", input.summary))
            .await
            .map_err(DbError::from)?;

        let mut result = result.check().map_err(DbError::from)?;

        let rows: Vec<MaintenanceRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "maintenance_request".into(),
            id: id_str,
        })?;

        row.try_into_request(id).map_err(Into::into)
    }

    async fn get_by_id(&self, id: Uuid) -> HavenResult<MaintenanceRequest> {
        let id_str = id.to_string();

        let mut result = self
            .db
            .query("SELECT * FROM type::record('maintenance_request', $id)")
            .bind(("id", id_str.clone()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<MaintenanceRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "maintenance_request".into(),
            id: id_str,
        })?;

        row.try_into_request(id).map_err(Into::into)
    }
}
