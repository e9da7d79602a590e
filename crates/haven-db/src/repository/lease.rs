//! SurrealDB implementation of [`LeaseRepository`].
//!
//! Lease dates are calendar dates, stored as `YYYY-MM-DD` strings.

use chrono::{DateTime, NaiveDate, Utc};
use haven_core::error::HavenResult;
use haven_core::models::lease::{CreateLease, Lease};
use haven_core::repository::LeaseRepository;
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use uuid::Uuid;

use crate::error::DbError;
use crate::repository::parse_uuid;

const DATE_FORMAT: &str = "%Y-%m-%d";

#[derive(Debug, SurrealValue)]
struct LeaseRow {
    property_id: String,
    unit_id: Option<String>,
    tenant_id: String,
    start_date: String,
    end_date: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

fn parse_date(field: &'static str, value: &str) -> Result<NaiveDate, DbError> {
    NaiveDate::parse_from_str(value, DATE_FORMAT)
        .map_err(|e| DbError::Decode(format!("invalid {field} date: {e}")))
}

impl LeaseRow {
    fn try_into_lease(self, id: Uuid) -> Result<Lease, DbError> {
        let property_id = parse_uuid("property", &self.property_id)?;
        let unit_id = self
            .unit_id
            .as_deref()
            .map(|u| parse_uuid("unit", u))
            .transpose()?;
        let tenant_id = parse_uuid("tenant", &self.tenant_id)?;
        let start_date = parse_date("start", &self.start_date)?;
        let end_date = self
            .end_date
            .as_deref()
            .map(|d| parse_date("end", d))
            .transpose()?;
        Ok(Lease {
            id,
            property_id,
            unit_id,
            tenant_id,
            start_date,
            end_date,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

#[derive(Debug, SurrealValue)]
struct LeaseRowWithId {
    record_id: String,
    property_id: String,
    unit_id: Option<String>,
    tenant_id: String,
    start_date: String,
    end_date: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

/// SurrealDB implementation of the Lease repository.
#[derive(Clone)]
pub struct SurrealLeaseRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealLeaseRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }
}

impl<C: Connection> LeaseRepository for SurrealLeaseRepository<C> {
    async fn create(&self, input: CreateLease) -> HavenResult<Lease> {
        let id = Uuid::new_v4();
        let id_str = id.to_string();

        let result = self
            .db
            .query(
                "CREATE type::record('lease', $id) SET \
                 property_id = $property_id, unit_id = $unit_id, \
                 tenant_id = $tenant_id, \
                 start_date = $start_date, end_date = $end_date",
            )
            .bind(("id", id_str.clone()))
            .bind(("property_id", input.property_id.to_string()))
            .bind(("unit_id", input.unit_id.map(|u| u.to_string())))
            .bind(("tenant_id", input.tenant_id.to_string()))
            .bind(("start_date", input.start_date.format(DATE_FORMAT).to_string()))
            .bind((
                "end_date",
                input.end_date.map(|d| d.format(DATE_FORMAT).to_string()),
            ))
            .await
            .map_err(DbError::from)?;

        let mut result = result.check().map_err(DbError::from)?;

        let rows: Vec<LeaseRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "lease".into(),
            id: id_str,
        })?;

        row.try_into_lease(id).map_err(Into::into)
    }

    async fn get_by_id(&self, id: Uuid) -> HavenResult<Lease> {
        let id_str = id.to_string();

        let mut result = self
            .db
            .query("SELECT * FROM type::record('lease', $id)")
            .bind(("id", id_str.clone()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<LeaseRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "lease".into(),
            id: id_str,
        })?;

        row.try_into_lease(id).map_err(Into::into)
    }

    async fn list_by_tenant(&self, tenant_id: Uuid) -> HavenResult<Vec<Lease>> {
        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * FROM lease \
                 WHERE tenant_id = $tenant_id",
            )
            .bind(("tenant_id", tenant_id.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<LeaseRowWithId> = result.take(0).map_err(DbError::from)?;

        rows.into_iter()
            .map(|row| {
                let id = parse_uuid("lease", &row.record_id)?;
                LeaseRow {
                    property_id: row.property_id,
                    unit_id: row.unit_id,
                    tenant_id: row.tenant_id,
                    start_date: row.start_date,
                    end_date: row.end_date,
                    created_at: row.created_at,
                    updated_at: row.updated_at,
                }
                .try_into_lease(id)
            })
            .collect::<Result<Vec<_>, DbError>>()
            .map_err(Into::into)
    }
}
