//! Tenant domain model — a renter.
//!
//! A tenant has no direct property association; it reaches properties
//! transitively through its leases, possibly several at once.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Tenant {
    pub id: Uuid,
    pub organization_id: Uuid,
    pub name: String,
    pub email: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateTenant {
    pub organization_id: Uuid,
    pub name: String,
    pub email: String,
}
