//! Maintenance request domain model.

use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::HavenError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MaintenanceStatus {
    Open,
    InProgress,
    Resolved,
    Cancelled,
}

impl MaintenanceStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            MaintenanceStatus::Open => "open",
            MaintenanceStatus::InProgress => "in_progress",
            MaintenanceStatus::Resolved => "resolved",
            MaintenanceStatus::Cancelled => "cancelled",
        }
    }
}

impl FromStr for MaintenanceStatus {
    type Err = HavenError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "open" => Ok(MaintenanceStatus::Open),
            "in_progress" => Ok(MaintenanceStatus::InProgress),
            "resolved" => Ok(MaintenanceStatus::Resolved),
            "cancelled" => Ok(MaintenanceStatus::Cancelled),
            other => Err(HavenError::Validation {
                message: format!("unknown maintenance status: {other}"),
            }),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MaintenanceRequest {
    pub id: Uuid,
    pub property_id: Uuid,
    pub unit_id: Option<Uuid>,
    pub summary: String,
    pub status: MaintenanceStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateMaintenanceRequest {
    pub property_id: Uuid,
    pub unit_id: Option<Uuid>,
    pub summary: String,
}
