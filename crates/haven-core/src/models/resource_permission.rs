//! Per-resource permission override.
//!
//! An explicit grant keyed by (team, resource type, resource id, action).
//! Presence of a row means granted; absence means not granted via this
//! mechanism. Rows are created and deleted only by explicit grant/revoke
//! calls.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::access::{Action, ResourceType};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResourcePermission {
    pub team_id: Uuid,
    pub resource_type: ResourceType,
    pub resource_id: Uuid,
    pub action: Action,
    pub created_at: DateTime<Utc>,
}
