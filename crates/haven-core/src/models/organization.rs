//! Organization domain model.
//!
//! Organizations are the tenancy boundary: every authorization decision
//! is scoped to exactly one organization, and cross-organization access
//! is always denied regardless of role.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// An organization owns all properties, teams, and memberships under it.
///
/// The agent owner is the user who created the organization and holds
/// implicit full authority over everything in it, bypassing role checks.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Organization {
    pub id: Uuid,
    /// Human-readable name.
    pub name: String,
    /// URL-safe unique identifier (e.g., `northwind-properties`).
    pub slug: String,
    /// User with unconditional authority over the organization.
    pub agent_owner_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Fields required to create a new organization.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateOrganization {
    pub name: String,
    pub slug: String,
    pub agent_owner_id: Uuid,
}
