//! Member domain model — the User × Organization join.

use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::HavenError;

/// Per-organization role of a member. Roles are not global: the same
/// user can be staff in one organization and admin in another.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MemberRole {
    Owner,
    Admin,
    Staff,
    PropertyOwner,
    Caretaker,
    Tenant,
    Member,
}

impl MemberRole {
    /// All roles, for exhaustive table audits.
    pub const ALL: [MemberRole; 7] = [
        MemberRole::Owner,
        MemberRole::Admin,
        MemberRole::Staff,
        MemberRole::PropertyOwner,
        MemberRole::Caretaker,
        MemberRole::Tenant,
        MemberRole::Member,
    ];

    /// Admins and owners pass every role-gated check in their
    /// organization.
    pub fn is_admin(self) -> bool {
        matches!(self, MemberRole::Owner | MemberRole::Admin)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            MemberRole::Owner => "owner",
            MemberRole::Admin => "admin",
            MemberRole::Staff => "staff",
            MemberRole::PropertyOwner => "property_owner",
            MemberRole::Caretaker => "caretaker",
            MemberRole::Tenant => "tenant",
            MemberRole::Member => "member",
        }
    }
}

impl FromStr for MemberRole {
    type Err = HavenError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "owner" => Ok(MemberRole::Owner),
            "admin" => Ok(MemberRole::Admin),
            "staff" => Ok(MemberRole::Staff),
            "property_owner" => Ok(MemberRole::PropertyOwner),
            "caretaker" => Ok(MemberRole::Caretaker),
            "tenant" => Ok(MemberRole::Tenant),
            "member" => Ok(MemberRole::Member),
            other => Err(HavenError::Validation {
                message: format!("unknown member role: {other}"),
            }),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MemberStatus {
    Active,
    Inactive,
    Pending,
    Rejected,
}

impl MemberStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            MemberStatus::Active => "active",
            MemberStatus::Inactive => "inactive",
            MemberStatus::Pending => "pending",
            MemberStatus::Rejected => "rejected",
        }
    }
}

impl FromStr for MemberStatus {
    type Err = HavenError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "active" => Ok(MemberStatus::Active),
            "inactive" => Ok(MemberStatus::Inactive),
            "pending" => Ok(MemberStatus::Pending),
            "rejected" => Ok(MemberStatus::Rejected),
            other => Err(HavenError::Validation {
                message: format!("unknown member status: {other}"),
            }),
        }
    }
}

/// Membership of a user in an organization.
///
/// Invariant: at most one member row per (user_id, organization_id).
/// A member belongs to at most one team at a time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Member {
    pub id: Uuid,
    pub user_id: Uuid,
    pub organization_id: Uuid,
    pub role: MemberRole,
    pub team_id: Option<Uuid>,
    pub status: MemberStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateMember {
    pub user_id: Uuid,
    pub organization_id: Uuid,
    pub role: MemberRole,
    pub team_id: Option<Uuid>,
    pub status: MemberStatus,
}

/// Fields an organization admin can change on a membership.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateMember {
    pub role: Option<MemberRole>,
    /// `Some(Some(id))` = move to team, `Some(None)` = remove from team,
    /// `None` = no change.
    pub team_id: Option<Option<Uuid>>,
    pub status: Option<MemberStatus>,
}
