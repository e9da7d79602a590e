//! Repository trait definitions for data access abstraction.
//!
//! All repository operations are async. The authorization core never
//! creates or mutates domain resources (properties, units, leases, …);
//! it only reads enough of them to resolve ownership. The create
//! operations below exist for the services that own those entities and
//! for test fixtures.

use std::collections::HashSet;

use uuid::Uuid;

use crate::error::HavenResult;
use crate::access::{Action, ResourceType};
use crate::models::{
    lease::{CreateLease, Lease},
    maintenance::{CreateMaintenanceRequest, MaintenanceRequest},
    member::{CreateMember, Member, UpdateMember},
    organization::{CreateOrganization, Organization},
    property::{CreateProperty, Property},
    session::{CreateSession, Session, SessionData},
    team::{CreateTeam, Team},
    tenant::{CreateTenant, Tenant},
    unit::{CreateUnit, Unit},
    user::{CreateUser, User},
};

/// Outcome of a team-property `assign` call.
///
/// `assign` has full-replace semantics, so a repeat call with the same
/// set reports zero adds and zero removes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AssignmentDiff {
    pub added: u64,
    pub removed: u64,
}

// ---------------------------------------------------------------------------
// Identity & tenancy
// ---------------------------------------------------------------------------

pub trait UserRepository: Send + Sync {
    fn create(&self, input: CreateUser) -> impl Future<Output = HavenResult<User>> + Send;
    fn get_by_id(&self, id: Uuid) -> impl Future<Output = HavenResult<User>> + Send;
}

pub trait OrganizationRepository: Send + Sync {
    fn create(
        &self,
        input: CreateOrganization,
    ) -> impl Future<Output = HavenResult<Organization>> + Send;
    fn get_by_id(&self, id: Uuid) -> impl Future<Output = HavenResult<Organization>> + Send;
}

pub trait MemberRepository: Send + Sync {
    fn create(&self, input: CreateMember) -> impl Future<Output = HavenResult<Member>> + Send;

    /// The unique membership of a user in an organization, if any.
    fn get_by_user_and_org(
        &self,
        user_id: Uuid,
        organization_id: Uuid,
    ) -> impl Future<Output = HavenResult<Member>> + Send;

    fn update(
        &self,
        organization_id: Uuid,
        id: Uuid,
        input: UpdateMember,
    ) -> impl Future<Output = HavenResult<Member>> + Send;
}

pub trait TeamRepository: Send + Sync {
    fn create(&self, input: CreateTeam) -> impl Future<Output = HavenResult<Team>> + Send;
    fn get_by_id(&self, id: Uuid) -> impl Future<Output = HavenResult<Team>> + Send;
    fn list_by_organization(
        &self,
        organization_id: Uuid,
    ) -> impl Future<Output = HavenResult<Vec<Team>>> + Send;
}

// ---------------------------------------------------------------------------
// Team-scoped access state
// ---------------------------------------------------------------------------

pub trait TeamPropertyRepository: Send + Sync {
    /// Is the property assigned to the team?
    fn is_assigned(
        &self,
        team_id: Uuid,
        property_id: Uuid,
    ) -> impl Future<Output = HavenResult<bool>> + Send;

    fn property_ids_for_team(
        &self,
        team_id: Uuid,
    ) -> impl Future<Output = HavenResult<HashSet<Uuid>>> + Send;

    /// Replace the team's assigned property set with `property_ids`.
    ///
    /// Diff-based: properties missing from the new set are removed,
    /// new ones are added, and the whole diff commits atomically.
    /// Every property must belong to the team's organization; otherwise
    /// the call fails with a validation error and nothing is applied.
    fn assign(
        &self,
        team_id: Uuid,
        property_ids: HashSet<Uuid>,
    ) -> impl Future<Output = HavenResult<AssignmentDiff>> + Send;
}

pub trait ResourcePermissionRepository: Send + Sync {
    fn has_override(
        &self,
        team_id: Uuid,
        resource_type: ResourceType,
        action: Action,
        resource_id: Uuid,
    ) -> impl Future<Output = HavenResult<bool>> + Send;

    /// Upsert a grant. Granting an already-granted permission is a
    /// no-op success.
    fn grant(
        &self,
        team_id: Uuid,
        resource_type: ResourceType,
        action: Action,
        resource_id: Uuid,
    ) -> impl Future<Output = HavenResult<()>> + Send;

    /// Delete a grant. Revoking an ungranted permission is a no-op
    /// success, not an error.
    fn revoke(
        &self,
        team_id: Uuid,
        resource_type: ResourceType,
        action: Action,
        resource_id: Uuid,
    ) -> impl Future<Output = HavenResult<()>> + Send;
}

// ---------------------------------------------------------------------------
// Domain resources (ownership reads)
// ---------------------------------------------------------------------------

pub trait PropertyRepository: Send + Sync {
    fn create(&self, input: CreateProperty) -> impl Future<Output = HavenResult<Property>> + Send;
    fn get_by_id(&self, id: Uuid) -> impl Future<Output = HavenResult<Property>> + Send;
    fn list_by_organization(
        &self,
        organization_id: Uuid,
    ) -> impl Future<Output = HavenResult<Vec<Property>>> + Send;
}

pub trait UnitRepository: Send + Sync {
    fn create(&self, input: CreateUnit) -> impl Future<Output = HavenResult<Unit>> + Send;
    fn get_by_id(&self, id: Uuid) -> impl Future<Output = HavenResult<Unit>> + Send;
}

pub trait LeaseRepository: Send + Sync {
    fn create(&self, input: CreateLease) -> impl Future<Output = HavenResult<Lease>> + Send;
    fn get_by_id(&self, id: Uuid) -> impl Future<Output = HavenResult<Lease>> + Send;

    /// All leases held by a tenant — a tenant may reach several
    /// properties at once.
    fn list_by_tenant(
        &self,
        tenant_id: Uuid,
    ) -> impl Future<Output = HavenResult<Vec<Lease>>> + Send;
}

pub trait TenantRepository: Send + Sync {
    fn create(&self, input: CreateTenant) -> impl Future<Output = HavenResult<Tenant>> + Send;
    fn get_by_id(&self, id: Uuid) -> impl Future<Output = HavenResult<Tenant>> + Send;
}

pub trait MaintenanceRequestRepository: Send + Sync {
    fn create(
        &self,
        input: CreateMaintenanceRequest,
    ) -> impl Future<Output = HavenResult<MaintenanceRequest>> + Send;
    fn get_by_id(&self, id: Uuid) -> impl Future<Output = HavenResult<MaintenanceRequest>> + Send;
}

// ---------------------------------------------------------------------------
// Sessions
// ---------------------------------------------------------------------------

pub trait SessionRepository: Send + Sync {
    fn create(&self, input: CreateSession) -> impl Future<Output = HavenResult<Session>> + Send;
    fn invalidate(&self, id: Uuid) -> impl Future<Output = HavenResult<()>> + Send;
}

/// The identity collaborator: resolves an opaque session token to the
/// session's user and active organization/team context. `None` means
/// no valid session — never an error.
pub trait SessionResolver: Send + Sync {
    fn resolve_session(
        &self,
        token: &str,
    ) -> impl Future<Output = HavenResult<Option<SessionData>>> + Send;
}
