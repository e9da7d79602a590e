//! Per-request authorization context assembly and pipeline guards.
//!
//! [`AuthContextService`] runs once per request, before any resource
//! access: session token → user → active organization → active team →
//! one [`PermissionEngine`] attached to the [`RequestContext`]. Context
//! resolution degrades rather than fails: a missing session yields an
//! anonymous context, and a stale organization or team reference is
//! logged and dropped. A team is only honored when it belongs to the
//! active organization, so a stale or forged team reference from
//! another organization can never leak cross-tenant access.

use haven_core::access::{Action, ResourceType, parse_permission};
use haven_core::error::{HavenError, HavenResult};
use haven_core::models::organization::Organization;
use haven_core::models::team::Team;
use haven_core::models::user::User;
use haven_core::repository::{
    MemberRepository, OrganizationRepository, ResourcePermissionRepository, SessionResolver,
    TeamPropertyRepository, TeamRepository,
};
use thiserror::Error;
use tracing::warn;

use crate::engine::PermissionEngine;
use crate::ownership::OwnershipResolver;

/// A guard rejection, carrying the HTTP-equivalent status the transport
/// should answer with.
#[derive(Debug, Error)]
pub enum GuardError {
    #[error("authentication required")]
    Unauthenticated,

    #[error("no active organization")]
    MissingOrganization,

    #[error("malformed permission spec: {0}")]
    MalformedPermission(String),

    #[error("You don't have permission to {action} this {resource_type}")]
    Forbidden {
        action: Action,
        resource_type: ResourceType,
    },

    /// A collaborator failed. Never mapped to a permission denial —
    /// that would mask outages as authorization decisions.
    #[error(transparent)]
    Internal(#[from] HavenError),
}

impl GuardError {
    pub fn status_code(&self) -> u16 {
        match self {
            GuardError::Unauthenticated => 401,
            GuardError::MissingOrganization => 400,
            GuardError::MalformedPermission(_) => 400,
            GuardError::Forbidden { .. } => 403,
            GuardError::Internal(_) => 500,
        }
    }
}

/// Everything downstream handlers need for one request.
pub struct RequestContext<M, A, P, O> {
    user: Option<User>,
    organization: Option<Organization>,
    team: Option<Team>,
    pub engine: PermissionEngine<M, A, P, O>,
}

impl<M, A, P, O> RequestContext<M, A, P, O>
where
    M: MemberRepository,
    A: TeamPropertyRepository,
    P: ResourcePermissionRepository,
    O: OwnershipResolver,
{
    pub fn user(&self) -> Option<&User> {
        self.user.as_ref()
    }

    pub fn organization(&self) -> Option<&Organization> {
        self.organization.as_ref()
    }

    pub fn team(&self) -> Option<&Team> {
        self.team.as_ref()
    }

    pub fn is_authenticated(&self) -> bool {
        self.user.is_some()
    }

    /// Proceed only for authenticated callers.
    pub fn require_auth(&self) -> Result<&User, GuardError> {
        self.user.as_ref().ok_or(GuardError::Unauthenticated)
    }

    /// Proceed only when an active organization was resolved.
    pub fn require_organization(&self) -> Result<&Organization, GuardError> {
        self.require_auth()?;
        self.organization
            .as_ref()
            .ok_or(GuardError::MissingOrganization)
    }

    /// Proceed only when the caller holds `"resource_type:action"`
    /// (coarse-grained — no specific resource id).
    pub async fn require_permission(&self, spec: &str) -> Result<(), GuardError> {
        let (resource_type, action) =
            parse_permission(spec).map_err(|e| GuardError::MalformedPermission(e.to_string()))?;

        match self.engine.can(resource_type, action, None).await {
            Ok(true) => Ok(()),
            Ok(false) => Err(GuardError::Forbidden {
                action,
                resource_type,
            }),
            Err(e) => Err(GuardError::Internal(e)),
        }
    }
}

/// Builds one [`RequestContext`] per request.
///
/// Constructed once at process start with every collaborator it needs,
/// then shared; each `context_for` call clones the repository handles
/// into a fresh engine.
pub struct AuthContextService<S, Org, T, M, A, P, O> {
    sessions: S,
    organizations: Org,
    teams: T,
    members: M,
    assignments: A,
    overrides: P,
    ownership: O,
}

impl<S, Org, T, M, A, P, O> AuthContextService<S, Org, T, M, A, P, O>
where
    S: SessionResolver,
    Org: OrganizationRepository,
    T: TeamRepository,
    M: MemberRepository + Clone,
    A: TeamPropertyRepository + Clone,
    P: ResourcePermissionRepository + Clone,
    O: OwnershipResolver + Clone,
{
    pub fn new(
        sessions: S,
        organizations: Org,
        teams: T,
        members: M,
        assignments: A,
        overrides: P,
        ownership: O,
    ) -> Self {
        Self {
            sessions,
            organizations,
            teams,
            members,
            assignments,
            overrides,
            ownership,
        }
    }

    /// Resolve the request's authorization context from its session
    /// token. `None`, an unknown token, and an expired session all
    /// yield an anonymous context — downstream guards decide whether
    /// anonymous access is permitted.
    pub async fn context_for(
        &self,
        token: Option<&str>,
    ) -> HavenResult<RequestContext<M, A, P, O>> {
        let session = match token {
            Some(token) => self.sessions.resolve_session(token).await?,
            None => None,
        };

        let Some(session) = session else {
            return Ok(self.anonymous());
        };

        let user = session.user;

        // Resolve the active organization. A stale reference is a
        // degraded context, not a failed request.
        let organization = match session.organization_id {
            Some(organization_id) => {
                match self.organizations.get_by_id(organization_id).await {
                    Ok(organization) => Some(organization),
                    Err(HavenError::NotFound { .. }) => {
                        warn!(
                            user_id = %user.id,
                            organization_id = %organization_id,
                            "Active organization not found; proceeding without one"
                        );
                        None
                    }
                    Err(e) => return Err(e),
                }
            }
            None => None,
        };

        // Resolve the active team, honoring it only when it belongs to
        // the active organization.
        let team = match (&organization, session.team_id) {
            (Some(organization), Some(team_id)) => {
                match self.teams.get_by_id(team_id).await {
                    Ok(team) if team.organization_id == organization.id => Some(team),
                    Ok(team) => {
                        warn!(
                            user_id = %user.id,
                            team_id = %team.id,
                            organization_id = %organization.id,
                            "Active team belongs to a different organization; ignoring"
                        );
                        None
                    }
                    Err(HavenError::NotFound { .. }) => {
                        warn!(
                            user_id = %user.id,
                            team_id = %team_id,
                            "Active team not found; proceeding without one"
                        );
                        None
                    }
                    Err(e) => return Err(e),
                }
            }
            _ => None,
        };

        let engine = PermissionEngine::new(
            Some(user.clone()),
            organization.clone(),
            team.clone(),
            self.members.clone(),
            self.assignments.clone(),
            self.overrides.clone(),
            self.ownership.clone(),
        );

        Ok(RequestContext {
            user: Some(user),
            organization,
            team,
            engine,
        })
    }

    fn anonymous(&self) -> RequestContext<M, A, P, O> {
        let engine = PermissionEngine::new(
            None,
            None,
            None,
            self.members.clone(),
            self.assignments.clone(),
            self.overrides.clone(),
            self.ownership.clone(),
        );
        RequestContext {
            user: None,
            organization: None,
            team: None,
            engine,
        }
    }
}
