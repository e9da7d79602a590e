//! The permission engine — the per-request authorization decision core.
//!
//! One engine is constructed per inbound request, bound to that
//! request's (user, organization, team) triple, and discarded with the
//! request. Decisions and the member lookup are memoized for the
//! engine's lifetime only.

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

use haven_core::access::{Action, ResourceType};
use haven_core::error::{HavenError, HavenResult};
use haven_core::models::member::{Member, MemberStatus};
use haven_core::models::organization::Organization;
use haven_core::models::team::Team;
use haven_core::models::user::User;
use haven_core::repository::{
    MemberRepository, ResourcePermissionRepository, TeamPropertyRepository,
};
use tokio::sync::OnceCell;
use uuid::Uuid;

use crate::ownership::{Ownership, OwnershipResolver};
use crate::table;

/// Which properties a caller may reach.
///
/// `All` signals "unrestricted" — the engine does not enumerate the
/// organization's properties itself; the caller queries the full set
/// from the property store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PropertyScope {
    All,
    Ids(HashSet<Uuid>),
}

type DecisionKey = (ResourceType, Action, Option<Uuid>);

/// Per-request authorization decision engine.
pub struct PermissionEngine<M, A, P, O> {
    user: Option<User>,
    organization: Option<Organization>,
    team: Option<Team>,
    members: M,
    assignments: A,
    overrides: P,
    ownership: O,
    member: OnceCell<Option<Member>>,
    decisions: Mutex<HashMap<DecisionKey, bool>>,
}

impl<M, A, P, O> PermissionEngine<M, A, P, O>
where
    M: MemberRepository,
    A: TeamPropertyRepository,
    P: ResourcePermissionRepository,
    O: OwnershipResolver,
{
    pub fn new(
        user: Option<User>,
        organization: Option<Organization>,
        team: Option<Team>,
        members: M,
        assignments: A,
        overrides: P,
        ownership: O,
    ) -> Self {
        Self {
            user,
            organization,
            team,
            members,
            assignments,
            overrides,
            ownership,
            member: OnceCell::new(),
            decisions: Mutex::new(HashMap::new()),
        }
    }

    pub fn user(&self) -> Option<&User> {
        self.user.as_ref()
    }

    pub fn organization(&self) -> Option<&Organization> {
        self.organization.as_ref()
    }

    pub fn team(&self) -> Option<&Team> {
        self.team.as_ref()
    }

    /// May the bound user perform `action` on `resource_type`
    /// (optionally on one specific resource)?
    ///
    /// A deny is a normal `false`, never an error; collaborator
    /// failures propagate unchanged so outages are not masked as
    /// authorization decisions.
    pub async fn can(
        &self,
        resource_type: ResourceType,
        action: Action,
        resource_id: Option<Uuid>,
    ) -> HavenResult<bool> {
        let key = (resource_type, action, resource_id);
        if let Some(cached) = self.cached(&key) {
            return Ok(cached);
        }

        let decision = self.decide(resource_type, action, resource_id).await?;

        self.decisions
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .insert(key, decision);

        Ok(decision)
    }

    /// Like [`can`](Self::can), but a deny becomes an authorization
    /// error. This is the form used immediately before a mutating
    /// operation; `can` alone is for filtering, where silent exclusion
    /// is correct.
    pub async fn assert_can(
        &self,
        resource_type: ResourceType,
        action: Action,
        resource_id: Option<Uuid>,
    ) -> HavenResult<()> {
        if self.can(resource_type, action, resource_id).await? {
            Ok(())
        } else {
            Err(HavenError::permission_denied(action, resource_type))
        }
    }

    /// The property ids the bound user may reach, for list-level
    /// filtering.
    pub async fn accessible_property_ids(&self) -> HavenResult<PropertyScope> {
        let (Some(user), Some(organization)) = (&self.user, &self.organization) else {
            return Ok(PropertyScope::Ids(HashSet::new()));
        };

        if organization.agent_owner_id == user.id {
            return Ok(PropertyScope::All);
        }

        match self.member(user.id, organization.id).await? {
            Some(member) if member.status == MemberStatus::Active => {
                if member.role.is_admin() {
                    Ok(PropertyScope::All)
                } else if let Some(team_id) = member.team_id {
                    let ids = self.assignments.property_ids_for_team(team_id).await?;
                    Ok(PropertyScope::Ids(ids))
                } else {
                    Ok(PropertyScope::Ids(HashSet::new()))
                }
            }
            _ => Ok(PropertyScope::Ids(HashSet::new())),
        }
    }

    fn cached(&self, key: &DecisionKey) -> Option<bool> {
        self.decisions
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .get(key)
            .copied()
    }

    /// The bound user's membership in the bound organization, looked up
    /// once per engine lifetime.
    async fn member(&self, user_id: Uuid, organization_id: Uuid) -> HavenResult<Option<&Member>> {
        let member = self
            .member
            .get_or_try_init(|| async {
                match self
                    .members
                    .get_by_user_and_org(user_id, organization_id)
                    .await
                {
                    Ok(member) => Ok(Some(member)),
                    Err(HavenError::NotFound { .. }) => Ok(None),
                    Err(e) => Err(e),
                }
            })
            .await?;
        Ok(member.as_ref())
    }

    /// The decision algorithm. The step order is load-bearing: the role
    /// table gates coarse capability, team assignment gates the
    /// property family, and explicit overrides are the finest-grained
    /// fallback, reached only when no structural team↔property
    /// relationship exists.
    async fn decide(
        &self,
        resource_type: ResourceType,
        action: Action,
        resource_id: Option<Uuid>,
    ) -> HavenResult<bool> {
        // 1. Anonymous or organization-less contexts can do nothing.
        let (Some(user), Some(organization)) = (&self.user, &self.organization) else {
            return Ok(false);
        };

        // A resource that provably belongs to another organization is
        // denied no matter who asks — before any role shortcut.
        let mut ownership: Option<Ownership> = None;
        if let Some(id) = resource_id {
            if resource_type == ResourceType::Property || resource_type.is_property_scoped() {
                let resolved = self.ownership.resolve(resource_type, id).await?;
                if let Some(owner) = resolved.organization_id {
                    if owner != organization.id {
                        return Ok(false);
                    }
                }
                ownership = Some(resolved);
            }
        }

        // 2. The agent owner has unconditional authority.
        if organization.agent_owner_id == user.id {
            return Ok(true);
        }

        // 3. Resolve the member's role; admins and owners pass every
        //    check in their organization. Only active memberships count.
        let role = match self.member(user.id, organization.id).await? {
            Some(member) if member.status == MemberStatus::Active => Some(member.role),
            _ => None,
        };
        let Some(role) = role else {
            return Ok(false);
        };
        if role.is_admin() {
            return Ok(true);
        }

        // 4. Role gate: the table must grant the action on this
        //    resource type at all, regardless of which resource it is.
        if !table::is_allowed(role, resource_type, action) {
            return Ok(false);
        }

        // 5. Coarse-grained check: no specific resource to scope
        //    against, so the role grant is the answer. List call sites
        //    narrow further via accessible_property_ids.
        let Some(resource_id) = resource_id else {
            return Ok(true);
        };

        let team_id = self
            .member(user.id, organization.id)
            .await?
            .and_then(|m| m.team_id);

        let Some(team_id) = team_id else {
            // 9. No team to scope against: the role grant stands.
            return Ok(true);
        };

        // 6. Properties are gated by direct team assignment.
        if resource_type == ResourceType::Property {
            return self.assignments.is_assigned(team_id, resource_id).await;
        }

        // 7. Property-scoped resources inherit the assignment of any
        //    owning property.
        if resource_type.is_property_scoped() {
            let resolved = match ownership {
                Some(o) => o,
                None => self.ownership.resolve(resource_type, resource_id).await?,
            };
            if !resolved.property_ids.is_empty() {
                for property_id in &resolved.property_ids {
                    if self.assignments.is_assigned(team_id, *property_id).await? {
                        return Ok(true);
                    }
                }
                return Ok(false);
            }
            // Unresolvable ownership: fall through to the override
            // store rather than denying outright.
        }

        // 8. Last resort: an explicit per-resource grant.
        self.overrides
            .has_override(team_id, resource_type, action, resource_id)
            .await
    }
}
