//! Membership administration — role and team mutations.
//!
//! Roles and team assignment are changed by organization admins only.
//! A member can never change their own role: even if a compromised
//! handler forwards such a request, it is rejected here.

use haven_core::error::{HavenError, HavenResult};
use haven_core::models::member::{Member, MemberRole, MemberStatus, UpdateMember};
use haven_core::models::organization::Organization;
use haven_core::repository::{MemberRepository, TeamRepository};
use uuid::Uuid;

/// Administers memberships within one organization.
pub struct MemberService<M, T> {
    members: M,
    teams: T,
}

impl<M, T> MemberService<M, T>
where
    M: MemberRepository,
    T: TeamRepository,
{
    pub fn new(members: M, teams: T) -> Self {
        Self { members, teams }
    }

    /// Change a member's role.
    pub async fn change_role(
        &self,
        actor_user_id: Uuid,
        organization: &Organization,
        target_user_id: Uuid,
        new_role: MemberRole,
    ) -> HavenResult<Member> {
        let is_admin = self.actor_is_admin(actor_user_id, organization).await?;

        if actor_user_id == target_user_id && !is_admin {
            return Err(HavenError::Authorization {
                message: "You cannot change your own role".into(),
            });
        }
        if !is_admin {
            return Err(HavenError::Authorization {
                message: "Only organization admins can change member roles".into(),
            });
        }

        let target = self
            .members
            .get_by_user_and_org(target_user_id, organization.id)
            .await?;

        self.members
            .update(
                organization.id,
                target.id,
                UpdateMember {
                    role: Some(new_role),
                    ..Default::default()
                },
            )
            .await
    }

    /// Move a member to a team (or out of any team with `None`). The
    /// team must belong to the same organization as the membership.
    pub async fn assign_team(
        &self,
        actor_user_id: Uuid,
        organization: &Organization,
        target_user_id: Uuid,
        team_id: Option<Uuid>,
    ) -> HavenResult<Member> {
        if !self.actor_is_admin(actor_user_id, organization).await? {
            return Err(HavenError::Authorization {
                message: "Only organization admins can change team assignments".into(),
            });
        }

        if let Some(team_id) = team_id {
            let team = self.teams.get_by_id(team_id).await?;
            if team.organization_id != organization.id {
                return Err(HavenError::Validation {
                    message: format!(
                        "team {team_id} does not belong to organization {}",
                        organization.id,
                    ),
                });
            }
        }

        let target = self
            .members
            .get_by_user_and_org(target_user_id, organization.id)
            .await?;

        self.members
            .update(
                organization.id,
                target.id,
                UpdateMember {
                    team_id: Some(team_id),
                    ..Default::default()
                },
            )
            .await
    }

    async fn actor_is_admin(
        &self,
        actor_user_id: Uuid,
        organization: &Organization,
    ) -> HavenResult<bool> {
        if organization.agent_owner_id == actor_user_id {
            return Ok(true);
        }
        match self
            .members
            .get_by_user_and_org(actor_user_id, organization.id)
            .await
        {
            Ok(member) => {
                Ok(member.status == MemberStatus::Active && member.role.is_admin())
            }
            Err(HavenError::NotFound { .. }) => Ok(false),
            Err(e) => Err(e),
        }
    }
}
