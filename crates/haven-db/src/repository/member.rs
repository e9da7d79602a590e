//! SurrealDB implementation of [`MemberRepository`].

use chrono::{DateTime, Utc};
use haven_core::error::HavenResult;
use haven_core::models::member::{CreateMember, Member, MemberRole, MemberStatus, UpdateMember};
use haven_core::repository::MemberRepository;
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use uuid::Uuid;

use crate::error::DbError;
use crate::repository::parse_uuid;

#[derive(Debug, SurrealValue)]
struct MemberRow {
    user_id: String,
    organization_id: String,
    role: String,
    team_id: Option<String>,
    status: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl MemberRow {
    fn try_into_member(self, id: Uuid) -> Result<Member, DbError> {
        let user_id = parse_uuid("user", &self.user_id)?;
        let organization_id = parse_uuid("organization", &self.organization_id)?;
        let team_id = self
            .team_id
            .as_deref()
            .map(|t| parse_uuid("team", t))
            .transpose()?;
        let role: MemberRole = self
            .role
            .parse()
            .map_err(|_| DbError::Decode(format!("invalid member role: {}", self.role)))?;
        let status: MemberStatus = self
            .status
            .parse()
            .map_err(|_| DbError::Decode(format!("invalid member status: {}", self.status)))?;
        Ok(Member {
            id,
            user_id,
            organization_id,
            role,
            team_id,
            status,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

#[derive(Debug, SurrealValue)]
struct MemberRowWithId {
    record_id: String,
    user_id: String,
    organization_id: String,
    role: String,
    team_id: Option<String>,
    status: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl MemberRowWithId {
    fn try_into_member(self) -> Result<Member, DbError> {
        let id = parse_uuid("member", &self.record_id)?;
        MemberRow {
            user_id: self.user_id,
            organization_id: self.organization_id,
            role: self.role,
            team_id: self.team_id,
            status: self.status,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
        .try_into_member(id)
    }
}

/// SurrealDB implementation of the Member repository.
#[derive(Clone)]
pub struct SurrealMemberRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealMemberRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }
}

impl<C: Connection> MemberRepository for SurrealMemberRepository<C> {
    async fn create(&self, input: CreateMember) -> HavenResult<Member> {
        let id = Uuid::new_v4();
        let id_str = id.to_string();

        let result = self
            .db
            .query(
                "CREATE type::record('member', $id) SET \
                 user_id = $user_id, \
                 organization_id = $organization_id, \
                 role = $role, team_id = $team_id, status = $status",
            )
            .bind(("id", id_str.clone()))
            .bind(("user_id", input.user_id.to_string()))
            .bind(("organization_id", input.organization_id.to_string()))
            .bind(("role", input.role.as_str()))
            .bind(("team_id", input.team_id.map(|t| t.to_string())))
            .bind(("status", input.status.as_str()))
            .await
            .map_err(DbError::from)?;

        let mut result = result.check().map_err(DbError::from)?;

        let rows: Vec<MemberRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "member".into(),
            id: id_str,
        })?;

        row.try_into_member(id).map_err(Into::into)
    }

    async fn get_by_user_and_org(
        &self,
        user_id: Uuid,
        organization_id: Uuid,
    ) -> HavenResult<Member> {
        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * FROM member \
                 WHERE user_id = $user_id \
                 AND organization_id = $organization_id",
            )
            .bind(("user_id", user_id.to_string()))
            .bind(("organization_id", organization_id.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<MemberRowWithId> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "member".into(),
            id: format!("{user_id}@{organization_id}"),
        })?;

        row.try_into_member().map_err(Into::into)
    }

    async fn update(
        &self,
        organization_id: Uuid,
        id: Uuid,
        input: UpdateMember,
    ) -> HavenResult<Member> {
        let id_str = id.to_string();

        let mut sets = Vec::new();
        if input.role.is_some() {
            sets.push("role = $role");
        }
        if input.team_id.is_some() {
            sets.push("team_id = $team_id");
        }
        if input.status.is_some() {
            sets.push("status = $status");
        }
        sets.push("updated_at = time::now()");

        let query = format!(
            "UPDATE type::record('member', $id) SET {} \
             WHERE organization_id = $organization_id",
            sets.join(", ")
        );

        let mut builder = self
            .db
            .query(&query)
            .bind(("id", id_str.clone()))
            .bind(("organization_id", organization_id.to_string()));

        if let Some(role) = input.role {
            builder = builder.bind(("role", role.as_str()));
        }
        if let Some(team_id) = input.team_id {
            builder = builder.bind(("team_id", team_id.map(|t| t.to_string())));
        }
        if let Some(status) = input.status {
            builder = builder.bind(("status", status.as_str()));
        }

        let result = builder.await.map_err(DbError::from)?;
        let mut result = result.check().map_err(DbError::from)?;

        let rows: Vec<MemberRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "member".into(),
            id: id_str,
        })?;

        row.try_into_member(id).map_err(Into::into)
    }
}
