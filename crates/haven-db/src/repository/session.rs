//! SurrealDB implementation of [`SessionRepository`] and
//! [`SessionResolver`].
//!
//! Sessions are stored by token hash; the raw token never touches the
//! database. Token issuance and rotation belong to the identity
//! subsystem — this store only resolves an opaque token to its context.

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use chrono::{DateTime, Utc};
use haven_core::error::HavenResult;
use haven_core::models::session::{CreateSession, Session, SessionData};
use haven_core::models::user::User;
use haven_core::repository::{SessionRepository, SessionResolver};
use sha2::{Digest, Sha256};
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use uuid::Uuid;

use crate::error::DbError;
use crate::repository::parse_uuid;

/// Hash an opaque session token for storage/lookup (SHA-256,
/// URL-safe base64 without padding).
pub fn hash_session_token(raw: &str) -> String {
    let digest = Sha256::digest(raw.as_bytes());
    URL_SAFE_NO_PAD.encode(digest)
}

#[derive(Debug, SurrealValue)]
struct SessionRow {
    user_id: String,
    token_hash: String,
    organization_id: Option<String>,
    team_id: Option<String>,
    expires_at: DateTime<Utc>,
    created_at: DateTime<Utc>,
}

impl SessionRow {
    fn try_into_session(self, id: Uuid) -> Result<Session, DbError> {
        let user_id = parse_uuid("user", &self.user_id)?;
        let organization_id = self
            .organization_id
            .as_deref()
            .map(|o| parse_uuid("organization", o))
            .transpose()?;
        let team_id = self
            .team_id
            .as_deref()
            .map(|t| parse_uuid("team", t))
            .transpose()?;
        Ok(Session {
            id,
            user_id,
            token_hash: self.token_hash,
            organization_id,
            team_id,
            expires_at: self.expires_at,
            created_at: self.created_at,
        })
    }
}

#[derive(Debug, SurrealValue)]
struct SessionRowWithId {
    record_id: String,
    user_id: String,
    token_hash: String,
    organization_id: Option<String>,
    team_id: Option<String>,
    expires_at: DateTime<Utc>,
    created_at: DateTime<Utc>,
}

#[derive(Debug, SurrealValue)]
struct UserRow {
    email: String,
    name: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

/// SurrealDB implementation of the session store and resolver.
#[derive(Clone)]
pub struct SurrealSessionRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealSessionRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }
}

impl<C: Connection> SessionRepository for SurrealSessionRepository<C> {
    async fn create(&self, input: CreateSession) -> HavenResult<Session> {
        let id = Uuid::new_v4();
        let id_str = id.to_string();

        let result = self
            .db
            .query(
                "CREATE type::record('session', $id) SET \
                 user_id = $user_id, token_hash = $token_hash, \
                 organization_id = $organization_id, team_id = $team_id, \
                 expires_at = $expires_at",
            )
            .bind(("id", id_str.clone()))
            .bind(("user_id", input.user_id.to_string()))
            .bind(("token_hash", input.token_hash))
            .bind(("organization_id", input.organization_id.map(|o| o.to_string())))
            .bind(("team_id", input.team_id.map(|t| t.to_string())))
            .bind(("expires_at", input.expires_at))
            .await
            .map_err(DbError::from)?;

        let mut result = result.check().map_err(DbError::from)?;

        let rows: Vec<SessionRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "session".into(),
            id: id_str,
        })?;

        row.try_into_session(id).map_err(Into::into)
    }

    async fn invalidate(&self, id: Uuid) -> HavenResult<()> {
        self.db
            .query("DELETE type::record('session', $id)")
            .bind(("id", id.to_string()))
            .await
            .map_err(DbError::from)?
            .check()
            .map_err(DbError::from)?;

        Ok(())
    }
}

impl<C: Connection> SessionResolver for SurrealSessionRepository<C> {
    async fn resolve_session(&self, token: &str) -> HavenResult<Option<SessionData>> {
        let token_hash = hash_session_token(token);

        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * FROM session \
                 WHERE token_hash = $token_hash",
            )
            .bind(("token_hash", token_hash))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<SessionRowWithId> = result.take(0).map_err(DbError::from)?;
        let Some(row) = rows.into_iter().next() else {
            return Ok(None);
        };

        let id = parse_uuid("session", &row.record_id)?;
        let session = SessionRow {
            user_id: row.user_id,
            token_hash: row.token_hash,
            organization_id: row.organization_id,
            team_id: row.team_id,
            expires_at: row.expires_at,
            created_at: row.created_at,
        }
        .try_into_session(id)?;

        // An expired session resolves to no session, not an error.
        if session.expires_at <= Utc::now() {
            return Ok(None);
        }

        let user_id_str = session.user_id.to_string();
        let mut result = self
            .db
            .query("SELECT * FROM type::record('user', $id)")
            .bind(("id", user_id_str))
            .await
            .map_err(DbError::from)?;

        let users: Vec<UserRow> = result.take(0).map_err(DbError::from)?;
        let Some(user_row) = users.into_iter().next() else {
            // Session for a deleted user: treat as no session.
            return Ok(None);
        };

        Ok(Some(SessionData {
            user: User {
                id: session.user_id,
                email: user_row.email,
                name: user_row.name,
                created_at: user_row.created_at,
                updated_at: user_row.updated_at,
            },
            organization_id: session.organization_id,
            team_id: session.team_id,
        }))
    }
}
