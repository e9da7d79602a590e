//! Session domain model.
//!
//! Token issuance and rotation belong to the identity subsystem; the
//! authorization core only resolves an opaque token to its context.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    pub id: Uuid,
    pub user_id: Uuid,
    pub token_hash: String,
    pub organization_id: Option<Uuid>,
    pub team_id: Option<Uuid>,
    pub expires_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateSession {
    pub user_id: Uuid,
    pub token_hash: String,
    pub organization_id: Option<Uuid>,
    pub team_id: Option<Uuid>,
    pub expires_at: DateTime<Utc>,
}

/// What the session collaborator yields for a valid token: the identity
/// plus the active organization/team the session was opened against.
#[derive(Debug, Clone)]
pub struct SessionData {
    pub user: crate::models::user::User,
    pub organization_id: Option<Uuid>,
    pub team_id: Option<Uuid>,
}
