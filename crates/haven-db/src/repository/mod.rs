//! SurrealDB repository implementations for the `haven-core` traits.

mod lease;
mod maintenance;
mod member;
mod organization;
mod property;
mod resource_permission;
mod session;
mod team;
mod team_property;
mod tenant;
mod unit;
mod user;

pub use lease::SurrealLeaseRepository;
pub use maintenance::SurrealMaintenanceRequestRepository;
pub use member::SurrealMemberRepository;
pub use organization::SurrealOrganizationRepository;
pub use property::SurrealPropertyRepository;
pub use resource_permission::SurrealResourcePermissionRepository;
pub use session::{SurrealSessionRepository, hash_session_token};
pub use team::SurrealTeamRepository;
pub use team_property::SurrealTeamPropertyRepository;
pub use tenant::SurrealTenantRepository;
pub use unit::SurrealUnitRepository;
pub use user::SurrealUserRepository;

use uuid::Uuid;

use crate::error::DbError;

/// Parse a stored UUID string, labelling decode failures with the field
/// they came from.
pub(crate) fn parse_uuid(field: &'static str, value: &str) -> Result<Uuid, DbError> {
    Uuid::parse_str(value).map_err(|e| DbError::Decode(format!("invalid {field} UUID: {e}")))
}
