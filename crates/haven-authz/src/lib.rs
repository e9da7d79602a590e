//! HAVEN AuthZ — the multi-tenant authorization core.
//!
//! Decides, per request, whether a given user may perform a given
//! action on a given resource, accounting for organization ownership,
//! the role permission table, team-scoped property assignment, and
//! per-resource permission overrides.

pub mod context;
pub mod engine;
pub mod members;
pub mod ownership;
pub mod table;

pub use context::{AuthContextService, GuardError, RequestContext};
pub use engine::{PermissionEngine, PropertyScope};
pub use members::MemberService;
pub use ownership::{Ownership, OwnershipResolver, PropertyOwnership};
