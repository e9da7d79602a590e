//! HAVEN Core — domain models, error types, and repository traits for
//! the multi-tenant property-management platform.

pub mod access;
pub mod error;
pub mod models;
pub mod repository;

pub use access::{Action, ResourceType, parse_permission};
pub use error::{HavenError, HavenResult};
