//! Closed vocabularies for authorization decisions.
//!
//! Resource types and actions are enums rather than free-form strings so
//! that adding a new resource type forces every match site to be updated.
//! Both render to lowercase tags for persisted rows and for the
//! `"resource_type:action"` guard syntax.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::HavenError;

/// The kinds of resources an authorization decision can be about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceType {
    Property,
    Unit,
    Lease,
    Tenant,
    Maintenance,
    Invoice,
    Conversation,
    Report,
}

impl ResourceType {
    /// All resource types, for exhaustive table audits.
    pub const ALL: [ResourceType; 8] = [
        ResourceType::Property,
        ResourceType::Unit,
        ResourceType::Lease,
        ResourceType::Tenant,
        ResourceType::Maintenance,
        ResourceType::Invoice,
        ResourceType::Conversation,
        ResourceType::Report,
    ];

    /// Whether this type resolves to an owning property (directly or
    /// through other entities), making it subject to team scoping.
    pub fn is_property_scoped(self) -> bool {
        matches!(
            self,
            ResourceType::Unit
                | ResourceType::Lease
                | ResourceType::Tenant
                | ResourceType::Maintenance
        )
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ResourceType::Property => "property",
            ResourceType::Unit => "unit",
            ResourceType::Lease => "lease",
            ResourceType::Tenant => "tenant",
            ResourceType::Maintenance => "maintenance",
            ResourceType::Invoice => "invoice",
            ResourceType::Conversation => "conversation",
            ResourceType::Report => "report",
        }
    }
}

impl fmt::Display for ResourceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ResourceType {
    type Err = HavenError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "property" => Ok(ResourceType::Property),
            "unit" => Ok(ResourceType::Unit),
            "lease" => Ok(ResourceType::Lease),
            "tenant" => Ok(ResourceType::Tenant),
            "maintenance" => Ok(ResourceType::Maintenance),
            "invoice" => Ok(ResourceType::Invoice),
            "conversation" => Ok(ResourceType::Conversation),
            "report" => Ok(ResourceType::Report),
            other => Err(HavenError::Validation {
                message: format!("unknown resource type: {other}"),
            }),
        }
    }
}

/// The actions a role or override can grant on a resource type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    View,
    Create,
    Update,
    Delete,
}

impl Action {
    /// All actions, for exhaustive table audits.
    pub const ALL: [Action; 4] = [Action::View, Action::Create, Action::Update, Action::Delete];

    pub fn as_str(self) -> &'static str {
        match self {
            Action::View => "view",
            Action::Create => "create",
            Action::Update => "update",
            Action::Delete => "delete",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Action {
    type Err = HavenError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "view" => Ok(Action::View),
            "create" => Ok(Action::Create),
            "update" => Ok(Action::Update),
            "delete" => Ok(Action::Delete),
            other => Err(HavenError::Validation {
                message: format!("unknown action: {other}"),
            }),
        }
    }
}

/// Parse a `"resource_type:action"` permission string (e.g. `"property:view"`).
pub fn parse_permission(spec: &str) -> Result<(ResourceType, Action), HavenError> {
    let (resource_type, action) = spec.split_once(':').ok_or_else(|| HavenError::Validation {
        message: format!("malformed permission spec: {spec:?} (expected \"type:action\")"),
    })?;
    Ok((resource_type.parse()?, action.parse()?))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tags_round_trip() {
        for rt in ResourceType::ALL {
            assert_eq!(rt.as_str().parse::<ResourceType>().unwrap(), rt);
        }
        for action in Action::ALL {
            assert_eq!(action.as_str().parse::<Action>().unwrap(), action);
        }
    }

    #[test]
    fn parse_permission_spec() {
        assert_eq!(
            parse_permission("property:view").unwrap(),
            (ResourceType::Property, Action::View)
        );
        assert!(parse_permission("property").is_err());
        assert!(parse_permission("gadget:view").is_err());
        assert!(parse_permission("property:fly").is_err());
    }

    #[test]
    fn property_scoped_family() {
        assert!(!ResourceType::Property.is_property_scoped());
        assert!(ResourceType::Unit.is_property_scoped());
        assert!(ResourceType::Lease.is_property_scoped());
        assert!(ResourceType::Tenant.is_property_scoped());
        assert!(ResourceType::Maintenance.is_property_scoped());
        assert!(!ResourceType::Invoice.is_property_scoped());
    }
}
