//! The role permission table.
//!
//! The role → resource-type → allowed-actions mapping is data, not
//! code-per-role, so it can be audited in one place and tested
//! exhaustively. Unknown combinations deny by default: a role grants
//! nothing on a resource type that is not listed for it.
//!
//! Admins and owners short-circuit before this table is consulted, but
//! their rows are kept complete so the table reads as the full policy.

use haven_core::access::{Action, ResourceType};
use haven_core::models::member::MemberRole;

const VIEW: &[Action] = &[Action::View];
const VIEW_CREATE: &[Action] = &[Action::View, Action::Create];
const VIEW_CREATE_UPDATE: &[Action] = &[Action::View, Action::Create, Action::Update];
const FULL: &[Action] = &[Action::View, Action::Create, Action::Update, Action::Delete];

type Grants = &'static [(ResourceType, &'static [Action])];

const FULL_GRANTS: Grants = &[
    (ResourceType::Property, FULL),
    (ResourceType::Unit, FULL),
    (ResourceType::Lease, FULL),
    (ResourceType::Tenant, FULL),
    (ResourceType::Maintenance, FULL),
    (ResourceType::Invoice, FULL),
    (ResourceType::Conversation, FULL),
    (ResourceType::Report, FULL),
];

/// Role → resource-type → allowed actions.
static ROLE_GRANTS: &[(MemberRole, Grants)] = &[
    (MemberRole::Owner, FULL_GRANTS),
    (MemberRole::Admin, FULL_GRANTS),
    (
        MemberRole::Staff,
        &[
            (ResourceType::Property, VIEW_CREATE_UPDATE),
            (ResourceType::Unit, VIEW_CREATE_UPDATE),
            (ResourceType::Lease, VIEW_CREATE_UPDATE),
            (ResourceType::Tenant, VIEW_CREATE_UPDATE),
            (ResourceType::Maintenance, FULL),
            (ResourceType::Invoice, VIEW_CREATE),
            (ResourceType::Conversation, VIEW_CREATE_UPDATE),
            (ResourceType::Report, VIEW),
        ],
    ),
    (
        MemberRole::PropertyOwner,
        &[
            (ResourceType::Property, VIEW),
            (ResourceType::Unit, VIEW),
            (ResourceType::Lease, VIEW),
            (ResourceType::Tenant, VIEW),
            (ResourceType::Maintenance, VIEW_CREATE),
            (ResourceType::Invoice, VIEW),
            (ResourceType::Conversation, VIEW_CREATE),
            (ResourceType::Report, VIEW),
        ],
    ),
    (
        MemberRole::Caretaker,
        &[
            (ResourceType::Property, VIEW),
            (ResourceType::Unit, VIEW),
            (ResourceType::Maintenance, VIEW_CREATE_UPDATE),
            (ResourceType::Conversation, VIEW_CREATE),
        ],
    ),
    (
        MemberRole::Tenant,
        &[
            (ResourceType::Lease, VIEW),
            (ResourceType::Maintenance, VIEW_CREATE),
            (ResourceType::Invoice, VIEW),
            (ResourceType::Conversation, VIEW_CREATE),
        ],
    ),
    (
        MemberRole::Member,
        &[
            (ResourceType::Property, VIEW),
            (ResourceType::Unit, VIEW),
            (ResourceType::Lease, VIEW),
            (ResourceType::Maintenance, VIEW),
            (ResourceType::Conversation, VIEW),
        ],
    ),
];

/// All grants for a role. Unknown roles yield an empty slice.
pub fn permissions_for(role: MemberRole) -> Grants {
    ROLE_GRANTS
        .iter()
        .find(|(r, _)| *r == role)
        .map(|(_, grants)| *grants)
        .unwrap_or(&[])
}

/// The actions a role may perform on a resource type. Empty when the
/// resource type is not listed for the role.
pub fn allowed_actions(role: MemberRole, resource_type: ResourceType) -> &'static [Action] {
    permissions_for(role)
        .iter()
        .find(|(rt, _)| *rt == resource_type)
        .map(|(_, actions)| *actions)
        .unwrap_or(&[])
}

/// Does the role grant the action on the resource type at all?
pub fn is_allowed(role: MemberRole, resource_type: ResourceType, action: Action) -> bool {
    allowed_actions(role, resource_type).contains(&action)
}
