//! Resource ownership resolution.
//!
//! Team scoping needs to know which property a resource hangs off, and
//! which organization owns it. Units, leases, and maintenance requests
//! point at their property directly; tenants reach properties through
//! their leases, possibly several at once — access through ANY of them
//! suffices.
//!
//! Resolution fails softly: an unresolvable resource yields
//! [`Ownership::none`], never an error, and the engine falls back to
//! its role-only / override path. Infrastructure errors propagate.

use std::collections::HashSet;

use haven_core::access::ResourceType;
use haven_core::error::{HavenError, HavenResult};
use haven_core::repository::{
    LeaseRepository, MaintenanceRequestRepository, PropertyRepository, TenantRepository,
    UnitRepository,
};
use uuid::Uuid;

/// Where a resource hangs in the property hierarchy.
#[derive(Debug, Clone, Default)]
pub struct Ownership {
    /// The owning organization, when the resource could be found.
    pub organization_id: Option<Uuid>,
    /// The owning property id(s).
    pub property_ids: HashSet<Uuid>,
}

impl Ownership {
    /// An unresolved resource: no organization, no properties.
    pub fn none() -> Self {
        Self::default()
    }
}

pub trait OwnershipResolver: Send + Sync {
    fn resolve(
        &self,
        resource_type: ResourceType,
        resource_id: Uuid,
    ) -> impl Future<Output = HavenResult<Ownership>> + Send;
}

/// Repository-backed ownership resolver.
#[derive(Clone)]
pub struct PropertyOwnership<P, U, L, T, M> {
    properties: P,
    units: U,
    leases: L,
    tenants: T,
    maintenance: M,
}

impl<P, U, L, T, M> PropertyOwnership<P, U, L, T, M>
where
    P: PropertyRepository,
    U: UnitRepository,
    L: LeaseRepository,
    T: TenantRepository,
    M: MaintenanceRequestRepository,
{
    pub fn new(properties: P, units: U, leases: L, tenants: T, maintenance: M) -> Self {
        Self {
            properties,
            units,
            leases,
            tenants,
            maintenance,
        }
    }

    async fn of_property(&self, property_id: Uuid) -> HavenResult<Ownership> {
        match self.properties.get_by_id(property_id).await {
            Ok(property) => Ok(Ownership {
                organization_id: Some(property.organization_id),
                property_ids: HashSet::from([property.id]),
            }),
            Err(HavenError::NotFound { .. }) => Ok(Ownership::none()),
            Err(e) => Err(e),
        }
    }
}

impl<P, U, L, T, M> OwnershipResolver for PropertyOwnership<P, U, L, T, M>
where
    P: PropertyRepository,
    U: UnitRepository,
    L: LeaseRepository,
    T: TenantRepository,
    M: MaintenanceRequestRepository,
{
    async fn resolve(
        &self,
        resource_type: ResourceType,
        resource_id: Uuid,
    ) -> HavenResult<Ownership> {
        match resource_type {
            ResourceType::Property => self.of_property(resource_id).await,

            ResourceType::Unit => match self.units.get_by_id(resource_id).await {
                Ok(unit) => self.of_property(unit.property_id).await,
                Err(HavenError::NotFound { .. }) => Ok(Ownership::none()),
                Err(e) => Err(e),
            },

            ResourceType::Lease => match self.leases.get_by_id(resource_id).await {
                Ok(lease) => self.of_property(lease.property_id).await,
                Err(HavenError::NotFound { .. }) => Ok(Ownership::none()),
                Err(e) => Err(e),
            },

            ResourceType::Maintenance => match self.maintenance.get_by_id(resource_id).await {
                Ok(request) => self.of_property(request.property_id).await,
                Err(HavenError::NotFound { .. }) => Ok(Ownership::none()),
                Err(e) => Err(e),
            },

            // Tenant → leases → properties. Every lease contributes its
            // property; the tenant record itself names the organization.
            ResourceType::Tenant => match self.tenants.get_by_id(resource_id).await {
                Ok(tenant) => {
                    let leases = self.leases.list_by_tenant(tenant.id).await?;
                    let property_ids = leases.into_iter().map(|l| l.property_id).collect();
                    Ok(Ownership {
                        organization_id: Some(tenant.organization_id),
                        property_ids,
                    })
                }
                Err(HavenError::NotFound { .. }) => Ok(Ownership::none()),
                Err(e) => Err(e),
            },

            // No property path for organization-level resources.
            ResourceType::Invoice | ResourceType::Conversation | ResourceType::Report => {
                Ok(Ownership::none())
            }
        }
    }
}
