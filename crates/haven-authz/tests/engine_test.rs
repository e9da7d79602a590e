//! Integration tests for the permission engine using in-memory
//! SurrealDB.

use std::collections::HashSet;

use chrono::NaiveDate;
use haven_authz::{PermissionEngine, PropertyOwnership, PropertyScope};
use haven_core::access::{Action, ResourceType};
use haven_core::error::HavenError;
use haven_core::models::lease::CreateLease;
use haven_core::models::maintenance::CreateMaintenanceRequest;
use haven_core::models::member::{CreateMember, MemberRole, MemberStatus};
use haven_core::models::organization::{CreateOrganization, Organization};
use haven_core::models::property::{CreateProperty, Property};
use haven_core::models::team::{CreateTeam, Team};
use haven_core::models::tenant::{CreateTenant, Tenant};
use haven_core::models::unit::{CreateUnit, Unit};
use haven_core::models::user::{CreateUser, User};
use haven_core::repository::{
    LeaseRepository, MaintenanceRequestRepository, MemberRepository, OrganizationRepository,
    PropertyRepository, ResourcePermissionRepository, TeamPropertyRepository, TeamRepository,
    TenantRepository, UnitRepository, UserRepository,
};
use haven_db::repository::{
    SurrealLeaseRepository, SurrealMaintenanceRequestRepository, SurrealMemberRepository,
    SurrealOrganizationRepository, SurrealPropertyRepository,
    SurrealResourcePermissionRepository, SurrealTeamPropertyRepository, SurrealTeamRepository,
    SurrealTenantRepository, SurrealUnitRepository, SurrealUserRepository,
};
use surrealdb::Surreal;
use surrealdb::engine::local::Mem;
use uuid::Uuid;

type Db = surrealdb::engine::local::Db;
type Resolver = PropertyOwnership<
    SurrealPropertyRepository<Db>,
    SurrealUnitRepository<Db>,
    SurrealLeaseRepository<Db>,
    SurrealTenantRepository<Db>,
    SurrealMaintenanceRequestRepository<Db>,
>;
type Engine = PermissionEngine<
    SurrealMemberRepository<Db>,
    SurrealTeamPropertyRepository<Db>,
    SurrealResourcePermissionRepository<Db>,
    Resolver,
>;

struct Fixture {
    db: Surreal<Db>,
}

impl Fixture {
    async fn new() -> Self {
        let db = Surreal::new::<Mem>(()).await.unwrap();
        db.use_ns("test").use_db("test").await.unwrap();
        haven_db::run_migrations(&db).await.unwrap();
        Self { db }
    }

    async fn user(&self, email: &str) -> User {
        SurrealUserRepository::new(self.db.clone())
            .create(CreateUser {
                email: email.into(),
                name: email.split('@').next().unwrap().into(),
            })
            .await
            .unwrap()
    }

    async fn organization(&self, slug: &str, agent_owner: &User) -> Organization {
        SurrealOrganizationRepository::new(self.db.clone())
            .create(CreateOrganization {
                name: slug.to_uppercase(),
                slug: slug.into(),
                agent_owner_id: agent_owner.id,
            })
            .await
            .unwrap()
    }

    async fn member(
        &self,
        user: &User,
        organization: &Organization,
        role: MemberRole,
        team: Option<&Team>,
    ) {
        self.member_with_status(user, organization, role, team, MemberStatus::Active)
            .await;
    }

    async fn member_with_status(
        &self,
        user: &User,
        organization: &Organization,
        role: MemberRole,
        team: Option<&Team>,
        status: MemberStatus,
    ) {
        SurrealMemberRepository::new(self.db.clone())
            .create(CreateMember {
                user_id: user.id,
                organization_id: organization.id,
                role,
                team_id: team.map(|t| t.id),
                status,
            })
            .await
            .unwrap();
    }

    async fn team(&self, organization: &Organization, name: &str) -> Team {
        SurrealTeamRepository::new(self.db.clone())
            .create(CreateTeam {
                organization_id: organization.id,
                name: name.into(),
            })
            .await
            .unwrap()
    }

    async fn property(&self, organization: &Organization, name: &str) -> Property {
        SurrealPropertyRepository::new(self.db.clone())
            .create(CreateProperty {
                organization_id: organization.id,
                name: name.into(),
                address: format!("{name} street"),
            })
            .await
            .unwrap()
    }

    async fn unit(&self, property: &Property, label: &str) -> Unit {
        SurrealUnitRepository::new(self.db.clone())
            .create(CreateUnit {
                property_id: property.id,
                label: label.into(),
            })
            .await
            .unwrap()
    }

    async fn tenant(&self, organization: &Organization, name: &str) -> Tenant {
        SurrealTenantRepository::new(self.db.clone())
            .create(CreateTenant {
                organization_id: organization.id,
                name: name.into(),
                email: format!("{name}@renters.example"),
            })
            .await
            .unwrap()
    }

    async fn maintenance(&self, property: &Property, summary: &str) -> Uuid {
        SurrealMaintenanceRequestRepository::new(self.db.clone())
            .create(CreateMaintenanceRequest {
                property_id: property.id,
                unit_id: None,
                summary: summary.into(),
            })
            .await
            .unwrap()
            .id
    }

    async fn lease(&self, property: &Property, tenant: &Tenant) {
        SurrealLeaseRepository::new(self.db.clone())
            .create(CreateLease {
                property_id: property.id,
                unit_id: None,
                tenant_id: tenant.id,
                start_date: NaiveDate::from_ymd_opt(2026, 1, 1).unwrap(),
                end_date: None,
            })
            .await
            .unwrap();
    }

    async fn assign(&self, team: &Team, property_ids: &[Uuid]) {
        SurrealTeamPropertyRepository::new(self.db.clone())
            .assign(team.id, property_ids.iter().copied().collect())
            .await
            .unwrap();
    }

    async fn grant(
        &self,
        team: &Team,
        resource_type: ResourceType,
        action: Action,
        resource_id: Uuid,
    ) {
        SurrealResourcePermissionRepository::new(self.db.clone())
            .grant(team.id, resource_type, action, resource_id)
            .await
            .unwrap();
    }

    fn engine(
        &self,
        user: Option<&User>,
        organization: Option<&Organization>,
        team: Option<&Team>,
    ) -> Engine {
        let resolver = PropertyOwnership::new(
            SurrealPropertyRepository::new(self.db.clone()),
            SurrealUnitRepository::new(self.db.clone()),
            SurrealLeaseRepository::new(self.db.clone()),
            SurrealTenantRepository::new(self.db.clone()),
            SurrealMaintenanceRequestRepository::new(self.db.clone()),
        );
        PermissionEngine::new(
            user.cloned(),
            organization.cloned(),
            team.cloned(),
            SurrealMemberRepository::new(self.db.clone()),
            SurrealTeamPropertyRepository::new(self.db.clone()),
            SurrealResourcePermissionRepository::new(self.db.clone()),
            resolver,
        )
    }
}

#[tokio::test]
async fn anonymous_and_organizationless_contexts_deny() {
    let fx = Fixture::new().await;
    let owner = fx.user("owner@example.com").await;
    let org = fx.organization("acme", &owner).await;

    let engine = fx.engine(None, Some(&org), None);
    assert!(!engine
        .can(ResourceType::Property, Action::View, None)
        .await
        .unwrap());

    let engine = fx.engine(Some(&owner), None, None);
    assert!(!engine
        .can(ResourceType::Property, Action::View, None)
        .await
        .unwrap());
}

#[tokio::test]
async fn agent_owner_has_unconditional_authority() {
    let fx = Fixture::new().await;
    let owner = fx.user("owner@example.com").await;
    let org = fx.organization("acme", &owner).await;
    let property = fx.property(&org, "HQ").await;

    // Not even a member row — authority comes from the organization.
    let engine = fx.engine(Some(&owner), Some(&org), None);
    assert!(engine
        .can(ResourceType::Property, Action::Delete, Some(property.id))
        .await
        .unwrap());
    assert!(engine
        .can(ResourceType::Report, Action::Create, None)
        .await
        .unwrap());
}

#[tokio::test]
async fn admins_pass_every_check_in_their_organization() {
    let fx = Fixture::new().await;
    let owner = fx.user("owner@example.com").await;
    let org = fx.organization("acme", &owner).await;
    let admin = fx.user("admin@example.com").await;
    fx.member(&admin, &org, MemberRole::Admin, None).await;
    let property = fx.property(&org, "HQ").await;

    let engine = fx.engine(Some(&admin), Some(&org), None);
    assert!(engine
        .can(ResourceType::Property, Action::Delete, Some(property.id))
        .await
        .unwrap());
    assert!(engine
        .can(ResourceType::Invoice, Action::Update, None)
        .await
        .unwrap());
}

#[tokio::test]
async fn role_gate_blocks_before_team_scoping() {
    let fx = Fixture::new().await;
    let owner = fx.user("owner@example.com").await;
    let org = fx.organization("acme", &owner).await;
    let team = fx.team(&org, "downtown").await;
    let staff = fx.user("staff@example.com").await;
    fx.member(&staff, &org, MemberRole::Staff, Some(&team)).await;
    let property = fx.property(&org, "HQ").await;
    fx.assign(&team, &[property.id]).await;

    // Staff have no property:delete — assignment never comes into play.
    let engine = fx.engine(Some(&staff), Some(&org), Some(&team));
    assert!(!engine
        .can(ResourceType::Property, Action::Delete, Some(property.id))
        .await
        .unwrap());
}

#[tokio::test]
async fn team_assignment_is_the_final_answer_for_properties() {
    let fx = Fixture::new().await;
    let owner = fx.user("owner@example.com").await;
    let org = fx.organization("acme", &owner).await;
    let team = fx.team(&org, "downtown").await;
    let staff = fx.user("staff@example.com").await;
    fx.member(&staff, &org, MemberRole::Staff, Some(&team)).await;
    let p1 = fx.property(&org, "P1").await;
    let p2 = fx.property(&org, "P2").await;
    fx.assign(&team, &[p1.id]).await;

    let engine = fx.engine(Some(&staff), Some(&org), Some(&team));
    assert!(engine
        .can(ResourceType::Property, Action::View, Some(p1.id))
        .await
        .unwrap());
    assert!(!engine
        .can(ResourceType::Property, Action::View, Some(p2.id))
        .await
        .unwrap());
}

#[tokio::test]
async fn coarse_grained_check_allows_once_role_gate_passes() {
    let fx = Fixture::new().await;
    let owner = fx.user("owner@example.com").await;
    let org = fx.organization("acme", &owner).await;
    let team = fx.team(&org, "downtown").await;
    let staff = fx.user("staff@example.com").await;
    fx.member(&staff, &org, MemberRole::Staff, Some(&team)).await;

    // No resource id, no assigned properties at all: the role grant is
    // sufficient. List call sites narrow via accessible_property_ids.
    let engine = fx.engine(Some(&staff), Some(&org), Some(&team));
    assert!(engine
        .can(ResourceType::Property, Action::View, None)
        .await
        .unwrap());
}

#[tokio::test]
async fn units_inherit_property_assignment() {
    let fx = Fixture::new().await;
    let owner = fx.user("owner@example.com").await;
    let org = fx.organization("acme", &owner).await;
    let team = fx.team(&org, "downtown").await;
    let staff = fx.user("staff@example.com").await;
    fx.member(&staff, &org, MemberRole::Staff, Some(&team)).await;
    let p1 = fx.property(&org, "P1").await;
    let p2 = fx.property(&org, "P2").await;
    fx.assign(&team, &[p1.id]).await;
    let in_scope = fx.unit(&p1, "1A").await;
    let out_of_scope = fx.unit(&p2, "9Z").await;

    let engine = fx.engine(Some(&staff), Some(&org), Some(&team));
    assert!(engine
        .can(ResourceType::Unit, Action::Update, Some(in_scope.id))
        .await
        .unwrap());
    assert!(!engine
        .can(ResourceType::Unit, Action::Update, Some(out_of_scope.id))
        .await
        .unwrap());
}

#[tokio::test]
async fn maintenance_requests_inherit_property_assignment() {
    let fx = Fixture::new().await;
    let owner = fx.user("owner@example.com").await;
    let org = fx.organization("acme", &owner).await;
    let team = fx.team(&org, "downtown").await;
    let caretaker = fx.user("caretaker@example.com").await;
    fx.member(&caretaker, &org, MemberRole::Caretaker, Some(&team))
        .await;
    let p1 = fx.property(&org, "P1").await;
    let p2 = fx.property(&org, "P2").await;
    fx.assign(&team, &[p1.id]).await;
    let in_scope = fx.maintenance(&p1, "leaky faucet").await;
    let out_of_scope = fx.maintenance(&p2, "broken window").await;

    let engine = fx.engine(Some(&caretaker), Some(&org), Some(&team));
    assert!(engine
        .can(ResourceType::Maintenance, Action::Update, Some(in_scope))
        .await
        .unwrap());
    assert!(!engine
        .can(ResourceType::Maintenance, Action::Update, Some(out_of_scope))
        .await
        .unwrap());
}

#[tokio::test]
async fn tenants_resolve_through_any_lease() {
    let fx = Fixture::new().await;
    let owner = fx.user("owner@example.com").await;
    let org = fx.organization("acme", &owner).await;
    let team = fx.team(&org, "downtown").await;
    let staff = fx.user("staff@example.com").await;
    fx.member(&staff, &org, MemberRole::Staff, Some(&team)).await;
    let p1 = fx.property(&org, "P1").await;
    let p2 = fx.property(&org, "P2").await;
    fx.assign(&team, &[p1.id]).await;

    // Renter with leases on both properties: one match suffices.
    let reachable = fx.tenant(&org, "bob").await;
    fx.lease(&p2, &reachable).await;
    fx.lease(&p1, &reachable).await;

    // Renter leasing only the unassigned property.
    let unreachable = fx.tenant(&org, "carol").await;
    fx.lease(&p2, &unreachable).await;

    let engine = fx.engine(Some(&staff), Some(&org), Some(&team));
    assert!(engine
        .can(ResourceType::Tenant, Action::View, Some(reachable.id))
        .await
        .unwrap());
    assert!(!engine
        .can(ResourceType::Tenant, Action::View, Some(unreachable.id))
        .await
        .unwrap());
}

#[tokio::test]
async fn unresolvable_ownership_falls_back_to_overrides() {
    let fx = Fixture::new().await;
    let owner = fx.user("owner@example.com").await;
    let org = fx.organization("acme", &owner).await;
    let team = fx.team(&org, "downtown").await;
    let staff = fx.user("staff@example.com").await;
    fx.member(&staff, &org, MemberRole::Staff, Some(&team)).await;

    // A tenant with no leases resolves to no property.
    let floating = fx.tenant(&org, "dave").await;

    let engine = fx.engine(Some(&staff), Some(&org), Some(&team));
    assert!(!engine
        .can(ResourceType::Tenant, Action::View, Some(floating.id))
        .await
        .unwrap());

    fx.grant(&team, ResourceType::Tenant, Action::View, floating.id)
        .await;

    // Fresh engine: the previous decision was memoized per request.
    let engine = fx.engine(Some(&staff), Some(&org), Some(&team));
    assert!(engine
        .can(ResourceType::Tenant, Action::View, Some(floating.id))
        .await
        .unwrap());
}

#[tokio::test]
async fn org_level_resources_use_overrides_for_team_members() {
    let fx = Fixture::new().await;
    let owner = fx.user("owner@example.com").await;
    let org = fx.organization("acme", &owner).await;
    let team = fx.team(&org, "downtown").await;
    let staff = fx.user("staff@example.com").await;
    fx.member(&staff, &org, MemberRole::Staff, Some(&team)).await;
    let invoice_id = Uuid::new_v4();

    let engine = fx.engine(Some(&staff), Some(&org), Some(&team));
    assert!(!engine
        .can(ResourceType::Invoice, Action::View, Some(invoice_id))
        .await
        .unwrap());

    fx.grant(&team, ResourceType::Invoice, Action::View, invoice_id)
        .await;

    let engine = fx.engine(Some(&staff), Some(&org), Some(&team));
    assert!(engine
        .can(ResourceType::Invoice, Action::View, Some(invoice_id))
        .await
        .unwrap());
}

#[tokio::test]
async fn members_without_a_team_are_scoped_by_role_alone() {
    let fx = Fixture::new().await;
    let owner = fx.user("owner@example.com").await;
    let org = fx.organization("acme", &owner).await;
    let member = fx.user("member@example.com").await;
    fx.member(&member, &org, MemberRole::Member, None).await;
    let property = fx.property(&org, "HQ").await;

    let engine = fx.engine(Some(&member), Some(&org), None);
    // member role grants property:view; with no team there is nothing
    // to scope against.
    assert!(engine
        .can(ResourceType::Property, Action::View, Some(property.id))
        .await
        .unwrap());
    // ...but the role gate still applies.
    assert!(!engine
        .can(ResourceType::Property, Action::Update, Some(property.id))
        .await
        .unwrap());
}

#[tokio::test]
async fn cross_organization_access_is_always_denied() {
    let fx = Fixture::new().await;
    let owner_a = fx.user("a@example.com").await;
    let owner_b = fx.user("b@example.com").await;
    let org_a = fx.organization("org-a", &owner_a).await;
    let org_b = fx.organization("org-b", &owner_b).await;
    let foreign = fx.property(&org_b, "Foreign").await;

    let admin = fx.user("admin-a@example.com").await;
    fx.member(&admin, &org_a, MemberRole::Admin, None).await;

    // Even an admin — and even the agent owner — of org A is denied on
    // org B's resources.
    let engine = fx.engine(Some(&admin), Some(&org_a), None);
    assert!(!engine
        .can(ResourceType::Property, Action::View, Some(foreign.id))
        .await
        .unwrap());

    let engine = fx.engine(Some(&owner_a), Some(&org_a), None);
    assert!(!engine
        .can(ResourceType::Property, Action::View, Some(foreign.id))
        .await
        .unwrap());

    // The owning organization still reaches it.
    let engine = fx.engine(Some(&owner_b), Some(&org_b), None);
    assert!(engine
        .can(ResourceType::Property, Action::View, Some(foreign.id))
        .await
        .unwrap());
}

#[tokio::test]
async fn inactive_memberships_grant_nothing() {
    let fx = Fixture::new().await;
    let owner = fx.user("owner@example.com").await;
    let org = fx.organization("acme", &owner).await;
    let staff = fx.user("staff@example.com").await;
    fx.member_with_status(&staff, &org, MemberRole::Staff, None, MemberStatus::Rejected)
        .await;

    let engine = fx.engine(Some(&staff), Some(&org), None);
    assert!(!engine
        .can(ResourceType::Property, Action::View, None)
        .await
        .unwrap());
}

#[tokio::test]
async fn decisions_are_memoized_per_engine() {
    let fx = Fixture::new().await;
    let owner = fx.user("owner@example.com").await;
    let org = fx.organization("acme", &owner).await;
    let team = fx.team(&org, "downtown").await;
    let staff = fx.user("staff@example.com").await;
    fx.member(&staff, &org, MemberRole::Staff, Some(&team)).await;
    let invoice_id = Uuid::new_v4();

    let engine = fx.engine(Some(&staff), Some(&org), Some(&team));
    assert!(!engine
        .can(ResourceType::Invoice, Action::View, Some(invoice_id))
        .await
        .unwrap());

    // The grant lands mid-request: the engine keeps answering from its
    // request-scoped cache.
    fx.grant(&team, ResourceType::Invoice, Action::View, invoice_id)
        .await;
    assert!(!engine
        .can(ResourceType::Invoice, Action::View, Some(invoice_id))
        .await
        .unwrap());

    // A new request sees the new state.
    let engine = fx.engine(Some(&staff), Some(&org), Some(&team));
    assert!(engine
        .can(ResourceType::Invoice, Action::View, Some(invoice_id))
        .await
        .unwrap());
}

#[tokio::test]
async fn assert_can_carries_the_denial_message() {
    let fx = Fixture::new().await;
    let owner = fx.user("owner@example.com").await;
    let org = fx.organization("acme", &owner).await;
    let staff = fx.user("staff@example.com").await;
    fx.member(&staff, &org, MemberRole::Staff, None).await;

    let engine = fx.engine(Some(&staff), Some(&org), None);
    let err = engine
        .assert_can(ResourceType::Property, Action::Delete, None)
        .await
        .unwrap_err();

    match &err {
        HavenError::Authorization { message } => {
            assert_eq!(message, "You don't have permission to delete this property");
        }
        other => panic!("expected Authorization, got {other:?}"),
    }

    // And no error when permitted.
    engine
        .assert_can(ResourceType::Property, Action::View, None)
        .await
        .unwrap();
}

#[tokio::test]
async fn accessible_property_ids_by_role() {
    let fx = Fixture::new().await;
    let owner = fx.user("owner@example.com").await;
    let org = fx.organization("acme", &owner).await;
    let team = fx.team(&org, "downtown").await;
    let p1 = fx.property(&org, "P1").await;
    let _p2 = fx.property(&org, "P2").await;
    fx.assign(&team, &[p1.id]).await;

    let admin = fx.user("admin@example.com").await;
    fx.member(&admin, &org, MemberRole::Admin, None).await;
    let scoped = fx.user("scoped@example.com").await;
    fx.member(&scoped, &org, MemberRole::Staff, Some(&team)).await;
    let teamless = fx.user("teamless@example.com").await;
    fx.member(&teamless, &org, MemberRole::Staff, None).await;

    // Agent owner and admins: unrestricted.
    let engine = fx.engine(Some(&owner), Some(&org), None);
    assert_eq!(engine.accessible_property_ids().await.unwrap(), PropertyScope::All);
    let engine = fx.engine(Some(&admin), Some(&org), None);
    assert_eq!(engine.accessible_property_ids().await.unwrap(), PropertyScope::All);

    // Team members: exactly the team's assignment.
    let engine = fx.engine(Some(&scoped), Some(&org), Some(&team));
    assert_eq!(
        engine.accessible_property_ids().await.unwrap(),
        PropertyScope::Ids(HashSet::from([p1.id])),
    );

    // Everyone else: empty.
    let engine = fx.engine(Some(&teamless), Some(&org), None);
    assert_eq!(
        engine.accessible_property_ids().await.unwrap(),
        PropertyScope::Ids(HashSet::new()),
    );
    let engine = fx.engine(None, None, None);
    assert_eq!(
        engine.accessible_property_ids().await.unwrap(),
        PropertyScope::Ids(HashSet::new()),
    );
}
