//! Schema definitions and migration runner for SurrealDB.
//!
//! All table definitions use SCHEMAFULL mode for data integrity.
//! UUIDs are stored as strings. Enums are stored as strings with
//! ASSERT constraints for validation.

use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use tracing::info;

use crate::error::DbError;

// -----------------------------------------------------------------------
// Migration tracking
// -----------------------------------------------------------------------

const MIGRATION_TABLE_DDL: &str = "\
DEFINE TABLE IF NOT EXISTS _migration SCHEMAFULL;
DEFINE FIELD IF NOT EXISTS version ON TABLE _migration TYPE int;
DEFINE FIELD IF NOT EXISTS name ON TABLE _migration TYPE string;
DEFINE FIELD IF NOT EXISTS applied_at ON TABLE _migration TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX IF NOT EXISTS idx_migration_version ON TABLE _migration \
    COLUMNS version UNIQUE;
";

#[derive(Debug, SurrealValue)]
struct MigrationRecord {
    version: u32,
    #[allow(dead_code)]
    name: String,
}

struct Migration {
    version: u32,
    name: &'static str,
    sql: &'static str,
}

static MIGRATIONS: &[Migration] = &[Migration {
    version: 1,
    name: "initial_schema",
    sql: SCHEMA_V1,
}];

// -----------------------------------------------------------------------
// Schema v1 — initial table definitions
// -----------------------------------------------------------------------

const SCHEMA_V1: &str = "\
-- =======================================================================
-- Users (global scope)
-- =======================================================================
DEFINE TABLE user SCHEMAFULL;
DEFINE FIELD email ON TABLE user TYPE string;
DEFINE FIELD name ON TABLE user TYPE string;
DEFINE FIELD created_at ON TABLE user TYPE datetime \
    DEFAULT time::now();
DEFINE FIELD updated_at ON TABLE user TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX idx_user_email ON TABLE user COLUMNS email UNIQUE;

-- =======================================================================
-- Organizations (tenancy boundary)
-- =======================================================================
DEFINE TABLE organization SCHEMAFULL;
DEFINE FIELD name ON TABLE organization TYPE string;
DEFINE FIELD slug ON TABLE organization TYPE string;
DEFINE FIELD agent_owner_id ON TABLE organization TYPE string;
DEFINE FIELD created_at ON TABLE organization TYPE datetime \
    DEFAULT time::now();
DEFINE FIELD updated_at ON TABLE organization TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX idx_organization_slug ON TABLE organization \
    COLUMNS slug UNIQUE;

-- =======================================================================
-- Members (User x Organization, at most one row per pair)
-- =======================================================================
DEFINE TABLE member SCHEMAFULL;
DEFINE FIELD user_id ON TABLE member TYPE string;
DEFINE FIELD organization_id ON TABLE member TYPE string;
DEFINE FIELD role ON TABLE member TYPE string \
    ASSERT $value IN ['owner', 'admin', 'staff', 'property_owner', \
    'caretaker', 'tenant', 'member'];
DEFINE FIELD team_id ON TABLE member TYPE option<string>;
DEFINE FIELD status ON TABLE member TYPE string \
    ASSERT $value IN ['active', 'inactive', 'pending', 'rejected'];
DEFINE FIELD created_at ON TABLE member TYPE datetime \
    DEFAULT time::now();
DEFINE FIELD updated_at ON TABLE member TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX idx_member_user_org ON TABLE member \
    COLUMNS user_id, organization_id UNIQUE;
DEFINE INDEX idx_member_org_team ON TABLE member \
    COLUMNS organization_id, team_id;

-- =======================================================================
-- Teams (organization scope)
-- =======================================================================
DEFINE TABLE team SCHEMAFULL;
DEFINE FIELD organization_id ON TABLE team TYPE string;
DEFINE FIELD name ON TABLE team TYPE string;
DEFINE FIELD created_at ON TABLE team TYPE datetime \
    DEFAULT time::now();
DEFINE FIELD updated_at ON TABLE team TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX idx_team_org_name ON TABLE team \
    COLUMNS organization_id, name UNIQUE;

-- =======================================================================
-- Team-property assignments (Team x Property)
-- =======================================================================
DEFINE TABLE team_property SCHEMAFULL;
DEFINE FIELD team_id ON TABLE team_property TYPE string;
DEFINE FIELD property_id ON TABLE team_property TYPE string;
DEFINE FIELD created_at ON TABLE team_property TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX idx_team_property_pair ON TABLE team_property \
    COLUMNS team_id, property_id UNIQUE;
DEFINE INDEX idx_team_property_team ON TABLE team_property \
    COLUMNS team_id;

-- =======================================================================
-- Per-resource permission overrides
-- (record id is derived from the composite key, so at most one row
-- exists per (team, resource_type, resource_id, action) tuple)
-- =======================================================================
DEFINE TABLE resource_permission SCHEMAFULL;
DEFINE FIELD team_id ON TABLE resource_permission TYPE string;
DEFINE FIELD resource_type ON TABLE resource_permission TYPE string \
    ASSERT $value IN ['property', 'unit', 'lease', 'tenant', \
    'maintenance', 'invoice', 'conversation', 'report'];
DEFINE FIELD resource_id ON TABLE resource_permission TYPE string;
DEFINE FIELD action ON TABLE resource_permission TYPE string \
    ASSERT $value IN ['view', 'create', 'update', 'delete'];
DEFINE FIELD created_at ON TABLE resource_permission TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX idx_resource_permission_team ON TABLE resource_permission \
    COLUMNS team_id;

-- =======================================================================
-- Properties (organization scope)
-- =======================================================================
DEFINE TABLE property SCHEMAFULL;
DEFINE FIELD organization_id ON TABLE property TYPE string;
DEFINE FIELD name ON TABLE property TYPE string;
DEFINE FIELD address ON TABLE property TYPE string;
DEFINE FIELD created_at ON TABLE property TYPE datetime \
    DEFAULT time::now();
DEFINE FIELD updated_at ON TABLE property TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX idx_property_org ON TABLE property \
    COLUMNS organization_id;

-- =======================================================================
-- Units (property scope)
-- =======================================================================
DEFINE TABLE unit SCHEMAFULL;
DEFINE FIELD property_id ON TABLE unit TYPE string;
DEFINE FIELD label ON TABLE unit TYPE string;
DEFINE FIELD created_at ON TABLE unit TYPE datetime \
    DEFAULT time::now();
DEFINE FIELD updated_at ON TABLE unit TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX idx_unit_property_label ON TABLE unit \
    COLUMNS property_id, label UNIQUE;

-- =======================================================================
-- Leases (property scope, held by a tenant)
-- =======================================================================
DEFINE TABLE lease SCHEMAFULL;
DEFINE FIELD property_id ON TABLE lease TYPE string;
DEFINE FIELD unit_id ON TABLE lease TYPE option<string>;
DEFINE FIELD tenant_id ON TABLE lease TYPE string;
DEFINE FIELD start_date ON TABLE lease TYPE string;
DEFINE FIELD end_date ON TABLE lease TYPE option<string>;
DEFINE FIELD created_at ON TABLE lease TYPE datetime \
    DEFAULT time::now();
DEFINE FIELD updated_at ON TABLE lease TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX idx_lease_tenant ON TABLE lease COLUMNS tenant_id;
DEFINE INDEX idx_lease_property ON TABLE lease COLUMNS property_id;

-- =======================================================================
-- Tenants (organization scope; renters)
-- =======================================================================
DEFINE TABLE tenant SCHEMAFULL;
DEFINE FIELD organization_id ON TABLE tenant TYPE string;
DEFINE FIELD name ON TABLE tenant TYPE string;
DEFINE FIELD email ON TABLE tenant TYPE string;
DEFINE FIELD created_at ON TABLE tenant TYPE datetime \
    DEFAULT time::now();
DEFINE FIELD updated_at ON TABLE tenant TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX idx_tenant_org ON TABLE tenant COLUMNS organization_id;

-- =======================================================================
-- Maintenance requests (property scope)
-- =======================================================================
DEFINE TABLE maintenance_request SCHEMAFULL;
DEFINE FIELD property_id ON TABLE maintenance_request TYPE string;
DEFINE FIELD unit_id ON TABLE maintenance_request TYPE option<string>;
DEFINE FIELD summary ON TABLE maintenance_request TYPE string;
DEFINE FIELD status ON TABLE maintenance_request TYPE string \
    ASSERT $value IN ['open', 'in_progress', 'resolved', 'cancelled'];
DEFINE FIELD created_at ON TABLE maintenance_request TYPE datetime \
    DEFAULT time::now();
DEFINE FIELD updated_at ON TABLE maintenance_request TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX idx_maintenance_property ON TABLE maintenance_request \
    COLUMNS property_id;

-- =======================================================================
-- Sessions (resolved by the identity collaborator)
-- =======================================================================
DEFINE TABLE session SCHEMAFULL;
DEFINE FIELD user_id ON TABLE session TYPE string;
DEFINE FIELD token_hash ON TABLE session TYPE string;
DEFINE FIELD organization_id ON TABLE session TYPE option<string>;
DEFINE FIELD team_id ON TABLE session TYPE option<string>;
DEFINE FIELD expires_at ON TABLE session TYPE datetime;
DEFINE FIELD created_at ON TABLE session TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX idx_session_token ON TABLE session \
    COLUMNS token_hash UNIQUE;
";

// -----------------------------------------------------------------------
// Public API
// -----------------------------------------------------------------------

/// Run all pending migrations against the given SurrealDB client.
///
/// Creates a `_migration` tracking table on first run, then applies
/// each migration whose version exceeds the current maximum.
/// All DEFINE statements are idempotent so re-running is safe.
pub async fn run_migrations<C: Connection>(db: &Surreal<C>) -> Result<(), DbError> {
    // Ensure migration tracking table exists (idempotent).
    db.query(MIGRATION_TABLE_DDL)
        .await?
        .check()
        .map_err(|e| DbError::Migration(e.to_string()))?;

    // Determine current schema version.
    let mut result = db
        .query("SELECT * FROM _migration ORDER BY version DESC LIMIT 1")
        .await?;
    let records: Vec<MigrationRecord> = result.take(0)?;
    let current_version = records.first().map(|m| m.version).unwrap_or(0);

    for migration in MIGRATIONS {
        if migration.version > current_version {
            info!(
                version = migration.version,
                name = migration.name,
                "Applying migration"
            );
            db.query(migration.sql).await?.check().map_err(|e| {
                DbError::Migration(format!(
                    "Migration v{} '{}' failed: {}",
                    migration.version, migration.name, e,
                ))
            })?;

            // Record the applied migration.
            db.query(
                "CREATE _migration SET version = $version, \
                 name = $name",
            )
            .bind(("version", migration.version))
            .bind(("name", migration.name))
            .await?
            .check()
            .map_err(|e| {
                DbError::Migration(format!(
                    "Failed to record migration v{}: {}",
                    migration.version, e,
                ))
            })?;

            info!(
                version = migration.version,
                "Migration applied successfully"
            );
        }
    }

    Ok(())
}

/// Returns the raw schema DDL for version 1.
///
/// Exposed for testing with in-memory SurrealDB instances that
/// bypass the migration runner.
pub fn schema_v1() -> &'static str {
    SCHEMA_V1
}
