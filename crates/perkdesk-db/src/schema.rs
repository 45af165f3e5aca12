//! Schema definitions and migration runner for SurrealDB.
//!
//! All table definitions use SCHEMAFULL mode. UUIDs are stored as
//! strings and enums as strings with ASSERT constraints. Schema-less
//! attribute maps and the incentive ledger document are FLEXIBLE
//! objects.

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
// Schema v1
// -----------------------------------------------------------------------

const SCHEMA_V1: &str = "\
-- =======================================================================
-- Admins
-- =======================================================================
DEFINE TABLE admin SCHEMAFULL;
DEFINE FIELD name ON TABLE admin TYPE string;
DEFINE FIELD email ON TABLE admin TYPE string;
DEFINE FIELD password_hash ON TABLE admin TYPE string;
DEFINE FIELD status ON TABLE admin TYPE string \
    ASSERT $value IN ['Active', 'Inactive'];
DEFINE FIELD account_locked_until ON TABLE admin TYPE option<datetime>;
DEFINE FIELD account_lock_reason ON TABLE admin TYPE string DEFAULT '';
DEFINE FIELD failed_login_attempts ON TABLE admin TYPE int DEFAULT 0 \
    ASSERT $value >= 0;
DEFINE FIELD last_login ON TABLE admin TYPE option<datetime>;
DEFINE FIELD last_login_ip ON TABLE admin TYPE option<string>;
DEFINE FIELD meta ON TABLE admin TYPE object FLEXIBLE DEFAULT {};
DEFINE FIELD created_at ON TABLE admin TYPE datetime \
    DEFAULT time::now();
DEFINE FIELD updated_at ON TABLE admin TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX idx_admin_email ON TABLE admin \
    COLUMNS email UNIQUE;
DEFINE INDEX idx_admin_lock ON TABLE admin \
    COLUMNS status, account_locked_until;

-- =======================================================================
-- Employees
-- =======================================================================
DEFINE TABLE employee SCHEMAFULL;
DEFINE FIELD name ON TABLE employee TYPE string;
DEFINE FIELD email ON TABLE employee TYPE string;
DEFINE FIELD phone ON TABLE employee TYPE option<string>;
DEFINE FIELD designation ON TABLE employee TYPE option<string>;
DEFINE FIELD status ON TABLE employee TYPE string \
    ASSERT $value IN ['Active', 'Inactive'];
DEFINE FIELD ledger ON TABLE employee TYPE object FLEXIBLE DEFAULT {};
DEFINE FIELD additional_fields ON TABLE employee TYPE object FLEXIBLE \
    DEFAULT {};
DEFINE FIELD created_at ON TABLE employee TYPE datetime \
    DEFAULT time::now();
DEFINE FIELD updated_at ON TABLE employee TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX idx_employee_email ON TABLE employee \
    COLUMNS email UNIQUE;
";

// -----------------------------------------------------------------------
// Public API
// -----------------------------------------------------------------------

/// Run all pending migrations against the given SurrealDB client.
///
/// Creates a `_migration` tracking table on first run, then applies
/// each migration whose version exceeds the current maximum.
pub async fn run_migrations<C: Connection>(db: &Surreal<C>) -> Result<(), DbError> {
    db.query(MIGRATION_TABLE_DDL)
        .await?
        .check()
        .map_err(|e| DbError::Migration(e.to_string()))?;

    let mut result = db
        .query("SELECT * FROM _migration ORDER BY version DESC LIMIT 1")
        .await?;
    let records: Vec<MigrationRecord> = result.take(0)?;
    let current_version = records.first().map(|m| m.version).unwrap_or(0);

    for migration in MIGRATIONS {
        if migration.version <= current_version {
            continue;
        }

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

    Ok(())
}

/// Returns the raw schema DDL for version 1.
pub fn schema_v1() -> &'static str {
    SCHEMA_V1
}
