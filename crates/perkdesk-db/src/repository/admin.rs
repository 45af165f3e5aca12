//! SurrealDB implementation of [`AdminRepository`].
//!
//! Password hashing uses Argon2id with OWASP-recommended parameters
//! (memory: 19 MiB, iterations: 2, parallelism: 1). Salt is randomly
//! generated per hash. An optional pepper (server-side secret) can be
//! provided at construction time.

use argon2::password_hash::SaltString;
use argon2::{Argon2, PasswordHasher};
use chrono::{DateTime, Utc};
use perkdesk_core::error::PerkdeskResult;
use perkdesk_core::lockout::{AccountLockState, AccountStatus};
use perkdesk_core::models::admin::{Admin, CreateAdmin, UpdateAdmin};
use perkdesk_core::repository::{AdminRepository, PaginatedResult, Pagination};
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use uuid::Uuid;

use super::{CountRow, into_object, parse_uuid};
use crate::error::DbError;

const ENTITY: &str = "admin";

/// DB-side row struct for queries where the UUID is already known.
#[derive(Debug, SurrealValue)]
struct AdminRow {
    name: String,
    email: String,
    password_hash: String,
    status: String,
    account_locked_until: Option<DateTime<Utc>>,
    account_lock_reason: String,
    failed_login_attempts: u32,
    last_login: Option<DateTime<Utc>>,
    last_login_ip: Option<String>,
    meta: serde_json::Value,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

/// DB-side row struct that includes the record ID via `meta::id(id)`.
#[derive(Debug, SurrealValue)]
struct AdminRowWithId {
    record_id: String,
    name: String,
    email: String,
    password_hash: String,
    status: String,
    account_locked_until: Option<DateTime<Utc>>,
    account_lock_reason: String,
    failed_login_attempts: u32,
    last_login: Option<DateTime<Utc>>,
    last_login_ip: Option<String>,
    meta: serde_json::Value,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

fn parse_status(s: &str) -> Result<AccountStatus, DbError> {
    match s {
        "Active" => Ok(AccountStatus::Active),
        "Inactive" => Ok(AccountStatus::Inactive),
        other => Err(DbError::invalid_row(
            ENTITY,
            format!("unknown account status: {other}"),
        )),
    }
}

impl AdminRow {
    fn into_admin(self, id: Uuid) -> Result<Admin, DbError> {
        Ok(Admin {
            id,
            name: self.name,
            email: self.email,
            password_hash: self.password_hash,
            lock: AccountLockState {
                status: parse_status(&self.status)?,
                account_locked_until: self.account_locked_until,
                account_lock_reason: self.account_lock_reason,
                failed_login_attempts: self.failed_login_attempts,
            },
            last_login: self.last_login,
            last_login_ip: self.last_login_ip,
            meta: into_object(self.meta),
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

impl AdminRowWithId {
    fn try_into_admin(self) -> Result<Admin, DbError> {
        let id = parse_uuid(ENTITY, &self.record_id)?;
        AdminRow {
            name: self.name,
            email: self.email,
            password_hash: self.password_hash,
            status: self.status,
            account_locked_until: self.account_locked_until,
            account_lock_reason: self.account_lock_reason,
            failed_login_attempts: self.failed_login_attempts,
            last_login: self.last_login,
            last_login_ip: self.last_login_ip,
            meta: self.meta,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
        .into_admin(id)
    }
}

/// Hash a password with Argon2id using OWASP-recommended parameters.
///
/// If a pepper is provided, it is prepended to the password before
/// hashing. The salt is randomly generated for each call.
pub fn hash_password(password: &str, pepper: Option<&str>) -> Result<String, DbError> {
    // OWASP ASVS recommended: m=19456 (19 MiB), t=2, p=1
    let params = argon2::Params::new(19456, 2, 1, None)
        .map_err(|e| DbError::Query(format!("argon2 params error: {e}")))?;
    let argon2 = Argon2::new(argon2::Algorithm::Argon2id, argon2::Version::V0x13, params);

    let peppered: String;
    let input = match pepper {
        Some(p) => {
            peppered = format!("{p}{password}");
            peppered.as_bytes()
        }
        None => password.as_bytes(),
    };

    let salt = SaltString::generate(&mut argon2::password_hash::rand_core::OsRng);
    let hash = argon2
        .hash_password(input, &salt)
        .map_err(|e| DbError::Query(format!("password hash error: {e}")))?;

    Ok(hash.to_string())
}

/// SurrealDB implementation of the Admin repository.
#[derive(Clone)]
pub struct SurrealAdminRepository<C: Connection> {
    db: Surreal<C>,
    /// Optional server-side pepper for password hashing.
    pepper: Option<String>,
}

impl<C: Connection> SurrealAdminRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db, pepper: None }
    }

    pub fn with_pepper(db: Surreal<C>, pepper: String) -> Self {
        Self {
            db,
            pepper: Some(pepper),
        }
    }

    async fn select_one_by(&self, field: &'static str, value: String) -> Result<Admin, DbError> {
        let query = format!(
            "SELECT meta::id(id) AS record_id, * FROM admin \
             WHERE {field} = $value"
        );
        let mut result = self
            .db
            .query(&query)
            .bind(("value", value.clone()))
            .await?;

        let rows: Vec<AdminRowWithId> = result.take(0)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: ENTITY.into(),
            id: format!("{field}={value}"),
        })?;

        row.try_into_admin()
    }
}

impl<C: Connection> AdminRepository for SurrealAdminRepository<C> {
    async fn create(&self, input: CreateAdmin) -> PerkdeskResult<Admin> {
        let id = Uuid::new_v4();
        let id_str = id.to_string();

        let password_hash = hash_password(&input.password, self.pepper.as_deref())?;
        let meta = serde_json::Value::Object(input.meta.unwrap_or_default());

        let result = self
            .db
            .query(
                "CREATE type::record('admin', $id) SET \
                 name = $name, email = $email, \
                 password_hash = $password_hash, \
                 status = 'Active', \
                 account_locked_until = NONE, \
                 account_lock_reason = '', \
                 failed_login_attempts = 0, \
                 last_login = NONE, \
                 last_login_ip = NONE, \
                 meta = $meta",
            )
            .bind(("id", id_str.clone()))
            .bind(("name", input.name))
            .bind(("email", input.email))
            .bind(("password_hash", password_hash))
            .bind(("meta", meta))
            .await
            .map_err(DbError::from)?;

        let mut result = result
            .check()
            .map_err(|e| DbError::from_check(ENTITY, e))?;

        let rows: Vec<AdminRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: ENTITY.into(),
            id: id_str,
        })?;

        Ok(row.into_admin(id)?)
    }

    async fn get_by_id(&self, id: Uuid) -> PerkdeskResult<Admin> {
        let id_str = id.to_string();

        let mut result = self
            .db
            .query("SELECT * FROM type::record('admin', $id)")
            .bind(("id", id_str.clone()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<AdminRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: ENTITY.into(),
            id: id_str,
        })?;

        Ok(row.into_admin(id)?)
    }

    async fn get_by_email(&self, email: &str) -> PerkdeskResult<Admin> {
        Ok(self.select_one_by("email", email.to_string()).await?)
    }

    async fn update(&self, id: Uuid, input: UpdateAdmin) -> PerkdeskResult<Admin> {
        let id_str = id.to_string();

        let mut sets = Vec::new();
        if input.name.is_some() {
            sets.push("name = $name");
        }
        if input.email.is_some() {
            sets.push("email = $email");
        }
        if input.password_hash.is_some() {
            sets.push("password_hash = $password_hash");
        }
        if input.meta.is_some() {
            sets.push("meta = $meta");
        }
        sets.push("updated_at = time::now()");

        let query = format!(
            "UPDATE type::record('admin', $id) SET {}",
            sets.join(", ")
        );

        let mut builder = self.db.query(&query).bind(("id", id_str.clone()));

        if let Some(name) = input.name {
            builder = builder.bind(("name", name));
        }
        if let Some(email) = input.email {
            builder = builder.bind(("email", email));
        }
        if let Some(password_hash) = input.password_hash {
            builder = builder.bind(("password_hash", password_hash));
        }
        if let Some(meta) = input.meta {
            builder = builder.bind(("meta", serde_json::Value::Object(meta)));
        }

        let result = builder.await.map_err(DbError::from)?;
        let mut result = result
            .check()
            .map_err(|e| DbError::from_check(ENTITY, e))?;

        let rows: Vec<AdminRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: ENTITY.into(),
            id: id_str,
        })?;

        Ok(row.into_admin(id)?)
    }

    async fn save_lock_state(&self, id: Uuid, lock: &AccountLockState) -> PerkdeskResult<Admin> {
        let id_str = id.to_string();

        let result = self
            .db
            .query(
                "UPDATE type::record('admin', $id) SET \
                 status = $status, \
                 account_locked_until = $account_locked_until, \
                 account_lock_reason = $account_lock_reason, \
                 failed_login_attempts = $failed_login_attempts, \
                 updated_at = time::now()",
            )
            .bind(("id", id_str.clone()))
            .bind(("status", lock.status.as_str().to_string()))
            .bind(("account_locked_until", lock.account_locked_until))
            .bind(("account_lock_reason", lock.account_lock_reason.clone()))
            .bind(("failed_login_attempts", lock.failed_login_attempts))
            .await
            .map_err(DbError::from)?;

        let mut result = result
            .check()
            .map_err(|e| DbError::from_check(ENTITY, e))?;

        let rows: Vec<AdminRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: ENTITY.into(),
            id: id_str,
        })?;

        Ok(row.into_admin(id)?)
    }

    async fn record_login(
        &self,
        id: Uuid,
        at: DateTime<Utc>,
        ip: Option<String>,
    ) -> PerkdeskResult<Admin> {
        let id_str = id.to_string();

        let result = self
            .db
            .query(
                "UPDATE type::record('admin', $id) SET \
                 last_login = $last_login, \
                 last_login_ip = $last_login_ip, \
                 updated_at = time::now()",
            )
            .bind(("id", id_str.clone()))
            .bind(("last_login", at))
            .bind(("last_login_ip", ip))
            .await
            .map_err(DbError::from)?;

        let mut result = result
            .check()
            .map_err(|e| DbError::from_check(ENTITY, e))?;

        let rows: Vec<AdminRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: ENTITY.into(),
            id: id_str,
        })?;

        Ok(row.into_admin(id)?)
    }

    async fn delete(&self, id: Uuid) -> PerkdeskResult<()> {
        self.db
            .query("DELETE type::record('admin', $id)")
            .bind(("id", id.to_string()))
            .await
            .map_err(DbError::from)?;

        Ok(())
    }

    async fn list(&self, pagination: Pagination) -> PerkdeskResult<PaginatedResult<Admin>> {
        let mut count_result = self
            .db
            .query("SELECT count() AS total FROM admin GROUP ALL")
            .await
            .map_err(DbError::from)?;
        let count_rows: Vec<CountRow> = count_result.take(0).map_err(DbError::from)?;
        let total = count_rows.first().map(|r| r.total).unwrap_or(0);

        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * FROM admin \
                 ORDER BY created_at ASC \
                 LIMIT $limit START $offset",
            )
            .bind(("limit", pagination.limit))
            .bind(("offset", pagination.offset))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<AdminRowWithId> = result.take(0).map_err(DbError::from)?;

        let items = rows
            .into_iter()
            .map(|row| row.try_into_admin())
            .collect::<Result<Vec<_>, DbError>>()?;

        Ok(PaginatedResult {
            items,
            total,
            offset: pagination.offset,
            limit: pagination.limit,
        })
    }

    async fn list_lock_expired(&self, now: DateTime<Utc>) -> PerkdeskResult<Vec<Admin>> {
        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * FROM admin \
                 WHERE status = 'Inactive' \
                 AND account_locked_until != NONE \
                 AND account_locked_until <= $now",
            )
            .bind(("now", now))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<AdminRowWithId> = result.take(0).map_err(DbError::from)?;

        Ok(rows
            .into_iter()
            .map(|row| row.try_into_admin())
            .collect::<Result<Vec<_>, DbError>>()?)
    }
}
