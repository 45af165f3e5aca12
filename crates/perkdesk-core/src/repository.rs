//! Repository trait definitions for data access abstraction.
//!
//! All repository operations are async. Each aggregate is saved back as
//! a whole after a kernel operation; there is no version check, so the
//! last write wins.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::error::PerkdeskResult;
use crate::incentive::IncentiveLedger;
use crate::lockout::AccountLockState;
use crate::models::{
    admin::{Admin, CreateAdmin, UpdateAdmin},
    employee::{CreateEmployee, Employee, UpdateEmployee},
};

/// Pagination parameters for list queries.
#[derive(Debug, Clone)]
pub struct Pagination {
    pub offset: u64,
    pub limit: u64,
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            offset: 0,
            limit: 50,
        }
    }
}

/// A paginated result set.
#[derive(Debug, Clone)]
pub struct PaginatedResult<T> {
    pub items: Vec<T>,
    pub total: u64,
    pub offset: u64,
    pub limit: u64,
}

pub trait AdminRepository: Send + Sync {
    fn create(&self, input: CreateAdmin) -> impl Future<Output = PerkdeskResult<Admin>> + Send;
    fn get_by_id(&self, id: Uuid) -> impl Future<Output = PerkdeskResult<Admin>> + Send;
    fn get_by_email(&self, email: &str) -> impl Future<Output = PerkdeskResult<Admin>> + Send;
    fn update(
        &self,
        id: Uuid,
        input: UpdateAdmin,
    ) -> impl Future<Output = PerkdeskResult<Admin>> + Send;

    /// Persist the lockout fields (status, expiry, reason, attempts).
    fn save_lock_state(
        &self,
        id: Uuid,
        lock: &AccountLockState,
    ) -> impl Future<Output = PerkdeskResult<Admin>> + Send;

    /// Persist the last successful login timestamp and address.
    fn record_login(
        &self,
        id: Uuid,
        at: DateTime<Utc>,
        ip: Option<String>,
    ) -> impl Future<Output = PerkdeskResult<Admin>> + Send;

    fn delete(&self, id: Uuid) -> impl Future<Output = PerkdeskResult<()>> + Send;
    fn list(
        &self,
        pagination: Pagination,
    ) -> impl Future<Output = PerkdeskResult<PaginatedResult<Admin>>> + Send;

    /// Inactive admins whose lock expiry is at or before `now`.
    fn list_lock_expired(
        &self,
        now: DateTime<Utc>,
    ) -> impl Future<Output = PerkdeskResult<Vec<Admin>>> + Send;
}

pub trait EmployeeRepository: Send + Sync {
    fn create(
        &self,
        input: CreateEmployee,
    ) -> impl Future<Output = PerkdeskResult<Employee>> + Send;
    fn get_by_id(&self, id: Uuid) -> impl Future<Output = PerkdeskResult<Employee>> + Send;
    fn get_by_email(&self, email: &str)
    -> impl Future<Output = PerkdeskResult<Employee>> + Send;
    fn update(
        &self,
        id: Uuid,
        input: UpdateEmployee,
    ) -> impl Future<Output = PerkdeskResult<Employee>> + Send;

    /// Replace the stored incentive ledger with `ledger`.
    fn save_ledger(
        &self,
        id: Uuid,
        ledger: &IncentiveLedger,
    ) -> impl Future<Output = PerkdeskResult<Employee>> + Send;

    fn delete(&self, id: Uuid) -> impl Future<Output = PerkdeskResult<()>> + Send;
    fn list(
        &self,
        pagination: Pagination,
    ) -> impl Future<Output = PerkdeskResult<PaginatedResult<Employee>>> + Send;
}
