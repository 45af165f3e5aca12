//! Admin domain model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

use crate::lockout::AccountLockState;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Admin {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub lock: AccountLockState,
    pub last_login: Option<DateTime<Utc>>,
    pub last_login_ip: Option<String>,
    /// Free-form attributes; no keys are assumed.
    pub meta: Map<String, Value>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Admin {
    /// Record a successful login.
    ///
    /// The failed attempt counter is intentionally left as is; only an
    /// explicit [`AccountLockState::reset_attempts`] clears it.
    pub fn record_successful_login(&mut self, ip: Option<String>, at: DateTime<Utc>) {
        self.last_login = Some(at);
        self.last_login_ip = ip;
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateAdmin {
    pub name: String,
    pub email: String,
    /// Raw password (will be hashed with Argon2id before storage).
    pub password: String,
    pub meta: Option<Map<String, Value>>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct UpdateAdmin {
    pub name: Option<String>,
    pub email: Option<String>,
    /// Already-hashed replacement password.
    pub password_hash: Option<String>,
    pub meta: Option<Map<String, Value>>,
}
