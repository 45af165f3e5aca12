//! Admin account lockout state machine.
//!
//! An account is either `Active` or `Inactive`. An inactive account with
//! a lock expiry is time-locked; without one it stays locked until an
//! administrator unlocks it. Expired time locks are cleared by
//! [`sweep_auto_unlock`], which callers run before reading lock state.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Failed login count above which the account holder is warned.
pub const DEFAULT_FAILED_LOGIN_WARNING_THRESHOLD: u32 = 5;

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub enum AccountStatus {
    #[default]
    Active,
    Inactive,
}

impl AccountStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AccountStatus::Active => "Active",
            AccountStatus::Inactive => "Inactive",
        }
    }
}

/// Observable state derived from [`AccountLockState`] at a point in time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LockState {
    Active,
    /// Still able to log in, but failed attempts exceed the warning
    /// threshold.
    ActiveWithWarning { failed_attempts: u32 },
    TimeLocked {
        until: DateTime<Utc>,
        reason: String,
    },
    IndefinitelyLocked { reason: String },
}

impl LockState {
    pub fn is_locked(&self) -> bool {
        matches!(
            self,
            LockState::TimeLocked { .. } | LockState::IndefinitelyLocked { .. }
        )
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct AccountLockState {
    pub status: AccountStatus,
    pub account_locked_until: Option<DateTime<Utc>>,
    /// Empty while unlocked.
    pub account_lock_reason: String,
    pub failed_login_attempts: u32,
}

impl AccountLockState {
    /// Derive the observable state at `now`.
    ///
    /// An inactive account whose lock already expired reports as active;
    /// the stored record stays stale until a sweep runs.
    pub fn state(&self, now: DateTime<Utc>, warning_threshold: u32) -> LockState {
        if self.status == AccountStatus::Inactive && !self.is_lock_expired(now) {
            return match self.account_locked_until {
                Some(until) => LockState::TimeLocked {
                    until,
                    reason: self.account_lock_reason.clone(),
                },
                None => LockState::IndefinitelyLocked {
                    reason: self.account_lock_reason.clone(),
                },
            };
        }
        if self.failed_login_attempts > warning_threshold {
            LockState::ActiveWithWarning {
                failed_attempts: self.failed_login_attempts,
            }
        } else {
            LockState::Active
        }
    }

    /// Increment the failed login counter and return the new count.
    /// Status is never changed here.
    pub fn record_failed_login(&mut self) -> u32 {
        self.failed_login_attempts = self.failed_login_attempts.saturating_add(1);
        self.failed_login_attempts
    }

    pub fn reset_attempts(&mut self) {
        self.failed_login_attempts = 0;
    }

    /// Lock the account. `until = None` locks indefinitely.
    pub fn lock(&mut self, reason: impl Into<String>, until: Option<DateTime<Utc>>) {
        self.status = AccountStatus::Inactive;
        self.account_lock_reason = reason.into();
        self.account_locked_until = until;
    }

    pub fn unlock(&mut self) {
        self.status = AccountStatus::Active;
        self.account_locked_until = None;
        self.account_lock_reason.clear();
    }

    pub fn is_lock_expired(&self, now: DateTime<Utc>) -> bool {
        self.status == AccountStatus::Inactive
            && self.account_locked_until.is_some_and(|until| until <= now)
    }
}

/// Unlock every account whose time lock has expired at `now`.
///
/// Returns how many accounts changed. Indefinite locks, active accounts
/// and locks that have not yet expired are left untouched.
pub fn sweep_auto_unlock<'a, I>(accounts: I, now: DateTime<Utc>) -> usize
where
    I: IntoIterator<Item = &'a mut AccountLockState>,
{
    let mut unlocked = 0;
    for account in accounts {
        if account.is_lock_expired(now) {
            account.unlock();
            unlocked += 1;
        }
    }
    unlocked
}
