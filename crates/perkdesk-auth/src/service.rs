//! Authentication service — admin login and lockout administration.

use chrono::{DateTime, Utc};
use perkdesk_core::error::{PerkdeskError, PerkdeskResult};
use perkdesk_core::lockout::{self, LockState};
use perkdesk_core::models::admin::{Admin, CreateAdmin};
use perkdesk_core::notify::WarningNotifier;
use perkdesk_core::repository::{AdminRepository, PaginatedResult, Pagination};
use tracing::{info, warn};
use uuid::Uuid;

use crate::config::AuthConfig;
use crate::error::AuthError;
use crate::password;

/// Input for the login flow.
#[derive(Debug)]
pub struct LoginInput {
    pub email: String,
    pub password: String,
    pub ip_address: Option<String>,
}

/// Successful login result.
#[derive(Debug)]
pub struct LoginOutput {
    pub admin_id: Uuid,
    pub name: String,
    pub email: String,
    pub last_login: DateTime<Utc>,
    /// Not reset by a successful login.
    pub failed_login_attempts: u32,
}

/// Authentication service.
///
/// Generic over the repository and notifier so that the auth layer has
/// no dependency on the database crate or on mail delivery.
pub struct AuthService<A: AdminRepository, N: WarningNotifier> {
    admin_repo: A,
    notifier: N,
    config: AuthConfig,
}

impl<A: AdminRepository, N: WarningNotifier> AuthService<A, N> {
    pub fn new(admin_repo: A, notifier: N, config: AuthConfig) -> Self {
        Self {
            admin_repo,
            notifier,
            config,
        }
    }

    pub fn config(&self) -> &AuthConfig {
        &self.config
    }

    /// Create an admin after checking the password policy.
    pub async fn create_admin(&self, input: CreateAdmin) -> PerkdeskResult<Admin> {
        password::check_policy(&input.password, self.config.min_password_length)?;
        let admin = self.admin_repo.create(input).await?;
        info!(admin_id = %admin.id, "Admin created");
        Ok(admin)
    }

    /// Authenticate an admin by email and password.
    ///
    /// An expired lock is cleared first. A lock still in force rejects
    /// the attempt before the password is looked at. A wrong password
    /// bumps the failed attempt counter; past the warning threshold the
    /// account holder is notified, but the login is not blocked by the
    /// count alone.
    pub async fn login(&self, input: LoginInput) -> PerkdeskResult<LoginOutput> {
        // 1. Look up admin.
        let mut admin = match self.admin_repo.get_by_email(&input.email).await {
            Ok(a) => a,
            Err(PerkdeskError::NotFound { .. }) => {
                return Err(AuthError::InvalidCredentials.into());
            }
            Err(e) => return Err(e),
        };

        // 2. Clear an expired lock before judging the account.
        let now = Utc::now();
        self.unlock_if_expired(&mut admin, now).await?;

        // 3. Reject locked accounts before comparing passwords.
        match admin
            .lock
            .state(now, self.config.failed_login_warning_threshold)
        {
            LockState::TimeLocked { until, reason } => {
                return Err(AuthError::AccountLocked {
                    reason,
                    until: Some(until),
                }
                .into());
            }
            LockState::IndefinitelyLocked { reason } => {
                return Err(AuthError::AccountLocked {
                    reason,
                    until: None,
                }
                .into());
            }
            LockState::Active | LockState::ActiveWithWarning { .. } => {}
        }

        // 4. Verify password.
        let valid = password::verify_password(
            &input.password,
            &admin.password_hash,
            self.config.pepper.as_deref(),
        )?;

        if !valid {
            self.record_failed_login(&mut admin).await?;
            return Err(AuthError::InvalidCredentials.into());
        }

        // 5. Record the login; the attempt counter stays as it is.
        admin.record_successful_login(input.ip_address, now);
        let admin = self
            .admin_repo
            .record_login(admin.id, now, admin.last_login_ip.clone())
            .await?;

        info!(admin_id = %admin.id, "Admin logged in");

        Ok(LoginOutput {
            admin_id: admin.id,
            name: admin.name,
            email: admin.email,
            last_login: now,
            failed_login_attempts: admin.lock.failed_login_attempts,
        })
    }

    /// Lock an account. `until = None` locks it until an explicit unlock.
    pub async fn lock_account(
        &self,
        id: Uuid,
        reason: &str,
        until: Option<DateTime<Utc>>,
    ) -> PerkdeskResult<Admin> {
        if until.is_some_and(|u| u <= Utc::now()) {
            return Err(PerkdeskError::validation("until", "must be in the future"));
        }

        let mut admin = self.admin_repo.get_by_id(id).await?;
        admin.lock.lock(reason, until);
        let admin = self.admin_repo.save_lock_state(id, &admin.lock).await?;

        info!(admin_id = %id, reason, until = ?until, "Admin account locked");
        Ok(admin)
    }

    pub async fn unlock_account(&self, id: Uuid) -> PerkdeskResult<Admin> {
        let mut admin = self.admin_repo.get_by_id(id).await?;
        admin.lock.unlock();
        let admin = self.admin_repo.save_lock_state(id, &admin.lock).await?;

        info!(admin_id = %id, "Admin account unlocked");
        Ok(admin)
    }

    /// Administrative reset of the failed login counter.
    pub async fn reset_attempts(&self, id: Uuid) -> PerkdeskResult<Admin> {
        let mut admin = self.admin_repo.get_by_id(id).await?;
        admin.lock.reset_attempts();
        let admin = self.admin_repo.save_lock_state(id, &admin.lock).await?;

        info!(admin_id = %id, "Failed login attempts reset");
        Ok(admin)
    }

    /// Current lock state of an account, after clearing an expired lock.
    pub async fn account_state(&self, id: Uuid) -> PerkdeskResult<LockState> {
        let mut admin = self.admin_repo.get_by_id(id).await?;
        let now = Utc::now();
        self.unlock_if_expired(&mut admin, now).await?;
        Ok(admin
            .lock
            .state(now, self.config.failed_login_warning_threshold))
    }

    /// List admins, clearing expired locks first so the page reflects
    /// current state.
    pub async fn list_admins(
        &self,
        pagination: Pagination,
    ) -> PerkdeskResult<PaginatedResult<Admin>> {
        self.sweep_auto_unlock().await?;
        self.admin_repo.list(pagination).await
    }

    /// Unlock every account whose time lock has expired. Returns the
    /// number of accounts unlocked.
    pub async fn sweep_auto_unlock(&self) -> PerkdeskResult<usize> {
        let now = Utc::now();
        let mut expired = self.admin_repo.list_lock_expired(now).await?;
        let unlocked = lockout::sweep_auto_unlock(expired.iter_mut().map(|a| &mut a.lock), now);

        for admin in &expired {
            self.admin_repo.save_lock_state(admin.id, &admin.lock).await?;
        }

        if unlocked > 0 {
            info!(unlocked, "Auto-unlocked admin accounts with expired locks");
        }
        Ok(unlocked)
    }

    async fn unlock_if_expired(&self, admin: &mut Admin, now: DateTime<Utc>) -> PerkdeskResult<()> {
        if !admin.lock.is_lock_expired(now) {
            return Ok(());
        }
        admin.lock.unlock();
        self.admin_repo.save_lock_state(admin.id, &admin.lock).await?;
        info!(admin_id = %admin.id, "Expired account lock cleared");
        Ok(())
    }

    async fn record_failed_login(&self, admin: &mut Admin) -> PerkdeskResult<u32> {
        let attempts = admin.lock.record_failed_login();
        self.admin_repo.save_lock_state(admin.id, &admin.lock).await?;
        warn!(admin_id = %admin.id, attempts, "Failed admin login");

        if attempts > self.config.failed_login_warning_threshold {
            let sent = self
                .notifier
                .send_warning_email(&admin.email, &admin.name, attempts)
                .await;
            if !sent {
                warn!(admin_id = %admin.id, attempts, "Failed to send login warning email");
            }
        }
        Ok(attempts)
    }
}
