//! Authentication configuration.

use perkdesk_core::lockout::DEFAULT_FAILED_LOGIN_WARNING_THRESHOLD;

/// Configuration for the admin authentication service.
#[derive(Debug, Clone)]
pub struct AuthConfig {
    /// Optional pepper prepended to passwords before Argon2id verification.
    /// Must match the pepper the admin repository hashes with.
    pub pepper: Option<String>,
    /// Minimum password length accepted when creating admins.
    pub min_password_length: usize,
    /// Failed login count above which the account holder is emailed
    /// (default: 5). Logins are never blocked by this count.
    pub failed_login_warning_threshold: u32,
    /// Period of the background auto-unlock sweep in seconds.
    /// `None` leaves expiry to the sweep-on-read path only.
    pub auto_unlock_sweep_interval_secs: Option<u64>,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            pepper: None,
            min_password_length: 8,
            failed_login_warning_threshold: DEFAULT_FAILED_LOGIN_WARNING_THRESHOLD,
            auto_unlock_sweep_interval_secs: Some(60),
        }
    }
}
