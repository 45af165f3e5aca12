//! Authentication error types.

use chrono::{DateTime, Utc};
use perkdesk_core::error::PerkdeskError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("invalid credentials")]
    InvalidCredentials,

    #[error("account is locked: {reason}")]
    AccountLocked {
        reason: String,
        until: Option<DateTime<Utc>>,
    },

    #[error("cryptography error: {0}")]
    Crypto(String),
}

impl From<AuthError> for PerkdeskError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::InvalidCredentials => PerkdeskError::AuthenticationFailed {
                reason: err.to_string(),
            },
            AuthError::AccountLocked { reason, until } => {
                PerkdeskError::AccountLocked { reason, until }
            }
            AuthError::Crypto(msg) => PerkdeskError::Crypto(msg),
        }
    }
}
