//! Error types for the PerkDesk system.

use chrono::{DateTime, Utc};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PerkdeskError {
    #[error("Entity not found: {entity} with id {id}")]
    NotFound { entity: String, id: String },

    #[error("Entity already exists: {entity}")]
    AlreadyExists { entity: String },

    #[error("Validation error on `{field}`: {message}")]
    Validation { field: String, message: String },

    /// Reserved for optimistic concurrency on aggregate saves. Nothing
    /// raises it yet.
    #[error("Conflict on {entity}: {message}")]
    Conflict { entity: String, message: String },

    #[error("Authentication failed: {reason}")]
    AuthenticationFailed { reason: String },

    #[error("Account is locked: {reason}")]
    AccountLocked {
        reason: String,
        until: Option<DateTime<Utc>>,
    },

    #[error("Database error: {0}")]
    Database(String),

    #[error("Cryptography error: {0}")]
    Crypto(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl PerkdeskError {
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Validation {
            field: field.into(),
            message: message.into(),
        }
    }

    pub fn not_found(entity: impl Into<String>, id: impl ToString) -> Self {
        Self::NotFound {
            entity: entity.into(),
            id: id.to_string(),
        }
    }
}

pub type PerkdeskResult<T> = Result<T, PerkdeskError>;
