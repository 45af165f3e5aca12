//! Database-specific error types and conversions.

use perkdesk_core::error::PerkdeskError;

/// Database-layer error type.
#[derive(Debug, thiserror::Error)]
pub enum DbError {
    #[error("SurrealDB error: {0}")]
    Surreal(#[from] surrealdb::Error),

    #[error("Migration failed: {0}")]
    Migration(String),

    #[error("Query failed: {0}")]
    Query(String),

    #[error("Record not found: {entity} with id {id}")]
    NotFound { entity: String, id: String },

    #[error("Record already exists: {entity}")]
    AlreadyExists { entity: String },

    #[error("Stored {entity} record is malformed: {message}")]
    InvalidRow { entity: String, message: String },

    #[error("Document encoding failed: {0}")]
    Encoding(#[from] serde_json::Error),
}

impl DbError {
    /// Classify an error returned by `Response::check`.
    ///
    /// Unique index violations become [`DbError::AlreadyExists`].
    pub(crate) fn from_check(entity: &str, err: surrealdb::Error) -> Self {
        let message = err.to_string();
        if message.contains("already contains") {
            DbError::AlreadyExists {
                entity: entity.into(),
            }
        } else {
            DbError::Query(message)
        }
    }

    pub(crate) fn invalid_row(entity: &str, message: impl Into<String>) -> Self {
        DbError::InvalidRow {
            entity: entity.into(),
            message: message.into(),
        }
    }
}

impl From<DbError> for PerkdeskError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::NotFound { entity, id } => PerkdeskError::NotFound { entity, id },
            DbError::AlreadyExists { entity } => PerkdeskError::AlreadyExists { entity },
            other => PerkdeskError::Database(other.to_string()),
        }
    }
}
