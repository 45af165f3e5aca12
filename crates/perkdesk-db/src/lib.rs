//! PerkDesk Database — SurrealDB connection management and repository
//! implementations.
//!
//! This crate provides:
//! - Connection lifecycle ([`DbManager`], [`DbConfig`])
//! - Schema initialization and migrations ([`run_migrations`])
//! - Error types ([`DbError`])
//! - [`repository`] implementations of the `perkdesk-core` traits

mod connection;
mod error;
pub mod repository;
mod schema;

pub use connection::{DbConfig, DbManager};
pub use error::DbError;
pub use repository::{SurrealAdminRepository, SurrealEmployeeRepository, hash_password};
pub use schema::{run_migrations, schema_v1};
