//! SurrealDB repository implementations.

mod admin;
mod employee;

use serde_json::{Map, Value};
use surrealdb_types::SurrealValue;
use uuid::Uuid;

use crate::error::DbError;

pub use admin::{SurrealAdminRepository, hash_password};
pub use employee::SurrealEmployeeRepository;

/// Row struct for count queries.
#[derive(Debug, SurrealValue)]
struct CountRow {
    total: u64,
}

fn parse_uuid(entity: &str, raw: &str) -> Result<Uuid, DbError> {
    Uuid::parse_str(raw).map_err(|e| DbError::invalid_row(entity, format!("invalid UUID: {e}")))
}

/// Schema-less maps are stored as FLEXIBLE objects; anything else read
/// back is treated as empty.
fn into_object(value: Value) -> Map<String, Value> {
    match value {
        Value::Object(map) => map,
        _ => Map::new(),
    }
}
