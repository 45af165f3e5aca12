//! SurrealDB implementation of [`EmployeeRepository`].
//!
//! The incentive ledger is stored as one JSON document in the `ledger`
//! column and always written back whole, after [`IncentiveLedger::validate`].

use chrono::{DateTime, Utc};
use perkdesk_core::error::PerkdeskResult;
use perkdesk_core::incentive::IncentiveLedger;
use perkdesk_core::models::employee::{CreateEmployee, Employee, EmployeeStatus, UpdateEmployee};
use perkdesk_core::repository::{EmployeeRepository, PaginatedResult, Pagination};
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use uuid::Uuid;

use super::{CountRow, into_object, parse_uuid};
use crate::error::DbError;

const ENTITY: &str = "employee";

#[derive(Debug, SurrealValue)]
struct EmployeeRow {
    name: String,
    email: String,
    phone: Option<String>,
    designation: Option<String>,
    status: String,
    ledger: serde_json::Value,
    additional_fields: serde_json::Value,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

#[derive(Debug, SurrealValue)]
struct EmployeeRowWithId {
    record_id: String,
    name: String,
    email: String,
    phone: Option<String>,
    designation: Option<String>,
    status: String,
    ledger: serde_json::Value,
    additional_fields: serde_json::Value,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

fn parse_status(s: &str) -> Result<EmployeeStatus, DbError> {
    match s {
        "Active" => Ok(EmployeeStatus::Active),
        "Inactive" => Ok(EmployeeStatus::Inactive),
        other => Err(DbError::invalid_row(
            ENTITY,
            format!("unknown employee status: {other}"),
        )),
    }
}

fn status_to_string(s: EmployeeStatus) -> &'static str {
    match s {
        EmployeeStatus::Active => "Active",
        EmployeeStatus::Inactive => "Inactive",
    }
}

fn encode_ledger(ledger: &IncentiveLedger) -> Result<serde_json::Value, DbError> {
    Ok(serde_json::to_value(ledger)?)
}

impl EmployeeRow {
    fn into_employee(self, id: Uuid) -> Result<Employee, DbError> {
        let ledger: IncentiveLedger = serde_json::from_value(self.ledger)
            .map_err(|e| DbError::invalid_row(ENTITY, format!("ledger: {e}")))?;
        Ok(Employee {
            id,
            name: self.name,
            email: self.email,
            phone: self.phone,
            designation: self.designation,
            status: parse_status(&self.status)?,
            ledger,
            additional_fields: into_object(self.additional_fields),
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

impl EmployeeRowWithId {
    fn try_into_employee(self) -> Result<Employee, DbError> {
        let id = parse_uuid(ENTITY, &self.record_id)?;
        EmployeeRow {
            name: self.name,
            email: self.email,
            phone: self.phone,
            designation: self.designation,
            status: self.status,
            ledger: self.ledger,
            additional_fields: self.additional_fields,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
        .into_employee(id)
    }
}

/// SurrealDB implementation of the Employee repository.
#[derive(Clone)]
pub struct SurrealEmployeeRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealEmployeeRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }
}

impl<C: Connection> EmployeeRepository for SurrealEmployeeRepository<C> {
    async fn create(&self, input: CreateEmployee) -> PerkdeskResult<Employee> {
        let id = Uuid::new_v4();
        let id_str = id.to_string();

        input.ledger.validate()?;
        let ledger = encode_ledger(&input.ledger)?;
        let additional_fields =
            serde_json::Value::Object(input.additional_fields.unwrap_or_default());

        let result = self
            .db
            .query(
                "CREATE type::record('employee', $id) SET \
                 name = $name, email = $email, \
                 phone = $phone, designation = $designation, \
                 status = 'Active', \
                 ledger = $ledger, \
                 additional_fields = $additional_fields",
            )
            .bind(("id", id_str.clone()))
            .bind(("name", input.name))
            .bind(("email", input.email))
            .bind(("phone", input.phone))
            .bind(("designation", input.designation))
            .bind(("ledger", ledger))
            .bind(("additional_fields", additional_fields))
            .await
            .map_err(DbError::from)?;

        let mut result = result
            .check()
            .map_err(|e| DbError::from_check(ENTITY, e))?;

        let rows: Vec<EmployeeRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: ENTITY.into(),
            id: id_str,
        })?;

        Ok(row.into_employee(id)?)
    }

    async fn get_by_id(&self, id: Uuid) -> PerkdeskResult<Employee> {
        let id_str = id.to_string();

        let mut result = self
            .db
            .query("SELECT * FROM type::record('employee', $id)")
            .bind(("id", id_str.clone()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<EmployeeRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: ENTITY.into(),
            id: id_str,
        })?;

        Ok(row.into_employee(id)?)
    }

    async fn get_by_email(&self, email: &str) -> PerkdeskResult<Employee> {
        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * FROM employee \
                 WHERE email = $email",
            )
            .bind(("email", email.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<EmployeeRowWithId> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: ENTITY.into(),
            id: format!("email={email}"),
        })?;

        Ok(row.try_into_employee()?)
    }

    async fn update(&self, id: Uuid, input: UpdateEmployee) -> PerkdeskResult<Employee> {
        let id_str = id.to_string();

        let mut sets = Vec::new();
        if input.name.is_some() {
            sets.push("name = $name");
        }
        if input.email.is_some() {
            sets.push("email = $email");
        }
        if input.phone.is_some() {
            sets.push("phone = $phone");
        }
        if input.designation.is_some() {
            sets.push("designation = $designation");
        }
        if input.status.is_some() {
            sets.push("status = $status");
        }
        if input.additional_fields.is_some() {
            sets.push("additional_fields = $additional_fields");
        }
        sets.push("updated_at = time::now()");

        let query = format!(
            "UPDATE type::record('employee', $id) SET {}",
            sets.join(", ")
        );

        let mut builder = self.db.query(&query).bind(("id", id_str.clone()));

        if let Some(name) = input.name {
            builder = builder.bind(("name", name));
        }
        if let Some(email) = input.email {
            builder = builder.bind(("email", email));
        }
        if let Some(phone) = input.phone {
            // Some(None) clears the field.
            builder = builder.bind(("phone", phone));
        }
        if let Some(designation) = input.designation {
            builder = builder.bind(("designation", designation));
        }
        if let Some(status) = input.status {
            builder = builder.bind(("status", status_to_string(status).to_string()));
        }
        if let Some(additional_fields) = input.additional_fields {
            builder = builder.bind((
                "additional_fields",
                serde_json::Value::Object(additional_fields),
            ));
        }

        let result = builder.await.map_err(DbError::from)?;
        let mut result = result
            .check()
            .map_err(|e| DbError::from_check(ENTITY, e))?;

        let rows: Vec<EmployeeRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: ENTITY.into(),
            id: id_str,
        })?;

        Ok(row.into_employee(id)?)
    }

    async fn save_ledger(&self, id: Uuid, ledger: &IncentiveLedger) -> PerkdeskResult<Employee> {
        ledger.validate()?;
        let id_str = id.to_string();
        let encoded = encode_ledger(ledger)?;

        let result = self
            .db
            .query(
                "UPDATE type::record('employee', $id) SET \
                 ledger = $ledger, updated_at = time::now()",
            )
            .bind(("id", id_str.clone()))
            .bind(("ledger", encoded))
            .await
            .map_err(DbError::from)?;

        let mut result = result
            .check()
            .map_err(|e| DbError::from_check(ENTITY, e))?;

        let rows: Vec<EmployeeRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: ENTITY.into(),
            id: id_str,
        })?;

        Ok(row.into_employee(id)?)
    }

    async fn delete(&self, id: Uuid) -> PerkdeskResult<()> {
        self.db
            .query("DELETE type::record('employee', $id)")
            .bind(("id", id.to_string()))
            .await
            .map_err(DbError::from)?;

        Ok(())
    }

    async fn list(&self, pagination: Pagination) -> PerkdeskResult<PaginatedResult<Employee>> {
        let mut count_result = self
            .db
            .query("SELECT count() AS total FROM employee GROUP ALL")
            .await
            .map_err(DbError::from)?;
        let count_rows: Vec<CountRow> = count_result.take(0).map_err(DbError::from)?;
        let total = count_rows.first().map(|r| r.total).unwrap_or(0);

        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * FROM employee \
                 ORDER BY created_at ASC \
                 LIMIT $limit START $offset",
            )
            .bind(("limit", pagination.limit))
            .bind(("offset", pagination.offset))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<EmployeeRowWithId> = result.take(0).map_err(DbError::from)?;

        let items = rows
            .into_iter()
            .map(|row| row.try_into_employee())
            .collect::<Result<Vec<_>, DbError>>()?;

        Ok(PaginatedResult {
            items,
            total,
            offset: pagination.offset,
            limit: pagination.limit,
        })
    }
}
