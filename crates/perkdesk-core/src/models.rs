//! Domain models for PerkDesk.
//!
//! Aggregates owned by the back-office: admins (with their lockout
//! state) and employees (with their incentive ledger).

pub mod admin;
pub mod employee;
