//! PerkDesk Ledger — loads an employee, applies an incentive ledger
//! operation and saves the ledger back.

pub mod service;

pub use service::IncentiveService;
