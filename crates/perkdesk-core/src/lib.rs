//! PerkDesk Core — domain models, the incentive ledger and account
//! lockout kernels, and the traits the other crates implement.

pub mod error;
pub mod incentive;
pub mod lockout;
pub mod models;
pub mod notify;
pub mod repository;
