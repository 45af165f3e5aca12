//! PerkDesk Auth — admin login against the lockout state machine,
//! lockout administration, and the auto-unlock sweep.

pub mod config;
pub mod error;
pub mod notifier;
pub mod password;
pub mod service;
pub mod sweeper;

pub use config::AuthConfig;
pub use error::AuthError;
pub use notifier::TracingNotifier;
pub use service::{AuthService, LoginInput, LoginOutput};
pub use sweeper::spawn_auto_unlock_sweeper;
