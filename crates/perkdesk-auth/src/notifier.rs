//! Warning notifier that records the event in the log instead of
//! sending mail. Real delivery is wired in by the host application.

use perkdesk_core::notify::WarningNotifier;
use tracing::warn;

#[derive(Debug, Clone, Default)]
pub struct TracingNotifier;

impl WarningNotifier for TracingNotifier {
    async fn send_warning_email(&self, email: &str, name: &str, failed_attempts: u32) -> bool {
        warn!(
            email,
            name,
            failed_attempts,
            "Repeated failed logins; account holder should be warned"
        );
        true
    }
}
