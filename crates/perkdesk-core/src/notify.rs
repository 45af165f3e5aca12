//! Outbound notification seam.

/// Sends the "too many failed logins" warning to an account holder.
///
/// Delivery is fire-and-forget for callers: a `false` result is logged
/// and never fails the operation that triggered it.
pub trait WarningNotifier: Send + Sync {
    fn send_warning_email(
        &self,
        email: &str,
        name: &str,
        failed_attempts: u32,
    ) -> impl Future<Output = bool> + Send;
}
