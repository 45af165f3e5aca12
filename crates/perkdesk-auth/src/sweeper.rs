//! Periodic auto-unlock sweep.
//!
//! Runs [`AuthService::sweep_auto_unlock`] on a fixed interval so that
//! expired locks clear without waiting for the next read. The
//! sweep-on-read paths in the service remain in place.

use std::sync::Arc;
use std::time::Duration;

use perkdesk_core::notify::WarningNotifier;
use perkdesk_core::repository::AdminRepository;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

use crate::service::AuthService;

/// Shortest period the loop will run at.
const MIN_SWEEP_PERIOD: Duration = Duration::from_millis(1);

/// Spawn the sweep loop. It stops when `shutdown` changes or its sender
/// is dropped. A zero `period` is raised to [`MIN_SWEEP_PERIOD`].
pub fn spawn_auto_unlock_sweeper<A, N>(
    service: Arc<AuthService<A, N>>,
    period: Duration,
    mut shutdown: watch::Receiver<bool>,
) -> JoinHandle<()>
where
    A: AdminRepository + 'static,
    N: WarningNotifier + 'static,
{
    let period = period.max(MIN_SWEEP_PERIOD);

    tokio::spawn(async move {
        info!(period_secs = period.as_secs_f64(), "Auto-unlock sweeper started");

        let mut ticker = tokio::time::interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    match service.sweep_auto_unlock().await {
                        Ok(0) => debug!("Auto-unlock sweep found nothing to unlock"),
                        Ok(_) => {}
                        Err(e) => warn!(error = %e, "Auto-unlock sweep failed"),
                    }
                }
                _ = shutdown.changed() => break,
            }
        }

        info!("Auto-unlock sweeper stopped");
    })
}
