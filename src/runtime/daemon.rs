//! Periodic SLA watcher on the tokio runtime.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use tokio::time::MissedTickBehavior;

use crate::core::{AllocationService, CaseStore, RegistrySource};

/// Totals accumulated while the watcher ran.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct WatchSummary {
    /// Sweeps that completed.
    pub sweeps: u64,
    /// Cases revoked across all sweeps.
    pub revoked: usize,
    /// Sweeps that failed and were skipped.
    pub failures: u64,
}

/// Run an SLA sweep every `every` until `shutdown` resolves.
///
/// The first sweep runs immediately. Sweeps execute on the blocking pool since
/// store backends do synchronous I/O. A failed sweep is logged and the next
/// tick is the retry.
pub async fn run_sla_watcher<S, R, F>(
    service: Arc<AllocationService<S, R>>,
    every: Duration,
    shutdown: F,
) -> WatchSummary
where
    S: CaseStore + 'static,
    R: RegistrySource + 'static,
    F: Future<Output = ()>,
{
    let mut summary = WatchSummary::default();
    let mut ticker = tokio::time::interval(every);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    tokio::pin!(shutdown);
    tracing::info!("SLA watcher started; sweeping every {:?}", every);

    loop {
        tokio::select! {
            biased;
            () = &mut shutdown => {
                tracing::info!("SLA watcher shutting down");
                break;
            }
            _ = ticker.tick() => {
                let svc = Arc::clone(&service);
                match tokio::task::spawn_blocking(move || svc.check_sla()).await {
                    Ok(Ok(report)) => {
                        summary.sweeps += 1;
                        summary.revoked += report.revoked.len();
                    }
                    Ok(Err(e)) => {
                        summary.failures += 1;
                        tracing::error!("SLA sweep failed: {}", e);
                    }
                    Err(e) => {
                        summary.failures += 1;
                        tracing::error!("SLA sweep task aborted: {}", e);
                    }
                }
            }
        }
    }
    summary
}
