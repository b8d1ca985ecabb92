use anyhow::Result;
use tokio_cron_scheduler::{Job, JobScheduler};
use tracing::{error, info};

use crate::config::SchedulerConfig;
use crate::db::Store;

/// Background maintenance: periodically deletes expired sessions so the
/// table does not accumulate rows for clients that never came back.
pub struct MaintenanceScheduler {
    store: Store,
    config: SchedulerConfig,
}

impl MaintenanceScheduler {
    #[must_use]
    pub const fn new(store: Store, config: SchedulerConfig) -> Self {
        Self { store, config }
    }

    /// Starts the cron scheduler. Returns the handle; jobs run until it
    /// is shut down or the process exits.
    pub async fn start(&self) -> Result<Option<JobScheduler>> {
        if !self.config.enabled {
            info!("Scheduler is disabled in config");
            return Ok(None);
        }

        let sched = JobScheduler::new().await?;

        let store = self.store.clone();
        let job = Job::new_async(self.config.session_purge_cron.as_str(), move |_uuid, _lock| {
            let store = store.clone();
            Box::pin(async move {
                match store.purge_expired_sessions().await {
                    Ok(0) => {}
                    Ok(n) => info!("Purged {} expired sessions", n),
                    Err(e) => error!("Session purge failed: {}", e),
                }
            })
        })?;

        sched.add(job).await?;
        sched.start().await?;

        info!(
            "Scheduler running session purge with cron: {}",
            self.config.session_purge_cron
        );

        Ok(Some(sched))
    }

    /// Runs the purge once, for the `purge-sessions` CLI command.
    pub async fn run_once(&self) -> Result<u64> {
        let purged = self.store.purge_expired_sessions().await?;
        info!("Purged {} expired sessions", purged);
        Ok(purged)
    }
}
