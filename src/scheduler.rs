use anyhow::Result;
use std::sync::Arc;
use tokio::sync::RwLock;
use tokio::time::Duration;
use tokio_cron_scheduler::{Job, JobScheduler};
use tracing::{error, info};

use crate::config::SchedulerConfig;
use crate::services::PeriodService;

/// Background scheduler driving period rotation on a cron expression.
pub struct Scheduler {
    period_service: Arc<dyn PeriodService>,
    config: SchedulerConfig,
    running: Arc<RwLock<bool>>,
}

impl Scheduler {
    pub fn new(period_service: Arc<dyn PeriodService>, config: SchedulerConfig) -> Self {
        Self {
            period_service,
            config,
            running: Arc::new(RwLock::new(false)),
        }
    }

    pub async fn start(&self) -> Result<()> {
        if !self.config.enabled {
            info!("Scheduler is disabled in config");
            return Ok(());
        }

        *self.running.write().await = true;
        info!("Starting rotation scheduler");

        let mut sched = JobScheduler::new().await?;

        let period_service = Arc::clone(&self.period_service);
        let running = Arc::clone(&self.running);

        let job = Job::new_async(self.config.rotation_cron.as_str(), move |_uuid, _lock| {
            let period_service = Arc::clone(&period_service);
            let running = Arc::clone(&running);
            Box::pin(async move {
                if !*running.read().await {
                    return;
                }
                match period_service.rotate().await {
                    Ok(outcome) => info!(
                        period_id = %outcome.new_period.period_id,
                        closed = outcome.closed_periods,
                        "Scheduled period rotation complete"
                    ),
                    Err(e) => error!("Scheduled period rotation failed: {}", e),
                }
            })
        })?;

        sched.add(job).await?;
        sched.start().await?;

        info!("Scheduler running with cron: {}", self.config.rotation_cron);

        loop {
            if !*self.running.read().await {
                break;
            }
            tokio::time::sleep(Duration::from_secs(1)).await;
        }

        sched.shutdown().await?;
        Ok(())
    }

    pub async fn stop(&self) {
        info!("Stopping scheduler...");
        *self.running.write().await = false;
    }

    pub async fn is_running(&self) -> bool {
        *self.running.read().await
    }

    /// One-shot rotation, used by the `rotate` subcommand.
    pub async fn run_once(&self) -> Result<()> {
        info!("Running manual period rotation...");
        let outcome = self.period_service.rotate().await?;
        info!(
            period_id = %outcome.new_period.period_id,
            closed = outcome.closed_periods,
            "Period rotation complete"
        );
        Ok(())
    }
}
