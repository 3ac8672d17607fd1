use std::error::Error;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Mutex;
use tokio_cron_scheduler::{Job, JobScheduler, JobSchedulerError};
use uuid::Uuid;

use crate::config::settings::SchedulerSettings;
use crate::services::square_update_service::SquareUpdateService;

pub struct SchedulerService {
    scheduler: Arc<Mutex<JobScheduler>>,
    update_service: Arc<SquareUpdateService>,
    cron: String,
    batch_budget: Duration,
    update_job: Mutex<Option<Uuid>>,
}

impl SchedulerService {
    pub async fn new(
        update_service: Arc<SquareUpdateService>,
        settings: &SchedulerSettings,
    ) -> Result<Self, Box<dyn Error>> {
        let scheduler = JobScheduler::new().await?;

        Ok(Self {
            scheduler: Arc::new(Mutex::new(scheduler)),
            update_service,
            cron: settings.cron.clone(),
            batch_budget: settings.batch_budget(),
            update_job: Mutex::new(None),
        })
    }

    pub async fn start(&self) -> Result<(), Box<dyn Error>> {
        self.schedule_square_updates().await?;

        let scheduler = self.scheduler.lock().await;
        scheduler.start().await?;

        tracing::info!("✅ Scheduler service started, square updates run on '{}'", self.cron);
        Ok(())
    }

    pub async fn stop(&self) -> Result<(), Box<dyn Error>> {
        let mut scheduler = self.scheduler.lock().await;
        scheduler.shutdown().await?;

        tracing::info!("🛑 Scheduler service stopped");
        Ok(())
    }

    /// Registers the periodic update cycle. Each run is cut off after the batch budget.
    pub async fn schedule_square_updates(&self) -> Result<Uuid, JobSchedulerError> {
        let mut update_job = self.update_job.lock().await;
        if let Some(job_id) = *update_job {
            return Ok(job_id);
        }

        let update_service = self.update_service.clone();
        let batch_budget = self.batch_budget;

        let job = Job::new_async(self.cron.as_str(), move |_uuid, _l| {
            let update_service = update_service.clone();

            Box::pin(async move {
                tracing::info!("🏒 Running scheduled square update cycle");

                match tokio::time::timeout(batch_budget, update_service.run_update_cycle()).await {
                    Ok(Ok(summary)) => {
                        tracing::info!(
                            "✅ Scheduled update cycle: {} squares, {} boards, {} new bingos",
                            summary.updated_square_count,
                            summary.updated_player_count,
                            summary.new_bingos
                        );
                    }
                    Ok(Err(e)) => {
                        tracing::error!("❌ Scheduled update cycle failed: {}", e);
                    }
                    Err(_) => {
                        tracing::error!("❌ Scheduled update cycle exceeded its {:?} budget", batch_budget);
                    }
                }
            })
        })?;

        let job_id = job.guid();
        let scheduler = self.scheduler.lock().await;
        scheduler.add(job).await?;
        *update_job = Some(job_id);

        Ok(job_id)
    }

    pub async fn is_scheduled(&self) -> bool {
        self.update_job.lock().await.is_some()
    }
}
