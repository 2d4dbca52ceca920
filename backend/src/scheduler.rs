use std::{
    sync::Arc,
    time::{Duration, Instant},
};

use chrono::{DateTime, Utc};
use futures_util::{
    future::{BoxFuture, FutureExt},
    stream, StreamExt,
};
use thiserror::Error;
use tokio_cron_scheduler::{Job, JobScheduler, JobSchedulerError};
use tracing::{error, info};

use crate::{
    config::MaintenanceSettings,
    maintenance::{JobReport, JobResult, MaintenanceJob},
};

#[derive(Debug, Error)]
pub enum SchedulerError {
    #[error("scheduler error: {0}")]
    Cron(#[from] JobSchedulerError),
}

#[derive(Debug)]
pub struct JobOutcome {
    pub job: &'static str,
    pub result: JobResult<JobReport>,
    pub elapsed: Duration,
}

impl JobOutcome {
    pub fn succeeded(&self) -> bool {
        self.result.is_ok()
    }
}

async fn run_one(job: Arc<dyn MaintenanceJob>, now: DateTime<Utc>) -> JobOutcome {
    let started = Instant::now();
    let result = job.run(now).await;
    let elapsed = started.elapsed();

    match &result {
        Ok(report) => info!(
            job = job.name(),
            affected = report.affected,
            elapsed_ms = elapsed.as_millis() as u64,
            "maintenance job completed"
        ),
        Err(err) => error!(
            job = job.name(),
            error = %err,
            elapsed_ms = elapsed.as_millis() as u64,
            "maintenance job failed"
        ),
    }

    JobOutcome {
        job: job.name(),
        result,
        elapsed,
    }
}

pub fn run_maintenance(
    jobs: &[Arc<dyn MaintenanceJob>],
    concurrency: usize,
    now: DateTime<Utc>,
) -> BoxFuture<'static, Vec<JobOutcome>> {
    let runs: Vec<BoxFuture<'static, JobOutcome>> = jobs
        .iter()
        .cloned()
        .map(|job| run_one(job, now).boxed())
        .collect();

    stream::iter(runs)
        .buffer_unordered(concurrency.max(1))
        .collect::<Vec<_>>()
        .boxed()
}

pub struct MaintenanceScheduler {
    scheduler: JobScheduler,
}

impl MaintenanceScheduler {
    pub async fn start(
        jobs: Vec<Arc<dyn MaintenanceJob>>,
        settings: &MaintenanceSettings,
    ) -> Result<Self, SchedulerError> {
        let jobs = Arc::new(jobs);
        let concurrency = settings.concurrency;

        let daily = Job::new_async(settings.schedule.as_str(), move |_id, _lock| {
            let jobs = jobs.clone();
            Box::pin(async move {
                info!(jobs = jobs.len(), concurrency, "starting maintenance run");
                let outcomes = run_maintenance(&jobs, concurrency, Utc::now()).await;
                let failed = outcomes.iter().filter(|outcome| !outcome.succeeded()).count();
                info!(jobs = outcomes.len(), failed, "maintenance run finished");
            })
        })?;

        let scheduler = JobScheduler::new().await?;
        scheduler.add(daily).await?;
        scheduler.start().await?;
        info!(schedule = %settings.schedule, concurrency, "maintenance scheduler started");

        Ok(Self { scheduler })
    }

    pub async fn shutdown(mut self) -> Result<(), SchedulerError> {
        info!("shutting down maintenance scheduler");
        self.scheduler.shutdown().await?;
        Ok(())
    }
}
