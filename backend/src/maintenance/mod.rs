use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use thiserror::Error;

use crate::{
    config::MaintenanceSettings,
    storage::ObjectStorage,
    store::{DocumentStore, RetainedKind, StoreError},
};

pub mod expiry;
pub mod leave_reset;
pub mod retention;

pub use expiry::ExpiryNotifierJob;
pub use leave_reset::LeaveResetJob;
pub use retention::RetentionPurgeJob;

pub const JOB_RESET_LEAVES: &str = "reset-leaves";
pub const JOB_PURGE_NOTIFICATIONS: &str = "purge-notifications";
pub const JOB_PURGE_ANNOUNCEMENTS: &str = "purge-announcements";
pub const JOB_PURGE_TASKS: &str = "purge-tasks";
pub const JOB_PURGE_PAYSLIPS: &str = "purge-payslips";
pub const JOB_NOTIFY_EXPIRING_DOCUMENTS: &str = "notify-expiring-documents";

pub const JOB_NAMES: [&str; 6] = [
    JOB_RESET_LEAVES,
    JOB_PURGE_NOTIFICATIONS,
    JOB_PURGE_ANNOUNCEMENTS,
    JOB_PURGE_TASKS,
    JOB_PURGE_PAYSLIPS,
    JOB_NOTIFY_EXPIRING_DOCUMENTS,
];

#[derive(Debug, Error)]
pub enum JobError {
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error("date arithmetic out of range from {0}")]
    DateOutOfRange(NaiveDate),
}

pub type JobResult<T> = Result<T, JobError>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobReport {
    pub job: &'static str,
    pub affected: usize,
}

impl JobReport {
    pub fn new(job: &'static str, affected: usize) -> Self {
        Self { job, affected }
    }
}

#[async_trait]
pub trait MaintenanceJob: Send + Sync {
    fn name(&self) -> &'static str;

    async fn run(&self, now: DateTime<Utc>) -> JobResult<JobReport>;
}

pub fn default_jobs(
    store: Arc<dyn DocumentStore>,
    storage: Arc<dyn ObjectStorage>,
    settings: &MaintenanceSettings,
) -> Vec<Arc<dyn MaintenanceJob>> {
    let mut jobs: Vec<Arc<dyn MaintenanceJob>> = vec![Arc::new(LeaveResetJob::new(store.clone()))];
    jobs.extend(RetainedKind::ALL.into_iter().map(|kind| {
        Arc::new(RetentionPurgeJob::new(kind, store.clone(), storage.clone()))
            as Arc<dyn MaintenanceJob>
    }));
    jobs.push(Arc::new(ExpiryNotifierJob::new(
        store,
        settings.notification_retention_days,
    )));
    jobs
}
