use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use futures_util::future::join_all;
use tracing::{error, info, warn};

use super::{
    JobReport, JobResult, MaintenanceJob, JOB_PURGE_ANNOUNCEMENTS, JOB_PURGE_NOTIFICATIONS,
    JOB_PURGE_PAYSLIPS, JOB_PURGE_TASKS,
};
use crate::{
    storage::ObjectStorage,
    store::{DocumentStore, ExpiredRecord, RetainedKind, WriteBatch, WriteOp},
};

pub struct RetentionPurgeJob {
    kind: RetainedKind,
    store: Arc<dyn DocumentStore>,
    storage: Arc<dyn ObjectStorage>,
}

impl RetentionPurgeJob {
    pub fn new(
        kind: RetainedKind,
        store: Arc<dyn DocumentStore>,
        storage: Arc<dyn ObjectStorage>,
    ) -> Self {
        Self {
            kind,
            store,
            storage,
        }
    }

    async fn purge(&self, now: DateTime<Utc>) -> JobResult<usize> {
        let expired = self.store.expired_records(self.kind, now).await?;
        if expired.is_empty() {
            info!(job = self.name(), "no expired {} found", self.kind);
            return Ok(0);
        }

        if self.kind == RetainedKind::Payslip {
            self.delete_attachments(&expired).await;
        }

        let mut batch = WriteBatch::new();
        for record in &expired {
            batch.push(WriteOp::Delete {
                kind: self.kind,
                id: record.id,
            });
        }

        let deleted = self.store.commit(batch).await?;
        info!(job = self.name(), affected = deleted, "purged expired {}", self.kind);
        Ok(deleted)
    }

    async fn delete_attachments(&self, records: &[ExpiredRecord]) {
        let deletions = records.iter().filter_map(|record| {
            let path = record
                .attachment_path
                .as_deref()
                .filter(|path| !path.is_empty())?;
            Some(async move { (record, path, self.storage.delete_object(path).await) })
        });

        let mut failed = 0usize;
        for (record, path, result) in join_all(deletions).await {
            if let Err(err) = result {
                failed += 1;
                warn!(
                    job = self.name(),
                    record_id = %record.id,
                    tenant_id = %record.tenant_id,
                    attachment = path,
                    error = %err,
                    "failed to delete payslip attachment"
                );
            }
        }

        if failed > 0 {
            warn!(job = self.name(), failed, "some payslip attachments were not deleted");
        }
    }
}

#[async_trait]
impl MaintenanceJob for RetentionPurgeJob {
    fn name(&self) -> &'static str {
        match self.kind {
            RetainedKind::Notification => JOB_PURGE_NOTIFICATIONS,
            RetainedKind::Announcement => JOB_PURGE_ANNOUNCEMENTS,
            RetainedKind::Task => JOB_PURGE_TASKS,
            RetainedKind::Payslip => JOB_PURGE_PAYSLIPS,
        }
    }

    async fn run(&self, now: DateTime<Utc>) -> JobResult<JobReport> {
        let affected = self.purge(now).await.inspect_err(|err| {
            error!(job = self.name(), error = %err, "retention purge failed");
        })?;
        Ok(JobReport::new(self.name(), affected))
    }
}
