use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::json;
use tracing::{error, info};

use super::{JobError, JobReport, JobResult, MaintenanceJob, JOB_RESET_LEAVES};
use crate::{
    dates::{add_years, format_date, start_of_day},
    models::Tenant,
    store::{DocumentStore, LeaveReset, WriteBatch, WriteOp},
};

pub const DEFAULT_ANNUAL_LEAVES: i32 = 28;
pub const DEFAULT_SICK_LEAVES: i32 = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LeaveAllowance {
    pub annual: i32,
    pub sick: i32,
}

impl Default for LeaveAllowance {
    fn default() -> Self {
        Self {
            annual: DEFAULT_ANNUAL_LEAVES,
            sick: DEFAULT_SICK_LEAVES,
        }
    }
}

impl LeaveAllowance {
    pub fn for_tenant(tenant: Option<&Tenant>) -> Self {
        let defaults = Self::default();
        match tenant {
            Some(tenant) => Self {
                annual: tenant.annual_leaves_allowed.unwrap_or(defaults.annual),
                sick: tenant.sick_leaves_allowed.unwrap_or(defaults.sick),
            },
            None => defaults,
        }
    }
}

pub struct LeaveResetJob {
    store: Arc<dyn DocumentStore>,
}

impl LeaveResetJob {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    async fn reset_due_records(&self, now: DateTime<Utc>) -> JobResult<usize> {
        let records = self.store.due_leave_records(now).await?;
        if records.is_empty() {
            info!(job = JOB_RESET_LEAVES, "no leave records due for reset");
            return Ok(0);
        }

        let today = now.date_naive();
        let next_year = add_years(today, 1).ok_or(JobError::DateOutOfRange(today))?;
        let dur_start_date = format_date(today);
        let dur_end_date = format_date(next_year);
        let reset_date = start_of_day(next_year);

        let mut batch = WriteBatch::new();
        for record in &records {
            let tenant = self.store.tenant(&record.tenant_id).await?;
            let allowance = LeaveAllowance::for_tenant(tenant.as_ref());
            batch.push(WriteOp::ResetLeave(LeaveReset {
                id: record.id,
                annual_leaves_balance: allowance.annual,
                sick_leaves_balance: allowance.sick,
                dur_start_date: dur_start_date.clone(),
                dur_end_date: dur_end_date.clone(),
                reset_date,
                leaves_data: json!([]),
            }));
        }

        let applied = self.store.commit(batch).await?;
        info!(
            job = JOB_RESET_LEAVES,
            affected = applied,
            next_reset = %reset_date,
            "reset leave balances"
        );
        Ok(applied)
    }
}

#[async_trait]
impl MaintenanceJob for LeaveResetJob {
    fn name(&self) -> &'static str {
        JOB_RESET_LEAVES
    }

    async fn run(&self, now: DateTime<Utc>) -> JobResult<JobReport> {
        let affected = self
            .reset_due_records(now)
            .await
            .inspect_err(|err| error!(job = JOB_RESET_LEAVES, error = %err, "leave reset failed"))?;
        Ok(JobReport::new(JOB_RESET_LEAVES, affected))
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;

    fn tenant(annual: Option<i32>, sick: Option<i32>) -> Tenant {
        Tenant {
            id: "acme".to_string(),
            name: "Acme".to_string(),
            company_email: Some("hr@acme.test".to_string()),
            annual_leaves_allowed: annual,
            sick_leaves_allowed: sick,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn uses_tenant_allowance_when_configured() {
        let allowance = LeaveAllowance::for_tenant(Some(&tenant(Some(20), Some(5))));
        assert_eq!(allowance, LeaveAllowance { annual: 20, sick: 5 });
    }

    #[test]
    fn falls_back_to_defaults_for_missing_tenant() {
        assert_eq!(
            LeaveAllowance::for_tenant(None),
            LeaveAllowance { annual: 28, sick: 3 }
        );
    }

    #[test]
    fn fills_unset_fields_individually() {
        let allowance = LeaveAllowance::for_tenant(Some(&tenant(Some(25), None)));
        assert_eq!(allowance, LeaveAllowance { annual: 25, sick: 3 });

        let allowance = LeaveAllowance::for_tenant(Some(&tenant(None, None)));
        assert_eq!(allowance, LeaveAllowance::default());
    }
}
