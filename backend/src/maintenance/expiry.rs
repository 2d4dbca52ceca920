use std::{
    collections::{HashMap, HashSet},
    fmt,
    sync::Arc,
};

use async_trait::async_trait;
use chrono::{DateTime, Duration, NaiveDate, Utc};
use tracing::{error, info, warn};
use uuid::Uuid;

use super::{JobError, JobReport, JobResult, MaintenanceJob, JOB_NOTIFY_EXPIRING_DOCUMENTS};
use crate::{
    dates::{add_months, format_date},
    models::{EmailTemplate, Employee, NewNotification},
    store::{DocumentStore, WriteBatch, WriteOp},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ComplianceDocument {
    Passport,
    Visa,
    CertificateOfSponsorship,
    RightToWork,
}

impl ComplianceDocument {
    pub const ALL: [ComplianceDocument; 4] = [
        ComplianceDocument::Passport,
        ComplianceDocument::Visa,
        ComplianceDocument::CertificateOfSponsorship,
        ComplianceDocument::RightToWork,
    ];

    pub fn label(self) -> &'static str {
        match self {
            ComplianceDocument::Passport => "Passport",
            ComplianceDocument::Visa => "Visa",
            ComplianceDocument::CertificateOfSponsorship => "Certificate Of Sponsorship",
            ComplianceDocument::RightToWork => "Right To Work",
        }
    }

    pub fn expiry_date(self, employee: &Employee) -> Option<&str> {
        let value = match self {
            ComplianceDocument::Passport => &employee.passport_expiry_date,
            ComplianceDocument::Visa => &employee.visa_expiry_date,
            ComplianceDocument::CertificateOfSponsorship => &employee.cos_expiry_date,
            ComplianceDocument::RightToWork => &employee.rtw_expiry_date,
        };
        value.as_deref()
    }
}

impl fmt::Display for ComplianceDocument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExpiryHorizons {
    targets: Vec<String>,
}

impl ExpiryHorizons {
    pub const MONTHS_AHEAD: [u32; 2] = [1, 3];

    pub fn from_today(today: NaiveDate) -> Option<Self> {
        let yesterday = today.pred_opt()?;
        let mut targets = Vec::with_capacity(Self::MONTHS_AHEAD.len());
        for months in Self::MONTHS_AHEAD {
            let target = add_months(today, months)?;
            // Clamped month ends repeat; only the first day emits them.
            if add_months(yesterday, months)? != target {
                targets.push(format_date(target));
            }
        }
        Some(Self { targets })
    }

    pub fn targets(&self) -> &[String] {
        &self.targets
    }

    pub fn matches(&self, expiry_date: &str) -> bool {
        self.targets.iter().any(|target| target == expiry_date)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExpiryEvent {
    pub tenant_id: String,
    pub employee_name: String,
    pub employee_email: String,
    pub document: ComplianceDocument,
    pub expiry_date: String,
}

pub fn expiring_documents(employee: &Employee, horizons: &ExpiryHorizons) -> Vec<ExpiryEvent> {
    ComplianceDocument::ALL
        .into_iter()
        .filter_map(|document| {
            let expiry_date = document.expiry_date(employee)?;
            horizons.matches(expiry_date).then(|| ExpiryEvent {
                tenant_id: employee.tenant_id.clone(),
                employee_name: employee.name.clone(),
                employee_email: employee.email.clone(),
                document,
                expiry_date: expiry_date.to_string(),
            })
        })
        .collect()
}

pub fn build_notification(
    event: &ExpiryEvent,
    recipient: &str,
    now: DateTime<Utc>,
    retention_days: i64,
) -> NewNotification {
    let title = format!("{} Expiry", event.document);
    let message = format!(
        "{}'s {} expires on {}.",
        event.employee_name, event.document, event.expiry_date
    );
    let template = EmailTemplate {
        title: title.clone(),
        body: format!(
            "<p>Hello,</p>\
             <p>The {document} of {name} ({email}) expires on <strong>{date}</strong>.</p>\
             <p>Please review the employee's records before that date.</p>",
            document = event.document,
            name = event.employee_name,
            email = event.employee_email,
            date = event.expiry_date,
        ),
    };

    NewNotification {
        id: Uuid::new_v4(),
        tenant_id: event.tenant_id.clone(),
        recipient: recipient.to_string(),
        is_read: false,
        title,
        message,
        created_at: now,
        delete_time: now + Duration::days(retention_days),
        email_template: serde_json::to_value(&template).unwrap_or_default(),
    }
}

pub struct ExpiryNotifierJob {
    store: Arc<dyn DocumentStore>,
    retention_days: i64,
}

impl ExpiryNotifierJob {
    pub fn new(store: Arc<dyn DocumentStore>, retention_days: i64) -> Self {
        Self {
            store,
            retention_days,
        }
    }

    async fn notify(&self, now: DateTime<Utc>) -> JobResult<usize> {
        let today = now.date_naive();
        let horizons = ExpiryHorizons::from_today(today).ok_or(JobError::DateOutOfRange(today))?;
        if horizons.targets().is_empty() {
            return Ok(0);
        }

        let employees = self
            .store
            .employees_with_expiry(horizons.targets())
            .await?;
        let events: Vec<ExpiryEvent> = employees
            .iter()
            .flat_map(|employee| expiring_documents(employee, &horizons))
            .collect();

        if events.is_empty() {
            info!(
                job = JOB_NOTIFY_EXPIRING_DOCUMENTS,
                targets = ?horizons.targets(),
                "no expiring documents found"
            );
            return Ok(0);
        }

        let recipients = self.resolve_admin_emails(&events).await;

        let mut batch = WriteBatch::new();
        for event in &events {
            match recipients.get(&event.tenant_id) {
                Some(recipient) => batch.push(WriteOp::CreateNotification(build_notification(
                    event,
                    recipient,
                    now,
                    self.retention_days,
                ))),
                None => warn!(
                    job = JOB_NOTIFY_EXPIRING_DOCUMENTS,
                    tenant_id = %event.tenant_id,
                    employee = %event.employee_email,
                    document = %event.document,
                    "dropping expiry notice for tenant without admin email"
                ),
            }
        }

        if batch.is_empty() {
            return Ok(0);
        }

        let written = self.store.commit(batch).await?;
        info!(
            job = JOB_NOTIFY_EXPIRING_DOCUMENTS,
            affected = written,
            events = events.len(),
            "wrote expiry notifications"
        );
        Ok(written)
    }

    async fn resolve_admin_emails(&self, events: &[ExpiryEvent]) -> HashMap<String, String> {
        let mut seen = HashSet::new();
        let mut recipients = HashMap::new();

        for event in events {
            if !seen.insert(event.tenant_id.as_str()) {
                continue;
            }

            match self.store.tenant(&event.tenant_id).await {
                Ok(Some(tenant)) => {
                    match tenant.company_email.filter(|email| !email.trim().is_empty()) {
                        Some(email) => {
                            recipients.insert(event.tenant_id.clone(), email);
                        }
                        None => warn!(
                            job = JOB_NOTIFY_EXPIRING_DOCUMENTS,
                            tenant_id = %event.tenant_id,
                            "tenant has no company email"
                        ),
                    }
                }
                Ok(None) => warn!(
                    job = JOB_NOTIFY_EXPIRING_DOCUMENTS,
                    tenant_id = %event.tenant_id,
                    "tenant not found"
                ),
                Err(err) => error!(
                    job = JOB_NOTIFY_EXPIRING_DOCUMENTS,
                    tenant_id = %event.tenant_id,
                    error = %err,
                    "failed to look up tenant admin email"
                ),
            }
        }

        recipients
    }
}

#[async_trait]
impl MaintenanceJob for ExpiryNotifierJob {
    fn name(&self) -> &'static str {
        JOB_NOTIFY_EXPIRING_DOCUMENTS
    }

    async fn run(&self, now: DateTime<Utc>) -> JobResult<JobReport> {
        let affected = self.notify(now).await.inspect_err(|err| {
            error!(job = JOB_NOTIFY_EXPIRING_DOCUMENTS, error = %err, "expiry scan failed");
        })?;
        Ok(JobReport::new(JOB_NOTIFY_EXPIRING_DOCUMENTS, affected))
    }
}
