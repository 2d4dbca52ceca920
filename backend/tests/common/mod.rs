use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use compliance_backend::models::{Employee, LeaveRecord, Notification, Tenant};
use compliance_backend::storage::ObjectStorage;
use compliance_backend::store::{
    DeliveryOutcome, DocumentStore, ExpiredRecord, RetainedKind, StoreError, StoreResult,
    WriteBatch, WriteOp,
};
use compliance_backend::workers::{DispatchError, EmailSender, OutgoingEmail};
use serde_json::json;
use tokio::sync::Mutex;
use uuid::Uuid;

#[allow(dead_code)]
#[derive(Debug, Clone)]
pub struct RetainedRow {
    pub kind: RetainedKind,
    pub id: Uuid,
    pub tenant_id: String,
    pub delete_time: DateTime<Utc>,
    pub attachment_path: Option<String>,
}

#[allow(dead_code)]
#[derive(Debug, Clone, Default)]
pub struct FakeState {
    pub tenants: HashMap<String, Tenant>,
    pub employees: Vec<Employee>,
    pub leave_records: Vec<LeaveRecord>,
    pub notifications: Vec<Notification>,
    pub retained: Vec<RetainedRow>,
    pub commits: usize,
    pub tenant_lookups: usize,
    pub unavailable: bool,
    pub failing_tenants: HashSet<String>,
}

#[derive(Default)]
pub struct FakeStore {
    state: Mutex<FakeState>,
}

impl FakeStore {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub async fn snapshot(&self) -> FakeState {
        self.state.lock().await.clone()
    }

    #[allow(dead_code)]
    pub async fn insert_tenant(&self, tenant: Tenant) {
        self.state.lock().await.tenants.insert(tenant.id.clone(), tenant);
    }

    #[allow(dead_code)]
    pub async fn insert_employee(&self, employee: Employee) {
        self.state.lock().await.employees.push(employee);
    }

    #[allow(dead_code)]
    pub async fn insert_leave_record(&self, record: LeaveRecord) {
        self.state.lock().await.leave_records.push(record);
    }

    #[allow(dead_code)]
    pub async fn insert_notification(&self, notification: Notification) {
        self.state.lock().await.notifications.push(notification);
    }

    #[allow(dead_code)]
    pub async fn insert_retained(&self, row: RetainedRow) {
        self.state.lock().await.retained.push(row);
    }

    #[allow(dead_code)]
    pub async fn set_unavailable(&self, unavailable: bool) {
        self.state.lock().await.unavailable = unavailable;
    }

    #[allow(dead_code)]
    pub async fn fail_tenant_lookup(&self, tenant_id: &str) {
        self.state
            .lock()
            .await
            .failing_tenants
            .insert(tenant_id.to_string());
    }
}

fn unavailable() -> StoreError {
    StoreError::Pool("store unavailable".to_string())
}

#[async_trait]
impl DocumentStore for FakeStore {
    async fn due_leave_records(&self, now: DateTime<Utc>) -> StoreResult<Vec<LeaveRecord>> {
        let guard = self.state.lock().await;
        if guard.unavailable {
            return Err(unavailable());
        }
        Ok(guard
            .leave_records
            .iter()
            .filter(|record| record.reset_date <= now)
            .cloned()
            .collect())
    }

    async fn tenant(&self, tenant_id: &str) -> StoreResult<Option<Tenant>> {
        let mut guard = self.state.lock().await;
        guard.tenant_lookups += 1;
        if guard.unavailable || guard.failing_tenants.contains(tenant_id) {
            return Err(unavailable());
        }
        Ok(guard.tenants.get(tenant_id).cloned())
    }

    async fn expired_records(
        &self,
        kind: RetainedKind,
        now: DateTime<Utc>,
    ) -> StoreResult<Vec<ExpiredRecord>> {
        let guard = self.state.lock().await;
        if guard.unavailable {
            return Err(unavailable());
        }
        if kind == RetainedKind::Notification {
            return Ok(guard
                .notifications
                .iter()
                .filter(|notification| notification.delete_time < now)
                .map(|notification| ExpiredRecord {
                    id: notification.id,
                    tenant_id: notification.tenant_id.clone(),
                    attachment_path: None,
                })
                .collect());
        }
        Ok(guard
            .retained
            .iter()
            .filter(|row| row.kind == kind && row.delete_time < now)
            .map(|row| ExpiredRecord {
                id: row.id,
                tenant_id: row.tenant_id.clone(),
                attachment_path: row.attachment_path.clone(),
            })
            .collect())
    }

    async fn employees_with_expiry(&self, targets: &[String]) -> StoreResult<Vec<Employee>> {
        let guard = self.state.lock().await;
        if guard.unavailable {
            return Err(unavailable());
        }
        let hit = |value: &Option<String>| {
            value
                .as_ref()
                .is_some_and(|date| targets.iter().any(|target| target == date))
        };
        Ok(guard
            .employees
            .iter()
            .filter(|employee| {
                hit(&employee.passport_expiry_date)
                    || hit(&employee.visa_expiry_date)
                    || hit(&employee.cos_expiry_date)
                    || hit(&employee.rtw_expiry_date)
            })
            .cloned()
            .collect())
    }

    async fn pending_notifications(
        &self,
        max_attempts: i32,
        limit: i64,
    ) -> StoreResult<Vec<Notification>> {
        let guard = self.state.lock().await;
        if guard.unavailable {
            return Err(unavailable());
        }
        let mut pending: Vec<Notification> = guard
            .notifications
            .iter()
            .filter(|n| n.email_sent_at.is_none() && n.email_attempts < max_attempts)
            .cloned()
            .collect();
        pending.sort_by_key(|n| n.created_at);
        pending.truncate(usize::try_from(limit).unwrap_or(0));
        Ok(pending)
    }

    async fn record_email_delivery(
        &self,
        id: Uuid,
        outcome: DeliveryOutcome,
    ) -> StoreResult<()> {
        let mut guard = self.state.lock().await;
        if let Some(notification) = guard.notifications.iter_mut().find(|n| n.id == id) {
            notification.email_attempts += 1;
            match outcome {
                DeliveryOutcome::Sent { at } => {
                    notification.email_sent_at = Some(at);
                    notification.last_email_error = None;
                }
                DeliveryOutcome::Failed { error } => {
                    notification.last_email_error = Some(error);
                }
            }
        }
        Ok(())
    }

    async fn commit(&self, batch: WriteBatch) -> StoreResult<usize> {
        let mut guard = self.state.lock().await;
        if guard.unavailable {
            return Err(unavailable());
        }

        let mut next = guard.clone();
        let mut affected = 0;
        for op in batch.into_ops() {
            match op {
                WriteOp::ResetLeave(reset) => {
                    if let Some(record) = next
                        .leave_records
                        .iter_mut()
                        .find(|record| record.id == reset.id)
                    {
                        record.annual_leaves_balance = reset.annual_leaves_balance;
                        record.sick_leaves_balance = reset.sick_leaves_balance;
                        record.dur_start_date = reset.dur_start_date;
                        record.dur_end_date = reset.dur_end_date;
                        record.reset_date = reset.reset_date;
                        record.leaves_data = reset.leaves_data;
                        affected += 1;
                    }
                }
                WriteOp::Delete { kind, id } => {
                    let before = next.notifications.len() + next.retained.len();
                    if kind == RetainedKind::Notification {
                        next.notifications.retain(|n| n.id != id);
                    } else {
                        next.retained.retain(|row| !(row.kind == kind && row.id == id));
                    }
                    affected += before - (next.notifications.len() + next.retained.len());
                }
                WriteOp::CreateNotification(new) => {
                    next.notifications.push(Notification {
                        id: new.id,
                        tenant_id: new.tenant_id,
                        recipient: new.recipient,
                        is_read: new.is_read,
                        title: new.title,
                        message: new.message,
                        created_at: new.created_at,
                        delete_time: new.delete_time,
                        email_template: new.email_template,
                        email_sent_at: None,
                        email_attempts: 0,
                        last_email_error: None,
                    });
                    affected += 1;
                }
            }
        }

        next.commits += 1;
        *guard = next;
        Ok(affected)
    }
}

#[derive(Default)]
pub struct FakeStorage {
    objects: Mutex<HashSet<String>>,
    deleted: Mutex<Vec<String>>,
    failing: Mutex<HashSet<String>>,
}

#[async_trait]
impl ObjectStorage for FakeStorage {
    async fn delete_object(&self, key: &str) -> Result<()> {
        self.deleted.lock().await.push(key.to_string());
        if self.failing.lock().await.contains(key) {
            return Err(anyhow!("object {key} could not be deleted"));
        }
        self.objects.lock().await.remove(key);
        Ok(())
    }
}

#[allow(dead_code)]
impl FakeStorage {
    pub async fn put(&self, key: &str) {
        self.objects.lock().await.insert(key.to_string());
    }

    pub async fn contains(&self, key: &str) -> bool {
        self.objects.lock().await.contains(key)
    }

    pub async fn fail_on(&self, key: &str) {
        self.failing.lock().await.insert(key.to_string());
    }

    pub async fn delete_calls(&self) -> Vec<String> {
        self.deleted.lock().await.clone()
    }
}

#[derive(Default)]
pub struct FakeEmailSender {
    sent: Mutex<Vec<OutgoingEmail>>,
    rejecting: Mutex<HashSet<String>>,
}

#[async_trait]
impl EmailSender for FakeEmailSender {
    async fn send(&self, email: &OutgoingEmail) -> Result<(), DispatchError> {
        if self.rejecting.lock().await.contains(&email.to) {
            return Err(DispatchError::Rejected {
                status: 422,
                body: "invalid recipient".to_string(),
            });
        }
        self.sent.lock().await.push(email.clone());
        Ok(())
    }
}

#[allow(dead_code)]
impl FakeEmailSender {
    pub async fn reject(&self, recipient: &str) {
        self.rejecting.lock().await.insert(recipient.to_string());
    }

    pub async fn sent(&self) -> Vec<OutgoingEmail> {
        self.sent.lock().await.clone()
    }
}

#[allow(dead_code)]
pub fn at(y: i32, m: u32, d: u32, h: u32, min: u32, s: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(y, m, d, h, min, s).unwrap()
}

#[allow(dead_code)]
pub fn tenant(
    id: &str,
    company_email: Option<&str>,
    annual: Option<i32>,
    sick: Option<i32>,
) -> Tenant {
    Tenant {
        id: id.to_string(),
        name: id.to_string(),
        company_email: company_email.map(str::to_string),
        annual_leaves_allowed: annual,
        sick_leaves_allowed: sick,
        created_at: at(2024, 1, 1, 0, 0, 0),
    }
}

#[allow(dead_code)]
pub fn employee(tenant_id: &str, name: &str) -> Employee {
    Employee {
        id: Uuid::new_v4(),
        tenant_id: tenant_id.to_string(),
        name: name.to_string(),
        email: format!("{}@{tenant_id}.test", name.to_lowercase()),
        passport_expiry_date: None,
        visa_expiry_date: None,
        cos_expiry_date: None,
        rtw_expiry_date: None,
        created_at: at(2024, 1, 1, 0, 0, 0),
    }
}

#[allow(dead_code)]
pub fn leave_record(tenant_id: &str, reset_date: DateTime<Utc>) -> LeaveRecord {
    LeaveRecord {
        id: Uuid::new_v4(),
        tenant_id: tenant_id.to_string(),
        employee_id: Uuid::new_v4(),
        annual_leaves_balance: 4,
        sick_leaves_balance: 1,
        dur_start_date: "01-04-2025".to_string(),
        dur_end_date: "01-04-2026".to_string(),
        reset_date,
        leaves_data: json!([{ "type": "annual", "days": 3 }]),
        updated_at: at(2025, 4, 1, 0, 0, 0),
    }
}

#[allow(dead_code)]
pub fn notification(
    tenant_id: &str,
    recipient: &str,
    delete_time: DateTime<Utc>,
) -> Notification {
    Notification {
        id: Uuid::new_v4(),
        tenant_id: tenant_id.to_string(),
        recipient: recipient.to_string(),
        is_read: false,
        title: "Passport Expiry".to_string(),
        message: "A passport expires soon.".to_string(),
        created_at: delete_time - chrono::Duration::days(30),
        delete_time,
        email_template: json!({ "title": "Passport Expiry", "body": "<p>Expiring</p>" }),
        email_sent_at: None,
        email_attempts: 0,
        last_email_error: None,
    }
}

#[allow(dead_code)]
pub fn retained(kind: RetainedKind, tenant_id: &str, delete_time: DateTime<Utc>) -> RetainedRow {
    RetainedRow {
        kind,
        id: Uuid::new_v4(),
        tenant_id: tenant_id.to_string(),
        delete_time,
        attachment_path: None,
    }
}
