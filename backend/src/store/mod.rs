use std::fmt;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::Value;
use thiserror::Error;
use uuid::Uuid;

use crate::models::{Employee, LeaveRecord, NewNotification, Notification, Tenant};

pub mod postgres;

pub use postgres::PgStore;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] diesel::result::Error),
    #[error("database pool error: {0}")]
    Pool(String),
    #[error("store task failed: {0}")]
    Task(String),
}

pub type StoreResult<T> = Result<T, StoreError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RetainedKind {
    Notification,
    Announcement,
    Task,
    Payslip,
}

impl RetainedKind {
    pub const ALL: [RetainedKind; 4] = [
        RetainedKind::Notification,
        RetainedKind::Announcement,
        RetainedKind::Task,
        RetainedKind::Payslip,
    ];

    pub fn collection(self) -> &'static str {
        match self {
            RetainedKind::Notification => "notifications",
            RetainedKind::Announcement => "announcements",
            RetainedKind::Task => "tasks",
            RetainedKind::Payslip => "payslips",
        }
    }
}

impl fmt::Display for RetainedKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.collection())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExpiredRecord {
    pub id: Uuid,
    pub tenant_id: String,
    pub attachment_path: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LeaveReset {
    pub id: Uuid,
    pub annual_leaves_balance: i32,
    pub sick_leaves_balance: i32,
    pub dur_start_date: String,
    pub dur_end_date: String,
    pub reset_date: DateTime<Utc>,
    pub leaves_data: Value,
}

#[derive(Debug, Clone, PartialEq)]
pub enum WriteOp {
    ResetLeave(LeaveReset),
    Delete { kind: RetainedKind, id: Uuid },
    CreateNotification(NewNotification),
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct WriteBatch {
    ops: Vec<WriteOp>,
}

impl WriteBatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, op: WriteOp) {
        self.ops.push(op);
    }

    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    pub fn into_ops(self) -> Vec<WriteOp> {
        self.ops
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeliveryOutcome {
    Sent { at: DateTime<Utc> },
    Failed { error: String },
}

#[async_trait]
pub trait DocumentStore: Send + Sync + 'static {
    async fn due_leave_records(&self, now: DateTime<Utc>) -> StoreResult<Vec<LeaveRecord>>;

    async fn tenant(&self, tenant_id: &str) -> StoreResult<Option<Tenant>>;

    async fn expired_records(
        &self,
        kind: RetainedKind,
        now: DateTime<Utc>,
    ) -> StoreResult<Vec<ExpiredRecord>>;

    async fn employees_with_expiry(&self, targets: &[String]) -> StoreResult<Vec<Employee>>;

    async fn pending_notifications(
        &self,
        max_attempts: i32,
        limit: i64,
    ) -> StoreResult<Vec<Notification>>;

    async fn record_email_delivery(&self, id: Uuid, outcome: DeliveryOutcome)
        -> StoreResult<()>;

    async fn commit(&self, batch: WriteBatch) -> StoreResult<usize>;
}
