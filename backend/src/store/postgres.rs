use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::pg::PgConnection;
use diesel::prelude::*;
use tokio::task;
use uuid::Uuid;

use super::{
    DeliveryOutcome, DocumentStore, ExpiredRecord, RetainedKind, StoreError, StoreResult,
    WriteBatch, WriteOp,
};
use crate::{
    db::PgPool,
    models::{Employee, LeaveRecord, Notification, Tenant},
    schema::{announcements, employees, leave_records, notifications, payslips, tasks, tenants},
};

#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn with_conn<F, T>(&self, f: F) -> StoreResult<T>
    where
        F: FnOnce(&mut PgConnection) -> StoreResult<T> + Send + 'static,
        T: Send + 'static,
    {
        let pool = self.pool.clone();
        task::spawn_blocking(move || {
            let mut conn = pool
                .get()
                .map_err(|err| StoreError::Pool(err.to_string()))?;
            f(&mut conn)
        })
        .await
        .map_err(|err| StoreError::Task(err.to_string()))?
    }
}

#[async_trait]
impl DocumentStore for PgStore {
    async fn due_leave_records(&self, now: DateTime<Utc>) -> StoreResult<Vec<LeaveRecord>> {
        self.with_conn(move |conn| {
            let records = leave_records::table
                .filter(leave_records::reset_date.le(now))
                .order(leave_records::reset_date.asc())
                .load::<LeaveRecord>(conn)?;
            Ok(records)
        })
        .await
    }

    async fn tenant(&self, tenant_id: &str) -> StoreResult<Option<Tenant>> {
        let tenant_id = tenant_id.to_string();
        self.with_conn(move |conn| {
            let tenant = tenants::table
                .find(tenant_id)
                .first::<Tenant>(conn)
                .optional()?;
            Ok(tenant)
        })
        .await
    }

    async fn expired_records(
        &self,
        kind: RetainedKind,
        now: DateTime<Utc>,
    ) -> StoreResult<Vec<ExpiredRecord>> {
        self.with_conn(move |conn| {
            let rows: Vec<(Uuid, String, Option<String>)> = match kind {
                RetainedKind::Notification => notifications::table
                    .filter(notifications::delete_time.lt(now))
                    .select((notifications::id, notifications::tenant_id))
                    .load::<(Uuid, String)>(conn)?
                    .into_iter()
                    .map(|(id, tenant_id)| (id, tenant_id, None))
                    .collect(),
                RetainedKind::Announcement => announcements::table
                    .filter(announcements::delete_time.lt(now))
                    .select((announcements::id, announcements::tenant_id))
                    .load::<(Uuid, String)>(conn)?
                    .into_iter()
                    .map(|(id, tenant_id)| (id, tenant_id, None))
                    .collect(),
                RetainedKind::Task => tasks::table
                    .filter(tasks::delete_time.lt(now))
                    .select((tasks::id, tasks::tenant_id))
                    .load::<(Uuid, String)>(conn)?
                    .into_iter()
                    .map(|(id, tenant_id)| (id, tenant_id, None))
                    .collect(),
                RetainedKind::Payslip => payslips::table
                    .filter(payslips::delete_time.lt(now))
                    .select((payslips::id, payslips::tenant_id, payslips::attachment_path))
                    .load::<(Uuid, String, Option<String>)>(conn)?,
            };

            Ok(rows
                .into_iter()
                .map(|(id, tenant_id, attachment_path)| ExpiredRecord {
                    id,
                    tenant_id,
                    attachment_path,
                })
                .collect())
        })
        .await
    }

    async fn employees_with_expiry(&self, targets: &[String]) -> StoreResult<Vec<Employee>> {
        if targets.is_empty() {
            return Ok(Vec::new());
        }
        let targets = targets.to_vec();
        self.with_conn(move |conn| {
            let rows = employees::table
                .filter(
                    employees::passport_expiry_date
                        .eq_any(&targets)
                        .or(employees::visa_expiry_date.eq_any(&targets))
                        .or(employees::cos_expiry_date.eq_any(&targets))
                        .or(employees::rtw_expiry_date.eq_any(&targets)),
                )
                .order((employees::tenant_id.asc(), employees::name.asc()))
                .load::<Employee>(conn)?;
            Ok(rows)
        })
        .await
    }

    async fn pending_notifications(
        &self,
        max_attempts: i32,
        limit: i64,
    ) -> StoreResult<Vec<Notification>> {
        self.with_conn(move |conn| {
            let rows = notifications::table
                .filter(notifications::email_sent_at.is_null())
                .filter(notifications::email_attempts.lt(max_attempts))
                .order(notifications::created_at.asc())
                .limit(limit)
                .load::<Notification>(conn)?;
            Ok(rows)
        })
        .await
    }

    async fn record_email_delivery(
        &self,
        id: Uuid,
        outcome: DeliveryOutcome,
    ) -> StoreResult<()> {
        self.with_conn(move |conn| {
            let target = notifications::table.find(id);
            match outcome {
                DeliveryOutcome::Sent { at } => {
                    diesel::update(target)
                        .set((
                            notifications::email_sent_at.eq(Some(at)),
                            notifications::email_attempts.eq(notifications::email_attempts + 1),
                            notifications::last_email_error.eq::<Option<String>>(None),
                        ))
                        .execute(conn)?;
                }
                DeliveryOutcome::Failed { error } => {
                    diesel::update(target)
                        .set((
                            notifications::email_attempts.eq(notifications::email_attempts + 1),
                            notifications::last_email_error.eq(Some(error)),
                        ))
                        .execute(conn)?;
                }
            }
            Ok(())
        })
        .await
    }

    async fn commit(&self, batch: WriteBatch) -> StoreResult<usize> {
        if batch.is_empty() {
            return Ok(0);
        }
        self.with_conn(move |conn| {
            conn.transaction(|conn| {
                let mut affected = 0;
                // Rows that vanished since the read count as zero.
                for op in batch.into_ops() {
                    affected += apply_op(conn, op)?;
                }
                Ok::<usize, diesel::result::Error>(affected)
            })
            .map_err(StoreError::from)
        })
        .await
    }
}

fn apply_op(conn: &mut PgConnection, op: WriteOp) -> QueryResult<usize> {
    match op {
        WriteOp::ResetLeave(reset) => diesel::update(leave_records::table.find(reset.id))
            .set((
                leave_records::annual_leaves_balance.eq(reset.annual_leaves_balance),
                leave_records::sick_leaves_balance.eq(reset.sick_leaves_balance),
                leave_records::dur_start_date.eq(reset.dur_start_date),
                leave_records::dur_end_date.eq(reset.dur_end_date),
                leave_records::reset_date.eq(reset.reset_date),
                leave_records::leaves_data.eq(reset.leaves_data),
                leave_records::updated_at.eq(Utc::now()),
            ))
            .execute(conn),
        WriteOp::Delete { kind, id } => match kind {
            RetainedKind::Notification => {
                diesel::delete(notifications::table.find(id)).execute(conn)
            }
            RetainedKind::Announcement => {
                diesel::delete(announcements::table.find(id)).execute(conn)
            }
            RetainedKind::Task => diesel::delete(tasks::table.find(id)).execute(conn),
            RetainedKind::Payslip => diesel::delete(payslips::table.find(id)).execute(conn),
        },
        WriteOp::CreateNotification(notification) => diesel::insert_into(notifications::table)
            .values(&notification)
            .execute(conn),
    }
}
