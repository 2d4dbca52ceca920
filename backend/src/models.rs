use chrono::{DateTime, Utc};
use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::schema::*;

#[derive(Debug, Clone, Queryable, Identifiable)]
#[diesel(table_name = tenants)]
pub struct Tenant {
    pub id: String,
    pub name: String,
    pub company_email: Option<String>,
    pub annual_leaves_allowed: Option<i32>,
    pub sick_leaves_allowed: Option<i32>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = tenants)]
pub struct NewTenant {
    pub id: String,
    pub name: String,
    pub company_email: Option<String>,
    pub annual_leaves_allowed: Option<i32>,
    pub sick_leaves_allowed: Option<i32>,
}

#[derive(Debug, Clone, Queryable, Identifiable)]
#[diesel(table_name = employees)]
pub struct Employee {
    pub id: Uuid,
    pub tenant_id: String,
    pub name: String,
    pub email: String,
    pub passport_expiry_date: Option<String>,
    pub visa_expiry_date: Option<String>,
    pub cos_expiry_date: Option<String>,
    pub rtw_expiry_date: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = employees)]
pub struct NewEmployee {
    pub id: Uuid,
    pub tenant_id: String,
    pub name: String,
    pub email: String,
    pub passport_expiry_date: Option<String>,
    pub visa_expiry_date: Option<String>,
    pub cos_expiry_date: Option<String>,
    pub rtw_expiry_date: Option<String>,
}

#[derive(Debug, Clone, Queryable, Identifiable)]
#[diesel(table_name = leave_records)]
pub struct LeaveRecord {
    pub id: Uuid,
    pub tenant_id: String,
    pub employee_id: Uuid,
    pub annual_leaves_balance: i32,
    pub sick_leaves_balance: i32,
    pub dur_start_date: String,
    pub dur_end_date: String,
    pub reset_date: DateTime<Utc>,
    pub leaves_data: serde_json::Value,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = leave_records)]
pub struct NewLeaveRecord {
    pub id: Uuid,
    pub tenant_id: String,
    pub employee_id: Uuid,
    pub annual_leaves_balance: i32,
    pub sick_leaves_balance: i32,
    pub dur_start_date: String,
    pub dur_end_date: String,
    pub reset_date: DateTime<Utc>,
    pub leaves_data: serde_json::Value,
}

#[derive(Debug, Clone, Queryable, Identifiable)]
#[diesel(table_name = notifications)]
pub struct Notification {
    pub id: Uuid,
    pub tenant_id: String,
    pub recipient: String,
    pub is_read: bool,
    pub title: String,
    pub message: String,
    pub created_at: DateTime<Utc>,
    pub delete_time: DateTime<Utc>,
    pub email_template: serde_json::Value,
    pub email_sent_at: Option<DateTime<Utc>>,
    pub email_attempts: i32,
    pub last_email_error: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Insertable)]
#[diesel(table_name = notifications)]
pub struct NewNotification {
    pub id: Uuid,
    pub tenant_id: String,
    pub recipient: String,
    pub is_read: bool,
    pub title: String,
    pub message: String,
    pub created_at: DateTime<Utc>,
    pub delete_time: DateTime<Utc>,
    pub email_template: serde_json::Value,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmailTemplate {
    pub title: String,
    pub body: String,
}
