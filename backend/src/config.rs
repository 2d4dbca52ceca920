use std::{env, str::FromStr, time::Duration};

use anyhow::{Context, Result};
use url::Url;

use crate::db::DEFAULT_MAX_POOL_SIZE;

pub const DEFAULT_MAINTENANCE_SCHEDULE: &str = "0 0 0 * * *";
pub const DEFAULT_MAINTENANCE_CONCURRENCY: usize = 3;
pub const DEFAULT_NOTIFICATION_RETENTION_DAYS: i64 = 30;
pub const DEFAULT_EMAIL_API_URL: &str = "https://api.resend.com/emails";

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub database_url: String,
    pub database_max_pool_size: u32,
    pub s3: S3Settings,
    pub maintenance: MaintenanceSettings,
    pub email: EmailSettings,
}

#[derive(Clone, Debug)]
pub struct S3Settings {
    pub endpoint_url: Option<String>,
    pub access_key_id: Option<String>,
    pub secret_access_key: Option<String>,
    pub region: String,
    pub bucket: String,
}

#[derive(Clone, Debug)]
pub struct MaintenanceSettings {
    pub schedule: String,
    pub concurrency: usize,
    pub notification_retention_days: i64,
}

impl Default for MaintenanceSettings {
    fn default() -> Self {
        Self {
            schedule: DEFAULT_MAINTENANCE_SCHEDULE.to_string(),
            concurrency: DEFAULT_MAINTENANCE_CONCURRENCY,
            notification_retention_days: DEFAULT_NOTIFICATION_RETENTION_DAYS,
        }
    }
}

#[derive(Clone, Debug)]
pub struct EmailSettings {
    pub api_url: String,
    pub api_key: Option<String>,
    pub from: String,
    pub poll_interval: Duration,
    pub max_attempts: i32,
    pub batch_size: i64,
}

impl AppConfig {
    pub fn from_env() -> Result<Self> {
        let database_url = env::var("DATABASE_URL").context("DATABASE_URL must be set")?;
        let database_max_pool_size =
            parse_var("DATABASE_MAX_POOL_SIZE", DEFAULT_MAX_POOL_SIZE)?;

        let s3 = S3Settings {
            endpoint_url: env::var("AWS_ENDPOINT_URL").ok(),
            access_key_id: env::var("AWS_ACCESS_KEY_ID").ok(),
            secret_access_key: env::var("AWS_SECRET_ACCESS_KEY").ok(),
            region: env::var("AWS_REGION").unwrap_or_else(|_| "us-east-1".to_string()),
            bucket: env::var("S3_BUCKET").context("S3_BUCKET must be set")?,
        };

        let concurrency: usize =
            parse_var("MAINTENANCE_CONCURRENCY", DEFAULT_MAINTENANCE_CONCURRENCY)?;
        let maintenance = MaintenanceSettings {
            schedule: env::var("MAINTENANCE_SCHEDULE")
                .unwrap_or_else(|_| DEFAULT_MAINTENANCE_SCHEDULE.to_string()),
            concurrency: concurrency.max(1),
            notification_retention_days: parse_var(
                "NOTIFICATION_RETENTION_DAYS",
                DEFAULT_NOTIFICATION_RETENTION_DAYS,
            )?,
        };

        let email = EmailSettings {
            api_url: env::var("EMAIL_API_URL")
                .unwrap_or_else(|_| DEFAULT_EMAIL_API_URL.to_string()),
            api_key: env::var("EMAIL_API_KEY").ok().filter(|key| !key.is_empty()),
            from: env::var("EMAIL_FROM").unwrap_or_else(|_| "notifications@localhost".to_string()),
            poll_interval: Duration::from_secs(parse_var("EMAIL_POLL_SECONDS", 30u64)?),
            max_attempts: parse_var("EMAIL_MAX_ATTEMPTS", 5)?,
            batch_size: parse_var("EMAIL_BATCH_SIZE", 50)?,
        };

        Ok(Self {
            database_url,
            database_max_pool_size,
            s3,
            maintenance,
            email,
        })
    }

    pub fn redacted_database_url(&self) -> String {
        redact_database_url(&self.database_url)
    }
}

fn parse_var<T>(key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match env::var(key) {
        Ok(raw) => parse_value(key, &raw),
        Err(_) => Ok(default),
    }
}

fn parse_value<T>(key: &str, raw: &str) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    raw.trim()
        .parse()
        .with_context(|| format!("{key} has an invalid value: {raw}"))
}

fn redact_database_url(raw: &str) -> String {
    match Url::parse(raw) {
        Ok(mut parsed) => {
            if parsed.password().is_some() {
                let _ = parsed.set_password(Some("*****"));
            }
            parsed.to_string()
        }
        Err(_) => "***".to_string(),
    }
}
