use tracing_subscriber::EnvFilter;

pub mod config;
pub mod dates;
pub mod db;
pub mod maintenance;
pub mod models;
pub mod s3;
pub mod scheduler;
pub mod schema;
pub mod state;
pub mod storage;
pub mod store;
pub mod workers;

pub use maintenance::{default_jobs, JobReport, MaintenanceJob};
pub use scheduler::{run_maintenance, MaintenanceScheduler};
pub use workers::NotificationDispatcher;

pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .compact()
        .init();
}
