use tokio::signal;

use compliance_backend::{
    config::AppConfig, db, init_tracing, state::AppState, MaintenanceScheduler,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    init_tracing();

    let config = AppConfig::from_env()?;
    let pool = db::init_pool_with_size(&config.database_url, config.database_max_pool_size)?;
    db::run_migrations(&pool).await?;

    let state = AppState::connect(config, pool, "scheduler").await?;
    let scheduler =
        MaintenanceScheduler::start(state.maintenance_jobs(), &state.config.maintenance).await?;

    signal::ctrl_c().await?;
    tracing::info!("scheduler received shutdown signal");
    scheduler.shutdown().await?;

    Ok(())
}
