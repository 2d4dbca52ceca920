use std::sync::Arc;

use tokio::signal;

use compliance_backend::{
    config::AppConfig, db, init_tracing, state::AppState, workers::HttpEmailSender,
    NotificationDispatcher,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    init_tracing();

    let config = AppConfig::from_env()?;
    let sender = Arc::new(HttpEmailSender::from_settings(&config.email)?);
    let pool = db::init_pool_with_size(&config.database_url, 1)?;
    let state = AppState::connect(config, pool, "worker").await?;

    let dispatcher = NotificationDispatcher::new(state.store.clone(), sender, &state.config.email);

    tokio::select! {
        _ = dispatcher.run() => {}
        _ = signal::ctrl_c() => {
            tracing::info!("worker received shutdown signal");
        }
    }

    Ok(())
}
