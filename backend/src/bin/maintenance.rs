use std::env;

use anyhow::Result;
use chrono::Utc;

use compliance_backend::{
    config::AppConfig, db, init_tracing, maintenance::JOB_NAMES, run_maintenance,
    state::AppState,
};

fn usage() -> String {
    format!("Usage: maintenance <all|{}>", JOB_NAMES.join("|"))
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();
    init_tracing();

    let mut args = env::args().skip(1);
    let selected = match args.next() {
        Some(cmd) if cmd == "all" || JOB_NAMES.contains(&cmd.as_str()) => cmd,
        Some(cmd) => {
            eprintln!("Unknown job: {cmd}\n{}", usage());
            std::process::exit(1);
        }
        None => {
            eprintln!("{}", usage());
            std::process::exit(1);
        }
    };

    let config = AppConfig::from_env()?;
    let pool = db::init_pool_with_size(&config.database_url, config.database_max_pool_size)?;
    let state = AppState::connect(config, pool, "maintenance").await?;

    let jobs: Vec<_> = state
        .maintenance_jobs()
        .into_iter()
        .filter(|job| selected == "all" || job.name() == selected)
        .collect();

    let outcomes = run_maintenance(&jobs, state.config.maintenance.concurrency, Utc::now()).await;

    let mut failed = 0;
    for outcome in &outcomes {
        match &outcome.result {
            Ok(report) => println!("{}: {} records", report.job, report.affected),
            Err(err) => {
                failed += 1;
                eprintln!("{}: failed: {err}", outcome.job);
            }
        }
    }

    if failed > 0 {
        std::process::exit(1);
    }
    Ok(())
}
