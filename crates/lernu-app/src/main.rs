use std::sync::Arc;

use lernu_config::Config;
use lernu_storage::Store;
use tokio::signal;

mod controller;
mod events;
mod logging;
mod state;
mod ui;


use self::controller::AppController;
use self::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    logging::init();

    let config = Config::new();
    let store = Arc::new(Store::open(&config.storage)?);
    let state = Arc::new(AppState::new(config, store));

    let controller = AppController::new(state);
    let mut tasks = controller.spawn_tasks();

    tokio::select! {
        _ = signal::ctrl_c() => {
            tracing::info!("shutdown requested");
            controller.shutdown();
        }
        result = tasks.join_next() => {
            match result {
                Some(Ok(Ok(()))) => tracing::warn!("task exited"),
                Some(Ok(Err(e))) => tracing::error!("task failed: {e}"),
                Some(Err(e)) => tracing::error!("task panicked: {e}"),
                None => {}
            }
            controller.shutdown();
        }
    }

    tasks.shutdown().await;
    Ok(())
}
