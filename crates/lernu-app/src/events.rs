use std::sync::Arc;
use std::time::Duration;

use kanal::{AsyncReceiver, AsyncSender};
use lernu_api::ApiClient;
use lernu_resources::ResourceCache;
use lernu_types::AppEvent;
use tokio_util::sync::CancellationToken;

use crate::state::AppState;

pub mod answer;
pub mod catalog;
pub mod lesson;

/// App's main loop
pub async fn event_loop(
    state: Arc<AppState>,
    ui_to_app_rx: AsyncReceiver<AppEvent>,
    app_to_ui_tx: AsyncSender<AppEvent>,
    cancel: CancellationToken,
) -> anyhow::Result<()> {
    let api = {
        let config = state.config.read().await;
        ApiClient::new(
            config.api.base_url.clone(),
            Duration::from_secs(config.api.timeout_seconds),
        )?
    };
    let cache = Arc::new(ResourceCache::new(state.store.clone()));

    // Initial screen data: language catalog plus whatever the stored session
    // unlocks. Failures surface to the UI, they never kill the loop.
    startup(&state, &api, &app_to_ui_tx).await?;

    tracing::info!("event loop ready");
    loop {
        let event = tokio::select! {
            _ = cancel.cancelled() => return Ok(()),
            event = ui_to_app_rx.recv() => event?,
        };

        handle_events(state.clone(), &api, cache.clone(), &app_to_ui_tx, event).await?;
    }
}

async fn startup(
    state: &Arc<AppState>,
    api: &ApiClient,
    tx: &AsyncSender<AppEvent>,
) -> anyhow::Result<()> {
    match api.languages().await {
        Ok(languages) => tx.send(AppEvent::Languages(languages)).await?,
        Err(e) => {
            tracing::error!("failed to load languages: {e}");
            tx.send(AppEvent::Error("Failed to load languages".into()))
                .await?;
        }
    }

    if state.store.auth_session().is_ok() {
        catalog::refresh(state.clone(), api, tx).await?;
    }

    Ok(())
}

async fn handle_events(
    state: Arc<AppState>,
    api: &ApiClient,
    cache: Arc<ResourceCache>,
    app_to_ui_tx: &AsyncSender<AppEvent>,
    event: AppEvent,
) -> anyhow::Result<()> {
    match event {
        AppEvent::SelectLanguage(code) => {
            state.session.write().await.language = code;
            catalog::refresh(state, api, app_to_ui_tx).await?;
        }
        AppEvent::RefreshCatalog => {
            catalog::refresh(state, api, app_to_ui_tx).await?;
        }
        AppEvent::EnterLesson { lesson_id } => {
            lesson::handle_enter_lesson(state, api, cache, &lesson_id, app_to_ui_tx).await?;
        }
        AppEvent::SubmitCheck(input) => {
            answer::handle_check(state, api, app_to_ui_tx, input).await?;
        }
        AppEvent::Continue => {
            answer::handle_continue(state, api, app_to_ui_tx).await?;
        }
        AppEvent::StartRetry => {
            answer::handle_start_retry(state).await;
        }
        AppEvent::QuitLesson => {
            answer::handle_quit(state, app_to_ui_tx).await?;
        }
        AppEvent::ToggleSound(enabled) => {
            if let Err(e) = state.store.set_sound_enabled(enabled) {
                tracing::warn!("failed to persist sound flag: {e}");
            }
        }

        // app -> UI notifications, nothing to do on this side
        AppEvent::Languages(_)
        | AppEvent::Catalog(_)
        | AppEvent::LessonReady { .. }
        | AppEvent::Feedback(_)
        | AppEvent::DownloadProgress { .. }
        | AppEvent::ReviewRound { .. }
        | AppEvent::Celebration { .. }
        | AppEvent::StreakBonus { .. }
        | AppEvent::LessonExited
        | AppEvent::Profile(_)
        | AppEvent::Error(_) => {}
    }

    Ok(())
}
