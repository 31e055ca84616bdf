use std::sync::Arc;

use chrono::Local;
use kanal::AsyncSender;
use lernu_api::{ApiClient, MediaSource};
use lernu_player::LessonPlayer;
use lernu_progression::{check_daily_limit, date_key, lesson_unlocked};
use lernu_resources::ResourceCache;
use lernu_types::{AppEvent, ProgressStatus, SubscriptionTier};

use crate::state::AppState;

/// Lesson entry: re-check the lock, consume free-tier quota, mark the lesson
/// started, make the unit's media resident, then hand the questions to a
/// fresh player.
pub async fn handle_enter_lesson(
    state: Arc<AppState>,
    api: &ApiClient,
    cache: Arc<ResourceCache>,
    lesson_id: &str,
    tx: &AsyncSender<AppEvent>,
) -> anyhow::Result<()> {
    let (language, units, progress, learner) = {
        let session = state.session.read().await;
        (
            session.language.clone(),
            session.units.clone(),
            session.progress.clone(),
            session.learner.clone(),
        )
    };

    let Some(learner) = learner else {
        tx.send(AppEvent::Error("No profile loaded".into())).await?;
        return Ok(());
    };
    let Some(lesson) = units
        .iter()
        .flat_map(|u| &u.lessons)
        .find(|l| l.id == lesson_id)
        .cloned()
    else {
        tx.send(AppEvent::Error("Unknown lesson".into())).await?;
        return Ok(());
    };

    let today = Local::now().date_naive();
    let quota = check_daily_limit(&state.store.daily_count(), today, learner.tier);
    if !lesson_unlocked(&lesson, &units, &progress, learner.tier, &quota) {
        tx.send(AppEvent::Error("Lesson is locked".into())).await?;
        return Ok(());
    }

    // Beginning a lesson is what consumes free-tier quota
    if learner.tier == SubscriptionTier::Free {
        if let Err(e) = state.store.increment_daily_count(&date_key(today)).await {
            tracing::warn!("failed to persist daily lesson count: {e}");
        }
    }

    match api
        .post_progress(&learner.uid, &lesson.id, &language, ProgressStatus::Started)
        .await
    {
        Ok(record) => {
            let mut session = state.session.write().await;
            session.progress.retain(|p| p.lesson_id != record.lesson_id);
            session.progress.push(record);
        }
        Err(e) => tracing::warn!("failed to mark lesson started: {e}"),
    }

    spawn_unit_download(api, cache, lesson.unit_id.clone(), language.clone(), tx);

    let questions = match api.questions(&lesson.id, &language).await {
        Ok(questions) => questions,
        Err(e) => {
            tracing::error!("failed to load questions for {}: {e}", lesson.id);
            tx.send(AppEvent::Error("Failed to load lesson".into()))
                .await?;
            return Ok(());
        }
    };

    let Some(player) = LessonPlayer::new(lesson.id.clone(), &questions) else {
        tx.send(AppEvent::Error("Lesson has no questions".into()))
            .await?;
        return Ok(());
    };
    let question_count = player.question_count();
    *state.player.write().await = Some(player);

    tx.send(AppEvent::LessonReady {
        lesson_id: lesson.id,
        question_count,
    })
    .await?;
    Ok(())
}

/// Make the lesson's unit the resident media bundle in the background.
/// Deliberately not cancelled on navigation: the download runs to completion
/// or failure, only its progress events stop being rendered.
fn spawn_unit_download(
    api: &ApiClient,
    cache: Arc<ResourceCache>,
    unit_id: String,
    language: String,
    tx: &AsyncSender<AppEvent>,
) {
    let source: Arc<dyn MediaSource> = Arc::new(api.clone());
    let tx = tx.clone();

    tokio::spawn(async move {
        let progress_tx = tx.clone();
        let progress_unit = unit_id.clone();
        let result = cache
            .switch_unit(source, &unit_id, &language, move |progress| {
                let tx = progress_tx.clone();
                let unit_id = progress_unit.clone();
                tokio::spawn(async move {
                    let _ = tx
                        .send(AppEvent::DownloadProgress {
                            unit_id,
                            progress: Some(progress),
                        })
                        .await;
                });
            })
            .await;

        if let Err(e) = result {
            tracing::warn!("unit {unit_id} media download failed: {e}");
        }
        let _ = tx
            .send(AppEvent::DownloadProgress {
                unit_id,
                progress: None,
            })
            .await;
    });
}
