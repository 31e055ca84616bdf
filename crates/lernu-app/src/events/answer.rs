use std::sync::Arc;

use kanal::AsyncSender;
use lernu_api::ApiClient;
use lernu_player::{CompletionEffects, PlayerPhase};
use lernu_types::{AnswerInput, AppEvent, ProgressStatus};

use crate::state::AppState;

/// "Check": grade the active question and surface feedback. A streak bonus
/// is awarded immediately, independent of lesson completion.
pub async fn handle_check(
    state: Arc<AppState>,
    api: &ApiClient,
    tx: &AsyncSender<AppEvent>,
    input: AnswerInput,
) -> anyhow::Result<()> {
    let (outcome, lesson_id) = {
        let mut slot = state.player.write().await;
        let Some(player) = slot.as_mut() else {
            return Ok(());
        };
        let Some(outcome) = player.check(&input) else {
            return Ok(());
        };
        (outcome, player.lesson_id().to_string())
    };

    tx.send(AppEvent::Feedback(outcome.feedback)).await?;

    if let Some(bonus) = outcome.streak_bonus {
        let uid = state
            .session
            .read()
            .await
            .learner
            .as_ref()
            .map(|l| l.uid.clone());
        if let Some(uid) = uid {
            if let Err(e) = api
                .increment_points(&uid, bonus.bonus_points, &lesson_id, Some(bonus.streak))
                .await
            {
                tracing::warn!("failed to award streak bonus: {e}");
            }
        }
        tx.send(AppEvent::StreakBonus {
            streak: bonus.streak,
            bonus_points: bonus.bonus_points,
        })
        .await?;
    }

    Ok(())
}

/// "Continue": advance the player and run whichever transition it lands on.
pub async fn handle_continue(
    state: Arc<AppState>,
    api: &ApiClient,
    tx: &AsyncSender<AppEvent>,
) -> anyhow::Result<()> {
    let (phase, effects, incorrect, lesson_id) = {
        let mut slot = state.player.write().await;
        let Some(player) = slot.as_mut() else {
            return Ok(());
        };
        player.advance();
        (
            player.phase(),
            player.take_completion_effects(),
            player.incorrect_count(),
            player.lesson_id().to_string(),
        )
    };

    match phase {
        PlayerPhase::Review => {
            tx.send(AppEvent::ReviewRound {
                incorrect_count: incorrect,
            })
            .await?;
        }
        PlayerPhase::Celebration => {
            // take_completion_effects yields Some exactly once, so the
            // completion batch cannot double-fire.
            if let Some(effects) = effects {
                complete_lesson(&state, api, tx, &lesson_id, effects).await?;
            }
        }
        _ => {}
    }

    Ok(())
}

pub async fn handle_start_retry(state: Arc<AppState>) {
    if let Some(player) = state.player.write().await.as_mut() {
        player.start_retry();
    }
}

/// Confirmed quit: drop the player without persisting anything beyond what
/// per-question calls already did.
pub async fn handle_quit(state: Arc<AppState>, tx: &AsyncSender<AppEvent>) -> anyhow::Result<()> {
    if let Some(mut player) = state.player.write().await.take() {
        player.quit();
    }
    tx.send(AppEvent::LessonExited).await?;
    Ok(())
}

/// Completion batch: base points, progress record upgraded to completed.
/// Failures are logged and abandoned; the next catalog refresh refetches the
/// authoritative state.
async fn complete_lesson(
    state: &Arc<AppState>,
    api: &ApiClient,
    tx: &AsyncSender<AppEvent>,
    lesson_id: &str,
    effects: CompletionEffects,
) -> anyhow::Result<()> {
    let (uid, language) = {
        let session = state.session.read().await;
        let Some(learner) = session.learner.as_ref() else {
            tracing::warn!("lesson completed without a loaded profile");
            return Ok(());
        };
        (learner.uid.clone(), session.language.clone())
    };

    if let Err(e) = api
        .increment_points(&uid, effects.base_points, lesson_id, None)
        .await
    {
        tracing::warn!("failed to award lesson points: {e}");
    }

    match api
        .post_progress(&uid, lesson_id, &language, ProgressStatus::Completed)
        .await
    {
        Ok(record) => {
            let mut session = state.session.write().await;
            session.progress.retain(|p| p.lesson_id != record.lesson_id);
            session.progress.push(record);
        }
        Err(e) => tracing::warn!("failed to mark lesson completed: {e}"),
    }

    tx.send(AppEvent::Celebration {
        points_awarded: effects.base_points,
    })
    .await?;
    Ok(())
}
