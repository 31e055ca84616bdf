use std::sync::Arc;

use chrono::Local;
use kanal::AsyncSender;
use lernu_api::ApiClient;
use lernu_progression::{DailyQuota, check_daily_limit, group_units, lesson_unlocked, unit_unlocked};
use lernu_types::{
    AppEvent, CatalogView, LessonProgress, LessonView, SubscriptionTier, Unit, UnitView,
};

use crate::state::AppState;

/// Full catalog refresh: profile, lessons and progress are fetched fresh,
/// lock state is recomputed from scratch, and the session cache is replaced.
pub async fn refresh(
    state: Arc<AppState>,
    api: &ApiClient,
    tx: &AsyncSender<AppEvent>,
) -> anyhow::Result<()> {
    let language = state.session.read().await.language.clone();

    let uid = match state.store.auth_session() {
        Ok(session) => session.uid,
        Err(e) => {
            tracing::warn!("catalog refresh without session: {e}");
            tx.send(AppEvent::Error("Not signed in".into())).await?;
            return Ok(());
        }
    };

    let learner = match api.learner_by_uid(&uid).await {
        Ok(learner) => learner,
        Err(e) => {
            tracing::error!("failed to load learner profile: {e}");
            tx.send(AppEvent::Error("Failed to load profile".into()))
                .await?;
            return Ok(());
        }
    };

    let lessons = match api.lessons(&language).await {
        Ok(lessons) => lessons,
        Err(e) => {
            tracing::error!("failed to load lessons: {e}");
            tx.send(AppEvent::Error("Failed to load lessons".into()))
                .await?;
            return Ok(());
        }
    };

    // A failed progress fetch degrades to "nothing done yet" rather than an
    // error screen; the next refresh will repair it.
    let progress = match api.progress(&uid, &language).await {
        Ok(progress) => progress,
        Err(e) => {
            tracing::warn!("failed to load progress, treating as empty: {e}");
            Vec::new()
        }
    };

    let units = group_units(&lessons);
    let quota = check_daily_limit(
        &state.store.daily_count(),
        Local::now().date_naive(),
        learner.tier,
    );
    let view = build_catalog_view(&units, &progress, learner.tier, &quota);

    {
        let mut session = state.session.write().await;
        session.learner = Some(learner.clone());
        session.units = units;
        session.progress = progress;
    }

    tx.send(AppEvent::Profile(learner)).await?;
    tx.send(AppEvent::Catalog(view)).await?;
    Ok(())
}

/// Pure view assembly over the progression rules; recomputed per refresh so
/// lock state never goes stale.
pub fn build_catalog_view(
    units: &[Unit],
    progress: &[LessonProgress],
    tier: SubscriptionTier,
    quota: &DailyQuota,
) -> CatalogView {
    CatalogView {
        units: units
            .iter()
            .map(|unit| UnitView {
                locked: !unit_unlocked(unit, units, progress),
                lessons: unit
                    .lessons
                    .iter()
                    .map(|l| LessonView {
                        locked: !lesson_unlocked(l, units, progress, tier, quota),
                        lesson: l.clone(),
                    })
                    .collect(),
                unit: unit.clone(),
            })
            .collect(),
        remaining_today: quota.remaining(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use lernu_types::{Lesson, ProgressStatus};

    fn lesson(id: &str, unit_id: &str, unit_order: u32, lesson_order: u32) -> Lesson {
        Lesson {
            id: id.into(),
            title: String::new(),
            lesson_order,
            unit_id: unit_id.into(),
            unit_name: String::new(),
            unit_description: String::new(),
            unit_order,
            has_vocabulary: false,
        }
    }

    #[test]
    fn view_marks_locks_and_quota() {
        let units = group_units(&[
            lesson("l11", "u1", 1, 1),
            lesson("l12", "u1", 1, 2),
            lesson("l21", "u2", 2, 1),
        ]);
        let progress = vec![LessonProgress {
            id: "p1".into(),
            lesson_id: "l11".into(),
            unit_id: "u1".into(),
            status: ProgressStatus::Completed,
            updated_at: Utc::now(),
        }];
        let quota = DailyQuota::Limited { remaining: 2 };

        let view = build_catalog_view(&units, &progress, SubscriptionTier::Free, &quota);

        assert_eq!(view.remaining_today, Some(2));
        assert!(!view.units[0].locked);
        assert!(view.units[1].locked);
        assert!(!view.units[0].lessons[0].locked);
        assert!(!view.units[0].lessons[1].locked); // predecessor completed
        assert!(view.units[1].lessons[0].locked);
    }

    #[test]
    fn premium_view_has_no_remaining_counter() {
        let units = group_units(&[lesson("l11", "u1", 1, 1)]);
        let view =
            build_catalog_view(&units, &[], SubscriptionTier::Premium, &DailyQuota::Unlimited);
        assert_eq!(view.remaining_today, None);
    }
}
