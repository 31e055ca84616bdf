use lernu_types::{Lesson, LessonProgress, ProgressStatus, SubscriptionTier, Unit};

use crate::quota::DailyQuota;

/// Free-tier learners hit the paywall from this unit position onward...
pub const FREE_CONTENT_WALL_UNIT: u32 = 3;
/// ...for lessons at this position or later within the unit.
pub const FREE_CONTENT_WALL_LESSON: u32 = 2;

fn status_of(lesson_id: &str, progress: &[LessonProgress]) -> ProgressStatus {
    progress
        .iter()
        .find(|p| p.lesson_id == lesson_id)
        .map(|p| p.status)
        .unwrap_or(ProgressStatus::NotStarted)
}

/// The unit with the globally minimum order is always open. Any other unit
/// requires the immediately preceding unit to exist with every lesson
/// completed; a missing predecessor locks the unit.
pub fn unit_unlocked(unit: &Unit, units: &[Unit], progress: &[LessonProgress]) -> bool {
    let Some(min_order) = units.iter().map(|u| u.unit_order).min() else {
        return false;
    };
    if unit.unit_order == min_order {
        return true;
    }

    let Some(previous) = units.iter().find(|u| u.unit_order + 1 == unit.unit_order) else {
        return false;
    };

    previous
        .lessons
        .iter()
        .all(|l| status_of(&l.id, progress) == ProgressStatus::Completed)
}

/// Lock decision for one lesson, applying the gating rules in precedence
/// order: paywall content boundary, daily cap, unit lock, cold start,
/// sequential unlock, first-lesson-of-untouched-unit, furthest-reached
/// boundary.
pub fn lesson_unlocked(
    lesson: &Lesson,
    units: &[Unit],
    progress: &[LessonProgress],
    tier: SubscriptionTier,
    quota: &DailyQuota,
) -> bool {
    // 1. free-tier content wall
    if tier == SubscriptionTier::Free
        && lesson.unit_order >= FREE_CONTENT_WALL_UNIT
        && lesson.lesson_order >= FREE_CONTENT_WALL_LESSON
    {
        return false;
    }

    // 2. free-tier daily cap
    if tier == SubscriptionTier::Free && !quota.can_take_lesson() {
        return false;
    }

    // 3. owning unit must be open
    let Some(unit) = units.iter().find(|u| u.id == lesson.unit_id) else {
        return false;
    };
    if !unit_unlocked(unit, units, progress) {
        return false;
    }

    // 4. cold start: only the very first lesson of the catalog
    if progress.is_empty() {
        let Some(first_unit) = units.iter().min_by_key(|u| u.unit_order) else {
            return false;
        };
        return first_unit.id == unit.id
            && first_unit
                .lessons
                .iter()
                .min_by_key(|l| l.lesson_order)
                .is_some_and(|l| l.id == lesson.id);
    }

    // 5. sequential unlock off a completed predecessor
    if let Some(previous) = unit
        .lessons
        .iter()
        .find(|l| l.lesson_order + 1 == lesson.lesson_order)
        && status_of(&previous.id, progress) == ProgressStatus::Completed
    {
        return true;
    }

    // 6. nothing touched in this unit yet: only its first lesson opens
    let touched: Vec<u32> = unit
        .lessons
        .iter()
        .filter(|l| status_of(&l.id, progress) != ProgressStatus::NotStarted)
        .map(|l| l.lesson_order)
        .collect();
    if touched.is_empty() {
        return unit
            .lessons
            .iter()
            .map(|l| l.lesson_order)
            .min()
            .is_some_and(|min| min == lesson.lesson_order);
    }

    // 7. nothing past the furthest lesson reached
    let furthest = touched.iter().copied().max().unwrap_or(0);
    lesson.lesson_order <= furthest
}
