use chrono::NaiveDate;
use lernu_types::{DailyLessonCount, SubscriptionTier};

/// Free-tier learners get this many lessons per calendar day.
pub const FREE_DAILY_LESSON_LIMIT: u32 = 3;

/// Daily lesson allowance derived from the stored counter. Replaces the
/// magic -1 "unlimited" value with an explicit variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DailyQuota {
    Unlimited,
    Limited { remaining: u32 },
}

impl DailyQuota {
    pub fn can_take_lesson(&self) -> bool {
        match self {
            DailyQuota::Unlimited => true,
            DailyQuota::Limited { remaining } => *remaining > 0,
        }
    }

    /// Remaining free lessons today; `None` when unlimited.
    pub fn remaining(&self) -> Option<u32> {
        match self {
            DailyQuota::Unlimited => None,
            DailyQuota::Limited { remaining } => Some(*remaining),
        }
    }
}

/// Storage key for a device-local calendar date.
pub fn date_key(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

/// Pure read of the quota state. A stored date other than `today` counts as a
/// fresh day with the full allowance; the reset itself is only persisted by
/// the first increment of the new day.
pub fn check_daily_limit(
    stored: &DailyLessonCount,
    today: NaiveDate,
    tier: SubscriptionTier,
) -> DailyQuota {
    if tier == SubscriptionTier::Premium {
        return DailyQuota::Unlimited;
    }

    if stored.date != date_key(today) {
        return DailyQuota::Limited {
            remaining: FREE_DAILY_LESSON_LIMIT,
        };
    }

    DailyQuota::Limited {
        remaining: FREE_DAILY_LESSON_LIMIT.saturating_sub(stored.count),
    }
}
