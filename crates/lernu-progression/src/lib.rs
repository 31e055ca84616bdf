pub mod catalog;
pub mod locks;
pub mod quota;

pub use catalog::group_units;
pub use locks::{lesson_unlocked, unit_unlocked};
pub use quota::{DailyQuota, FREE_DAILY_LESSON_LIMIT, check_daily_limit, date_key};
