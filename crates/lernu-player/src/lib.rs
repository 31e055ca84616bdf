pub mod exercise;
pub mod grading;
pub mod player;

pub use exercise::{Exercise, Question, TranslateMode, reset_answer};
pub use grading::{Grade, grade, levenshtein};
pub use player::{CheckOutcome, CompletionEffects, LessonPlayer, PlayerPhase, StreakBonus};
