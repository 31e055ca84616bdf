use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Language {
    pub code: String,
    pub name: String,
    pub native_name: String,
    pub enabled: bool,
}

/// One lesson record as served by the backend. Unit fields are denormalized
/// onto each lesson; `group_units` rebuilds the unit tree from them.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Lesson {
    pub id: String,
    pub title: String,
    pub lesson_order: u32,
    pub unit_id: String,
    pub unit_name: String,
    #[serde(default)]
    pub unit_description: String,
    pub unit_order: u32,
    #[serde(default)]
    pub has_vocabulary: bool,
}

/// Rebuilt from fetched lessons on every catalog refresh; never persisted.
#[derive(Debug, Clone)]
pub struct Unit {
    pub id: String,
    pub name: String,
    pub description: String,
    pub unit_order: u32,
    pub lessons: Vec<Lesson>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProgressStatus {
    NotStarted,
    Started,
    Completed,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LessonProgress {
    pub id: String,
    pub lesson_id: String,
    pub unit_id: String,
    pub status: ProgressStatus,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubscriptionTier {
    Free,
    Premium,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Learner {
    pub id: String,
    pub uid: String,
    #[serde(default)]
    pub name: String,
    pub points: i64,
    #[serde(default)]
    pub day_streak: u32,
    pub tier: SubscriptionTier,
}

/// Free-tier daily quota counter, keyed by the device-local calendar date
/// (`YYYY-MM-DD`). Count only moves up within a day; a date change resets it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyLessonCount {
    pub count: u32,
    pub date: String,
}

/// Manifest of media files a unit's lessons depend on.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UnitResources {
    pub audio: Vec<String>,
    pub images: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Word {
    pub id: String,
    #[serde(default)]
    pub image: Option<String>,
    /// Audio filename per language code.
    #[serde(default)]
    pub audio: HashMap<String, String>,
    /// Translation text per language code.
    #[serde(default)]
    pub translations: HashMap<String, String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuestionType {
    SelectImage,
    TapWhatYouHear,
    MatchPairs,
    TypeWhatYouHear,
    FillInBlank,
    CompleteTranslation,
    Translate,
    TypeMissingWord,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    FromEnglish,
    ToEnglish,
}

/// Flat question record as served by the backend. The player converts these
/// into its tagged `Exercise` union before grading.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionDto {
    pub id: String,
    pub question_type: QuestionType,
    pub question_order: u32,
    #[serde(default)]
    pub words: Vec<Word>,
    /// Multiple-choice options (word ids or display strings, per type).
    #[serde(default)]
    pub options: Vec<String>,
    #[serde(default)]
    pub correct_index: Option<usize>,
    /// Ordered correct sequence for word-selection types.
    #[serde(default)]
    pub correct_sequence: Vec<String>,
    /// Expected typed answer for typed types.
    #[serde(default)]
    pub answer: Option<String>,
    #[serde(default)]
    pub blank_index: Option<usize>,
    #[serde(default)]
    pub direction: Option<Direction>,
}
