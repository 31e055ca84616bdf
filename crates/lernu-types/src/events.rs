use serde::{Deserialize, Serialize};

use crate::types::{Language, Learner, Lesson, Unit};

#[derive(Debug, Clone)]
pub enum AppEvent {
    // UI -> app commands
    SelectLanguage(String),
    RefreshCatalog,
    EnterLesson {
        lesson_id: String,
    },
    SubmitCheck(AnswerInput),
    Continue,
    StartRetry,
    QuitLesson,
    ToggleSound(bool),

    // app -> UI notifications
    Languages(Vec<Language>),
    Catalog(CatalogView),
    LessonReady {
        lesson_id: String,
        question_count: usize,
    },
    Feedback(Feedback),
    DownloadProgress {
        unit_id: String,
        progress: Option<DownloadProgress>,
    },
    ReviewRound {
        incorrect_count: usize,
    },
    Celebration {
        points_awarded: i64,
    },
    StreakBonus {
        streak: u32,
        bonus_points: i64,
    },
    LessonExited,
    Profile(Learner),
    Error(String),
}

/// Learner answer as captured by the UI for the active question. Doubles as
/// the per-question input state: the reset value is the variant with nothing
/// selected or typed yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AnswerInput {
    SingleChoice(Option<usize>),
    /// Ordered word-id selection.
    OrderedSelection(Vec<String>),
    TypedText(String),
    /// Word-id pairs the learner has matched so far.
    MatchedPairs(Vec<(String, String)>),
}

/// Result of checking one answer, shown to the learner before "Continue".
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Feedback {
    pub question_id: String,
    pub is_correct: bool,
    pub feedback_text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub correct_answer: Option<String>,
}

/// File-count progress of an in-flight unit download.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DownloadProgress {
    pub total: usize,
    pub completed: usize,
}

/// Catalog with lock state resolved, recomputed from current inputs on every
/// refresh; the UI renders this directly.
#[derive(Debug, Clone)]
pub struct CatalogView {
    pub units: Vec<UnitView>,
    /// Remaining free lessons today; `None` for premium learners.
    pub remaining_today: Option<u32>,
}

#[derive(Debug, Clone)]
pub struct UnitView {
    pub unit: Unit,
    pub locked: bool,
    pub lessons: Vec<LessonView>,
}

#[derive(Debug, Clone)]
pub struct LessonView {
    pub lesson: Lesson,
    pub locked: bool,
}
