use lernu_types::{AnswerInput, Feedback, QuestionDto};

use crate::exercise::{Question, reset_answer};
use crate::grading::grade;

pub const BASE_LESSON_POINTS: i64 = 20;
pub const STREAK_BONUS_AT: u32 = 10;
pub const STREAK_BONUS_POINTS: i64 = 10;

/// Where the player is within a lesson. Loading happens before a player
/// exists (the app holds an empty slot until questions arrive).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayerPhase {
    InProgress { index: usize },
    Review,
    Retrying { index: usize },
    Celebration,
    Exited,
}

/// Result of grading the active question.
#[derive(Debug, Clone)]
pub struct CheckOutcome {
    pub feedback: Feedback,
    pub streak_bonus: Option<StreakBonus>,
}

#[derive(Debug, Clone, Copy)]
pub struct StreakBonus {
    pub streak: u32,
    pub bonus_points: i64,
}

/// One-shot side-effect batch owed on reaching the celebration screen.
#[derive(Debug, Clone, Copy)]
pub struct CompletionEffects {
    pub base_points: i64,
}

/// Drives a learner through an ordered question list, collects wrong answers
/// into retry rounds, and ends in a celebration state once a pass comes back
/// clean.
pub struct LessonPlayer {
    lesson_id: String,
    /// Full question list, the reference set across retry rounds.
    questions: Vec<Question>,
    /// Questions of the current pass (full list, then retry subsets).
    active: Vec<Question>,
    phase: PlayerPhase,
    answer: AnswerInput,
    feedback: Option<Feedback>,
    incorrect: Vec<Question>,
    streak: u32,
    streak_bonus_fired: bool,
    completion_taken: bool,
}

impl LessonPlayer {
    /// Build a player from fetched wire records, sorted by question order.
    /// Returns `None` when no record could be resolved into an exercise.
    pub fn new(lesson_id: String, dtos: &[QuestionDto]) -> Option<Self> {
        let mut questions: Vec<Question> = dtos
            .iter()
            .filter_map(|dto| {
                let question = Question::from_dto(dto);
                if question.is_none() {
                    tracing::warn!("skipping malformed question {}", dto.id);
                }
                question
            })
            .collect();
        questions.sort_by_key(|q| q.order);

        let first_answer = reset_answer(&questions.first()?.exercise);

        Some(Self {
            lesson_id,
            active: questions.clone(),
            questions,
            phase: PlayerPhase::InProgress { index: 0 },
            answer: first_answer,
            feedback: None,
            incorrect: Vec::new(),
            streak: 0,
            streak_bonus_fired: false,
            completion_taken: false,
        })
    }

    pub fn lesson_id(&self) -> &str {
        &self.lesson_id
    }

    pub fn phase(&self) -> PlayerPhase {
        self.phase
    }

    pub fn question_count(&self) -> usize {
        self.questions.len()
    }

    pub fn incorrect_count(&self) -> usize {
        self.incorrect.len()
    }

    pub fn current_question(&self) -> Option<&Question> {
        match self.phase {
            PlayerPhase::InProgress { index } | PlayerPhase::Retrying { index } => {
                self.active.get(index)
            }
            _ => None,
        }
    }

    pub fn answer(&self) -> &AnswerInput {
        &self.answer
    }

    pub fn set_answer(&mut self, answer: AnswerInput) {
        self.answer = answer;
    }

    /// Grade the active question ("Check"). `None` when there is nothing to
    /// check: wrong phase, or this question was already checked.
    pub fn check(&mut self, answer: &AnswerInput) -> Option<CheckOutcome> {
        if self.feedback.is_some() {
            return None;
        }
        let question = self.current_question()?.clone();

        let graded = grade(&question.exercise, answer);
        let feedback = Feedback {
            question_id: question.id.clone(),
            is_correct: graded.correct,
            feedback_text: graded.feedback_text,
            correct_answer: graded.correct_answer,
        };

        let streak_bonus = if graded.correct {
            self.streak += 1;
            if self.streak == STREAK_BONUS_AT && !self.streak_bonus_fired {
                self.streak_bonus_fired = true;
                Some(StreakBonus {
                    streak: self.streak,
                    bonus_points: STREAK_BONUS_POINTS,
                })
            } else {
                None
            }
        } else {
            self.streak = 0;
            self.record_incorrect(question);
            None
        };

        self.feedback = Some(feedback.clone());
        Some(CheckOutcome {
            feedback,
            streak_bonus,
        })
    }

    // Deduplicated by question id: re-recording the same question within a
    // pass must not duplicate it in the review list.
    fn record_incorrect(&mut self, question: Question) {
        if !self.incorrect.iter().any(|q| q.id == question.id) {
            self.incorrect.push(question);
        }
    }

    /// "Continue": clear per-question state and advance, handling the
    /// end-of-pass transitions. No-op before the question was checked.
    pub fn advance(&mut self) {
        if self.feedback.is_none() {
            return;
        }
        self.feedback = None;

        let next = match self.phase {
            PlayerPhase::InProgress { index } => {
                if index + 1 < self.active.len() {
                    PlayerPhase::InProgress { index: index + 1 }
                } else if self.incorrect.is_empty() {
                    PlayerPhase::Celebration
                } else {
                    PlayerPhase::Review
                }
            }
            PlayerPhase::Retrying { index } => {
                if index + 1 < self.active.len() {
                    PlayerPhase::Retrying { index: index + 1 }
                } else if self.incorrect.is_empty() {
                    PlayerPhase::Celebration
                } else {
                    PlayerPhase::Review
                }
            }
            other => other,
        };
        self.enter(next);
    }

    /// "Let's go" from the review screen: replay exactly the questions
    /// answered wrong in the last pass.
    pub fn start_retry(&mut self) {
        if self.phase != PlayerPhase::Review || self.incorrect.is_empty() {
            return;
        }
        self.active = std::mem::take(&mut self.incorrect);
        self.enter(PlayerPhase::Retrying { index: 0 });
    }

    /// Confirmed quit from any non-terminal state.
    pub fn quit(&mut self) {
        if self.phase != PlayerPhase::Exited {
            self.enter(PlayerPhase::Exited);
        }
    }

    /// Completion side effects, yielded exactly once per player so that
    /// re-entering the celebration screen cannot double-award.
    pub fn take_completion_effects(&mut self) -> Option<CompletionEffects> {
        if self.phase != PlayerPhase::Celebration || self.completion_taken {
            return None;
        }
        self.completion_taken = true;
        Some(CompletionEffects {
            base_points: BASE_LESSON_POINTS,
        })
    }

    fn enter(&mut self, phase: PlayerPhase) {
        self.phase = phase;

        match self.phase {
            PlayerPhase::InProgress { index } | PlayerPhase::Retrying { index } => {
                if let Some(question) = self.active.get(index) {
                    self.answer = reset_answer(&question.exercise);
                }
            }
            PlayerPhase::Celebration | PlayerPhase::Exited => {
                // Retry subsets are done with; the full list is the reference
                // set again.
                self.active = self.questions.clone();
            }
            PlayerPhase::Review => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lernu_types::QuestionType;

    fn typed_dto(id: &str, order: u32, answer: &str) -> QuestionDto {
        QuestionDto {
            id: id.to_string(),
            question_type: QuestionType::TypeMissingWord,
            question_order: order,
            words: Vec::new(),
            options: Vec::new(),
            correct_index: None,
            correct_sequence: Vec::new(),
            answer: Some(answer.to_string()),
            blank_index: None,
            direction: None,
        }
    }

    fn five_question_player() -> LessonPlayer {
        let dtos: Vec<QuestionDto> = (1..=5)
            .map(|i| typed_dto(&format!("q{i}"), i, &format!("answer{i}")))
            .collect();
        LessonPlayer::new("lesson-1".into(), &dtos).unwrap()
    }

    fn answer_current(player: &mut LessonPlayer, correct: bool) -> CheckOutcome {
        let expected = match &player.current_question().unwrap().exercise {
            crate::exercise::Exercise::TypeMissingWord { answer } => answer.clone(),
            other => panic!("unexpected exercise {other:?}"),
        };
        let input = if correct {
            AnswerInput::TypedText(expected)
        } else {
            AnswerInput::TypedText("definitely wrong".into())
        };
        let outcome = player.check(&input).expect("check accepted");
        player.advance();
        outcome
    }

    #[test]
    fn clean_pass_goes_straight_to_celebration() {
        let mut player = five_question_player();
        for _ in 0..5 {
            answer_current(&mut player, true);
        }
        assert_eq!(player.phase(), PlayerPhase::Celebration);
    }

    #[test]
    fn wrong_answer_routes_through_review_and_retry() {
        let mut player = five_question_player();
        for i in 0..5 {
            answer_current(&mut player, i != 2); // question 3 wrong
        }
        assert_eq!(player.phase(), PlayerPhase::Review);
        assert_eq!(player.incorrect_count(), 1);

        player.start_retry();
        assert_eq!(player.phase(), PlayerPhase::Retrying { index: 0 });
        assert_eq!(player.current_question().unwrap().id, "q3");

        // correct on retry: clean round, so celebration
        answer_current(&mut player, true);
        assert_eq!(player.phase(), PlayerPhase::Celebration);
    }

    #[test]
    fn failed_retry_round_loops_back_to_review() {
        let mut player = five_question_player();
        for i in 0..5 {
            answer_current(&mut player, i != 2);
        }
        player.start_retry();
        answer_current(&mut player, false);
        assert_eq!(player.phase(), PlayerPhase::Review);

        player.start_retry();
        answer_current(&mut player, true);
        assert_eq!(player.phase(), PlayerPhase::Celebration);
    }

    #[test]
    fn checking_twice_without_continue_is_rejected() {
        let mut player = five_question_player();
        assert!(player.check(&AnswerInput::TypedText("x".into())).is_some());
        assert!(player.check(&AnswerInput::TypedText("x".into())).is_none());
        assert_eq!(player.incorrect_count(), 1);
    }

    #[test]
    fn completion_effects_fire_exactly_once() {
        let mut player = five_question_player();
        for _ in 0..5 {
            answer_current(&mut player, true);
        }
        let effects = player.take_completion_effects().unwrap();
        assert_eq!(effects.base_points, BASE_LESSON_POINTS);
        assert!(player.take_completion_effects().is_none());
    }

    #[test]
    fn streak_bonus_fires_at_exactly_ten() {
        let dtos: Vec<QuestionDto> = (1..=12)
            .map(|i| typed_dto(&format!("q{i}"), i, "ok"))
            .collect();
        let mut player = LessonPlayer::new("lesson-1".into(), &dtos).unwrap();

        let mut bonuses = 0;
        for i in 0..12 {
            let outcome = player.check(&AnswerInput::TypedText("ok".into())).unwrap();
            if outcome.streak_bonus.is_some() {
                bonuses += 1;
                assert_eq!(i, 9); // tenth correct answer
            }
            player.advance();
        }
        assert_eq!(bonuses, 1);
    }

    #[test]
    fn incorrect_answer_resets_streak() {
        let dtos: Vec<QuestionDto> = (1..=15)
            .map(|i| typed_dto(&format!("q{i}"), i, "ok"))
            .collect();
        let mut player = LessonPlayer::new("lesson-1".into(), &dtos).unwrap();

        for _ in 0..5 {
            player.check(&AnswerInput::TypedText("ok".into())).unwrap();
            player.advance();
        }
        player.check(&AnswerInput::TypedText("wrong".into())).unwrap();
        player.advance();

        // nine more correct answers only reach streak 9: no bonus
        for _ in 0..9 {
            let outcome = player.check(&AnswerInput::TypedText("ok".into())).unwrap();
            assert!(outcome.streak_bonus.is_none());
            player.advance();
        }
    }

    #[test]
    fn quit_is_terminal() {
        let mut player = five_question_player();
        player.quit();
        assert_eq!(player.phase(), PlayerPhase::Exited);
        assert!(player.check(&AnswerInput::TypedText("x".into())).is_none());
    }

    #[test]
    fn advance_before_check_is_a_no_op() {
        let mut player = five_question_player();
        player.advance();
        assert_eq!(player.phase(), PlayerPhase::InProgress { index: 0 });
    }

    #[test]
    fn empty_question_list_yields_no_player() {
        assert!(LessonPlayer::new("lesson-1".into(), &[]).is_none());
    }
}
