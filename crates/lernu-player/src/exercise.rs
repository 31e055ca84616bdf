use lernu_types::{AnswerInput, Direction, QuestionDto, QuestionType};

/// One playable question with its grading data resolved into a variant per
/// question type. Replaces the flat wire record for everything past loading.
#[derive(Debug, Clone)]
pub struct Question {
    pub id: String,
    pub order: u32,
    pub exercise: Exercise,
}

#[derive(Debug, Clone)]
pub enum Exercise {
    SelectImage {
        options: Vec<String>,
        correct_index: usize,
    },
    TapWhatYouHear {
        word_bank: Vec<String>,
        correct_sequence: Vec<String>,
    },
    /// Learner pairs two representations of each word; a pair is correct when
    /// both sides belong to the same word id.
    MatchPairs {
        word_ids: Vec<String>,
    },
    TypeWhatYouHear {
        answer: String,
    },
    FillInBlank {
        answer: String,
        blank_index: usize,
    },
    CompleteTranslation {
        answer: String,
    },
    Translate {
        direction: Direction,
        mode: TranslateMode,
    },
    TypeMissingWord {
        answer: String,
    },
}

#[derive(Debug, Clone)]
pub enum TranslateMode {
    /// Ordered word-bank selection, graded as an exact sequence.
    WordBank {
        word_bank: Vec<String>,
        correct_sequence: Vec<String>,
    },
    /// Free-typed translation, tolerant to one edit of spelling error.
    Typed { answer: String },
}

impl Question {
    /// Resolve a wire record into a playable question. Records missing the
    /// fields their type needs are dropped with a warning rather than failing
    /// the whole lesson.
    pub fn from_dto(dto: &QuestionDto) -> Option<Self> {
        let exercise = match dto.question_type {
            QuestionType::SelectImage => Exercise::SelectImage {
                options: dto.options.clone(),
                correct_index: dto.correct_index?,
            },
            QuestionType::TapWhatYouHear => Exercise::TapWhatYouHear {
                word_bank: dto.options.clone(),
                correct_sequence: non_empty(&dto.correct_sequence)?,
            },
            QuestionType::MatchPairs => Exercise::MatchPairs {
                word_ids: non_empty(&dto.words.iter().map(|w| w.id.clone()).collect::<Vec<_>>())?,
            },
            QuestionType::TypeWhatYouHear => Exercise::TypeWhatYouHear {
                answer: dto.answer.clone()?,
            },
            QuestionType::FillInBlank => Exercise::FillInBlank {
                answer: dto.answer.clone()?,
                blank_index: dto.blank_index?,
            },
            QuestionType::CompleteTranslation => Exercise::CompleteTranslation {
                answer: dto.answer.clone()?,
            },
            QuestionType::Translate => Exercise::Translate {
                direction: dto.direction.unwrap_or(Direction::ToEnglish),
                mode: match &dto.answer {
                    Some(answer) => TranslateMode::Typed {
                        answer: answer.clone(),
                    },
                    None => TranslateMode::WordBank {
                        word_bank: dto.options.clone(),
                        correct_sequence: non_empty(&dto.correct_sequence)?,
                    },
                },
            },
            QuestionType::TypeMissingWord => Exercise::TypeMissingWord {
                answer: dto.answer.clone()?,
            },
        };

        Some(Self {
            id: dto.id.clone(),
            order: dto.question_order,
            exercise,
        })
    }
}

fn non_empty(values: &[String]) -> Option<Vec<String>> {
    if values.is_empty() {
        None
    } else {
        Some(values.to_vec())
    }
}

/// Blank input state for an exercise, applied when a question is entered and
/// again on "Continue".
pub fn reset_answer(exercise: &Exercise) -> AnswerInput {
    match exercise {
        Exercise::SelectImage { .. } => AnswerInput::SingleChoice(None),
        Exercise::TapWhatYouHear { .. } => AnswerInput::OrderedSelection(Vec::new()),
        Exercise::MatchPairs { .. } => AnswerInput::MatchedPairs(Vec::new()),
        Exercise::Translate {
            mode: TranslateMode::WordBank { .. },
            ..
        } => AnswerInput::OrderedSelection(Vec::new()),
        Exercise::TypeWhatYouHear { .. }
        | Exercise::FillInBlank { .. }
        | Exercise::CompleteTranslation { .. }
        | Exercise::Translate {
            mode: TranslateMode::Typed { .. },
            ..
        }
        | Exercise::TypeMissingWord { .. } => AnswerInput::TypedText(String::new()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lernu_types::Word;

    fn dto(question_type: QuestionType) -> QuestionDto {
        QuestionDto {
            id: "q1".into(),
            question_type,
            question_order: 1,
            words: Vec::new(),
            options: Vec::new(),
            correct_index: None,
            correct_sequence: Vec::new(),
            answer: None,
            blank_index: None,
            direction: None,
        }
    }

    #[test]
    fn select_image_requires_correct_index() {
        assert!(Question::from_dto(&dto(QuestionType::SelectImage)).is_none());

        let mut ok = dto(QuestionType::SelectImage);
        ok.options = vec!["a.png".into(), "b.png".into()];
        ok.correct_index = Some(1);
        assert!(Question::from_dto(&ok).is_some());
    }

    #[test]
    fn translate_with_answer_becomes_typed_mode() {
        let mut d = dto(QuestionType::Translate);
        d.answer = Some("hola".into());
        let q = Question::from_dto(&d).unwrap();
        assert!(matches!(
            q.exercise,
            Exercise::Translate {
                mode: TranslateMode::Typed { .. },
                ..
            }
        ));
    }

    #[test]
    fn translate_without_answer_needs_a_sequence() {
        assert!(Question::from_dto(&dto(QuestionType::Translate)).is_none());

        let mut d = dto(QuestionType::Translate);
        d.options = vec!["w1".into(), "w2".into()];
        d.correct_sequence = vec!["w2".into(), "w1".into()];
        let q = Question::from_dto(&d).unwrap();
        assert!(matches!(
            q.exercise,
            Exercise::Translate {
                mode: TranslateMode::WordBank { .. },
                ..
            }
        ));
    }

    #[test]
    fn match_pairs_takes_word_ids() {
        let mut d = dto(QuestionType::MatchPairs);
        d.words = vec![
            Word {
                id: "w1".into(),
                image: None,
                audio: Default::default(),
                translations: Default::default(),
            },
            Word {
                id: "w2".into(),
                image: None,
                audio: Default::default(),
                translations: Default::default(),
            },
        ];
        let q = Question::from_dto(&d).unwrap();
        match q.exercise {
            Exercise::MatchPairs { word_ids } => assert_eq!(word_ids, vec!["w1", "w2"]),
            other => panic!("unexpected exercise: {other:?}"),
        }
    }

    #[test]
    fn reset_matches_exercise_shape() {
        let mut d = dto(QuestionType::FillInBlank);
        d.answer = Some("gato".into());
        d.blank_index = Some(2);
        let q = Question::from_dto(&d).unwrap();
        assert_eq!(reset_answer(&q.exercise), AnswerInput::TypedText(String::new()));
    }
}
