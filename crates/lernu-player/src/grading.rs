use lernu_types::AnswerInput;
use unicode_normalization::UnicodeNormalization;

use crate::exercise::{Exercise, TranslateMode};

/// Outcome of checking one answer against its exercise.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grade {
    pub correct: bool,
    pub feedback_text: String,
    /// Shown to the learner when the answer was wrong.
    pub correct_answer: Option<String>,
}

impl Grade {
    fn correct() -> Self {
        Self {
            correct: true,
            feedback_text: "Correct!".to_string(),
            correct_answer: None,
        }
    }

    fn incorrect(correct_answer: impl Into<Option<String>>) -> Self {
        Self {
            correct: false,
            feedback_text: "Not quite".to_string(),
            correct_answer: correct_answer.into(),
        }
    }
}

/// Typed input and expected answers are compared after NFKC normalization,
/// trimming and lowercasing.
fn normalize(text: &str) -> String {
    text.nfkc().collect::<String>().trim().to_lowercase()
}

/// Plain dynamic-programming edit distance over characters.
pub fn levenshtein(a: &str, b: &str) -> usize {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();

    let mut previous: Vec<usize> = (0..=b.len()).collect();
    let mut current = vec![0usize; b.len() + 1];

    for (i, ca) in a.iter().enumerate() {
        current[0] = i + 1;
        for (j, cb) in b.iter().enumerate() {
            let substitution = previous[j] + usize::from(ca != cb);
            current[j + 1] = substitution
                .min(previous[j + 1] + 1)
                .min(current[j] + 1);
        }
        std::mem::swap(&mut previous, &mut current);
    }

    previous[b.len()]
}

fn typed_matches(expected: &str, input: &str) -> bool {
    normalize(expected) == normalize(input)
}

/// Typed translation tolerates spelling errors up to edit distance 1.
fn typed_matches_fuzzy(expected: &str, input: &str) -> bool {
    levenshtein(&normalize(expected), &normalize(input)) <= 1
}

/// Single polymorphic grading dispatch over the exercise variants.
pub fn grade(exercise: &Exercise, answer: &AnswerInput) -> Grade {
    match (exercise, answer) {
        (
            Exercise::SelectImage { correct_index, .. },
            AnswerInput::SingleChoice(chosen),
        ) => match chosen {
            Some(index) if index == correct_index => Grade::correct(),
            _ => Grade::incorrect(None),
        },

        (
            Exercise::TapWhatYouHear {
                correct_sequence, ..
            },
            AnswerInput::OrderedSelection(chosen),
        ) => grade_sequence(correct_sequence, chosen),

        (
            Exercise::Translate {
                mode:
                    TranslateMode::WordBank {
                        correct_sequence, ..
                    },
                ..
            },
            AnswerInput::OrderedSelection(chosen),
        ) => grade_sequence(correct_sequence, chosen),

        (
            Exercise::Translate {
                mode: TranslateMode::Typed { answer: expected },
                ..
            },
            AnswerInput::TypedText(input),
        ) => {
            if typed_matches_fuzzy(expected, input) {
                Grade::correct()
            } else {
                Grade::incorrect(Some(expected.clone()))
            }
        }

        (Exercise::MatchPairs { word_ids }, AnswerInput::MatchedPairs(matched)) => {
            let all_matched = word_ids
                .iter()
                .all(|id| matched.iter().any(|(a, b)| a == id && b == id));
            if all_matched {
                Grade::correct()
            } else {
                Grade::incorrect(None)
            }
        }

        (Exercise::TypeWhatYouHear { answer: expected }, AnswerInput::TypedText(input))
        | (Exercise::FillInBlank { answer: expected, .. }, AnswerInput::TypedText(input))
        | (Exercise::CompleteTranslation { answer: expected }, AnswerInput::TypedText(input))
        | (Exercise::TypeMissingWord { answer: expected }, AnswerInput::TypedText(input)) => {
            if typed_matches(expected, input) {
                Grade::correct()
            } else {
                Grade::incorrect(Some(expected.clone()))
            }
        }

        // Answer shape does not fit the exercise (stale UI state): wrong, not a crash
        _ => Grade::incorrect(None),
    }
}

fn grade_sequence(correct: &[String], chosen: &[String]) -> Grade {
    if correct == chosen {
        Grade::correct()
    } else {
        Grade::incorrect(Some(correct.join(" ")))
    }
}
