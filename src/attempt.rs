use crate::models::QuizDefinition;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// What the student has answered in one attempt of one quiz.
///
/// Answers lock on first selection: once a question has an entry it is never
/// overwritten.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttemptState {
    pub quiz_id: String,
    answers: HashMap<usize, String>,
    pub started_at: DateTime<Utc>,
    pub ended_at: Option<DateTime<Utc>>,
}

impl AttemptState {
    pub fn new(quiz_id: impl Into<String>, started_at: DateTime<Utc>) -> Self {
        Self {
            quiz_id: quiz_id.into(),
            answers: HashMap::new(),
            started_at,
            ended_at: None,
        }
    }

    pub(crate) fn from_parts(
        quiz_id: String,
        answers: HashMap<usize, String>,
        started_at: DateTime<Utc>,
    ) -> Self {
        Self {
            quiz_id,
            answers,
            started_at,
            ended_at: None,
        }
    }

    /// Inserts the answer unless the question is already answered.
    /// Returns whether the mapping changed.
    pub fn record(&mut self, question_id: usize, option_id: impl Into<String>) -> bool {
        if self.answers.contains_key(&question_id) {
            return false;
        }
        self.answers.insert(question_id, option_id.into());
        true
    }

    pub fn selected(&self, question_id: usize) -> Option<&str> {
        self.answers.get(&question_id).map(String::as_str)
    }

    pub fn is_answered(&self, question_id: usize) -> bool {
        self.answers.contains_key(&question_id)
    }

    pub fn answered_count(&self) -> usize {
        self.answers.len()
    }

    pub fn answers(&self) -> &HashMap<usize, String> {
        &self.answers
    }

    pub fn is_complete(&self, quiz: &QuizDefinition) -> bool {
        quiz.questions.iter().all(|q| self.answers.contains_key(&q.id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Difficulty, Question, QuizOption};

    fn quiz(n: usize) -> QuizDefinition {
        QuizDefinition {
            id: "quiz".into(),
            title: "T".into(),
            questions: (1..=n)
                .map(|id| Question {
                    id,
                    text: format!("Q{id}"),
                    options: vec![
                        QuizOption { id: "A".into(), text: "a".into() },
                        QuizOption { id: "B".into(), text: "b".into() },
                    ],
                    correct_answer: "A".into(),
                    difficulty: Difficulty::Easy,
                    tags: vec![],
                    explanation: None,
                })
                .collect(),
        }
    }

    #[test]
    fn first_answer_is_authoritative() {
        let mut attempt = AttemptState::new("quiz", Utc::now());
        assert!(attempt.record(1, "A"));
        assert!(!attempt.record(1, "B"));
        assert_eq!(attempt.selected(1), Some("A"));
        assert_eq!(attempt.answered_count(), 1);
    }

    #[test]
    fn complete_iff_every_question_answered() {
        for n in 1..=6 {
            let quiz = quiz(n);
            let mut attempt = AttemptState::new("quiz", Utc::now());
            for id in 1..=n {
                assert!(!attempt.is_complete(&quiz));
                attempt.record(id, "B");
            }
            assert!(attempt.is_complete(&quiz));
            assert_eq!(attempt.answered_count(), n);
        }
    }

    #[test]
    fn foreign_question_ids_do_not_complete() {
        let quiz = quiz(2);
        let mut attempt = AttemptState::new("quiz", Utc::now());
        attempt.record(1, "A");
        attempt.record(7, "A");
        assert!(!attempt.is_complete(&quiz));
    }
}
