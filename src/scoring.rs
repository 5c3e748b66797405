use crate::attempt::AttemptState;
use crate::models::{QuizDefinition, ResponseRecord};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionOutcome {
    pub question_id: usize,
    pub selected: Option<String>,
    pub correct_answer: String,
    pub is_correct: bool,
}

/// One-time snapshot of how an attempt went.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreResult {
    pub correct: usize,
    pub total: usize,
    pub percentage: u32,
    pub elapsed_secs: u64,
    pub outcomes: Vec<QuestionOutcome>,
    pub weak_topics: BTreeSet<String>,
}

impl ScoreResult {
    /// Per-question records for the answered questions, in quiz order.
    pub fn responses(&self) -> Vec<ResponseRecord> {
        self.outcomes
            .iter()
            .filter_map(|o| {
                o.selected.as_ref().map(|selected| ResponseRecord {
                    question: o.question_id,
                    selected_option: selected.clone(),
                    is_correct: o.is_correct,
                })
            })
            .collect()
    }
}

/// `round(correct / total * 100)` with halves rounded up.
pub fn percentage(correct: usize, total: usize) -> u32 {
    if total == 0 {
        return 0;
    }
    ((correct * 200 + total) / (total * 2)) as u32
}

/// Whole seconds between `start` and `now`, never negative.
pub fn elapsed_secs(start: DateTime<Utc>, now: DateTime<Utc>) -> u64 {
    let millis = (now - start).num_milliseconds().max(0);
    (millis / 1000) as u64
}

pub fn score(quiz: &QuizDefinition, attempt: &AttemptState, now: DateTime<Utc>) -> ScoreResult {
    let outcomes: Vec<QuestionOutcome> = quiz
        .questions
        .iter()
        .map(|q| {
            let selected = attempt.selected(q.id).map(str::to_string);
            let is_correct = selected.as_deref() == Some(q.correct_answer.as_str());
            QuestionOutcome {
                question_id: q.id,
                selected,
                correct_answer: q.correct_answer.clone(),
                is_correct,
            }
        })
        .collect();

    let mut weak_topics = BTreeSet::new();
    for (q, outcome) in quiz.questions.iter().zip(&outcomes) {
        if !outcome.is_correct {
            weak_topics.insert(q.difficulty.label().to_string());
            weak_topics.extend(q.tags.iter().cloned());
        }
    }

    // A tag is also weak when any question carrying it got a wrong answer.
    let quiz_tags: BTreeSet<&String> = quiz.questions.iter().flat_map(|q| q.tags.iter()).collect();
    for tag in quiz_tags {
        let missed = quiz.questions.iter().zip(&outcomes).any(|(q, o)| {
            o.selected.is_some() && !o.is_correct && q.tags.contains(tag)
        });
        if missed {
            weak_topics.insert(tag.clone());
        }
    }

    let correct = outcomes.iter().filter(|o| o.is_correct).count();
    let total = quiz.questions.len();
    ScoreResult {
        correct,
        total,
        percentage: percentage(correct, total),
        elapsed_secs: elapsed_secs(attempt.started_at, now),
        outcomes,
        weak_topics,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Difficulty, Question, QuizOption};
    use chrono::{Duration, TimeZone};

    fn question(id: usize, difficulty: Difficulty, tags: &[&str]) -> Question {
        Question {
            id,
            text: format!("Q{id}"),
            options: ["A", "B", "C", "D"]
                .iter()
                .map(|c| QuizOption { id: (*c).into(), text: c.to_lowercase() })
                .collect(),
            correct_answer: "A".into(),
            difficulty,
            tags: tags.iter().map(|t| t.to_string()).collect(),
            explanation: None,
        }
    }

    fn scenario_quiz() -> QuizDefinition {
        QuizDefinition {
            id: "scenario".into(),
            title: "Scenario".into(),
            questions: vec![
                question(1, Difficulty::Easy, &[]),
                question(2, Difficulty::Easy, &[]),
                question(3, Difficulty::Medium, &[]),
                question(4, Difficulty::Hard, &[]),
            ],
        }
    }

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 1, 9, 0, 0).unwrap()
    }

    #[test]
    fn percentage_rounds_half_up() {
        assert_eq!(percentage(0, 4), 0);
        assert_eq!(percentage(2, 4), 50);
        assert_eq!(percentage(1, 3), 33);
        assert_eq!(percentage(2, 3), 67);
        assert_eq!(percentage(1, 8), 13);
        assert_eq!(percentage(5, 5), 100);
        assert_eq!(percentage(0, 0), 0);
    }

    #[test]
    fn elapsed_is_floored_whole_seconds() {
        assert_eq!(elapsed_secs(t0(), t0() + Duration::milliseconds(59_999)), 59);
        assert_eq!(elapsed_secs(t0(), t0() - Duration::seconds(5)), 0);
    }

    #[test]
    fn half_right_scenario() {
        let quiz = scenario_quiz();
        let mut attempt = AttemptState::new("scenario", t0());
        attempt.record(1, "A");
        attempt.record(2, "B");
        attempt.record(3, "A");
        attempt.record(4, "C");
        let result = score(&quiz, &attempt, t0() + Duration::seconds(42));
        assert_eq!(result.correct, 2);
        assert_eq!(result.percentage, 50);
        assert_eq!(result.elapsed_secs, 42);
        assert!(result.weak_topics.contains("easy"));
        assert!(result.weak_topics.contains("hard"));
        assert!(!result.weak_topics.contains("medium"));
    }

    #[test]
    fn all_correct_has_no_weak_topics() {
        let quiz = scenario_quiz();
        let mut attempt = AttemptState::new("scenario", t0());
        for q in &quiz.questions {
            attempt.record(q.id, q.correct_answer.clone());
        }
        let result = score(&quiz, &attempt, t0());
        assert_eq!(result.percentage, 100);
        assert!(result.weak_topics.is_empty());
        assert!(result.outcomes.iter().all(|o| o.is_correct));
    }

    #[test]
    fn unanswered_questions_count_as_weak() {
        let quiz = QuizDefinition {
            id: "tags".into(),
            title: "Tags".into(),
            questions: vec![
                question(1, Difficulty::Medium, &["algebra"]),
                question(2, Difficulty::Easy, &["geometry", "algebra"]),
            ],
        };
        let mut attempt = AttemptState::new("tags", t0());
        attempt.record(1, "A");
        let result = score(&quiz, &attempt, t0());
        assert_eq!(result.correct, 1);
        let weak: Vec<&str> = result.weak_topics.iter().map(String::as_str).collect();
        assert_eq!(weak, vec!["algebra", "easy", "geometry"]);
        assert_eq!(result.responses().len(), 1);
    }

    #[test]
    fn tags_of_wrong_answers_are_included_once() {
        let quiz = QuizDefinition {
            id: "tags".into(),
            title: "Tags".into(),
            questions: vec![
                question(1, Difficulty::Hard, &["physics"]),
                question(2, Difficulty::Hard, &["physics"]),
            ],
        };
        let mut attempt = AttemptState::new("tags", t0());
        attempt.record(1, "A");
        attempt.record(2, "D");
        let result = score(&quiz, &attempt, t0());
        assert_eq!(result.weak_topics.len(), 2);
        assert!(result.weak_topics.contains("physics"));
        assert!(result.weak_topics.contains("hard"));
    }

    #[test]
    fn scoring_is_pure() {
        let quiz = scenario_quiz();
        let mut attempt = AttemptState::new("scenario", t0());
        attempt.record(2, "A");
        attempt.record(4, "B");
        let now = t0() + Duration::seconds(10);
        let before = attempt.clone();
        assert_eq!(score(&quiz, &attempt, now), score(&quiz, &attempt, now));
        assert_eq!(attempt, before);
    }

    #[test]
    fn responses_follow_quiz_order() {
        let quiz = scenario_quiz();
        let mut attempt = AttemptState::new("scenario", t0());
        attempt.record(3, "B");
        attempt.record(1, "A");
        let responses = score(&quiz, &attempt, t0()).responses();
        assert_eq!(responses[0].question, 1);
        assert!(responses[0].is_correct);
        assert_eq!(responses[1].question, 3);
        assert_eq!(responses[1].selected_option, "B");
        assert!(!responses[1].is_correct);
    }
}
