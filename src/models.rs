use serde::{Deserialize, Serialize};
use std::collections::HashSet;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

impl Difficulty {
    /// Maps the backend's numeric `difficultyLevel` onto a label.
    pub fn from_level(level: i64) -> Self {
        if level <= 2 {
            Difficulty::Easy
        } else if level <= 4 {
            Difficulty::Medium
        } else {
            Difficulty::Hard
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Difficulty::Easy => "easy",
            Difficulty::Medium => "medium",
            Difficulty::Hard => "hard",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct QuizOption {
    pub id: String,
    pub text: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Question {
    /// 1-based position in the quiz.
    pub id: usize,
    pub text: String,
    pub options: Vec<QuizOption>,
    #[serde(rename = "correctAnswer")]
    pub correct_answer: String,
    pub difficulty: Difficulty,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub explanation: Option<String>,
}

impl Question {
    pub fn has_option(&self, option_id: &str) -> bool {
        self.options.iter().any(|o| o.id == option_id)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct QuizDefinition {
    pub id: String,
    pub title: String,
    pub questions: Vec<Question>,
}

impl QuizDefinition {
    pub fn question(&self, question_id: usize) -> Option<&Question> {
        self.questions.iter().find(|q| q.id == question_id)
    }
}

// Wire shapes of `GET /quiz/{quizId}`.

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackendOption {
    pub text: String,
    #[serde(rename = "isCorrect", default)]
    pub is_correct: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackendQuestion {
    pub text: String,
    pub options: Vec<BackendOption>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(rename = "difficultyLevel", default = "default_difficulty_level")]
    pub difficulty_level: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub explanation: Option<String>,
}

fn default_difficulty_level() -> i64 {
    1
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackendQuiz {
    #[serde(rename = "_id", default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub title: String,
    #[serde(default)]
    pub questions: Vec<BackendQuestion>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuizEnvelopeData {
    #[serde(default)]
    pub quiz: Option<BackendQuiz>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuizEnvelope {
    pub status: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<QuizEnvelopeData>,
}

// Wire shapes of `POST /score/submit`.

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ResponseRecord {
    pub question: usize,
    #[serde(rename = "selectedOption")]
    pub selected_option: String,
    #[serde(rename = "isCorrect")]
    pub is_correct: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SubmissionPayload {
    #[serde(rename = "quizId")]
    pub quiz_id: String,
    pub responses: Vec<ResponseRecord>,
    pub score: u32,
    #[serde(rename = "timeTaken")]
    pub time_taken: u64,
    #[serde(rename = "incorrectTopics")]
    pub incorrect_topics: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AttemptRecord {
    #[serde(rename = "_id")]
    pub id: String,
    pub score: u32,
    #[serde(rename = "timeTaken")]
    pub time_taken: u64,
    #[serde(default)]
    pub responses: Vec<ResponseRecord>,
    #[serde(rename = "incorrectTopics", default)]
    pub incorrect_topics: Vec<String>,
    #[serde(rename = "completedAt")]
    pub completed_at: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmissionReceipt {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attempt: Option<AttemptRecord>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ValidationIssue {
    pub field: String,
    pub issue: String,
}

pub const MAX_OPTIONS: usize = 26;

/// Checks a backend quiz before it is normalized into a [`QuizDefinition`].
pub fn validate_backend_quiz(quiz: &BackendQuiz) -> Result<(), Vec<ValidationIssue>> {
    let mut issues = Vec::new();
    if quiz.questions.is_empty() {
        issues.push(ValidationIssue {
            field: "questions".into(),
            issue: "must contain at least one question".into(),
        });
    }

    for (i, q) in quiz.questions.iter().enumerate() {
        if q.text.trim().is_empty() {
            issues.push(ValidationIssue {
                field: format!("questions[{i}].text"),
                issue: "must not be empty".into(),
            });
        }
        if q.options.len() < 2 {
            issues.push(ValidationIssue {
                field: format!("questions[{i}].options"),
                issue: "must contain at least 2 options".into(),
            });
        }
        if q.options.len() > MAX_OPTIONS {
            issues.push(ValidationIssue {
                field: format!("questions[{i}].options"),
                issue: format!("must contain at most {MAX_OPTIONS} options"),
            });
        }
        for (j, opt) in q.options.iter().enumerate() {
            if opt.text.trim().is_empty() {
                issues.push(ValidationIssue {
                    field: format!("questions[{i}].options[{j}].text"),
                    issue: "must not be empty".into(),
                });
            }
        }
        match q.options.iter().filter(|o| o.is_correct).count() {
            1 => {}
            0 => issues.push(ValidationIssue {
                field: format!("questions[{i}].options"),
                issue: "must mark one option as correct".into(),
            }),
            _ => issues.push(ValidationIssue {
                field: format!("questions[{i}].options"),
                issue: "must mark only one option as correct".into(),
            }),
        }
    }

    if issues.is_empty() {
        Ok(())
    } else {
        Err(issues)
    }
}

/// Structural invariants of an already normalized quiz.
pub fn validate_definition(quiz: &QuizDefinition) -> Result<(), Vec<ValidationIssue>> {
    let mut issues = Vec::new();
    let mut question_ids = HashSet::new();
    for (i, q) in quiz.questions.iter().enumerate() {
        if !question_ids.insert(q.id) {
            issues.push(ValidationIssue {
                field: format!("questions[{i}].id"),
                issue: "must be unique".into(),
            });
        }
        let mut option_ids = HashSet::new();
        for (j, opt) in q.options.iter().enumerate() {
            if !option_ids.insert(opt.id.as_str()) {
                issues.push(ValidationIssue {
                    field: format!("questions[{i}].options[{j}].id"),
                    issue: "must be unique".into(),
                });
            }
        }
        if !q.has_option(&q.correct_answer) {
            issues.push(ValidationIssue {
                field: format!("questions[{i}].correctAnswer"),
                issue: "must reference existing option id".into(),
            });
        }
    }
    if issues.is_empty() {
        Ok(())
    } else {
        Err(issues)
    }
}
