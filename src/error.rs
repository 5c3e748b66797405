use crate::models::ValidationIssue;
use crate::session::SessionPhase;
use axum::{http::StatusCode, response::{IntoResponse, Response}, Json};
use serde::Serialize;

#[derive(Debug, thiserror::Error)]
pub enum BackendError {
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("backend returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("backend rejected request: {0}")]
    Rejected(String),

    #[error("cannot decode backend response: {0}")]
    Decode(#[from] serde_json::Error),
}

#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("quiz id must not be empty")]
    EmptyQuizId,

    #[error("quiz request failed: {0}")]
    Backend(#[from] BackendError),

    #[error("backend returned no quiz body{}", .0.as_deref().map(|m| format!(": {m}")).unwrap_or_default())]
    NoQuizBody(Option<String>),

    #[error("quiz has no questions")]
    NoQuestions,

    #[error("quiz is malformed ({} issues)", .0.len())]
    Malformed(Vec<ValidationIssue>),
}

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("cannot {op} while session is {phase:?}")]
    InvalidTransition { op: &'static str, phase: SessionPhase },

    #[error("question {0} does not exist in this quiz")]
    UnknownQuestion(usize),

    #[error("option {option} does not exist on question {question}")]
    UnknownOption { question: usize, option: String },

    #[error("snapshot belongs to quiz {snapshot}, active quiz is {active}")]
    SnapshotMismatch { snapshot: String, active: String },

    #[error("snapshot io: {0}")]
    SnapshotIo(#[from] std::io::Error),

    #[error("snapshot decode: {0}")]
    SnapshotDecode(#[from] serde_json::Error),
}

#[derive(Debug, thiserror::Error)]
pub enum SubmitError {
    #[error("{answered} of {total} questions answered")]
    IncompleteAnswers { answered: usize, total: usize },

    #[error("a submission is already in flight")]
    AlreadySubmitting,

    #[error("cannot submit while session is {0:?}")]
    InvalidState(SessionPhase),

    #[error("submission failed: {0}")]
    Submission(#[from] BackendError),
}

impl SubmitError {
    /// The single recovery action offered to the student.
    pub fn recovery_hint(&self) -> &'static str {
        match self {
            SubmitError::IncompleteAnswers { .. } => "answer the remaining questions",
            SubmitError::AlreadySubmitting => "wait for the current submission",
            SubmitError::InvalidState(_) => "start the quiz again",
            SubmitError::Submission(_) => "retry submission",
        }
    }
}

// JSON error body of the development backend.

#[derive(Debug, Clone, Serialize)]
pub struct ErrorDetail {
    pub field: String,
    pub issue: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ErrorBody {
    pub error: ErrorPayload,
}

#[derive(Debug, Clone, Serialize)]
pub struct ErrorPayload {
    pub code: &'static str,
    pub message: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub details: Vec<ErrorDetail>,
    pub request_id: String,
}

#[derive(Debug)]
pub struct AppError {
    pub status: StatusCode,
    pub code: &'static str,
    pub message: String,
    pub details: Vec<ErrorDetail>,
    pub request_id: String,
}

impl AppError {
    pub fn new(status: StatusCode, code: &'static str, message: impl Into<String>, request_id: impl Into<String>) -> Self {
        Self {
            status,
            code,
            message: message.into(),
            details: Vec::new(),
            request_id: request_id.into(),
        }
    }

    pub fn with_details(mut self, details: Vec<ErrorDetail>) -> Self {
        self.details = details;
        self
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let payload = ErrorBody {
            error: ErrorPayload {
                code: self.code,
                message: self.message,
                details: self.details,
                request_id: self.request_id,
            },
        };
        (self.status, Json(payload)).into_response()
    }
}
