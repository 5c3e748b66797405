use crate::error::{AppError, ErrorDetail};
use crate::models::{AttemptRecord, QuizEnvelope, QuizEnvelopeData, ResponseRecord, SubmissionReceipt};
use crate::scoring::percentage;
use crate::state::AppState;
use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::Json;
use chrono::Utc;
use serde::Deserialize;
use tracing::{info, warn};
use validator::Validate;

fn request_id_from_headers(headers: &HeaderMap) -> String {
    headers
        .get("x-request-id")
        .and_then(|h| h.to_str().ok())
        .map(|s| s.to_string())
        .unwrap_or_else(|| uuid::Uuid::new_v4().to_string())
}

fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(axum::http::header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
}

fn ensure_authorized(headers: &HeaderMap, state: &AppState, req_id: &str) -> Result<(), AppError> {
    let Some(required) = state.required_token.as_deref() else {
        return Ok(());
    };
    if bearer_token(headers) == Some(required) {
        Ok(())
    } else {
        Err(AppError::new(StatusCode::UNAUTHORIZED, "UNAUTHORIZED", "missing or invalid bearer token", req_id))
    }
}

pub async fn get_quiz(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<Json<QuizEnvelope>, AppError> {
    let req_id = request_id_from_headers(&headers);
    ensure_authorized(&headers, &state, &req_id)?;
    let quiz = state
        .store
        .quizzes
        .get(&id)
        .map(|q| q.value().clone())
        .ok_or_else(|| AppError::new(StatusCode::NOT_FOUND, "NOT_FOUND", "quiz not found", req_id))?;
    Ok(Json(QuizEnvelope {
        status: "success".into(),
        message: None,
        data: Some(QuizEnvelopeData { quiz: Some(quiz) }),
    }))
}

#[derive(Debug, Deserialize, Validate)]
pub struct SubmitScorePayload {
    #[serde(rename = "quizId")]
    #[validate(length(min = 1))]
    pub quiz_id: String,
    #[validate(length(min = 1))]
    pub responses: Vec<ResponseRecord>,
    #[validate(range(max = 100))]
    pub score: u32,
    #[serde(rename = "timeTaken")]
    pub time_taken: u64,
    #[serde(rename = "incorrectTopics", default)]
    pub incorrect_topics: Vec<String>,
}

pub async fn submit_score(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(payload): Json<SubmitScorePayload>,
) -> Result<(StatusCode, Json<SubmissionReceipt>), AppError> {
    let req_id = request_id_from_headers(&headers);
    ensure_authorized(&headers, &state, &req_id)?;

    if let Err(errors) = payload.validate() {
        let details = errors
            .field_errors()
            .into_iter()
            .map(|(field, errs)| ErrorDetail {
                field: field.to_string(),
                issue: errs
                    .iter()
                    .map(|e| e.code.to_string())
                    .collect::<Vec<_>>()
                    .join(","),
            })
            .collect();
        return Err(
            AppError::new(StatusCode::BAD_REQUEST, "VALIDATION_ERROR", "submission validation failed", req_id)
                .with_details(details),
        );
    }

    let total = state
        .store
        .quizzes
        .get(&payload.quiz_id)
        .map(|q| q.questions.len())
        .ok_or_else(|| AppError::new(StatusCode::NOT_FOUND, "NOT_FOUND", "quiz not found", req_id.clone()))?;

    if state.store.take_failure() {
        warn!("injected submission failure for quiz {}", payload.quiz_id);
        return Err(AppError::new(
            StatusCode::SERVICE_UNAVAILABLE,
            "UNAVAILABLE",
            "score service unavailable",
            req_id,
        ));
    }

    let correct = payload.responses.iter().filter(|r| r.is_correct).count();
    let score = percentage(correct, total.max(payload.responses.len()));
    if score != payload.score {
        warn!(
            "client score {} differs from recomputed {} for quiz {}",
            payload.score, score, payload.quiz_id
        );
    }

    let record = AttemptRecord {
        id: uuid::Uuid::new_v4().to_string(),
        score,
        time_taken: payload.time_taken,
        responses: payload.responses,
        incorrect_topics: payload.incorrect_topics,
        completed_at: Utc::now().to_rfc3339(),
    };
    state.store.attempts.insert(record.id.clone(), record.clone());
    info!("stored attempt {} for quiz {} ({}%)", record.id, payload.quiz_id, record.score);

    Ok((
        StatusCode::CREATED,
        Json(SubmissionReceipt {
            success: true,
            attempt: Some(record),
            message: None,
        }),
    ))
}
