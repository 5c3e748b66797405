use crate::backend::QuizBackend;
use crate::error::{BackendError, SubmitError};
use crate::models::{SubmissionPayload, SubmissionReceipt};
use crate::scoring::{self, ScoreResult};
use crate::session::{CompletedAttempt, QuizSession, SessionPhase};
use tracing::{info, warn};

/// A scored attempt waiting for its single network write.
#[derive(Debug, Clone)]
pub struct PreparedSubmission {
    pub result: ScoreResult,
    pub payload: SubmissionPayload,
}

/// Gates and scores the attempt, moving the session to `Submitting`.
///
/// Fails without touching the session when answers are missing or a
/// submission is already in flight.
pub fn prepare(session: &mut QuizSession) -> Result<PreparedSubmission, SubmitError> {
    match session.phase() {
        SessionPhase::InProgress | SessionPhase::Failed => {}
        SessionPhase::Submitting => return Err(SubmitError::AlreadySubmitting),
        phase => return Err(SubmitError::InvalidState(phase)),
    }
    if !session.is_complete() {
        let answered = session.attempt().map(|a| a.answered_count()).unwrap_or(0);
        return Err(SubmitError::IncompleteAnswers {
            answered,
            total: session.quiz().questions.len(),
        });
    }

    let now = session.clock().now();
    let result = match session.attempt() {
        Some(attempt) => scoring::score(session.quiz(), attempt, now),
        None => return Err(SubmitError::InvalidState(session.phase())),
    };
    let payload = SubmissionPayload {
        quiz_id: session.quiz().id.clone(),
        responses: result.responses(),
        score: result.percentage,
        time_taken: result.elapsed_secs,
        incorrect_topics: result.weak_topics.iter().cloned().collect(),
    };
    if let Some(attempt) = session.attempt_mut() {
        attempt.ended_at = Some(now);
    }
    session.set_phase(SessionPhase::Submitting);
    info!(
        "submitting quiz {}: {}/{} correct ({}%)",
        payload.quiz_id, result.correct, result.total, result.percentage
    );
    Ok(PreparedSubmission { result, payload })
}

/// Applies the outcome of the network write to the session.
///
/// Callers driving `prepare` and `finish` themselves sync the snapshot file
/// afterwards with [`QuizSession::persist`].
pub fn finish(
    session: &mut QuizSession,
    prepared: PreparedSubmission,
    outcome: Result<SubmissionReceipt, BackendError>,
) -> Result<CompletedAttempt, SubmitError> {
    if session.phase() != SessionPhase::Submitting {
        return Err(SubmitError::InvalidState(session.phase()));
    }

    let attempt = outcome.and_then(|receipt| {
        if !receipt.success {
            return Err(BackendError::Rejected(
                receipt.message.unwrap_or_else(|| "submission not accepted".to_string()),
            ));
        }
        receipt
            .attempt
            .ok_or_else(|| BackendError::Rejected("response carried no attempt".to_string()))
    });
    let record = match attempt {
        Ok(record) => record,
        Err(err) => {
            warn!("submission of quiz {} failed: {}", prepared.payload.quiz_id, err);
            if let Some(attempt) = session.attempt_mut() {
                attempt.ended_at = None;
            }
            session.set_phase(SessionPhase::Failed);
            return Err(SubmitError::Submission(err));
        }
    };

    if record.score != prepared.result.percentage {
        warn!(
            "score mismatch on attempt {}: local {} backend {}",
            record.id, prepared.result.percentage, record.score
        );
    }
    if record.time_taken != prepared.result.elapsed_secs {
        warn!(
            "time mismatch on attempt {}: local {}s backend {}s",
            record.id, prepared.result.elapsed_secs, record.time_taken
        );
    }

    let completed = CompletedAttempt {
        quiz_id: prepared.payload.quiz_id,
        attempt_id: record.id,
        completed_at: record.completed_at,
        result: prepared.result,
    };
    info!("attempt {} recorded for quiz {}", completed.attempt_id, completed.quiz_id);
    session.complete(completed.clone());
    Ok(completed)
}

/// Moves a session stuck in `Submitting` to `Failed`, keeping its answers
/// for a retry. Returns `false` when no submission was in flight.
pub fn abort(session: &mut QuizSession) -> bool {
    session.abandon_submission()
}

/// Holds the session while the network write is pending. Dropping it before
/// `finish` ran leaves the session resubmittable.
struct InFlight<'a> {
    session: &'a mut QuizSession,
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.session.abandon_submission();
    }
}

/// Scores the attempt and performs exactly one submission. A completed
/// attempt removes its saved snapshot; a failed one keeps it for the retry.
pub async fn submit(session: &mut QuizSession, backend: &dyn QuizBackend) -> Result<CompletedAttempt, SubmitError> {
    let prepared = prepare(session)?;
    let in_flight = InFlight { session };
    let outcome = backend.submit_score(prepared.payload.clone()).await;
    let result = finish(&mut *in_flight.session, prepared, outcome);
    in_flight.session.persist_or_warn().await;
    result
}

/// Submits through the same gate once the countdown has run out.
/// Returns `Ok(None)` while time remains or when there is no countdown.
pub async fn submit_if_expired(
    session: &mut QuizSession,
    backend: &dyn QuizBackend,
) -> Result<Option<CompletedAttempt>, SubmitError> {
    if !session.is_expired() {
        return Ok(None);
    }
    info!("time limit reached on quiz {}", session.quiz().id);
    submit(session, backend).await.map(Some)
}
