use crate::attempt::AttemptState;
use crate::backend::QuizBackend;
use crate::clock::Clock;
use crate::config::ClientConfig;
use crate::error::{LoadError, SessionError};
use crate::loader;
use crate::models::{Question, QuizDefinition};
use crate::navigation::Cursor;
use crate::persist::{self, AttemptSnapshot};
use crate::scoring::ScoreResult;
use chrono::Duration;
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SessionPhase {
    Uninitialized,
    InProgress,
    Submitting,
    Completed,
    Failed,
}

/// What the student sees after a successful submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CompletedAttempt {
    pub quiz_id: String,
    pub attempt_id: String,
    pub completed_at: String,
    pub result: ScoreResult,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReviewItem {
    pub question_id: usize,
    pub text: String,
    pub selected: Option<String>,
    pub correct_answer: String,
    pub is_correct: bool,
    pub explanation: Option<String>,
}

/// Session-scoped context for one student attempting one quiz.
///
/// Owns the attempt state exclusively; the quiz definition is shared read-only.
pub struct QuizSession {
    quiz: Arc<QuizDefinition>,
    clock: Arc<dyn Clock>,
    phase: SessionPhase,
    attempt: Option<AttemptState>,
    cursor: Cursor,
    time_limit: Option<Duration>,
    completed: Option<CompletedAttempt>,
    snapshot_path: Option<PathBuf>,
}

/// Countdown for a configured number of seconds. Values chrono cannot
/// represent yield `None`.
pub fn time_limit_from_secs(secs: u64) -> Option<Duration> {
    i64::try_from(secs).ok().and_then(Duration::try_seconds)
}

impl QuizSession {
    pub fn new(quiz: impl Into<Arc<QuizDefinition>>, clock: Arc<dyn Clock>) -> Self {
        let quiz = quiz.into();
        let cursor = Cursor::new(quiz.questions.len());
        Self {
            quiz,
            clock,
            phase: SessionPhase::Uninitialized,
            attempt: None,
            cursor,
            time_limit: None,
            completed: None,
            snapshot_path: None,
        }
    }

    /// Loads `quiz_id` and starts an attempt on it. A load failure leaves no session behind.
    pub async fn open(backend: &dyn QuizBackend, quiz_id: &str, clock: Arc<dyn Clock>) -> Result<Self, LoadError> {
        let quiz = loader::load(backend, quiz_id).await?;
        let mut session = Self::new(quiz, clock);
        session.begin_attempt();
        Ok(session)
    }

    /// Like [`QuizSession::open`], but applies the configured countdown and
    /// resumes a saved attempt on the same quiz when one exists. Unreadable
    /// snapshots are logged and a fresh attempt is started instead. The
    /// session keeps writing to the configured snapshot path afterwards.
    pub async fn open_with_config(
        backend: &dyn QuizBackend,
        quiz_id: &str,
        clock: Arc<dyn Clock>,
        config: &ClientConfig,
    ) -> Result<Self, LoadError> {
        let quiz = Arc::new(loader::load(backend, quiz_id).await?);

        let snapshot = match config.snapshot_path.as_deref() {
            Some(path) => persist::load_snapshot(path).await.unwrap_or_else(|err| {
                warn!("ignoring attempt snapshot {}: {}", path, err);
                None
            }),
            None => None,
        };
        let resumed = snapshot
            .filter(|s| s.quiz_id == quiz.id)
            .and_then(|s| match Self::resume(quiz.clone(), s, clock.clone()) {
                Ok(session) => Some(session),
                Err(err) => {
                    warn!("cannot resume attempt on quiz {}: {}", quiz.id, err);
                    None
                }
            });
        let mut session = resumed.unwrap_or_else(|| {
            let mut fresh = Self::new(quiz, clock);
            fresh.begin_attempt();
            fresh
        });

        if let Some(secs) = config.time_limit_secs {
            match time_limit_from_secs(secs) {
                Some(limit) => session = session.with_time_limit(limit),
                None => warn!("time limit of {}s is out of range, running without countdown", secs),
            }
        }
        if let Some(path) = config.snapshot_path.as_deref() {
            session = session.with_snapshot_path(path);
        }
        Ok(session)
    }

    pub fn with_time_limit(mut self, limit: Duration) -> Self {
        self.time_limit = Some(limit);
        self
    }

    pub fn with_snapshot_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.snapshot_path = Some(path.into());
        self
    }

    pub fn snapshot_path(&self) -> Option<&Path> {
        self.snapshot_path.as_deref()
    }

    /// Rebuilds an in-progress session from a saved snapshot.
    pub fn resume(
        quiz: impl Into<Arc<QuizDefinition>>,
        snapshot: AttemptSnapshot,
        clock: Arc<dyn Clock>,
    ) -> Result<Self, SessionError> {
        let mut session = Self::new(quiz, clock);
        if snapshot.quiz_id != session.quiz.id {
            return Err(SessionError::SnapshotMismatch {
                snapshot: snapshot.quiz_id,
                active: session.quiz.id.clone(),
            });
        }
        for (question_id, option_id) in &snapshot.answers {
            session.check_answer(*question_id, option_id)?;
        }
        session.cursor.jump_to(snapshot.cursor);
        session.attempt = Some(AttemptState::from_parts(
            snapshot.quiz_id,
            snapshot.answers.into_iter().collect(),
            snapshot.started_at,
        ));
        session.phase = SessionPhase::InProgress;
        info!("resumed attempt on quiz {}", session.quiz.id);
        Ok(session)
    }

    /// Starts a fresh attempt. Valid from `Uninitialized`, or from `Completed` as a restart.
    pub fn start(&mut self) -> Result<(), SessionError> {
        match self.phase {
            SessionPhase::Uninitialized | SessionPhase::Completed => {
                self.begin_attempt();
                Ok(())
            }
            phase => Err(SessionError::InvalidTransition { op: "start", phase }),
        }
    }

    fn begin_attempt(&mut self) {
        self.attempt = Some(AttemptState::new(self.quiz.id.clone(), self.clock.now()));
        self.completed = None;
        self.cursor.reset();
        self.phase = SessionPhase::InProgress;
        info!("attempt started on quiz {}", self.quiz.id);
    }

    fn check_answer(&self, question_id: usize, option_id: &str) -> Result<(), SessionError> {
        let question = self
            .quiz
            .question(question_id)
            .ok_or(SessionError::UnknownQuestion(question_id))?;
        if !question.has_option(option_id) {
            return Err(SessionError::UnknownOption {
                question: question_id,
                option: option_id.to_string(),
            });
        }
        Ok(())
    }

    /// Records the first answer to a question. Later answers to the same
    /// question are ignored and return `Ok(false)`.
    pub fn record_answer(&mut self, question_id: usize, option_id: &str) -> Result<bool, SessionError> {
        if self.phase != SessionPhase::InProgress {
            return Err(SessionError::InvalidTransition {
                op: "record an answer",
                phase: self.phase,
            });
        }
        self.check_answer(question_id, option_id)?;
        let attempt = self.attempt.as_mut().ok_or(SessionError::InvalidTransition {
            op: "record an answer",
            phase: SessionPhase::Uninitialized,
        })?;
        let recorded = attempt.record(question_id, option_id);
        if !recorded {
            debug!("question {} already answered, ignoring {}", question_id, option_id);
        }
        Ok(recorded)
    }

    /// Records an answer and writes the snapshot when the mapping changed.
    /// A failed write is logged; the answer stays recorded.
    pub async fn answer(&mut self, question_id: usize, option_id: &str) -> Result<bool, SessionError> {
        let recorded = self.record_answer(question_id, option_id)?;
        if recorded {
            self.persist_or_warn().await;
        }
        Ok(recorded)
    }

    /// Restarts after a completed attempt and replaces any saved snapshot.
    pub async fn restart(&mut self) -> Result<(), SessionError> {
        self.start()?;
        self.persist_or_warn().await;
        Ok(())
    }

    /// Syncs the snapshot file with the current phase. An attempt being
    /// answered or awaiting a retry is saved; a completed or unstarted
    /// session removes the file. Nothing is written while submitting.
    pub async fn persist(&self) -> Result<(), SessionError> {
        let Some(path) = self.snapshot_path.as_deref() else {
            return Ok(());
        };
        match self.phase {
            SessionPhase::Submitting => Ok(()),
            SessionPhase::InProgress | SessionPhase::Failed => match self.snapshot() {
                Some(snapshot) => persist::save_snapshot(path, &snapshot).await,
                None => Ok(()),
            },
            SessionPhase::Uninitialized | SessionPhase::Completed => persist::remove_snapshot(path).await,
        }
    }

    pub(crate) async fn persist_or_warn(&self) {
        if let Err(err) = self.persist().await {
            warn!("failed to persist attempt on quiz {}: {}", self.quiz.id, err);
        }
    }

    /// Answers the question under the cursor.
    pub fn answer_current(&mut self, option_id: &str) -> Result<bool, SessionError> {
        let question_id = self
            .current_question()
            .map(|q| q.id)
            .ok_or(SessionError::UnknownQuestion(self.cursor.index() + 1))?;
        self.record_answer(question_id, option_id)
    }

    pub fn is_complete(&self) -> bool {
        self.attempt
            .as_ref()
            .map(|a| a.is_complete(&self.quiz))
            .unwrap_or(false)
    }

    pub fn next(&mut self) {
        self.cursor.next();
    }

    pub fn previous(&mut self) {
        self.cursor.previous();
    }

    pub fn jump_to(&mut self, index: usize) -> bool {
        self.cursor.jump_to(index)
    }

    pub fn cursor(&self) -> &Cursor {
        &self.cursor
    }

    pub fn current_question(&self) -> Option<&Question> {
        self.quiz.questions.get(self.cursor.index())
    }

    /// Whether the question at `index` is locked for review.
    pub fn is_answered(&self, index: usize) -> bool {
        match (self.quiz.questions.get(index), self.attempt.as_ref()) {
            (Some(q), Some(a)) => a.is_answered(q.id),
            _ => false,
        }
    }

    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    pub fn quiz(&self) -> &QuizDefinition {
        &self.quiz
    }

    pub fn attempt(&self) -> Option<&AttemptState> {
        self.attempt.as_ref()
    }

    pub fn completed(&self) -> Option<&CompletedAttempt> {
        self.completed.as_ref()
    }

    pub fn time_limit(&self) -> Option<Duration> {
        self.time_limit
    }

    /// Time left on the countdown, floored at zero. `None` without a limit.
    pub fn remaining(&self) -> Option<Duration> {
        let limit = self.time_limit?;
        let attempt = self.attempt.as_ref()?;
        let spent = self.clock.now() - attempt.started_at;
        Some((limit - spent).max(Duration::zero()))
    }

    pub fn is_expired(&self) -> bool {
        self.remaining().map(|r| r <= Duration::zero()).unwrap_or(false)
    }

    /// Per-question breakdown, available once the attempt has been scored.
    pub fn review(&self) -> Option<Vec<ReviewItem>> {
        let completed = self.completed.as_ref()?;
        Some(
            self.quiz
                .questions
                .iter()
                .zip(&completed.result.outcomes)
                .map(|(q, o)| ReviewItem {
                    question_id: q.id,
                    text: q.text.clone(),
                    selected: o.selected.clone(),
                    correct_answer: o.correct_answer.clone(),
                    is_correct: o.is_correct,
                    explanation: q.explanation.clone(),
                })
                .collect(),
        )
    }

    /// Saveable form of an attempt still being answered.
    pub fn snapshot(&self) -> Option<AttemptSnapshot> {
        if !matches!(self.phase, SessionPhase::InProgress | SessionPhase::Failed) {
            return None;
        }
        let attempt = self.attempt.as_ref()?;
        Some(AttemptSnapshot {
            quiz_id: attempt.quiz_id.clone(),
            answers: attempt.answers().iter().map(|(k, v)| (*k, v.clone())).collect(),
            started_at: attempt.started_at,
            cursor: self.cursor.index(),
        })
    }

    pub(crate) fn clock(&self) -> &dyn Clock {
        self.clock.as_ref()
    }

    pub(crate) fn set_phase(&mut self, phase: SessionPhase) {
        debug!("session {:?} -> {:?}", self.phase, phase);
        self.phase = phase;
    }

    pub(crate) fn attempt_mut(&mut self) -> Option<&mut AttemptState> {
        self.attempt.as_mut()
    }

    /// Returns a session stuck in `Submitting` to `Failed` so the answers can
    /// be resubmitted. Used when the network write was abandoned.
    pub(crate) fn abandon_submission(&mut self) -> bool {
        if self.phase != SessionPhase::Submitting {
            return false;
        }
        if let Some(attempt) = self.attempt.as_mut() {
            attempt.ended_at = None;
        }
        warn!("submission of quiz {} abandoned", self.quiz.id);
        self.set_phase(SessionPhase::Failed);
        true
    }

    /// Stores the terminal result and drops the answer mapping.
    pub(crate) fn complete(&mut self, completed: CompletedAttempt) {
        self.attempt = None;
        self.completed = Some(completed);
        self.set_phase(SessionPhase::Completed);
    }
}
