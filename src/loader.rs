use crate::backend::QuizBackend;
use crate::error::LoadError;
use crate::models::{
    validate_backend_quiz, validate_definition, BackendQuiz, Difficulty, Question, QuizDefinition, QuizOption,
};
use tracing::{info, warn};

/// Letter code for the option at `index` ("A" for 0, "B" for 1, ...).
pub fn option_code(index: usize) -> String {
    debug_assert!(index < crate::models::MAX_OPTIONS);
    char::from(b'A' + index as u8).to_string()
}

/// Turns a backend quiz into a session-ready definition with letter option ids.
pub fn normalize(quiz_id: &str, quiz: BackendQuiz) -> Result<QuizDefinition, LoadError> {
    if quiz.questions.is_empty() {
        return Err(LoadError::NoQuestions);
    }
    validate_backend_quiz(&quiz).map_err(LoadError::Malformed)?;

    let questions = quiz
        .questions
        .into_iter()
        .enumerate()
        .map(|(i, q)| {
            let mut correct_answer = String::new();
            let options = q
                .options
                .into_iter()
                .enumerate()
                .map(|(j, opt)| {
                    let id = option_code(j);
                    if opt.is_correct {
                        correct_answer = id.clone();
                    }
                    QuizOption { id, text: opt.text }
                })
                .collect();
            Question {
                id: i + 1,
                text: q.text,
                options,
                correct_answer,
                difficulty: Difficulty::from_level(q.difficulty_level),
                tags: q.tags,
                explanation: q.explanation,
            }
        })
        .collect();

    let definition = QuizDefinition {
        id: quiz.id.unwrap_or_else(|| quiz_id.to_string()),
        title: quiz.title,
        questions,
    };
    validate_definition(&definition).map_err(LoadError::Malformed)?;
    Ok(definition)
}

/// Fetches `quiz_id` and normalizes it. Performs only the read call.
pub async fn load(backend: &dyn QuizBackend, quiz_id: &str) -> Result<QuizDefinition, LoadError> {
    let quiz_id = quiz_id.trim();
    if quiz_id.is_empty() {
        return Err(LoadError::EmptyQuizId);
    }

    let envelope = backend.fetch_quiz(quiz_id).await.map_err(|err| {
        warn!("quiz {} could not be fetched: {}", quiz_id, err);
        LoadError::from(err)
    })?;
    if envelope.status != "success" {
        return Err(LoadError::NoQuizBody(envelope.message));
    }
    let quiz = envelope
        .data
        .and_then(|d| d.quiz)
        .ok_or(LoadError::NoQuizBody(envelope.message))?;

    let definition = normalize(quiz_id, quiz)?;
    info!(
        "loaded quiz {} ({} questions)",
        definition.id,
        definition.questions.len()
    );
    Ok(definition)
}
