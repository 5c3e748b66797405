use crate::models::{AttemptRecord, BackendQuiz};
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tracing::warn;

/// Seed file layout: quiz id → quiz body.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct SeedFile {
    quizzes: HashMap<String, BackendQuiz>,
}

pub struct InMemoryStore {
    pub quizzes: DashMap<String, BackendQuiz>,
    pub attempts: DashMap<String, AttemptRecord>,
    failing_submissions: AtomicUsize,
}

impl InMemoryStore {
    pub fn new(seed_path: Option<&str>) -> Self {
        let seed = seed_path.and_then(|path| {
            let raw = match fs::read_to_string(path) {
                Ok(raw) => raw,
                Err(err) => {
                    warn!("failed to read quiz seed {}: {}", path, err);
                    return None;
                }
            };
            match serde_json::from_str::<SeedFile>(&raw) {
                Ok(s) => Some(s),
                Err(err) => {
                    warn!("failed to parse quiz seed {}: {}", path, err);
                    None
                }
            }
        });

        let quizzes = DashMap::new();
        for (id, quiz) in seed.unwrap_or_default().quizzes {
            quizzes.insert(id, quiz);
        }
        Self {
            quizzes,
            attempts: DashMap::new(),
            failing_submissions: AtomicUsize::new(0),
        }
    }

    /// Takes one unit of injected submission failure, if any is pending.
    pub fn take_failure(&self) -> bool {
        self.failing_submissions
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok()
    }
}

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<InMemoryStore>,
    pub required_token: Option<String>,
}

impl AppState {
    pub fn new(seed_path: Option<&str>, required_token: Option<String>) -> Self {
        Self {
            store: Arc::new(InMemoryStore::new(seed_path)),
            required_token,
        }
    }

    pub fn insert_quiz(&self, id: impl Into<String>, quiz: BackendQuiz) {
        self.store.quizzes.insert(id.into(), quiz);
    }

    /// Makes the next `count` submissions answer with 503.
    pub fn fail_next_submissions(&self, count: usize) {
        self.store.failing_submissions.store(count, Ordering::SeqCst);
    }

    pub fn attempt_count(&self) -> usize {
        self.store.attempts.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn failures_are_consumed_one_at_a_time() {
        let state = AppState::new(None, None);
        assert!(!state.store.take_failure());
        state.fail_next_submissions(2);
        assert!(state.store.take_failure());
        assert!(state.store.take_failure());
        assert!(!state.store.take_failure());
    }

    #[test]
    fn seed_file_is_loaded() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("seed.json");
        let seed = serde_json::json!({
            "quizzes": {
                "geo": {"title": "Geo", "questions": [{
                    "text": "Capital of Italy?",
                    "options": [{"text": "Rome", "isCorrect": true}, {"text": "Milan"}],
                    "difficultyLevel": 2
                }]}
            }
        });
        fs::write(&path, seed.to_string()).unwrap();
        let store = InMemoryStore::new(path.to_str());
        assert_eq!(store.quizzes.get("geo").unwrap().questions.len(), 1);
    }

    #[test]
    fn bad_seed_starts_empty() {
        let store = InMemoryStore::new(Some("/nonexistent/seed.json"));
        assert!(store.quizzes.is_empty());
    }
}
