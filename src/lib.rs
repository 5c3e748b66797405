pub mod attempt;
pub mod backend;
pub mod clock;
pub mod config;
pub mod error;
pub mod handlers;
pub mod loader;
pub mod models;
pub mod navigation;
pub mod persist;
pub mod routes;
pub mod scoring;
pub mod session;
pub mod state;
pub mod submission;

pub use backend::{HttpBackend, QuizBackend};
pub use session::{QuizSession, SessionPhase};

use config::ServerConfig;

pub fn build_state(config: &ServerConfig) -> state::AppState {
    state::AppState::new(config.seed_path.as_deref(), config.required_token.clone())
}
