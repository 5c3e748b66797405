use quiz_battle_session::{build_state, config::ServerConfig, routes::build_router};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .json()
        .with_env_filter(EnvFilter::from_default_env().add_directive("info".parse()?))
        .init();

    let config = ServerConfig::from_env();
    let state = build_state(&config);
    tracing::info!("serving {} seeded quizzes", state.store.quizzes.len());
    if state.required_token.is_some() {
        tracing::info!("bearer token required on quiz and score routes");
    }
    let app = build_router(state);

    let addr = config.addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("quiz backend listening on {}", addr);
    axum::serve(listener, app).await?;
    Ok(())
}
