use crate::api::state::AppState;
use crate::config::Config;

mod api;
mod clients;
mod config;
mod context;
mod services;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_target(false)
        .compact()
        .init();

    let config = Config::from_env()?;

    tracing::info!(
        api_url = %config.fitness_api_url,
        finish_policy = ?config.finish_policy,
        duration_policy = ?config.duration_policy,
        "config.loaded"
    );

    let state = AppState::new(config.clone())?;
    let app = api::router(state)?;

    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", config.port)).await?;
    tracing::info!(port = %config.port, "server.listening");
    axum::serve(listener, app).await?;
    Ok(())
}
