use axum::{
    Router,
    http::HeaderValue,
    routing::{get, post},
};
use tower_http::cors::{Any, CorsLayer};

use crate::api::state::AppState;
use crate::config::Config;

pub mod account;
pub mod error;
pub mod programs;
pub mod progress;
pub mod session;
pub mod state;

pub fn router(state: AppState) -> anyhow::Result<Router> {
    let cors = cors_layer(&state.config)?;

    Ok(Router::new()
        .route("/", get(|| async { "workout companion is running" }))
        .route("/api/auth/login", post(account::login))
        .route("/api/auth/refresh", post(account::refresh))
        .route("/api/auth/logout", post(account::logout))
        .route("/api/profile", get(account::profile))
        .route("/api/programs", get(programs::list_programs))
        .route("/api/programs/current", get(programs::current_program))
        .route("/api/programs/{id}", get(programs::get_program))
        .route("/api/programs/{id}/enroll", post(programs::enroll))
        .route(
            "/api/session",
            get(session::get_session).post(session::start_session),
        )
        .route("/api/session/progress", get(session::get_progress))
        .route(
            "/api/session/exercises/{id}/complete",
            post(session::complete_exercise),
        )
        .route(
            "/api/session/exercises/{id}/skip",
            post(session::skip_exercise),
        )
        .route("/api/session/finish", post(session::finish_session))
        .route("/api/progress/history", get(progress::history))
        .route("/api/progress/stats", get(progress::stats))
        .route("/api/progress/streak", get(progress::streak))
        .route("/api/progress/weekly", get(progress::weekly))
        .route("/api/contact", post(progress::contact))
        .layer(cors)
        .with_state(state))
}

fn cors_layer(config: &Config) -> anyhow::Result<CorsLayer> {
    Ok(match &config.cors_allow_origin {
        Some(origin) => CorsLayer::new()
            .allow_origin(origin.parse::<HeaderValue>()?)
            .allow_methods(Any)
            .allow_headers(Any),
        None => CorsLayer::permissive(),
    })
}
