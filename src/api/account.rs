use axum::{Json, extract::State, http::HeaderMap};
use serde::{Deserialize, Serialize};

use crate::api::error::ApiFailure;
use crate::api::state::AppState;
use crate::clients::models::responses::{LoginResponse, RefreshResponse, User};
use crate::context::SessionContext;

#[derive(Deserialize)]
pub struct LoginPayload {
    pub email: String,
    pub password: String,
}

#[derive(Deserialize)]
pub struct RefreshPayload {
    pub refresh: String,
}

#[derive(Serialize)]
pub struct LogoutBody {
    pub discarded_session: bool,
}

/// Exchange credentials for tokens. The UI keeps the tokens and sends the
/// access token back as a bearer header on every later call.
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginPayload>,
) -> Result<Json<LoginResponse>, ApiFailure> {
    let response = state
        .fitness_client
        .login(&payload.email, &payload.password)
        .await?;

    tracing::info!(user_id = %response.user.id, "auth.login");
    Ok(Json(response))
}

/// Swap a refresh token for a new access token. When the expiring access
/// token is still sent as the bearer header, the live workout session moves
/// over to the new one so no marks are lost.
pub async fn refresh(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(payload): Json<RefreshPayload>,
) -> Result<Json<RefreshResponse>, ApiFailure> {
    let previous = SessionContext::from_headers(&headers).ok();
    let response = state.fitness_client.refresh(&payload.refresh).await?;

    if let Some(previous) = previous {
        let moved_session = state
            .sessions
            .rekey(previous.session_key(), &response.access);
        tracing::debug!(moved_session, "auth.refreshed");
    }

    Ok(Json(response))
}

pub async fn logout(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<LogoutBody>, ApiFailure> {
    let ctx = SessionContext::from_headers(&headers)?;
    let discarded_session = state.sessions.remove(ctx.session_key());

    tracing::info!(discarded_session, "auth.logout");
    Ok(Json(LogoutBody { discarded_session }))
}

pub async fn profile(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<User>, ApiFailure> {
    let ctx = SessionContext::from_headers(&headers)?;
    Ok(Json(state.fitness_client.profile(&ctx).await?))
}
