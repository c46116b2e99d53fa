use axum::{
    Json,
    extract::State,
    http::{HeaderMap, StatusCode},
};

use crate::api::error::ApiFailure;
use crate::api::state::AppState;
use crate::clients::models::requests::ContactRequest;
use crate::clients::models::responses::{ContactAck, HistoryEntry, Streak, UserStats, WeeklyEntry};
use crate::context::{ContextError, SessionContext};

pub async fn history(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<Vec<HistoryEntry>>, ApiFailure> {
    let ctx = SessionContext::from_headers(&headers)?;
    Ok(Json(state.fitness_client.history(&ctx).await?))
}

pub async fn stats(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<UserStats>, ApiFailure> {
    let ctx = SessionContext::from_headers(&headers)?;
    Ok(Json(state.fitness_client.stats(&ctx).await?))
}

pub async fn streak(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<Streak>, ApiFailure> {
    let ctx = SessionContext::from_headers(&headers)?;
    Ok(Json(state.fitness_client.streak(&ctx).await?))
}

pub async fn weekly(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<Vec<WeeklyEntry>>, ApiFailure> {
    let ctx = SessionContext::from_headers(&headers)?;
    Ok(Json(state.fitness_client.weekly(&ctx).await?))
}

/// Visitors may write in without signing in; a bad header is still an error.
pub async fn contact(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(message): Json<ContactRequest>,
) -> Result<(StatusCode, Json<ContactAck>), ApiFailure> {
    let ctx = match SessionContext::from_headers(&headers) {
        Ok(ctx) => Some(ctx),
        Err(ContextError::MissingAuthorization) => None,
        Err(e) => return Err(e.into()),
    };

    let ack = state
        .fitness_client
        .submit_contact(ctx.as_ref(), &message)
        .await?;

    tracing::info!(signed_in = ctx.is_some(), "contact.submitted");
    Ok((StatusCode::CREATED, Json(ack)))
}
