use axum::{
    Json,
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
};

use crate::api::error::ApiFailure;
use crate::api::state::AppState;
use crate::clients::models::responses::{CurrentProgramResponse, ProgramDetail, ProgramSummary};
use crate::context::SessionContext;

pub async fn list_programs(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<Vec<ProgramSummary>>, ApiFailure> {
    let ctx = SessionContext::from_headers(&headers)?;
    Ok(Json(state.fitness_client.list_programs(&ctx).await?))
}

pub async fn get_program(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(program_id): Path<String>,
) -> Result<Json<ProgramDetail>, ApiFailure> {
    let ctx = SessionContext::from_headers(&headers)?;
    Ok(Json(
        state.fitness_client.get_program(&ctx, &program_id).await?,
    ))
}

pub async fn current_program(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<CurrentProgramResponse>, ApiFailure> {
    let ctx = SessionContext::from_headers(&headers)?;
    Ok(Json(state.fitness_client.current_program(&ctx).await?))
}

pub async fn enroll(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(program_id): Path<String>,
) -> Result<(StatusCode, Json<serde_json::Value>), ApiFailure> {
    let ctx = SessionContext::from_headers(&headers)?;
    let enrollment = state.fitness_client.enroll(&ctx, &program_id).await?;

    tracing::info!(%program_id, "program.enrolled");
    Ok((StatusCode::CREATED, Json(enrollment)))
}
