use axum::{
    Json,
    extract::{Path, State},
    http::HeaderMap,
};
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::api::error::ApiFailure;
use crate::api::state::AppState;
use crate::clients::models::common::{ExerciseDefinition, ResourceId};
use crate::clients::models::responses::CompletionAck;
use crate::context::SessionContext;
use crate::services::prescription::RepRange;
use crate::services::session_loader::EnrollmentContext;
use crate::services::status_tracker::{ExerciseStatus, Progress};
use crate::services::workout_session::WorkoutSession;

#[derive(Serialize)]
pub struct SessionBody {
    pub day_id: ResourceId,
    pub day_name: String,
    pub is_rest_day: bool,
    pub enrollment: EnrollmentContext,
    pub started_at: DateTime<Utc>,
    pub exercises: Vec<ExerciseBody>,
    pub progress: Progress,
    pub can_finish: bool,
}

#[derive(Serialize)]
pub struct ExerciseBody {
    pub id: ResourceId,
    pub status: ExerciseStatus,
    pub sets: u32,
    pub reps: String,
    pub rep_range: Option<RepRange>,
    pub rest_time: u32,
    pub notes: String,
    pub exercise: ExerciseDefinition,
}

#[derive(Serialize)]
pub struct MarkBody {
    pub id: ResourceId,
    pub status: ExerciseStatus,
    pub progress: Progress,
    pub next_pending: Option<ResourceId>,
    pub can_finish: bool,
}

#[derive(Serialize)]
pub struct FinishBody {
    pub message: &'static str,
    pub ack: CompletionAck,
}

fn session_body(state: &AppState, session: &WorkoutSession) -> SessionBody {
    let day = &session.view.day;
    let exercises = day
        .exercises
        .iter()
        .map(|assignment| ExerciseBody {
            id: assignment.id.clone(),
            status: session
                .statuses
                .status(&assignment.id)
                .unwrap_or(ExerciseStatus::Pending),
            sets: assignment.sets,
            reps: assignment.reps.clone(),
            rep_range: RepRange::parse(&assignment.reps),
            rest_time: assignment.rest_time,
            notes: assignment.notes.clone(),
            exercise: assignment.exercise.clone(),
        })
        .collect();

    SessionBody {
        day_id: day.id.clone(),
        day_name: day.day_name.clone(),
        is_rest_day: day.is_rest_day,
        enrollment: session.view.enrollment.clone(),
        started_at: session.started_at,
        exercises,
        progress: session.statuses.progress(),
        can_finish: state.session_completer.can_finish(&session.statuses),
    }
}

/// Load today's workout and start a fresh session, replacing any previous one.
pub async fn start_session(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<SessionBody>, ApiFailure> {
    let ctx = SessionContext::from_headers(&headers)?;
    let key = ctx.session_key();

    let ticket = state
        .sessions
        .begin_load(key)
        .ok_or(ApiFailure::InFlight("loading today's workout"))?;

    let view = match state.session_loader.load_today(&ctx).await {
        Ok(view) => view,
        Err(e) => {
            drop(ticket);
            state.sessions.release_if_idle(key);
            return Err(e.into());
        }
    };

    let session = WorkoutSession::start(state.sessions.next_generation(), view, Utc::now());
    let body = session_body(&state, &session);

    state.sessions.replace(key, session);
    Ok(Json(body))
}

pub async fn get_session(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<SessionBody>, ApiFailure> {
    let ctx = SessionContext::from_headers(&headers)?;
    let session = state
        .sessions
        .snapshot(ctx.session_key())
        .ok_or(ApiFailure::NoActiveSession)?;

    Ok(Json(session_body(&state, &session)))
}

pub async fn get_progress(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<Progress>, ApiFailure> {
    let ctx = SessionContext::from_headers(&headers)?;
    let session = state
        .sessions
        .snapshot(ctx.session_key())
        .ok_or(ApiFailure::NoActiveSession)?;

    Ok(Json(session.statuses.progress()))
}

pub async fn complete_exercise(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(exercise_id): Path<String>,
) -> Result<Json<MarkBody>, ApiFailure> {
    mark(&state, &headers, &exercise_id, ExerciseStatus::Completed)
}

pub async fn skip_exercise(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(exercise_id): Path<String>,
) -> Result<Json<MarkBody>, ApiFailure> {
    mark(&state, &headers, &exercise_id, ExerciseStatus::Skipped)
}

fn mark(
    state: &AppState,
    headers: &HeaderMap,
    raw_id: &str,
    status: ExerciseStatus,
) -> Result<Json<MarkBody>, ApiFailure> {
    let ctx = SessionContext::from_headers(headers)?;

    state.sessions.update(ctx.session_key(), |session| {
        let id = session
            .view
            .day
            .find_assignment(raw_id)
            .map(|assignment| assignment.id.clone())
            .unwrap_or_else(|| ResourceId::from(raw_id));

        let completed = status == ExerciseStatus::Completed;
        session.statuses = if completed {
            session.statuses.mark_completed(&id)?
        } else {
            session.statuses.mark_skipped(&id)?
        };

        // Focus hint: only completing an exercise moves the user along.
        let next_pending = if completed {
            session
                .statuses
                .next_pending_after(&session.view.day, &id)
                .map(|assignment| assignment.id.clone())
        } else {
            None
        };

        tracing::debug!(exercise_id = %id, ?status, "session.exercise_marked");

        Ok::<_, ApiFailure>(Json(MarkBody {
            id,
            status,
            progress: session.statuses.progress(),
            next_pending,
            can_finish: state.session_completer.can_finish(&session.statuses),
        }))
    })
}

/// Submit the session. On success the live session is discarded and the
/// caller is expected to move on to the dashboard.
pub async fn finish_session(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<FinishBody>, ApiFailure> {
    let ctx = SessionContext::from_headers(&headers)?;
    let key = ctx.session_key();

    let (_ticket, session) = state.sessions.begin_finish(key)?;
    let ack = state
        .session_completer
        .finish(&ctx, Some(&session), Utc::now())
        .await?;

    state.sessions.discard_if_current(key, session.generation);

    Ok(Json(FinishBody {
        message: "Workout completed successfully!",
        ack,
    }))
}
