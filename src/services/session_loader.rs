use serde::Serialize;
use thiserror::Error;

use crate::clients::error::ApiError;
use crate::clients::fitness::FitnessClient;
use crate::clients::models::common::{ResourceId, WorkoutDay};
use crate::clients::models::responses::TodayWorkoutResponse;
use crate::context::SessionContext;

#[derive(Debug, Error)]
pub enum LoadError {
    /// No enrollment, or nothing scheduled today. Not a failure: the view
    /// should offer to browse programs.
    #[error("no active program: {0}")]
    NoActiveProgram(String),
    #[error(transparent)]
    Transport(#[from] ApiError),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EnrollmentContext {
    pub program_id: ResourceId,
    pub program_name: String,
    pub current_week: u32,
    pub current_day: u32,
}

/// Today's day and the enrollment it was scheduled from.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionView {
    pub day: WorkoutDay,
    pub enrollment: EnrollmentContext,
}

impl SessionView {
    pub fn from_today(response: TodayWorkoutResponse) -> Result<Self, LoadError> {
        let TodayWorkoutResponse {
            mut day,
            enrollment,
        } = response;

        if day.exercises.is_empty() {
            let reason = if day.is_rest_day {
                "rest day"
            } else {
                "no exercises scheduled for today"
            };
            return Err(LoadError::NoActiveProgram(reason.to_string()));
        }

        day.day_name = display_day_name(&day.day_name);

        let program_name = enrollment
            .program_name
            .or(enrollment.program.name)
            .unwrap_or_default();

        Ok(Self {
            day,
            enrollment: EnrollmentContext {
                program_id: enrollment.program.id,
                program_name,
                current_week: enrollment.current_week.max(1),
                current_day: enrollment.current_day.max(1),
            },
        })
    }
}

// "Monday - Workout 1" is shown as "Workout 1". Only the second segment is
// kept, so "Monday - Workout 1 - Heavy" is also "Workout 1".
fn display_day_name(raw: &str) -> String {
    match raw.split(" - ").nth(1).map(str::trim) {
        Some(segment) if !segment.is_empty() => segment.to_string(),
        _ => raw.trim().to_string(),
    }
}

#[derive(Clone)]
pub struct SessionLoader {
    client: FitnessClient,
}

impl SessionLoader {
    pub fn new(client: FitnessClient) -> Self {
        Self { client }
    }

    /// Fetch today's workout. Safe to call repeatedly; nothing is cached.
    pub async fn load_today(&self, ctx: &SessionContext) -> Result<SessionView, LoadError> {
        let response = match self.client.today_workout(ctx).await {
            Ok(response) => response,
            Err(ApiError::NotFound { message }) => {
                tracing::info!(reason = %message, "session.no_active_program");
                return Err(LoadError::NoActiveProgram(message));
            }
            Err(e) => return Err(LoadError::Transport(e)),
        };

        let view = SessionView::from_today(response)?;

        tracing::info!(
            day_id = %view.day.id,
            program_id = %view.enrollment.program_id,
            week = view.enrollment.current_week,
            day = view.enrollment.current_day,
            exercise_count = view.day.exercises.len(),
            "session.loaded"
        );

        Ok(view)
    }
}
