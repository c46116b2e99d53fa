use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::clients::error::ApiError;
use crate::clients::fitness::FitnessClient;
use crate::clients::models::requests::{ExerciseCompletion, SessionCompletionRecord};
use crate::clients::models::responses::CompletionAck;
use crate::context::SessionContext;
use crate::services::session_loader::SessionView;
use crate::services::status_tracker::{ExerciseStatus, StatusMap};
use crate::services::workout_session::WorkoutSession;

#[derive(Debug, Error)]
pub enum SubmitError {
    #[error("no active workout to complete")]
    NoActiveSession,
    #[error("complete at least one exercise to finish your workout")]
    NothingCompleted,
    #[error(transparent)]
    Transport(#[from] ApiError),
}

/// Whether a session with no completed exercise may be submitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FinishPolicy {
    RequireCompleted,
    AllowEmpty,
}

/// How the reported workout duration is obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DurationPolicy {
    /// Report a constant estimate regardless of elapsed time.
    Fixed(u32),
    /// Report whole minutes elapsed since the session was loaded, at least 1.
    Measured,
}

impl DurationPolicy {
    pub fn minutes(&self, started_at: DateTime<Utc>, now: DateTime<Utc>) -> u32 {
        match self {
            DurationPolicy::Fixed(minutes) => *minutes,
            DurationPolicy::Measured => {
                let elapsed = (now - started_at).num_minutes();
                u32::try_from(elapsed).unwrap_or(0).max(1)
            }
        }
    }
}

#[derive(Clone)]
pub struct SessionCompleter {
    client: FitnessClient,
    finish_policy: FinishPolicy,
    duration_policy: DurationPolicy,
}

impl SessionCompleter {
    pub fn new(
        client: FitnessClient,
        finish_policy: FinishPolicy,
        duration_policy: DurationPolicy,
    ) -> Self {
        Self {
            client,
            finish_policy,
            duration_policy,
        }
    }

    pub fn can_finish(&self, statuses: &StatusMap) -> bool {
        match self.finish_policy {
            FinishPolicy::RequireCompleted => statuses.count(ExerciseStatus::Completed) > 0,
            FinishPolicy::AllowEmpty => true,
        }
    }

    /// Sparse report of the exercises the user acted upon, in day order.
    /// Pending assignments are left out.
    pub fn build_record(
        view: &SessionView,
        statuses: &StatusMap,
        duration_minutes: u32,
    ) -> SessionCompletionRecord {
        let exercise_completions = view
            .day
            .exercises
            .iter()
            .filter_map(|assignment| match statuses.status(&assignment.id) {
                Some(ExerciseStatus::Completed) => Some(ExerciseCompletion {
                    exercise_id: assignment.exercise.id.clone(),
                    completed: true,
                }),
                Some(ExerciseStatus::Skipped) => Some(ExerciseCompletion {
                    exercise_id: assignment.exercise.id.clone(),
                    completed: false,
                }),
                Some(ExerciseStatus::Pending) | None => None,
            })
            .collect();

        SessionCompletionRecord {
            program: view.enrollment.program_id.clone(),
            day: view.day.id.clone(),
            duration_minutes,
            exercise_completions,
        }
    }

    /// Submit the session. Errors are returned as-is; nothing is retried.
    pub async fn finish(
        &self,
        ctx: &SessionContext,
        session: Option<&WorkoutSession>,
        now: DateTime<Utc>,
    ) -> Result<CompletionAck, SubmitError> {
        let session = session.ok_or(SubmitError::NoActiveSession)?;

        if !self.can_finish(&session.statuses) {
            tracing::info!(day_id = %session.view.day.id, "session.finish_rejected");
            return Err(SubmitError::NothingCompleted);
        }

        let duration_minutes = self.duration_policy.minutes(session.started_at, now);
        let record = Self::build_record(&session.view, &session.statuses, duration_minutes);

        let ack = self.client.complete_workout(ctx, &record).await?;

        tracing::info!(
            program_id = %record.program,
            day_id = %record.day,
            duration_minutes,
            reported = record.exercise_completions.len(),
            "session.finished"
        );

        Ok(ack)
    }
}
