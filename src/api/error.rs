use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;

use crate::api::state::SlotError;
use crate::clients::error::ApiError;
use crate::context::ContextError;
use crate::services::session_completer::SubmitError;
use crate::services::session_loader::LoadError;
use crate::services::status_tracker::TrackerError;

/// Everything a handler can fail with, rendered as `{kind, message}`.
#[derive(Debug)]
pub enum ApiFailure {
    Context(ContextError),
    Upstream(ApiError),
    Load(LoadError),
    Submit(SubmitError),
    Tracker(TrackerError),
    NoActiveSession,
    InFlight(&'static str),
}

#[derive(Serialize)]
struct ErrorBody {
    kind: &'static str,
    message: String,
}

impl From<ContextError> for ApiFailure {
    fn from(e: ContextError) -> Self {
        ApiFailure::Context(e)
    }
}

impl From<ApiError> for ApiFailure {
    fn from(e: ApiError) -> Self {
        ApiFailure::Upstream(e)
    }
}

impl From<LoadError> for ApiFailure {
    fn from(e: LoadError) -> Self {
        ApiFailure::Load(e)
    }
}

impl From<SubmitError> for ApiFailure {
    fn from(e: SubmitError) -> Self {
        ApiFailure::Submit(e)
    }
}

impl From<SlotError> for ApiFailure {
    fn from(e: SlotError) -> Self {
        match e {
            SlotError::NoSession => ApiFailure::NoActiveSession,
            SlotError::Finishing => ApiFailure::InFlight("finishing the workout"),
        }
    }
}

impl From<TrackerError> for ApiFailure {
    fn from(e: TrackerError) -> Self {
        ApiFailure::Tracker(e)
    }
}

impl ApiFailure {
    fn status_and_kind(&self) -> (StatusCode, &'static str) {
        match self {
            ApiFailure::Context(_) => (StatusCode::UNAUTHORIZED, "unauthorized"),
            ApiFailure::Upstream(e) => upstream_status(e),
            ApiFailure::Load(LoadError::NoActiveProgram(_)) => {
                (StatusCode::NOT_FOUND, "no_active_program")
            }
            ApiFailure::Load(LoadError::Transport(e)) => upstream_status(e),
            ApiFailure::Submit(SubmitError::NoActiveSession) | ApiFailure::NoActiveSession => {
                (StatusCode::NOT_FOUND, "no_active_session")
            }
            ApiFailure::Submit(SubmitError::NothingCompleted) => {
                (StatusCode::UNPROCESSABLE_ENTITY, "nothing_completed")
            }
            ApiFailure::Submit(SubmitError::Transport(e)) => upstream_status(e),
            ApiFailure::Tracker(TrackerError::UnknownExerciseId(_)) => {
                (StatusCode::NOT_FOUND, "unknown_exercise")
            }
            ApiFailure::InFlight(_) => (StatusCode::CONFLICT, "in_flight"),
        }
    }

    fn message(&self) -> String {
        match self {
            ApiFailure::Context(e) => e.to_string(),
            ApiFailure::Upstream(e) => upstream_message(e),
            ApiFailure::Load(LoadError::NoActiveProgram(reason)) => format!(
                "No workout found for today ({}). Browse programs to enroll.",
                reason
            ),
            ApiFailure::Load(LoadError::Transport(e)) => upstream_message(e),
            ApiFailure::Submit(SubmitError::Transport(e)) => upstream_message(e),
            ApiFailure::Submit(e) => e.to_string(),
            ApiFailure::Tracker(e) => e.to_string(),
            ApiFailure::NoActiveSession => SubmitError::NoActiveSession.to_string(),
            ApiFailure::InFlight(operation) => format!("{} is already in progress", operation),
        }
    }
}

// Client errors from upstream pass through with their status; everything
// else is a gateway failure the user may retry.
fn upstream_status(error: &ApiError) -> (StatusCode, &'static str) {
    match error {
        ApiError::NotFound { .. } => (StatusCode::NOT_FOUND, "not_found"),
        ApiError::Unauthorized => (StatusCode::UNAUTHORIZED, "unauthorized"),
        ApiError::Forbidden { .. } => (StatusCode::FORBIDDEN, "forbidden"),
        ApiError::Status { status, .. } if (400..500).contains(status) => (
            StatusCode::from_u16(*status).unwrap_or(StatusCode::BAD_REQUEST),
            "rejected",
        ),
        e if e.is_timeout() => (StatusCode::GATEWAY_TIMEOUT, "transport_error"),
        _ => (StatusCode::BAD_GATEWAY, "transport_error"),
    }
}

fn upstream_message(error: &ApiError) -> String {
    match error {
        ApiError::Status { status, body } if (400..500).contains(status) => body.clone(),
        ApiError::NotFound { message } => message.clone(),
        ApiError::Unauthorized => "Your session has expired. Please log in again.".to_string(),
        ApiError::Forbidden { message } => message.clone(),
        _ => "The fitness service is unavailable. Please try again.".to_string(),
    }
}

impl IntoResponse for ApiFailure {
    fn into_response(self) -> Response {
        let (status, kind) = self.status_and_kind();
        let message = self.message();

        if status.is_server_error() {
            tracing::error!(%status, kind, error = ?self, "request.failed");
        } else {
            tracing::debug!(%status, kind, "request.rejected");
        }

        (status, Json(ErrorBody { kind, message })).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clients::models::common::ResourceId;

    #[test]
    fn test_status_mapping() {
        let cases = [
            (
                ApiFailure::Load(LoadError::NoActiveProgram("rest day".into())),
                StatusCode::NOT_FOUND,
                "no_active_program",
            ),
            (
                ApiFailure::Load(LoadError::Transport(ApiError::Status {
                    status: 500,
                    body: String::new(),
                })),
                StatusCode::BAD_GATEWAY,
                "transport_error",
            ),
            (
                ApiFailure::Submit(SubmitError::NothingCompleted),
                StatusCode::UNPROCESSABLE_ENTITY,
                "nothing_completed",
            ),
            (
                ApiFailure::Submit(SubmitError::Transport(ApiError::Status {
                    status: 400,
                    body: "{}".into(),
                })),
                StatusCode::BAD_REQUEST,
                "rejected",
            ),
            (
                ApiFailure::Tracker(TrackerError::UnknownExerciseId(ResourceId::Number(3))),
                StatusCode::NOT_FOUND,
                "unknown_exercise",
            ),
            (
                ApiFailure::Context(ContextError::MissingAuthorization),
                StatusCode::UNAUTHORIZED,
                "unauthorized",
            ),
            (
                ApiFailure::InFlight("finish"),
                StatusCode::CONFLICT,
                "in_flight",
            ),
            (
                ApiFailure::from(SlotError::Finishing),
                StatusCode::CONFLICT,
                "in_flight",
            ),
            (
                ApiFailure::from(SlotError::NoSession),
                StatusCode::NOT_FOUND,
                "no_active_session",
            ),
            (
                ApiFailure::Upstream(ApiError::Forbidden {
                    message: "Account disabled".into(),
                }),
                StatusCode::FORBIDDEN,
                "forbidden",
            ),
        ];

        for (failure, status, kind) in cases {
            assert_eq!(failure.status_and_kind(), (status, kind), "{:?}", failure);
        }
    }

    #[test]
    fn test_rejected_submission_surfaces_upstream_body() {
        let failure = ApiFailure::Submit(SubmitError::Transport(ApiError::Status {
            status: 400,
            body: r#"{"day": ["Invalid pk"]}"#.into(),
        }));
        assert_eq!(failure.message(), r#"{"day": ["Invalid pk"]}"#);
    }

    #[test]
    fn test_forbidden_is_not_reported_as_expired_session() {
        let failure = ApiFailure::Upstream(ApiError::from_status(
            403,
            r#"{"detail": "User account is disabled."}"#.into(),
        ));
        assert_eq!(
            failure.status_and_kind(),
            (StatusCode::FORBIDDEN, "forbidden")
        );
        assert_eq!(failure.message(), "User account is disabled.");
    }
}
