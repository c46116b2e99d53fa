use serde::{Deserialize, Serialize};

use crate::clients::models::common::ResourceId;

#[derive(Debug, Serialize)]
pub struct LoginRequest<'a> {
    pub email: &'a str,
    pub password: &'a str,
}

#[derive(Debug, Serialize)]
pub struct RefreshRequest<'a> {
    pub refresh: &'a str,
}

/// One explicitly acted-upon exercise in a completion report.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExerciseCompletion {
    pub exercise_id: ResourceId,
    pub completed: bool,
}

// Body of POST progress/complete-workout/
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionCompletionRecord {
    pub program: ResourceId,
    pub day: ResourceId,
    pub duration_minutes: u32,
    pub exercise_completions: Vec<ExerciseCompletion>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContactRequest {
    pub name: String,
    pub email: String,
    pub subject: String,
    pub message: String,
}
