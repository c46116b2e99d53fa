use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::clients::models::common::{ResourceId, WorkoutDay};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Tokens {
    pub access: String,
    pub refresh: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: ResourceId,
    pub email: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub role: Option<String>,
    // Profile details (age, goals, ...) are passed through untouched.
    #[serde(flatten)]
    pub details: Map<String, Value>,
}

// POST auth/login/
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginResponse {
    pub user: User,
    pub tokens: Tokens,
}

// POST auth/refresh/
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RefreshResponse {
    pub access: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProgramSummary {
    pub id: ResourceId,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub goal: Option<String>,
    #[serde(default)]
    pub difficulty: Option<String>,
    #[serde(default)]
    pub duration_weeks: Option<u32>,
    #[serde(default)]
    pub days_per_week: Option<u32>,
    #[serde(default)]
    pub enrollment_count: Option<u32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProgramDetail {
    #[serde(flatten)]
    pub summary: ProgramSummary,
    #[serde(default)]
    pub days: Vec<WorkoutDay>,
}

// GET programs/ is either a bare array or a paginated envelope.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum ProgramListResponse {
    Paginated { results: Vec<ProgramSummary> },
    Plain(Vec<ProgramSummary>),
}

impl ProgramListResponse {
    pub fn into_programs(self) -> Vec<ProgramSummary> {
        match self {
            ProgramListResponse::Paginated { results } => results,
            ProgramListResponse::Plain(programs) => programs,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProgramRef {
    pub id: ResourceId,
    #[serde(default)]
    pub name: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnrollmentResponse {
    #[serde(default)]
    pub id: Option<ResourceId>,
    pub program: ProgramRef,
    #[serde(default)]
    pub program_name: Option<String>,
    pub current_week: u32,
    pub current_day: u32,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub start_date: Option<String>,
}

// GET programs/today/
#[derive(Debug, Clone, Deserialize)]
pub struct TodayWorkoutResponse {
    pub day: WorkoutDay,
    pub enrollment: EnrollmentResponse,
}

// GET programs/current/
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurrentProgramResponse {
    pub enrollment: EnrollmentResponse,
    pub program: ProgramDetail,
}

/// Whatever the upstream returns after a workout is recorded.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CompletionAck {
    #[serde(default)]
    pub id: Option<ResourceId>,
    #[serde(default)]
    pub completed_at: Option<String>,
    #[serde(default)]
    pub duration_minutes: Option<u32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompletionEntry {
    pub exercise: ResourceId,
    #[serde(default)]
    pub exercise_name: Option<String>,
    pub completed: bool,
}

// GET progress/history/
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub id: ResourceId,
    #[serde(default)]
    pub program: Option<ResourceId>,
    #[serde(default)]
    pub program_name: Option<String>,
    #[serde(default)]
    pub day: Option<ResourceId>,
    #[serde(default)]
    pub day_name: Option<String>,
    pub completed_at: String,
    #[serde(default)]
    pub duration_minutes: Option<u32>,
    #[serde(default)]
    pub exercise_completions: Vec<CompletionEntry>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum HistoryListResponse {
    Paginated { results: Vec<HistoryEntry> },
    Plain(Vec<HistoryEntry>),
}

impl HistoryListResponse {
    pub fn into_entries(self) -> Vec<HistoryEntry> {
        match self {
            HistoryListResponse::Paginated { results } => results,
            HistoryListResponse::Plain(entries) => entries,
        }
    }
}

// GET progress/stats/
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserStats {
    pub total_workouts: u32,
    pub workouts_this_week: u32,
    pub workouts_this_month: u32,
    pub current_streak: u32,
    pub longest_streak: u32,
    pub total_duration_minutes: u32,
    pub avg_workout_duration: f64,
    pub completion_percentage: f64,
}

// GET progress/streak/
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Streak {
    pub current_streak: u32,
    pub longest_streak: u32,
    #[serde(default)]
    pub last_workout_date: Option<String>,
}

// GET progress/weekly/ (one entry per day, oldest first)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeeklyEntry {
    pub date: String,
    pub day_name: String,
    pub workouts_completed: u32,
    pub total_duration: u32,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ContactAck {
    #[serde(default)]
    pub id: Option<ResourceId>,
    #[serde(default)]
    pub message: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_program_list_accepts_both_shapes() {
        let plain: ProgramListResponse =
            serde_json::from_str(r#"[{"id": 1, "name": "Starter"}]"#).unwrap();
        let paginated: ProgramListResponse = serde_json::from_str(
            r#"{"count": 1, "next": null, "results": [{"id": 2, "name": "Strength"}]}"#,
        )
        .unwrap();

        assert_eq!(plain.into_programs()[0].name, "Starter");
        assert_eq!(paginated.into_programs()[0].id, ResourceId::Number(2));
    }

    #[test]
    fn test_user_keeps_profile_details() {
        let user: User = serde_json::from_str(
            r#"{"id": "u1", "email": "a@b.c", "name": "Ada", "role": "customer", "fitness_goal": "strength"}"#,
        )
        .unwrap();

        assert_eq!(user.role.as_deref(), Some("customer"));
        assert_eq!(user.details.get("fitness_goal").unwrap(), "strength");
    }
}
