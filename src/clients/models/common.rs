use std::fmt;

use serde::{Deserialize, Serialize};

/// Upstream primary key. The API hands out UUID strings, but numeric keys are
/// accepted and echoed back unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ResourceId {
    Number(u64),
    Text(String),
}

impl ResourceId {
    /// Match a raw path segment against this id.
    pub fn matches(&self, raw: &str) -> bool {
        match self {
            ResourceId::Number(n) => raw.parse::<u64>().is_ok_and(|parsed| parsed == *n),
            ResourceId::Text(text) => text == raw,
        }
    }
}

impl fmt::Display for ResourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResourceId::Number(n) => write!(f, "{}", n),
            ResourceId::Text(text) => f.write_str(text),
        }
    }
}

impl From<&str> for ResourceId {
    fn from(value: &str) -> Self {
        ResourceId::Text(value.to_string())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExerciseDefinition {
    pub id: ResourceId,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub instructions: String,
    #[serde(default)]
    pub media_url: Option<String>,
}

/// An exercise scheduled on a specific day with its prescription.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExerciseAssignment {
    pub id: ResourceId,
    pub sets: u32,
    pub reps: String, // free-form: "10-12", "8", "AMRAP"
    pub rest_time: u32,
    pub exercise: ExerciseDefinition,
    #[serde(default)]
    pub notes: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkoutDay {
    pub id: ResourceId,
    pub day_name: String,
    #[serde(default)]
    pub is_rest_day: bool,
    #[serde(default)]
    pub week_number: Option<u32>,
    #[serde(default)]
    pub day_number: Option<u32>,
    #[serde(default)]
    pub exercises: Vec<ExerciseAssignment>,
}

impl WorkoutDay {
    pub fn find_assignment(&self, raw_id: &str) -> Option<&ExerciseAssignment> {
        self.exercises
            .iter()
            .find(|assignment| assignment.id.matches(raw_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resource_id_accepts_numbers_and_strings() {
        let ids: Vec<ResourceId> =
            serde_json::from_str(r#"[7, "9b2f0c1e-4d7a-4a53-8a3e-2b1f3c4d5e6f"]"#).unwrap();

        assert_eq!(ids[0], ResourceId::Number(7));
        assert_eq!(
            ids[1],
            ResourceId::Text("9b2f0c1e-4d7a-4a53-8a3e-2b1f3c4d5e6f".to_string())
        );
        assert_eq!(serde_json::to_string(&ids[0]).unwrap(), "7");
    }

    #[test]
    fn test_resource_id_matches_path_segment() {
        assert!(ResourceId::Number(12).matches("12"));
        assert!(!ResourceId::Number(12).matches("012x"));
        assert!(ResourceId::from("abc").matches("abc"));
        assert!(!ResourceId::from("abc").matches("abd"));
    }

    #[test]
    fn test_day_defaults_missing_fields() {
        let day: WorkoutDay =
            serde_json::from_str(r#"{"id": 3, "day_name": "Upper Body"}"#).unwrap();

        assert!(!day.is_rest_day);
        assert!(day.exercises.is_empty());
        assert_eq!(day.week_number, None);
    }
}
