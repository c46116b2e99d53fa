use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::clients::models::common::{ExerciseAssignment, ResourceId, WorkoutDay};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExerciseStatus {
    Pending,
    Completed,
    Skipped,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TrackerError {
    #[error("exercise {0} is not part of this session")]
    UnknownExerciseId(ResourceId),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Progress {
    pub completed: usize,
    pub total: usize,
    pub percentage: u8,
}

/// Status of every assignment in a loaded day, keyed by assignment id.
///
/// Every operation returns a new map; the key set fixed by [`StatusMap::initialize`]
/// never changes. Completed and skipped overwrite each other freely, but
/// nothing goes back to pending.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StatusMap {
    statuses: BTreeMap<ResourceId, ExerciseStatus>,
}

impl StatusMap {
    pub fn initialize(assignments: &[ExerciseAssignment]) -> Self {
        Self {
            statuses: assignments
                .iter()
                .map(|assignment| (assignment.id.clone(), ExerciseStatus::Pending))
                .collect(),
        }
    }

    pub fn mark_completed(&self, id: &ResourceId) -> Result<Self, TrackerError> {
        self.with_status(id, ExerciseStatus::Completed)
    }

    pub fn mark_skipped(&self, id: &ResourceId) -> Result<Self, TrackerError> {
        self.with_status(id, ExerciseStatus::Skipped)
    }

    fn with_status(&self, id: &ResourceId, status: ExerciseStatus) -> Result<Self, TrackerError> {
        if !self.statuses.contains_key(id) {
            return Err(TrackerError::UnknownExerciseId(id.clone()));
        }

        let mut next = self.clone();
        next.statuses.insert(id.clone(), status);
        Ok(next)
    }

    pub fn status(&self, id: &ResourceId) -> Option<ExerciseStatus> {
        self.statuses.get(id).copied()
    }

    pub fn len(&self) -> usize {
        self.statuses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.statuses.is_empty()
    }

    pub fn count(&self, status: ExerciseStatus) -> usize {
        self.statuses.values().filter(|s| **s == status).count()
    }

    pub fn progress(&self) -> Progress {
        if self.is_empty() {
            return Progress {
                completed: 0,
                total: 0,
                percentage: 0,
            };
        }

        let total = self.len();
        let completed = self.count(ExerciseStatus::Completed);
        Progress {
            completed,
            total,
            percentage: percentage(completed, total),
        }
    }

    /// The first still-pending assignment after `id` in day order.
    pub fn next_pending_after<'a>(
        &self,
        day: &'a WorkoutDay,
        id: &ResourceId,
    ) -> Option<&'a ExerciseAssignment> {
        let position = day.exercises.iter().position(|a| &a.id == id)?;
        day.exercises[position + 1..]
            .iter()
            .find(|a| self.status(&a.id) == Some(ExerciseStatus::Pending))
    }
}

// round(100 * completed / total), halves away from zero. `total` is non-zero.
fn percentage(completed: usize, total: usize) -> u8 {
    let rounded = (200 * completed + total) / (2 * total);
    rounded.min(100) as u8
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::clients::models::common::ExerciseDefinition;

    pub(crate) fn assignment(id: u64, exercise_id: u64) -> ExerciseAssignment {
        ExerciseAssignment {
            id: ResourceId::Number(id),
            sets: 3,
            reps: "10-12".to_string(),
            rest_time: 60,
            exercise: ExerciseDefinition {
                id: ResourceId::Number(exercise_id),
                name: format!("Exercise {}", exercise_id),
                description: String::new(),
                instructions: String::new(),
                media_url: None,
            },
            notes: String::new(),
        }
    }

    pub(crate) fn day_with(count: u64) -> WorkoutDay {
        WorkoutDay {
            id: ResourceId::Number(100),
            day_name: "Full Body".to_string(),
            is_rest_day: false,
            week_number: Some(1),
            day_number: Some(1),
            exercises: (1..=count).map(|i| assignment(i, i)).collect(),
        }
    }

    #[test]
    fn test_initialize_marks_everything_pending() {
        for count in [0, 1, 5] {
            let day = day_with(count);
            let statuses = StatusMap::initialize(&day.exercises);

            assert_eq!(statuses.len(), count as usize);
            assert_eq!(statuses.count(ExerciseStatus::Pending), count as usize);
            for assignment in &day.exercises {
                assert_eq!(statuses.status(&assignment.id), Some(ExerciseStatus::Pending));
            }
        }
    }

    #[test]
    fn test_progress_on_empty_day() {
        let statuses = StatusMap::initialize(&[]);
        assert_eq!(
            statuses.progress(),
            Progress {
                completed: 0,
                total: 0,
                percentage: 0
            }
        );
    }

    #[test]
    fn test_mixed_session_progress() {
        let day = day_with(3);
        let statuses = StatusMap::initialize(&day.exercises)
            .mark_completed(&ResourceId::Number(1))
            .unwrap()
            .mark_skipped(&ResourceId::Number(2))
            .unwrap();

        assert_eq!(
            statuses.progress(),
            Progress {
                completed: 1,
                total: 3,
                percentage: 33
            }
        );
        assert_eq!(statuses.status(&ResourceId::Number(3)), Some(ExerciseStatus::Pending));
    }

    #[test]
    fn test_mark_completed_increments_by_one() {
        let day = day_with(4);
        let before = StatusMap::initialize(&day.exercises);
        let after = before.mark_completed(&ResourceId::Number(2)).unwrap();

        assert_eq!(after.progress().completed, before.progress().completed + 1);
        assert_eq!(after.progress().total, before.progress().total);
        // the input map is untouched
        assert_eq!(before.status(&ResourceId::Number(2)), Some(ExerciseStatus::Pending));
    }

    #[test]
    fn test_unknown_id_is_rejected() {
        let day = day_with(2);
        let statuses = StatusMap::initialize(&day.exercises);

        assert_eq!(
            statuses.mark_completed(&ResourceId::Number(9)),
            Err(TrackerError::UnknownExerciseId(ResourceId::Number(9)))
        );
        assert_eq!(
            statuses.mark_skipped(&ResourceId::from("nope")),
            Err(TrackerError::UnknownExerciseId(ResourceId::from("nope")))
        );
    }

    #[test]
    fn test_completed_and_skipped_overwrite_each_other() {
        let day = day_with(1);
        let id = ResourceId::Number(1);
        let statuses = StatusMap::initialize(&day.exercises);

        let completed = statuses.mark_completed(&id).unwrap();
        let skipped = completed.mark_skipped(&id).unwrap();
        let again = skipped.mark_completed(&id).unwrap();
        let idempotent = again.mark_completed(&id).unwrap();

        assert_eq!(skipped.status(&id), Some(ExerciseStatus::Skipped));
        assert_eq!(again.status(&id), Some(ExerciseStatus::Completed));
        assert_eq!(idempotent, again);
        assert_eq!(idempotent.count(ExerciseStatus::Pending), 0);
    }

    #[test]
    fn test_all_skipped_has_zero_completed() {
        let day = day_with(3);
        let mut statuses = StatusMap::initialize(&day.exercises);
        for assignment in &day.exercises {
            statuses = statuses.mark_skipped(&assignment.id).unwrap();
        }

        let progress = statuses.progress();
        assert_eq!(progress.completed, 0);
        assert_eq!(progress.percentage, 0);
    }

    #[test]
    fn test_percentage_rounding_and_bounds() {
        assert_eq!(percentage(2, 3), 67);
        assert_eq!(percentage(1, 2), 50);
        assert_eq!(percentage(1, 8), 13);
        assert_eq!(percentage(7, 7), 100);

        for total in 1..=12 {
            for completed in 0..=total {
                assert!(percentage(completed, total) <= 100);
            }
        }
    }

    #[test]
    fn test_next_pending_skips_acted_upon_exercises() {
        let day = day_with(4);
        let statuses = StatusMap::initialize(&day.exercises)
            .mark_skipped(&ResourceId::Number(2))
            .unwrap()
            .mark_completed(&ResourceId::Number(1))
            .unwrap();

        let next = statuses.next_pending_after(&day, &ResourceId::Number(1));
        assert_eq!(next.map(|a| &a.id), Some(&ResourceId::Number(3)));

        let statuses = statuses
            .mark_completed(&ResourceId::Number(3))
            .unwrap()
            .mark_completed(&ResourceId::Number(4))
            .unwrap();
        assert!(statuses.next_pending_after(&day, &ResourceId::Number(4)).is_none());
        assert!(statuses.next_pending_after(&day, &ResourceId::Number(42)).is_none());
    }
}
