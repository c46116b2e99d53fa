use chrono::{DateTime, Utc};

use crate::services::session_loader::SessionView;
use crate::services::status_tracker::StatusMap;

/// A loaded day being worked through. Discarded after a successful finish
/// or when a fresh load replaces it.
#[derive(Debug, Clone, PartialEq)]
pub struct WorkoutSession {
    pub generation: u64,
    pub view: SessionView,
    pub statuses: StatusMap,
    pub started_at: DateTime<Utc>,
}

impl WorkoutSession {
    pub fn start(generation: u64, view: SessionView, started_at: DateTime<Utc>) -> Self {
        let statuses = StatusMap::initialize(&view.day.exercises);
        Self {
            generation,
            view,
            statuses,
            started_at,
        }
    }
}
