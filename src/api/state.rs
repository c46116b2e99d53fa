use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use thiserror::Error;

use crate::clients::fitness::FitnessClient;
use crate::config::Config;
use crate::services::in_flight::{InFlight, OperationGate};
use crate::services::session_completer::SessionCompleter;
use crate::services::session_loader::SessionLoader;
use crate::services::workout_session::WorkoutSession;

#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub fitness_client: FitnessClient,
    pub session_loader: SessionLoader,
    pub session_completer: SessionCompleter,
    pub sessions: SessionStore,
}

impl AppState {
    pub fn new(config: Config) -> anyhow::Result<Self> {
        let fitness_client = FitnessClient::new(&config)?;
        let session_loader = SessionLoader::new(fitness_client.clone());
        let session_completer = SessionCompleter::new(
            fitness_client.clone(),
            config.finish_policy,
            config.duration_policy,
        );

        Ok(Self {
            config,
            fitness_client,
            session_loader,
            session_completer,
            sessions: SessionStore::default(),
        })
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SlotError {
    #[error("no active workout session")]
    NoSession,
    #[error("the workout is being finished")]
    Finishing,
}

#[derive(Default)]
struct SessionSlot {
    session: Option<WorkoutSession>,
    load: OperationGate,
    finish: OperationGate,
}

impl SessionSlot {
    fn is_idle(&self) -> bool {
        self.session.is_none() && !self.load.is_in_flight() && !self.finish.is_in_flight()
    }
}

/// Live workout sessions, one per signed-in caller.
///
/// A slot exists only while a load is running or a session is live. Reads and
/// marks never create one.
#[derive(Clone, Default)]
pub struct SessionStore {
    slots: Arc<Mutex<HashMap<String, SessionSlot>>>,
    generations: Arc<AtomicU64>,
}

impl SessionStore {
    fn lock(&self) -> MutexGuard<'_, HashMap<String, SessionSlot>> {
        self.slots.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Start loading a session for `key`, or `None` if a load is already running.
    pub fn begin_load(&self, key: &str) -> Option<InFlight> {
        self.lock().entry(key.to_string()).or_default().load.try_begin()
    }

    /// Drop the slot for `key` if nothing is live or running in it.
    pub fn release_if_idle(&self, key: &str) {
        let mut slots = self.lock();
        if slots.get(key).is_some_and(SessionSlot::is_idle) {
            slots.remove(key);
        }
    }

    pub fn next_generation(&self) -> u64 {
        self.generations.fetch_add(1, Ordering::Relaxed) + 1
    }

    pub fn replace(&self, key: &str, session: WorkoutSession) {
        self.lock().entry(key.to_string()).or_default().session = Some(session);
    }

    pub fn snapshot(&self, key: &str) -> Option<WorkoutSession> {
        self.lock().get(key).and_then(|slot| slot.session.clone())
    }

    /// Apply `update` to the live session. Refused while a finish is running,
    /// checked under the same lock as the update itself.
    pub fn update<T, E>(
        &self,
        key: &str,
        update: impl FnOnce(&mut WorkoutSession) -> Result<T, E>,
    ) -> Result<T, E>
    where
        E: From<SlotError>,
    {
        let mut slots = self.lock();
        let slot = slots.get_mut(key).ok_or(SlotError::NoSession)?;
        if slot.finish.is_in_flight() {
            return Err(SlotError::Finishing.into());
        }
        let session = slot.session.as_mut().ok_or(SlotError::NoSession)?;
        update(session)
    }

    /// Take the finish ticket and the session it will submit in one step, so
    /// no mark can land between the two.
    pub fn begin_finish(&self, key: &str) -> Result<(InFlight, WorkoutSession), SlotError> {
        let slots = self.lock();
        let slot = slots.get(key).ok_or(SlotError::NoSession)?;
        let ticket = slot.finish.try_begin().ok_or(SlotError::Finishing)?;
        let session = slot.session.clone().ok_or(SlotError::NoSession)?;
        Ok((ticket, session))
    }

    /// Drop the slot only if its session is still the one that was submitted.
    pub fn discard_if_current(&self, key: &str, generation: u64) -> bool {
        let mut slots = self.lock();
        let current = slots
            .get(key)
            .and_then(|slot| slot.session.as_ref())
            .is_some_and(|session| session.generation == generation);

        if current {
            slots.remove(key);
        }
        current
    }

    /// Carry the live session over to a refreshed access token.
    pub fn rekey(&self, old_key: &str, new_key: &str) -> bool {
        if old_key == new_key {
            return false;
        }

        let mut slots = self.lock();
        match slots.remove(old_key) {
            Some(slot) => {
                slots.insert(new_key.to_string(), slot);
                true
            }
            None => false,
        }
    }

    /// Forget everything held for this caller (logout).
    pub fn remove(&self, key: &str) -> bool {
        self.lock().remove(key).is_some()
    }

    #[cfg(test)]
    pub fn slot_count(&self) -> usize {
        self.lock().len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clients::models::common::ResourceId;
    use crate::services::session_loader::{EnrollmentContext, SessionView};
    use crate::services::status_tracker::tests::day_with;
    use crate::services::status_tracker::{Progress, TrackerError};
    use chrono::Utc;

    #[derive(Debug, PartialEq)]
    enum TestError {
        Slot(SlotError),
        Tracker(TrackerError),
    }

    impl From<SlotError> for TestError {
        fn from(e: SlotError) -> Self {
            TestError::Slot(e)
        }
    }

    impl From<TrackerError> for TestError {
        fn from(e: TrackerError) -> Self {
            TestError::Tracker(e)
        }
    }

    fn session(store: &SessionStore) -> WorkoutSession {
        let view = SessionView {
            day: day_with(2),
            enrollment: EnrollmentContext {
                program_id: ResourceId::from("p"),
                program_name: "P".into(),
                current_week: 1,
                current_day: 1,
            },
        };
        WorkoutSession::start(store.next_generation(), view, Utc::now())
    }

    fn complete(store: &SessionStore, key: &str, id: u64) -> Result<Progress, TestError> {
        store.update(key, |s| {
            s.statuses = s.statuses.mark_completed(&ResourceId::Number(id))?;
            Ok::<_, TestError>(s.statuses.progress())
        })
    }

    #[test]
    fn test_sessions_are_isolated_per_caller() {
        let store = SessionStore::default();
        store.replace("alice", session(&store));

        assert!(store.snapshot("alice").is_some());
        assert!(store.snapshot("bob").is_none());
    }

    #[test]
    fn test_update_mutates_live_session() {
        let store = SessionStore::default();
        store.replace("alice", session(&store));

        assert_eq!(complete(&store, "alice", 1).unwrap().completed, 1);
        assert_eq!(
            complete(&store, "bob", 1),
            Err(TestError::Slot(SlotError::NoSession))
        );
    }

    #[test]
    fn test_reads_and_marks_do_not_create_slots() {
        let store = SessionStore::default();

        for i in 0..100 {
            let key = format!("junk-{}", i);
            assert!(complete(&store, &key, 1).is_err());
            assert!(store.snapshot(&key).is_none());
            assert!(store.begin_finish(&key).is_err());
        }
        assert_eq!(store.slot_count(), 0);
    }

    #[test]
    fn test_failed_load_leaves_no_slot() {
        let store = SessionStore::default();

        let ticket = store.begin_load("alice").unwrap();
        assert!(store.begin_load("alice").is_none());
        store.release_if_idle("alice");
        assert_eq!(store.slot_count(), 1);

        drop(ticket);
        store.release_if_idle("alice");
        assert_eq!(store.slot_count(), 0);
    }

    #[test]
    fn test_mark_during_finish_is_refused_and_not_lost() {
        let store = SessionStore::default();
        store.replace("alice", session(&store));
        complete(&store, "alice", 1).unwrap();

        let (ticket, submitted) = store.begin_finish("alice").unwrap();

        assert_eq!(
            complete(&store, "alice", 2),
            Err(TestError::Slot(SlotError::Finishing))
        );
        assert_eq!(
            store.begin_finish("alice").map(|_| ()),
            Err(SlotError::Finishing)
        );
        assert_eq!(submitted.statuses.progress().completed, 1);

        assert!(store.discard_if_current("alice", submitted.generation));
        drop(ticket);
        assert_eq!(store.slot_count(), 0);
    }

    #[test]
    fn test_failed_finish_keeps_session_markable() {
        let store = SessionStore::default();
        store.replace("alice", session(&store));

        let (ticket, _) = store.begin_finish("alice").unwrap();
        drop(ticket);

        assert_eq!(complete(&store, "alice", 2).unwrap().completed, 1);
    }

    #[test]
    fn test_discard_ignores_replaced_session() {
        let store = SessionStore::default();
        let first = session(&store);
        let first_generation = first.generation;
        store.replace("alice", first);

        let second = session(&store);
        let second_generation = second.generation;
        store.replace("alice", second);

        assert!(!store.discard_if_current("alice", first_generation));
        assert!(store.snapshot("alice").is_some());
        assert!(store.discard_if_current("alice", second_generation));
        assert!(store.snapshot("alice").is_none());
        assert_eq!(store.slot_count(), 0);
    }

    #[test]
    fn test_rekey_keeps_marks() {
        let store = SessionStore::default();
        store.replace("old-token", session(&store));
        complete(&store, "old-token", 1).unwrap();

        assert!(store.rekey("old-token", "new-token"));
        assert!(store.snapshot("old-token").is_none());

        let moved = store.snapshot("new-token").unwrap();
        assert_eq!(moved.statuses.progress().completed, 1);
        assert!(!store.rekey("missing", "other"));
        assert!(!store.rekey("new-token", "new-token"));
    }

    #[test]
    fn test_load_gates_are_per_caller() {
        let store = SessionStore::default();
        let _ticket = store.begin_load("alice").unwrap();

        assert!(store.begin_load("alice").is_none());
        assert!(store.begin_load("bob").is_some());
    }
}
