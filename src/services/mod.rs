pub mod in_flight;
pub mod prescription;
pub mod session_completer;
pub mod session_loader;
pub mod status_tracker;
pub mod workout_session;
