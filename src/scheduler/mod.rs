//! Periodic background tasks.
//!
//! Username rotation and custom status refresh, each running in its own
//! loop independent of incoming messages.

mod runner;
mod state;

pub use runner::{PeriodicTask, SchedulerMessage, StatusRefresher, UsernameRotator, run_periodic};
pub use state::RotationState;
