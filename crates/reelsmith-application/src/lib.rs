//! Application layer for reelsmith.
//!
//! Coordinates the domain model, the stores and the remote client:
//! [`GenerationJob`] runs a batch, [`SessionManager`] owns session state,
//! [`OrchestratorState`] ties both together for a front end.

pub mod generation_job;
pub mod orchestrator;
pub mod session_manager;

#[cfg(test)]
mod testing;

pub use generation_job::{GenerationJob, GenerationJobConfig};
pub use orchestrator::{GenerateOptions, OrchestratorState};
pub use session_manager::SessionManager;
