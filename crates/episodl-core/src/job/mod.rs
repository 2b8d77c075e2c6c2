//! Jobs: per-title state, the shared registry, and the runner that drives a
//! job from submission to a terminal state.

mod registry;
mod runner;
pub mod snapshot;
mod state;

pub use registry::{JobRegistry, RegistryError};
pub use runner::{JobRunner, RunnerSettings};
pub use state::{JobId, JobState, JobStateError, JobStatus};
