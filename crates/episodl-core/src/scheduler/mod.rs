//! Episode scheduler.
//!
//! Drains a job's episode list through [`EpisodeUnit`]s in fixed-size batches.
//! A single semaphore bounds how many units execute at once for the whole run,
//! independent of batch boundaries; batches only decide how often results are
//! flushed to the job state.

mod progress;
mod run;
mod unit;

pub use progress::JobProgress;
pub(crate) use run::panic_message;
pub use run::{BoundedScheduler, SchedulerConfig, SchedulerError};
pub use unit::{EpisodeProcessor, EpisodeUnit};
