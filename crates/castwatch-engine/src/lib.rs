//! The castwatch polling engine.
//!
//! [`Engine`] runs one diff-and-notify cycle over every followed subject;
//! [`Scheduler`] repeats it on a fixed interval. Both are generic over the
//! seams defined in `castwatch-core`, so the engine never sees HTTP or SQL.

pub mod diff;
pub mod engine;
pub mod error;
pub mod scheduler;
pub mod sink;

pub use engine::{CycleReport, Engine, EngineConfig};
pub use error::{CycleError, SubjectError};
pub use scheduler::{Scheduler, SchedulerHandle, SchedulerJob};
pub use sink::LogSink;

#[cfg(test)]
mod tests;
