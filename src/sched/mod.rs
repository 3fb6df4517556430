// src/sched/mod.rs

//! Scheduling engine.
//!
//! - [`scheduler`] owns the three job registries (ready queue, waiting map,
//!   all-jobs map), dependency expansion, the round-robin run loop, and
//!   snapshot/restore.
//! - [`snapshot`] is the persisted engine state format.

pub mod scheduler;
pub mod snapshot;

pub use scheduler::{DEFAULT_POOL_SIZE, RunMode, RunOutcome, Scheduler};
pub use snapshot::Snapshot;
