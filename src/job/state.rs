// src/job/state.rs

//! Status and step-outcome types for the job state machine.
//!
//! "Normal completion" vs. "error" is deliberately a tagged outcome of a
//! step rather than an error type, so the retry/fatal routing in the
//! scheduler stays exhaustive.

use crate::errors::JobrunError;

/// Lifecycle status of a job.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobStatus {
    NotStarted,
    Started,
    Failed,
    Finished,
}

/// What a suspended computation reports after one resumption.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resumed {
    /// Suspended at the next yield point; more work remains.
    Yielded,
    /// The computation has run its course.
    Done,
}

/// Fatal per-job conditions.
///
/// These finalize the affected job in normal runs and abort the run loop in
/// atomic runs; they never trigger a retry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FatalKind {
    TimeLimitExceeded,
    MaxAttemptsExceeded,
}

impl FatalKind {
    /// Crate error carrying the affected job id, for atomic-mode escalation.
    pub fn into_error(self, job_id: &str) -> JobrunError {
        match self {
            FatalKind::TimeLimitExceeded => JobrunError::TimeLimitExceeded(job_id.to_string()),
            FatalKind::MaxAttemptsExceeded => JobrunError::MaxAttemptsExceeded(job_id.to_string()),
        }
    }
}

/// Outcome of stepping a job once, as routed by the scheduler.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepOutcome {
    /// The job took a non-terminal step (or skipped an ineligible turn) and
    /// should be requeued.
    Continued,
    /// Normal, expected end of the job's work.
    Completed,
    /// Terminal failure for this job only.
    Fatal(FatalKind),
}
