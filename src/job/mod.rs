// src/job/mod.rs

//! Resumable job state machine.
//!
//! - [`state`] holds the status and step-outcome enums.
//! - [`resumable`] defines the capability traits concrete behaviors implement.
//! - [`record`] is the serialized form used by snapshots and the registry.
//! - [`start_at`] parses earliest-start instants.

pub mod record;
pub mod resumable;
pub mod start_at;
pub mod state;

pub use record::JobRecord;
pub use resumable::{JobBehavior, Resumable, StepCtx};
pub use start_at::StartAt;
pub use state::{FatalKind, JobStatus, Resumed, StepOutcome};

use std::fmt;
use std::time::{Duration, Instant};

use chrono::Local;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::errors::Result;

/// Construction-time knobs for a [`Job`]. Everything is optional except the
/// behavior itself; a missing `job_id` gets a generated unique token.
#[derive(Default)]
pub struct JobOptions {
    pub job_id: Option<String>,
    pub parent_id: Option<String>,
    pub start_at: Option<String>,
    /// Cumulative execution-time budget in seconds; `<= 0` means unlimited.
    pub max_working_time: f64,
    /// Tolerated failures before the job is abandoned; `0` means no retry.
    pub max_retries: u32,
    pub tries: u32,
    pub target: Option<Box<Job>>,
    pub depends_on: Vec<Job>,
}

/// A resumable unit of work with identity, timing, and retry state.
///
/// The job owns its dependency subtree until the scheduler drains it at
/// registration, its optional downstream `target` (a push consumer, not a
/// dependency), and, once started, the live suspended computation. It is
/// mutated only through [`Job::run`] and scheduler bookkeeping.
pub struct Job {
    job_id: String,
    parent_id: Option<String>,
    start_at: Option<StartAt>,
    max_working_time: f64,
    max_retries: u32,
    tries: u32,
    running_time: Duration,
    status: JobStatus,
    target: Option<Box<Job>>,
    depends_on: Vec<Job>,
    behavior: Box<dyn JobBehavior>,
    handle: Option<Box<dyn Resumable>>,
}

impl fmt::Debug for Job {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Job")
            .field("job_id", &self.job_id)
            .field("kind", &self.behavior.kind())
            .field("status", &self.status)
            .field("tries", &self.tries)
            .finish_non_exhaustive()
    }
}

impl Job {
    /// Build a job around a behavior. Fails if `start_at` is unparseable.
    pub fn new(behavior: Box<dyn JobBehavior>, options: JobOptions) -> Result<Self> {
        let start_at = options.start_at.as_deref().map(StartAt::parse).transpose()?;

        Ok(Self {
            job_id: options
                .job_id
                .unwrap_or_else(|| Uuid::new_v4().to_string()),
            parent_id: options.parent_id,
            start_at,
            max_working_time: options.max_working_time,
            max_retries: options.max_retries,
            tries: options.tries,
            running_time: Duration::ZERO,
            status: JobStatus::NotStarted,
            target: options.target,
            depends_on: options.depends_on,
            behavior,
            handle: None,
        })
    }

    pub fn job_id(&self) -> &str {
        &self.job_id
    }

    pub fn kind(&self) -> &'static str {
        self.behavior.kind()
    }

    pub fn parent_id(&self) -> Option<&str> {
        self.parent_id.as_deref()
    }

    pub fn status(&self) -> JobStatus {
        self.status
    }

    pub fn tries(&self) -> u32 {
        self.tries
    }

    pub fn max_retries(&self) -> u32 {
        self.max_retries
    }

    pub fn max_working_time(&self) -> f64 {
        self.max_working_time
    }

    /// Wall-clock time spent inside step execution so far.
    pub fn running_time(&self) -> Duration {
        self.running_time
    }

    pub fn has_dependencies(&self) -> bool {
        !self.depends_on.is_empty()
    }

    pub(crate) fn set_parent_id(&mut self, parent_id: String) {
        self.parent_id = Some(parent_id);
    }

    pub(crate) fn take_dependencies(&mut self) -> Vec<Job> {
        std::mem::take(&mut self.depends_on)
    }

    /// Whether the job may be stepped now.
    ///
    /// On the first eligible call this lazily creates the suspended
    /// computation and transitions to `Started`.
    fn is_ready_to_start(&mut self) -> bool {
        match self.status {
            JobStatus::Started => true,
            JobStatus::Finished | JobStatus::Failed => false,
            JobStatus::NotStarted => {
                if let Some(at) = &self.start_at {
                    if !at.is_due(Local::now().naive_local()) {
                        return false;
                    }
                }
                self.handle = Some(self.behavior.underlying());
                self.status = JobStatus::Started;
                true
            }
        }
    }

    fn has_exceeded_time_limit(&self) -> bool {
        self.max_working_time > 0.0 && self.running_time.as_secs_f64() >= self.max_working_time
    }

    /// Step the job once, feeding `input` to the suspended computation.
    ///
    /// The routing is:
    /// - time limit already exceeded → `Fatal`, regardless of retry budget
    /// - not yet eligible to start → `Continued` with no observable effect
    /// - computation yields → `Continued`
    /// - computation done → `Completed`
    /// - computation faults → absorbed while `tries` stays below
    ///   `max_retries` (or treated as completion when no retries are
    ///   configured at all), `Fatal` once the budget is spent
    ///
    /// Only the resumption itself is timed; skipped turns cost nothing.
    pub fn run(&mut self, input: Option<String>) -> StepOutcome {
        debug!(job_id = %self.job_id, kind = self.kind(), "trying to run job");

        if self.has_exceeded_time_limit() {
            warn!(
                job_id = %self.job_id,
                running_time = ?self.running_time,
                max_working_time = self.max_working_time,
                "time limit has exceeded"
            );
            self.status = JobStatus::Failed;
            return StepOutcome::Fatal(FatalKind::TimeLimitExceeded);
        }

        if !self.is_ready_to_start() {
            return StepOutcome::Continued;
        }

        let started = Instant::now();
        let resumed = match self.handle.as_mut() {
            Some(handle) => {
                let ctx = StepCtx::new(input, self.target.as_deref_mut());
                handle.resume(ctx)
            }
            // Unreachable once `is_ready_to_start` returned true; count it
            // as a skipped turn.
            None => return StepOutcome::Continued,
        };
        self.running_time += started.elapsed();

        match resumed {
            Ok(Resumed::Yielded) => StepOutcome::Continued,
            Ok(Resumed::Done) => {
                info!(job_id = %self.job_id, "job has run its course");
                StepOutcome::Completed
            }
            Err(err) => {
                if self.max_retries == 0 {
                    error!(
                        job_id = %self.job_id,
                        error = %err,
                        "job step failed with no retry budget; treating as completion"
                    );
                    return StepOutcome::Completed;
                }

                self.tries += 1;
                error!(
                    job_id = %self.job_id,
                    tries = self.tries,
                    max_retries = self.max_retries,
                    error = %err,
                    "job step failed"
                );

                if self.tries >= self.max_retries {
                    warn!(job_id = %self.job_id, "job reached maximum number of attempts");
                    self.status = JobStatus::Failed;
                    StepOutcome::Fatal(FatalKind::MaxAttemptsExceeded)
                } else {
                    StepOutcome::Continued
                }
            }
        }
    }

    /// Transition `Started → Finished` and release the suspended
    /// computation. Dropping the handle runs the behavior's cleanup on
    /// every exit path.
    pub fn stop(&mut self) {
        if self.status == JobStatus::Started {
            self.status = JobStatus::Finished;
        }
        self.handle = None;
    }

    /// Serialize every durable field, recursing into `target` and
    /// `depends_on`. `status`, `running_time`, and the handle are transient
    /// and omitted.
    pub fn to_record(&self) -> JobRecord {
        JobRecord {
            job_id: self.job_id.clone(),
            parent_id: self.parent_id.clone(),
            start_at: self.start_at.as_ref().map(|at| at.raw().to_string()),
            max_working_time: self.max_working_time,
            max_retries: self.max_retries,
            tries: self.tries,
            target: self.target.as_ref().map(|t| Box::new(t.to_record())),
            depends_on: self.depends_on.iter().map(Job::to_record).collect(),
            class_name: self.behavior.kind().to_string(),
            params: self.behavior.params(),
        }
    }
}
