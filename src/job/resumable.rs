// src/job/resumable.rs

//! Capability traits implemented by concrete job behaviors.
//!
//! The engine only ever sees these seams: a [`JobBehavior`] describes a
//! behavior (type tag, parameters, how to start it) and a [`Resumable`] is
//! one live suspended computation. Production behaviors live in
//! `crate::jobs`; tests plug in their own implementations.

use anyhow::bail;
use serde_json::{Map, Value};

use super::state::{Resumed, StepOutcome};
use super::Job;

/// A suspended computation, resumed one step at a time by the scheduler.
///
/// Releasing the handle is dropping it: implementations keep any acquired
/// resources (open files etc.) inside the value so `Drop` releases them on
/// every exit path, whether the job completed, timed out, or exhausted its
/// retries.
pub trait Resumable: Send {
    /// Advance the computation to its next suspension point.
    ///
    /// A returned error is a step fault; the owning job's retry budget
    /// decides whether it is transient or terminal.
    fn resume(&mut self, ctx: StepCtx<'_>) -> anyhow::Result<Resumed>;
}

/// A concrete job behavior: a type tag, serializable parameters, and a way
/// to create the suspended computation.
///
/// The tag and parameters are what snapshots persist; the registry maps the
/// tag back to a constructor on restore.
pub trait JobBehavior: Send {
    /// Type tag recorded in snapshots and resolved by the registry.
    fn kind(&self) -> &'static str;

    /// Behavior-specific parameters persisted alongside the common fields.
    fn params(&self) -> Map<String, Value> {
        Map::new()
    }

    /// Create the suspended computation for one lifetime of this job.
    ///
    /// Must not perform observable side effects; the first unit of work
    /// happens on the first resumption, after the time-limit check.
    fn underlying(&self) -> Box<dyn Resumable>;
}

/// Per-step context handed to a resumable computation: the value pushed by
/// an upstream job (if any) and access to this job's downstream target.
pub struct StepCtx<'a> {
    input: Option<String>,
    target: Option<&'a mut Job>,
}

impl<'a> StepCtx<'a> {
    pub(crate) fn new(input: Option<String>, target: Option<&'a mut Job>) -> Self {
        Self { input, target }
    }

    pub fn input(&self) -> Option<&str> {
        self.input.as_deref()
    }

    /// Take ownership of the pushed input value.
    pub fn take_input(&mut self) -> Option<String> {
        self.input.take()
    }

    pub fn has_target(&self) -> bool {
        self.target.is_some()
    }

    /// Step the downstream target once with the given value.
    ///
    /// A target that completes or fails while data is still streaming is
    /// surfaced as an ordinary step fault of the pushing job.
    pub fn push_to_target(&mut self, value: &str) -> anyhow::Result<()> {
        let Some(target) = self.target.as_deref_mut() else {
            return Ok(());
        };
        match target.run(Some(value.to_string())) {
            StepOutcome::Continued => Ok(()),
            StepOutcome::Completed => bail!(
                "target job {} completed while data was still streaming",
                target.job_id()
            ),
            StepOutcome::Fatal(kind) => {
                bail!("target job {} failed fatally: {kind:?}", target.job_id())
            }
        }
    }

    /// Stop the downstream target, releasing its suspended computation.
    pub fn finish_target(&mut self) {
        if let Some(target) = self.target.as_deref_mut() {
            target.stop();
        }
    }
}
