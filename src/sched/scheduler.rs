// src/sched/scheduler.rs

use std::collections::{HashMap, VecDeque};
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};

use tracing::{debug, info, warn};

use crate::errors::{JobrunError, Result};
use crate::job::{Job, StepOutcome};
use crate::registry::JobRegistry;
use crate::sched::snapshot::Snapshot;

pub const DEFAULT_POOL_SIZE: usize = 10;

/// How fatal per-job conditions are routed by the run loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunMode {
    /// Fatal conditions finalize the affected job and the loop moves on.
    Normal,
    /// Fatal conditions abort the whole loop. Debugging/testing aid only.
    Atomic,
}

/// Why the run loop returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
    /// Every job finished or was fatally abandoned.
    Drained,
    /// The interrupt flag was raised between steps; jobs remain tracked.
    Interrupted,
}

/// Single-threaded cooperative scheduler for resumable jobs.
///
/// Owns three registries:
/// - `ready`: bounded double-ended queue of job ids eligible to run now
/// - `waiting`: parent job id → pending dependency ids
/// - `available_jobs`: the canonical id → job registry; jobs live here and
///   everything else refers to them by id
///
/// Fairness is round robin per ready cohort: new arrivals enter at the
/// tail, the next job to step is taken from the tail, and a job that took a
/// non-terminal step is reinserted at the head. Among N simultaneously
/// ready jobs, each gets exactly one turn before any gets a second.
#[derive(Debug)]
pub struct Scheduler {
    pool_size: usize,
    ready: VecDeque<String>,
    waiting: HashMap<String, Vec<String>>,
    available_jobs: HashMap<String, Job>,
}

impl Scheduler {
    pub fn new(pool_size: usize) -> Self {
        Self {
            pool_size,
            ready: VecDeque::with_capacity(pool_size),
            waiting: HashMap::new(),
            available_jobs: HashMap::new(),
        }
    }

    pub fn pool_size(&self) -> usize {
        self.pool_size
    }

    /// Whether no jobs are tracked anymore.
    pub fn is_drained(&self) -> bool {
        self.available_jobs.is_empty()
    }

    pub fn tracked_len(&self) -> usize {
        self.available_jobs.len()
    }

    pub fn contains(&self, job_id: &str) -> bool {
        self.available_jobs.contains_key(job_id)
    }

    /// Read-only view of a tracked job.
    pub fn job(&self, job_id: &str) -> Option<&Job> {
        self.available_jobs.get(job_id)
    }

    /// Ids of every tracked job (unordered).
    pub fn tracked_ids(&self) -> Vec<String> {
        self.available_jobs.keys().cloned().collect()
    }

    /// Ready ids from head to tail; the next job to step is the last one.
    pub fn ready_ids(&self) -> Vec<String> {
        self.ready.iter().cloned().collect()
    }

    /// Pending dependency ids of a parent, if it is still waiting.
    pub fn pending_children(&self, parent_id: &str) -> Option<&[String]> {
        self.waiting.get(parent_id).map(Vec::as_slice)
    }

    pub fn waiting_parents(&self) -> Vec<String> {
        self.waiting.keys().cloned().collect()
    }

    /// Register a job, expanding its dependency subtree into ready/waiting
    /// bookkeeping.
    ///
    /// The job's `depends_on` list is drained here: each dependency gets its
    /// `parent_id` set, is recorded under `waiting[job_id]`, and is itself
    /// registered recursively. A job with dependencies therefore never
    /// enters `ready` until all of them have been finalized.
    pub fn schedule(&mut self, mut job: Job) -> Result<()> {
        info!(job_id = %job.job_id(), kind = job.kind(), "scheduling job");

        let job_id = job.job_id().to_string();
        let deps = job.take_dependencies();
        self.available_jobs.insert(job_id.clone(), job);

        if deps.is_empty() {
            return self.push_ready_back(job_id);
        }

        for mut dep in deps {
            dep.set_parent_id(job_id.clone());
            self.waiting
                .entry(job_id.clone())
                .or_default()
                .push(dep.job_id().to_string());
            self.schedule(dep)?;
        }

        Ok(())
    }

    /// Return a job that just took one non-terminal step to the head of the
    /// ready queue. The caller must have popped it first.
    pub fn reschedule(&mut self, job_id: String) {
        self.ready.push_front(job_id);
    }

    /// Finalize a job: release its suspended computation, drop it from the
    /// registry, and unblock its parent if this was the last pending
    /// dependency.
    ///
    /// A parent is promoted to `ready` exactly once, on the transition of
    /// its waiting list from non-empty to empty.
    pub fn stop(&mut self, job_id: &str) -> Result<()> {
        let Some(mut job) = self.available_jobs.remove(job_id) else {
            return Ok(());
        };
        debug!(job_id, kind = job.kind(), "finalizing job");
        job.stop();
        // A job finalized out of band may still hold a ready slot; purge it
        // so the slot does not count against pool_size.
        self.ready.retain(|id| id != job_id);

        let Some(parent_id) = job.parent_id().map(str::to_string) else {
            return Ok(());
        };
        let Some(pending) = self.waiting.get_mut(&parent_id) else {
            return Ok(());
        };

        pending.retain(|id| id != job_id);
        if pending.is_empty() {
            self.waiting.remove(&parent_id);
            self.push_ready_back(parent_id)?;
        }

        Ok(())
    }

    /// Run until every job finished or was fatally abandoned.
    pub fn run(&mut self, mode: RunMode) -> Result<RunOutcome> {
        static NEVER: AtomicBool = AtomicBool::new(false);
        self.run_until(mode, &NEVER)
    }

    /// Run loop with an external interrupt flag, polled between steps.
    ///
    /// Each iteration pops one ready job from the tail and steps it once:
    /// - `Continued` → reinserted at the head (round robin)
    /// - `Completed` → finalized
    /// - `Fatal` → finalized; in [`RunMode::Atomic`] the corresponding
    ///   error is returned instead of being absorbed
    pub fn run_until(&mut self, mode: RunMode, interrupt: &AtomicBool) -> Result<RunOutcome> {
        info!(
            pool_size = self.pool_size,
            jobs = self.available_jobs.len(),
            "starting scheduler run loop"
        );

        while !self.available_jobs.is_empty() {
            if interrupt.load(Ordering::SeqCst) {
                info!(
                    jobs = self.available_jobs.len(),
                    "run loop interrupted; jobs remain tracked"
                );
                return Ok(RunOutcome::Interrupted);
            }

            let Some(job_id) = self.ready.pop_back() else {
                return Err(JobrunError::Stalled(self.available_jobs.len()));
            };
            let Some(job) = self.available_jobs.get_mut(&job_id) else {
                // Guard: `stop` purges ready entries, so this only fires on
                // registry corruption.
                warn!(job_id, "ready entry without a tracked job; dropping");
                continue;
            };

            match job.run(None) {
                StepOutcome::Continued => self.reschedule(job_id),
                StepOutcome::Completed => {
                    debug!(job_id, "job completed; finalizing");
                    self.stop(&job_id)?;
                }
                StepOutcome::Fatal(kind) => {
                    debug!(job_id, ?kind, "job failed fatally; finalizing");
                    self.stop(&job_id)?;
                    if mode == RunMode::Atomic {
                        return Err(kind.into_error(&job_id));
                    }
                }
            }
        }

        info!("all jobs drained; run loop finished");
        Ok(RunOutcome::Drained)
    }

    /// Serialize the complete engine state, draining the ready queue in
    /// tail-pop order.
    pub fn snapshot(&mut self) -> Snapshot {
        let mut ready = Vec::new();
        while let Some(job_id) = self.ready.pop_back() {
            if let Some(job) = self.available_jobs.get(&job_id) {
                ready.push(job.to_record());
            }
        }

        Snapshot {
            pool_size: self.pool_size,
            ready,
            available_jobs: self
                .available_jobs
                .iter()
                .map(|(id, job)| (id.clone(), job.to_record()))
                .collect(),
            waiting: self
                .waiting
                .iter()
                .map(|(parent, children)| (parent.clone(), children.clone()))
                .collect(),
        }
    }

    /// Write a snapshot to `path`, then reset all registries to empty.
    pub fn save_state(&mut self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        info!(path = %path.display(), "saving scheduler state");

        let snapshot = self.snapshot();
        snapshot.save(path)?;
        self.reset();

        info!("scheduler state saved; registries reset");
        Ok(())
    }

    /// Rebuild engine state from a snapshot at `path`.
    ///
    /// `waiting` and `available_jobs` are reconstructed verbatim through the
    /// registry; the snapshot's `ready` entries are re-`schedule`d to
    /// re-derive their queue placement. Records written after scheduling
    /// carry drained dependency lists, so re-scheduling cannot duplicate
    /// `waiting` entries.
    pub fn restore_state(&mut self, path: impl AsRef<Path>, registry: &JobRegistry) -> Result<()> {
        let path = path.as_ref();
        info!(path = %path.display(), "restoring scheduler state");

        let snapshot = Snapshot::load(path)?;

        self.pool_size = snapshot.pool_size;
        self.waiting = snapshot.waiting.into_iter().collect();
        self.available_jobs = snapshot
            .available_jobs
            .into_iter()
            .map(|(id, record)| Ok((id, registry.from_record(record)?)))
            .collect::<Result<_>>()?;

        self.ready.clear();
        for record in snapshot.ready {
            let job = registry.from_record(record)?;
            self.schedule(job)?;
        }

        info!(jobs = self.available_jobs.len(), "state successfully restored");
        Ok(())
    }

    fn reset(&mut self) {
        self.ready.clear();
        self.waiting.clear();
        self.available_jobs.clear();
    }

    fn push_ready_back(&mut self, job_id: String) -> Result<()> {
        if self.ready.len() >= self.pool_size {
            return Err(JobrunError::PoolExhausted(self.pool_size));
        }
        self.ready.push_back(job_id);
        Ok(())
    }
}

impl Default for Scheduler {
    fn default() -> Self {
        Self::new(DEFAULT_POOL_SIZE)
    }
}
