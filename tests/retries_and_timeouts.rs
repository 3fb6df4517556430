// tests/retries_and_timeouts.rs

mod common;
use crate::common::builders::JobBuilder;
use crate::common::fake_jobs::{CountingJob, FlakyJob, SlowJob, new_step_log};
use crate::common::init_tracing;

use std::time::Duration;

use jobrun::errors::JobrunError;
use jobrun::job::{FatalKind, JobStatus, StepOutcome};
use jobrun::sched::{RunMode, RunOutcome, Scheduler};

#[test]
fn transient_faults_are_absorbed_and_counted() {
    init_tracing();

    let mut job = JobBuilder::new(FlakyJob::new(2, 1)).max_retries(5).build();

    assert_eq!(job.run(None), StepOutcome::Continued);
    assert_eq!(job.tries(), 1);
    assert_eq!(job.run(None), StepOutcome::Continued);
    assert_eq!(job.tries(), 2);

    // Faults exhausted; the job yields once, then completes.
    assert_eq!(job.run(None), StepOutcome::Continued);
    assert_eq!(job.tries(), 2);
    assert_eq!(job.run(None), StepOutcome::Completed);
}

#[test]
fn flaky_job_still_drains_the_scheduler() {
    init_tracing();

    let mut scheduler = Scheduler::new(10);
    let job = JobBuilder::new(FlakyJob::new(2, 1)).max_retries(5).build();
    scheduler.schedule(job).unwrap();

    let outcome = scheduler.run(RunMode::Atomic).unwrap();
    assert_eq!(outcome, RunOutcome::Drained);
}

#[test]
fn retry_exhaustion_is_fatal() {
    init_tracing();

    let mut job = JobBuilder::new(FlakyJob::always_failing())
        .max_retries(3)
        .build();

    assert_eq!(job.run(None), StepOutcome::Continued);
    assert_eq!(job.run(None), StepOutcome::Continued);
    assert_eq!(
        job.run(None),
        StepOutcome::Fatal(FatalKind::MaxAttemptsExceeded)
    );
    assert_eq!(job.tries(), 3);
    assert_eq!(job.status(), JobStatus::Failed);
}

#[test]
fn atomic_mode_escalates_retry_exhaustion() {
    init_tracing();

    let mut scheduler = Scheduler::new(10);
    let job = JobBuilder::new(FlakyJob::always_failing())
        .id("doomed")
        .max_retries(3)
        .build();
    scheduler.schedule(job).unwrap();

    let err = scheduler.run(RunMode::Atomic).unwrap_err();
    assert!(matches!(err, JobrunError::MaxAttemptsExceeded(id) if id == "doomed"));
    // The job was still finalized before the loop aborted.
    assert!(!scheduler.contains("doomed"));
}

#[test]
fn normal_mode_absorbs_fatal_conditions() {
    init_tracing();
    let log = new_step_log();

    let mut scheduler = Scheduler::new(10);
    let doomed = JobBuilder::new(FlakyJob::always_failing())
        .id("doomed")
        .max_retries(2)
        .build();
    let healthy = JobBuilder::new(CountingJob::new("healthy", 2, log.clone()))
        .id("healthy")
        .build();
    scheduler.schedule(doomed).unwrap();
    scheduler.schedule(healthy).unwrap();

    // The doomed job is abandoned, the healthy one still finishes.
    let outcome = scheduler.run(RunMode::Normal).unwrap();
    assert_eq!(outcome, RunOutcome::Drained);
    assert_eq!(log.lock().unwrap().len(), 3);
}

#[test]
fn no_retry_budget_treats_fault_as_completion() {
    init_tracing();

    let mut job = JobBuilder::new(FlakyJob::always_failing()).build();
    assert_eq!(job.max_retries(), 0);
    assert_eq!(job.run(None), StepOutcome::Completed);
    assert_eq!(job.tries(), 0);
}

#[test]
fn time_limit_fires_on_the_first_step_past_the_budget() {
    init_tracing();

    let mut job = JobBuilder::new(SlowJob::new(Duration::from_millis(25), 100))
        .max_working_time(0.005)
        .build();

    // First step runs: no time was consumed yet.
    assert_eq!(job.run(None), StepOutcome::Continued);
    assert!(job.running_time() >= Duration::from_millis(25));

    // The budget is now spent; the next attempt fails fatally.
    assert_eq!(
        job.run(None),
        StepOutcome::Fatal(FatalKind::TimeLimitExceeded)
    );
    assert_eq!(job.status(), JobStatus::Failed);
}

#[test]
fn atomic_mode_escalates_time_limit() {
    init_tracing();

    let mut scheduler = Scheduler::new(10);
    let job = JobBuilder::new(SlowJob::new(Duration::from_millis(25), 100))
        .id("slow")
        .max_working_time(0.005)
        .max_retries(3)
        .build();
    scheduler.schedule(job).unwrap();

    let err = scheduler.run(RunMode::Atomic).unwrap_err();
    assert!(matches!(err, JobrunError::TimeLimitExceeded(id) if id == "slow"));
}

#[test]
fn generous_time_limit_never_fires_early() {
    init_tracing();

    let mut scheduler = Scheduler::new(10);
    let job = JobBuilder::new(SlowJob::new(Duration::from_millis(1), 3))
        .max_working_time(60.0)
        .build();
    scheduler.schedule(job).unwrap();

    let outcome = scheduler.run(RunMode::Atomic).unwrap();
    assert_eq!(outcome, RunOutcome::Drained);
}

#[test]
fn zero_max_working_time_means_unlimited() {
    init_tracing();

    let mut job = JobBuilder::new(SlowJob::new(Duration::from_millis(5), 2)).build();
    assert_eq!(job.run(None), StepOutcome::Continued);
    assert_eq!(job.run(None), StepOutcome::Continued);
    assert_eq!(job.run(None), StepOutcome::Completed);
}

#[test]
fn future_start_at_is_a_skipped_turn() {
    init_tracing();
    let log = new_step_log();

    let mut job = JobBuilder::new(CountingJob::new("later", 1, log.clone()))
        .start_at("2099-01-01 00:00")
        .build();

    assert_eq!(job.run(None), StepOutcome::Continued);
    assert_eq!(job.status(), JobStatus::NotStarted);
    assert!(log.lock().unwrap().is_empty());
    assert_eq!(job.running_time(), Duration::ZERO);
}

#[test]
fn past_start_at_runs_immediately() {
    init_tracing();
    let log = new_step_log();

    let mut job = JobBuilder::new(CountingJob::new("now", 1, log.clone()))
        .start_at("2000-01-01 00:00")
        .build();

    assert_eq!(job.run(None), StepOutcome::Continued);
    assert_eq!(job.status(), JobStatus::Started);
    assert_eq!(log.lock().unwrap().len(), 1);
}

#[test]
fn unparseable_start_at_fails_construction() {
    init_tracing();

    let result = JobBuilder::new(FlakyJob::new(0, 0))
        .start_at("sometime soon")
        .try_build();
    assert!(matches!(
        result,
        Err(JobrunError::InvalidStartAt(raw)) if raw == "sometime soon"
    ));
}
