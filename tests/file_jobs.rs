// tests/file_jobs.rs

mod common;
use crate::common::builders::JobBuilder;
use crate::common::init_tracing;

use std::fs;

use tempfile::tempdir;

use jobrun::errors::JobrunError;
use jobrun::jobs::{CreateFileJob, ReadFileJob, WriteFileJob};
use jobrun::sched::{RunMode, RunOutcome, Scheduler};

#[test]
fn create_file_job_touches_its_path() {
    init_tracing();
    let dir = tempdir().unwrap();
    let path = dir.path().join("marker.txt");

    let mut scheduler = Scheduler::new(10);
    let job = JobBuilder::new(Box::new(CreateFileJob::new(&path))).build();
    scheduler.schedule(job).unwrap();

    let outcome = scheduler.run(RunMode::Atomic).unwrap();
    assert_eq!(outcome, RunOutcome::Drained);
    assert!(path.exists());
}

#[test]
fn unfed_writer_leaves_an_empty_file() {
    init_tracing();
    let dir = tempdir().unwrap();
    let path = dir.path().join("empty.txt");

    let mut scheduler = Scheduler::new(10);
    let job = JobBuilder::new(Box::new(WriteFileJob::new(&path))).build();
    scheduler.schedule(job).unwrap();

    // Nobody pushes to it, so the first (input-less) step completes it.
    let outcome = scheduler.run(RunMode::Atomic).unwrap();
    assert_eq!(outcome, RunOutcome::Drained);
    assert_eq!(fs::read_to_string(&path).unwrap(), "");
}

#[test]
fn reader_streams_every_line_into_its_target() {
    init_tracing();
    let dir = tempdir().unwrap();
    let source = dir.path().join("input.txt");
    let sink = dir.path().join("output.txt");
    fs::write(&source, "alpha\nbeta\ngamma\n").unwrap();

    let writer = JobBuilder::new(Box::new(WriteFileJob::new(&sink)))
        .id("writer")
        .build();
    let reader = JobBuilder::new(Box::new(ReadFileJob::new(&source)))
        .id("reader")
        .target(writer)
        .build();

    let mut scheduler = Scheduler::new(10);
    scheduler.schedule(reader).unwrap();

    let outcome = scheduler.run(RunMode::Atomic).unwrap();
    assert_eq!(outcome, RunOutcome::Drained);
    assert_eq!(fs::read_to_string(&sink).unwrap(), "alpha\nbeta\ngamma\n");
}

#[test]
fn reader_without_a_target_just_drains_the_file() {
    init_tracing();
    let dir = tempdir().unwrap();
    let source = dir.path().join("input.txt");
    fs::write(&source, "one\ntwo\n").unwrap();

    let mut scheduler = Scheduler::new(10);
    let reader = JobBuilder::new(Box::new(ReadFileJob::new(&source))).build();
    scheduler.schedule(reader).unwrap();

    let outcome = scheduler.run(RunMode::Atomic).unwrap();
    assert_eq!(outcome, RunOutcome::Drained);
}

#[test]
fn reader_waits_for_the_creator_it_depends_on() {
    init_tracing();
    let dir = tempdir().unwrap();
    let path = dir.path().join("made-then-read.txt");

    let creator = JobBuilder::new(Box::new(CreateFileJob::new(&path)))
        .id("creator")
        .build();
    let reader = JobBuilder::new(Box::new(ReadFileJob::new(&path)))
        .id("reader")
        .depends_on(creator)
        .build();

    let mut scheduler = Scheduler::new(10);
    scheduler.schedule(reader).unwrap();

    // The file does not exist yet; only the dependency gate makes this run
    // succeed. Atomic mode would abort if the reader ran too early.
    let outcome = scheduler.run(RunMode::Atomic).unwrap();
    assert_eq!(outcome, RunOutcome::Drained);
    assert!(path.exists());
}

#[test]
fn missing_source_without_retries_is_quietly_abandoned() {
    init_tracing();
    let dir = tempdir().unwrap();

    let mut scheduler = Scheduler::new(10);
    let reader = JobBuilder::new(Box::new(ReadFileJob::new(dir.path().join("no-such.txt"))))
        .build();
    scheduler.schedule(reader).unwrap();

    // max_retries defaults to 0: the open failure counts as completion.
    let outcome = scheduler.run(RunMode::Atomic).unwrap();
    assert_eq!(outcome, RunOutcome::Drained);
}

#[test]
fn missing_source_with_retries_exhausts_the_budget() {
    init_tracing();
    let dir = tempdir().unwrap();

    let mut scheduler = Scheduler::new(10);
    let reader = JobBuilder::new(Box::new(ReadFileJob::new(dir.path().join("no-such.txt"))))
        .id("reader")
        .max_retries(2)
        .build();
    scheduler.schedule(reader).unwrap();

    let err = scheduler.run(RunMode::Atomic).unwrap_err();
    assert!(matches!(err, JobrunError::MaxAttemptsExceeded(id) if id == "reader"));
}
