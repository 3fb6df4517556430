// src/errors.rs

//! Crate-wide error aliases and helpers.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum JobrunError {
    #[error("Manifest error: {0}")]
    ManifestError(String),

    #[error("Cycle detected in job graph: {0}")]
    GraphCycle(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error("Snapshot format error: {0}")]
    SnapshotError(#[from] serde_json::Error),

    #[error("Unknown job kind: {0}")]
    UnknownJobKind(String),

    #[error("Invalid start_at value {0:?} (expected \"YYYY-MM-DD HH:MM\" or \"HH:MM\")")]
    InvalidStartAt(String),

    #[error("Job {0} exceeded its working-time budget")]
    TimeLimitExceeded(String),

    #[error("Job {0} reached its maximum number of attempts")]
    MaxAttemptsExceeded(String),

    #[error("Ready queue is full (pool_size = {0})")]
    PoolExhausted(usize),

    #[error("Scheduler stalled: {0} jobs tracked but none ready")]
    Stalled(usize),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub use anyhow::Error;
pub type Result<T> = std::result::Result<T, JobrunError>;
