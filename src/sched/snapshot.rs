// src/sched/snapshot.rs

//! Persisted engine state.
//!
//! A snapshot is all-or-nothing: one structured record holding the ready
//! queue (drained in tail-pop order), the full job registry, and the
//! parent → pending-children index. I/O and format errors are not absorbed;
//! they propagate to the caller as fatal process errors.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::errors::Result;
use crate::job::JobRecord;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Snapshot {
    pub pool_size: usize,

    /// Ready jobs in the order they were popped from the tail.
    #[serde(default)]
    pub ready: Vec<JobRecord>,

    /// Every job tracked by the engine, keyed by id.
    #[serde(default)]
    pub available_jobs: BTreeMap<String, JobRecord>,

    /// Parent job id → ids of its not-yet-finished dependencies.
    #[serde(default)]
    pub waiting: BTreeMap<String, Vec<String>>,
}

impl Snapshot {
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&contents)?)
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let contents = serde_json::to_string_pretty(self)?;
        fs::write(path, contents)?;
        Ok(())
    }
}
