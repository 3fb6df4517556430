// src/config/model.rs

use std::collections::BTreeMap;

use serde::Deserialize;
use serde_json::{Map, Value};

use crate::job::JobRecord;
use crate::sched::DEFAULT_POOL_SIZE;

/// Raw jobs manifest as deserialized from TOML, before semantic validation.
///
/// ```toml
/// pool_size = 10
///
/// [job.copy]
/// kind = "ReadFileJob"
/// path = "data/input.txt"
/// depends_on = ["touch"]
/// target = "sink"
/// ```
///
/// `depends_on` and `target` reference sibling entries by name; referenced
/// entries are consumed into the referencing job's subtree, and entries
/// nobody references become the roots handed to the scheduler.
#[derive(Debug, Clone, Deserialize)]
pub struct RawManifest {
    #[serde(default = "default_pool_size")]
    pub pool_size: usize,

    #[serde(default)]
    pub job: BTreeMap<String, JobEntry>,
}

fn default_pool_size() -> usize {
    DEFAULT_POOL_SIZE
}

/// One `[job.<name>]` section. The entry name becomes the job id.
#[derive(Debug, Clone, Deserialize)]
pub struct JobEntry {
    /// Behavior type tag, resolved through the registry.
    pub kind: String,

    #[serde(default)]
    pub start_at: Option<String>,

    /// Seconds of cumulative execution time; `<= 0` (the default) means
    /// unlimited.
    #[serde(default)]
    pub max_working_time: f64,

    #[serde(default)]
    pub max_retries: u32,

    /// Names of sibling entries that must finish before this job runs.
    #[serde(default)]
    pub depends_on: Vec<String>,

    /// Name of the sibling entry this job pushes data to on every step.
    #[serde(default)]
    pub target: Option<String>,

    /// Behavior-specific parameters (e.g. `path = "..."`).
    #[serde(flatten)]
    pub params: Map<String, Value>,
}

/// Validated manifest: root job records ready to hand to the registry.
#[derive(Debug, Clone)]
pub struct Manifest {
    pub pool_size: usize,
    pub roots: Vec<JobRecord>,
}
