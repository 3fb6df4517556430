// src/job/record.rs

//! Serialized form of a job.
//!
//! A record carries every durable field of a job: the transient `status`,
//! `running_time`, and the live computation handle are deliberately absent
//! and reset on reconstruction. `target` and `depends_on` are embedded
//! recursively (full subtree, not references); `class_name` tags which
//! behavior the registry should rebuild, with its parameters flattened into
//! the same object.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobRecord {
    pub job_id: String,

    #[serde(default)]
    pub parent_id: Option<String>,

    #[serde(default)]
    pub start_at: Option<String>,

    /// Cumulative execution-time budget in seconds; `<= 0` means unlimited.
    #[serde(default)]
    pub max_working_time: f64,

    /// Tolerated failures before the job is abandoned; `0` means no retry.
    #[serde(default)]
    pub max_retries: u32,

    #[serde(default)]
    pub tries: u32,

    #[serde(default)]
    pub target: Option<Box<JobRecord>>,

    #[serde(default)]
    pub depends_on: Vec<JobRecord>,

    pub class_name: String,

    /// Behavior-specific parameters (e.g. a file path), flattened so they
    /// sit alongside the common fields in the persisted object.
    #[serde(flatten)]
    pub params: Map<String, Value>,
}
