// src/registry.rs

//! Type-tag → constructor table for reconstructing jobs from records.
//!
//! The registry is the only place that maps a `class_name` back to concrete
//! behavior code. It is an open table: production code pre-loads the file
//! behaviors via [`JobRegistry::with_file_jobs`], tests register their own
//! constructors (closures are fine, so fakes can capture shared state).

use std::collections::HashMap;

use serde_json::{Map, Value};

use crate::errors::{JobrunError, Result};
use crate::job::{Job, JobBehavior, JobOptions, JobRecord};
use crate::jobs::{CreateFileJob, ReadFileJob, WriteFileJob};

type BuildFn = Box<dyn Fn(&Map<String, Value>) -> anyhow::Result<Box<dyn JobBehavior>> + Send + Sync>;

pub struct JobRegistry {
    builders: HashMap<String, BuildFn>,
}

impl JobRegistry {
    pub fn new() -> Self {
        Self {
            builders: HashMap::new(),
        }
    }

    /// Registry pre-loaded with the built-in file job behaviors.
    pub fn with_file_jobs() -> Self {
        let mut registry = Self::new();
        registry.register("CreateFileJob", CreateFileJob::from_params);
        registry.register("WriteFileJob", WriteFileJob::from_params);
        registry.register("ReadFileJob", ReadFileJob::from_params);
        registry
    }

    pub fn register<F>(&mut self, kind: impl Into<String>, build: F)
    where
        F: Fn(&Map<String, Value>) -> anyhow::Result<Box<dyn JobBehavior>> + Send + Sync + 'static,
    {
        self.builders.insert(kind.into(), Box::new(build));
    }

    pub fn contains(&self, kind: &str) -> bool {
        self.builders.contains_key(kind)
    }

    /// Recursively reconstruct a job from its record.
    ///
    /// Nested `target`/`depends_on` records are rebuilt depth-first before
    /// the tagged constructor runs, so the behavior receives fully formed
    /// collaborators. An unknown tag aborts the whole reconstruction.
    pub fn from_record(&self, record: JobRecord) -> Result<Job> {
        let JobRecord {
            job_id,
            parent_id,
            start_at,
            max_working_time,
            max_retries,
            tries,
            target,
            depends_on,
            class_name,
            params,
        } = record;

        let target = target
            .map(|rec| self.from_record(*rec).map(Box::new))
            .transpose()?;
        let depends_on = depends_on
            .into_iter()
            .map(|rec| self.from_record(rec))
            .collect::<Result<Vec<_>>>()?;

        let build = self
            .builders
            .get(&class_name)
            .ok_or(JobrunError::UnknownJobKind(class_name))?;
        let behavior = build(&params)?;

        Job::new(
            behavior,
            JobOptions {
                job_id: Some(job_id),
                parent_id,
                start_at,
                max_working_time,
                max_retries,
                tries,
                target,
                depends_on,
            },
        )
    }
}

impl Default for JobRegistry {
    fn default() -> Self {
        Self::new()
    }
}
