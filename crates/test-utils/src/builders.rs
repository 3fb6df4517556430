#![allow(dead_code)]

use jobrun::errors::Result;
use jobrun::job::{Job, JobBehavior, JobOptions};

/// Builder for [`Job`] to simplify test setup.
pub struct JobBuilder {
    behavior: Box<dyn JobBehavior>,
    options: JobOptions,
}

impl JobBuilder {
    pub fn new(behavior: Box<dyn JobBehavior>) -> Self {
        Self {
            behavior,
            options: JobOptions::default(),
        }
    }

    pub fn id(mut self, job_id: &str) -> Self {
        self.options.job_id = Some(job_id.to_string());
        self
    }

    pub fn start_at(mut self, raw: &str) -> Self {
        self.options.start_at = Some(raw.to_string());
        self
    }

    pub fn max_working_time(mut self, seconds: f64) -> Self {
        self.options.max_working_time = seconds;
        self
    }

    pub fn max_retries(mut self, retries: u32) -> Self {
        self.options.max_retries = retries;
        self
    }

    pub fn tries(mut self, tries: u32) -> Self {
        self.options.tries = tries;
        self
    }

    pub fn target(mut self, target: Job) -> Self {
        self.options.target = Some(Box::new(target));
        self
    }

    pub fn depends_on(mut self, dep: Job) -> Self {
        self.options.depends_on.push(dep);
        self
    }

    pub fn build(self) -> Job {
        Job::new(self.behavior, self.options).expect("failed to build valid job from builder")
    }

    pub fn try_build(self) -> Result<Job> {
        Job::new(self.behavior, self.options)
    }
}
