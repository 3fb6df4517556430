//! Fake job behaviors for tests.
//!
//! These never touch the filesystem; they record their resumptions into a
//! shared [`StepLog`] so tests can assert scheduling order.

use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

use anyhow::bail;
use serde_json::{Map, Value, json};

use jobrun::job::{JobBehavior, Resumable, Resumed, StepCtx};

/// Shared log recording which job took each step, in order.
pub type StepLog = Arc<Mutex<Vec<String>>>;

pub fn new_step_log() -> StepLog {
    Arc::new(Mutex::new(Vec::new()))
}

/// Behavior that yields a fixed number of times then completes, recording
/// every resumption in the shared log.
pub struct CountingJob {
    name: String,
    yields: u32,
    log: StepLog,
}

impl CountingJob {
    pub fn new(name: &str, yields: u32, log: StepLog) -> Box<dyn JobBehavior> {
        Box::new(Self {
            name: name.to_string(),
            yields,
            log,
        })
    }
}

impl JobBehavior for CountingJob {
    fn kind(&self) -> &'static str {
        "CountingJob"
    }

    fn params(&self) -> Map<String, Value> {
        let mut params = Map::new();
        params.insert("name".to_string(), json!(self.name));
        params.insert("yields".to_string(), json!(self.yields));
        params
    }

    fn underlying(&self) -> Box<dyn Resumable> {
        Box::new(CountingSteps {
            name: self.name.clone(),
            remaining: self.yields,
            log: Arc::clone(&self.log),
        })
    }
}

struct CountingSteps {
    name: String,
    remaining: u32,
    log: StepLog,
}

impl Resumable for CountingSteps {
    fn resume(&mut self, _ctx: StepCtx<'_>) -> anyhow::Result<Resumed> {
        self.log.lock().unwrap().push(self.name.clone());
        if self.remaining == 0 {
            return Ok(Resumed::Done);
        }
        self.remaining -= 1;
        Ok(Resumed::Yielded)
    }
}

/// Behavior that faults a fixed number of times before settling down, then
/// yields a fixed number of times and completes.
pub struct FlakyJob {
    failures: u32,
    yields: u32,
}

impl FlakyJob {
    pub fn new(failures: u32, yields: u32) -> Box<dyn JobBehavior> {
        Box::new(Self { failures, yields })
    }

    /// A job whose steps never stop faulting.
    pub fn always_failing() -> Box<dyn JobBehavior> {
        Self::new(u32::MAX, 0)
    }
}

impl JobBehavior for FlakyJob {
    fn kind(&self) -> &'static str {
        "FlakyJob"
    }

    fn params(&self) -> Map<String, Value> {
        let mut params = Map::new();
        params.insert("failures".to_string(), json!(self.failures));
        params.insert("yields".to_string(), json!(self.yields));
        params
    }

    fn underlying(&self) -> Box<dyn Resumable> {
        Box::new(FlakySteps {
            failures_left: self.failures,
            yields_left: self.yields,
        })
    }
}

struct FlakySteps {
    failures_left: u32,
    yields_left: u32,
}

impl Resumable for FlakySteps {
    fn resume(&mut self, _ctx: StepCtx<'_>) -> anyhow::Result<Resumed> {
        if self.failures_left > 0 {
            self.failures_left -= 1;
            bail!("synthetic step fault");
        }
        if self.yields_left > 0 {
            self.yields_left -= 1;
            return Ok(Resumed::Yielded);
        }
        Ok(Resumed::Done)
    }
}

/// Behavior whose every step burns real wall-clock time, for exercising
/// the working-time budget.
pub struct SlowJob {
    step_delay: Duration,
    yields: u32,
}

impl SlowJob {
    pub fn new(step_delay: Duration, yields: u32) -> Box<dyn JobBehavior> {
        Box::new(Self { step_delay, yields })
    }
}

impl JobBehavior for SlowJob {
    fn kind(&self) -> &'static str {
        "SlowJob"
    }

    fn underlying(&self) -> Box<dyn Resumable> {
        Box::new(SlowSteps {
            step_delay: self.step_delay,
            remaining: self.yields,
        })
    }
}

struct SlowSteps {
    step_delay: Duration,
    remaining: u32,
}

impl Resumable for SlowSteps {
    fn resume(&mut self, _ctx: StepCtx<'_>) -> anyhow::Result<Resumed> {
        thread::sleep(self.step_delay);
        if self.remaining == 0 {
            return Ok(Resumed::Done);
        }
        self.remaining -= 1;
        Ok(Resumed::Yielded)
    }
}
