// src/jobs/files.rs

use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, BufWriter, Lines, Write};
use std::path::PathBuf;

use anyhow::{Context, bail};
use serde_json::{Map, Value, json};

use crate::job::{JobBehavior, Resumable, Resumed, StepCtx};

fn path_param(params: &Map<String, Value>) -> anyhow::Result<PathBuf> {
    match params.get("path").and_then(Value::as_str) {
        Some(path) => Ok(PathBuf::from(path)),
        None => bail!("missing string parameter `path`"),
    }
}

fn path_params(path: &PathBuf) -> Map<String, Value> {
    let mut params = Map::new();
    params.insert("path".to_string(), json!(path));
    params
}

/// Touches a file. The first resumption is a pure suspension point; the
/// file appears on the second, after the scheduler's time-limit check has
/// had a chance to run.
pub struct CreateFileJob {
    path: PathBuf,
}

impl CreateFileJob {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn from_params(params: &Map<String, Value>) -> anyhow::Result<Box<dyn JobBehavior>> {
        Ok(Box::new(Self::new(path_param(params)?)))
    }
}

impl JobBehavior for CreateFileJob {
    fn kind(&self) -> &'static str {
        "CreateFileJob"
    }

    fn params(&self) -> Map<String, Value> {
        path_params(&self.path)
    }

    fn underlying(&self) -> Box<dyn Resumable> {
        Box::new(CreateFileSteps {
            path: self.path.clone(),
            primed: false,
        })
    }
}

struct CreateFileSteps {
    path: PathBuf,
    primed: bool,
}

impl Resumable for CreateFileSteps {
    fn resume(&mut self, _ctx: StepCtx<'_>) -> anyhow::Result<Resumed> {
        if !self.primed {
            self.primed = true;
            return Ok(Resumed::Yielded);
        }
        OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .with_context(|| format!("touching {}", self.path.display()))?;
        Ok(Resumed::Done)
    }
}

/// Writes every pushed line to a file, one line per resumption.
///
/// The file is opened lazily on the first resumption and completed by a
/// resumption with no input (the upstream job signalling end of stream, or
/// the scheduler stepping a writer nobody feeds). The open file lives
/// inside the step value, so releasing the handle closes it.
pub struct WriteFileJob {
    path: PathBuf,
}

impl WriteFileJob {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn from_params(params: &Map<String, Value>) -> anyhow::Result<Box<dyn JobBehavior>> {
        Ok(Box::new(Self::new(path_param(params)?)))
    }
}

impl JobBehavior for WriteFileJob {
    fn kind(&self) -> &'static str {
        "WriteFileJob"
    }

    fn params(&self) -> Map<String, Value> {
        path_params(&self.path)
    }

    fn underlying(&self) -> Box<dyn Resumable> {
        Box::new(WriteFileSteps {
            path: self.path.clone(),
            out: None,
        })
    }
}

struct WriteFileSteps {
    path: PathBuf,
    out: Option<BufWriter<File>>,
}

impl Resumable for WriteFileSteps {
    fn resume(&mut self, mut ctx: StepCtx<'_>) -> anyhow::Result<Resumed> {
        if self.out.is_none() {
            let file = File::create(&self.path)
                .with_context(|| format!("creating {}", self.path.display()))?;
            self.out = Some(BufWriter::new(file));
        }

        match ctx.take_input() {
            Some(line) => {
                if let Some(out) = self.out.as_mut() {
                    out.write_all(line.as_bytes())?;
                    out.write_all(b"\n")?;
                }
                Ok(Resumed::Yielded)
            }
            None => {
                if let Some(mut out) = self.out.take() {
                    out.flush()?;
                }
                Ok(Resumed::Done)
            }
        }
    }
}

/// Reads a file one line per resumption, pushing each line to the job's
/// `target`. At end of file the target is stopped and the job completes.
pub struct ReadFileJob {
    path: PathBuf,
}

impl ReadFileJob {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn from_params(params: &Map<String, Value>) -> anyhow::Result<Box<dyn JobBehavior>> {
        Ok(Box::new(Self::new(path_param(params)?)))
    }
}

impl JobBehavior for ReadFileJob {
    fn kind(&self) -> &'static str {
        "ReadFileJob"
    }

    fn params(&self) -> Map<String, Value> {
        path_params(&self.path)
    }

    fn underlying(&self) -> Box<dyn Resumable> {
        Box::new(ReadFileSteps {
            path: self.path.clone(),
            lines: None,
        })
    }
}

struct ReadFileSteps {
    path: PathBuf,
    lines: Option<Lines<BufReader<File>>>,
}

impl Resumable for ReadFileSteps {
    fn resume(&mut self, mut ctx: StepCtx<'_>) -> anyhow::Result<Resumed> {
        if self.lines.is_none() {
            let file = File::open(&self.path)
                .with_context(|| format!("opening {}", self.path.display()))?;
            self.lines = Some(BufReader::new(file).lines());
        }

        match self.lines.as_mut().and_then(Iterator::next) {
            Some(line) => {
                let line = line?;
                ctx.push_to_target(&line)?;
                Ok(Resumed::Yielded)
            }
            None => {
                ctx.finish_target();
                Ok(Resumed::Done)
            }
        }
    }
}
