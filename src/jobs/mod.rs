// src/jobs/mod.rs

//! Built-in job behaviors (the engine's external collaborators).
//!
//! Each behavior produces a [`crate::job::Resumable`] that does one unit of
//! I/O per resumption and keeps any acquired resources inside the step
//! value, so releasing the handle early still cleans up.

pub mod files;

pub use files::{CreateFileJob, ReadFileJob, WriteFileJob};
