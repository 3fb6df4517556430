// src/job/start_at.rs

//! Earliest-start instants.
//!
//! Two formats are accepted: an absolute date-time ("YYYY-MM-DD HH:MM") or a
//! bare time of day ("HH:MM"), which resolves against today's local date.
//! Anything else is a fatal input error; parsing happens eagerly at job
//! construction so a bad value can never reach the run loop.

use chrono::{Local, NaiveDateTime, NaiveTime};

use crate::errors::{JobrunError, Result};

pub const DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M";
pub const TIME_FORMAT: &str = "%H:%M";

/// A parsed `start_at` value. Keeps the original string for serialization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StartAt {
    raw: String,
    when: NaiveDateTime,
}

impl StartAt {
    pub fn parse(raw: &str) -> Result<Self> {
        if let Ok(when) = NaiveDateTime::parse_from_str(raw, DATETIME_FORMAT) {
            return Ok(Self {
                raw: raw.to_string(),
                when,
            });
        }
        if let Ok(time) = NaiveTime::parse_from_str(raw, TIME_FORMAT) {
            return Ok(Self {
                raw: raw.to_string(),
                when: Local::now().date_naive().and_time(time),
            });
        }
        Err(JobrunError::InvalidStartAt(raw.to_string()))
    }

    /// The string this value was parsed from.
    pub fn raw(&self) -> &str {
        &self.raw
    }

    pub fn when(&self) -> NaiveDateTime {
        self.when
    }

    /// Whether the instant has been reached.
    pub fn is_due(&self, now: NaiveDateTime) -> bool {
        now >= self.when
    }
}
