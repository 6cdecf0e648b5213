//! Injectable sources of time and identifiers
//!
//! The engine never reads the wall clock or mints ids on its own; callers pass a
//! [`Clock`] and an [`IdGenerator`] so results stay reproducible in tests.

use chrono::{Local, NaiveDate};
use std::cell::Cell;

use crate::error::{EngineError, Result};
use crate::ledger::MonthKey;

/// Source of the current date
pub trait Clock {
    /// Today's calendar date
    fn today(&self) -> NaiveDate;

    /// The month containing today
    fn current_month(&self) -> MonthKey {
        MonthKey::from_date(self.today())
    }
}

/// Clock backed by the local system time
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn today(&self) -> NaiveDate {
        Local::now().date_naive()
    }
}

/// Clock pinned to a single date
#[derive(Debug, Clone, Copy)]
pub struct FixedClock {
    date: NaiveDate,
}

impl FixedClock {
    pub fn new(date: NaiveDate) -> Self {
        Self { date }
    }

    /// Fixed clock at the given calendar day
    pub fn ymd(year: i32, month: u32, day: u32) -> Result<Self> {
        NaiveDate::from_ymd_opt(year, month, day)
            .map(Self::new)
            .ok_or_else(|| EngineError::InvalidInput(format!("invalid date {}-{:02}-{:02}", year, month, day)))
    }
}

impl Clock for FixedClock {
    fn today(&self) -> NaiveDate {
        self.date
    }
}

/// Source of unique record identifiers
pub trait IdGenerator {
    fn next_id(&self) -> String;
}

/// Monotonic counter ids (`<prefix>-1`, `<prefix>-2`, ...)
#[derive(Debug)]
pub struct SequentialIds {
    prefix: String,
    next: Cell<u64>,
}

impl SequentialIds {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            next: Cell::new(1),
        }
    }
}

impl IdGenerator for SequentialIds {
    fn next_id(&self) -> String {
        let n = self.next.get();
        self.next.set(n + 1);
        format!("{}-{}", self.prefix, n)
    }
}

/// Random v4 UUID ids
#[derive(Debug, Clone, Copy, Default)]
pub struct UuidIds;

impl IdGenerator for UuidIds {
    fn next_id(&self) -> String {
        uuid::Uuid::new_v4().to_string()
    }
}
