use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult};

pub const MINUTES_PER_HOUR: u16 = 60;
pub const MINUTES_PER_DAY: u16 = 24 * MINUTES_PER_HOUR;

/// A wall-clock time of day. `24:00` is accepted only where an end of day is meant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ClockTime {
    pub hour: u8,
    pub minute: u8,
}

impl ClockTime {
    #[must_use]
    pub const fn new(hour: u8, minute: u8) -> Self {
        Self { hour, minute }
    }

    /// Minutes since local midnight.
    #[must_use]
    pub fn minutes(self) -> u16 {
        u16::from(self.hour) * MINUTES_PER_HOUR + u16::from(self.minute)
    }

    fn is_valid_start(self) -> bool {
        self.hour < 24 && self.minute < 60
    }

    fn is_valid_end(self) -> bool {
        self.is_valid_start() || (self.hour == 24 && self.minute == 0)
    }
}

impl std::fmt::Display for ClockTime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:02}:{:02}", self.hour, self.minute)
    }
}

/// Validates a `[start, end)` pair of clock times within a single day.
///
/// ## Errors
/// Returns a validation error when either bound is malformed or `start >= end`.
pub fn validate_clock_range(start: ClockTime, end: ClockTime) -> CoreResult<()> {
    if !start.is_valid_start() {
        return Err(CoreError::ValidationError(format!(
            "start time {start} is not a valid time of day"
        )));
    }
    if !end.is_valid_end() {
        return Err(CoreError::ValidationError(format!(
            "end time {end} is not a valid time of day"
        )));
    }
    if start.minutes() >= end.minutes() {
        return Err(CoreError::ValidationError(format!(
            "start time {start} is not before end time {end}"
        )));
    }
    Ok(())
}

/// A contiguous free interval on one local date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AvailabilityBlock {
    pub start_hour: u8,
    pub start_minute: u8,
    pub end_hour: u8,
    pub end_minute: u8,
}

impl AvailabilityBlock {
    #[must_use]
    pub const fn new(start_hour: u8, start_minute: u8, end_hour: u8, end_minute: u8) -> Self {
        Self {
            start_hour,
            start_minute,
            end_hour,
            end_minute,
        }
    }

    #[must_use]
    pub const fn start(&self) -> ClockTime {
        ClockTime::new(self.start_hour, self.start_minute)
    }

    #[must_use]
    pub const fn end(&self) -> ClockTime {
        ClockTime::new(self.end_hour, self.end_minute)
    }

    #[must_use]
    pub fn start_minutes(&self) -> u16 {
        self.start().minutes()
    }

    #[must_use]
    pub fn end_minutes(&self) -> u16 {
        self.end().minutes()
    }

    /// True when `[start, end)` (minutes since midnight) lies entirely inside this block.
    #[must_use]
    pub fn contains(&self, start: u16, end: u16) -> bool {
        self.start_minutes() <= start && end <= self.end_minutes()
    }

    /// ## Errors
    /// Returns a validation error when the block is malformed or empty.
    pub fn validate(&self) -> CoreResult<()> {
        validate_clock_range(self.start(), self.end())
    }
}

/// Free blocks on one local calendar date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayAvailability {
    pub date: NaiveDate,
    #[serde(default)]
    pub available_blocks: Vec<AvailabilityBlock>,
}

/// Everything one participant submitted.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct UserAvailability {
    #[serde(default)]
    pub days: Vec<DayAvailability>,
}

impl UserAvailability {
    /// All blocks the participant listed for `date`, across duplicate day entries.
    pub fn blocks_on(&self, date: NaiveDate) -> impl Iterator<Item = &AvailabilityBlock> {
        self.days
            .iter()
            .filter(move |day| day.date == date)
            .flat_map(|day| day.available_blocks.iter())
    }

    /// True when some block on `date` fully covers `[start, end)`.
    #[must_use]
    pub fn covers(&self, date: NaiveDate, start: u16, end: u16) -> bool {
        self.blocks_on(date).any(|block| block.contains(start, end))
    }
}
