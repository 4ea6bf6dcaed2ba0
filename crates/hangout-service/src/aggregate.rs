//! Availability aggregation: many participants' free blocks in, a few shared windows out.
//!
//! Each local day is cut into 30-minute buckets. Every participant block increments the
//! buckets it overlaps. Runs of buckets at or above a popularity threshold become candidate
//! windows (1 to 6 hours, never crossing midnight). The threshold starts at the best overlap
//! and is relaxed one participant at a time until enough candidates exist.

use std::collections::BTreeMap;

use chrono::{DateTime, Duration, NaiveDate, NaiveTime, TimeZone, Utc};
use chrono_tz::Tz;
use hangout_core::model::{Event, EventDetails, TimeWindow, UserAvailability, UserId};
use hangout_core::model::availability::MINUTES_PER_DAY;

pub const BUCKET_MINUTES: u16 = 30;
pub const BUCKETS_PER_DAY: usize = (MINUTES_PER_DAY / BUCKET_MINUTES) as usize;
/// Shortest run kept (1 hour).
pub const MIN_RUN_BUCKETS: usize = 2;
/// Longest run before it is force-closed (6 hours).
pub const MAX_RUN_BUCKETS: usize = 12;
/// Relaxation stops as soon as a threshold yields this many windows.
pub const TARGET_WINDOWS: usize = 3;

/// A run of buckets `[start, end)` on the day at `day_index`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Run {
    day_index: usize,
    start: usize,
    end: usize,
}

impl Run {
    fn start_minutes(self) -> u16 {
        bucket_minutes(self.start)
    }

    fn end_minutes(self) -> u16 {
        bucket_minutes(self.end)
    }
}

fn bucket_minutes(bucket: usize) -> u16 {
    // Bucket indices never exceed BUCKETS_PER_DAY.
    u16::try_from(bucket).map_or(MINUTES_PER_DAY, |bucket| bucket * BUCKET_MINUTES)
}

/// Overlap counts per bucket, one row per local date.
struct OverlapGrid {
    days: Vec<[u32; BUCKETS_PER_DAY]>,
    max: u32,
}

impl OverlapGrid {
    fn build(dates: &[NaiveDate], participants: &BTreeMap<UserId, UserAvailability>) -> Self {
        let mut days = vec![[0u32; BUCKETS_PER_DAY]; dates.len()];
        let mut max = 0;

        for availability in participants.values() {
            for day in &availability.days {
                let Some(day_index) = dates.iter().position(|date| *date == day.date) else {
                    continue;
                };
                let counts = &mut days[day_index];
                for block in &day.available_blocks {
                    let start = usize::from(block.start_minutes() / BUCKET_MINUTES);
                    let end = usize::from(block.end_minutes().div_ceil(BUCKET_MINUTES))
                        .min(BUCKETS_PER_DAY);
                    for count in counts.iter_mut().take(end).skip(start) {
                        *count += 1;
                        max = max.max(*count);
                    }
                }
            }
        }

        Self { days, max }
    }

    /// Closed runs at `threshold`, in scan order (earliest day, earliest bucket).
    fn runs_at(&self, threshold: u32) -> Vec<Run> {
        let mut runs = Vec::new();
        for (day_index, counts) in self.days.iter().enumerate() {
            let mut close = |start: usize, end: usize| {
                if end - start >= MIN_RUN_BUCKETS {
                    runs.push(Run {
                        day_index,
                        start,
                        end,
                    });
                }
            };

            let mut open: Option<usize> = None;
            for (bucket, &count) in counts.iter().enumerate() {
                let hot = count >= threshold;
                match open {
                    Some(start) if hot && bucket - start < MAX_RUN_BUCKETS => {}
                    Some(start) => {
                        close(start, bucket);
                        open = hot.then_some(bucket);
                    }
                    None if hot => open = Some(bucket),
                    None => {}
                }
            }
            if let Some(start) = open {
                close(start, BUCKETS_PER_DAY);
            }
        }
        runs
    }

    /// Scans from the best overlap downward; stops at the first threshold with enough
    /// windows, otherwise keeps the threshold-1 result.
    fn select_runs(&self) -> Vec<Run> {
        let mut runs = Vec::new();
        for threshold in (1..=self.max).rev() {
            runs = self.runs_at(threshold);
            if runs.len() >= TARGET_WINDOWS {
                tracing::debug!(threshold, windows = runs.len(), "Threshold satisfied");
                break;
            }
        }
        runs
    }
}

fn local_instant(timezone: Tz, date: NaiveDate, minutes: u16) -> Option<DateTime<Utc>> {
    let local = date.and_time(NaiveTime::MIN) + Duration::minutes(i64::from(minutes));
    timezone
        .from_local_datetime(&local)
        .earliest()
        .map(|instant| instant.with_timezone(&Utc))
}

/// Participants with a single block on `date` that covers the whole run.
fn available_participants(
    participants: &BTreeMap<UserId, UserAvailability>,
    date: NaiveDate,
    run: Run,
) -> Vec<UserId> {
    participants
        .iter()
        .filter(|(_, availability)| {
            availability.covers(date, run.start_minutes(), run.end_minutes())
        })
        .map(|(user_id, _)| user_id.clone())
        .collect()
}

fn to_window(
    details: &EventDetails,
    dates: &[NaiveDate],
    participants: &BTreeMap<UserId, UserAvailability>,
    run: Run,
) -> Option<TimeWindow> {
    let date = *dates.get(run.day_index)?;
    let start = local_instant(details.timezone, date, run.start_minutes());
    let end = local_instant(details.timezone, date, run.end_minutes());
    let (Some(start), Some(end)) = (start, end) else {
        tracing::warn!(
            %date,
            start_minutes = run.start_minutes(),
            end_minutes = run.end_minutes(),
            timezone = %details.timezone,
            "Candidate window falls in a daylight-saving gap; skipping"
        );
        return None;
    };

    Some(TimeWindow {
        start,
        end,
        participant_ids: available_participants(participants, date, run),
    })
}

/// ## Summary
/// Proposes shared time windows for a populated event, in scan order.
///
/// Returns an empty list for an unpopulated event or one without any availability.
#[tracing::instrument(skip(event), fields(event_id = %event.id, participants = event.user_availability.len()))]
#[must_use]
pub fn find_shared_windows(event: &Event) -> Vec<TimeWindow> {
    let Some(details) = event.details() else {
        return Vec::new();
    };
    let dates: Vec<NaiveDate> = details.local_dates().collect();
    let grid = OverlapGrid::build(&dates, &event.user_availability);

    let windows: Vec<TimeWindow> = grid
        .select_runs()
        .into_iter()
        .filter_map(|run| to_window(details, &dates, &event.user_availability, run))
        .collect();

    tracing::debug!(max_overlap = grid.max, windows = windows.len(), "Aggregation complete");
    windows
}
