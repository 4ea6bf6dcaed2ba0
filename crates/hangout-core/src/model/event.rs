use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

use super::{
    ClockTime, EventId, Phase, UserAvailability, UserId, UserLocation, UserVotes, VoteOptions,
};

/// Creator-provided details. Present exactly when the event is populated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventDetails {
    pub title: String,
    pub description: String,
    pub earliest_date: DateTime<Utc>,
    pub latest_date: DateTime<Utc>,
    pub daily_start: ClockTime,
    pub daily_end: ClockTime,
    pub location_category: String,
    pub timezone: Tz,
    pub switch_to_voting_at: DateTime<Utc>,
}

impl EventDetails {
    /// ## Summary
    /// Halfway point between `now` and the earliest date. Never earlier than `now`.
    #[must_use]
    pub fn voting_switch_between(now: DateTime<Utc>, earliest_date: DateTime<Utc>) -> DateTime<Utc> {
        if earliest_date <= now {
            return now;
        }
        now + (earliest_date - now) / 2
    }

    /// First local calendar date of the event in its own timezone.
    #[must_use]
    pub fn first_local_date(&self) -> NaiveDate {
        self.earliest_date.with_timezone(&self.timezone).date_naive()
    }

    /// Last local calendar date of the event in its own timezone (inclusive).
    #[must_use]
    pub fn last_local_date(&self) -> NaiveDate {
        self.latest_date.with_timezone(&self.timezone).date_naive()
    }

    /// Inclusive iterator over the local dates the event spans.
    pub fn local_dates(&self) -> impl Iterator<Item = NaiveDate> {
        let last = self.last_local_date();
        self.first_local_date()
            .iter_days()
            .take_while(move |date| *date <= last)
    }

    /// Number of local dates the event spans.
    #[must_use]
    pub fn day_count(&self) -> i64 {
        (self.last_local_date() - self.first_local_date()).num_days() + 1
    }
}

/// A hangout and everything participants submitted for it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    pub id: EventId,
    pub creator_id: UserId,
    pub group_id: String,
    pub channel_id: String,
    pub details: Option<EventDetails>,
    pub phase: Phase,
    #[serde(default)]
    pub vote_options: VoteOptions,
    #[serde(default)]
    pub user_availability: BTreeMap<UserId, UserAvailability>,
    #[serde(default)]
    pub user_locations: BTreeMap<UserId, UserLocation>,
    #[serde(default)]
    pub user_votes: BTreeMap<UserId, UserVotes>,
    pub created_at: DateTime<Utc>,
}

impl Event {
    /// A freshly created, unpopulated event.
    #[must_use]
    pub fn new_partial(
        id: EventId,
        creator_id: UserId,
        group_id: impl Into<String>,
        channel_id: impl Into<String>,
    ) -> Self {
        Self {
            id,
            creator_id,
            group_id: group_id.into(),
            channel_id: channel_id.into(),
            details: None,
            phase: Phase::Scheduling,
            vote_options: VoteOptions::default(),
            user_availability: BTreeMap::new(),
            user_locations: BTreeMap::new(),
            user_votes: BTreeMap::new(),
            created_at: Utc::now(),
        }
    }

    #[must_use]
    pub const fn is_populated(&self) -> bool {
        self.details.is_some()
    }

    #[must_use]
    pub const fn details(&self) -> Option<&EventDetails> {
        self.details.as_ref()
    }
}
