//! Announcement text posted to the event's channel.

use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use hangout_core::model::{EventDetails, Location, TimePair};

const DATE_FORMAT: &str = "%m-%d-%Y";
const INSTANT_FORMAT: &str = "%a %b %-d %Y %H:%M %Z";

fn possible_range(details: &EventDetails) -> String {
    format!(
        "Possible dates: {} through {}\nPossible times: {} through {}",
        details.first_local_date().format(DATE_FORMAT),
        details.last_local_date().format(DATE_FORMAT),
        details.daily_start,
        details.daily_end,
    )
}

fn local(instant: DateTime<Utc>, timezone: Tz) -> String {
    instant.with_timezone(&timezone).format(INSTANT_FORMAT).to_string()
}

#[must_use]
pub fn scheduling_message(details: &EventDetails, availability_url: &str) -> String {
    format!(
        "New event created: **{}**\n{}\n\nEnter your availability here: <{availability_url}>",
        details.title,
        possible_range(details),
    )
}

#[must_use]
pub fn voting_message(details: &EventDetails, vote_url: &str) -> String {
    format!(
        "Voting for event **{}** location and time has started: <{vote_url}>\n{}",
        details.title,
        possible_range(details),
    )
}

#[must_use]
pub fn final_message(details: &EventDetails, location: Option<&Location>, time: &TimePair) -> String {
    let place = location
        .map(|location| format!(" at {} ({})", location.name, location.address))
        .unwrap_or_default();
    format!(
        "Voting for event **{}** is now over. The event will take place{place} from {} till {}",
        details.title,
        local(time.start, details.timezone),
        local(time.end, details.timezone),
    )
}
