use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{Coordinates, UserId};

/// Display name used when a participant's chat profile can't be resolved.
pub const DEFAULT_ATTENDEE_NAME: &str = "unknown";
/// Display color used when a participant has no colored role.
pub const DEFAULT_ATTENDEE_COLOR: &str = "#222222";

/// A candidate time range and who can make it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeWindow {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub participant_ids: Vec<UserId>,
}

/// Participant as shown next to a candidate time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attendee {
    pub user_id: UserId,
    pub name: String,
    pub color: String,
}

impl Attendee {
    #[must_use]
    pub fn unknown(user_id: UserId) -> Self {
        Self {
            user_id,
            name: DEFAULT_ATTENDEE_NAME.to_owned(),
            color: DEFAULT_ATTENDEE_COLOR.to_owned(),
        }
    }
}

/// A candidate time as published to voters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimePair {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub available: Vec<Attendee>,
}

/// A candidate venue.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub name: String,
    pub address: String,
    pub rating: f64,
    pub image: String,
    pub coordinates: Coordinates,
}

/// Ordered candidate lists. Vote vectors are positional against these.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct VoteOptions {
    #[serde(default)]
    pub locations: Vec<Location>,
    #[serde(default)]
    pub times: Vec<TimePair>,
}

impl VoteOptions {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.locations.is_empty() && self.times.is_empty()
    }
}

/// One participant's scores, positional against [`VoteOptions`].
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct UserVotes {
    #[serde(default)]
    pub location_votes: Vec<u32>,
    #[serde(default)]
    pub time_votes: Vec<u32>,
}
