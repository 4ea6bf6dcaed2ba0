//! DB <-> domain mapping helpers.

use std::collections::BTreeMap;

use hangout_core::error::CoreError;
use hangout_core::model::{
    Coordinates, Event, EventDetails, EventId, UserAvailability, UserId, UserLocation, UserVotes,
    VoteOptions,
};

use crate::error::{DbError, DbResult};
use crate::model::event::EventRow;
use crate::model::participant::{AvailabilityRow, VoteRow};

/// ## Summary
/// Assembles a domain [`Event`] from its row and the participant rows that belong to it.
///
/// ## Errors
/// Returns an error if a stored JSON document or vote vector cannot be decoded.
pub fn event_from_rows(
    row: EventRow,
    availability: Vec<AvailabilityRow>,
    votes: Vec<VoteRow>,
) -> DbResult<Event> {
    let details = row
        .details
        .map(serde_json::from_value::<EventDetails>)
        .transpose()?;
    let vote_options = serde_json::from_value::<VoteOptions>(row.vote_options)?;

    let mut user_availability = BTreeMap::new();
    let mut user_locations = BTreeMap::new();
    for participant in availability {
        let user_id = UserId::new(participant.user_id);
        if let (Some(latitude), Some(longitude)) = (participant.latitude, participant.longitude) {
            user_locations.insert(
                user_id.clone(),
                UserLocation {
                    coordinates: Coordinates::new(latitude, longitude),
                    address: participant.address.unwrap_or_default(),
                },
            );
        }
        let days = serde_json::from_value(participant.days)?;
        user_availability.insert(user_id, UserAvailability { days });
    }

    let mut user_votes = BTreeMap::new();
    for vote in votes {
        user_votes.insert(
            UserId::new(vote.user_id),
            UserVotes {
                location_votes: votes_from_sql(&vote.location_votes)?,
                time_votes: votes_from_sql(&vote.time_votes)?,
            },
        );
    }

    Ok(Event {
        id: EventId::new(row.id),
        creator_id: UserId::new(row.creator_id),
        group_id: row.group_id,
        channel_id: row.channel_id,
        details,
        phase: row.phase.into(),
        vote_options,
        user_availability,
        user_locations,
        user_votes,
        created_at: row.created_at,
    })
}

/// ## Summary
/// Converts a vote vector into the `INTEGER[]` column representation.
///
/// ## Errors
/// Returns an error if a weight does not fit into a signed 32-bit integer.
pub fn votes_to_sql(votes: &[u32]) -> DbResult<Vec<i32>> {
    votes
        .iter()
        .map(|&weight| {
            i32::try_from(weight).map_err(|_err| {
                DbError::from(CoreError::InvalidInput(format!(
                    "vote weight {weight} is too large"
                )))
            })
        })
        .collect()
}

fn votes_from_sql(votes: &[i32]) -> DbResult<Vec<u32>> {
    votes
        .iter()
        .map(|&weight| {
            u32::try_from(weight).map_err(|_err| {
                DbError::from(CoreError::InvariantViolation(
                    "stored vote weight is negative",
                ))
            })
        })
        .collect()
}
