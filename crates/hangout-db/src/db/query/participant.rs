//! Per-participant availability and vote rows. Each participant owns one row per
//! event in each table, so concurrent writers never touch each other's data.

use diesel::prelude::*;
use diesel::upsert::excluded;
use diesel_async::RunQueryDsl;

use crate::db::connection::DbConnection;
use crate::db::schema::{participant_availability, participant_vote};
use crate::model::participant::{AvailabilityRow, VoteRow};

/// ## Errors
/// Returns a database error if the query fails.
pub async fn availability_for_event(
    conn: &mut DbConnection<'_>,
    event_id: &str,
) -> QueryResult<Vec<AvailabilityRow>> {
    participant_availability::table
        .filter(participant_availability::event_id.eq(event_id))
        .order(participant_availability::user_id.asc())
        .select(AvailabilityRow::as_select())
        .load(conn)
        .await
}

/// ## Errors
/// Returns a database error if the query fails.
pub async fn list_availability(conn: &mut DbConnection<'_>) -> QueryResult<Vec<AvailabilityRow>> {
    participant_availability::table
        .order((
            participant_availability::event_id.asc(),
            participant_availability::user_id.asc(),
        ))
        .select(AvailabilityRow::as_select())
        .load(conn)
        .await
}

/// ## Summary
/// Inserts or fully replaces one participant's availability and location.
///
/// ## Errors
/// Returns a database error if the upsert fails (a foreign key violation means the
/// event does not exist).
pub async fn upsert_availability(
    conn: &mut DbConnection<'_>,
    row: &AvailabilityRow,
) -> QueryResult<usize> {
    diesel::insert_into(participant_availability::table)
        .values(row)
        .on_conflict((
            participant_availability::event_id,
            participant_availability::user_id,
        ))
        .do_update()
        .set((
            participant_availability::days.eq(excluded(participant_availability::days)),
            participant_availability::latitude.eq(excluded(participant_availability::latitude)),
            participant_availability::longitude.eq(excluded(participant_availability::longitude)),
            participant_availability::address.eq(excluded(participant_availability::address)),
            participant_availability::updated_at.eq(excluded(participant_availability::updated_at)),
        ))
        .execute(conn)
        .await
}

/// ## Errors
/// Returns a database error if the query fails.
pub async fn votes_for_event(
    conn: &mut DbConnection<'_>,
    event_id: &str,
) -> QueryResult<Vec<VoteRow>> {
    participant_vote::table
        .filter(participant_vote::event_id.eq(event_id))
        .order(participant_vote::user_id.asc())
        .select(VoteRow::as_select())
        .load(conn)
        .await
}

/// ## Errors
/// Returns a database error if the query fails.
pub async fn list_votes(conn: &mut DbConnection<'_>) -> QueryResult<Vec<VoteRow>> {
    participant_vote::table
        .order((participant_vote::event_id.asc(), participant_vote::user_id.asc()))
        .select(VoteRow::as_select())
        .load(conn)
        .await
}

/// ## Summary
/// Inserts or fully replaces one participant's vote vectors.
///
/// ## Errors
/// Returns a database error if the upsert fails.
pub async fn upsert_vote(conn: &mut DbConnection<'_>, row: &VoteRow) -> QueryResult<usize> {
    diesel::insert_into(participant_vote::table)
        .values(row)
        .on_conflict((participant_vote::event_id, participant_vote::user_id))
        .do_update()
        .set((
            participant_vote::location_votes.eq(excluded(participant_vote::location_votes)),
            participant_vote::time_votes.eq(excluded(participant_vote::time_votes)),
            participant_vote::updated_at.eq(excluded(participant_vote::updated_at)),
        ))
        .execute(conn)
        .await
}
