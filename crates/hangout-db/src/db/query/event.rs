//! Queries against the `event` table.

use chrono::{DateTime, Utc};
use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::db::connection::DbConnection;
use crate::db::enums::EventPhase;
use crate::db::schema::event;
use crate::model::event::{EventRow, NewEventRow, PopulateEventChangeset};

/// ## Summary
/// Loads a single event row by id.
///
/// ## Errors
/// Returns a database error if the query fails.
pub async fn find_event(conn: &mut DbConnection<'_>, id: &str) -> QueryResult<Option<EventRow>> {
    event::table
        .find(id)
        .select(EventRow::as_select())
        .first(conn)
        .await
        .optional()
}

/// ## Summary
/// Loads every event row, oldest first.
///
/// ## Errors
/// Returns a database error if the query fails.
pub async fn list_events(conn: &mut DbConnection<'_>) -> QueryResult<Vec<EventRow>> {
    event::table
        .order(event::created_at.asc())
        .select(EventRow::as_select())
        .load(conn)
        .await
}

/// ## Errors
/// Returns a database error if the insert fails (including a duplicate id).
pub async fn insert_event(conn: &mut DbConnection<'_>, row: &NewEventRow<'_>) -> QueryResult<usize> {
    diesel::insert_into(event::table)
        .values(row)
        .execute(conn)
        .await
}

/// ## Summary
/// Writes creator details, but only on an unpopulated event owned by `creator_id`.
///
/// Returns the number of rows changed: `0` means the guard did not match.
///
/// ## Errors
/// Returns a database error if the update fails.
pub async fn populate_event(
    conn: &mut DbConnection<'_>,
    id: &str,
    creator_id: &str,
    changeset: &PopulateEventChangeset,
) -> QueryResult<usize> {
    diesel::update(
        event::table
            .find(id)
            .filter(event::details.is_null())
            .filter(event::creator_id.eq(creator_id)),
    )
    .set(changeset)
    .execute(conn)
    .await
}

/// ## Errors
/// Returns a database error if the update fails.
pub async fn update_vote_options(
    conn: &mut DbConnection<'_>,
    id: &str,
    options: serde_json::Value,
    now: DateTime<Utc>,
) -> QueryResult<usize> {
    diesel::update(event::table.find(id))
        .set((event::vote_options.eq(options), event::updated_at.eq(now)))
        .execute(conn)
        .await
}

/// ## Errors
/// Returns a database error if the update fails.
pub async fn update_phase(
    conn: &mut DbConnection<'_>,
    id: &str,
    phase: EventPhase,
    now: DateTime<Utc>,
) -> QueryResult<usize> {
    diesel::update(event::table.find(id))
        .set((event::phase.eq(phase), event::updated_at.eq(now)))
        .execute(conn)
        .await
}
