//! Coordinator leases on the `event` row.
//!
//! A lease is held by `claimed_by` until `claim_expires_at`. Every mutation is a single
//! guarded `UPDATE`, so two processes racing for the same event see exactly one winner.

use chrono::{DateTime, Utc};
use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::db::connection::DbConnection;
use crate::db::schema::event;

/// ## Summary
/// Takes the lease when it is free, expired, or already held by `holder`.
///
/// ## Errors
/// Returns a database error if the update fails.
pub async fn try_claim(
    conn: &mut DbConnection<'_>,
    id: &str,
    holder: &str,
    now: DateTime<Utc>,
    expires_at: DateTime<Utc>,
) -> QueryResult<bool> {
    let updated = diesel::update(
        event::table.find(id).filter(
            event::claimed_by
                .is_null()
                .or(event::claimed_by.eq(holder))
                .or(event::claim_expires_at.lt(now)),
        ),
    )
    .set((
        event::claimed_by.eq(Some(holder)),
        event::claim_expires_at.eq(Some(expires_at)),
    ))
    .execute(conn)
    .await?;

    Ok(updated == 1)
}

/// ## Summary
/// Extends a lease still held by `holder`. Returns `false` if it was lost.
///
/// ## Errors
/// Returns a database error if the update fails.
pub async fn renew_claim(
    conn: &mut DbConnection<'_>,
    id: &str,
    holder: &str,
    expires_at: DateTime<Utc>,
) -> QueryResult<bool> {
    let updated = diesel::update(
        event::table
            .find(id)
            .filter(event::claimed_by.eq(holder)),
    )
    .set(event::claim_expires_at.eq(Some(expires_at)))
    .execute(conn)
    .await?;

    Ok(updated == 1)
}

/// ## Errors
/// Returns a database error if the update fails.
pub async fn release_claim(conn: &mut DbConnection<'_>, id: &str, holder: &str) -> QueryResult<()> {
    diesel::update(
        event::table
            .find(id)
            .filter(event::claimed_by.eq(holder)),
    )
    .set((
        event::claimed_by.eq(None::<String>),
        event::claim_expires_at.eq(None::<DateTime<Utc>>),
    ))
    .execute(conn)
    .await?;

    Ok(())
}
