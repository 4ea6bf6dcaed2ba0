//! [`EventStore`] on PostgreSQL.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use diesel::result::{DatabaseErrorKind, Error as DieselError};
use hangout_core::model::{
    Event, EventDetails, EventId, Phase, UserAvailability, UserId, UserLocation, UserVotes,
    VoteOptions,
};

use super::{EventStore, StoreFuture};
use crate::db::DbProvider;
use crate::db::connection::DbPool;
use crate::db::enums::EventPhase;
use crate::db::map::{event_from_rows, votes_to_sql};
use crate::db::query;
use crate::error::{DbError, DbResult};
use crate::model::event::{NewEventRow, PopulateEventChangeset};
use crate::model::participant::{AvailabilityRow, VoteRow};

pub struct PgEventStore {
    pool: DbPool,
}

impl PgEventStore {
    #[must_use]
    pub const fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

/// Maps a missing parent row to `NotFound`.
fn foreign_key_to_not_found(id: &EventId) -> impl FnOnce(DieselError) -> DbError + '_ {
    move |err| match err {
        DieselError::DatabaseError(DatabaseErrorKind::ForeignKeyViolation, _) => {
            DbError::NotFound(id.clone())
        }
        other => DbError::DatabaseError(other),
    }
}

fn ensure_updated(id: &EventId, rows: usize) -> DbResult<()> {
    if rows == 0 {
        return Err(DbError::NotFound(id.clone()));
    }
    Ok(())
}

impl EventStore for PgEventStore {
    #[tracing::instrument(skip(self), fields(event_id = %id))]
    fn get_event<'a>(&'a self, id: &'a EventId) -> StoreFuture<'a, Event> {
        Box::pin(async move {
            let mut conn = self.pool.get_connection().await?;
            let row = query::event::find_event(&mut conn, id.as_str())
                .await?
                .ok_or_else(|| DbError::NotFound(id.clone()))?;
            let availability =
                query::participant::availability_for_event(&mut conn, id.as_str()).await?;
            let votes = query::participant::votes_for_event(&mut conn, id.as_str()).await?;
            event_from_rows(row, availability, votes)
        })
    }

    #[tracing::instrument(skip(self, event), fields(event_id = %event.id))]
    fn create_partial_event<'a>(&'a self, event: &'a Event) -> StoreFuture<'a, ()> {
        Box::pin(async move {
            let row = NewEventRow {
                id: event.id.as_str(),
                creator_id: event.creator_id.as_str(),
                group_id: &event.group_id,
                channel_id: &event.channel_id,
                phase: event.phase.into(),
                vote_options: serde_json::to_value(&event.vote_options)?,
                created_at: event.created_at,
            };

            let mut conn = self.pool.get_connection().await?;
            match query::event::insert_event(&mut conn, &row).await {
                Ok(_) => Ok(()),
                Err(DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _)) => {
                    Err(DbError::DuplicateId(event.id.clone()))
                }
                Err(err) => Err(err.into()),
            }
        })
    }

    #[tracing::instrument(skip(self, details), fields(event_id = %id, requester = %requester))]
    fn populate_event<'a>(
        &'a self,
        id: &'a EventId,
        details: &'a EventDetails,
        requester: &'a UserId,
    ) -> StoreFuture<'a, ()> {
        Box::pin(async move {
            let changeset = PopulateEventChangeset {
                details: Some(serde_json::to_value(details)?),
                earliest_date: Some(details.earliest_date),
                updated_at: Utc::now(),
            };

            let mut conn = self.pool.get_connection().await?;
            let updated =
                query::event::populate_event(&mut conn, id.as_str(), requester.as_str(), &changeset)
                    .await?;
            if updated == 1 {
                return Ok(());
            }

            // The guarded update matched nothing; find out which guard failed.
            let row = query::event::find_event(&mut conn, id.as_str())
                .await?
                .ok_or_else(|| DbError::NotFound(id.clone()))?;
            if row.details.is_some() {
                Err(DbError::AlreadyPopulated(id.clone()))
            } else {
                Err(DbError::NotCreator {
                    event: id.clone(),
                    requester: requester.clone(),
                })
            }
        })
    }

    #[tracing::instrument(
        skip(self, availability, location),
        fields(event_id = %id, user_id = %user_id)
    )]
    fn put_user_availability_and_location<'a>(
        &'a self,
        id: &'a EventId,
        user_id: &'a UserId,
        availability: &'a UserAvailability,
        location: Option<&'a UserLocation>,
    ) -> StoreFuture<'a, ()> {
        Box::pin(async move {
            let row = AvailabilityRow {
                event_id: id.as_str().to_owned(),
                user_id: user_id.as_str().to_owned(),
                days: serde_json::to_value(&availability.days)?,
                latitude: location.map(|loc| loc.coordinates.latitude),
                longitude: location.map(|loc| loc.coordinates.longitude),
                address: location.map(|loc| loc.address.clone()),
                updated_at: Utc::now(),
            };

            let mut conn = self.pool.get_connection().await?;
            query::participant::upsert_availability(&mut conn, &row)
                .await
                .map_err(foreign_key_to_not_found(id))?;
            Ok(())
        })
    }

    #[tracing::instrument(skip(self, votes), fields(event_id = %id, user_id = %user_id))]
    fn put_user_votes<'a>(
        &'a self,
        id: &'a EventId,
        user_id: &'a UserId,
        votes: &'a UserVotes,
    ) -> StoreFuture<'a, ()> {
        Box::pin(async move {
            let row = VoteRow {
                event_id: id.as_str().to_owned(),
                user_id: user_id.as_str().to_owned(),
                location_votes: votes_to_sql(&votes.location_votes)?,
                time_votes: votes_to_sql(&votes.time_votes)?,
                updated_at: Utc::now(),
            };

            let mut conn = self.pool.get_connection().await?;
            query::participant::upsert_vote(&mut conn, &row)
                .await
                .map_err(foreign_key_to_not_found(id))?;
            Ok(())
        })
    }

    #[tracing::instrument(skip(self, options), fields(event_id = %id))]
    fn replace_vote_options<'a>(
        &'a self,
        id: &'a EventId,
        options: &'a VoteOptions,
    ) -> StoreFuture<'a, ()> {
        Box::pin(async move {
            let value = serde_json::to_value(options)?;
            let mut conn = self.pool.get_connection().await?;
            let updated =
                query::event::update_vote_options(&mut conn, id.as_str(), value, Utc::now())
                    .await?;
            ensure_updated(id, updated)
        })
    }

    #[tracing::instrument(skip(self))]
    fn list_all_events(&self) -> StoreFuture<'_, Vec<Event>> {
        Box::pin(async move {
            let mut conn = self.pool.get_connection().await?;
            let rows = query::event::list_events(&mut conn).await?;

            let mut availability: HashMap<String, Vec<AvailabilityRow>> = HashMap::new();
            for row in query::participant::list_availability(&mut conn).await? {
                availability.entry(row.event_id.clone()).or_default().push(row);
            }
            let mut votes: HashMap<String, Vec<VoteRow>> = HashMap::new();
            for row in query::participant::list_votes(&mut conn).await? {
                votes.entry(row.event_id.clone()).or_default().push(row);
            }

            rows.into_iter()
                .map(|row| {
                    let event_availability = availability.remove(&row.id).unwrap_or_default();
                    let event_votes = votes.remove(&row.id).unwrap_or_default();
                    event_from_rows(row, event_availability, event_votes)
                })
                .collect()
        })
    }

    #[tracing::instrument(skip(self), fields(event_id = %id, phase = %phase))]
    fn set_phase<'a>(&'a self, id: &'a EventId, phase: Phase) -> StoreFuture<'a, ()> {
        Box::pin(async move {
            let mut conn = self.pool.get_connection().await?;
            let updated = query::event::update_phase(
                &mut conn,
                id.as_str(),
                EventPhase::from(phase),
                Utc::now(),
            )
            .await?;
            ensure_updated(id, updated)
        })
    }

    #[tracing::instrument(skip(self), fields(event_id = %id))]
    fn try_claim<'a>(
        &'a self,
        id: &'a EventId,
        holder: &'a str,
        now: DateTime<Utc>,
        expires_at: DateTime<Utc>,
    ) -> StoreFuture<'a, bool> {
        Box::pin(async move {
            let mut conn = self.pool.get_connection().await?;
            Ok(query::claim::try_claim(&mut conn, id.as_str(), holder, now, expires_at).await?)
        })
    }

    #[tracing::instrument(skip(self), fields(event_id = %id))]
    fn renew_claim<'a>(
        &'a self,
        id: &'a EventId,
        holder: &'a str,
        expires_at: DateTime<Utc>,
    ) -> StoreFuture<'a, bool> {
        Box::pin(async move {
            let mut conn = self.pool.get_connection().await?;
            Ok(query::claim::renew_claim(&mut conn, id.as_str(), holder, expires_at).await?)
        })
    }

    #[tracing::instrument(skip(self), fields(event_id = %id))]
    fn release_claim<'a>(&'a self, id: &'a EventId, holder: &'a str) -> StoreFuture<'a, ()> {
        Box::pin(async move {
            let mut conn = self.pool.get_connection().await?;
            query::claim::release_claim(&mut conn, id.as_str(), holder).await?;
            Ok(())
        })
    }
}
