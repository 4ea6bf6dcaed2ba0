//! [`EventStore`] kept in process memory.
//!
//! Used by tests and by single-process deployments that can afford to lose state on
//! restart. Every operation takes the map lock once, so each call is atomic.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use hangout_core::model::{
    Event, EventDetails, EventId, Phase, UserAvailability, UserId, UserLocation, UserVotes,
    VoteOptions,
};
use tokio::sync::RwLock;

use super::{EventStore, StoreFuture};
use crate::error::{DbError, DbResult};

#[derive(Debug, Clone)]
struct Claim {
    holder: String,
    expires_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
struct StoredEvent {
    event: Event,
    claim: Option<Claim>,
}

#[derive(Debug, Default)]
pub struct MemoryEventStore {
    events: RwLock<HashMap<EventId, StoredEvent>>,
}

impl MemoryEventStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

fn stored_mut<'m>(
    events: &'m mut HashMap<EventId, StoredEvent>,
    id: &EventId,
) -> DbResult<&'m mut StoredEvent> {
    events
        .get_mut(id)
        .ok_or_else(|| DbError::NotFound(id.clone()))
}

impl EventStore for MemoryEventStore {
    fn get_event<'a>(&'a self, id: &'a EventId) -> StoreFuture<'a, Event> {
        Box::pin(async move {
            self.events
                .read()
                .await
                .get(id)
                .map(|stored| stored.event.clone())
                .ok_or_else(|| DbError::NotFound(id.clone()))
        })
    }

    fn create_partial_event<'a>(&'a self, event: &'a Event) -> StoreFuture<'a, ()> {
        Box::pin(async move {
            let mut events = self.events.write().await;
            if events.contains_key(&event.id) {
                return Err(DbError::DuplicateId(event.id.clone()));
            }
            events.insert(
                event.id.clone(),
                StoredEvent {
                    event: event.clone(),
                    claim: None,
                },
            );
            Ok(())
        })
    }

    fn populate_event<'a>(
        &'a self,
        id: &'a EventId,
        details: &'a EventDetails,
        requester: &'a UserId,
    ) -> StoreFuture<'a, ()> {
        Box::pin(async move {
            let mut events = self.events.write().await;
            let stored = stored_mut(&mut events, id)?;
            if stored.event.is_populated() {
                return Err(DbError::AlreadyPopulated(id.clone()));
            }
            if stored.event.creator_id != *requester {
                return Err(DbError::NotCreator {
                    event: id.clone(),
                    requester: requester.clone(),
                });
            }
            stored.event.details = Some(details.clone());
            Ok(())
        })
    }

    fn put_user_availability_and_location<'a>(
        &'a self,
        id: &'a EventId,
        user_id: &'a UserId,
        availability: &'a UserAvailability,
        location: Option<&'a UserLocation>,
    ) -> StoreFuture<'a, ()> {
        Box::pin(async move {
            let mut events = self.events.write().await;
            let event = &mut stored_mut(&mut events, id)?.event;
            event
                .user_availability
                .insert(user_id.clone(), availability.clone());
            match location {
                Some(location) => {
                    event.user_locations.insert(user_id.clone(), location.clone());
                }
                None => {
                    event.user_locations.remove(user_id);
                }
            }
            Ok(())
        })
    }

    fn put_user_votes<'a>(
        &'a self,
        id: &'a EventId,
        user_id: &'a UserId,
        votes: &'a UserVotes,
    ) -> StoreFuture<'a, ()> {
        Box::pin(async move {
            let mut events = self.events.write().await;
            stored_mut(&mut events, id)?
                .event
                .user_votes
                .insert(user_id.clone(), votes.clone());
            Ok(())
        })
    }

    fn replace_vote_options<'a>(
        &'a self,
        id: &'a EventId,
        options: &'a VoteOptions,
    ) -> StoreFuture<'a, ()> {
        Box::pin(async move {
            let mut events = self.events.write().await;
            stored_mut(&mut events, id)?.event.vote_options = options.clone();
            Ok(())
        })
    }

    fn list_all_events(&self) -> StoreFuture<'_, Vec<Event>> {
        Box::pin(async move {
            let events = self.events.read().await;
            let mut all: Vec<Event> = events.values().map(|stored| stored.event.clone()).collect();
            all.sort_by_key(|event| event.created_at);
            Ok(all)
        })
    }

    fn set_phase<'a>(&'a self, id: &'a EventId, phase: Phase) -> StoreFuture<'a, ()> {
        Box::pin(async move {
            let mut events = self.events.write().await;
            stored_mut(&mut events, id)?.event.phase = phase;
            Ok(())
        })
    }

    fn try_claim<'a>(
        &'a self,
        id: &'a EventId,
        holder: &'a str,
        now: DateTime<Utc>,
        expires_at: DateTime<Utc>,
    ) -> StoreFuture<'a, bool> {
        Box::pin(async move {
            let mut events = self.events.write().await;
            let Some(stored) = events.get_mut(id) else {
                return Ok(false);
            };
            let available = stored
                .claim
                .as_ref()
                .is_none_or(|claim| claim.holder == holder || claim.expires_at < now);
            if available {
                stored.claim = Some(Claim {
                    holder: holder.to_owned(),
                    expires_at,
                });
            }
            Ok(available)
        })
    }

    fn renew_claim<'a>(
        &'a self,
        id: &'a EventId,
        holder: &'a str,
        expires_at: DateTime<Utc>,
    ) -> StoreFuture<'a, bool> {
        Box::pin(async move {
            let mut events = self.events.write().await;
            match events.get_mut(id).and_then(|stored| stored.claim.as_mut()) {
                Some(claim) if claim.holder == holder => {
                    claim.expires_at = expires_at;
                    Ok(true)
                }
                _ => Ok(false),
            }
        })
    }

    fn release_claim<'a>(&'a self, id: &'a EventId, holder: &'a str) -> StoreFuture<'a, ()> {
        Box::pin(async move {
            let mut events = self.events.write().await;
            if let Some(stored) = events.get_mut(id)
                && stored
                    .claim
                    .as_ref()
                    .is_some_and(|claim| claim.holder == holder)
            {
                stored.claim = None;
            }
            Ok(())
        })
    }
}
