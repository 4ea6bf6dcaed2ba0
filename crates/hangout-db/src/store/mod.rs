//! The event store seam.

use std::future::Future;
use std::pin::Pin;

use chrono::{DateTime, Utc};
use hangout_core::model::{
    Event, EventDetails, EventId, Phase, UserAvailability, UserId, UserLocation, UserVotes,
    VoteOptions,
};

use crate::error::DbResult;

pub mod memory;
pub mod postgres;


pub type StoreFuture<'a, T> = Pin<Box<dyn Future<Output = DbResult<T>> + Send + 'a>>;

/// Persistent owner of every event and its participant data.
///
/// The store is the single source of truth: coordinators re-read through it before each
/// phase and hold no authoritative copy of their own.
pub trait EventStore: Send + Sync {
    /// ## Errors
    /// `DbError::NotFound` when the id is unknown.
    fn get_event<'a>(&'a self, id: &'a EventId) -> StoreFuture<'a, Event>;

    /// ## Errors
    /// `DbError::DuplicateId` when an event with the same id exists.
    fn create_partial_event<'a>(&'a self, event: &'a Event) -> StoreFuture<'a, ()>;

    /// ## Summary
    /// Stores creator details on an unpopulated event. Identity fields, participant data,
    /// phase and vote options are left untouched. The check and the write are atomic.
    ///
    /// ## Errors
    /// `DbError::NotFound`, `DbError::AlreadyPopulated`, or `DbError::NotCreator`.
    fn populate_event<'a>(
        &'a self,
        id: &'a EventId,
        details: &'a EventDetails,
        requester: &'a UserId,
    ) -> StoreFuture<'a, ()>;

    /// ## Summary
    /// Fully replaces one participant's availability, and their location when given.
    ///
    /// ## Errors
    /// `DbError::NotFound` when the event does not exist.
    fn put_user_availability_and_location<'a>(
        &'a self,
        id: &'a EventId,
        user_id: &'a UserId,
        availability: &'a UserAvailability,
        location: Option<&'a UserLocation>,
    ) -> StoreFuture<'a, ()>;

    /// ## Errors
    /// `DbError::NotFound` when the event does not exist.
    fn put_user_votes<'a>(
        &'a self,
        id: &'a EventId,
        user_id: &'a UserId,
        votes: &'a UserVotes,
    ) -> StoreFuture<'a, ()>;

    /// ## Errors
    /// `DbError::NotFound` when the event does not exist.
    fn replace_vote_options<'a>(
        &'a self,
        id: &'a EventId,
        options: &'a VoteOptions,
    ) -> StoreFuture<'a, ()>;

    /// ## Errors
    /// Returns an error if the backend cannot be read.
    fn list_all_events(&self) -> StoreFuture<'_, Vec<Event>>;

    /// ## Errors
    /// `DbError::NotFound` when the event does not exist.
    fn set_phase<'a>(&'a self, id: &'a EventId, phase: Phase) -> StoreFuture<'a, ()>;

    /// ## Summary
    /// Compare-and-set on the coordinator lease. Succeeds when the lease is free, expired
    /// at `now`, or already held by `holder`; the lease then runs until `expires_at`.
    ///
    /// ## Errors
    /// Returns an error if the backend cannot be written.
    fn try_claim<'a>(
        &'a self,
        id: &'a EventId,
        holder: &'a str,
        now: DateTime<Utc>,
        expires_at: DateTime<Utc>,
    ) -> StoreFuture<'a, bool>;

    /// ## Summary
    /// Extends a lease still held by `holder`. `false` means the lease was lost.
    ///
    /// ## Errors
    /// Returns an error if the backend cannot be written.
    fn renew_claim<'a>(
        &'a self,
        id: &'a EventId,
        holder: &'a str,
        expires_at: DateTime<Utc>,
    ) -> StoreFuture<'a, bool>;

    /// Drops the lease if `holder` still has it.
    ///
    /// ## Errors
    /// Returns an error if the backend cannot be written.
    fn release_claim<'a>(&'a self, id: &'a EventId, holder: &'a str) -> StoreFuture<'a, ()>;
}
