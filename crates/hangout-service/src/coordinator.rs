//! Per-event lifecycle coordinator: Scheduling → Voting → Finalized.
//!
//! The coordinator owns no event state. It re-reads the event from the store before every
//! phase, writes derived state back, and suspends only in [`EventCoordinator::wait_until`].
//! Any collaborator failure aborts the run; whatever was persisted stays as-is for the
//! recovery scanner.

use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, TimeDelta, Utc};
use hangout_core::config::{FrontendConfig, SchedulerConfig, WaitMode};
use hangout_core::constants::{FRONTEND_AVAILABILITY_PAGE, FRONTEND_VOTE_PAGE};
use hangout_core::model::{
    Attendee, Coordinates, Event, EventDetails, EventId, Location, Phase, TimePair, UserId,
    VoteOptions,
};
use hangout_db::store::EventStore;
use tokio::sync::watch;

use crate::aggregate::find_shared_windows;
use crate::announce;
use crate::error::{ServiceError, ServiceResult};
use crate::notify::{DisplayIdentity, Notifier};
use crate::places::PlacesLookup;
use crate::tally::tally_votes;

/// How long a coordinator sleeps before each phase boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WaitPolicy {
    /// Until the boundary instant.
    Deadline,
    /// A fixed delay regardless of the boundary.
    Fixed(Duration),
}

impl WaitPolicy {
    #[must_use]
    pub const fn from_config(config: &SchedulerConfig) -> Self {
        match config.wait {
            WaitMode::Deadline => Self::Deadline,
            WaitMode::Fixed => Self::Fixed(config.fixed_wait()),
        }
    }

    #[must_use]
    pub fn wait_duration(self, now: DateTime<Utc>, deadline: DateTime<Utc>) -> Duration {
        match self {
            Self::Deadline => (deadline - now).to_std().unwrap_or(Duration::ZERO),
            Self::Fixed(duration) => duration,
        }
    }
}

/// Lease expiry `ttl` after `now`, saturating.
#[must_use]
pub fn lease_expiry(now: DateTime<Utc>, ttl: Duration) -> DateTime<Utc> {
    TimeDelta::from_std(ttl)
        .ok()
        .and_then(|ttl| now.checked_add_signed(ttl))
        .unwrap_or(DateTime::<Utc>::MAX_UTC)
}

/// Collaborators and policy shared by every coordinator of a runtime.
pub struct CoordinatorContext {
    pub store: Arc<dyn EventStore>,
    pub notifier: Arc<dyn Notifier>,
    pub places: Arc<dyn PlacesLookup>,
    pub frontend: FrontendConfig,
    pub wait_policy: WaitPolicy,
    /// Claim holder id of this process.
    pub holder_id: String,
    pub claim_ttl: Duration,
}

impl CoordinatorContext {
    /// Interval between lease renewals while waiting.
    fn renew_interval(&self) -> Duration {
        (self.claim_ttl / 3).max(Duration::from_secs(1))
    }
}

/// How a coordinator run ended.
#[derive(Debug, Clone, PartialEq)]
pub enum CoordinatorOutcome {
    /// The final choice was announced.
    Finalized {
        location: Option<Location>,
        time: TimePair,
    },
    /// Nobody voted, or there was no time to choose from. The event is closed without an
    /// announcement.
    NoDecision,
    /// The event was already closed when the coordinator started.
    AlreadyFinalized,
    /// The event has no details yet.
    NotPopulated,
    /// Process shutdown interrupted a wait.
    Cancelled,
    /// Another holder took over the lease.
    LeaseLost,
}

enum Wait {
    Elapsed,
    Interrupted(CoordinatorOutcome),
}

pub struct EventCoordinator {
    ctx: Arc<CoordinatorContext>,
    event_id: EventId,
    shutdown: watch::Receiver<bool>,
}

impl EventCoordinator {
    #[must_use]
    pub const fn new(
        ctx: Arc<CoordinatorContext>,
        event_id: EventId,
        shutdown: watch::Receiver<bool>,
    ) -> Self {
        Self {
            ctx,
            event_id,
            shutdown,
        }
    }

    async fn load(&self) -> ServiceResult<Event> {
        Ok(self.ctx.store.get_event(&self.event_id).await?)
    }

    /// ## Summary
    /// Drives the event to its end.
    ///
    /// ## Errors
    /// Returns the first store, notifier or places failure. Nothing is rolled back.
    pub async fn run(mut self) -> ServiceResult<CoordinatorOutcome> {
        let event = self.load().await?;
        if event.phase.is_terminal() {
            return Ok(CoordinatorOutcome::AlreadyFinalized);
        }
        let Some(details) = event.details.clone() else {
            return Ok(CoordinatorOutcome::NotPopulated);
        };

        if event.phase == Phase::Scheduling && Utc::now() < details.switch_to_voting_at {
            self.announce_scheduling(&event, &details).await?;
            if let Wait::Interrupted(outcome) =
                self.wait_until(details.switch_to_voting_at).await?
            {
                return Ok(outcome);
            }
        }

        if Utc::now() < details.earliest_date {
            let event = self.load().await?;
            if event.phase.is_terminal() {
                return Ok(CoordinatorOutcome::AlreadyFinalized);
            }
            if event.phase == Phase::Scheduling {
                self.open_voting(&event, &details).await?;
            } else {
                tracing::info!("Voting already open; resuming wait");
            }
            if let Wait::Interrupted(outcome) = self.wait_until(details.earliest_date).await? {
                return Ok(outcome);
            }
        }

        let event = self.load().await?;
        if event.phase.is_terminal() {
            return Ok(CoordinatorOutcome::AlreadyFinalized);
        }
        self.finalize(&event, &details).await
    }

    async fn announce_scheduling(&self, event: &Event, details: &EventDetails) -> ServiceResult<()> {
        let url = self
            .ctx
            .frontend
            .page_url(FRONTEND_AVAILABILITY_PAGE, event.id.as_str());
        let text = announce::scheduling_message(details, &url);
        self.ctx
            .notifier
            .post_message(&event.channel_id, &text)
            .await?;
        tracing::info!(switch_at = %details.switch_to_voting_at, "Scheduling announced");
        Ok(())
    }

    /// Derives candidates from fresh participant data, persists them, and announces voting.
    async fn open_voting(&self, event: &Event, details: &EventDetails) -> ServiceResult<()> {
        let options = VoteOptions {
            times: self.candidate_times(event).await,
            locations: self.candidate_locations(event, details).await?,
        };

        if !event.user_votes.is_empty() && !event.vote_options.is_empty() {
            tracing::warn!(
                votes = event.user_votes.len(),
                "Replacing vote options while votes exist; existing votes are kept"
            );
        }

        self.ctx
            .store
            .replace_vote_options(&event.id, &options)
            .await?;
        self.ctx.store.set_phase(&event.id, Phase::Voting).await?;

        let url = self.ctx.frontend.page_url(FRONTEND_VOTE_PAGE, event.id.as_str());
        self.ctx
            .notifier
            .post_message(&event.channel_id, &announce::voting_message(details, &url))
            .await?;

        tracing::info!(
            times = options.times.len(),
            locations = options.locations.len(),
            "Voting opened"
        );
        Ok(())
    }

    /// Shared windows annotated with display names. Name lookup is best-effort.
    async fn candidate_times(&self, event: &Event) -> Vec<TimePair> {
        let windows = find_shared_windows(event);

        let user_ids: Vec<UserId> = windows
            .iter()
            .flat_map(|window| window.participant_ids.iter().cloned())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();
        let identities = if user_ids.is_empty() {
            HashMap::new()
        } else {
            self.ctx
                .notifier
                .lookup_display_names(&event.group_id, &user_ids)
                .await
                .unwrap_or_else(|error| {
                    tracing::warn!(%error, "Display name lookup failed; using defaults");
                    HashMap::new()
                })
        };

        windows
            .into_iter()
            .map(|window| TimePair {
                start: window.start,
                end: window.end,
                available: window
                    .participant_ids
                    .into_iter()
                    .map(|user_id| attendee(user_id, &identities))
                    .collect(),
            })
            .collect()
    }

    async fn candidate_locations(
        &self,
        event: &Event,
        details: &EventDetails,
    ) -> ServiceResult<Vec<Location>> {
        let Some(center) = Coordinates::midpoint(
            event
                .user_locations
                .values()
                .map(|location| &location.coordinates),
        ) else {
            tracing::info!("No participant locations; skipping places lookup");
            return Ok(Vec::new());
        };

        Ok(self
            .ctx
            .places
            .find_nearby(center, &details.location_category)
            .await?)
    }

    async fn finalize(
        &self,
        event: &Event,
        details: &EventDetails,
    ) -> ServiceResult<CoordinatorOutcome> {
        let options = &event.vote_options;
        let outcome = tally_votes(
            event.user_votes.values(),
            options.locations.len(),
            options.times.len(),
        );

        let Some(time_index) = outcome.and_then(|outcome| outcome.time_index) else {
            if event.user_votes.is_empty() {
                tracing::info!(title = %details.title, "No votes; closing without announcement");
            } else {
                tracing::warn!("No candidate times to choose from; closing without announcement");
            }
            self.ctx.store.set_phase(&event.id, Phase::Finalized).await?;
            return Ok(CoordinatorOutcome::NoDecision);
        };

        let time = options
            .times
            .get(time_index)
            .cloned()
            .ok_or(ServiceError::InvariantViolation("winning time index out of range"))?;
        let location = outcome
            .and_then(|outcome| outcome.location_index)
            .and_then(|index| options.locations.get(index))
            .cloned();

        let text = announce::final_message(details, location.as_ref(), &time);
        self.ctx
            .notifier
            .post_message(&event.channel_id, &text)
            .await?;
        self.ctx.store.set_phase(&event.id, Phase::Finalized).await?;

        tracing::info!(
            start = %time.start,
            location = location.as_ref().map(|location| location.name.as_str()),
            "Event finalized"
        );
        Ok(CoordinatorOutcome::Finalized { location, time })
    }

    /// ## Summary
    /// Suspends until `deadline` (per the wait policy), renewing the lease on the way.
    ///
    /// ## Errors
    /// Returns an error if a lease renewal cannot reach the store.
    async fn wait_until(&mut self, deadline: DateTime<Utc>) -> ServiceResult<Wait> {
        if *self.shutdown.borrow_and_update() {
            return Ok(Wait::Interrupted(CoordinatorOutcome::Cancelled));
        }

        let duration = self.ctx.wait_policy.wait_duration(Utc::now(), deadline);
        tracing::debug!(?duration, %deadline, "Waiting for phase boundary");

        let sleep = tokio::time::sleep(duration);
        tokio::pin!(sleep);
        let every = self.ctx.renew_interval();
        let mut renew = tokio::time::interval_at(tokio::time::Instant::now() + every, every);

        loop {
            tokio::select! {
                () = &mut sleep => return Ok(Wait::Elapsed),
                changed = self.shutdown.changed() => {
                    if changed.is_err() || *self.shutdown.borrow_and_update() {
                        tracing::info!("Shutdown requested; leaving event as persisted");
                        return Ok(Wait::Interrupted(CoordinatorOutcome::Cancelled));
                    }
                }
                _ = renew.tick() => {
                    let expires_at = lease_expiry(Utc::now(), self.ctx.claim_ttl);
                    let held = self
                        .ctx
                        .store
                        .renew_claim(&self.event_id, &self.ctx.holder_id, expires_at)
                        .await?;
                    if !held {
                        tracing::warn!("Lease lost to another holder; stopping");
                        return Ok(Wait::Interrupted(CoordinatorOutcome::LeaseLost));
                    }
                }
            }
        }
    }
}

fn attendee(user_id: UserId, identities: &HashMap<UserId, DisplayIdentity>) -> Attendee {
    match identities.get(&user_id) {
        Some(identity) => Attendee {
            user_id,
            name: identity.name.clone(),
            color: identity.color.clone(),
        },
        None => Attendee::unknown(user_id),
    }
}
