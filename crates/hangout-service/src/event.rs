//! Event operations behind the HTTP and chat surfaces.

use chrono::{DateTime, NaiveDate, Utc};
use chrono_tz::Tz;
use hangout_core::config::{FrontendConfig, SchedulerConfig};
use hangout_core::constants::FRONTEND_SETUP_PAGE;
use hangout_core::model::availability::validate_clock_range;
use hangout_core::model::{
    ClockTime, Event, EventDetails, EventId, Phase, UserAvailability, UserId, UserLocation,
    UserVotes, VoteOptions,
};
use hangout_core::util::short_id::is_valid_identifier;
use hangout_db::store::EventStore;
use serde::{Deserialize, Serialize};

use crate::error::{ServiceError, ServiceResult};
use crate::runtime::{CoordinatorRuntime, StartOutcome};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CreatedEvent {
    pub event_id: EventId,
    pub setup_url: String,
}

/// Creator-supplied details, as submitted from the setup page.
#[derive(Debug, Clone, Deserialize)]
pub struct PopulateEventRequest {
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub earliest_date: DateTime<Utc>,
    pub latest_date: DateTime<Utc>,
    pub start_time_hour: u8,
    pub start_time_minute: u8,
    pub end_time_hour: u8,
    pub end_time_minute: u8,
    #[serde(default)]
    pub location_category: String,
    /// IANA zone name; the configured default when absent.
    #[serde(default)]
    pub timezone: Option<String>,
}

/// What the availability form needs to render.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AvailabilityInfo {
    pub title: String,
    pub description: String,
    pub earliest_date: DateTime<Utc>,
    pub latest_date: DateTime<Utc>,
    pub first_date: NaiveDate,
    pub last_date: NaiveDate,
    pub daily_start: ClockTime,
    pub daily_end: ClockTime,
    pub timezone: String,
}

fn validation(message: impl Into<String>) -> ServiceError {
    ServiceError::ValidationError(message.into())
}

fn require_identifier(field: &str, value: &str) -> ServiceResult<()> {
    if is_valid_identifier(value) {
        Ok(())
    } else {
        Err(validation(format!("{field} is not a valid identifier")))
    }
}

fn require_details(event: &Event) -> ServiceResult<&EventDetails> {
    event
        .details()
        .ok_or_else(|| validation(format!("event {} has not been set up yet", event.id)))
}

/// ## Summary
/// Creates an unpopulated event and returns the creator's setup link.
///
/// ## Errors
/// Validation errors for malformed ids; `DuplicateId` if the generated id collides.
#[tracing::instrument(skip(store, frontend))]
pub async fn create_event(
    store: &dyn EventStore,
    frontend: &FrontendConfig,
    creator_id: UserId,
    group_id: String,
    channel_id: String,
) -> ServiceResult<CreatedEvent> {
    require_identifier("creator_id", creator_id.as_str())?;
    require_identifier("group_id", &group_id)?;
    require_identifier("channel_id", &channel_id)?;

    let event = Event::new_partial(EventId::generate(), creator_id, group_id, channel_id);
    store.create_partial_event(&event).await?;

    let setup_url = frontend.page_url(FRONTEND_SETUP_PAGE, event.id.as_str());
    tracing::info!(event_id = %event.id, "Event created");
    Ok(CreatedEvent {
        event_id: event.id,
        setup_url,
    })
}

/// ## Summary
/// Validates a populate request into [`EventDetails`], fixing the voting switch instant
/// halfway between `now` and the earliest date.
///
/// ## Errors
/// Returns a validation error describing the first problem found.
pub fn build_details(
    now: DateTime<Utc>,
    scheduler: &SchedulerConfig,
    request: PopulateEventRequest,
) -> ServiceResult<EventDetails> {
    if request.title.trim().is_empty() {
        return Err(validation("title must not be empty"));
    }
    if request.earliest_date > request.latest_date {
        return Err(validation("earliest_date must not be after latest_date"));
    }
    if request.earliest_date <= now {
        return Err(validation("earliest_date must be in the future"));
    }

    let daily_start = ClockTime::new(request.start_time_hour, request.start_time_minute);
    let daily_end = ClockTime::new(request.end_time_hour, request.end_time_minute);
    validate_clock_range(daily_start, daily_end)?;

    let zone_name = request
        .timezone
        .as_deref()
        .filter(|zone| !zone.trim().is_empty())
        .unwrap_or(scheduler.default_timezone.as_str());
    let timezone: Tz = zone_name
        .parse()
        .map_err(|_err| validation(format!("unknown timezone {zone_name}")))?;

    let details = EventDetails {
        title: request.title.trim().to_owned(),
        description: request.description,
        earliest_date: request.earliest_date,
        latest_date: request.latest_date,
        daily_start,
        daily_end,
        location_category: request.location_category.trim().to_owned(),
        timezone,
        switch_to_voting_at: EventDetails::voting_switch_between(now, request.earliest_date),
    };

    if details.day_count() > i64::from(scheduler.max_event_days) {
        return Err(validation(format!(
            "event spans {} days; at most {} are allowed",
            details.day_count(),
            scheduler.max_event_days
        )));
    }

    Ok(details)
}

/// ## Summary
/// Stores the creator's details (once) and starts the event's coordinator.
///
/// ## Errors
/// Validation errors, `NotFound`, `Forbidden` for a non-creator, `DuplicateId` when the
/// event was already populated.
#[tracing::instrument(skip(runtime, scheduler, request), fields(event_id = %id, requester = %requester))]
pub async fn populate_event(
    runtime: &CoordinatorRuntime,
    scheduler: &SchedulerConfig,
    id: &EventId,
    requester: &UserId,
    request: PopulateEventRequest,
) -> ServiceResult<EventDetails> {
    let details = build_details(Utc::now(), scheduler, request)?;
    runtime
        .context()
        .store
        .populate_event(id, &details, requester)
        .await?;
    tracing::info!(switch_at = %details.switch_to_voting_at, "Event populated");

    match runtime.start(id.clone()).await {
        Ok(StartOutcome::Started) => {}
        Ok(outcome) => tracing::warn!(?outcome, "Coordinator not started"),
        Err(error) => {
            tracing::error!(%error, "Coordinator not started; the next recovery scan will retry");
        }
    }
    Ok(details)
}

fn validate_availability(
    details: &EventDetails,
    availability: &UserAvailability,
) -> ServiceResult<()> {
    let (first, last) = (details.first_local_date(), details.last_local_date());
    for day in &availability.days {
        if day.date < first || day.date > last {
            return Err(validation(format!(
                "{} is outside the event range {first} to {last}",
                day.date
            )));
        }
        for block in &day.available_blocks {
            block.validate()?;
        }
    }
    Ok(())
}

/// ## Summary
/// Replaces one participant's availability and location.
///
/// ## Errors
/// `NotFound`, or a validation error for an unpopulated event, a day outside the event
/// range, a malformed block, or out-of-range coordinates.
#[tracing::instrument(skip(store, availability, location), fields(event_id = %id, user_id = %user_id))]
pub async fn put_availability(
    store: &dyn EventStore,
    id: &EventId,
    user_id: &UserId,
    availability: UserAvailability,
    location: Option<UserLocation>,
) -> ServiceResult<()> {
    require_identifier("user_id", user_id.as_str())?;
    let event = store.get_event(id).await?;
    let details = require_details(&event)?;
    validate_availability(details, &availability)?;
    if let Some(location) = &location {
        location.coordinates.validate()?;
    }

    store
        .put_user_availability_and_location(id, user_id, &availability, location.as_ref())
        .await?;
    tracing::debug!(days = availability.days.len(), "Availability stored");
    Ok(())
}

/// ## Summary
/// Replaces one participant's votes. Each vector must match its candidate list in length.
///
/// ## Errors
/// `NotFound`, or a validation error when voting is not open or a vector length differs.
#[tracing::instrument(skip(store, votes), fields(event_id = %id, user_id = %user_id))]
pub async fn put_votes(
    store: &dyn EventStore,
    id: &EventId,
    user_id: &UserId,
    votes: UserVotes,
) -> ServiceResult<()> {
    require_identifier("user_id", user_id.as_str())?;
    let event = store.get_event(id).await?;
    require_details(&event)?;
    match event.phase {
        Phase::Scheduling => return Err(validation("voting has not started")),
        Phase::Finalized => return Err(validation("voting has closed")),
        Phase::Voting => {}
    }

    let options = &event.vote_options;
    if votes.location_votes.len() != options.locations.len() {
        return Err(validation(format!(
            "expected {} location votes, got {}",
            options.locations.len(),
            votes.location_votes.len()
        )));
    }
    if votes.time_votes.len() != options.times.len() {
        return Err(validation(format!(
            "expected {} time votes, got {}",
            options.times.len(),
            votes.time_votes.len()
        )));
    }

    store.put_user_votes(id, user_id, &votes).await?;
    Ok(())
}

/// ## Errors
/// `NotFound` when the event does not exist.
#[tracing::instrument(skip(store), fields(event_id = %id))]
pub async fn vote_options(store: &dyn EventStore, id: &EventId) -> ServiceResult<VoteOptions> {
    Ok(store.get_event(id).await?.vote_options)
}

/// ## Errors
/// `NotFound`, or a validation error for an unpopulated event.
#[tracing::instrument(skip(store), fields(event_id = %id))]
pub async fn availability_info(
    store: &dyn EventStore,
    id: &EventId,
) -> ServiceResult<AvailabilityInfo> {
    let event = store.get_event(id).await?;
    let details = require_details(&event)?;
    Ok(AvailabilityInfo {
        title: details.title.clone(),
        description: details.description.clone(),
        earliest_date: details.earliest_date,
        latest_date: details.latest_date,
        first_date: details.first_local_date(),
        last_date: details.last_local_date(),
        daily_start: details.daily_start,
        daily_end: details.daily_end,
        timezone: details.timezone.name().to_owned(),
    })
}
