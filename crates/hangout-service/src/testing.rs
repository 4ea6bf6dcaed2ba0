//! Fakes and fixtures for coordinator, runtime and operation tests.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use chrono::{DateTime, TimeDelta, Utc};
use hangout_core::config::{FrontendConfig, SchedulerConfig, WaitMode};
use hangout_core::model::{
    ClockTime, Coordinates, Event, EventDetails, EventId, Location, UserId,
};
use hangout_db::store::EventStore;
use hangout_db::store::memory::MemoryEventStore;

use crate::coordinator::{CoordinatorContext, WaitPolicy};
use crate::notify::{DisplayIdentity, Notifier, NotifyError, NotifyFuture};
use crate::places::{PlacesError, PlacesFuture, PlacesLookup};

pub const CREATOR: &str = "creator";
pub const CHANNEL: &str = "channel-1";
pub const GUILD: &str = "guild-1";

pub fn frontend() -> FrontendConfig {
    FrontendConfig {
        base_url: "https://hangouts.test".to_owned(),
    }
}

pub fn scheduler_config() -> SchedulerConfig {
    SchedulerConfig {
        wait: WaitMode::Deadline,
        fixed_wait_secs: 0,
        claim_ttl_secs: 60,
        rescan_interval_secs: None,
        max_event_days: 31,
        default_timezone: "UTC".to_owned(),
        instance_id: None,
    }
}

/// Midnight UTC `offset_days` from today.
pub fn future_day(offset_days: i64) -> DateTime<Utc> {
    (Utc::now() + TimeDelta::days(offset_days))
        .date_naive()
        .and_hms_opt(0, 0, 0)
        .unwrap()
        .and_utc()
}

pub fn partial_event(id: &str) -> Event {
    Event::new_partial(EventId::from(id), UserId::from(CREATOR), GUILD, CHANNEL)
}

/// A populated UTC event whose voting switch is halfway between now and `earliest`.
pub fn populated_event(id: &str, earliest: DateTime<Utc>, latest: DateTime<Utc>) -> Event {
    let mut event = partial_event(id);
    event.details = Some(EventDetails {
        title: "Dinner".to_owned(),
        description: "Team dinner".to_owned(),
        earliest_date: earliest,
        latest_date: latest,
        daily_start: ClockTime::new(8, 0),
        daily_end: ClockTime::new(23, 0),
        location_category: "restaurant".to_owned(),
        timezone: chrono_tz::Tz::UTC,
        switch_to_voting_at: EventDetails::voting_switch_between(Utc::now(), earliest),
    });
    event
}

pub fn location(name: &str) -> Location {
    Location {
        name: name.to_owned(),
        address: format!("{name} address"),
        rating: 4.0,
        image: String::new(),
        coordinates: Coordinates::new(34.0, -81.0),
    }
}

#[derive(Default)]
pub struct RecordingNotifier {
    messages: Mutex<Vec<(String, String)>>,
    identities: HashMap<UserId, DisplayIdentity>,
    fail_posts: AtomicBool,
    fail_lookups: AtomicBool,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_identity(mut self, user_id: &str, name: &str, color: &str) -> Self {
        self.identities.insert(
            UserId::from(user_id),
            DisplayIdentity {
                name: name.to_owned(),
                color: color.to_owned(),
            },
        );
        self
    }

    pub fn fail_posts(&self) {
        self.fail_posts.store(true, Ordering::SeqCst);
    }

    pub fn fail_lookups(&self) {
        self.fail_lookups.store(true, Ordering::SeqCst);
    }

    pub fn messages(&self) -> Vec<(String, String)> {
        self.messages.lock().unwrap().clone()
    }
}

impl Notifier for RecordingNotifier {
    fn post_message<'a>(&'a self, channel_id: &'a str, text: &'a str) -> NotifyFuture<'a, ()> {
        Box::pin(async move {
            if self.fail_posts.load(Ordering::SeqCst) {
                return Err(NotifyError::Api {
                    status: 503,
                    body: "unavailable".to_owned(),
                });
            }
            self.messages
                .lock()
                .unwrap()
                .push((channel_id.to_owned(), text.to_owned()));
            Ok(())
        })
    }

    fn lookup_display_names<'a>(
        &'a self,
        _group_id: &'a str,
        user_ids: &'a [UserId],
    ) -> NotifyFuture<'a, HashMap<UserId, DisplayIdentity>> {
        Box::pin(async move {
            if self.fail_lookups.load(Ordering::SeqCst) {
                return Err(NotifyError::Api {
                    status: 500,
                    body: "members unavailable".to_owned(),
                });
            }
            Ok(user_ids
                .iter()
                .filter_map(|id| {
                    self.identities
                        .get(id)
                        .map(|identity| (id.clone(), identity.clone()))
                })
                .collect())
        })
    }
}

#[derive(Default)]
pub struct StaticPlaces {
    locations: Vec<Location>,
    centers: Mutex<Vec<Coordinates>>,
    fail: AtomicBool,
}

impl StaticPlaces {
    pub fn new(locations: Vec<Location>) -> Self {
        Self {
            locations,
            centers: Mutex::new(Vec::new()),
            fail: AtomicBool::new(false),
        }
    }

    pub fn fail_searches(&self) {
        self.fail.store(true, Ordering::SeqCst);
    }

    pub fn centers(&self) -> Vec<Coordinates> {
        self.centers.lock().unwrap().clone()
    }
}

impl PlacesLookup for StaticPlaces {
    fn find_nearby<'a>(
        &'a self,
        center: Coordinates,
        _category: &'a str,
    ) -> PlacesFuture<'a, Vec<Location>> {
        Box::pin(async move {
            self.centers.lock().unwrap().push(center);
            if self.fail.load(Ordering::SeqCst) {
                return Err(PlacesError::Api {
                    status: "OVER_QUERY_LIMIT".to_owned(),
                    message: "quota exceeded".to_owned(),
                });
            }
            Ok(self.locations.clone())
        })
    }
}

pub struct Harness {
    pub store: Arc<MemoryEventStore>,
    pub notifier: Arc<RecordingNotifier>,
    pub places: Arc<StaticPlaces>,
}

impl Harness {
    pub fn new(notifier: RecordingNotifier, places: StaticPlaces) -> Self {
        Self {
            store: Arc::new(MemoryEventStore::new()),
            notifier: Arc::new(notifier),
            places: Arc::new(places),
        }
    }

    pub fn context(&self, wait_policy: WaitPolicy, holder_id: &str) -> CoordinatorContext {
        self.context_with_ttl(wait_policy, holder_id, Duration::from_secs(60))
    }

    pub fn context_with_ttl(
        &self,
        wait_policy: WaitPolicy,
        holder_id: &str,
        claim_ttl: Duration,
    ) -> CoordinatorContext {
        CoordinatorContext {
            store: self.store.clone(),
            notifier: self.notifier.clone(),
            places: self.places.clone(),
            frontend: frontend(),
            wait_policy,
            holder_id: holder_id.to_owned(),
            claim_ttl,
        }
    }

    /// Stores `event` through the regular store operations.
    pub async fn seed(&self, event: &Event) {
        let mut partial = event.clone();
        partial.details = None;
        self.store.create_partial_event(&partial).await.unwrap();
        if let Some(details) = &event.details {
            self.store
                .populate_event(&event.id, details, &event.creator_id)
                .await
                .unwrap();
        }
        for (user_id, availability) in &event.user_availability {
            self.store
                .put_user_availability_and_location(
                    &event.id,
                    user_id,
                    availability,
                    event.user_locations.get(user_id),
                )
                .await
                .unwrap();
        }
        for (user_id, votes) in &event.user_votes {
            self.store
                .put_user_votes(&event.id, user_id, votes)
                .await
                .unwrap();
        }
        self.store
            .replace_vote_options(&event.id, &event.vote_options)
            .await
            .unwrap();
        self.store.set_phase(&event.id, event.phase).await.unwrap();
    }

    /// Context whose waits end immediately.
    pub fn instant_context(&self) -> CoordinatorContext {
        self.context(WaitPolicy::Fixed(Duration::ZERO), "test-node")
    }
}
