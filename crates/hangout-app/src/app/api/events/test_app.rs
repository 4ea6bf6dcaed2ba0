//! In-memory application used by the handler tests.

use std::sync::Arc;

use chrono::{DateTime, TimeDelta, Utc};
use hangout_core::config::{
    DatabaseConfig, DiscordConfig, FrontendConfig, LoggingConfig, PlacesConfig, SchedulerConfig,
    ServerConfig, Settings, StoreBackend, WaitMode,
};
use hangout_core::model::{ClockTime, Event, EventDetails, EventId, UserId};
use hangout_db::store::EventStore;
use hangout_db::store::memory::MemoryEventStore;
use hangout_service::notify::log_only::LogNotifier;
use hangout_service::places::disabled::DisabledPlaces;
use hangout_service::runtime::CoordinatorRuntime;
use salvo::Router;

use crate::bootstrap::build_context;
use crate::config::ConfigHandler;
use crate::runtime_handler::RuntimeHandler;

pub const EVENTS_URL: &str = "http://127.0.0.1:5800/api/events";
pub const CREATOR: &str = "creator";

pub fn settings() -> Settings {
    Settings {
        database: DatabaseConfig {
            backend: StoreBackend::Memory,
            url: None,
            max_connections: 1,
        },
        server: ServerConfig {
            host: "127.0.0.1".to_owned(),
            port: 5800,
        },
        logging: LoggingConfig {
            level: "debug".to_owned(),
        },
        scheduler: SchedulerConfig {
            wait: WaitMode::Deadline,
            fixed_wait_secs: 0,
            claim_ttl_secs: 60,
            rescan_interval_secs: None,
            max_event_days: 31,
            default_timezone: "UTC".to_owned(),
            instance_id: Some("test-node".to_owned()),
        },
        frontend: FrontendConfig {
            base_url: "https://hangouts.test".to_owned(),
        },
        discord: DiscordConfig {
            api_base: "https://discord.invalid/api".to_owned(),
            bot_token: None,
        },
        places: PlacesConfig {
            api_key: None,
            endpoint: "https://places.invalid/nearbysearch".to_owned(),
            radius_meters: 1500,
            place_type: "restaurant".to_owned(),
            max_results: 10,
        },
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

pub fn event_url(id: &str, rest: &str) -> String {
    format!("{EVENTS_URL}/{id}{rest}")
}

pub struct TestApp {
    pub settings: Arc<Settings>,
    pub store: Arc<MemoryEventStore>,
    pub runtime: Arc<CoordinatorRuntime>,
}

impl TestApp {
    pub fn new() -> Self {
        let settings = settings();
        let store = Arc::new(MemoryEventStore::new());
        let ctx = build_context(
            &settings,
            store.clone(),
            Arc::new(LogNotifier),
            Arc::new(DisabledPlaces),
        );
        Self {
            settings: Arc::new(settings),
            store,
            runtime: CoordinatorRuntime::new(ctx),
        }
    }

    pub fn router(&self) -> Router {
        Router::new()
            .hoop(RuntimeHandler {
                runtime: self.runtime.clone(),
            })
            .hoop(ConfigHandler {
                settings: self.settings.clone(),
            })
            .push(crate::app::api::routes())
    }

    pub async fn seed_partial(&self, id: &str) {
        let event = Event::new_partial(EventId::from(id), UserId::from(CREATOR), "guild-1", "channel-1");
        self.store.create_partial_event(&event).await.unwrap();
    }

    /// Seeds a UTC event spanning days 2 to 3 from today, without a running coordinator.
    pub async fn seed_populated(&self, id: &str) -> EventDetails {
        self.seed_partial(id).await;
        let earliest = future_day(2);
        let details = EventDetails {
            title: "Picnic".to_owned(),
            description: String::new(),
            earliest_date: earliest,
            latest_date: future_day(3),
            daily_start: ClockTime::new(10, 0),
            daily_end: ClockTime::new(18, 0),
            location_category: "park".to_owned(),
            timezone: chrono_tz::Tz::UTC,
            switch_to_voting_at: EventDetails::voting_switch_between(Utc::now(), earliest),
        };
        self.store
            .populate_event(&EventId::from(id), &details, &UserId::from(CREATOR))
            .await
            .unwrap();
        details
    }
}
