//! Builds the coordinator context from configuration.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use hangout_core::config::{Settings, StoreBackend};
use hangout_db::db::connection::create_pool;
use hangout_db::db::migrations::run_migrations;
use hangout_db::store::EventStore;
use hangout_db::store::memory::MemoryEventStore;
use hangout_db::store::postgres::PgEventStore;
use hangout_service::coordinator::{CoordinatorContext, WaitPolicy};
use hangout_service::notify::Notifier;
use hangout_service::notify::discord::DiscordNotifier;
use hangout_service::notify::log_only::LogNotifier;
use hangout_service::places::PlacesLookup;
use hangout_service::places::disabled::DisabledPlaces;
use hangout_service::places::google::GooglePlaces;

const HTTP_TIMEOUT: Duration = Duration::from_secs(15);

/// ## Summary
/// Opens the configured event store, running migrations first for PostgreSQL.
///
/// ## Errors
/// Returns an error if the database URL is missing, migrations fail or the pool cannot be built.
pub async fn build_store(settings: &Settings) -> anyhow::Result<Arc<dyn EventStore>> {
    match settings.database.backend {
        StoreBackend::Memory => {
            tracing::warn!("Using the in-memory event store; events are lost on restart");
            Ok(Arc::new(MemoryEventStore::new()))
        }
        StoreBackend::Postgres => {
            let url = settings
                .database
                .url
                .as_deref()
                .context("database.url is required for the postgres backend")?;
            run_migrations(url).await?;
            let pool = create_pool(url, u32::from(settings.database.max_connections)).await?;
            Ok(Arc::new(PgEventStore::new(pool)))
        }
    }
}

/// ## Errors
/// Returns an error if the TLS backend cannot be initialised.
pub fn http_client() -> anyhow::Result<reqwest::Client> {
    Ok(reqwest::Client::builder()
        .user_agent(concat!("hangout/", env!("CARGO_PKG_VERSION")))
        .timeout(HTTP_TIMEOUT)
        .build()?)
}

#[must_use]
pub fn build_notifier(settings: &Settings, client: reqwest::Client) -> Arc<dyn Notifier> {
    match DiscordNotifier::from_config(client, &settings.discord) {
        Some(discord) => Arc::new(discord),
        None => {
            tracing::warn!("No Discord bot token configured; announcements are only logged");
            Arc::new(LogNotifier)
        }
    }
}

#[must_use]
pub fn build_places(settings: &Settings, client: reqwest::Client) -> Arc<dyn PlacesLookup> {
    match GooglePlaces::from_config(client, &settings.places) {
        Some(google) => Arc::new(google),
        None => {
            tracing::warn!("No places API key configured; events get no location candidates");
            Arc::new(DisabledPlaces)
        }
    }
}

/// Configured instance id, or a fresh random one for this process.
#[must_use]
pub fn holder_id(settings: &Settings) -> String {
    settings
        .scheduler
        .instance_id
        .clone()
        .filter(|id| !id.trim().is_empty())
        .unwrap_or_else(|| uuid::Uuid::new_v4().to_string())
}

#[must_use]
pub fn build_context(
    settings: &Settings,
    store: Arc<dyn EventStore>,
    notifier: Arc<dyn Notifier>,
    places: Arc<dyn PlacesLookup>,
) -> CoordinatorContext {
    CoordinatorContext {
        store,
        notifier,
        places,
        frontend: settings.frontend.clone(),
        wait_policy: WaitPolicy::from_config(&settings.scheduler),
        holder_id: holder_id(settings),
        claim_ttl: settings.scheduler.claim_ttl(),
    }
}
