mod events;
mod healthcheck;

use salvo::Router;

// Re-export route constants from core
pub use hangout_core::constants::{
    API_ROUTE_COMPONENT, API_ROUTE_PREFIX, EVENTS_ROUTE_COMPONENT, EVENTS_ROUTE_PREFIX,
};

/// ## Summary
/// Constructs the API router. Expects the runtime and configuration handlers to be hooped
/// further up.
#[must_use]
pub fn routes() -> Router {
    Router::with_path(API_ROUTE_COMPONENT)
        .push(healthcheck::routes())
        .push(events::routes())
}
