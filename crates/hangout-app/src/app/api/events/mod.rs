//! `/api/events` handlers. Each handler is a thin shell over `hangout_service::event`.

mod availability;
mod setup;
mod votes;

#[cfg(test)]
mod test_app;

use hangout_core::constants::EVENTS_ROUTE_COMPONENT;
use hangout_core::model::EventId;
use salvo::{Request, Router};
use serde::de::DeserializeOwned;

use crate::error::{AppError, AppResult};

#[must_use]
pub fn routes() -> Router {
    Router::with_path(EVENTS_ROUTE_COMPONENT)
        .post(setup::create_event)
        .push(
            Router::with_path("{id}")
                .put(setup::populate_event)
                .push(Router::with_path("availability/info").get(availability::availability_info))
                .push(Router::with_path("availability/{user_id}").put(availability::put_availability))
                .push(Router::with_path("vote_options").get(votes::vote_options))
                .push(Router::with_path("votes").post(votes::post_votes)),
        )
}

fn path_param(req: &Request, name: &str) -> AppResult<String> {
    req.param::<String>(name)
        .ok_or_else(|| AppError::BadRequest(format!("missing path parameter {name}")))
}

fn event_id(req: &Request) -> AppResult<EventId> {
    path_param(req, "id").map(EventId::new)
}

async fn parse_body<T: DeserializeOwned>(req: &mut Request) -> AppResult<T> {
    req.parse_json::<T>().await.map_err(|error| {
        tracing::debug!(error = ?error, "Failed to parse request body");
        AppError::BadRequest("invalid request body".to_owned())
    })
}
