use hangout_core::model::{EventDetails, UserId};
use hangout_service::event::{self, CreatedEvent, PopulateEventRequest};
use salvo::{Depot, Request, Response, handler, http::StatusCode, writing::Json};
use serde::Deserialize;

use super::{event_id, parse_body};
use crate::config::get_config_from_depot;
use crate::error::AppResult;
use crate::runtime_handler::get_runtime_from_depot;

/// ## Summary
/// Create event request payload, sent by the chat command handler.
#[derive(Debug, Deserialize)]
pub struct CreateEventRequest {
    pub creator_id: String,
    pub group_id: String,
    pub channel_id: String,
}

/// ## Summary
/// Populate request payload: the requester plus the event details.
#[derive(Debug, Deserialize)]
pub struct PopulateEventBody {
    pub user_id: String,
    #[serde(flatten)]
    pub details: PopulateEventRequest,
}

/// ## Summary
/// POST /api/events - Creates an unpopulated event and returns the setup link.
///
/// ## Errors
/// 400 for a malformed body or identifiers, 409 on an id collision.
#[handler]
pub async fn create_event(req: &mut Request, depot: &mut Depot, res: &mut Response) {
    match create(req, depot).await {
        Ok(created) => {
            res.status_code(StatusCode::CREATED);
            res.render(Json(created));
        }
        Err(error) => error.render(res),
    }
}

async fn create(req: &mut Request, depot: &Depot) -> AppResult<CreatedEvent> {
    let body: CreateEventRequest = parse_body(req).await?;
    let runtime = get_runtime_from_depot(depot)?;
    let settings = get_config_from_depot(depot)?;

    Ok(event::create_event(
        runtime.context().store.as_ref(),
        &settings.frontend,
        UserId::new(body.creator_id),
        body.group_id,
        body.channel_id,
    )
    .await?)
}

/// ## Summary
/// PUT /api/events/{id} - Stores the creator's details and starts the coordinator.
///
/// ## Errors
/// 400 for invalid details, 403 for a non-creator, 404 for an unknown event, 409 when the
/// event was already populated.
#[handler]
pub async fn populate_event(req: &mut Request, depot: &mut Depot, res: &mut Response) {
    match populate(req, depot).await {
        Ok(details) => {
            res.status_code(StatusCode::CREATED);
            res.render(Json(details));
        }
        Err(error) => error.render(res),
    }
}

async fn populate(req: &mut Request, depot: &Depot) -> AppResult<EventDetails> {
    let id = event_id(req)?;
    let body: PopulateEventBody = parse_body(req).await?;
    let runtime = get_runtime_from_depot(depot)?;
    let settings = get_config_from_depot(depot)?;

    Ok(event::populate_event(
        &runtime,
        &settings.scheduler,
        &id,
        &UserId::new(body.user_id),
        body.details,
    )
    .await?)
}
