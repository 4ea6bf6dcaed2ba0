use hangout_core::model::{DayAvailability, UserAvailability, UserId, UserLocation};
use hangout_service::event::{self, AvailabilityInfo};
use salvo::{Depot, Request, Response, handler, http::StatusCode, writing::Json};
use serde::Deserialize;

use super::{event_id, parse_body, path_param};
use crate::error::AppResult;
use crate::runtime_handler::get_runtime_from_depot;

/// ## Summary
/// One participant's availability form submission.
#[derive(Debug, Deserialize)]
pub struct AvailabilityBody {
    #[serde(default)]
    pub days: Vec<DayAvailability>,
    #[serde(default)]
    pub location: Option<UserLocation>,
}

/// GET /api/events/{id}/availability/info
#[handler]
pub async fn availability_info(req: &mut Request, depot: &mut Depot, res: &mut Response) {
    match info(req, depot).await {
        Ok(info) => res.render(Json(info)),
        Err(error) => error.render(res),
    }
}

async fn info(req: &Request, depot: &Depot) -> AppResult<AvailabilityInfo> {
    let id = event_id(req)?;
    let runtime = get_runtime_from_depot(depot)?;
    Ok(event::availability_info(runtime.context().store.as_ref(), &id).await?)
}

/// ## Summary
/// PUT /api/events/{id}/availability/{user_id} - Replaces the participant's availability
/// and starting location.
///
/// ## Errors
/// 400 for blocks or dates outside the event, 404 for an unknown event.
#[handler]
pub async fn put_availability(req: &mut Request, depot: &mut Depot, res: &mut Response) {
    match put(req, depot).await {
        Ok(()) => {
            res.status_code(StatusCode::CREATED);
        }
        Err(error) => error.render(res),
    }
}

async fn put(req: &mut Request, depot: &Depot) -> AppResult<()> {
    let id = event_id(req)?;
    let user_id = UserId::new(path_param(req, "user_id")?);
    let body: AvailabilityBody = parse_body(req).await?;
    let runtime = get_runtime_from_depot(depot)?;

    event::put_availability(
        runtime.context().store.as_ref(),
        &id,
        &user_id,
        UserAvailability { days: body.days },
        body.location,
    )
    .await?;
    Ok(())
}
