use hangout_core::model::{UserId, UserVotes, VoteOptions};
use hangout_service::event;
use salvo::{Depot, Request, Response, handler, http::StatusCode, writing::Json};
use serde::Deserialize;

use super::{event_id, parse_body};
use crate::error::AppResult;
use crate::runtime_handler::get_runtime_from_depot;

/// ## Summary
/// A participant's ballot: one count per candidate, in candidate order.
#[derive(Debug, Deserialize)]
pub struct VoteBody {
    pub user_id: String,
    #[serde(default)]
    pub location_votes: Vec<u32>,
    #[serde(default)]
    pub time_votes: Vec<u32>,
}

/// GET /api/events/{id}/vote_options
#[handler]
pub async fn vote_options(req: &mut Request, depot: &mut Depot, res: &mut Response) {
    match options(req, depot).await {
        Ok(options) => res.render(Json(options)),
        Err(error) => error.render(res),
    }
}

async fn options(req: &Request, depot: &Depot) -> AppResult<VoteOptions> {
    let id = event_id(req)?;
    let runtime = get_runtime_from_depot(depot)?;
    Ok(event::vote_options(runtime.context().store.as_ref(), &id).await?)
}

/// ## Summary
/// POST /api/events/{id}/votes - Replaces the participant's ballot.
///
/// ## Errors
/// 400 outside the voting phase or when a vector length does not match its candidates,
/// 404 for an unknown event.
#[handler]
pub async fn post_votes(req: &mut Request, depot: &mut Depot, res: &mut Response) {
    match post(req, depot).await {
        Ok(()) => {
            res.status_code(StatusCode::CREATED);
        }
        Err(error) => error.render(res),
    }
}

async fn post(req: &mut Request, depot: &Depot) -> AppResult<()> {
    let id = event_id(req)?;
    let body: VoteBody = parse_body(req).await?;
    let runtime = get_runtime_from_depot(depot)?;

    event::put_votes(
        runtime.context().store.as_ref(),
        &id,
        &UserId::new(body.user_id),
        UserVotes {
            location_votes: body.location_votes,
            time_votes: body.time_votes,
        },
    )
    .await?;
    Ok(())
}
