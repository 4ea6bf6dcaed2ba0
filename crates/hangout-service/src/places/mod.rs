//! Nearby-places collaborator used to propose venues.

use std::future::Future;
use std::pin::Pin;

use hangout_core::model::{Coordinates, Location};
use thiserror::Error;

pub mod disabled;
pub mod google;

#[derive(Error, Debug)]
pub enum PlacesError {
    #[error("Places request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Places service returned {status}: {message}")]
    Api { status: String, message: String },

    #[error("Invalid places endpoint: {0}")]
    Endpoint(String),
}

pub type PlacesResult<T> = std::result::Result<T, PlacesError>;
pub type PlacesFuture<'a, T> = Pin<Box<dyn Future<Output = PlacesResult<T>> + Send + 'a>>;

pub trait PlacesLookup: Send + Sync {
    /// ## Summary
    /// Venues near `center`, in the collaborator's own ranking. `category` narrows the kind
    /// of venue; an empty category uses the lookup's default.
    ///
    /// ## Errors
    /// Returns an error if the lookup fails.
    fn find_nearby<'a>(
        &'a self,
        center: Coordinates,
        category: &'a str,
    ) -> PlacesFuture<'a, Vec<Location>>;
}
