use hangout_core::model::{Coordinates, Location};

use super::{PlacesFuture, PlacesLookup};

/// Lookup used when no places API key is configured. Never proposes a venue.
#[derive(Debug, Default)]
pub struct DisabledPlaces;

impl PlacesLookup for DisabledPlaces {
    fn find_nearby<'a>(
        &'a self,
        _center: Coordinates,
        _category: &'a str,
    ) -> PlacesFuture<'a, Vec<Location>> {
        Box::pin(async {
            tracing::debug!("Places lookup disabled; no venue candidates");
            Ok(Vec::new())
        })
    }
}
