//! Google Places nearby-search adapter.

use hangout_core::config::PlacesConfig;
use hangout_core::model::{Coordinates, Location};
use reqwest::Url;
use serde::Deserialize;

use super::{PlacesError, PlacesFuture, PlacesLookup, PlacesResult};

const PHOTO_ENDPOINT: &str = "https://maps.googleapis.com/maps/api/place/photo";
const PHOTO_MAX_WIDTH: &str = "400";

#[derive(Debug, Deserialize)]
struct NearbyResponse {
    status: String,
    #[serde(default)]
    error_message: Option<String>,
    #[serde(default)]
    results: Vec<PlaceResult>,
}

#[derive(Debug, Deserialize)]
struct PlaceResult {
    name: String,
    #[serde(default)]
    vicinity: String,
    #[serde(default)]
    rating: Option<f64>,
    #[serde(default)]
    icon: Option<String>,
    #[serde(default)]
    photos: Vec<PlacePhoto>,
    geometry: PlaceGeometry,
}

#[derive(Debug, Deserialize)]
struct PlacePhoto {
    photo_reference: String,
}

#[derive(Debug, Deserialize)]
struct PlaceGeometry {
    location: LatLng,
}

#[derive(Debug, Deserialize)]
struct LatLng {
    lat: f64,
    lng: f64,
}

pub struct GooglePlaces {
    client: reqwest::Client,
    api_key: String,
    endpoint: String,
    radius_meters: u32,
    default_type: String,
    max_results: usize,
}

impl GooglePlaces {
    /// Builds the adapter when an API key is configured.
    #[must_use]
    pub fn from_config(client: reqwest::Client, config: &PlacesConfig) -> Option<Self> {
        config.api_key.as_ref().map(|api_key| Self {
            client,
            api_key: api_key.clone(),
            endpoint: config.endpoint.clone(),
            radius_meters: config.radius_meters,
            default_type: config.place_type.clone(),
            max_results: config.max_results,
        })
    }

    fn search_url(&self, center: Coordinates, category: &str) -> PlacesResult<Url> {
        let place_type = if category.trim().is_empty() {
            self.default_type.as_str()
        } else {
            category.trim()
        };
        Url::parse_with_params(
            &self.endpoint,
            &[
                (
                    "location",
                    format!("{},{}", center.latitude, center.longitude),
                ),
                ("radius", self.radius_meters.to_string()),
                ("type", place_type.to_owned()),
                ("key", self.api_key.clone()),
            ],
        )
        .map_err(|err| PlacesError::Endpoint(err.to_string()))
    }

    fn photo_url(&self, reference: &str) -> PlacesResult<String> {
        Url::parse_with_params(
            PHOTO_ENDPOINT,
            &[
                ("maxwidth", PHOTO_MAX_WIDTH),
                ("photo_reference", reference),
                ("key", self.api_key.as_str()),
            ],
        )
        .map(String::from)
        .map_err(|err| PlacesError::Endpoint(err.to_string()))
    }

    fn to_locations(&self, response: NearbyResponse) -> PlacesResult<Vec<Location>> {
        match response.status.as_str() {
            "OK" => {}
            "ZERO_RESULTS" => return Ok(Vec::new()),
            _ => {
                return Err(PlacesError::Api {
                    status: response.status,
                    message: response.error_message.unwrap_or_default(),
                });
            }
        }

        response
            .results
            .into_iter()
            .take(self.max_results)
            .map(|place| {
                let image = match place.photos.first() {
                    Some(photo) => self.photo_url(&photo.photo_reference)?,
                    None => place.icon.unwrap_or_default(),
                };
                Ok(Location {
                    name: place.name,
                    address: place.vicinity,
                    rating: place.rating.unwrap_or_default(),
                    image,
                    coordinates: Coordinates::new(
                        place.geometry.location.lat,
                        place.geometry.location.lng,
                    ),
                })
            })
            .collect()
    }
}

impl PlacesLookup for GooglePlaces {
    #[tracing::instrument(skip(self), fields(lat = center.latitude, lng = center.longitude))]
    fn find_nearby<'a>(
        &'a self,
        center: Coordinates,
        category: &'a str,
    ) -> PlacesFuture<'a, Vec<Location>> {
        Box::pin(async move {
            let url = self.search_url(center, category)?;
            let response: NearbyResponse = self
                .client
                .get(url)
                .send()
                .await?
                .error_for_status()?
                .json()
                .await?;
            let locations = self.to_locations(response)?;
            tracing::debug!(count = locations.len(), "Nearby places found");
            Ok(locations)
        })
    }
}
