use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult};

/// A point on the globe in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinates {
    #[must_use]
    pub const fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// ## Summary
    /// Checks that both components are finite and within their valid ranges.
    ///
    /// ## Errors
    /// Returns a validation error for out-of-range or non-finite values.
    pub fn validate(&self) -> CoreResult<()> {
        if !self.latitude.is_finite() || !(-90.0..=90.0).contains(&self.latitude) {
            return Err(CoreError::ValidationError(format!(
                "latitude {} is outside -90..=90",
                self.latitude
            )));
        }
        if !self.longitude.is_finite() || !(-180.0..=180.0).contains(&self.longitude) {
            return Err(CoreError::ValidationError(format!(
                "longitude {} is outside -180..=180",
                self.longitude
            )));
        }
        Ok(())
    }

    /// Arithmetic mean of a set of points, `None` when the set is empty.
    pub fn midpoint<'a>(points: impl IntoIterator<Item = &'a Self>) -> Option<Self> {
        let (count, lat, lng) = points
            .into_iter()
            .fold((0u32, 0.0, 0.0), |(count, lat, lng), point| {
                (count + 1, lat + point.latitude, lng + point.longitude)
            });
        (count > 0).then(|| Self::new(lat / f64::from(count), lng / f64::from(count)))
    }
}

/// Where a participant is starting from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserLocation {
    #[serde(flatten)]
    pub coordinates: Coordinates,
    #[serde(default)]
    pub address: String,
}
