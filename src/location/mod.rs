//! Location Resolver
//!
//! Place name -> coordinates (geocoding provider) -> IANA zone (timezone
//! provider) -> UTC offset at the birth instant. The offset depends on the
//! instant, not only on the place, so daylight-saving rules are honoured.

pub mod geocoder;
pub mod timezone;

use chrono::NaiveDateTime;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info};

pub use geocoder::{Coordinates, Geocoder, NominatimGeocoder};
pub use timezone::{utc_offset_hours, TimeApiLookup, TimezoneLookup};

#[derive(Debug, Clone, PartialEq, Error)]
pub enum LocationError {
    #[error("Could not find location '{0}'. Please try a more specific name (e.g., 'City, State, Country').")]
    NotFound(String),
    #[error("Geocoding service timed out. Please try again.")]
    Timeout,
    #[error("Geocoding service error: {0}")]
    Service(String),
    #[error("Timezone lookup service error: {0}")]
    TimezoneService(String),
    #[error("Could not determine timezone for '{0}'")]
    TimezoneIndeterminate(String),
}

/// Resolved birth place.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeoLocation {
    pub latitude: f64,
    pub longitude: f64,
    /// Signed fractional hours east of UTC at the birth instant.
    pub utc_offset_hours: f64,
}

#[derive(Clone)]
pub struct LocationResolver {
    geocoder: Arc<dyn Geocoder>,
    timezones: Arc<dyn TimezoneLookup>,
}

impl LocationResolver {
    pub fn new(geocoder: Arc<dyn Geocoder>, timezones: Arc<dyn TimezoneLookup>) -> Self {
        Self { geocoder, timezones }
    }

    pub async fn resolve(&self, place: &str, local: NaiveDateTime) -> Result<GeoLocation, LocationError> {
        let coords = self
            .geocoder
            .geocode(place)
            .await?
            .ok_or_else(|| LocationError::NotFound(place.to_string()))?;
        debug!("Geocoded '{}' to ({}, {})", place, coords.latitude, coords.longitude);

        let zone = self
            .timezones
            .timezone_at(coords.latitude, coords.longitude)
            .await?
            .ok_or_else(|| LocationError::TimezoneIndeterminate(place.to_string()))?;

        let utc_offset_hours = utc_offset_hours(&zone, local)
            .ok_or_else(|| LocationError::TimezoneIndeterminate(place.to_string()))?;

        info!("📍 '{}' -> {} (UTC{:+})", place, zone, utc_offset_hours);

        Ok(GeoLocation {
            latitude: coords.latitude,
            longitude: coords.longitude,
            utc_offset_hours,
        })
    }
}
