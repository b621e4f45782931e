//! Place name -> coordinates.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, warn};

use super::LocationError;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

/// Geocoding provider. `Ok(None)` means the provider answered but found nothing.
#[async_trait]
pub trait Geocoder: Send + Sync {
    async fn geocode(&self, place: &str) -> Result<Option<Coordinates>, LocationError>;
}

/// OpenStreetMap Nominatim search API.
pub struct NominatimGeocoder {
    client: Client,
    base_url: String,
    timeout: Duration,
}

#[derive(Debug, Deserialize)]
struct NominatimPlace {
    lat: String,
    lon: String,
    #[serde(default)]
    display_name: Option<String>,
}

impl NominatimGeocoder {
    pub fn new(base_url: &str, user_agent: &str, timeout: Duration) -> Self {
        Self {
            client: Client::builder()
                .user_agent(user_agent)
                .build()
                .unwrap_or_default(),
            base_url: base_url.trim_end_matches('/').to_string(),
            timeout,
        }
    }
}

fn transport_error(err: reqwest::Error) -> LocationError {
    if err.is_timeout() {
        LocationError::Timeout
    } else {
        LocationError::Service(err.to_string())
    }
}

#[async_trait]
impl Geocoder for NominatimGeocoder {
    async fn geocode(&self, place: &str) -> Result<Option<Coordinates>, LocationError> {
        let url = format!(
            "{}/search?q={}&format=jsonv2&limit=1",
            self.base_url,
            urlencoding::encode(place)
        );
        debug!("Geocoding via Nominatim: {}", place);

        let response = self
            .client
            .get(&url)
            .timeout(self.timeout)
            .send()
            .await
            .map_err(transport_error)?;

        let status = response.status();
        if !status.is_success() {
            warn!("Nominatim answered {} for '{}'", status, place);
            return Err(LocationError::Service(format!("provider returned HTTP {}", status)));
        }

        let places: Vec<NominatimPlace> = response.json().await.map_err(transport_error)?;
        let Some(hit) = places.into_iter().next() else {
            return Ok(None);
        };

        let latitude = hit.lat.trim().parse::<f64>();
        let longitude = hit.lon.trim().parse::<f64>();
        match (latitude, longitude) {
            (Ok(latitude), Ok(longitude)) => {
                if let Some(name) = hit.display_name {
                    debug!("Nominatim match: {}", name);
                }
                Ok(Some(Coordinates { latitude, longitude }))
            }
            _ => Err(LocationError::Service(format!(
                "malformed coordinates ({}, {})",
                hit.lat, hit.lon
            ))),
        }
    }
}
