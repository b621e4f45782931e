//! Coordinates -> IANA zone -> UTC offset.

use async_trait::async_trait;
use chrono::{LocalResult, NaiveDateTime, Offset, TimeZone};
use chrono_tz::Tz;
use reqwest::Client;
use serde::Deserialize;
use tracing::debug;

use super::LocationError;

/// Timezone lookup provider. `Ok(None)` means no zone covers the coordinates.
#[async_trait]
pub trait TimezoneLookup: Send + Sync {
    async fn timezone_at(&self, latitude: f64, longitude: f64) -> Result<Option<String>, LocationError>;
}

/// timeapi.io coordinate lookup (`?latitude=..&longitude=..` -> `{"timeZone": ..}`).
pub struct TimeApiLookup {
    client: Client,
    base_url: String,
}

#[derive(Debug, Deserialize)]
struct ZoneResponse {
    #[serde(rename = "timeZone", default)]
    time_zone: Option<String>,
}

impl TimeApiLookup {
    pub fn new(base_url: &str) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.to_string(),
        }
    }
}

#[async_trait]
impl TimezoneLookup for TimeApiLookup {
    async fn timezone_at(&self, latitude: f64, longitude: f64) -> Result<Option<String>, LocationError> {
        let url = format!("{}?latitude={}&longitude={}", self.base_url, latitude, longitude);
        debug!("Timezone lookup: {}", url);

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| LocationError::TimezoneService(e.to_string()))?;

        let status = response.status();
        if status.is_client_error() {
            return Ok(None);
        }
        if !status.is_success() {
            return Err(LocationError::TimezoneService(format!("provider returned HTTP {}", status)));
        }

        let body: ZoneResponse = response
            .json()
            .await
            .map_err(|e| LocationError::TimezoneService(e.to_string()))?;

        Ok(body.time_zone.filter(|z| !z.trim().is_empty()))
    }
}

/// Offset of `zone` at the local wall-clock reading `local`, in hours.
///
/// Repeated wall-clock readings (DST fall-back) take the earlier offset;
/// skipped readings (spring-forward gap) take the offset in force when the
/// reading is interpreted as UTC. `None` if the zone is unknown.
pub fn utc_offset_hours(zone: &str, local: NaiveDateTime) -> Option<f64> {
    let tz: Tz = zone.parse().ok()?;
    let offset = match tz.offset_from_local_datetime(&local) {
        LocalResult::Single(offset) => offset,
        LocalResult::Ambiguous(earliest, _) => earliest,
        LocalResult::None => tz.offset_from_utc_datetime(&local),
    };
    Some(f64::from(offset.fix().local_minus_utc()) / 3600.0)
}
