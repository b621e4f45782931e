//! Birth-chart pipeline
//!
//! BirthData -> normalized instant -> resolved location -> engine -> adapted
//! chart. Validation happens before any provider is called.

use serde::Deserialize;
use std::sync::Arc;
use tracing::{debug, info};

use crate::chart::{adapt, ChartGraph};
use crate::engine::{ChartEngine, EngineRequest};
use crate::error::ApiError;
use crate::location::{GeoLocation, LocationResolver};
use crate::normalize::NormalizedInstant;

/// Request body shared by every chart endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct BirthData {
    #[serde(default)]
    pub name: Option<String>,
    pub date: String,
    pub time: String,
    pub place: String,
}

/// Birth data that passed validation.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedBirth {
    pub name: String,
    pub instant: NormalizedInstant,
    pub place: String,
}

impl BirthData {
    pub fn validate(&self, default_name: &str) -> Result<ValidatedBirth, ApiError> {
        let instant = NormalizedInstant::parse(&self.date, &self.time)?;

        let place = self.place.trim();
        if place.is_empty() {
            return Err(ApiError::Validation {
                field: "place",
                message: "Place must not be empty (e.g., 'Karimangalam, India', 'New York, USA')".to_string(),
            });
        }

        let name = self
            .name
            .as_deref()
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .unwrap_or(default_name);

        Ok(ValidatedBirth {
            name: name.to_string(),
            instant,
            place: place.to_string(),
        })
    }
}

/// Everything one request needs for shaping a response.
#[derive(Debug, Clone)]
pub struct ComputedChart {
    pub birth: ValidatedBirth,
    pub location: GeoLocation,
    pub graph: ChartGraph,
}

pub struct ChartService {
    resolver: LocationResolver,
    engine: Arc<dyn ChartEngine>,
    default_name: String,
}

impl ChartService {
    pub fn new(resolver: LocationResolver, engine: Arc<dyn ChartEngine>, default_name: &str) -> Self {
        Self {
            resolver,
            engine,
            default_name: default_name.to_string(),
        }
    }

    pub async fn compute(&self, data: &BirthData) -> Result<ComputedChart, ApiError> {
        let birth = data.validate(&self.default_name)?;
        debug!("Normalized birth input: {} {}", birth.instant.date_string(), birth.instant.time_string());

        let location = self.resolver.resolve(&birth.place, birth.instant.local_datetime()).await?;

        let request = EngineRequest {
            name: birth.name.clone(),
            birth_date: birth.instant.iso(),
            latitude: location.latitude,
            longitude: location.longitude,
            timezone_offset: location.utc_offset_hours,
        };
        let raw = self.engine.calculate(&request).await.map_err(ApiError::Engine)?;
        info!("🪐 Chart computed for {} at {}", birth.place, request.birth_date);

        Ok(ComputedChart {
            birth,
            location,
            graph: adapt(raw),
        })
    }
}
