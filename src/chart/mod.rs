//! Fixed schema for what the service reads out of the chart engine.
//!
//! The engine's output is not guaranteed field-by-field, so every field here
//! is optional or defaults to empty. `adapter::adapt` is the only place that
//! touches the engine's raw JSON.

pub mod adapter;

use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;

pub use adapter::adapt;

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Occupant {
    pub planet: Option<String>,
    pub sign: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct House {
    #[serde(rename = "house_number")]
    pub number: Option<u32>,
    pub sign: Option<String>,
    pub occupants: Vec<Occupant>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Aspect {
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub target: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Planet {
    pub name: Option<String>,
    pub sign: Option<String>,
    pub house: Option<u32>,
    pub motion_type: Option<String>,
    pub aspects: Vec<Aspect>,
}

impl Planet {
    pub fn is_retrograde(&self) -> bool {
        self.motion_type
            .as_deref()
            .is_some_and(|m| m.eq_ignore_ascii_case("retrograde"))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DivisionalChart {
    pub houses: Vec<House>,
}

/// Rasi (D1) chart.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PrimaryChart {
    pub houses: Vec<House>,
    pub planets: Vec<Planet>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Panchanga {
    pub tithi: Value,
    pub nakshatra: Value,
    pub yoga: Value,
    pub karana: Value,
    pub vaara: Value,
}

/// Adapted engine output for one birth instant. `raw` keeps the engine's own
/// serialization untouched for the detailed view.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChartGraph {
    pub d1: PrimaryChart,
    pub divisional: BTreeMap<String, DivisionalChart>,
    pub panchanga: Panchanga,
    pub dasha: Option<Value>,
    pub raw: Value,
}

impl ChartGraph {
    /// Sign of the first house.
    pub fn ascendant_sign(&self) -> Option<String> {
        self.d1.houses.first().and_then(|h| h.sign.clone())
    }

    /// Sign of the planet named Moon, else of the engine's second planet entry.
    pub fn moon_sign(&self) -> Option<String> {
        self.d1
            .planets
            .iter()
            .find(|p| p.name.as_deref().is_some_and(|n| n.eq_ignore_ascii_case("moon")))
            .or_else(|| self.d1.planets.get(1))
            .and_then(|p| p.sign.clone())
    }
}
