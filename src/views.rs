//! Response Shaper
//!
//! JSON projections of a computed chart, one per endpoint.

use serde::Serialize;
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use thiserror::Error;

use crate::chart::adapter::dasha_mapping;
use crate::chart::{Aspect, ChartGraph, DivisionalChart, House, Panchanga};
use crate::services::chart::ComputedChart;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Divisional chart '{requested}' not found. Available: {}", .available.join(", "))]
pub struct DivisionNotFound {
    pub requested: String,
    pub available: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct BirthDataView {
    pub name: String,
    pub datetime: String,
    pub date: String,
    pub time: String,
    pub place: String,
    pub tz_offset: f64,
    pub latitude: f64,
    pub longitude: f64,
    pub ascendant_sign: Option<String>,
    pub moon_sign: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct HousesView<'a> {
    pub houses: &'a [House],
}

#[derive(Debug, Serialize)]
pub struct SummaryView<'a> {
    pub birth_data: BirthDataView,
    pub panchanga: &'a Panchanga,
    pub d1_chart: HousesView<'a>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub charts: Option<BTreeMap<&'a str, &'a DivisionalChart>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub raw_chart: Option<&'a Value>,
}

#[derive(Debug, Serialize)]
pub struct DivisionalView<'a> {
    pub division: String,
    pub houses: &'a [House],
}

#[derive(Debug, Serialize)]
pub struct PlanetEntry<'a> {
    pub name: Option<&'a str>,
    pub sign: Option<&'a str>,
    pub house: Option<u32>,
    pub retrograde: bool,
    pub aspects: &'a [Aspect],
}

#[derive(Debug, Serialize)]
pub struct PlanetsView<'a> {
    pub planets: Vec<PlanetEntry<'a>>,
}

pub fn summary(chart: &ComputedChart, detailed: bool) -> SummaryView<'_> {
    let graph = &chart.graph;
    SummaryView {
        birth_data: BirthDataView {
            name: chart.birth.name.clone(),
            datetime: chart.birth.instant.iso(),
            date: chart.birth.instant.date_string(),
            time: chart.birth.instant.time_string(),
            place: chart.birth.place.clone(),
            tz_offset: chart.location.utc_offset_hours,
            latitude: chart.location.latitude,
            longitude: chart.location.longitude,
            ascendant_sign: graph.ascendant_sign(),
            moon_sign: graph.moon_sign(),
        },
        panchanga: &graph.panchanga,
        d1_chart: HousesView {
            houses: &graph.d1.houses,
        },
        charts: detailed.then(|| {
            graph
                .divisional
                .iter()
                .map(|(k, v)| (k.as_str(), v))
                .collect()
        }),
        raw_chart: detailed.then_some(&graph.raw),
    }
}

/// Canonical division key: trimmed, uppercased, bare digits prefixed with `D`.
pub fn division_key(requested: &str) -> String {
    let key = requested.trim().to_uppercase();
    if !key.is_empty() && key.chars().all(|c| c.is_ascii_digit()) {
        format!("D{}", key)
    } else {
        key
    }
}

/// Keys a client may ask for: every divisional chart, plus D1 if the engine
/// does not list it separately.
pub fn available_divisions(graph: &ChartGraph) -> Vec<String> {
    let mut keys: Vec<String> = graph.divisional.keys().map(|k| k.to_uppercase()).collect();
    if !keys.iter().any(|k| k == "D1") {
        keys.push("D1".to_string());
    }
    keys.sort_by_key(|k| {
        let n = k.trim_start_matches('D').parse::<u32>().unwrap_or(u32::MAX);
        (n, k.clone())
    });
    keys.dedup();
    keys
}

pub fn divisional<'a>(graph: &'a ChartGraph, requested: &str) -> Result<DivisionalView<'a>, DivisionNotFound> {
    let key = division_key(requested);

    let houses = graph
        .divisional
        .iter()
        .find(|(k, _)| k.to_uppercase() == key)
        .map(|(_, chart)| chart.houses.as_slice())
        .or_else(|| (key == "D1").then_some(graph.d1.houses.as_slice()));

    match houses {
        Some(houses) => Ok(DivisionalView { division: key, houses }),
        None => Err(DivisionNotFound {
            requested: key,
            available: available_divisions(graph),
        }),
    }
}

pub fn planets(graph: &ChartGraph) -> PlanetsView<'_> {
    PlanetsView {
        planets: graph
            .d1
            .planets
            .iter()
            .map(|p| PlanetEntry {
                name: p.name.as_deref(),
                sign: p.sign.as_deref(),
                house: p.house,
                retrograde: p.is_retrograde(),
                aspects: &p.aspects,
            })
            .collect(),
    }
}

pub fn dashas(graph: &ChartGraph) -> Map<String, Value> {
    dasha_mapping(graph.dasha.as_ref())
}
