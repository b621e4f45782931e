//! Maps the engine's JSON serialization onto the fixed schema.
//!
//! Field names are accepted in snake_case and camelCase. Sign and body
//! values may arrive either as plain strings or as objects carrying a
//! `name`. Anything missing or of the wrong shape becomes `None` / empty.

use serde_json::{Map, Value};
use std::collections::BTreeMap;

use super::{Aspect, ChartGraph, DivisionalChart, House, Occupant, Panchanga, Planet, PrimaryChart};

const D1_KEYS: &[&str] = &["d1_chart", "d1Chart", "rasi_chart", "rasiChart"];
const DIVISIONAL_KEYS: &[&str] = &["divisional_charts", "divisionalCharts"];
const PANCHANGA_KEYS: &[&str] = &["panchanga", "panchang"];
const DASHA_KEYS: &[&str] = &["dashas", "vimshottari_dasha", "vimshottariDasha", "dasha"];
const BODY_KEYS: &[&str] = &["celestial_body", "celestialBody", "planet", "name"];
const MOTION_KEYS: &[&str] = &["motion_type", "motionType", "motion"];
const ASPECT_KIND_KEYS: &[&str] = &["type", "aspect_type", "aspectType", "kind", "name"];
const ASPECT_TARGET_KEYS: &[&str] = &["target", "to", "planet", "celestial_body", "celestialBody", "house"];

pub fn adapt(raw: Value) -> ChartGraph {
    let d1 = field(&raw, D1_KEYS).map(primary_chart).unwrap_or_default();

    let divisional = field(&raw, DIVISIONAL_KEYS)
        .and_then(Value::as_object)
        .map(|charts| {
            charts
                .iter()
                .map(|(key, chart)| (key.clone(), divisional_chart(chart)))
                .collect::<BTreeMap<_, _>>()
        })
        .unwrap_or_default();

    let panchanga = field(&raw, PANCHANGA_KEYS).map(panchanga).unwrap_or_default();
    let dasha = field(&raw, DASHA_KEYS).cloned();

    ChartGraph {
        d1,
        divisional,
        panchanga,
        dasha,
        raw,
    }
}

/// First non-null value under any of `names`.
fn field<'a>(value: &'a Value, names: &[&str]) -> Option<&'a Value> {
    let obj = value.as_object()?;
    names.iter().filter_map(|n| obj.get(*n)).find(|v| !v.is_null())
}

/// Display label of a sign or body: strings as-is, objects by their `name`.
fn label(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Object(obj) => ["name", "value", "label"]
            .iter()
            .filter_map(|k| obj.get(*k))
            .find_map(|v| label(Some(v))),
        Value::Null | Value::Array(_) => None,
    }
}

fn number(value: Option<&Value>) -> Option<u32> {
    match value? {
        Value::Number(n) => n.as_u64().and_then(|n| u32::try_from(n).ok()),
        Value::String(s) => s.trim().parse().ok(),
        Value::Object(obj) => number(obj.get("number")),
        _ => None,
    }
}

fn items(value: Option<&Value>) -> &[Value] {
    value.and_then(Value::as_array).map(Vec::as_slice).unwrap_or(&[])
}

fn primary_chart(value: &Value) -> PrimaryChart {
    PrimaryChart {
        houses: items(field(value, &["houses"])).iter().map(house).collect(),
        planets: items(field(value, &["planets"])).iter().map(planet).collect(),
    }
}

fn divisional_chart(value: &Value) -> DivisionalChart {
    let houses = match value {
        Value::Array(houses) => houses.as_slice(),
        other => items(field(other, &["houses"])),
    };
    DivisionalChart {
        houses: houses.iter().map(house).collect(),
    }
}

fn house(value: &Value) -> House {
    House {
        number: number(field(value, &["number", "house_number", "houseNumber"])),
        sign: label(field(value, &["sign"])),
        occupants: items(field(value, &["occupants"])).iter().map(occupant).collect(),
    }
}

fn occupant(value: &Value) -> Occupant {
    if let Value::String(name) = value {
        return Occupant {
            planet: Some(name.clone()),
            sign: None,
        };
    }
    Occupant {
        planet: label(field(value, BODY_KEYS)),
        sign: label(field(value, &["sign"])),
    }
}

fn planet(value: &Value) -> Planet {
    Planet {
        name: label(field(value, BODY_KEYS)),
        sign: label(field(value, &["sign"])),
        house: number(field(value, &["house", "house_number", "houseNumber"])),
        motion_type: label(field(value, MOTION_KEYS)),
        aspects: aspects(field(value, &["aspects"])),
    }
}

fn aspects(value: Option<&Value>) -> Vec<Aspect> {
    match value {
        Some(Value::Array(list)) => list.iter().filter_map(aspect).collect(),
        // {"gives": [...], "receives": [...]}: only aspects cast by the planet.
        Some(Value::Object(obj)) => aspects(obj.get("gives")),
        _ => Vec::new(),
    }
}

fn aspect(value: &Value) -> Option<Aspect> {
    match value {
        Value::String(target) => Some(Aspect {
            kind: None,
            target: Some(target.clone()),
        }),
        Value::Object(_) => Some(Aspect {
            kind: label(field(value, ASPECT_KIND_KEYS)),
            target: label(field(value, ASPECT_TARGET_KEYS)),
        }),
        _ => None,
    }
}

fn panchanga(value: &Value) -> Panchanga {
    let get = |names: &[&str]| field(value, names).cloned().unwrap_or(Value::Null);
    Panchanga {
        tithi: get(&["tithi"]),
        nakshatra: get(&["nakshatra"]),
        yoga: get(&["yoga"]),
        karana: get(&["karana"]),
        vaara: get(&["vaara", "vaar", "vara"]),
    }
}

/// Dasha periods as a JSON object: objects pass through, lists are wrapped
/// under `periods`, anything else is stringified under `raw`.
pub fn dasha_mapping(dasha: Option<&Value>) -> Map<String, Value> {
    match dasha {
        None | Some(Value::Null) => Map::new(),
        Some(Value::Object(obj)) => obj.clone(),
        Some(Value::Array(periods)) => {
            let mut map = Map::new();
            map.insert("periods".to_string(), Value::Array(periods.clone()));
            map
        }
        Some(Value::String(s)) => {
            let mut map = Map::new();
            map.insert("raw".to_string(), Value::String(s.clone()));
            map
        }
        Some(other) => {
            let mut map = Map::new();
            map.insert("raw".to_string(), Value::String(other.to_string()));
            map
        }
    }
}
