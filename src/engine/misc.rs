//! Key-coded venue/weather/format facts (`MIS` entries).

use crate::feed::types::MiscEntry;
use serde_json::{Map, Value};
use std::collections::BTreeMap;

pub const VENUE_CODE: i64 = 2;

const DEFAULT_CODES: &[(i64, &str)] = &[
    (1, "round_stage"),
    (2, "venue"),
    (3, "match_format_alt"),
    (9, "temperature_celsius"),
    (11, "country"),
    (21, "weather_condition"),
    (22, "wind_direction_deg"),
    (23, "wind_speed_ms"),
    (24, "wind_description"),
    (25, "pressure_mmhg"),
    (26, "pressure_unit"),
    (27, "humidity_percent"),
    (28, "humidity_unit"),
    (35, "precipitation_percent"),
    (36, "precipitation_unit"),
];

/// Code → field-name lookup. Built once, never mutated afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct MiscCodeTable {
    fields: BTreeMap<i64, String>,
    venue_code: i64,
}

impl Default for MiscCodeTable {
    fn default() -> Self {
        Self::new(
            DEFAULT_CODES.iter().map(|(k, v)| (*k, v.to_string())),
            VENUE_CODE,
        )
    }
}

impl MiscCodeTable {
    pub fn new(fields: impl IntoIterator<Item = (i64, String)>, venue_code: i64) -> Self {
        Self {
            fields: fields.into_iter().collect(),
            venue_code,
        }
    }

    /// Default table with `overrides` layered on top.
    pub fn with_overrides(overrides: impl IntoIterator<Item = (i64, String)>) -> Self {
        let mut table = Self::default();
        table.fields.extend(overrides);
        table
    }

    pub fn with_venue_code(mut self, venue_code: i64) -> Self {
        self.venue_code = venue_code;
        self
    }

    pub fn field(&self, code: i64) -> Option<&str> {
        self.fields.get(&code).map(String::as_str)
    }

    pub fn venue_code(&self) -> i64 {
        self.venue_code
    }
}

/// Project misc entries through `table`, returning the venue separately.
///
/// Unknown or unreadable codes are dropped. A later entry with the same code wins.
pub fn extract_misc_details(
    entries: &[MiscEntry],
    table: &MiscCodeTable,
) -> (Option<String>, Map<String, Value>) {
    let mut venue = None;
    let mut details = Map::new();

    for entry in entries {
        let Some(code) = entry.code() else { continue };
        if code == table.venue_code() {
            venue = value_text(&entry.value);
            continue;
        }
        if let Some(field) = table.field(code) {
            details.insert(field.to_string(), entry.value.clone());
        }
    }

    (venue, details)
}

fn value_text(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) if s.trim().is_empty() => None,
        Value::String(s) => Some(s.trim().to_string()),
        other => Some(other.to_string()),
    }
}
