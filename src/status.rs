//! Device status snapshot and the merge step that detects door openings.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Latest known device state as served on `/api/status`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusSnapshot {
    pub system_on: bool,
    pub distance: f64,
    pub door_open: bool,
    pub photo_count: usize,
}

impl Default for StatusSnapshot {
    fn default() -> Self {
        Self {
            system_on: false,
            distance: 0.0,
            door_open: false,
            photo_count: 0,
        }
    }
}

/// One status line from the device. Every field is optional; absent fields
/// keep their previous value when merged.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TelemetryRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub system_on: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub distance: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub door_open: Option<bool>,
}

impl TelemetryRecord {
    /// Pick the known fields out of a JSON object. A field with the wrong
    /// type is treated as absent; the rest of the record still applies.
    pub fn from_object(object: &Map<String, Value>) -> Self {
        TelemetryRecord {
            system_on: object.get("systemOn").and_then(Value::as_bool),
            distance: object.get("distance").and_then(Value::as_f64),
            door_open: object.get("doorOpen").and_then(Value::as_bool),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum TelemetryError {
    #[error("blank line")]
    Blank,
    #[error("not JSON: {0}")]
    Malformed(#[from] serde_json::Error),
    #[error("JSON but not an object")]
    NotAnObject,
}

/// Parse a single line from the device.
pub fn parse_line(line: &str) -> Result<TelemetryRecord, TelemetryError> {
    let line = line.trim();
    if line.is_empty() {
        return Err(TelemetryError::Blank);
    }
    match serde_json::from_str::<Value>(line)? {
        Value::Object(object) => Ok(TelemetryRecord::from_object(&object)),
        _ => Err(TelemetryError::NotAnObject),
    }
}

/// Overlay `incoming` on `prev`. The returned flag is set only when the door
/// goes from closed to open in this step.
pub fn merge(prev: &StatusSnapshot, incoming: &TelemetryRecord) -> (StatusSnapshot, bool) {
    let triggered = incoming.door_open == Some(true) && !prev.door_open;

    let next = StatusSnapshot {
        system_on: incoming.system_on.unwrap_or(prev.system_on),
        distance: incoming.distance.unwrap_or(prev.distance),
        door_open: incoming.door_open.unwrap_or(prev.door_open),
        photo_count: prev.photo_count,
    };

    (next, triggered)
}
