//! Reading extraction from a decoded live-data payload
//!
//! Sections are processed in a fixed order: `common_list`, then the indoor
//! `wh25` block, then `ch_soil`. A field that fails to parse drops only its own
//! reading; extraction never fails as a whole.

use crate::catalog::{self, soil_channel_id, INDOOR_HUMIDITY_ID, INDOOR_TEMP_ID};
use crate::normalize::normalize_id;
use crate::payload::{CommonEntry, IndoorEntry, LivePayload, SoilEntry};
use crate::types::{RawReading, SemanticType, BATTERY_KEY};
use serde_json::Value;
use std::collections::HashMap;

/// Extract every recognisable reading from a raw JSON payload
pub fn extract(payload: &Value) -> Vec<RawReading> {
    extract_payload(&LivePayload::from_value(payload))
}

pub fn extract_payload(payload: &LivePayload) -> Vec<RawReading> {
    let mut readings = Vec::new();
    readings.extend(payload.common_list.iter().filter_map(common_reading));
    for entry in &payload.wh25 {
        readings.extend(indoor_readings(entry));
    }
    readings.extend(payload.ch_soil.iter().filter_map(soil_reading));
    readings
}

fn common_reading(entry: &CommonEntry) -> Option<RawReading> {
    let (raw_id, val) = (entry.id.as_deref()?, entry.val.as_deref()?);
    let id = normalize_id(raw_id);
    let descriptor = catalog::lookup(&id)?;
    let unit = entry.unit.as_deref().unwrap_or_default();
    let value = parse_measure(val, unit)?;

    Some(RawReading {
        id,
        semantic: descriptor.semantic.clone(),
        label: descriptor.label.to_string(),
        value,
        unit: unit.trim().to_string(),
        original: val.to_string(),
        source_label: entry.label.clone().unwrap_or_default(),
        extra: HashMap::new(),
    })
}

fn indoor_readings(entry: &IndoorEntry) -> Vec<RawReading> {
    let mut readings = Vec::with_capacity(2);

    if let Some(text) = entry.intemp.as_deref() {
        if let Ok(value) = text.trim().parse::<f64>() {
            readings.push(RawReading {
                id: INDOOR_TEMP_ID.to_string(),
                semantic: SemanticType::Temp,
                label: "Indoor Temperature".to_string(),
                value,
                unit: entry.unit.as_deref().unwrap_or_default().trim().to_string(),
                original: text.to_string(),
                source_label: "Indoor Temp".to_string(),
                extra: HashMap::new(),
            });
        }
    }

    if let Some(text) = entry.inhumi.as_deref() {
        if let Some(value) = parse_measure(text, "") {
            readings.push(RawReading {
                id: INDOOR_HUMIDITY_ID.to_string(),
                semantic: SemanticType::Humidity,
                label: "Indoor Humidity".to_string(),
                value,
                unit: "%".to_string(),
                original: text.to_string(),
                source_label: "Indoor Humidity".to_string(),
                extra: HashMap::new(),
            });
        }
    }

    readings
}

fn soil_reading(entry: &SoilEntry) -> Option<RawReading> {
    let (channel, humidity) = (entry.channel.as_deref()?.trim(), entry.humidity.as_deref()?);
    let value = parse_measure(humidity, "")?;

    let mut extra = HashMap::new();
    if let Some(battery) = &entry.battery {
        extra.insert(BATTERY_KEY.to_string(), battery.clone());
    }

    Some(RawReading {
        id: soil_channel_id(channel),
        semantic: SemanticType::SoilMoisture(channel.to_string()),
        label: format!("Soil Moisture (Channel {channel})"),
        value,
        unit: "%".to_string(),
        original: humidity.to_string(),
        source_label: format!("Soil Moisture Channel {channel}"),
        extra,
    })
}

/// Strip the declared unit and any percent sign from a value text and parse
/// what remains.
fn parse_measure(text: &str, unit: &str) -> Option<f64> {
    let unit = unit.trim();
    let stripped = if unit.is_empty() {
        text.replace('%', "")
    } else {
        text.replace(unit, "").replace('%', "")
    };
    stripped.trim().parse::<f64>().ok()
}
