//! Resolution of one cycle's readings against the assignment model

use crate::assignment::AssignmentModel;
use crate::types::{
    BatteryStatus, LogicalSensorSnapshot, RawReading, SemanticType, SensorSnapshot, SensorValue,
    SoilSnapshot,
};
use crate::units::{vapor_pressure_deficit, TemperatureScale};
use chrono::{DateTime, Utc};
use std::collections::{BTreeMap, HashMap};

/// Readings keyed by canonical id. A later reading for the same id replaces
/// an earlier one.
pub fn index_readings(readings: &[RawReading]) -> HashMap<&str, &RawReading> {
    let mut index = HashMap::with_capacity(readings.len());
    for reading in readings {
        index.insert(reading.id.as_str(), reading);
    }
    index
}

/// Build the snapshot for one cycle. Pure: the result depends only on the
/// readings, the model, and the timestamp passed in.
pub fn resolve(
    readings: &[RawReading],
    assignment: &AssignmentModel,
    timestamp: DateTime<Utc>,
) -> SensorSnapshot {
    let index = index_readings(readings);

    let sensors = assignment
        .sensors
        .iter()
        .map(|sensor| {
            let values: BTreeMap<SemanticType, Option<SensorValue>> = sensor
                .bindings
                .iter()
                .map(|(semantic, id)| {
                    let value = index.get(id.as_str()).map(|r| SensorValue {
                        value: r.value,
                        unit: r.unit.clone(),
                    });
                    (semantic.clone(), value)
                })
                .collect();
            let vpd = derive_vpd(&values);
            LogicalSensorSnapshot {
                name: sensor.name.clone(),
                values,
                vpd,
            }
        })
        .collect();

    let soil = assignment
        .soil
        .iter()
        .map(|binding| match index.get(binding.id.as_str()) {
            Some(reading) => SoilSnapshot {
                channel: binding.channel.clone(),
                label: binding.display_label(),
                moisture: Some(reading.value),
                battery: BatteryStatus::from_code(reading.battery()),
            },
            None => SoilSnapshot {
                channel: binding.channel.clone(),
                label: binding.display_label(),
                moisture: None,
                battery: BatteryStatus::Unavailable,
            },
        })
        .collect();

    let missing = assignment
        .bound_ids()
        .into_iter()
        .filter(|id| !index.contains_key(id))
        .map(str::to_string)
        .collect();

    SensorSnapshot {
        timestamp,
        sensors,
        soil,
        missing,
    }
}

/// Temperatures are taken as Fahrenheit unless the reading says Celsius.
fn derive_vpd(values: &BTreeMap<SemanticType, Option<SensorValue>>) -> Option<f64> {
    let temp = values.get(&SemanticType::Temp)?.as_ref()?;
    let humidity = values.get(&SemanticType::Humidity)?.as_ref()?;
    let scale = TemperatureScale::from_unit(&temp.unit).unwrap_or(TemperatureScale::Fahrenheit);
    Some(vapor_pressure_deficit(
        scale.to_celsius(temp.value),
        humidity.value,
    ))
}
