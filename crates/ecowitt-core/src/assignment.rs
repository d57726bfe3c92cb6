//! User assignment of physical channels to named logical sensors

use crate::normalize::normalize_id;
use crate::types::{RawReading, SemanticType};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AssignmentError {
    #[error("Sensor name must not be empty")]
    EmptySensorName,

    #[error("Duplicate sensor name: {0}")]
    DuplicateSensor(String),

    #[error("Sensor {sensor} binds {semantic} to an empty channel id")]
    EmptyBinding { sensor: String, semantic: SemanticType },

    #[error("Soil channel {0} has an empty channel id")]
    EmptySoilId(String),

    #[error("Duplicate soil channel id: {0}")]
    DuplicateSoilId(String),
}

/// A user-named group of channels, e.g. "Greenhouse" = {temp: 0x02, humidity: 0x07}
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogicalSensor {
    pub name: String,
    #[serde(default)]
    pub bindings: BTreeMap<SemanticType, String>,
}

impl LogicalSensor {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            bindings: BTreeMap::new(),
        }
    }

    pub fn bind(mut self, semantic: SemanticType, id: impl Into<String>) -> Self {
        self.bindings.insert(semantic, id.into());
        self
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SoilBinding {
    pub channel: String,
    pub id: String,
    #[serde(default)]
    pub label: String,
}

impl SoilBinding {
    pub fn display_label(&self) -> String {
        if self.label.trim().is_empty() {
            format!("Soil Moisture Channel {}", self.channel)
        } else {
            self.label.clone()
        }
    }
}

/// The full mapping consumed by each refresh cycle.
///
/// Treated as an immutable value: an edit produces a new model that replaces
/// the old one wholesale.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssignmentModel {
    #[serde(default)]
    pub sensors: Vec<LogicalSensor>,
    #[serde(default)]
    pub soil: Vec<SoilBinding>,
}

impl AssignmentModel {
    pub fn is_empty(&self) -> bool {
        self.sensors.is_empty() && self.soil.is_empty()
    }

    pub fn validate(&self) -> Result<(), AssignmentError> {
        let mut names = HashSet::new();
        for sensor in &self.sensors {
            let name = sensor.name.trim();
            if name.is_empty() {
                return Err(AssignmentError::EmptySensorName);
            }
            if !names.insert(name) {
                return Err(AssignmentError::DuplicateSensor(name.to_string()));
            }
            for (semantic, id) in &sensor.bindings {
                if id.trim().is_empty() {
                    return Err(AssignmentError::EmptyBinding {
                        sensor: name.to_string(),
                        semantic: semantic.clone(),
                    });
                }
            }
        }

        let mut soil_ids = HashSet::new();
        for binding in &self.soil {
            if binding.id.trim().is_empty() {
                return Err(AssignmentError::EmptySoilId(binding.channel.clone()));
            }
            if !soil_ids.insert(binding.id.as_str()) {
                return Err(AssignmentError::DuplicateSoilId(binding.id.clone()));
            }
        }
        Ok(())
    }

    /// Rewrite hand-entered channel ids (`0x0B`, `11`) into canonical form
    pub fn canonicalized(mut self) -> Self {
        for sensor in &mut self.sensors {
            sensor.name = sensor.name.trim().to_string();
            for id in sensor.bindings.values_mut() {
                *id = normalize_id(id);
            }
        }
        for binding in &mut self.soil {
            binding.id = normalize_id(&binding.id);
        }
        self
    }

    /// Every channel id the model refers to, in model order, without repeats
    pub fn bound_ids(&self) -> Vec<&str> {
        let mut seen = HashSet::new();
        self.sensors
            .iter()
            .flat_map(|s| s.bindings.values())
            .chain(self.soil.iter().map(|b| &b.id))
            .map(String::as_str)
            .filter(|id| seen.insert(*id))
            .collect()
    }
}

/// Assembles a model from a scan: each reading is either left out or given a
/// sensor number. Soil moisture readings go to the soil list whatever number
/// they get; everything else is grouped by number.
#[derive(Debug, Default)]
pub struct AssignmentBuilder {
    groups: BTreeMap<u32, BTreeMap<SemanticType, String>>,
    names: BTreeMap<u32, String>,
    soil: Vec<SoilBinding>,
}

impl AssignmentBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn assign(&mut self, reading: &RawReading, sensor: u32) -> &mut Self {
        match &reading.semantic {
            SemanticType::SoilMoisture(channel) => {
                if !self.soil.iter().any(|b| b.id == reading.id) {
                    self.soil.push(SoilBinding {
                        channel: channel.clone(),
                        id: reading.id.clone(),
                        label: reading.source_label.clone(),
                    });
                }
            }
            semantic => {
                // A later reading of the same type replaces the earlier one
                self.groups
                    .entry(sensor)
                    .or_default()
                    .insert(semantic.clone(), reading.id.clone());
            }
        }
        self
    }

    pub fn name(&mut self, sensor: u32, name: impl Into<String>) -> &mut Self {
        self.names.insert(sensor, name.into());
        self
    }

    pub fn build(self) -> Result<AssignmentModel, AssignmentError> {
        let Self {
            groups,
            mut names,
            soil,
        } = self;
        let sensors = groups
            .into_iter()
            .map(|(number, bindings)| LogicalSensor {
                name: names
                    .remove(&number)
                    .map(|n| n.trim().to_string())
                    .filter(|n| !n.is_empty())
                    .unwrap_or_else(|| format!("Sensor_{number}")),
                bindings,
            })
            .collect();

        let model = AssignmentModel { sensors, soil };
        model.validate()?;
        Ok(model)
    }
}
