//! Core data types for gateway readings and resolved snapshots

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::str::FromStr;

/// Key under which a soil channel's raw battery code is kept in [`RawReading::extra`]
pub const BATTERY_KEY: &str = "battery";

/// What a reading measures.
///
/// Serialized as the short lowercase names the gateway tooling uses
/// (`temp`, `humidity`, ...). Soil moisture carries its channel so that
/// readings from different probes stay distinguishable.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum SemanticType {
    Temp,
    Humidity,
    DewPoint,
    WindChill,
    HeatIndex,
    Pressure,
    WindDir,
    WindSpeed,
    GustSpeed,
    Rain,
    RainRate,
    Light,
    Uv,
    Uvi,
    DateTime,
    SoilMoisture(String),
}

const SOIL_PREFIX: &str = "soil_moisture_";

impl SemanticType {
    pub fn as_name(&self) -> std::borrow::Cow<'static, str> {
        let name = match self {
            SemanticType::Temp => "temp",
            SemanticType::Humidity => "humidity",
            SemanticType::DewPoint => "dewpoint",
            SemanticType::WindChill => "windchill",
            SemanticType::HeatIndex => "heatindex",
            SemanticType::Pressure => "pressure",
            SemanticType::WindDir => "winddir",
            SemanticType::WindSpeed => "windspeed",
            SemanticType::GustSpeed => "gustspeed",
            SemanticType::Rain => "rain",
            SemanticType::RainRate => "rainrate",
            SemanticType::Light => "light",
            SemanticType::Uv => "uv",
            SemanticType::Uvi => "uvi",
            SemanticType::DateTime => "datetime",
            SemanticType::SoilMoisture(channel) => {
                return format!("{SOIL_PREFIX}{channel}").into();
            }
        };
        name.into()
    }
}

impl fmt::Display for SemanticType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.as_name())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown semantic type: {0}")]
pub struct SemanticTypeError(pub String);

impl FromStr for SemanticType {
    type Err = SemanticTypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "temp" => SemanticType::Temp,
            "humidity" => SemanticType::Humidity,
            "dewpoint" => SemanticType::DewPoint,
            "windchill" => SemanticType::WindChill,
            "heatindex" => SemanticType::HeatIndex,
            "pressure" => SemanticType::Pressure,
            "winddir" => SemanticType::WindDir,
            "windspeed" => SemanticType::WindSpeed,
            "gustspeed" => SemanticType::GustSpeed,
            "rain" => SemanticType::Rain,
            "rainrate" => SemanticType::RainRate,
            "light" => SemanticType::Light,
            "uv" => SemanticType::Uv,
            "uvi" => SemanticType::Uvi,
            "datetime" => SemanticType::DateTime,
            other => match other.strip_prefix(SOIL_PREFIX) {
                Some(channel) if !channel.is_empty() => {
                    SemanticType::SoilMoisture(channel.to_string())
                }
                _ => return Err(SemanticTypeError(other.to_string())),
            },
        })
    }
}

impl TryFrom<String> for SemanticType {
    type Error = SemanticTypeError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<SemanticType> for String {
    fn from(value: SemanticType) -> Self {
        value.as_name().into_owned()
    }
}

/// One typed, unit-tagged value pulled out of a gateway payload.
///
/// Produced fresh on every poll and dropped once the cycle's snapshot is built.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawReading {
    /// Canonical channel id (`0x02`, `wh25_intemp`, `soil_ch1`, ...)
    pub id: String,

    #[serde(rename = "type")]
    pub semantic: SemanticType,

    /// Human label from the channel catalog
    pub label: String,

    pub value: f64,

    pub unit: String,

    /// Value text exactly as the gateway sent it
    pub original: String,

    /// Label the gateway attached to the entry, if any
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub source_label: String,

    /// Auxiliary text carried through unparsed (soil battery codes)
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub extra: HashMap<String, String>,
}

impl RawReading {
    pub fn battery(&self) -> Option<&str> {
        self.extra.get(BATTERY_KEY).map(String::as_str)
    }
}

/// A resolved value together with the unit the gateway reported it in
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SensorValue {
    pub value: f64,
    pub unit: String,
}

/// Current values of one user-named logical sensor.
///
/// Every bound type is present in `values`; `None` marks a channel that was
/// absent from this cycle's payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogicalSensorSnapshot {
    pub name: String,
    pub values: BTreeMap<SemanticType, Option<SensorValue>>,
    /// Vapor-pressure deficit in kPa, when temperature and humidity both resolved
    pub vpd: Option<f64>,
}

impl LogicalSensorSnapshot {
    pub fn value(&self, semantic: &SemanticType) -> Option<f64> {
        self.values
            .get(semantic)
            .and_then(|v| v.as_ref())
            .map(|v| v.value)
    }
}

/// Soil probe battery state.
///
/// The gateway reports a small integer code; anything above 1 is treated as
/// healthy. The threshold is the vendor's, not a voltage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BatteryStatus {
    Normal,
    Low,
    Unavailable,
}

impl BatteryStatus {
    pub const NORMAL_ABOVE: i64 = 1;

    pub fn from_code(code: Option<&str>) -> Self {
        match code.and_then(|c| c.trim().parse::<i64>().ok()) {
            Some(level) if level > Self::NORMAL_ABOVE => BatteryStatus::Normal,
            Some(_) => BatteryStatus::Low,
            None => BatteryStatus::Unavailable,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SoilSnapshot {
    pub channel: String,
    pub label: String,
    pub moisture: Option<f64>,
    pub battery: BatteryStatus,
}

/// Everything one refresh cycle resolved, ready for presentation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SensorSnapshot {
    pub timestamp: DateTime<Utc>,
    pub sensors: Vec<LogicalSensorSnapshot>,
    pub soil: Vec<SoilSnapshot>,
    /// Bound channel ids that were absent from this cycle's payload
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub missing: Vec<String>,
}

impl SensorSnapshot {
    pub fn sensor(&self, name: &str) -> Option<&LogicalSensorSnapshot> {
        self.sensors.iter().find(|s| s.name == name)
    }
}

/// Outcome of one cycle as handed to presentation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum CycleReport {
    Snapshot(SensorSnapshot),
    Failed {
        message: String,
        at: DateTime<Utc>,
    },
}

impl CycleReport {
    pub fn failed(message: impl Into<String>) -> Self {
        CycleReport::Failed {
            message: message.into(),
            at: Utc::now(),
        }
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, CycleReport::Failed { .. })
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        match self {
            CycleReport::Snapshot(snapshot) => snapshot.timestamp,
            CycleReport::Failed { at, .. } => *at,
        }
    }
}
