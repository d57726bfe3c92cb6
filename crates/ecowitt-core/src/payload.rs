//! Schema-tolerant decoding of the `get_livedata_info` payload
//!
//! Each section is a list of partial records. Missing fields decode as `None`,
//! numbers are accepted where strings are expected, and an entry that is not an
//! object is dropped without affecting its siblings. Sections that are absent
//! or not arrays decode as empty.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// One entry of `common_list`
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct CommonEntry {
    #[serde(default, deserialize_with = "lenient_text")]
    pub id: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub val: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub unit: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub label: Option<String>,
}

/// One entry of `wh25`, the gateway's built-in indoor sensor
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct IndoorEntry {
    #[serde(default, deserialize_with = "lenient_text")]
    pub intemp: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub unit: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub inhumi: Option<String>,
}

/// One entry of `ch_soil`
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct SoilEntry {
    #[serde(default, deserialize_with = "lenient_text")]
    pub channel: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub humidity: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub battery: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct LivePayload {
    pub common_list: Vec<CommonEntry>,
    pub wh25: Vec<IndoorEntry>,
    pub ch_soil: Vec<SoilEntry>,
}

impl LivePayload {
    pub fn from_value(value: &Value) -> Self {
        Self {
            common_list: section(value, "common_list"),
            wh25: section(value, "wh25"),
            ch_soil: section(value, "ch_soil"),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.common_list.is_empty() && self.wh25.is_empty() && self.ch_soil.is_empty()
    }
}

fn section<T: DeserializeOwned>(value: &Value, key: &str) -> Vec<T> {
    value
        .get(key)
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter(|item| item.is_object())
                .filter_map(|item| T::deserialize(item).ok())
                .collect()
        })
        .unwrap_or_default()
}

/// Strings pass through, numbers are rendered, anything else (and the empty
/// string) is treated as absent.
fn lenient_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let text = match Option::<Value>::deserialize(deserializer)? {
        Some(Value::String(s)) => Some(s),
        Some(Value::Number(n)) => Some(n.to_string()),
        _ => None,
    };
    Ok(text.filter(|s| !s.is_empty()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_empty_and_missing_sections() {
        assert!(LivePayload::from_value(&json!({})).is_empty());
        assert!(LivePayload::from_value(&json!(null)).is_empty());
        assert!(LivePayload::from_value(&json!({"common_list": "oops", "wh25": 3})).is_empty());
    }

    #[test]
    fn test_lenient_fields() {
        let payload = LivePayload::from_value(&json!({
            "common_list": [
                {"id": "0x02", "val": "72.5", "unit": "F"},
                {"id": 3, "val": 56.8},
                "garbage",
                {"id": true, "val": "", "extra": [1, 2]}
            ],
            "ch_soil": [{"channel": 2, "humidity": "38%", "battery": 4, "name": ""}]
        }));

        assert_eq!(payload.common_list.len(), 3);
        assert_eq!(payload.common_list[0].unit.as_deref(), Some("F"));
        assert_eq!(payload.common_list[1].id.as_deref(), Some("3"));
        assert_eq!(payload.common_list[1].val.as_deref(), Some("56.8"));
        assert_eq!(payload.common_list[1].unit, None);
        assert_eq!(payload.common_list[2], CommonEntry::default());

        assert_eq!(payload.ch_soil[0].channel.as_deref(), Some("2"));
        assert_eq!(payload.ch_soil[0].battery.as_deref(), Some("4"));
    }
}
