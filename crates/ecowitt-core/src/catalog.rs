//! Static catalog of the gateway's `common_list` channels

use crate::types::SemanticType;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChannelDescriptor {
    pub id: &'static str,
    pub label: &'static str,
    pub semantic: SemanticType,
}

/// Synthetic id for the indoor block's temperature field
pub const INDOOR_TEMP_ID: &str = "wh25_intemp";

/// Synthetic id for the indoor block's humidity field
pub const INDOOR_HUMIDITY_ID: &str = "wh25_inhumi";

/// Synthetic id for a soil moisture channel
pub fn soil_channel_id(channel: &str) -> String {
    format!("soil_ch{channel}")
}

macro_rules! channel {
    ($id:literal, $label:literal, $semantic:ident) => {
        ChannelDescriptor {
            id: $id,
            label: $label,
            semantic: SemanticType::$semantic,
        }
    };
}

static CATALOG: [ChannelDescriptor; 25] = [
    channel!("0x01", "Indoor Temperature", Temp),
    channel!("0x02", "Outdoor Temperature", Temp),
    channel!("0x03", "Dew Point", DewPoint),
    channel!("0x04", "Wind Chill", WindChill),
    channel!("0x05", "Heat Index", HeatIndex),
    channel!("0x06", "Indoor Humidity", Humidity),
    channel!("0x07", "Outdoor Humidity", Humidity),
    channel!("0x08", "Absolute Barometric", Pressure),
    channel!("0x09", "Relative Barometric", Pressure),
    channel!("0x0a", "Wind Direction", WindDir),
    channel!("0x0b", "Wind Speed", WindSpeed),
    channel!("0x0c", "Gust Speed", GustSpeed),
    channel!("0x0d", "Rain Event", Rain),
    channel!("0x0e", "Rain Rate", RainRate),
    channel!("0x0f", "Rain Hour", Rain),
    channel!("0x10", "Rain Day", Rain),
    channel!("0x11", "Rain Week", Rain),
    channel!("0x12", "Rain Month", Rain),
    channel!("0x13", "Rain Year", Rain),
    channel!("0x14", "Rain Total", Rain),
    channel!("0x15", "Light", Light),
    channel!("0x16", "UV", Uv),
    channel!("0x17", "UVI", Uvi),
    channel!("0x18", "Date and Time", DateTime),
    channel!("0x19", "Day Max Wind", WindSpeed),
];

/// Look up a canonical id (see [`crate::normalize_id`])
pub fn lookup(id: &str) -> Option<&'static ChannelDescriptor> {
    CATALOG.iter().find(|d| d.id == id)
}

pub fn channels() -> &'static [ChannelDescriptor] {
    &CATALOG
}
