//! Text rendering of snapshot values for status lines and logs

use crate::types::{
    BatteryStatus, CycleReport, LogicalSensorSnapshot, SemanticType, SensorValue, SoilSnapshot,
};

pub const NOT_AVAILABLE: &str = "N/A";

pub fn type_label(semantic: &SemanticType) -> String {
    let label = match semantic {
        SemanticType::Temp => "Temperature",
        SemanticType::Humidity => "Humidity",
        SemanticType::DewPoint => "Dew Point",
        SemanticType::WindChill => "Wind Chill",
        SemanticType::HeatIndex => "Heat Index",
        SemanticType::Pressure => "Pressure",
        SemanticType::WindDir => "Wind Direction",
        SemanticType::WindSpeed => "Wind Speed",
        SemanticType::GustSpeed => "Gust Speed",
        SemanticType::Rain => "Rainfall",
        SemanticType::RainRate => "Rain Rate",
        SemanticType::Light => "Light",
        SemanticType::Uv => "UV",
        SemanticType::Uvi => "UVI",
        SemanticType::DateTime => "Date and Time",
        SemanticType::SoilMoisture(channel) => return format!("Soil Moisture {channel}"),
    };
    label.to_string()
}

/// Unit shown when the gateway did not report one
fn default_unit(semantic: &SemanticType) -> &'static str {
    match semantic {
        SemanticType::Temp
        | SemanticType::DewPoint
        | SemanticType::WindChill
        | SemanticType::HeatIndex => "°F",
        SemanticType::Humidity | SemanticType::SoilMoisture(_) => "%",
        SemanticType::Pressure => "hPa",
        SemanticType::WindSpeed | SemanticType::GustSpeed => "m/s",
        SemanticType::WindDir => "°",
        SemanticType::Rain => "mm",
        _ => "",
    }
}

pub fn format_value(semantic: &SemanticType, value: Option<&SensorValue>) -> String {
    let Some(v) = value else {
        return NOT_AVAILABLE.to_string();
    };
    let unit = if v.unit.is_empty() {
        default_unit(semantic)
    } else {
        v.unit.as_str()
    };
    if unit.is_empty() {
        format!("{:.2}", v.value)
    } else {
        format!("{:.2} {}", v.value, unit)
    }
}

pub fn format_vpd(vpd: Option<f64>) -> String {
    match vpd {
        Some(kpa) => format!("{kpa:.3} kPa"),
        None => NOT_AVAILABLE.to_string(),
    }
}

pub fn format_battery(status: BatteryStatus) -> &'static str {
    match status {
        BatteryStatus::Normal => "Normal",
        BatteryStatus::Low => "Low",
        BatteryStatus::Unavailable => NOT_AVAILABLE,
    }
}

/// `Greenhouse: Temperature 72.50 F | Humidity 45.00 % | VPD 1.234 kPa`
///
/// The VPD column appears only for sensors with both temperature and humidity bound.
pub fn render_sensor(sensor: &LogicalSensorSnapshot) -> String {
    let mut columns: Vec<String> = sensor
        .values
        .iter()
        .map(|(semantic, value)| {
            format!("{} {}", type_label(semantic), format_value(semantic, value.as_ref()))
        })
        .collect();
    if sensor.values.contains_key(&SemanticType::Temp)
        && sensor.values.contains_key(&SemanticType::Humidity)
    {
        columns.push(format!("VPD {}", format_vpd(sensor.vpd)));
    }
    format!("{}: {}", sensor.name, columns.join(" | "))
}

pub fn render_soil(soil: &SoilSnapshot) -> String {
    let moisture = match soil.moisture {
        Some(m) => format!("{m:.2} %"),
        None => NOT_AVAILABLE.to_string(),
    };
    format!(
        "{}: Moisture {} | Battery {}",
        soil.label,
        moisture,
        format_battery(soil.battery)
    )
}

/// Footer line: last update time, or the fetch error
pub fn status_line(report: &CycleReport) -> String {
    match report {
        CycleReport::Snapshot(snapshot) => format!(
            "Last updated: {}",
            snapshot
                .timestamp
                .with_timezone(&chrono::Local)
                .format("%Y-%m-%d %H:%M:%S")
        ),
        CycleReport::Failed { message, .. } => format!("Error retrieving data: {message}"),
    }
}
