//! Unit conversion and psychrometric helpers

/// Temperature scale as reported in a reading's unit text
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TemperatureScale {
    Fahrenheit,
    Celsius,
}

impl TemperatureScale {
    /// Recognise the unit strings gateways emit (`F`, `°F`, `℃`, ...)
    pub fn from_unit(unit: &str) -> Option<Self> {
        match unit.trim().trim_start_matches('°') {
            "F" | "f" | "℉" => Some(TemperatureScale::Fahrenheit),
            "C" | "c" | "℃" => Some(TemperatureScale::Celsius),
            _ => None,
        }
    }

    /// Convert a value on this scale to Celsius
    pub fn to_celsius(self, value: f64) -> f64 {
        match self {
            TemperatureScale::Fahrenheit => fahrenheit_to_celsius(value),
            TemperatureScale::Celsius => value,
        }
    }
}

pub fn fahrenheit_to_celsius(f: f64) -> f64 {
    (f - 32.0) * 5.0 / 9.0
}

pub fn celsius_to_fahrenheit(c: f64) -> f64 {
    c * 9.0 / 5.0 + 32.0
}

/// Saturation vapor pressure (kPa) over water, Tetens form
pub fn saturation_vapor_pressure(temp_c: f64) -> f64 {
    0.6108 * ((17.27 * temp_c) / (temp_c + 237.3)).exp()
}

/// Vapor-pressure deficit in kPa for an air temperature (°C) and relative humidity (%)
pub fn vapor_pressure_deficit(temp_c: f64, rh: f64) -> f64 {
    let es = saturation_vapor_pressure(temp_c);
    let ea = es * (rh / 100.0);
    es - ea
}
