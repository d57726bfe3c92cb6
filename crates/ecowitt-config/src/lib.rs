//! Persisted settings record: gateway address, sensor assignment, display preference

use ecowitt_core::{AssignmentError, AssignmentModel};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const DEFAULT_CONFIG_PATH: &str = "ecowitt.toml";
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(1000);
pub const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(5);
pub const DEFAULT_HTTP_BIND: &str = "127.0.0.1:8080";

/// Display preference. Stored for the presentation layer; the pipeline ignores it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Dark,
    Matrix,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PollConfig {
    pub interval_ms: Option<u64>,
    pub timeout_secs: Option<u64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HttpConfig {
    pub bind: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub gateway_address: String,
    #[serde(default)]
    pub theme: Theme,
    pub poll: Option<PollConfig>,
    pub http: Option<HttpConfig>,
    #[serde(default)]
    pub assignment: AssignmentModel,
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid TOML: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Failed to serialize settings: {0}")]
    Serialize(#[from] toml::ser::Error),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Invalid settings: {0}")]
    Invalid(String),
    #[error("Invalid assignment: {0}")]
    Assignment(#[from] AssignmentError),
}

/// Settings path from ECOWITT_CONFIG, or `ecowitt.toml` in the working directory
pub fn config_path() -> PathBuf {
    std::env::var("ECOWITT_CONFIG")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from(DEFAULT_CONFIG_PATH))
}

impl Settings {
    /// Load from [`config_path`]
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(config_path())
    }

    /// A missing file yields the unconfigured defaults
    pub fn load_from<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        if !path.exists() {
            return Ok(Settings::default());
        }
        let s = fs::read_to_string(path)?;
        Self::from_toml(&s)
    }

    pub fn from_toml(s: &str) -> Result<Self, ConfigError> {
        let mut settings = toml::from_str::<Settings>(s)?;
        settings.assignment = settings.assignment.canonicalized();
        Ok(settings)
    }

    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    pub fn save_to<P: AsRef<Path>>(&self, path: P) -> Result<(), ConfigError> {
        fs::write(path, self.to_toml()?)?;
        Ok(())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.gateway_address.trim().is_empty() {
            return Err(ConfigError::Invalid("gateway_address is required".into()));
        }
        self.assignment.validate()?;
        Ok(())
    }

    /// Whether there is enough to start polling: a gateway and something assigned
    pub fn is_configured(&self) -> bool {
        !self.gateway_address.trim().is_empty() && !self.assignment.is_empty()
    }

    /// Poll period (default 1s; zero falls back to the default)
    pub fn poll_interval(&self) -> Duration {
        self.poll
            .as_ref()
            .and_then(|p| p.interval_ms)
            .filter(|ms| *ms > 0)
            .map(Duration::from_millis)
            .unwrap_or(DEFAULT_POLL_INTERVAL)
    }

    /// Bound on a single gateway fetch (default 5s)
    pub fn fetch_timeout(&self) -> Duration {
        self.poll
            .as_ref()
            .and_then(|p| p.timeout_secs)
            .filter(|s| *s > 0)
            .map(Duration::from_secs)
            .unwrap_or(DEFAULT_FETCH_TIMEOUT)
    }

    /// HTTP bind address (default 127.0.0.1:8080)
    pub fn http_bind(&self) -> String {
        self.http
            .as_ref()
            .and_then(|h| h.bind.clone())
            .unwrap_or_else(|| DEFAULT_HTTP_BIND.to_string())
    }
}

/// Settings paired with the file they persist to
#[derive(Debug, Clone)]
pub struct SettingsFile {
    path: PathBuf,
    settings: Settings,
}

impl SettingsFile {
    pub fn open<P: Into<PathBuf>>(path: P) -> Result<Self, ConfigError> {
        let path = path.into();
        let settings = Settings::load_from(&path)?;
        Ok(Self { path, settings })
    }

    pub fn new(path: PathBuf, settings: Settings) -> Self {
        Self { path, settings }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Validate and persist a new assignment. On error neither the file nor
    /// the in-memory settings change.
    pub fn replace_assignment(
        &mut self,
        assignment: AssignmentModel,
    ) -> Result<&AssignmentModel, ConfigError> {
        let assignment = assignment.canonicalized();
        assignment.validate()?;
        let mut next = self.settings.clone();
        next.assignment = assignment;
        next.save_to(&self.path)?;
        self.settings = next;
        Ok(&self.settings.assignment)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ecowitt_core::{LogicalSensor, SemanticType, SoilBinding};

    const SAMPLE: &str = r#"
gateway_address = "192.168.1.40"
theme = "matrix"

[poll]
interval_ms = 2000

[[assignment.sensors]]
name = "Greenhouse"

[assignment.sensors.bindings]
temp = "0x02"
humidity = "7"

[[assignment.soil]]
channel = "1"
id = "soil_ch1"
"#;

    #[test]
    fn defaults() {
        let cfg = Settings::default();
        assert_eq!(cfg.http_bind(), "127.0.0.1:8080");
        assert_eq!(cfg.poll_interval(), Duration::from_secs(1));
        assert_eq!(cfg.fetch_timeout(), Duration::from_secs(5));
        assert_eq!(cfg.theme, Theme::Dark);
        assert!(!cfg.is_configured());
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn parses_sample() {
        let cfg = Settings::from_toml(SAMPLE).unwrap();
        assert_eq!(cfg.gateway_address, "192.168.1.40");
        assert_eq!(cfg.theme, Theme::Matrix);
        assert_eq!(cfg.poll_interval(), Duration::from_secs(2));
        assert_eq!(cfg.fetch_timeout(), Duration::from_secs(5));
        assert!(cfg.is_configured());
        cfg.validate().unwrap();

        let gh = &cfg.assignment.sensors[0];
        assert_eq!(gh.name, "Greenhouse");
        assert_eq!(
            gh.bindings.get(&SemanticType::Humidity).map(String::as_str),
            Some("0x07")
        );
        assert_eq!(cfg.assignment.soil[0].label, "");
    }

    #[test]
    fn example_file_is_valid() {
        let cfg = Settings::from_toml(include_str!("../../../ecowitt.example.toml")).unwrap();
        cfg.validate().unwrap();
        assert_eq!(cfg.assignment.sensors.len(), 2);
        assert_eq!(cfg.http_bind(), "127.0.0.1:8080");
    }

    #[test]
    fn rejects_unknown_semantic_type() {
        let bad = SAMPLE.replace("humidity = \"7\"", "moisture = \"7\"");
        assert!(matches!(Settings::from_toml(&bad), Err(ConfigError::Toml(_))));
    }

    #[test]
    fn missing_file_is_default() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = Settings::load_from(dir.path().join("absent.toml")).unwrap();
        assert_eq!(cfg, Settings::default());
    }

    #[test]
    fn save_and_reload() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ecowitt.toml");
        let cfg = Settings::from_toml(SAMPLE).unwrap();
        cfg.save_to(&path).unwrap();

        let back = Settings::load_from(&path).unwrap();
        assert_eq!(back, cfg);
    }

    #[test]
    fn replace_assignment_persists_whole_model() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ecowitt.toml");
        Settings::from_toml(SAMPLE).unwrap().save_to(&path).unwrap();

        let mut file = SettingsFile::open(&path).unwrap();
        let replacement = AssignmentModel {
            sensors: vec![LogicalSensor::new("Mast").bind(SemanticType::WindSpeed, "0x0B")],
            soil: vec![],
        };
        file.replace_assignment(replacement).unwrap();

        let reloaded = Settings::load_from(&path).unwrap();
        assert_eq!(reloaded.assignment.sensors.len(), 1);
        assert_eq!(reloaded.assignment.sensors[0].name, "Mast");
        assert_eq!(
            reloaded.assignment.sensors[0]
                .bindings
                .get(&SemanticType::WindSpeed)
                .map(String::as_str),
            Some("0x0b")
        );
        assert!(reloaded.assignment.soil.is_empty());
        assert_eq!(reloaded.gateway_address, "192.168.1.40");
    }

    #[test]
    fn invalid_assignment_is_not_persisted() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ecowitt.toml");
        Settings::from_toml(SAMPLE).unwrap().save_to(&path).unwrap();

        let mut file = SettingsFile::open(&path).unwrap();
        let dupes = AssignmentModel {
            sensors: vec![LogicalSensor::new("A"), LogicalSensor::new("A")],
            soil: vec![SoilBinding::default()],
        };
        assert!(matches!(
            file.replace_assignment(dupes),
            Err(ConfigError::Assignment(_))
        ));
        assert_eq!(file.settings().assignment.sensors[0].name, "Greenhouse");
        assert_eq!(
            Settings::load_from(&path).unwrap().assignment.sensors[0].name,
            "Greenhouse"
        );
    }
}
