use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use uuid::Uuid;

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub general: GeneralConfig,

    #[serde(default)]
    pub capture: CaptureConfig,

    #[serde(default)]
    pub hopper: HopperConfig,

    #[serde(default)]
    pub detection: DetectionConfig,

    #[serde(default)]
    pub alerts: AlertsConfig,

    #[serde(default)]
    pub anonymize: AnonymizeConfig,

    /// Sensors this node may attribute sightings to. Each capture
    /// interface references one of these by id.
    #[serde(default = "default_sensors")]
    pub sensors: Vec<SensorEntry>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            general: GeneralConfig::default(),
            capture: CaptureConfig::default(),
            hopper: HopperConfig::default(),
            detection: DetectionConfig::default(),
            alerts: AlertsConfig::default(),
            anonymize: AnonymizeConfig::default(),
            sensors: default_sensors(),
        }
    }
}

impl Config {
    /// Load configuration from file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config file: {}", path.as_ref().display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.as_ref().display()))?;

        Ok(config)
    }

    /// Load config from default locations or create default
    pub fn load_or_default() -> Result<Self> {
        let paths = [
            PathBuf::from("/etc/airmonban/config.toml"),
            dirs_next::config_dir()
                .map(|p| p.join("airmonban/config.toml"))
                .unwrap_or_default(),
            PathBuf::from("config.toml"),
        ];

        for path in &paths {
            if path.exists() {
                return Self::load(path);
            }
        }

        Ok(Self::default())
    }

    /// Save configuration to file
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(&path, content)?;
        Ok(())
    }

    /// Get the PID file path
    pub fn pid_path(&self) -> PathBuf {
        PathBuf::from(&self.general.pid_file)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneralConfig {
    /// Path to PID file
    #[serde(default = "default_pid_file")]
    pub pid_file: String,

    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            pid_file: default_pid_file(),
            log_level: default_log_level(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CaptureConfig {
    /// Interfaces to capture on
    #[serde(default = "default_interfaces")]
    pub interfaces: Vec<CaptureInterfaceConfig>,
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            interfaces: default_interfaces(),
        }
    }
}

/// One capture interface and the sensor it reports as.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CaptureInterfaceConfig {
    pub name: String,

    /// Sensor id sightings on this interface are attributed to
    #[serde(default)]
    pub sensor_id: Uuid,

    /// Channels to hop across
    #[serde(default = "default_channels")]
    pub channels: Vec<u16>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HopperConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Dwell time per channel in milliseconds
    #[serde(default = "default_dwell_ms")]
    pub dwell_ms: u64,
}

impl Default for HopperConfig {
    fn default() -> Self {
        Self {
            enabled: default_true(),
            dwell_ms: default_dwell_ms(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DetectionConfig {
    /// Seconds between bandit catalog sweeps
    #[serde(default = "default_sweep_interval")]
    pub sweep_interval_secs: u64,

    /// Sightings older than this are ignored by a sweep, in seconds
    #[serde(default = "default_sighting_window")]
    pub sighting_window_secs: u64,

    /// Minutes a network record survives without fresh frames
    #[serde(default = "default_retention_minutes")]
    pub retention_minutes: u64,
}

impl Default for DetectionConfig {
    fn default() -> Self {
        Self {
            sweep_interval_secs: default_sweep_interval(),
            sighting_window_secs: default_sighting_window(),
            retention_minutes: default_retention_minutes(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlertsConfig {
    /// Minutes an alert stays active before a repeat opens a new one
    #[serde(default = "default_active_window")]
    pub active_window_minutes: i64,
}

impl Default for AlertsConfig {
    fn default() -> Self {
        Self {
            active_window_minutes: default_active_window(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnonymizeConfig {
    /// Replace SSIDs and BSSIDs in log output with stable fakes
    #[serde(default)]
    pub enabled: bool,
}

impl Default for AnonymizeConfig {
    fn default() -> Self {
        Self { enabled: false }
    }
}

/// A sensor identity frames can be attributed to.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SensorEntry {
    pub id: Uuid,
    pub name: String,

    #[serde(default)]
    pub organization: Option<String>,

    #[serde(default)]
    pub tenant: Option<String>,
}

fn default_pid_file() -> String {
    "/var/run/airmonban.pid".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_true() -> bool {
    true
}

fn default_dwell_ms() -> u64 {
    1000
}

fn default_channels() -> Vec<u16> {
    vec![1, 6, 11]
}

fn default_interfaces() -> Vec<CaptureInterfaceConfig> {
    vec![CaptureInterfaceConfig {
        name: "wlan0".to_string(),
        sensor_id: Uuid::nil(),
        channels: default_channels(),
    }]
}

fn default_sensors() -> Vec<SensorEntry> {
    vec![SensorEntry {
        id: Uuid::nil(),
        name: "default-sensor".to_string(),
        organization: None,
        tenant: None,
    }]
}

fn default_sweep_interval() -> u64 {
    60
}

fn default_sighting_window() -> u64 {
    900 // 15 minutes
}

fn default_retention_minutes() -> u64 {
    1440 // 24 hours
}

fn default_active_window() -> i64 {
    5
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.capture.interfaces.len(), 1);
        assert_eq!(config.capture.interfaces[0].name, "wlan0");
        assert_eq!(config.capture.interfaces[0].channels, vec![1, 6, 11]);
        assert_eq!(config.sensors.len(), 1);
        assert_eq!(config.sensors[0].id, Uuid::nil());
        assert!(config.hopper.enabled);
        assert_eq!(config.hopper.dwell_ms, 1000);
        assert!(!config.anonymize.enabled);
    }

    #[test]
    fn test_partial_toml_fills_defaults() {
        let toml = r#"
            [general]
            log_level = "debug"

            [[capture.interfaces]]
            name = "wlan1"
            sensor_id = "4f0652ae-2a36-417f-b6b2-46fbf4cbccca"
            channels = [36, 40]
        "#;

        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.general.log_level, "debug");
        assert_eq!(config.general.pid_file, "/var/run/airmonban.pid");
        assert_eq!(config.capture.interfaces.len(), 1);
        assert_eq!(config.capture.interfaces[0].name, "wlan1");
        assert_eq!(config.capture.interfaces[0].channels, vec![36, 40]);
        assert_eq!(
            config.capture.interfaces[0].sensor_id.to_string(),
            "4f0652ae-2a36-417f-b6b2-46fbf4cbccca"
        );
        assert_eq!(config.detection.sweep_interval_secs, 60);
        assert_eq!(config.alerts.active_window_minutes, 5);
    }

    #[test]
    fn test_sensor_entry_optional_fields() {
        let toml = r#"
            [[sensors]]
            id = "4f0652ae-2a36-417f-b6b2-46fbf4cbccca"
            name = "rooftop"
            organization = "hq"
        "#;

        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.sensors.len(), 1);
        assert_eq!(config.sensors[0].name, "rooftop");
        assert_eq!(config.sensors[0].organization.as_deref(), Some("hq"));
        assert_eq!(config.sensors[0].tenant, None);
    }

    #[test]
    fn test_save_and_reload() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");

        let mut config = Config::default();
        config.general.log_level = "trace".to_string();
        config.capture.interfaces[0].channels = vec![1, 13];
        config.save(&path).unwrap();

        let reloaded = Config::load(&path).unwrap();
        assert_eq!(reloaded.general.log_level, "trace");
        assert_eq!(reloaded.capture.interfaces[0].channels, vec![1, 13]);
    }

    #[test]
    fn test_load_missing_file() {
        let err = Config::load("/nonexistent/airmonban.toml").unwrap_err();
        assert!(err.to_string().contains("Failed to read config file"));
    }
}
