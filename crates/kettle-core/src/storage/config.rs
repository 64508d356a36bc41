//! TOML-based application configuration.
//!
//! Stores:
//! - Kettle constants (boiling threshold, capacity, boiling time)
//! - Simulation pacing
//! - Log file behaviour
//!
//! Configuration is stored at `<data_dir>/config.toml`.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use super::data_dir;
use crate::error::{ConfigError, ValidationError};
use crate::kettle::{KettleSpec, StepDelay};

/// Physical constants of the simulated kettle.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KettleConfig {
    #[serde(default = "default_max_temp")]
    pub max_temp: f64,
    #[serde(default = "default_volume")]
    pub volume: f64,
    #[serde(default = "default_boiling_time")]
    pub boiling_time: u32,
}

/// Pacing of the boiling loop.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SimulationConfig {
    /// Real milliseconds per simulated second. `0` boils instantly.
    #[serde(default)]
    pub step_delay_ms: u64,
}

/// Log file configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_level")]
    pub level: String,
    /// Append to the log file instead of truncating it on each run.
    #[serde(default)]
    pub append: bool,
    #[serde(default = "default_log_file")]
    pub file: String,
}

/// Application configuration.
///
/// Serialized to/from TOML at `<data_dir>/config.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub kettle: KettleConfig,
    #[serde(default)]
    pub simulation: SimulationConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

fn default_max_temp() -> f64 {
    100.0
}
fn default_volume() -> f64 {
    1.0
}
fn default_boiling_time() -> u32 {
    10
}
fn default_level() -> String {
    "info".into()
}
fn default_log_file() -> String {
    "kettle.log".into()
}

impl Default for KettleConfig {
    fn default() -> Self {
        Self {
            max_temp: default_max_temp(),
            volume: default_volume(),
            boiling_time: default_boiling_time(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_level(),
            append: false,
            file: default_log_file(),
        }
    }
}

impl Config {
    fn get_json_value_by_path<'a>(
        root: &'a serde_json::Value,
        key: &str,
    ) -> Option<&'a serde_json::Value> {
        if key.is_empty() {
            return None;
        }

        let mut current = root;
        for part in key.split('.') {
            current = current.get(part)?;
        }
        Some(current)
    }

    fn set_json_value_by_path(
        root: &mut serde_json::Value,
        key: &str,
        value: &str,
    ) -> Result<(), ConfigError> {
        let unknown = || ConfigError::InvalidValue {
            key: key.to_string(),
            message: "unknown config key".into(),
        };
        let unparsable = |what: &str| ConfigError::InvalidValue {
            key: key.to_string(),
            message: format!("cannot parse '{value}' as {what}"),
        };

        let mut parts = key.split('.').peekable();
        if parts.peek().is_none() || key.is_empty() {
            return Err(unknown());
        }

        let mut current = root;
        while let Some(part) = parts.next() {
            if parts.peek().is_none() {
                let obj = current.as_object_mut().ok_or_else(unknown)?;
                let existing = obj.get(part).ok_or_else(unknown)?;

                let new_value = match existing {
                    serde_json::Value::Bool(_) => serde_json::Value::Bool(
                        value.parse::<bool>().map_err(|_| unparsable("bool"))?,
                    ),
                    serde_json::Value::Number(_) => {
                        if let Ok(n) = value.parse::<u64>() {
                            serde_json::Value::Number(n.into())
                        } else if let Ok(n) = value.parse::<f64>() {
                            serde_json::Number::from_f64(n)
                                .map(serde_json::Value::Number)
                                .ok_or_else(|| unparsable("number"))?
                        } else {
                            return Err(unparsable("number"));
                        }
                    }
                    serde_json::Value::Object(_) => return Err(unknown()),
                    _ => serde_json::Value::String(value.into()),
                };

                obj.insert(part.to_string(), new_value);
                return Ok(());
            }

            current = current.get_mut(part).ok_or_else(unknown)?;
        }

        Err(unknown())
    }

    pub fn path() -> crate::error::Result<PathBuf> {
        Ok(data_dir()?.join("config.toml"))
    }

    /// Load from disk, writing defaults if the file does not exist yet.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file exists but cannot be parsed,
    /// or if the default config cannot be written to disk.
    pub fn load() -> crate::error::Result<Self> {
        Self::load_from(&Self::path()?)
    }

    /// Load from an explicit path, writing defaults if it does not exist.
    pub fn load_from(path: &Path) -> crate::error::Result<Self> {
        match std::fs::read_to_string(path) {
            Ok(content) => {
                let cfg: Config = toml::from_str(&content).map_err(|e| ConfigError::LoadFailed {
                    path: path.to_path_buf(),
                    message: e.to_string(),
                })?;
                Ok(cfg)
            }
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                let cfg = Self::default();
                cfg.save_to(path)?;
                Ok(cfg)
            }
            Err(err) => Err(ConfigError::LoadFailed {
                path: path.to_path_buf(),
                message: err.to_string(),
            }
            .into()),
        }
    }

    /// Persist to disk.
    ///
    /// # Errors
    ///
    /// Returns an error if the config cannot be serialized or written to disk.
    pub fn save(&self) -> crate::error::Result<()> {
        self.save_to(&Self::path()?)
    }

    pub fn save_to(&self, path: &Path) -> crate::error::Result<()> {
        let save_failed = |message: String| ConfigError::SaveFailed {
            path: path.to_path_buf(),
            message,
        };
        let content = toml::to_string_pretty(self).map_err(|e| save_failed(e.to_string()))?;
        std::fs::write(path, content).map_err(|e| save_failed(e.to_string()))?;
        Ok(())
    }

    /// Get a config value as string by dot-separated key.
    pub fn get(&self, key: &str) -> Option<String> {
        let json = serde_json::to_value(self).ok()?;
        let val = Self::get_json_value_by_path(&json, key)?;
        match val {
            serde_json::Value::String(s) => Some(s.clone()),
            serde_json::Value::Object(_) => None,
            other => Some(other.to_string()),
        }
    }

    /// Update a value in memory by dot-separated key.
    ///
    /// The result must still describe a valid kettle.
    ///
    /// # Errors
    ///
    /// Returns an error if the key is unknown, the value cannot be parsed
    /// into the field's type, or the kettle constants become invalid.
    pub fn apply(&mut self, key: &str, value: &str) -> crate::error::Result<()> {
        let mut json = serde_json::to_value(&*self)?;
        Self::set_json_value_by_path(&mut json, key, value)?;
        let updated: Config =
            serde_json::from_value(json).map_err(|e| ConfigError::InvalidValue {
                key: key.to_string(),
                message: e.to_string(),
            })?;
        updated.kettle_spec()?;
        *self = updated;
        Ok(())
    }

    /// Set a config value by key and save.
    ///
    /// # Errors
    ///
    /// See [`Config::apply`]; also fails if the config cannot be saved.
    pub fn set(&mut self, key: &str, value: &str) -> crate::error::Result<()> {
        self.apply(key, value)?;
        self.save()
    }

    /// Validated kettle constants.
    pub fn kettle_spec(&self) -> Result<KettleSpec, ValidationError> {
        KettleSpec::new(
            self.kettle.max_temp,
            self.kettle.volume,
            self.kettle.boiling_time,
        )
    }

    pub fn step_delay(&self) -> StepDelay {
        StepDelay::from_millis(self.simulation.step_delay_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CoreError;

    #[test]
    fn default_config_roundtrip() {
        let cfg = Config::default();
        let toml_str = toml::to_string_pretty(&cfg).unwrap();
        let parsed: Config = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed.kettle.max_temp, 100.0);
        assert_eq!(parsed.kettle.boiling_time, 10);
        assert!(!parsed.logging.append);
    }

    #[test]
    fn partial_file_fills_defaults() {
        let parsed: Config = toml::from_str("[kettle]\nvolume = 1.7\n").unwrap();
        assert_eq!(parsed.kettle.volume, 1.7);
        assert_eq!(parsed.kettle.max_temp, 100.0);
        assert_eq!(parsed.simulation.step_delay_ms, 0);
        assert_eq!(parsed.logging.level, "info");
    }

    #[test]
    fn get_supports_dot_path_keys() {
        let cfg = Config::default();
        assert_eq!(cfg.get("kettle.boiling_time").as_deref(), Some("10"));
        assert_eq!(cfg.get("kettle.max_temp").as_deref(), Some("100.0"));
        assert_eq!(cfg.get("logging.level").as_deref(), Some("info"));
        assert_eq!(cfg.get("logging.append").as_deref(), Some("false"));
        assert!(cfg.get("kettle.missing_key").is_none());
        assert!(cfg.get("kettle").is_none());
    }

    #[test]
    fn apply_updates_numbers() {
        let mut cfg = Config::default();
        cfg.apply("kettle.volume", "1.5").unwrap();
        cfg.apply("kettle.max_temp", "95").unwrap();
        cfg.apply("simulation.step_delay_ms", "1000").unwrap();
        assert_eq!(cfg.kettle.volume, 1.5);
        assert_eq!(cfg.kettle.max_temp, 95.0);
        assert_eq!(cfg.step_delay(), StepDelay::from_millis(1000));
    }

    #[test]
    fn apply_updates_bool_and_string() {
        let mut cfg = Config::default();
        cfg.apply("logging.append", "true").unwrap();
        cfg.apply("logging.level", "debug").unwrap();
        assert!(cfg.logging.append);
        assert_eq!(cfg.logging.level, "debug");
    }

    #[test]
    fn apply_rejects_unknown_key() {
        let mut cfg = Config::default();
        assert!(cfg.apply("kettle.colour", "red").is_err());
        assert!(cfg.apply("", "red").is_err());
        assert!(cfg.apply("kettle", "red").is_err());
    }

    #[test]
    fn apply_rejects_wrong_type() {
        let mut cfg = Config::default();
        assert!(cfg.apply("logging.append", "maybe").is_err());
        assert!(cfg.apply("kettle.volume", "lots").is_err());
        assert!(cfg.apply("kettle.boiling_time", "2.5").is_err());
        assert_eq!(cfg.kettle.boiling_time, 10);
    }

    #[test]
    fn apply_rejects_invalid_kettle() {
        let mut cfg = Config::default();
        assert!(cfg.apply("kettle.boiling_time", "0").is_err());
        assert!(cfg.apply("kettle.volume", "0").is_err());
        assert_eq!(cfg.kettle.volume, 1.0);
    }

    #[test]
    fn load_from_creates_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        let cfg = Config::load_from(&path).unwrap();
        assert_eq!(cfg.kettle.boiling_time, 10);
        assert!(path.exists());
    }

    #[test]
    fn save_and_reload() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        let mut cfg = Config::default();
        cfg.apply("kettle.volume", "2.0").unwrap();
        cfg.save_to(&path).unwrap();

        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded.kettle.volume, 2.0);
    }

    #[test]
    fn load_from_reports_parse_errors() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "kettle = [").unwrap();
        let err = Config::load_from(&path).unwrap_err();
        assert!(matches!(err, CoreError::Config(ConfigError::LoadFailed { .. })));
    }
}
