use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info};

/// Name of the persisted settings file inside the config dir
pub const CONFIG_FILE: &str = "config.json";

const BAUD_RATE_KEY: &str = "BaudRate";
const AT_LIBRARY_KEY: &str = "AT_Library";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to access {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Malformed configuration in {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Configuration in {path} is not a JSON object")]
    NotAnObject { path: PathBuf },

    #[error("Invalid baud rate: {0} (must be a positive integer)")]
    InvalidBaudRate(u32),
}

/// Settings that survive a restart. The selected device is deliberately absent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    #[serde(rename = "BaudRate")]
    pub baud_rate: u32,
    #[serde(rename = "AT_Library")]
    pub at_library: String,
}

impl Settings {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.baud_rate == 0 {
            return Err(ConfigError::InvalidBaudRate(self.baud_rate));
        }
        Ok(())
    }
}

/// Persistence for [`Settings`]
pub trait ConfigStore {
    fn load(&self) -> Result<Settings, ConfigError>;

    /// Overwrite the persisted record with `settings`
    fn save(&self, settings: &Settings) -> Result<(), ConfigError>;

    fn set_baud_rate(&self, baud_rate: u32) -> Result<Settings, ConfigError> {
        let mut settings = self.load()?;
        settings.baud_rate = baud_rate;
        settings.validate()?;
        self.save(&settings)?;
        Ok(settings)
    }

    fn set_at_library(&self, name: &str) -> Result<Settings, ConfigError> {
        let mut settings = self.load()?;
        settings.at_library = name.to_string();
        self.save(&settings)?;
        Ok(settings)
    }
}

/// `config.json` backed store
#[derive(Debug, Clone)]
pub struct JsonConfigStore {
    path: PathBuf,
}

impl JsonConfigStore {
    pub fn new(config_dir: &Path) -> Self {
        Self {
            path: config_dir.join(CONFIG_FILE),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn io_error(&self, source: io::Error) -> ConfigError {
        ConfigError::Io {
            path: self.path.clone(),
            source,
        }
    }

    fn parse_error(&self, source: serde_json::Error) -> ConfigError {
        ConfigError::Parse {
            path: self.path.clone(),
            source,
        }
    }

    /// Whole record as stored, keeping keys this program does not know about
    fn read_record(&self) -> Result<Map<String, Value>, ConfigError> {
        let json = match fs::read_to_string(&self.path) {
            Ok(json) => json,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Map::new()),
            Err(e) => return Err(self.io_error(e)),
        };

        let value: Value = serde_json::from_str(&json).map_err(|e| self.parse_error(e))?;
        match value {
            Value::Object(record) => Ok(record),
            _ => Err(ConfigError::NotAnObject {
                path: self.path.clone(),
            }),
        }
    }
}

impl ConfigStore for JsonConfigStore {
    fn load(&self) -> Result<Settings, ConfigError> {
        debug!("Reading settings from {}", self.path.display());
        let json = fs::read_to_string(&self.path).map_err(|e| self.io_error(e))?;
        let settings: Settings = serde_json::from_str(&json).map_err(|e| self.parse_error(e))?;
        settings.validate()?;
        Ok(settings)
    }

    fn save(&self, settings: &Settings) -> Result<(), ConfigError> {
        settings.validate()?;

        let mut record = self.read_record()?;
        record.insert(BAUD_RATE_KEY.to_string(), Value::from(settings.baud_rate));
        record.insert(
            AT_LIBRARY_KEY.to_string(),
            Value::from(settings.at_library.clone()),
        );

        let json = serde_json::to_string_pretty(&record).map_err(|e| self.parse_error(e))?;
        fs::write(&self.path, json).map_err(|e| self.io_error(e))?;

        info!(
            "Saved settings to {}: baud rate {}, AT library {}",
            self.path.display(),
            settings.baud_rate,
            settings.at_library
        );
        Ok(())
    }
}
