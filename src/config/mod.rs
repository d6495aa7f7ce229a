//! Configuration management
//!
//! Loads and saves configuration from XDG-compliant paths.
//! Config location: ~/.config/qrng-nist/config.toml
//!
//! The file holds plain strings; `Config::to_run_config` resolves them into
//! the typed `RunConfig` the pipeline consumes.

pub mod defaults;

use crate::encode::EncodingPolicy;
use crate::error::{Error, Result};
use crate::format::get_formatter;
use crate::qrng::DeviceBackend;
use defaults::*;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Where samples come from
    #[serde(default)]
    pub source: SourceConfig,

    /// Integer-to-bit encoding
    #[serde(default)]
    pub encoding: EncodingConfig,

    /// Report output
    #[serde(default)]
    pub report: ReportConfig,

    /// API keys for device services
    #[serde(default)]
    pub api_keys: ApiKeysConfig,
}

/// Sample source settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceConfig {
    /// Read samples from `data_path` instead of a device
    #[serde(default = "default_mock")]
    pub mock: bool,

    /// Mock sample file
    #[serde(default = "default_data_path")]
    pub data_path: String,

    /// Device backend
    #[serde(default = "default_backend")]
    pub backend: String,

    /// Device network address
    #[serde(default = "default_device_address")]
    pub device_address: String,

    /// Device index
    #[serde(default = "default_device_index")]
    pub device_index: u32,

    /// Number of samples requested from the device
    #[serde(default = "default_sample_count")]
    pub sample_count: usize,

    /// Seed for the pseudo backend
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
}

/// Encoding settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EncodingConfig {
    /// Policy name: encode_val, map_val or last_bits
    #[serde(default = "default_encoding")]
    pub policy: String,
}

/// Report settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportConfig {
    /// Output format: text or json
    #[serde(default = "default_format")]
    pub format: String,

    /// Log each test result as it completes
    #[serde(default)]
    pub verbose: bool,
}

/// API keys for external services
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ApiKeysConfig {
    /// ANU QRNG API key
    #[serde(default)]
    pub anu: String,
}

// Default value functions for serde
fn default_mock() -> bool {
    DEFAULT_MOCK
}
fn default_data_path() -> String {
    DEFAULT_DATA_PATH.to_string()
}
fn default_backend() -> String {
    DEFAULT_BACKEND.to_string()
}
fn default_device_address() -> String {
    DEFAULT_DEVICE_ADDRESS.to_string()
}
fn default_device_index() -> u32 {
    DEFAULT_DEVICE_INDEX
}
fn default_sample_count() -> usize {
    DEFAULT_SAMPLE_COUNT
}
fn default_encoding() -> String {
    DEFAULT_ENCODING.to_string()
}
fn default_format() -> String {
    DEFAULT_FORMAT.to_string()
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            mock: default_mock(),
            data_path: default_data_path(),
            backend: default_backend(),
            device_address: default_device_address(),
            device_index: default_device_index(),
            sample_count: default_sample_count(),
            seed: None,
        }
    }
}

impl Default for EncodingConfig {
    fn default() -> Self {
        Self {
            policy: default_encoding(),
        }
    }
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            format: default_format(),
            verbose: false,
        }
    }
}

/// Fully resolved parameters for one pipeline run
#[derive(Debug, Clone, PartialEq)]
pub struct RunConfig {
    pub mock: bool,
    pub data_path: PathBuf,
    pub backend: DeviceBackend,
    pub device_address: String,
    pub device_index: u32,
    pub sample_count: usize,
    pub seed: Option<u64>,
    pub api_key: Option<String>,
    pub encoding: EncodingPolicy,
    pub format: String,
    pub verbose: bool,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            mock: DEFAULT_MOCK,
            data_path: PathBuf::from(DEFAULT_DATA_PATH),
            backend: DeviceBackend::Anu,
            device_address: DEFAULT_DEVICE_ADDRESS.to_string(),
            device_index: DEFAULT_DEVICE_INDEX,
            sample_count: DEFAULT_SAMPLE_COUNT,
            seed: None,
            api_key: None,
            encoding: EncodingPolicy::default(),
            format: DEFAULT_FORMAT.to_string(),
            verbose: false,
        }
    }
}

impl Config {
    /// Get the config directory path
    pub fn config_dir() -> Result<PathBuf> {
        dirs::config_dir()
            .map(|p| p.join(APP_DIR_NAME))
            .ok_or_else(|| Error::Config("Could not determine config directory".to_string()))
    }

    /// Get the config file path
    pub fn config_path() -> Result<PathBuf> {
        Ok(Self::config_dir()?.join(CONFIG_FILE_NAME))
    }

    /// Load configuration from the default path
    ///
    /// Creates default config if file doesn't exist
    pub fn load() -> Result<Self> {
        let path = Self::config_path()?;

        if path.exists() {
            Self::load_from(&path)
        } else {
            let config = Config::default();
            config.save_to(&path)?;
            Ok(config)
        }
    }

    /// Load configuration from an explicit path
    ///
    /// Unlike `load`, a missing file is an error.
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("Failed to read config file: {}", e)))?;

        toml::from_str(&content)
            .map_err(|e| Error::Config(format!("Failed to parse config file: {}", e)))
    }

    /// Save configuration to the default path
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path()?)
    }

    /// Save configuration to an explicit path
    pub fn save_to(&self, path: &Path) -> Result<()> {
        // Ensure directory exists
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| {
                Error::Config(format!("Failed to create config directory: {}", e))
            })?;
        }

        let content = toml::to_string_pretty(self)
            .map_err(|e| Error::Config(format!("Failed to serialize config: {}", e)))?;

        fs::write(path, content)
            .map_err(|e| Error::Config(format!("Failed to write config file: {}", e)))?;

        Ok(())
    }

    /// Get a configuration value by key path
    ///
    /// Key format: "section.key"
    /// Returns the value as a string, or None if not found
    pub fn get(&self, key: &str) -> Option<String> {
        let parts: Vec<&str> = key.split('.').collect();

        match parts.as_slice() {
            ["source", "mock"] => Some(self.source.mock.to_string()),
            ["source", "data_path"] => Some(self.source.data_path.clone()),
            ["source", "backend"] => Some(self.source.backend.clone()),
            ["source", "device_address"] => Some(self.source.device_address.clone()),
            ["source", "device_index"] => Some(self.source.device_index.to_string()),
            ["source", "sample_count"] => Some(self.source.sample_count.to_string()),
            ["source", "seed"] => Some(
                self.source
                    .seed
                    .map(|s| s.to_string())
                    .unwrap_or_default(),
            ),

            ["encoding", "policy"] => Some(self.encoding.policy.clone()),

            ["report", "format"] => Some(self.report.format.clone()),
            ["report", "verbose"] => Some(self.report.verbose.to_string()),

            ["api_keys", "anu"] => Some(self.api_keys.anu.clone()),

            _ => None,
        }
    }

    /// Set a configuration value by key path
    ///
    /// Key format: "section.key"
    /// Returns error if key is invalid or value type is wrong
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        let parts: Vec<&str> = key.split('.').collect();

        match parts.as_slice() {
            ["source", "mock"] => {
                self.source.mock = value.parse().map_err(|_| {
                    Error::Config(format!("Invalid boolean value: {}", value))
                })?;
            }
            ["source", "data_path"] => {
                self.source.data_path = value.to_string();
            }
            ["source", "backend"] => {
                value
                    .parse::<DeviceBackend>()
                    .map_err(|e| Error::Config(e.to_string()))?;
                self.source.backend = value.to_lowercase();
            }
            ["source", "device_address"] => {
                self.source.device_address = value.to_string();
            }
            ["source", "device_index"] => {
                self.source.device_index = value.parse().map_err(|_| {
                    Error::Config(format!("Invalid device index: {}", value))
                })?;
            }
            ["source", "sample_count"] => {
                self.source.sample_count = value.parse().map_err(|_| {
                    Error::Config(format!("Invalid sample count: {}", value))
                })?;
            }
            ["source", "seed"] => {
                self.source.seed = if value.is_empty() {
                    None
                } else {
                    Some(value.parse().map_err(|_| {
                        Error::Config(format!("Invalid seed: {}", value))
                    })?)
                };
            }

            ["encoding", "policy"] => {
                value
                    .parse::<EncodingPolicy>()
                    .map_err(|e| Error::Config(e.to_string()))?;
                self.encoding.policy = value.to_string();
            }

            ["report", "format"] => {
                if get_formatter(value).is_none() {
                    return Err(Error::Config(format!("Unknown format: {}", value)));
                }
                self.report.format = value.to_lowercase();
            }
            ["report", "verbose"] => {
                self.report.verbose = value.parse().map_err(|_| {
                    Error::Config(format!("Invalid boolean value: {}", value))
                })?;
            }

            ["api_keys", "anu"] => {
                self.api_keys.anu = value.to_string();
            }

            _ => {
                return Err(Error::Config(format!("Unknown config key: {}", key)));
            }
        }

        Ok(())
    }

    /// List all available config keys
    pub fn available_keys() -> Vec<&'static str> {
        vec![
            "source.mock",
            "source.data_path",
            "source.backend",
            "source.device_address",
            "source.device_index",
            "source.sample_count",
            "source.seed",
            "encoding.policy",
            "report.format",
            "report.verbose",
            "api_keys.anu",
        ]
    }

    /// Resolve into typed run parameters
    ///
    /// Fails on an unknown backend or encoding name.
    pub fn to_run_config(&self) -> Result<RunConfig> {
        let api_key = if self.api_keys.anu.is_empty() {
            None
        } else {
            Some(self.api_keys.anu.clone())
        };

        Ok(RunConfig {
            mock: self.source.mock,
            data_path: PathBuf::from(&self.source.data_path),
            backend: self.source.backend.parse()?,
            device_address: self.source.device_address.clone(),
            device_index: self.source.device_index,
            sample_count: self.source.sample_count,
            seed: self.source.seed,
            api_key,
            encoding: self.encoding.policy.parse()?,
            format: self.report.format.clone(),
            verbose: self.report.verbose,
        })
    }
}
