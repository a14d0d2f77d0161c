// src/config.rs

//! Defines the configuration structures for the simulator.
//!
//! Settings are deserialized from a JSON file named by the `HMI_SIM_CONFIG`
//! environment variable. Every section has defaults, so a file only needs the
//! keys it wants to change, and no file at all is a valid configuration.
//!
//! The simulated screen resolution is not configurable: it is a build-time
//! constant shared by every component (see [`crate::framebuffer`]).

use log::{info, warn};
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

/// Environment variable holding the path of the configuration file.
pub const CONFIG_ENV_VAR: &str = "HMI_SIM_CONFIG";

/// Process-wide configuration, loaded on first use.
pub static CONFIG: Lazy<Config> = Lazy::new(Config::load_or_default);

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

// --- Top-Level Configuration Structure ---

/// Represents the complete configuration for the simulator.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(default)]
pub struct Config {
    /// Tick loop settings.
    pub simulation: SimulationConfig,
    /// Host window and presentation settings.
    pub display: DisplayConfig,
    /// Host mapping of the simulated physical controls.
    pub controls: ControlsConfig,
}

impl Config {
    /// Reads and parses a configuration file.
    pub fn from_file(path: &Path) -> Result<Config, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn from_json(text: &str) -> Result<Config, serde_json::Error> {
        serde_json::from_str(text)
    }

    /// Loads the file named by `HMI_SIM_CONFIG`, falling back to defaults
    /// when the variable is unset or the file is unusable.
    pub fn load_or_default() -> Config {
        let Some(path) = std::env::var_os(CONFIG_ENV_VAR) else {
            info!("Config: {} not set, using defaults", CONFIG_ENV_VAR);
            return Config::default();
        };
        match Config::from_file(Path::new(&path)) {
            Ok(config) => {
                info!("Config: loaded {}", Path::new(&path).display());
                config
            }
            Err(e) => {
                warn!("Config: {}. Using defaults.", e);
                Config::default()
            }
        }
    }
}

// --- Simulation Configuration ---

/// Settings for the fixed-period tick.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SimulationConfig {
    /// Period of the simulation tick in milliseconds.
    pub tick_period_ms: u64,
    /// Period of the engine's memory monitor task in milliseconds.
    pub memory_monitor_period_ms: u32,
    /// How long a headless run lasts before exiting, in milliseconds.
    pub headless_run_ms: u64,
}

impl SimulationConfig {
    pub fn tick_period(&self) -> Duration {
        Duration::from_millis(self.tick_period_ms.max(1))
    }

    pub fn headless_run(&self) -> Duration {
        Duration::from_millis(self.headless_run_ms)
    }
}

impl Default for SimulationConfig {
    fn default() -> Self {
        SimulationConfig {
            tick_period_ms: 5,
            memory_monitor_period_ms: 30_000,
            headless_run_ms: 2_000,
        }
    }
}

// --- Display Configuration ---

/// Settings for the host window and its refresh cadence.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DisplayConfig {
    /// Interval between presents, i.e. the host refresh cadence.
    pub present_interval_ms: u64,
    /// Integer magnification of the simulated screen in the host window.
    pub window_scale: u32,
    /// Host window title.
    pub title: String,
}

impl DisplayConfig {
    pub fn present_interval(&self) -> Duration {
        Duration::from_millis(self.present_interval_ms.max(1))
    }
}

impl Default for DisplayConfig {
    fn default() -> Self {
        DisplayConfig {
            present_interval_ms: 16, // ~60 Hz
            window_scale: 2,
            title: "HMI Simulator".to_string(),
        }
    }
}

// --- Controls Configuration ---

/// Host keyboard mapping for the physical controls.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ControlsConfig {
    /// Key that acts as the board's push button.
    pub button_key: char,
}

impl Default for ControlsConfig {
    fn default() -> Self {
        ControlsConfig { button_key: ' ' }
    }
}
