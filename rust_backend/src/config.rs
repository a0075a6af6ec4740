//! Simulation configuration file support.
//!
//! Reads engine, playback and palette settings from a TOML file. Every field
//! has a default, so an empty file (or no file at all) yields a working setup.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::models::{Rgb, ScheduleMode, VisualizationStyle};

/// Errors raised while loading or validating configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),

    #[error("No sim4d.toml found in standard locations")]
    NotFound,
}

/// How an element linked to several visible activities gets its appearance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConflictPolicy {
    /// Activities are visited in ascending id order; the last visible one wins.
    #[default]
    LastWriteWins,
    /// The most severe draw state wins; ties fall back to last write.
    MostSevere,
}

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SimulationConfig {
    #[serde(default)]
    pub engine: EngineSettings,
    #[serde(default)]
    pub playback: PlaybackSettings,
    #[serde(default)]
    pub palette: Palette,
}

/// Settings consumed by the visibility engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineSettings {
    #[serde(default)]
    pub default_style: VisualizationStyle,
    #[serde(default = "default_highlight")]
    pub highlight_critical_path: bool,
    #[serde(default)]
    pub conflict_policy: ConflictPolicy,
    #[serde(default = "default_opacity_floor")]
    pub opacity_floor: f64,
    #[serde(default = "default_opacity_span")]
    pub opacity_span: f64,
}

/// Settings consumed by the timeline controller and playback driver.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlaybackSettings {
    #[serde(default = "default_tick_ms")]
    pub tick_ms: u64,
    #[serde(default = "default_speed")]
    pub default_speed: f64,
    #[serde(default = "default_max_speed")]
    pub max_speed: f64,
    #[serde(default)]
    pub default_mode: ScheduleMode,
}

/// Every colour the engine can emit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Palette {
    #[serde(default = "default_not_started")]
    pub not_started: Rgb,
    #[serde(default = "default_in_progress")]
    pub in_progress: Rgb,
    #[serde(default = "default_critical")]
    pub critical: Rgb,
    #[serde(default = "default_behind")]
    pub behind: Rgb,
    #[serde(default = "default_completed")]
    pub completed: Rgb,
    #[serde(default = "default_completed_ahead")]
    pub completed_ahead: Rgb,
    #[serde(default = "default_completed_late")]
    pub completed_late: Rgb,
    #[serde(default = "default_delayed")]
    pub delayed: Rgb,
    #[serde(default = "default_partial")]
    pub partial: Rgb,
    /// Colour-filter default for ids without an explicit entry.
    #[serde(default = "default_default_color")]
    pub default: Rgb,
}

fn default_highlight() -> bool {
    true
}

fn default_opacity_floor() -> f64 {
    0.3
}

fn default_opacity_span() -> f64 {
    0.7
}

fn default_tick_ms() -> u64 {
    1000
}

fn default_speed() -> f64 {
    1.0
}

fn default_max_speed() -> f64 {
    64.0
}

fn default_not_started() -> Rgb {
    Rgb::new(0xbd, 0xbd, 0xbd)
}

fn default_in_progress() -> Rgb {
    Rgb::new(0x1e, 0x88, 0xe5)
}

fn default_critical() -> Rgb {
    Rgb::new(0xe5, 0x39, 0x35)
}

fn default_behind() -> Rgb {
    Rgb::new(0xfb, 0x8c, 0x00)
}

fn default_completed() -> Rgb {
    Rgb::new(0x43, 0xa0, 0x47)
}

fn default_completed_ahead() -> Rgb {
    Rgb::new(0x00, 0x89, 0x7b)
}

fn default_completed_late() -> Rgb {
    Rgb::new(0x9e, 0x9d, 0x24)
}

fn default_delayed() -> Rgb {
    Rgb::new(0x8e, 0x24, 0xaa)
}

fn default_partial() -> Rgb {
    Rgb::new(0x90, 0xca, 0xf9)
}

fn default_default_color() -> Rgb {
    Rgb::new(0xff, 0xff, 0xff)
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            default_style: VisualizationStyle::default(),
            highlight_critical_path: default_highlight(),
            conflict_policy: ConflictPolicy::default(),
            opacity_floor: default_opacity_floor(),
            opacity_span: default_opacity_span(),
        }
    }
}

impl Default for PlaybackSettings {
    fn default() -> Self {
        Self {
            tick_ms: default_tick_ms(),
            default_speed: default_speed(),
            max_speed: default_max_speed(),
            default_mode: ScheduleMode::default(),
        }
    }
}

impl PlaybackSettings {
    /// Host tick at speed 1.0.
    pub fn base_tick(&self) -> Duration {
        Duration::from_millis(self.tick_ms)
    }
}

impl Default for Palette {
    fn default() -> Self {
        Self {
            not_started: default_not_started(),
            in_progress: default_in_progress(),
            critical: default_critical(),
            behind: default_behind(),
            completed: default_completed(),
            completed_ahead: default_completed_ahead(),
            completed_late: default_completed_late(),
            delayed: default_delayed(),
            partial: default_partial(),
            default: default_default_color(),
        }
    }
}

impl SimulationConfig {
    /// Load configuration from a TOML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_toml_str(&content)?;
        log::info!("Loaded simulation config from {}", path.display());
        Ok(config)
    }

    /// Parse and validate configuration from TOML text.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: SimulationConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from the default location.
    ///
    /// Searches for `sim4d.toml` in:
    /// 1. Current directory
    /// 2. `config/` directory
    /// 3. Parent directory
    pub fn from_default_location() -> Result<Self, ConfigError> {
        let search_paths = [
            PathBuf::from("sim4d.toml"),
            PathBuf::from("config/sim4d.toml"),
            PathBuf::from("../sim4d.toml"),
        ];

        for path in search_paths {
            if path.exists() {
                return Self::from_file(&path);
            }
        }

        Err(ConfigError::NotFound)
    }

    /// Default location if present, built-in defaults otherwise.
    pub fn load_or_default() -> Result<Self, ConfigError> {
        match Self::from_default_location() {
            Err(ConfigError::NotFound) => {
                log::debug!("No sim4d.toml found; using built-in defaults");
                Ok(Self::default())
            }
            other => other,
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let engine = &self.engine;
        if !(0.0..=1.0).contains(&engine.opacity_floor) {
            return Err(ConfigError::Invalid(format!(
                "engine.opacity_floor must be within [0, 1], got {}",
                engine.opacity_floor
            )));
        }
        if !(0.0..=1.0).contains(&engine.opacity_span)
            || engine.opacity_floor + engine.opacity_span > 1.0 + f64::EPSILON
        {
            return Err(ConfigError::Invalid(format!(
                "engine.opacity_span must keep opacity within [0, 1], got floor {} + span {}",
                engine.opacity_floor, engine.opacity_span
            )));
        }

        let playback = &self.playback;
        if playback.tick_ms == 0 {
            return Err(ConfigError::Invalid(
                "playback.tick_ms must be positive".to_string(),
            ));
        }
        if !(playback.max_speed.is_finite() && playback.max_speed > 0.0) {
            return Err(ConfigError::Invalid(format!(
                "playback.max_speed must be a positive number, got {}",
                playback.max_speed
            )));
        }
        if !(playback.default_speed.is_finite()
            && playback.default_speed > 0.0
            && playback.default_speed <= playback.max_speed)
        {
            return Err(ConfigError::Invalid(format!(
                "playback.default_speed must be within (0, {}], got {}",
                playback.max_speed, playback.default_speed
            )));
        }
        Ok(())
    }
}
