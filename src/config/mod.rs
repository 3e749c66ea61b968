//! # Configuration Management Module
//!
//! Loads, validates and writes the TOML configuration that wires the game core:
//! scene names, quit behaviour, threat-gauge thresholds, decor scrolling and the
//! headless simulation loop.
//!
//! ## Configuration Structure
//!
//! - [`GameConfig`] - run mode and file locations for scores/settings
//! - [`SceneNames`] - scenes requested on each transition
//! - [`ThreatConfig`] - threat band thresholds and blink interval
//! - [`DecorConfig`] - background scroll speed and tile length
//! - [`SimulationConfig`] - frame rate of the headless driver
//! - [`LoggingConfig`] - log level and optional log file
//!
//! ## Usage
//!
//! ```rust,no_run
//! use downhill::config::Config;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::load("downhill.toml").await?;
//!     config.validate()?;
//!     println!("Gameplay scene: {}", config.scenes.gameplay);
//!
//!     Config::create_default("downhill.toml").await?;
//!     Ok(())
//! }
//! ```
//!
//! ## Configuration File Format
//!
//! ```toml
//! [game]
//! run_mode = "packaged"
//! high_score_capacity = 10
//!
//! [scenes]
//! main_menu = "MainMenu"
//! gameplay = "Gameplay"
//! tutorial = "Tutorial"
//! game_over = "GameOver"
//!
//! [threat]
//! elevated = 40.0
//! danger = 70.0
//! critical = 90.0
//! blink_interval_ms = 250
//! ```

use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};
use tokio::fs;

use crate::errors::ConfigError;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub game: GameConfig,
    #[serde(default)]
    pub scenes: SceneNames,
    #[serde(default)]
    pub threat: ThreatConfig,
    #[serde(default)]
    pub decor: DecorConfig,
    #[serde(default)]
    pub simulation: SimulationConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// How a quit request reaches the host.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum RunMode {
    /// Development harness: stop the loop, keep the process.
    Harness,
    #[default]
    Packaged,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameConfig {
    #[serde(default)]
    pub run_mode: RunMode,
    /// Number of entries kept in the high-score table.
    #[serde(default = "default_high_score_capacity")]
    pub high_score_capacity: usize,
    #[serde(default = "default_high_score_file")]
    pub high_score_file: String,
    #[serde(default = "default_settings_file")]
    pub settings_file: String,
}

fn default_high_score_capacity() -> usize {
    10
}

fn default_high_score_file() -> String {
    "data/highscores.json".to_string()
}

fn default_settings_file() -> String {
    "data/settings.toml".to_string()
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            run_mode: RunMode::default(),
            high_score_capacity: default_high_score_capacity(),
            high_score_file: default_high_score_file(),
            settings_file: default_settings_file(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct SceneNames {
    pub main_menu: String,
    pub gameplay: String,
    pub tutorial: String,
    pub game_over: String,
}

impl Default for SceneNames {
    fn default() -> Self {
        Self {
            main_menu: "MainMenu".to_string(),
            gameplay: "Gameplay".to_string(),
            tutorial: "Tutorial".to_string(),
            game_over: "GameOver".to_string(),
        }
    }
}

/// Threat percentages at which the gauge enters each band.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ThreatConfig {
    pub elevated: f32,
    pub danger: f32,
    pub critical: f32,
    pub blink_interval_ms: u64,
}

impl Default for ThreatConfig {
    fn default() -> Self {
        Self {
            elevated: 40.0,
            danger: 70.0,
            critical: 90.0,
            blink_interval_ms: 250,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DecorConfig {
    /// World units per second; negative scrolls the other way.
    pub scroll_speed: f32,
    pub tile_length: f32,
}

impl Default for DecorConfig {
    fn default() -> Self {
        Self {
            scroll_speed: 6.0,
            tile_length: 48.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct SimulationConfig {
    pub frame_rate: u32,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self { frame_rate: 60 }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
    pub file: Option<String>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            file: Some("downhill.log".to_string()),
        }
    }
}

impl Config {
    /// Load configuration from a file
    pub async fn load(path: &str) -> Result<Self> {
        let content = fs::read_to_string(path)
            .await
            .map_err(|e| anyhow!("Failed to read config file {}: {}", path, e))?;

        let config: Config = toml::from_str(&content)
            .map_err(|e| anyhow!("Failed to parse config file {}: {}", path, e))?;

        Ok(config)
    }

    /// Create a default configuration file
    pub async fn create_default(path: &str) -> Result<()> {
        let config = Config::default();
        let content = toml::to_string_pretty(&config)
            .map_err(|e| anyhow!("Failed to serialize default config: {}", e))?;

        fs::write(path, content)
            .await
            .map_err(|e| anyhow!("Failed to write config file {}: {}", path, e))?;

        Ok(())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let t = &self.threat;
        let ordered = 0.0 < t.elevated
            && t.elevated < t.danger
            && t.danger < t.critical
            && t.critical <= 100.0;
        if !ordered {
            return Err(ConfigError::ThresholdOrder {
                elevated: t.elevated,
                danger: t.danger,
                critical: t.critical,
            });
        }
        if t.blink_interval_ms == 0 {
            return Err(ConfigError::BlinkInterval);
        }
        // `!(x > 0)` also rejects NaN
        if !(self.decor.tile_length > 0.0) {
            return Err(ConfigError::TileLength(self.decor.tile_length));
        }
        if self.simulation.frame_rate == 0 {
            return Err(ConfigError::FrameRate);
        }
        if self.game.high_score_capacity == 0 {
            return Err(ConfigError::HighScoreCapacity);
        }
        let scenes = [
            ("main_menu", &self.scenes.main_menu),
            ("gameplay", &self.scenes.gameplay),
            ("tutorial", &self.scenes.tutorial),
            ("game_over", &self.scenes.game_over),
        ];
        for (key, name) in scenes {
            if name.trim().is_empty() {
                return Err(ConfigError::EmptySceneName(key));
            }
        }
        Ok(())
    }
}
