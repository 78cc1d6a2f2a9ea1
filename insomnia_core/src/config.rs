//! Configuration file support for the diagnosis engine.
//!
//! Configuration is loaded from `$XDG_CONFIG_HOME/insomnia-dx/config.toml`.
//! Every field has a default matching the reference scoring behavior, so an
//! absent or partial file is always valid.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Engine configuration
#[derive(Clone, Debug, Serialize, Deserialize, Default, PartialEq)]
pub struct Config {
    #[serde(default)]
    pub severity: SeverityConfig,

    #[serde(default)]
    pub flows: FlowConfig,

    #[serde(default)]
    pub treatment: TreatmentConfig,

    #[serde(default)]
    pub confidence: ConfidenceConfig,
}

/// Severity tier thresholds and sum rules
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct SeverityConfig {
    /// Scores at or above this need no treatment
    #[serde(default = "default_none_needed_min")]
    pub none_needed_min: i32,

    /// Lowest score classified as primary insomnia
    #[serde(default = "default_primary_min")]
    pub primary_min: i32,

    /// Lowest score classified as middle insomnia; anything below is advanced
    #[serde(default = "default_middle_min")]
    pub middle_min: i32,

    /// Add the medication-duration question to the severity sum
    #[serde(default)]
    pub include_medication_duration: bool,
}

impl Default for SeverityConfig {
    fn default() -> Self {
        Self {
            none_needed_min: default_none_needed_min(),
            primary_min: default_primary_min(),
            middle_min: default_middle_min(),
            include_medication_duration: false,
        }
    }
}

/// Which special flow wins when both would fire
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum FlowPrecedence {
    #[default]
    PerfectSleepFirst,
    LongTermMedicationFirst,
}

/// Special flow configuration
#[derive(Clone, Debug, Serialize, Deserialize, Default, PartialEq)]
pub struct FlowConfig {
    #[serde(default)]
    pub precedence: FlowPrecedence,
}

/// Treatment selection parameters
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct TreatmentConfig {
    /// Recommend the single fixed tea when the score equals `fixed_tea_score`
    #[serde(default = "default_fixed_tea_enabled")]
    pub fixed_tea_enabled: bool,

    #[serde(default = "default_fixed_tea_score")]
    pub fixed_tea_score: i32,
}

impl Default for TreatmentConfig {
    fn default() -> Self {
        Self {
            fixed_tea_enabled: default_fixed_tea_enabled(),
            fixed_tea_score: default_fixed_tea_score(),
        }
    }
}

impl TreatmentConfig {
    /// The score that triggers the fixed tea, if enabled
    pub fn fixed_tea_trigger(&self) -> Option<i32> {
        self.fixed_tea_enabled.then_some(self.fixed_tea_score)
    }
}

/// Confidence estimation parameters
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct ConfidenceConfig {
    /// Pattern-axis score treated as full confidence
    #[serde(default = "default_pattern_axis_cap")]
    pub pattern_axis_cap: u32,
}

impl Default for ConfidenceConfig {
    fn default() -> Self {
        Self {
            pattern_axis_cap: default_pattern_axis_cap(),
        }
    }
}

// Default value functions
fn default_none_needed_min() -> i32 {
    103
}

fn default_primary_min() -> i32 {
    60
}

fn default_middle_min() -> i32 {
    45
}

fn default_fixed_tea_enabled() -> bool {
    true
}

fn default_fixed_tea_score() -> i32 {
    74
}

fn default_pattern_axis_cap() -> u32 {
    4
}

impl Config {
    /// Load configuration from the standard config path
    pub fn load() -> Result<Self> {
        let config_path = Self::default_config_path();
        if config_path.exists() {
            Self::load_from(&config_path)
        } else {
            tracing::info!(
                "No config file found at {:?}, using defaults",
                config_path
            );
            Ok(Self::default())
        }
    }

    /// Load configuration from a specific path
    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)?;
        config.validate()?;
        tracing::info!("Loaded config from {:?}", path);
        Ok(config)
    }

    /// Get the default config file path
    pub fn default_config_path() -> PathBuf {
        let base = dirs::config_dir()
            .or_else(|| dirs::home_dir().map(|home| home.join(".config")))
            .unwrap_or_else(|| PathBuf::from(".config"));
        base.join("insomnia-dx").join("config.toml")
    }

    /// Save the current configuration to the default path
    pub fn save(&self) -> Result<()> {
        let config_path = Self::default_config_path();
        self.save_to(&config_path)
    }

    /// Save the current configuration to a specific path
    pub fn save_to(&self, path: &Path) -> Result<()> {
        // Ensure parent directory exists
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let contents = toml::to_string_pretty(self)
            .map_err(|e| Error::Config(format!("Failed to serialize config: {}", e)))?;
        std::fs::write(path, contents)?;
        tracing::info!("Saved config to {:?}", path);
        Ok(())
    }

    /// Check that thresholds are strictly descending and the confidence cap is positive
    pub fn validate(&self) -> Result<()> {
        let s = &self.severity;
        if !(s.none_needed_min > s.primary_min && s.primary_min > s.middle_min) {
            return Err(Error::Config(format!(
                "Severity thresholds must be strictly descending \
                 (none_needed_min {} > primary_min {} > middle_min {})",
                s.none_needed_min, s.primary_min, s.middle_min
            )));
        }
        if self.confidence.pattern_axis_cap == 0 {
            return Err(Error::Config(
                "confidence.pattern_axis_cap must be greater than 0".into(),
            ));
        }
        Ok(())
    }
}
