use crate::error::ArpadlError;
use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default = "default_data_dir")]
    pub data_dir: String,
    #[serde(default)]
    pub synthesis: SynthesisConfig,
    #[serde(default)]
    pub vaep: VaepConfig,
    #[serde(default)]
    pub mock: MockConfig,
}

/// Thresholds for the derived-action passes.
#[derive(Debug, Clone, Deserialize)]
pub struct SynthesisConfig {
    #[serde(default = "default_min_carry_length")]
    pub min_carry_length: f64,
    #[serde(default = "default_min_carry_time")]
    pub min_carry_time: f64,
    #[serde(default = "default_min_penalty_distance")]
    pub min_penalty_distance: f64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct VaepConfig {
    #[serde(default = "default_nb_prev_actions")]
    pub nb_prev_actions: usize,
    #[serde(default = "default_nr_actions")]
    pub nr_actions: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MockConfig {
    #[serde(default = "default_false")]
    pub enabled: bool,
    #[serde(default = "default_seed")]
    pub seed: u64,
    #[serde(default = "default_events_per_period")]
    pub events_per_period: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            synthesis: SynthesisConfig::default(),
            vaep: VaepConfig::default(),
            mock: MockConfig::default(),
        }
    }
}

impl Default for SynthesisConfig {
    fn default() -> Self {
        Self {
            min_carry_length: default_min_carry_length(),
            min_carry_time: default_min_carry_time(),
            min_penalty_distance: default_min_penalty_distance(),
        }
    }
}

impl Default for VaepConfig {
    fn default() -> Self {
        Self {
            nb_prev_actions: default_nb_prev_actions(),
            nr_actions: default_nr_actions(),
        }
    }
}

impl Default for MockConfig {
    fn default() -> Self {
        Self {
            enabled: default_false(),
            seed: default_seed(),
            events_per_period: default_events_per_period(),
        }
    }
}

impl Config {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config from {:?}", path.as_ref()))?;
        let config: Config = toml::from_str(&content).context("Failed to parse config TOML")?;
        config.validate()?;
        Ok(config)
    }

    /// Rejects settings that would make the pipeline meaningless before any
    /// row is processed.
    pub fn validate(&self) -> Result<(), ArpadlError> {
        if self.vaep.nb_prev_actions < 1 {
            return Err(ArpadlError::Config(
                "vaep.nb_prev_actions must be at least 1".to_string(),
            ));
        }
        if self.vaep.nr_actions < 1 {
            return Err(ArpadlError::Config(
                "vaep.nr_actions must be at least 1".to_string(),
            ));
        }
        let thresholds = [
            ("synthesis.min_carry_length", self.synthesis.min_carry_length),
            ("synthesis.min_carry_time", self.synthesis.min_carry_time),
            ("synthesis.min_penalty_distance", self.synthesis.min_penalty_distance),
        ];
        for (name, value) in thresholds {
            if !value.is_finite() || value < 0.0 {
                return Err(ArpadlError::Config(format!(
                    "{} must be a non-negative number, got {}",
                    name, value
                )));
            }
        }
        Ok(())
    }
}

fn default_data_dir() -> String {
    "data".to_string()
}

fn default_min_carry_length() -> f64 {
    3.0
}

fn default_min_carry_time() -> f64 {
    2.0
}

fn default_min_penalty_distance() -> f64 {
    50.0
}

fn default_nb_prev_actions() -> usize {
    3
}

fn default_nr_actions() -> usize {
    10
}

fn default_false() -> bool {
    false
}

fn default_seed() -> u64 {
    42
}

fn default_events_per_period() -> usize {
    120
}
