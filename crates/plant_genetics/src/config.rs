//! Tuning configuration, loadable from RON.
//!
//! ```ron
//! (
//!     breeding: (mutation_rate: 0.05, variation: 0.3),
//!     rng_seed: Some(1234567890),
//! )
//! ```

use std::path::Path;

use bevy::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::info;

/// Largest accepted `variation`: the width of every quantitative range (1..=5).
pub const MAX_VARIATION: f64 = 4.0;

/// Breeding constants. Not domain law, just tuning.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BreedingConfig {
    /// Chance per trait that an offspring gene mutates.
    pub mutation_rate: f64,
    /// Half-width of the uniform noise added to inherited quantitative values.
    pub variation: f64,
}

impl Default for BreedingConfig {
    fn default() -> Self {
        Self {
            mutation_rate: 0.05,
            variation: 0.3,
        }
    }
}

impl BreedingConfig {
    /// Clamps both values into their usable ranges. Non-finite values become 0.
    pub fn sanitized(self) -> Self {
        let clamp = |value: f64, max: f64| {
            if value.is_finite() {
                value.clamp(0.0, max)
            } else {
                0.0
            }
        };
        Self {
            mutation_rate: clamp(self.mutation_rate, 1.0),
            variation: clamp(self.variation, MAX_VARIATION),
        }
    }
}

#[derive(Resource, Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneticsConfig {
    pub breeding: BreedingConfig,
    /// Fixed seed for reproducible runs; OS entropy when `None`.
    pub rng_seed: Option<u64>,
}

impl GeneticsConfig {
    pub fn from_ron_str(source: &str) -> Result<Self, ConfigError> {
        let config: Self =
            ron::from_str(source).map_err(|e| ConfigError::Deserialization(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let source =
            std::fs::read_to_string(path.as_ref()).map_err(|e| ConfigError::Io(e.to_string()))?;
        let config = Self::from_ron_str(&source)?;
        info!("Genetics config loaded from {}", path.as_ref().display());
        Ok(config)
    }

    pub fn to_ron_string(&self) -> Result<String, ConfigError> {
        ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default())
            .map_err(|e| ConfigError::Serialization(e.to_string()))
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let BreedingConfig {
            mutation_rate,
            variation,
        } = self.breeding;
        if !(0.0..=1.0).contains(&mutation_rate) {
            return Err(ConfigError::Invalid(format!(
                "mutation_rate must be within 0..=1, got {mutation_rate}"
            )));
        }
        if !(0.0..=MAX_VARIATION).contains(&variation) {
            return Err(ConfigError::Invalid(format!(
                "variation must be within 0..={MAX_VARIATION}, got {variation}"
            )));
        }
        Ok(())
    }
}

/// Error types for loading the configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(String),
    #[error("Serialization error: {0}")]
    Serialization(String),
    #[error("Deserialization error: {0}")]
    Deserialization(String),
    #[error("Invalid config: {0}")]
    Invalid(String),
}
