//! Generator configuration.
//!
//! Handles loading and validating `layergen.toml`. Configuration is sparse:
//! every field has a default, and a missing file means stock defaults.
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! # Layer draw order, bottom to top. Each entry names a category directory
//! # under assets/. Exactly three layers: base, character, overlay.
//! layers = ["background", "character", "overlay"]
//!
//! # Probability that the third layer is drawn on a given image (0.0 - 1.0).
//! overlay_chance = 0.25
//! ```
//!
//! Unknown keys are rejected to catch typos early.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Number of layers composition expects: base, character, overlay.
pub const LAYER_COUNT: usize = 3;

/// Generator configuration loaded from `layergen.toml`.
///
/// All fields have defaults. User config files need only specify the values
/// they want to override. Unknown keys are rejected.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GeneratorConfig {
    /// Layer draw order, bottom to top. Category names under `assets/`.
    pub layers: Vec<String>,
    /// Probability that the third layer is drawn, per image.
    pub overlay_chance: f64,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            layers: vec![
                "background".to_string(),
                "character".to_string(),
                "overlay".to_string(),
            ],
            overlay_chance: 0.25,
        }
    }
}

impl GeneratorConfig {
    /// Validate config values are within acceptable ranges.
    ///
    /// The three-layer arity is part of the composition contract, so it is
    /// enforced here rather than discovered mid-run.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.layers.len() != LAYER_COUNT {
            return Err(ConfigError::Validation(format!(
                "layers must name exactly {} categories, got {}",
                LAYER_COUNT,
                self.layers.len()
            )));
        }
        if self.layers.iter().any(|l| l.is_empty()) {
            return Err(ConfigError::Validation(
                "layers entries must not be empty".into(),
            ));
        }
        let distinct: HashSet<&str> = self.layers.iter().map(String::as_str).collect();
        if distinct.len() != self.layers.len() {
            return Err(ConfigError::Validation(
                "layers entries must be distinct".into(),
            ));
        }
        if !(0.0..=1.0).contains(&self.overlay_chance) {
            return Err(ConfigError::Validation(
                "overlay_chance must be between 0.0 and 1.0".into(),
            ));
        }
        Ok(())
    }
}

/// Load and validate config from `path`. A missing file yields defaults.
pub fn load_config(path: &Path) -> Result<GeneratorConfig, ConfigError> {
    let config = if path.exists() {
        let content = fs::read_to_string(path)?;
        toml::from_str(&content)?
    } else {
        GeneratorConfig::default()
    };
    config.validate()?;
    Ok(config)
}

/// Stock `layergen.toml` with every option documented.
pub fn stock_config_toml() -> &'static str {
    r#"# layergen configuration
# All options are optional - defaults shown below.

# Layer draw order, bottom to top. Each entry names a category directory
# under assets/. Exactly three layers: base, character, overlay.
layers = ["background", "character", "overlay"]

# Probability that the third layer is drawn on a given image (0.0 - 1.0).
overlay_chance = 0.25
"#
}
