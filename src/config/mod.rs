//! Domain constants and engine configuration loading.

use crate::model::{FireRateInput, WeaponClass};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Health pool every TTK is computed against. Not configurable.
pub const HEALTH_POOL: f64 = 100.0;

/// Upper bound applied to a real rate-per-minute input.
pub const MAX_REAL_RATE: f64 = 2000.0;

/// Ceiling used when no weapon class is known and no override is given.
pub const UNKNOWN_CLASS_CEILING: f64 = 800.0;

/// Single ceiling used to bring fire rate and muzzle velocity onto a 0-100 scale.
pub const NORMALIZATION_CEILING: f64 = 1200.0;

/// Score a label must reach to be "recommended" rather than "most suited".
pub const RECOMMEND_THRESHOLD: f64 = 65.0;

/// Maximum size in bytes for an OCR text dump or stat file read from disk.
pub const MAX_TEXT_BYTES: usize = 256 * 1024;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// Engine defaults applied when the caller does not specify them.
#[derive(Debug, Clone, Deserialize)]
pub struct EngineConfig {
    /// Weapon class assumed for extracted records.
    #[serde(default)]
    pub weapon_class: Option<WeaponClass>,
    /// How an extracted fire-rate number is interpreted.
    #[serde(default)]
    pub fire_rate_input: FireRateInput,
    /// Ceiling override for stat-bar fire rates.
    #[serde(default)]
    pub max_rate_override: Option<f64>,
    #[serde(default)]
    pub ocr: OcrConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OcrConfig {
    /// Tesseract executable (name on PATH or absolute path).
    #[serde(default = "default_ocr_program")]
    pub program: PathBuf,
    #[serde(default = "default_ocr_language")]
    pub language: String,
    /// Tesseract `--psm` value; 6 treats the image as one uniform text block.
    #[serde(default = "default_page_segmentation")]
    pub page_segmentation: u8,
}

fn default_ocr_program() -> PathBuf {
    PathBuf::from("tesseract")
}

fn default_ocr_language() -> String {
    "eng".to_string()
}

fn default_page_segmentation() -> u8 {
    6
}

impl Default for OcrConfig {
    fn default() -> Self {
        Self {
            program: default_ocr_program(),
            language: default_ocr_language(),
            page_segmentation: default_page_segmentation(),
        }
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            weapon_class: None,
            fire_rate_input: FireRateInput::default(),
            max_rate_override: None,
            ocr: OcrConfig::default(),
        }
    }
}

impl EngineConfig {
    /// Load from a TOML file, or return defaults when no path is given.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let cfg: EngineConfig = toml::from_str(content)?;
        cfg.validate()?;
        Ok(cfg)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if let Some(ceiling) = self.max_rate_override {
            if !ceiling.is_finite() || ceiling <= 0.0 {
                return Err(ConfigError::Invalid(format!(
                    "max_rate_override must be positive, got {}",
                    ceiling
                )));
            }
        }
        if self.ocr.program.as_os_str().is_empty() {
            return Err(ConfigError::Invalid("ocr.program is empty".to_string()));
        }
        if self.ocr.language.trim().is_empty() {
            return Err(ConfigError::Invalid("ocr.language is empty".to_string()));
        }
        Ok(())
    }
}
