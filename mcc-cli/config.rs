use mcc_core::{GrayImage, MccConfig, MccError, MccResult, MinutiaPoint};
use mcc_orientation::FilterBankConfig;

use crate::builder::PipelineBuilder;

#[cfg(feature = "serde")]
use crate::CliError;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// What to do with minutiae that fall outside the image
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum MinutiaPolicy {
    /// Fail with `MinutiaOutOfBounds`
    #[default]
    Reject,
    /// Move the point to the nearest pixel
    Clamp,
    /// Pass through untouched; descriptors read angle 0 off-field
    Trust,
}

impl MinutiaPolicy {
    pub fn apply(&self, points: &[MinutiaPoint], img: &GrayImage) -> MccResult<Vec<MinutiaPoint>> {
        let (width, height) = (img.width(), img.height());
        match self {
            MinutiaPolicy::Trust => Ok(points.to_vec()),
            MinutiaPolicy::Reject => {
                if let Some(p) = points.iter().find(|p| !p.is_within(width, height)) {
                    return Err(MccError::MinutiaOutOfBounds {
                        row: p.row,
                        col: p.col,
                        width,
                        height,
                    });
                }
                Ok(points.to_vec())
            }
            MinutiaPolicy::Clamp => {
                if width == 0 || height == 0 {
                    return Err(MccError::InvalidImageSize { width, height });
                }
                let max_row = (height - 1).min(i32::MAX as usize) as i32;
                let max_col = (width - 1).min(i32::MAX as usize) as i32;
                Ok(points
                    .iter()
                    .map(|p| MinutiaPoint::new(p.row.clamp(0, max_row), p.col.clamp(0, max_col)))
                    .collect())
            }
        }
    }
}

/// Complete pipeline configuration with all settings
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PipelineConfig {
    /// Core MCC parameters
    pub core: MccConfig,
    /// Compute the directional filter bank alongside each template
    pub filter_bank_enabled: bool,
    pub filter_bank: FilterBankConfig,
    pub minutia_policy: MinutiaPolicy,
    /// Metadata
    #[cfg_attr(feature = "serde", serde(skip_serializing_if = "Option::is_none", default))]
    pub name: Option<String>,
    #[cfg_attr(feature = "serde", serde(skip_serializing_if = "Option::is_none", default))]
    pub description: Option<String>,
    #[cfg_attr(feature = "serde", serde(skip_serializing_if = "Option::is_none", default))]
    pub version: Option<String>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl PipelineConfig {
    /// Create new configuration with default settings
    pub fn new() -> Self {
        Self {
            core: MccConfig::default(),
            filter_bank_enabled: false,
            filter_bank: FilterBankConfig::default(),
            minutia_policy: MinutiaPolicy::Reject,
            name: None,
            description: None,
            version: None,
        }
    }

    /// Reference parameters: 16px blocks, radius 16, 8x8 cells, top 10
    pub fn reference_preset() -> Self {
        Self {
            name: Some("Reference".to_string()),
            description: Some("Default MCC parameters".to_string()),
            version: Some("1.0".to_string()),
            ..Self::new()
        }
    }

    /// Wider, finer cylinders and a larger pool for high-resolution scans
    pub fn dense_preset() -> Self {
        Self {
            core: MccConfig {
                radius: 24,
                bins: 12,
                top_k: 20,
                ..MccConfig::default()
            },
            name: Some("Dense".to_string()),
            description: Some("Larger neighbourhoods with finer cells".to_string()),
            version: Some("1.0".to_string()),
            ..Self::new()
        }
    }

    /// Reference parameters plus filter bank output, tolerant of stray minutiae
    pub fn diagnostic_preset() -> Self {
        Self {
            filter_bank_enabled: true,
            minutia_policy: MinutiaPolicy::Clamp,
            name: Some("Diagnostic".to_string()),
            description: Some("Reference matching with filter bank responses attached".to_string()),
            version: Some("1.0".to_string()),
            ..Self::new()
        }
    }

    /// Add metadata to configuration
    pub fn with_metadata(mut self, name: &str, description: &str) -> Self {
        self.name = Some(name.to_string());
        self.description = Some(description.to_string());
        self.version = Some("1.0".to_string());
        self
    }

    /// Convert to PipelineBuilder for further customization
    pub fn to_builder(self) -> PipelineBuilder {
        PipelineBuilder::from_config(self)
    }

    /// Generate human-readable summary
    pub fn summary(&self) -> String {
        format!(
            "PipelineConfig: block={}, radius={}, bins={}, top_k={}, threads={}, filter_bank={}, policy={:?}",
            self.core.block_size,
            self.core.radius,
            self.core.bins,
            self.core.top_k,
            self.core.n_threads,
            self.filter_bank_enabled,
            self.minutia_policy
        )
    }

    /// Validate configuration parameters
    pub fn validate(&self) -> MccResult<()> {
        self.core.validate()?;
        if self.filter_bank_enabled {
            self.filter_bank.validate()?;
        }
        Ok(())
    }

    /// Save configuration to JSON file
    #[cfg(feature = "serde")]
    pub fn save_json<P: AsRef<std::path::Path>>(&self, path: P) -> Result<(), CliError> {
        std::fs::write(path, self.to_json()?)?;
        Ok(())
    }

    /// Load configuration from JSON file
    #[cfg(feature = "serde")]
    pub fn load_json<P: AsRef<std::path::Path>>(path: P) -> Result<Self, CliError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    /// Save configuration to TOML file
    #[cfg(feature = "serde")]
    pub fn save_toml<P: AsRef<std::path::Path>>(&self, path: P) -> Result<(), CliError> {
        std::fs::write(path, self.to_toml()?)?;
        Ok(())
    }

    /// Load configuration from TOML file
    #[cfg(feature = "serde")]
    pub fn load_toml<P: AsRef<std::path::Path>>(path: P) -> Result<Self, CliError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    /// Load from `.toml` or, for any other extension, JSON
    #[cfg(feature = "serde")]
    pub fn load<P: AsRef<std::path::Path>>(path: P) -> Result<Self, CliError> {
        let is_toml = path
            .as_ref()
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("toml"));
        if is_toml {
            Self::load_toml(path)
        } else {
            Self::load_json(path)
        }
    }

    #[cfg(feature = "serde")]
    pub fn to_json(&self) -> Result<String, CliError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    #[cfg(feature = "serde")]
    pub fn from_json(json: &str) -> Result<Self, CliError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    #[cfg(feature = "serde")]
    pub fn to_toml(&self) -> Result<String, CliError> {
        Ok(toml::to_string_pretty(self)?)
    }

    #[cfg(feature = "serde")]
    pub fn from_toml(toml_str: &str) -> Result<Self, CliError> {
        let config: Self = toml::from_str(toml_str)?;
        config.validate()?;
        Ok(config)
    }
}
