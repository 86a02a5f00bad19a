use mcc_core::{MccConfig, MccResult};
use mcc_orientation::FilterBankConfig;

use crate::config::{MinutiaPolicy, PipelineConfig};
use crate::FingerprintMatcher;

/// Per-run settings that take precedence over a loaded configuration
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PipelineOverrides {
    pub block_size: Option<usize>,
    pub radius: Option<u32>,
    pub bins: Option<usize>,
    pub top_k: Option<usize>,
    pub threads: Option<usize>,
    pub minutia_policy: Option<MinutiaPolicy>,
    /// Only ever switches the filter bank on
    pub filter_bank: bool,
}

/// Builder for creating a `FingerprintMatcher`
#[derive(Debug, Clone)]
pub struct PipelineBuilder {
    config: MccConfig,
    filter_bank_enabled: bool,
    filter_bank: FilterBankConfig,
    minutia_policy: MinutiaPolicy,
}

impl Default for PipelineBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl PipelineBuilder {
    /// Create a new builder with default settings
    pub fn new() -> Self {
        Self::from_config(PipelineConfig::new())
    }

    /// Set the orientation tile edge
    pub fn block_size(mut self, block_size: usize) -> Self {
        self.config.block_size = block_size;
        self
    }

    /// Set the cylinder radius
    pub fn radius(mut self, radius: u32) -> Self {
        self.config.radius = radius;
        self
    }

    /// Set the number of cylinder cells per axis
    pub fn bins(mut self, bins: usize) -> Self {
        self.config.bins = bins;
        self
    }

    /// Set how many of the best pair similarities are averaged
    pub fn top_k(mut self, top_k: usize) -> Self {
        self.config.top_k = top_k;
        self
    }

    /// Set the number of threads for parallel processing
    pub fn threads(mut self, n_threads: usize) -> Self {
        self.config.n_threads = n_threads;
        self
    }

    /// Enable or disable filter bank responses on templates
    pub fn filter_bank(mut self, enable: bool) -> Self {
        self.filter_bank_enabled = enable;
        self
    }

    /// Replace the filter bank parameters
    pub fn filter_bank_config(mut self, cfg: FilterBankConfig) -> Self {
        self.filter_bank = cfg;
        self
    }

    pub fn minutia_policy(mut self, policy: MinutiaPolicy) -> Self {
        self.minutia_policy = policy;
        self
    }

    /// Apply the reference preset
    pub fn preset_reference(self) -> Self {
        self.apply_preset(PipelineConfig::reference_preset())
    }

    /// Apply the dense preset
    pub fn preset_dense(self) -> Self {
        self.apply_preset(PipelineConfig::dense_preset())
    }

    /// Apply the diagnostic preset
    pub fn preset_diagnostic(self) -> Self {
        self.apply_preset(PipelineConfig::diagnostic_preset())
    }

    /// Presets leave the thread count alone
    fn apply_preset(mut self, preset: PipelineConfig) -> Self {
        let n_threads = self.config.n_threads;
        self.config = MccConfig { n_threads, ..preset.core };
        self.filter_bank_enabled = preset.filter_bank_enabled;
        self.filter_bank = preset.filter_bank;
        self.minutia_policy = preset.minutia_policy;
        self
    }

    /// Apply every override that is set; unset fields keep the current value
    pub fn with_overrides(mut self, overrides: &PipelineOverrides) -> Self {
        if let Some(v) = overrides.block_size {
            self = self.block_size(v);
        }
        if let Some(v) = overrides.radius {
            self = self.radius(v);
        }
        if let Some(v) = overrides.bins {
            self = self.bins(v);
        }
        if let Some(v) = overrides.top_k {
            self = self.top_k(v);
        }
        if let Some(v) = overrides.threads {
            self = self.threads(v);
        }
        if let Some(policy) = overrides.minutia_policy {
            self = self.minutia_policy(policy);
        }
        if overrides.filter_bank {
            self = self.filter_bank(true);
        }
        self
    }

    /// Build the `FingerprintMatcher`
    pub fn build(self) -> MccResult<FingerprintMatcher> {
        FingerprintMatcher::new(self.to_config())
    }

    /// Generate a summary of the builder's configuration
    pub fn summary(&self) -> String {
        self.clone().to_config().summary()
    }

    /// Create a builder from an existing `PipelineConfig`
    pub fn from_config(config: PipelineConfig) -> Self {
        Self {
            config: config.core,
            filter_bank_enabled: config.filter_bank_enabled,
            filter_bank: config.filter_bank,
            minutia_policy: config.minutia_policy,
        }
    }

    /// Convert the builder into a `PipelineConfig`
    pub fn to_config(self) -> PipelineConfig {
        PipelineConfig {
            core: self.config,
            filter_bank_enabled: self.filter_bank_enabled,
            filter_bank: self.filter_bank,
            minutia_policy: self.minutia_policy,
            name: None,
            description: None,
            version: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mcc_core::MccError;

    #[test]
    fn test_fluent_setters() {
        let cfg = PipelineBuilder::new()
            .block_size(8)
            .radius(20)
            .bins(10)
            .top_k(5)
            .threads(2)
            .filter_bank(true)
            .minutia_policy(MinutiaPolicy::Trust)
            .to_config();
        assert_eq!(cfg.core.block_size, 8);
        assert_eq!(cfg.core.radius, 20);
        assert_eq!(cfg.core.bins, 10);
        assert_eq!(cfg.core.top_k, 5);
        assert_eq!(cfg.core.n_threads, 2);
        assert!(cfg.filter_bank_enabled);
        assert_eq!(cfg.minutia_policy, MinutiaPolicy::Trust);
    }

    #[test]
    fn test_preset_keeps_threads() {
        let cfg = PipelineBuilder::new().threads(3).preset_dense().to_config();
        assert_eq!(cfg.core.n_threads, 3);
        assert_eq!(cfg.core.bins, 12);
        assert_eq!(cfg.core.radius, 24);
    }

    #[test]
    fn test_config_round_trip() {
        let original = PipelineConfig::diagnostic_preset();
        let back = original.clone().to_builder().to_config();
        assert_eq!(back.core, original.core);
        assert_eq!(back.filter_bank_enabled, original.filter_bank_enabled);
        assert_eq!(back.minutia_policy, original.minutia_policy);
        assert!(back.name.is_none());
    }

    #[test]
    fn test_overrides_beat_loaded_config() {
        let loaded = PipelineConfig::diagnostic_preset();
        let overrides = PipelineOverrides {
            radius: Some(20),
            top_k: Some(3),
            minutia_policy: Some(MinutiaPolicy::Reject),
            ..Default::default()
        };
        let cfg = loaded.clone().to_builder().with_overrides(&overrides).to_config();

        assert_eq!(cfg.core.radius, 20);
        assert_eq!(cfg.core.top_k, 3);
        assert_eq!(cfg.minutia_policy, MinutiaPolicy::Reject);
        // Unset fields keep the loaded values
        assert_eq!(cfg.core.bins, loaded.core.bins);
        assert_eq!(cfg.core.block_size, loaded.core.block_size);
        assert!(cfg.filter_bank_enabled);
    }

    #[test]
    fn test_empty_overrides_change_nothing() {
        let loaded = PipelineConfig::dense_preset();
        let cfg = loaded.clone().to_builder().with_overrides(&PipelineOverrides::default()).to_config();
        assert_eq!(cfg.core, loaded.core);
        assert!(!cfg.filter_bank_enabled);

        let on = PipelineOverrides { filter_bank: true, ..Default::default() };
        assert!(loaded.to_builder().with_overrides(&on).to_config().filter_bank_enabled);
    }

    #[test]
    fn test_build_validates() {
        assert!(matches!(PipelineBuilder::new().bins(0).build(), Err(MccError::InvalidBins(0))));
        assert!(matches!(PipelineBuilder::new().top_k(0).build(), Err(MccError::InvalidTopK(0))));
        assert!(PipelineBuilder::new().threads(1).build().is_ok());
        assert!(PipelineBuilder::new().summary().starts_with("PipelineConfig:"));
    }
}
