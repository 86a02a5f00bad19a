use std::time::Instant;

use log::{debug, info};
use mcc_core::{build_thread_pool, CylinderDescriptor, GrayImage, MccError, MccResult, MinutiaPoint, OrientationField};
use mcc_cylinder::CylinderBuilder;
use mcc_match::DescriptorMatcher;
use mcc_orientation::{DirectionalFilterBank, FilterResponse, OrientationEstimator};
use thiserror::Error;

#[cfg(feature = "serde")]
use serde::Serialize;

pub mod builder;
pub mod config;
pub mod input;
pub mod overlay;

pub use builder::{PipelineBuilder, PipelineOverrides};
pub use config::{MinutiaPolicy, PipelineConfig};
pub use mcc_core::{self, MccConfig};

#[derive(Error, Debug)]
pub enum CliError {
    #[error("MCC error: {0}")]
    Mcc(#[from] MccError),

    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[cfg(feature = "serde")]
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[cfg(feature = "serde")]
    #[error("TOML parse error: {0}")]
    TomlDe(#[from] toml::de::Error),

    #[cfg(feature = "serde")]
    #[error("TOML write error: {0}")]
    TomlSer(#[from] toml::ser::Error),

    #[error("Configuration error: {0}")]
    Config(String),
}

pub type CliResult<T> = Result<T, CliError>;

/// Everything extracted from one fingerprint
#[derive(Debug, Clone)]
pub struct FingerprintTemplate {
    pub orientation: OrientationField,
    /// Minutiae after the input policy was applied
    pub minutiae: Vec<MinutiaPoint>,
    /// One descriptor per entry of `minutiae`
    pub descriptors: Vec<CylinderDescriptor>,
    /// Present only when the filter bank is enabled; not used for scoring
    pub filter_responses: Option<Vec<FilterResponse>>,
}

impl FingerprintTemplate {
    /// Descriptors with at least one neighbour, the only ones that can be matched
    pub fn matchable(&self) -> usize {
        self.descriptors.iter().filter(|d| !d.is_zero()).count()
    }
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct MatchReport {
    pub score: f64,
    pub minutiae_a: usize,
    pub minutiae_b: usize,
    pub matchable_a: usize,
    pub matchable_b: usize,
    pub elapsed_ms: f64,
}

impl MatchReport {
    #[cfg(feature = "serde")]
    pub fn to_json(&self) -> CliResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Full pipeline: orientation field, cylinders, top-k cosine score.
///
/// Work runs on a private Rayon pool sized from the configuration, so
/// several matchers with different thread counts can coexist.
pub struct FingerprintMatcher {
    cfg: PipelineConfig,
    pool: rayon::ThreadPool,
    estimator: OrientationEstimator,
    builder: CylinderBuilder,
    matcher: DescriptorMatcher,
    filter_bank: Option<DirectionalFilterBank>,
}

impl FingerprintMatcher {
    pub fn new(cfg: PipelineConfig) -> MccResult<Self> {
        cfg.validate()?;
        let pool = build_thread_pool(cfg.core.n_threads)?;
        let estimator = OrientationEstimator::new(cfg.core.block_size)?;
        let builder = CylinderBuilder::new(cfg.core.radius, cfg.core.bins)?;
        let matcher = DescriptorMatcher::new(cfg.core.top_k)?;
        let filter_bank = if cfg.filter_bank_enabled {
            Some(DirectionalFilterBank::new(cfg.filter_bank.clone())?)
        } else {
            None
        };

        debug!("FingerprintMatcher: {}", cfg.summary());
        Ok(Self {
            cfg,
            pool,
            estimator,
            builder,
            matcher,
            filter_bank,
        })
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.cfg
    }

    /// Estimate the orientation field and build one descriptor per minutia
    pub fn describe(&self, img: &GrayImage, minutiae: &[MinutiaPoint]) -> MccResult<FingerprintTemplate> {
        let minutiae = self.cfg.minutia_policy.apply(minutiae, img)?;

        Ok(self.pool.install(|| {
            let orientation = self.estimator.estimate(img);
            let descriptors = self.builder.build(&minutiae, &orientation);
            let filter_responses = self.filter_bank.as_ref().map(|bank| bank.apply(img));
            FingerprintTemplate {
                orientation,
                minutiae,
                descriptors,
                filter_responses,
            }
        }))
    }

    /// Similarity of two templates, 0.0 when neither has a matchable descriptor pair
    pub fn compare(&self, a: &FingerprintTemplate, b: &FingerprintTemplate) -> f64 {
        self.pool.install(|| self.matcher.score(&a.descriptors, &b.descriptors))
    }

    /// Describe both fingerprints and score them
    pub fn match_images(
        &self,
        img_a: &GrayImage,
        minutiae_a: &[MinutiaPoint],
        img_b: &GrayImage,
        minutiae_b: &[MinutiaPoint],
    ) -> MccResult<MatchReport> {
        let started = Instant::now();
        let a = self.describe(img_a, minutiae_a)?;
        let b = self.describe(img_b, minutiae_b)?;
        Ok(self.report(&a, &b, started))
    }

    /// Score two templates; `elapsed_ms` counts from `started`
    pub fn report(&self, a: &FingerprintTemplate, b: &FingerprintTemplate, started: Instant) -> MatchReport {
        let score = self.compare(a, b);
        let elapsed_ms = started.elapsed().as_secs_f64() * 1000.0;

        info!(
            "match: {} vs {} minutiae ({} / {} matchable) -> {:.4} in {:.2}ms",
            a.minutiae.len(),
            b.minutiae.len(),
            a.matchable(),
            b.matchable(),
            score,
            elapsed_ms
        );
        MatchReport {
            score,
            minutiae_a: a.minutiae.len(),
            minutiae_b: b.minutiae.len(),
            matchable_a: a.matchable(),
            matchable_b: b.matchable(),
            elapsed_ms,
        }
    }
}
