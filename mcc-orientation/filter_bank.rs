//! Directional (Gabor) filter bank.
//!
//! Produces one real-valued response map per orientation. Descriptor
//! construction does not read these maps; they are exposed for callers that
//! want ridge-frequency diagnostics alongside a template.
use std::f64::consts::PI;

use log::debug;
use mcc_core::{GrayImage, MccError, MccResult};
use rayon::prelude::*;

use crate::gradient::reflect101;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct FilterBankConfig {
    /// Number of kernels, spread uniformly over `[0, π)`
    pub orientations: usize,
    /// Odd kernel edge in pixels
    pub kernel_size: usize,
    /// Gaussian envelope standard deviation
    pub sigma: f64,
    /// Sinusoid wavelength in pixels
    pub wavelength: f64,
    /// Spatial aspect ratio of the envelope
    pub gamma: f64,
    /// Phase offset in radians
    pub phase: f64,
}

impl Default for FilterBankConfig {
    fn default() -> Self {
        Self {
            orientations: 8,
            kernel_size: 21,
            sigma: 4.0,
            wavelength: 10.0,
            gamma: 0.5,
            phase: 0.0,
        }
    }
}

impl FilterBankConfig {
    pub fn validate(&self) -> MccResult<()> {
        if self.orientations == 0 {
            return Err(MccError::InvalidFilterBank("orientations must be > 0".to_string()));
        }
        if self.kernel_size % 2 == 0 {
            return Err(MccError::InvalidFilterBank(format!(
                "kernel size {} must be odd",
                self.kernel_size
            )));
        }
        if !(self.sigma > 0.0 && self.wavelength > 0.0 && self.gamma > 0.0) {
            return Err(MccError::InvalidFilterBank(format!(
                "sigma ({}), wavelength ({}) and gamma ({}) must be positive",
                self.sigma, self.wavelength, self.gamma
            )));
        }
        if !self.phase.is_finite() {
            return Err(MccError::InvalidFilterBank("phase must be finite".to_string()));
        }
        Ok(())
    }
}

/// Square real Gabor kernel, row-major, laid out for correlation
#[derive(Debug, Clone)]
pub struct GaborKernel {
    pub theta: f64,
    pub size: usize,
    pub weights: Vec<f64>,
}

impl GaborKernel {
    pub fn new(size: usize, sigma: f64, theta: f64, wavelength: f64, gamma: f64, phase: f64) -> Self {
        let half = (size / 2) as i64;
        let sigma_x = sigma;
        let sigma_y = sigma / gamma;
        let ex = -0.5 / (sigma_x * sigma_x);
        let ey = -0.5 / (sigma_y * sigma_y);
        let scale = 2.0 * PI / wavelength;
        let (s, c) = theta.sin_cos();

        let mut weights = vec![0.0; size * size];
        for y in -half..=half {
            for x in -half..=half {
                let xr = x as f64 * c + y as f64 * s;
                let yr = -(x as f64) * s + y as f64 * c;
                let v = (ex * xr * xr + ey * yr * yr).exp() * (scale * xr + phase).cos();
                // Point-mirrored so that correlation applies the filter as specified.
                let row = (half - y) as usize;
                let col = (half - x) as usize;
                weights[row * size + col] = v;
            }
        }

        Self { theta, size, weights }
    }
}

/// Response of one kernel over a whole image
#[derive(Debug, Clone)]
pub struct FilterResponse {
    pub theta: f64,
    pub width: usize,
    pub height: usize,
    pub data: Vec<f32>,
}

impl FilterResponse {
    #[inline]
    pub fn get(&self, row: usize, col: usize) -> f32 {
        self.data[row * self.width + col]
    }

    /// Mean absolute response, a rough energy measure for this direction
    pub fn mean_abs(&self) -> f64 {
        if self.data.is_empty() {
            return 0.0;
        }
        self.data.iter().map(|v| v.abs() as f64).sum::<f64>() / self.data.len() as f64
    }
}

pub struct DirectionalFilterBank {
    cfg: FilterBankConfig,
    kernels: Vec<GaborKernel>,
}

impl DirectionalFilterBank {
    pub fn new(cfg: FilterBankConfig) -> MccResult<Self> {
        cfg.validate()?;
        let kernels = (0..cfg.orientations)
            .map(|k| {
                let theta = k as f64 * PI / cfg.orientations as f64;
                GaborKernel::new(cfg.kernel_size, cfg.sigma, theta, cfg.wavelength, cfg.gamma, cfg.phase)
            })
            .collect();
        Ok(Self { cfg, kernels })
    }

    pub fn config(&self) -> &FilterBankConfig {
        &self.cfg
    }

    pub fn kernels(&self) -> &[GaborKernel] {
        &self.kernels
    }

    /// Filter the image with every kernel, one response per orientation in kernel order.
    pub fn apply(&self, img: &GrayImage) -> Vec<FilterResponse> {
        let responses: Vec<FilterResponse> = self.kernels.par_iter().map(|k| Self::correlate(img, k)).collect();
        debug!(
            "DirectionalFilterBank: {} responses over {}x{} image (kernel {})",
            responses.len(),
            img.width(),
            img.height(),
            self.cfg.kernel_size
        );
        responses
    }

    /// Index of the kernel with the strongest absolute response at each pixel
    pub fn dominant_direction(responses: &[FilterResponse]) -> Vec<usize> {
        let Some(first) = responses.first() else {
            return Vec::new();
        };
        (0..first.data.len())
            .map(|i| {
                let mut best = 0;
                let mut best_val = f32::MIN;
                for (k, r) in responses.iter().enumerate() {
                    let v = r.data[i].abs();
                    if v > best_val {
                        best_val = v;
                        best = k;
                    }
                }
                best
            })
            .collect()
    }

    fn correlate(img: &GrayImage, kernel: &GaborKernel) -> FilterResponse {
        let (w, h) = (img.width(), img.height());
        let mut data = vec![0.0f32; w * h];
        if w == 0 || h == 0 {
            return FilterResponse {
                theta: kernel.theta,
                width: w,
                height: h,
                data,
            };
        }

        let half = (kernel.size / 2) as isize;
        for y in 0..h {
            for x in 0..w {
                let mut acc = 0.0f64;
                for ky in 0..kernel.size {
                    let yy = reflect101(y as isize + ky as isize - half, h);
                    let row = img.row(yy);
                    let krow = &kernel.weights[ky * kernel.size..(ky + 1) * kernel.size];
                    for (kx, &weight) in krow.iter().enumerate() {
                        let xx = reflect101(x as isize + kx as isize - half, w);
                        acc += weight * row[xx] as f64;
                    }
                }
                data[y * w + x] = acc as f32;
            }
        }

        FilterResponse {
            theta: kernel.theta,
            width: w,
            height: h,
            data,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_validation() {
        assert!(FilterBankConfig::default().validate().is_ok());

        let cfg = FilterBankConfig { orientations: 0, ..Default::default() };
        assert!(matches!(cfg.validate(), Err(MccError::InvalidFilterBank(_))));

        let cfg = FilterBankConfig { kernel_size: 20, ..Default::default() };
        assert!(matches!(cfg.validate(), Err(MccError::InvalidFilterBank(_))));

        let cfg = FilterBankConfig { sigma: 0.0, ..Default::default() };
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn test_kernel_center_and_symmetry() {
        let k = GaborKernel::new(7, 2.0, 0.0, 6.0, 0.5, 0.0);
        assert_eq!(k.weights.len(), 49);
        // exp(0)·cos(0) at the centre
        assert!((k.weights[3 * 7 + 3] - 1.0).abs() < 1e-12);
        // Even kernel with zero phase is point symmetric
        for i in 0..49 {
            assert!((k.weights[i] - k.weights[48 - i]).abs() < 1e-12);
        }
    }

    #[test]
    fn test_bank_orientations() {
        let bank = DirectionalFilterBank::new(FilterBankConfig::default()).unwrap();
        assert_eq!(bank.kernels().len(), 8);
        assert_eq!(bank.kernels()[0].theta, 0.0);
        assert!((bank.kernels()[4].theta - PI / 2.0).abs() < 1e-12);
    }

    #[test]
    fn test_flat_image_response_is_uniform() {
        let bank = DirectionalFilterBank::new(FilterBankConfig {
            orientations: 2,
            kernel_size: 5,
            ..Default::default()
        })
        .unwrap();
        let responses = bank.apply(&GrayImage::filled(9, 7, 10));
        assert_eq!(responses.len(), 2);
        for (r, k) in responses.iter().zip(bank.kernels()) {
            assert_eq!((r.width, r.height), (9, 7));
            let expected = (k.weights.iter().sum::<f64>() * 10.0) as f32;
            for row in 0..7 {
                for col in 0..9 {
                    assert!((r.get(row, col) - expected).abs() < 1e-3);
                }
            }
        }
    }

    #[test]
    fn test_stripes_prefer_matching_direction() {
        // Vertical stripes vary along x, which the θ = 0 kernel oscillates along.
        let img = GrayImage::from_fn(40, 40, |_, c| if (c / 5) % 2 == 0 { 0 } else { 255 });
        let bank = DirectionalFilterBank::new(FilterBankConfig::default()).unwrap();
        let responses = bank.apply(&img);
        let along = responses[0].mean_abs();
        let across = responses[4].mean_abs();
        assert!(along > across, "along={} across={}", along, across);

        let dominant = DirectionalFilterBank::dominant_direction(&responses);
        assert_eq!(dominant.len(), 40 * 40);
    }

    #[test]
    fn test_empty_image() {
        let bank = DirectionalFilterBank::new(FilterBankConfig::default()).unwrap();
        let responses = bank.apply(&GrayImage::new(0, 0, Vec::new()).unwrap());
        assert_eq!(responses.len(), 8);
        assert!(responses.iter().all(|r| r.data.is_empty() && r.mean_abs() == 0.0));
        assert!(DirectionalFilterBank::dominant_direction(&[]).is_empty());
    }
}
