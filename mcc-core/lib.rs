pub mod error;
pub mod image;
pub mod types;

pub use error::{MccError, MccResult};
pub use image::GrayImage;
pub use types::{CylinderDescriptor, MinutiaPoint, OrientationField};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

pub const DEFAULT_BLOCK_SIZE: usize = 16;
pub const DEFAULT_RADIUS: u32 = 16;
pub const DEFAULT_BINS: usize = 8;
pub const DEFAULT_TOP_K: usize = 10;

/// Block edge used when a descriptor samples the orientation field.
///
/// Fixed at 16 whatever block size the field was estimated with, so a field
/// built with another `block_size` is still indexed as if its tiles were 16px.
pub const ORIENTATION_LOOKUP_BLOCK: i32 = 16;

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct MccConfig {
    /// Orientation tile edge in pixels
    pub block_size: usize,
    /// Cylinder neighbourhood radius in pixels
    pub radius: u32,
    /// Cylinder cells per axis
    pub bins: usize,
    /// Number of best pair similarities averaged into the score
    pub top_k: usize,
    pub n_threads: usize,
}

impl Default for MccConfig {
    fn default() -> Self {
        Self {
            block_size: DEFAULT_BLOCK_SIZE,
            radius: DEFAULT_RADIUS,
            bins: DEFAULT_BINS,
            top_k: DEFAULT_TOP_K,
            n_threads: num_cpus::get().max(1),
        }
    }
}

impl MccConfig {
    pub fn validate(&self) -> MccResult<()> {
        if self.block_size == 0 {
            return Err(MccError::InvalidBlockSize(self.block_size));
        }
        if self.radius == 0 {
            return Err(MccError::InvalidRadius(self.radius));
        }
        if self.bins == 0 {
            return Err(MccError::InvalidBins(self.bins));
        }
        if self.top_k == 0 {
            return Err(MccError::InvalidTopK(self.top_k));
        }
        Ok(())
    }

    /// Length of every descriptor produced under this configuration
    pub fn descriptor_len(&self) -> usize {
        self.bins * self.bins
    }
}

/// Build a dedicated Rayon pool with the specified number of threads.
///
/// A count of 0 lets Rayon pick its own default.
pub fn build_thread_pool(n_threads: usize) -> Result<rayon::ThreadPool, rayon::ThreadPoolBuildError> {
    rayon::ThreadPoolBuilder::new()
        .num_threads(n_threads)
        .thread_name(|i| format!("mcc-worker-{}", i))
        .build()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let cfg = MccConfig::default();
        assert_eq!(cfg.block_size, 16);
        assert_eq!(cfg.radius, 16);
        assert_eq!(cfg.bins, 8);
        assert_eq!(cfg.top_k, 10);
        assert!(cfg.n_threads >= 1);
        assert_eq!(cfg.descriptor_len(), 64);
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_zero_parameters() {
        let base = MccConfig::default();

        let cfg = MccConfig { block_size: 0, ..base.clone() };
        assert_eq!(cfg.validate(), Err(MccError::InvalidBlockSize(0)));

        let cfg = MccConfig { radius: 0, ..base.clone() };
        assert_eq!(cfg.validate(), Err(MccError::InvalidRadius(0)));

        let cfg = MccConfig { bins: 0, ..base.clone() };
        assert_eq!(cfg.validate(), Err(MccError::InvalidBins(0)));

        let cfg = MccConfig { top_k: 0, ..base };
        assert_eq!(cfg.validate(), Err(MccError::InvalidTopK(0)));
    }

    #[test]
    fn test_private_pools_are_independent() {
        let a = build_thread_pool(2).unwrap();
        let b = build_thread_pool(1).unwrap();
        assert_eq!(a.current_num_threads(), 2);
        assert_eq!(b.current_num_threads(), 1);
    }
}
