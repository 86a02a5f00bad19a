use std::f64::consts::{FRAC_PI_2, PI};

use log::debug;
use mcc_core::{GrayImage, MccError, MccResult, OrientationField};
use rayon::prelude::*;

use crate::gradient::sobel_tile;

/// Block-wise least-squares ridge orientation estimator
#[derive(Debug, Clone)]
pub struct OrientationEstimator {
    block_size: usize,
}

impl OrientationEstimator {
    /// Creates a new estimator with validation
    pub fn new(block_size: usize) -> MccResult<Self> {
        if block_size == 0 {
            return Err(MccError::InvalidBlockSize(block_size));
        }
        Ok(Self { block_size })
    }

    pub fn block_size(&self) -> usize {
        self.block_size
    }

    /// Nominal field shape `(rows, cols)` for an image
    pub fn field_shape(&self, img: &GrayImage) -> (usize, usize) {
        (img.height() / self.block_size, img.width() / self.block_size)
    }

    /// Number of tile origins the scan visits per axis.
    ///
    /// Origins run over `[0, dim - block_size)` with an exclusive bound, so the
    /// last nominal block row/column is left at 0 whenever the dimension is an
    /// exact multiple of the block size.
    pub fn scanned_shape(&self, img: &GrayImage) -> (usize, usize) {
        (
            scanned_tiles(img.height(), self.block_size),
            scanned_tiles(img.width(), self.block_size),
        )
    }

    /// Estimate the orientation field of an image.
    ///
    /// Allocates the zero grid first, then fills only the scanned sub-region.
    pub fn estimate(&self, img: &GrayImage) -> OrientationField {
        let b = self.block_size;
        let (rows, cols) = self.field_shape(img);
        let (scan_rows, scan_cols) = self.scanned_shape(img);

        let field = OrientationField::populate(rows, cols, b, |angles| {
            if scan_rows == 0 || scan_cols == 0 {
                return;
            }
            angles
                .par_chunks_mut(cols)
                .take(scan_rows)
                .enumerate()
                .for_each(|(block_row, out)| {
                    for (block_col, angle) in out.iter_mut().take(scan_cols).enumerate() {
                        *angle = self.estimate_tile(img, block_row * b, block_col * b);
                    }
                });
        });

        debug!(
            "OrientationEstimator: {}x{} image -> {}x{} field ({}x{} tiles scanned, block {})",
            img.width(),
            img.height(),
            rows,
            cols,
            scan_rows,
            scan_cols,
            b
        );

        field
    }

    /// Orientation of the single tile with top-left pixel `(row0, col0)`
    pub fn estimate_tile(&self, img: &GrayImage, row0: usize, col0: usize) -> f64 {
        let grads = sobel_tile(img, row0, col0, self.block_size);
        let (v, u) = grads.orientation_terms();
        tile_angle(v, u)
    }
}

impl Default for OrientationEstimator {
    fn default() -> Self {
        Self {
            block_size: mcc_core::DEFAULT_BLOCK_SIZE,
        }
    }
}

#[inline]
fn scanned_tiles(dim: usize, block_size: usize) -> usize {
    if dim > block_size {
        (dim - 1) / block_size
    } else {
        0
    }
}

/// Half-angle `0.5·atan2(v, u)` folded into `[-π/2, π/2)`.
///
/// Only `+π/2` needs folding; it is the same ridge orientation as `-π/2`.
#[inline]
pub fn tile_angle(v: f64, u: f64) -> f64 {
    let angle = 0.5 * v.atan2(u);
    if angle >= FRAC_PI_2 {
        angle - PI
    } else {
        angle
    }
}
