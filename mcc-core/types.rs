use crate::error::{MccError, MccResult};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Minutia location in image space (row = y, col = x)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct MinutiaPoint {
    pub row: i32,
    pub col: i32,
}

impl MinutiaPoint {
    pub const fn new(row: i32, col: i32) -> Self {
        Self { row, col }
    }

    /// True when the point addresses a pixel of a `width x height` image
    pub fn is_within(&self, width: usize, height: usize) -> bool {
        self.row >= 0 && self.col >= 0 && (self.row as usize) < height && (self.col as usize) < width
    }
}

impl From<(i32, i32)> for MinutiaPoint {
    fn from((row, col): (i32, i32)) -> Self {
        Self { row, col }
    }
}

/// Per-block ridge angles in radians, row-major, each in `[-π/2, π/2)`.
#[derive(Debug, Clone, PartialEq)]
pub struct OrientationField {
    rows: usize,
    cols: usize,
    block_size: usize,
    angles: Vec<f64>,
}

impl OrientationField {
    /// Field with every block at angle 0
    pub fn zeros(rows: usize, cols: usize, block_size: usize) -> Self {
        Self {
            rows,
            cols,
            block_size,
            angles: vec![0.0; rows * cols],
        }
    }

    /// Zero field of the given shape, then `fill` writes the row-major angles in place.
    pub fn populate(rows: usize, cols: usize, block_size: usize, fill: impl FnOnce(&mut [f64])) -> Self {
        let mut field = Self::zeros(rows, cols, block_size);
        fill(&mut field.angles);
        field
    }

    pub fn from_angles(rows: usize, cols: usize, block_size: usize, angles: Vec<f64>) -> MccResult<Self> {
        if angles.len() != rows * cols {
            return Err(MccError::InvalidImageData {
                expected_len: rows * cols,
                actual_len: angles.len(),
            });
        }
        Ok(Self {
            rows,
            cols,
            block_size,
            angles,
        })
    }

    #[inline]
    pub fn rows(&self) -> usize {
        self.rows
    }

    #[inline]
    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Tile edge the field was estimated with
    #[inline]
    pub fn block_size(&self) -> usize {
        self.block_size
    }

    pub fn is_empty(&self) -> bool {
        self.angles.is_empty()
    }

    #[inline]
    pub fn get(&self, row: usize, col: usize) -> Option<f64> {
        if row < self.rows && col < self.cols {
            Some(self.angles[row * self.cols + col])
        } else {
            None
        }
    }

    /// Signed block lookup; negative or overflowing indices yield `None`.
    #[inline]
    pub fn angle_at_block(&self, block_row: i64, block_col: i64) -> Option<f64> {
        if block_row < 0 || block_col < 0 {
            return None;
        }
        self.get(block_row as usize, block_col as usize)
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.angles
    }
}

/// Flattened `bins x bins` neighbourhood histogram, row-major over `(bin_y, bin_x)`.
#[derive(Debug, Clone, PartialEq)]
pub struct CylinderDescriptor {
    bins: usize,
    values: Vec<f64>,
}

impl CylinderDescriptor {
    pub fn zeros(bins: usize) -> Self {
        Self {
            bins,
            values: vec![0.0; bins * bins],
        }
    }

    /// Zero `bins x bins` accumulator handed to `fill`, row-major over `(bin_y, bin_x)`.
    pub fn from_accumulator(bins: usize, fill: impl FnOnce(&mut [f64])) -> Self {
        let mut descriptor = Self::zeros(bins);
        fill(&mut descriptor.values);
        descriptor
    }

    pub fn new(bins: usize, values: Vec<f64>) -> MccResult<Self> {
        if bins == 0 {
            return Err(MccError::InvalidBins(bins));
        }
        if values.len() != bins * bins {
            return Err(MccError::InvalidImageData {
                expected_len: bins * bins,
                actual_len: values.len(),
            });
        }
        Ok(Self { bins, values })
    }

    #[inline]
    pub fn bins(&self) -> usize {
        self.bins
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    #[inline]
    pub fn cell(&self, bin_y: usize, bin_x: usize) -> f64 {
        self.values[bin_y * self.bins + bin_x]
    }

    #[inline]
    pub fn as_slice(&self) -> &[f64] {
        &self.values
    }

    /// Euclidean magnitude
    pub fn norm(&self) -> f64 {
        self.values.iter().map(|v| v * v).sum::<f64>().sqrt()
    }

    /// All-zero descriptors come from isolated minutiae and never match
    pub fn is_zero(&self) -> bool {
        self.values.iter().all(|&v| v == 0.0)
    }

    pub fn non_zero_cells(&self) -> usize {
        self.values.iter().filter(|&&v| v != 0.0).count()
    }
}
