//! Tile-local Sobel gradients.
//!
//! The 3×3 kernels are correlated with one tile at a time; samples that would
//! fall outside the tile are mirrored back in without repeating the edge
//! sample (reflect-101, i.e. `dcb|abcd|cba`). Pixels of neighbouring tiles
//! never contribute, so every tile's orientation depends on its own content
//! only.
use mcc_core::GrayImage;

pub(crate) type Kernel3 = [[f64; 3]; 3];

pub(crate) const SOBEL_KERNEL_X: Kernel3 = [[-1.0, 0.0, 1.0], [-2.0, 0.0, 2.0], [-1.0, 0.0, 1.0]];
pub(crate) const SOBEL_KERNEL_Y: Kernel3 = [[-1.0, -2.0, -1.0], [0.0, 0.0, 0.0], [1.0, 2.0, 1.0]];

/// Mirror `i` into `[0, n)` without duplicating the border sample.
#[inline]
pub fn reflect101(i: isize, n: usize) -> usize {
    if n <= 1 {
        return 0;
    }
    let last = n as isize - 1;
    let mut i = i;
    loop {
        if i < 0 {
            i = -i;
        } else if i > last {
            i = 2 * last - i;
        } else {
            return i as usize;
        }
    }
}

/// Horizontal and vertical derivatives of one square tile, row-major.
#[derive(Debug, Clone)]
pub struct TileGradients {
    pub size: usize,
    pub dx: Vec<f64>,
    pub dy: Vec<f64>,
}

impl TileGradients {
    /// Least-squares orientation terms `(v, u) = (2·Σ dx·dy, Σ (dx² − dy²))`.
    pub fn orientation_terms(&self) -> (f64, f64) {
        let mut sum_xy = 0.0;
        let mut sum_diff = 0.0;
        for (&gx, &gy) in self.dx.iter().zip(self.dy.iter()) {
            sum_xy += gx * gy;
            sum_diff += gx * gx - gy * gy;
        }
        (2.0 * sum_xy, sum_diff)
    }
}

/// Sobel `dx`/`dy` of the `size x size` tile whose top-left pixel is `(row0, col0)`.
///
/// The tile must lie entirely inside the image.
pub fn sobel_tile(img: &GrayImage, row0: usize, col0: usize, size: usize) -> TileGradients {
    debug_assert!(row0 + size <= img.height() && col0 + size <= img.width());

    let mut dx = vec![0.0; size * size];
    let mut dy = vec![0.0; size * size];

    for y in 0..size {
        let y_idx = [
            reflect101(y as isize - 1, size),
            y,
            reflect101(y as isize + 1, size),
        ];
        let rows = [
            &img.row(row0 + y_idx[0])[col0..col0 + size],
            &img.row(row0 + y_idx[1])[col0..col0 + size],
            &img.row(row0 + y_idx[2])[col0..col0 + size],
        ];
        for x in 0..size {
            let x_idx = [
                reflect101(x as isize - 1, size),
                x,
                reflect101(x as isize + 1, size),
            ];

            let mut sum_x = 0.0;
            let mut sum_y = 0.0;
            for (ky, row) in rows.iter().enumerate() {
                let kx_row = &SOBEL_KERNEL_X[ky];
                let ky_row = &SOBEL_KERNEL_Y[ky];
                let p = [
                    row[x_idx[0]] as f64,
                    row[x_idx[1]] as f64,
                    row[x_idx[2]] as f64,
                ];
                sum_x += p[0] * kx_row[0] + p[1] * kx_row[1] + p[2] * kx_row[2];
                sum_y += p[0] * ky_row[0] + p[1] * ky_row[1] + p[2] * ky_row[2];
            }

            dx[y * size + x] = sum_x;
            dy[y * size + x] = sum_y;
        }
    }

    TileGradients { size, dx, dy }
}
