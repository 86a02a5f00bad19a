//! Ridge orientation field estimation.
//!
//! The image is cut into non-overlapping `block_size` tiles; each scanned tile
//! gets the least-squares ridge angle `0.5·atan2(2Σdx·dy, Σ(dx²−dy²))` of its
//! tile-local Sobel gradients. The directional filter bank lives here as well
//! since it works on the same grayscale input.

pub mod estimator;
pub mod filter_bank;
pub mod gradient;

pub use estimator::{tile_angle, OrientationEstimator};
pub use filter_bank::{DirectionalFilterBank, FilterBankConfig, FilterResponse, GaborKernel};
pub use gradient::{sobel_tile, TileGradients};
