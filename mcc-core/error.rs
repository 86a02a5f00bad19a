use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum MccError {
    #[error("Invalid image dimensions: {width}x{height}")]
    InvalidImageSize { width: usize, height: usize },

    #[error("Image data length mismatch: expected {expected_len}, got {actual_len}")]
    InvalidImageData { expected_len: usize, actual_len: usize },

    #[error("Invalid block size: {0} (must be > 0)")]
    InvalidBlockSize(usize),

    #[error("Invalid cylinder radius: {0} (must be > 0)")]
    InvalidRadius(u32),

    #[error("Invalid bin count: {0} (must be > 0)")]
    InvalidBins(usize),

    #[error("Invalid top-k: {0} (must be > 0)")]
    InvalidTopK(usize),

    #[error("Invalid filter bank: {0}")]
    InvalidFilterBank(String),

    #[error("Minutia ({row}, {col}) lies outside the {width}x{height} image")]
    MinutiaOutOfBounds {
        row: i32,
        col: i32,
        width: usize,
        height: usize,
    },

    #[error("Thread pool error: {0}")]
    ThreadPool(String),
}

impl From<rayon::ThreadPoolBuildError> for MccError {
    fn from(err: rayon::ThreadPoolBuildError) -> Self {
        MccError::ThreadPool(err.to_string())
    }
}

pub type MccResult<T> = Result<T, MccError>;
