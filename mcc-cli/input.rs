//! Loading of the external inputs: grayscale images and minutia lists.
use std::path::Path;

use image::ImageReader;
use mcc_core::GrayImage;
#[cfg(feature = "serde")]
use mcc_core::MinutiaPoint;

use crate::CliError;

/// Decode any supported image file and convert it to 8-bit luma
pub fn load_gray_image<P: AsRef<Path>>(path: P) -> Result<GrayImage, CliError> {
    let luma = ImageReader::open(path)?.decode()?.to_luma8();
    Ok(from_luma(luma)?)
}

pub fn from_luma(luma: image::GrayImage) -> mcc_core::MccResult<GrayImage> {
    let (w, h) = luma.dimensions();
    GrayImage::new(w as usize, h as usize, luma.into_raw())
}

/// Parse a JSON array of `[row, col]` pairs
#[cfg(feature = "serde")]
pub fn parse_minutiae_json(json: &str) -> Result<Vec<MinutiaPoint>, CliError> {
    let pairs: Vec<(i32, i32)> = serde_json::from_str(json)?;
    Ok(pairs.into_iter().map(MinutiaPoint::from).collect())
}

#[cfg(feature = "serde")]
pub fn load_minutiae<P: AsRef<Path>>(path: P) -> Result<Vec<MinutiaPoint>, CliError> {
    let content = std::fs::read_to_string(path)?;
    parse_minutiae_json(&content)
}

/// Serialize minutiae back to the `[row, col]` file format
#[cfg(feature = "serde")]
pub fn minutiae_to_json(points: &[MinutiaPoint]) -> Result<String, CliError> {
    let pairs: Vec<(i32, i32)> = points.iter().map(|p| (p.row, p.col)).collect();
    Ok(serde_json::to_string(&pairs)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    #[cfg(feature = "serde")]
    use mcc_core::MinutiaPoint;

    #[test]
    fn test_from_luma_keeps_layout() {
        let luma = image::GrayImage::from_fn(3, 2, |x, y| image::Luma([(y * 10 + x) as u8]));
        let img = from_luma(luma).unwrap();
        assert_eq!((img.width(), img.height()), (3, 2));
        assert_eq!(img.get(1, 2), 12);
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_parse_minutiae() {
        let points = parse_minutiae_json("[[10, 10], [10, 20], [20, 10]]").unwrap();
        assert_eq!(
            points,
            vec![MinutiaPoint::new(10, 10), MinutiaPoint::new(10, 20), MinutiaPoint::new(20, 10)]
        );
        assert!(parse_minutiae_json("[]").unwrap().is_empty());
        assert!(matches!(parse_minutiae_json("[[1]]"), Err(CliError::Json(_))));
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_minutiae_file_round_trip() {
        let points = vec![MinutiaPoint::new(3, -1), MinutiaPoint::new(7, 8)];
        let path = std::env::temp_dir().join(format!("mcc-minutiae-{}.json", std::process::id()));
        std::fs::write(&path, minutiae_to_json(&points).unwrap()).unwrap();
        let loaded = load_minutiae(&path).unwrap();
        std::fs::remove_file(&path).ok();
        assert_eq!(loaded, points);
    }

    #[test]
    fn test_missing_image_is_io_error() {
        let result = load_gray_image("/nonexistent/mcc/print.png");
        assert!(matches!(result, Err(CliError::Io(_))));
    }
}
