//! Debug rendering of a template over its source image.
use std::path::Path;

use image::{DynamicImage, Rgba, RgbaImage};
use imageproc::drawing::{draw_hollow_circle_mut, draw_line_segment_mut};
use mcc_core::GrayImage;

use crate::{CliError, CliResult, FingerprintTemplate};

const MINUTIA_COLOR: Rgba<u8> = Rgba([255, 0, 0, 255]);
const RIDGE_COLOR: Rgba<u8> = Rgba([0, 200, 255, 255]);
const MINUTIA_RADIUS: i32 = 3;

/// Draw minutiae as red circles and one ridge-direction segment per orientation block.
///
/// The stored angle is the gradient direction; ridges run perpendicular to it.
pub fn render_overlay(img: &GrayImage, template: &FingerprintTemplate) -> CliResult<RgbaImage> {
    let luma = image::GrayImage::from_raw(img.width() as u32, img.height() as u32, img.as_raw().to_vec())
        .ok_or_else(|| CliError::Config(format!("cannot render {}x{} image", img.width(), img.height())))?;
    let mut output: RgbaImage = DynamicImage::ImageLuma8(luma).into_rgba8();

    let field = &template.orientation;
    let b = field.block_size() as f32;
    let half = b * 0.4;
    for row in 0..field.rows() {
        for col in 0..field.cols() {
            let Some(theta) = field.get(row, col) else {
                continue;
            };
            let ridge = theta + std::f64::consts::FRAC_PI_2;
            let (dy, dx) = (ridge.sin() as f32 * half, ridge.cos() as f32 * half);
            let cx = col as f32 * b + b / 2.0;
            let cy = row as f32 * b + b / 2.0;
            draw_line_segment_mut(&mut output, (cx - dx, cy - dy), (cx + dx, cy + dy), RIDGE_COLOR);
        }
    }

    for m in &template.minutiae {
        draw_hollow_circle_mut(&mut output, (m.col, m.row), MINUTIA_RADIUS, MINUTIA_COLOR);
    }
    Ok(output)
}

pub fn save_overlay<P: AsRef<Path>>(img: &GrayImage, template: &FingerprintTemplate, path: P) -> CliResult<()> {
    render_overlay(img, template)?.save(path)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::PipelineBuilder;
    use mcc_core::MinutiaPoint;

    #[test]
    fn test_overlay_marks_minutiae() {
        let img = GrayImage::filled(48, 48, 0);
        let matcher = PipelineBuilder::new().threads(1).build().unwrap();
        let template = matcher.describe(&img, &[MinutiaPoint::new(24, 10)]).unwrap();

        let out = render_overlay(&img, &template).unwrap();
        assert_eq!(out.dimensions(), (48, 48));
        // Circle of radius 3 around (x=10, y=24) passes through (x=13, y=24)
        assert_eq!(*out.get_pixel(13, 24), MINUTIA_COLOR);
        // Centre stays untouched
        assert_eq!(*out.get_pixel(10, 24), Rgba([0, 0, 0, 255]));
    }

    #[test]
    fn test_overlay_draws_ridge_segments() {
        // Zero field: ridges drawn vertically through each block centre
        let img = GrayImage::filled(32, 32, 0);
        let matcher = PipelineBuilder::new().threads(1).build().unwrap();
        let template = matcher.describe(&img, &[]).unwrap();

        let out = render_overlay(&img, &template).unwrap();
        assert_eq!(*out.get_pixel(8, 8), RIDGE_COLOR);
        assert_eq!(*out.get_pixel(24, 24), RIDGE_COLOR);
        assert_eq!(*out.get_pixel(0, 0), Rgba([0, 0, 0, 255]));
    }
}
