use log::debug;
use mcc_core::{CylinderDescriptor, MccError, MccResult, MinutiaPoint, ORIENTATION_LOOKUP_BLOCK, OrientationField};
use rayon::prelude::*;

/// Builds one orientation-weighted neighbour histogram per minutia
#[derive(Debug, Clone)]
pub struct CylinderBuilder {
    radius: u32,
    bins: usize,
}

impl CylinderBuilder {
    pub fn new(radius: u32, bins: usize) -> MccResult<Self> {
        if radius == 0 {
            return Err(MccError::InvalidRadius(radius));
        }
        if bins == 0 {
            return Err(MccError::InvalidBins(bins));
        }
        Ok(Self { radius, bins })
    }

    pub fn radius(&self) -> u32 {
        self.radius
    }

    pub fn bins(&self) -> usize {
        self.bins
    }

    /// One descriptor per minutia, in input order.
    pub fn build(&self, minutiae: &[MinutiaPoint], field: &OrientationField) -> Vec<CylinderDescriptor> {
        let descriptors: Vec<CylinderDescriptor> = minutiae
            .par_iter()
            .map(|&m| self.describe(m, minutiae, field))
            .collect();

        debug!(
            "CylinderBuilder: {} descriptors ({} isolated), radius {}, {}x{} bins",
            descriptors.len(),
            descriptors.iter().filter(|d| d.is_zero()).count(),
            self.radius,
            self.bins,
            self.bins
        );
        descriptors
    }

    /// Histogram around `center` over every point of `neighbours`.
    ///
    /// Points at distance 0 (the centre itself, or duplicates of it) and at
    /// distance `>= radius` are skipped.
    pub fn describe(&self, center: MinutiaPoint, neighbours: &[MinutiaPoint], field: &OrientationField) -> CylinderDescriptor {
        let radius = self.radius as i64;
        let bins = self.bins as i64;
        let span = 2 * radius;
        CylinderDescriptor::from_accumulator(self.bins, |acc| {
            for m2 in neighbours {
                let dy = m2.row as i64 - center.row as i64;
                let dx = m2.col as i64 - center.col as i64;
                let dist = (dx as f64).hypot(dy as f64);
                if dist >= radius as f64 || dist == 0.0 {
                    continue;
                }

                // Exact integer floor of (d + r)·bins / 2r; the operand is positive inside the radius.
                let bin_x = ((dx + radius) * bins).div_euclid(span);
                let bin_y = ((dy + radius) * bins).div_euclid(span);
                if !(0..bins).contains(&bin_x) || !(0..bins).contains(&bin_y) {
                    continue;
                }

                let angle = neighbour_angle(field, *m2);
                acc[bin_y as usize * self.bins + bin_x as usize] += angle.cos();
            }
        })
    }
}

impl Default for CylinderBuilder {
    fn default() -> Self {
        Self {
            radius: mcc_core::DEFAULT_RADIUS,
            bins: mcc_core::DEFAULT_BINS,
        }
    }
}

/// Ridge angle at the fixed 16px block holding `p`; 0 outside the field.
#[inline]
fn neighbour_angle(field: &OrientationField, p: MinutiaPoint) -> f64 {
    let block_row = p.row.div_euclid(ORIENTATION_LOOKUP_BLOCK) as i64;
    let block_col = p.col.div_euclid(ORIENTATION_LOOKUP_BLOCK) as i64;
    field.angle_at_block(block_row, block_col).unwrap_or(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn pts(coords: &[(i32, i32)]) -> Vec<MinutiaPoint> {
        coords.iter().copied().map(MinutiaPoint::from).collect()
    }

    fn flat_field() -> OrientationField {
        OrientationField::zeros(8, 8, 16)
    }

    #[test]
    fn test_invalid_parameters() {
        assert!(matches!(CylinderBuilder::new(0, 8), Err(MccError::InvalidRadius(0))));
        assert!(matches!(CylinderBuilder::new(16, 0), Err(MccError::InvalidBins(0))));
    }

    #[test]
    fn test_empty_input() {
        let out = CylinderBuilder::default().build(&[], &flat_field());
        assert!(out.is_empty());
    }

    #[test]
    fn test_single_minutia_is_all_zero() {
        let out = CylinderBuilder::default().build(&pts(&[(5, 5)]), &flat_field());
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].len(), 64);
        assert!(out[0].is_zero());
    }

    #[test]
    fn test_three_point_scenario() {
        let minutiae = pts(&[(10, 10), (10, 20), (20, 10)]);
        let out = CylinderBuilder::new(16, 8).unwrap().build(&minutiae, &flat_field());
        assert_eq!(out.len(), 3);
        for d in &out {
            assert_eq!(d.len(), 64);
            assert_eq!(d.non_zero_cells(), 2);
            // Zero field: every contribution is cos(0) = 1
            assert_eq!(d.as_slice().iter().sum::<f64>(), 2.0);
        }

        // From (10,10): (10,20) has dy=0, dx=10 -> bin_y = 16·8/32 = 4, bin_x = 26·8/32 = 6
        assert_eq!(out[0].cell(4, 6), 1.0);
        // (20,10) has dy=10, dx=0 -> bin_y = 6, bin_x = 4
        assert_eq!(out[0].cell(6, 4), 1.0);
        // From (10,20): (20,10) has dy=10, dx=-10 -> bin_y = 6, bin_x = 6·8/32 = 1
        assert_eq!(out[1].cell(6, 1), 1.0);
    }

    #[test]
    fn test_radius_is_strict() {
        // dist == radius exactly is excluded
        let out = CylinderBuilder::new(16, 8).unwrap().build(&pts(&[(0, 0), (0, 16)]), &flat_field());
        assert!(out[0].is_zero());
        assert!(out[1].is_zero());

        // 5-12-13 triangle: dist 13 < 14 is kept
        let out = CylinderBuilder::new(14, 8).unwrap().build(&pts(&[(0, 0), (5, 12)]), &flat_field());
        assert_eq!(out[0].non_zero_cells(), 1);
    }

    #[test]
    fn test_just_inside_radius_lands_in_valid_bin() {
        // dist = 15 with radius 16: dx = 15 -> bin_x = 31·8/32 = 7 (last bin)
        let out = CylinderBuilder::new(16, 8).unwrap().build(&pts(&[(0, 0), (0, 15)]), &flat_field());
        assert_eq!(out[0].cell(4, 7), 1.0);
        // and the mirror: dx = -15 -> bin_x = 1·8/32 = 0
        assert_eq!(out[1].cell(4, 0), 1.0);
    }

    #[test]
    fn test_duplicates_are_skipped_like_self() {
        let out = CylinderBuilder::default().build(&pts(&[(3, 3), (3, 3)]), &flat_field());
        assert!(out.iter().all(|d| d.is_zero()));
    }

    #[test]
    fn test_orientation_weighting_uses_fixed_block() {
        // Field estimated with 8px blocks; lookup still divides by 16.
        let mut angles = vec![0.0; 4 * 4];
        angles[1 * 4 + 1] = std::f64::consts::FRAC_PI_3; // block (1,1) covers 16..32 at 16px
        let field = OrientationField::from_angles(4, 4, 8, angles).unwrap();

        let out = CylinderBuilder::default().build(&pts(&[(10, 10), (20, 20)]), &field);
        // Neighbour (20,20) -> block (1,1) -> cos(π/3) = 0.5
        let total: f64 = out[0].as_slice().iter().sum();
        assert!((total - 0.5).abs() < 1e-12);
        // Neighbour (10,10) -> block (0,0) -> cos(0) = 1
        let total: f64 = out[1].as_slice().iter().sum();
        assert_eq!(total, 1.0);
    }

    #[test]
    fn test_out_of_field_lookup_reads_zero_angle() {
        let field = OrientationField::from_angles(1, 1, 16, vec![1.2]).unwrap();
        // (40, 40) is block (2, 2), outside a 1x1 field; (-3, 30) is block (-1, 1)
        let out = CylinderBuilder::new(64, 8).unwrap().build(&pts(&[(30, 30), (40, 40), (-3, 30)]), &field);
        assert_eq!(out[0].as_slice().iter().sum::<f64>(), 2.0);
    }

    #[test]
    fn test_contributions_accumulate_in_one_cell() {
        // Both neighbours fall into the same cell around the origin.
        let out = CylinderBuilder::new(16, 2).unwrap().build(&pts(&[(0, 0), (1, 1), (2, 2)]), &flat_field());
        assert_eq!(out[0].cell(1, 1), 2.0);
        assert_eq!(out[0].non_zero_cells(), 1);
    }

    proptest! {
        #[test]
        fn output_matches_input_length(
            coords in proptest::collection::vec((-40i32..200, -40i32..200), 0..40),
            radius in 1u32..40,
            bins in 1usize..12,
        ) {
            let minutiae = pts(&coords);
            let builder = CylinderBuilder::new(radius, bins).unwrap();
            let out = builder.build(&minutiae, &OrientationField::zeros(6, 6, 16));
            prop_assert_eq!(out.len(), minutiae.len());
            for d in &out {
                prop_assert_eq!(d.len(), bins * bins);
                prop_assert!(d.as_slice().iter().all(|v| v.is_finite()));
            }
        }
    }
}
