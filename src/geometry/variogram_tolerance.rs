use std::f64::consts::PI;

use nalgebra::Vector2;

use super::{compass_to_math_rad, LagTolerance};
use crate::variography::lags::LagPair;

/// Angular half-width used when a non-positive tolerance is requested.
pub const DEFAULT_AZIMUTH_TOLERANCE_DEG: f64 = 45.0;

/// Directional cone plus bandwidth strip around a compass azimuth.
///
/// A lag is kept when the cosine of its angle to the azimuth line is at least
/// `cos(tolerance)` in magnitude and its perpendicular offset from that line is
/// within the bandwidth. The cone is two-sided, so a lag and its reverse are
/// accepted together.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DirectionalProjector {
    azimuth_deg: f64,
    direction: Vector2<f64>,
    cos_tolerance: f64,
    bandwidth: f64,
}

impl DirectionalProjector {
    pub fn new(azimuth_deg: f64, azimuth_tolerance_deg: f64, bandwidth: f64) -> Self {
        let theta = compass_to_math_rad(azimuth_deg);
        Self {
            azimuth_deg,
            direction: Vector2::new(theta.cos(), theta.sin()),
            cos_tolerance: (effective_tolerance_deg(azimuth_tolerance_deg) * PI / 180.0).cos(),
            bandwidth,
        }
    }

    pub fn azimuth_deg(&self) -> f64 {
        self.azimuth_deg
    }

    /// Unit vector of the azimuth in x/y coordinates.
    pub fn direction(&self) -> Vector2<f64> {
        self.direction
    }

    pub fn cos_tolerance(&self) -> f64 {
        self.cos_tolerance
    }

    pub fn bandwidth(&self) -> f64 {
        self.bandwidth
    }

    /// Cosine of the angle between the lag vector and the azimuth.
    pub fn projection(&self, lag: &LagPair) -> f64 {
        self.direction.dot(&lag.offset()) / lag.h
    }

    /// Signed distance of the lag end point from the azimuth line.
    pub fn perpendicular_offset(&self, lag: &LagPair) -> f64 {
        self.direction.perp(&lag.offset())
    }
}

impl LagTolerance for DirectionalProjector {
    fn contains(&self, lag: &LagPair) -> bool {
        self.projection(lag).abs() >= self.cos_tolerance
            && self.perpendicular_offset(lag).abs() <= self.bandwidth
    }
}

/// Tolerances at or below zero fall back to the 45 degree default.
pub fn effective_tolerance_deg(azimuth_tolerance_deg: f64) -> f64 {
    if azimuth_tolerance_deg <= 0.0 {
        DEFAULT_AZIMUTH_TOLERANCE_DEG
    } else {
        azimuth_tolerance_deg
    }
}

#[cfg(test)]
mod test {
    use approx::assert_relative_eq;
    use proptest::prelude::*;

    use super::*;
    use crate::spatial_database::Sample;

    fn lag(dx: f64, dy: f64) -> LagPair {
        LagPair::new(&Sample::new(0, dx, dy, 1.0), &Sample::new(1, 0.0, 0.0, 0.0))
    }

    #[test]
    fn east_azimuth_projects_onto_x() {
        let projector = DirectionalProjector::new(90.0, 10.0, 100.0);
        assert_eq!(projector.direction(), Vector2::new(1.0, 0.0));

        let l = lag(3.0, 4.0);
        assert_relative_eq!(projector.projection(&l), 0.6);
        assert_relative_eq!(projector.perpendicular_offset(&l), 4.0);
    }

    #[test]
    fn north_azimuth_projects_onto_y() {
        let projector = DirectionalProjector::new(0.0, 10.0, 100.0);
        assert_relative_eq!(projector.projection(&lag(0.0, 2.0)), 1.0);
        assert_relative_eq!(projector.projection(&lag(0.0, -2.0)), -1.0);
        assert_relative_eq!(projector.perpendicular_offset(&lag(3.0, 0.0)), -3.0);
    }

    #[test]
    fn cone_is_two_sided() {
        let projector = DirectionalProjector::new(90.0, 20.0, 100.0);
        assert!(projector.contains(&lag(5.0, 1.0)));
        assert!(projector.contains(&lag(-5.0, -1.0)));
        assert!(!projector.contains(&lag(1.0, 5.0)));
    }

    #[test]
    fn bandwidth_limits_offset() {
        let projector = DirectionalProjector::new(90.0, 60.0, 1.5);
        assert!(projector.contains(&lag(10.0, 1.0)));
        assert!(!projector.contains(&lag(10.0, 2.0)));
    }

    #[test]
    fn non_positive_tolerance_floors_to_default() {
        let zero = DirectionalProjector::new(45.0, 0.0, 1.0);
        let negative = DirectionalProjector::new(45.0, -3.0, 1.0);
        let default = DirectionalProjector::new(45.0, DEFAULT_AZIMUTH_TOLERANCE_DEG, 1.0);
        assert_eq!(zero.cos_tolerance(), default.cos_tolerance());
        assert_eq!(negative.cos_tolerance(), default.cos_tolerance());
        assert_relative_eq!(default.cos_tolerance(), 0.5f64.sqrt());
    }

    proptest! {
        #[test]
        fn reversed_lag_negates_projection(
            dx in -50.0..50.0f64,
            dy in -50.0..50.0f64,
            azimuth in 0.0..360.0f64,
        ) {
            prop_assume!(dx.abs() + dy.abs() > 1.0e-3);
            let projector = DirectionalProjector::new(azimuth, 22.5, 10.0);
            let forward = lag(dx, dy);
            let reverse = LagPair::new(&Sample::new(1, 0.0, 0.0, 0.0), &Sample::new(0, dx, dy, 1.0));

            prop_assert_eq!(projector.projection(&forward), -projector.projection(&reverse));
            prop_assert_eq!(
                projector.perpendicular_offset(&forward),
                -projector.perpendicular_offset(&reverse)
            );
            prop_assert_eq!(projector.contains(&forward), projector.contains(&reverse));
        }
    }
}
