use std::f64::consts::PI;

use crate::variography::lags::{LagPair, LagSet};

pub mod variogram_tolerance;

/// A region of lag space that accepts or rejects individual lags.
pub trait LagTolerance {
    fn contains(&self, lag: &LagPair) -> bool;

    /// Fresh set holding only the accepted lags.
    fn filter(&self, lags: &LagSet) -> LagSet {
        lags.filtered(|lag| self.contains(lag))
    }
}

/// Compass azimuth (degrees clockwise from north) to the mathematical angle in
/// radians (counterclockwise from east).
pub fn compass_to_math_rad(azimuth_deg: f64) -> f64 {
    (90.0 - azimuth_deg) * PI / 180.0
}
