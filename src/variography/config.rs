use serde::{Deserialize, Serialize};

use crate::error::{Result, VariogramError};
use crate::geometry::variogram_tolerance::{effective_tolerance_deg, DEFAULT_AZIMUTH_TOLERANCE_DEG};
use crate::variography::lags::DEFAULT_EPSILON;

/// Options shared by the omni, directional and map computations.
///
/// `None` means the value is derived from the data when the engine is built:
/// * `n_lags` - `round(n_rows / 10)`, at least one. Every row counts here,
///   including rows with a missing value that take no part in any lag, so a
///   sparse column gets as many bins as a complete one of the same length.
/// * `max_dist` - larger of the x and y ranges of the samples
/// * `bandwidth_tolerance` - `max_dist / 2`
/// * `lag_tolerance` - half the smallest spacing between bin centers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VariogramConfig {
    pub n_lags: Option<usize>,
    pub azimuth_tolerance_deg: f64,
    pub bandwidth_tolerance: Option<f64>,
    pub lag_tolerance: Option<f64>,
    pub max_dist: Option<f64>,
    pub standardize_sill: bool,
    pub min_points: usize,
    pub epsilon: f64,
}

impl Default for VariogramConfig {
    fn default() -> Self {
        Self {
            n_lags: None,
            azimuth_tolerance_deg: DEFAULT_AZIMUTH_TOLERANCE_DEG,
            bandwidth_tolerance: None,
            lag_tolerance: None,
            max_dist: None,
            standardize_sill: false,
            min_points: 0,
            epsilon: DEFAULT_EPSILON,
        }
    }
}

impl VariogramConfig {
    pub fn with_n_lags(mut self, n_lags: usize) -> Self {
        self.n_lags = Some(n_lags);
        self
    }

    pub fn with_azimuth_tolerance_deg(mut self, tolerance: f64) -> Self {
        self.azimuth_tolerance_deg = tolerance;
        self
    }

    pub fn with_bandwidth_tolerance(mut self, tolerance: f64) -> Self {
        self.bandwidth_tolerance = Some(tolerance);
        self
    }

    pub fn with_lag_tolerance(mut self, tolerance: f64) -> Self {
        self.lag_tolerance = Some(tolerance);
        self
    }

    pub fn with_max_dist(mut self, max_dist: f64) -> Self {
        self.max_dist = Some(max_dist);
        self
    }

    pub fn with_standardized_sill(mut self, standardize: bool) -> Self {
        self.standardize_sill = standardize;
        self
    }

    pub fn with_min_points(mut self, min_points: usize) -> Self {
        self.min_points = min_points;
        self
    }

    pub fn with_epsilon(mut self, epsilon: f64) -> Self {
        self.epsilon = epsilon;
        self
    }

    /// Rejects values no computation can use. A non-positive azimuth
    /// tolerance is not an error, it falls back to 45 degrees.
    pub fn validate(&self) -> Result<()> {
        if self.n_lags == Some(0) {
            return Err(VariogramError::InvalidParameter {
                name: "n_lags",
                value: 0.0,
            });
        }
        if !self.azimuth_tolerance_deg.is_finite() {
            return Err(VariogramError::InvalidParameter {
                name: "azimuth_tolerance_deg",
                value: self.azimuth_tolerance_deg,
            });
        }
        check_positive("bandwidth_tolerance", self.bandwidth_tolerance)?;
        check_positive("lag_tolerance", self.lag_tolerance)?;
        check_positive("max_dist", self.max_dist)?;
        if !(self.epsilon.is_finite() && self.epsilon >= 0.0) {
            return Err(VariogramError::InvalidParameter {
                name: "epsilon",
                value: self.epsilon,
            });
        }
        Ok(())
    }

    pub fn effective_azimuth_tolerance_deg(&self) -> f64 {
        effective_tolerance_deg(self.azimuth_tolerance_deg)
    }
}

/// `round(n_samples / 10)` with ties to even, never below one.
pub fn default_n_lags(n_samples: usize) -> usize {
    ((n_samples as f64 / 10.0).round_ties_even() as usize).max(1)
}

fn check_positive(name: &'static str, value: Option<f64>) -> Result<()> {
    match value {
        Some(v) if !(v.is_finite() && v > 0.0) => {
            Err(VariogramError::InvalidParameter { name, value: v })
        }
        _ => Ok(()),
    }
}
