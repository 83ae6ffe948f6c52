use serde::Serialize;

use crate::variography::lags::{LagPair, LagSet};

/// Semivariance of one distance bin. Empty bins carry `NaN` and zero pairs.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct VariogramBin {
    #[serde(rename = "lag_bin")]
    pub lag: f64,
    pub semivariance: f64,
    pub n_pairs: usize,
}

impl VariogramBin {
    pub fn is_empty(&self) -> bool {
        self.n_pairs == 0
    }

    pub fn standardized(self, sill: f64) -> Self {
        Self {
            semivariance: self.semivariance / sill,
            ..self
        }
    }
}

/// Experimental variogram along one compass azimuth.
#[derive(Debug, Clone, PartialEq)]
pub struct DirectionalVariogram {
    pub azimuth_deg: f64,
    pub bins: Vec<VariogramBin>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DirectionalRow {
    pub azimuth: f64,
    pub lag_bin: f64,
    pub semivariance: f64,
    pub n_pairs: usize,
}

impl DirectionalVariogram {
    /// Table rows in ascending lag order, each tagged with the azimuth.
    pub fn rows(&self) -> impl Iterator<Item = DirectionalRow> + '_ {
        self.bins.iter().map(|bin| DirectionalRow {
            azimuth: self.azimuth_deg,
            lag_bin: bin.lag,
            semivariance: bin.semivariance,
            n_pairs: bin.n_pairs,
        })
    }
}

/// Half the mean squared difference over `pairs`, `(NaN, 0)` when empty.
pub fn semivariance<'a, I>(pairs: I) -> (f64, usize)
where
    I: IntoIterator<Item = &'a LagPair>,
{
    let (sum, n_pairs) = pairs
        .into_iter()
        .fold((0.0, 0usize), |(sum, n), lag| (sum + lag.sq_diff, n + 1));

    if n_pairs == 0 {
        return (f64::NAN, 0);
    }
    (sum / (2 * n_pairs) as f64, n_pairs)
}

/// `n` evenly spaced values strictly between `start` and `end`, the interior of
/// `linspace(start, end, n + 2)`, returned with their spacing.
///
/// Values are laid out from the midpoint so a range symmetric about zero yields
/// exactly negated pairs.
pub fn interior_linspace(start: f64, end: f64, n: usize) -> (Vec<f64>, f64) {
    let step = (end - start) / (n + 1) as f64;
    let mid = 0.5 * (start + end);
    let half = 0.5 * (n + 1) as f64;
    let values = (1..=n).map(|k| mid + (k as f64 - half) * step).collect();
    (values, step)
}

/// Equal-width distance binning of a lag set.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LagBinner {
    n_lags: usize,
    lag_tolerance: Option<f64>,
}

impl LagBinner {
    pub fn new(n_lags: usize, lag_tolerance: Option<f64>) -> Self {
        Self {
            n_lags,
            lag_tolerance,
        }
    }

    pub fn n_lags(&self) -> usize {
        self.n_lags
    }

    /// Bin centers spread over the observed distances, or over `(0, max_dist)`
    /// when the set is empty.
    pub fn centers(&self, lags: &LagSet, max_dist: f64) -> (Vec<f64>, f64) {
        let (min, max) = lags.distance_range().unwrap_or((0.0, max_dist));
        interior_linspace(min, max, self.n_lags)
    }

    /// Configured half width, else half the smallest center spacing.
    pub fn tolerance(&self, centers: &[f64], step: f64) -> f64 {
        if let Some(tolerance) = self.lag_tolerance {
            return tolerance;
        }
        let min_spacing = centers
            .windows(2)
            .map(|w| w[1] - w[0])
            .fold(f64::INFINITY, f64::min);
        if min_spacing.is_finite() {
            min_spacing / 2.0
        } else {
            step / 2.0
        }
    }

    pub fn bin(&self, lags: &LagSet, max_dist: f64) -> Vec<VariogramBin> {
        let (centers, step) = self.centers(lags, max_dist);
        let tolerance = self.tolerance(&centers, step);

        centers
            .into_iter()
            .map(|center| {
                let (semivariance, n_pairs) =
                    semivariance(lags.iter().filter(|lag| (lag.h - center).abs() <= tolerance));
                VariogramBin {
                    lag: center,
                    semivariance,
                    n_pairs,
                }
            })
            .collect()
    }
}
