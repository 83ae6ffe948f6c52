use itertools::Itertools;
use ndarray::Array2;
use rayon::prelude::*;
use serde::Serialize;

use crate::variography::binning::{interior_linspace, semivariance};
use crate::variography::lags::LagSet;

/// Cell half widths are inflated by this factor so spacing jitter leaves no gap
/// between neighbouring cells.
pub const MAP_TOLERANCE_INFLATION: f64 = 1.02;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct VariogramMapCell {
    pub x_lag: f64,
    pub y_lag: f64,
    pub semivariance: f64,
    pub n_pairs: usize,
}

/// Semivariance and pair counts over signed `(dx, dy)` offsets.
///
/// Grids are indexed `[x_index, y_index]`.
#[derive(Debug, Clone, PartialEq)]
pub struct VariogramMap {
    x_lags: Vec<f64>,
    y_lags: Vec<f64>,
    x_tolerance: f64,
    y_tolerance: f64,
    semivariance: Array2<f64>,
    n_pairs: Array2<usize>,
    min_points: usize,
}

impl VariogramMap {
    pub fn x_lags(&self) -> &[f64] {
        &self.x_lags
    }

    pub fn y_lags(&self) -> &[f64] {
        &self.y_lags
    }

    pub fn tolerances(&self) -> (f64, f64) {
        (self.x_tolerance, self.y_tolerance)
    }

    pub fn semivariance(&self) -> &Array2<f64> {
        &self.semivariance
    }

    pub fn n_pairs(&self) -> &Array2<usize> {
        &self.n_pairs
    }

    pub fn min_points(&self) -> usize {
        self.min_points
    }

    /// The cell at `[ix, iy]`, or `None` when either index is off the grid.
    pub fn cell(&self, ix: usize, iy: usize) -> Option<VariogramMapCell> {
        Some(VariogramMapCell {
            x_lag: *self.x_lags.get(ix)?,
            y_lag: *self.y_lags.get(iy)?,
            semivariance: *self.semivariance.get([ix, iy])?,
            n_pairs: *self.n_pairs.get([ix, iy])?,
        })
    }

    /// Reported cells, x-major, without those below `min_points` pairs.
    pub fn cells(&self) -> impl Iterator<Item = VariogramMapCell> + '_ {
        (0..self.x_lags.len())
            .cartesian_product(0..self.y_lags.len())
            .filter_map(|(ix, iy)| self.cell(ix, iy))
            .filter(|cell| cell.n_pairs >= self.min_points)
    }

    pub fn with_min_points(self, min_points: usize) -> Self {
        Self { min_points, ..self }
    }

    pub fn standardized(mut self, sill: f64) -> Self {
        self.semivariance.mapv_inplace(|v| v / sill);
        self
    }
}

/// Bins signed lag offsets onto an `n_lags` x `n_lags` grid.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MapBinner {
    n_lags: usize,
}

impl MapBinner {
    pub fn new(n_lags: usize) -> Self {
        Self { n_lags }
    }

    /// Axis values and inflated half width; an empty set spans `[-max_dist, max_dist]`.
    fn axis(&self, range: Option<(f64, f64)>, max_dist: f64) -> (Vec<f64>, f64) {
        let (min, max) = range.unwrap_or((-max_dist, max_dist));
        let (values, step) = interior_linspace(min, max, self.n_lags);
        let mean_spacing = if values.len() > 1 {
            (values[values.len() - 1] - values[0]) / (values.len() - 1) as f64
        } else {
            step
        };
        (values, mean_spacing / 2.0 * MAP_TOLERANCE_INFLATION)
    }

    pub fn bin(&self, lags: &LagSet, max_dist: f64) -> VariogramMap {
        let (x_lags, x_tolerance) = self.axis(lags.dx_range(), max_dist);
        let (y_lags, y_tolerance) = self.axis(lags.dy_range(), max_dist);

        let rows = x_lags
            .par_iter()
            .map(|&x| {
                let in_column = lags
                    .iter()
                    .filter(|lag| (lag.dx - x).abs() <= x_tolerance)
                    .collect_vec();
                y_lags
                    .iter()
                    .map(|&y| {
                        semivariance(
                            in_column
                                .iter()
                                .copied()
                                .filter(|lag| (lag.dy - y).abs() <= y_tolerance),
                        )
                    })
                    .collect_vec()
            })
            .collect::<Vec<_>>();

        let shape = (x_lags.len(), y_lags.len());
        let mut semivariance_grid = Array2::from_elem(shape, f64::NAN);
        let mut n_pairs_grid = Array2::zeros(shape);
        for (ix, row) in rows.into_iter().enumerate() {
            for (iy, (value, count)) in row.into_iter().enumerate() {
                semivariance_grid[[ix, iy]] = value;
                n_pairs_grid[[ix, iy]] = count;
            }
        }

        VariogramMap {
            x_lags,
            y_lags,
            x_tolerance,
            y_tolerance,
            semivariance: semivariance_grid,
            n_pairs: n_pairs_grid,
            min_points: 0,
        }
    }
}
