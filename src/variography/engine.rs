use rayon::prelude::*;

use crate::error::{Result, VariogramError};
use crate::geometry::{variogram_tolerance::DirectionalProjector, LagTolerance};
use crate::spatial_database::PointDataset;
use crate::variography::binning::{DirectionalVariogram, LagBinner, VariogramBin};
use crate::variography::config::{default_n_lags, VariogramConfig};
use crate::variography::lags::{LagIndex, LagSet};
use crate::variography::map::{MapBinner, VariogramMap};

/// Experimental variograms of one feature.
///
/// The pairwise lag table is built once in [`VariogramEngine::new`]. Every
/// computation reads it and filters a fresh copy, so calls are independent of
/// each other and of their order.
#[derive(Debug, Clone)]
pub struct VariogramEngine {
    feature: String,
    config: VariogramConfig,
    index: LagIndex,
    n_lags: usize,
    azimuth_tolerance_deg: f64,
    bandwidth_tolerance: f64,
    sill: Option<f64>,
}

impl VariogramEngine {
    pub fn new(dataset: &PointDataset, config: VariogramConfig) -> Result<Self> {
        config.validate()?;

        let n_usable = dataset.n_usable();
        if n_usable < 2 {
            return Err(VariogramError::InsufficientSamples(n_usable));
        }

        let sill = if config.standardize_sill {
            match dataset.sample_variance() {
                Some(variance) if variance > 0.0 && variance.is_finite() => Some(variance),
                _ => return Err(VariogramError::ZeroVariance(dataset.feature().to_owned())),
            }
        } else {
            None
        };

        let index = LagIndex::new(dataset, config.max_dist, config.epsilon)?;
        if index.lags().is_empty() {
            tracing::warn!(
                feature = dataset.feature(),
                "no lag pairs beyond epsilon, every bin will be empty"
            );
        }

        Ok(Self {
            feature: dataset.feature().to_owned(),
            n_lags: config.n_lags.unwrap_or_else(|| default_n_lags(dataset.len())),
            azimuth_tolerance_deg: config.effective_azimuth_tolerance_deg(),
            bandwidth_tolerance: config
                .bandwidth_tolerance
                .unwrap_or(index.max_dist() / 2.0),
            sill,
            index,
            config,
        })
    }

    pub fn feature(&self) -> &str {
        &self.feature
    }

    pub fn config(&self) -> &VariogramConfig {
        &self.config
    }

    pub fn lag_index(&self) -> &LagIndex {
        &self.index
    }

    pub fn n_lags(&self) -> usize {
        self.n_lags
    }

    pub fn max_dist(&self) -> f64 {
        self.index.max_dist()
    }

    pub fn bandwidth_tolerance(&self) -> f64 {
        self.bandwidth_tolerance
    }

    pub fn azimuth_tolerance_deg(&self) -> f64 {
        self.azimuth_tolerance_deg
    }

    /// Sample variance used for sill standardization, when enabled.
    pub fn sill(&self) -> Option<f64> {
        self.sill
    }

    /// Omni-directional variogram over all lags.
    pub fn omni(&self) -> Vec<VariogramBin> {
        let bins = self.bin(self.index.lags());
        tracing::debug!(
            feature = %self.feature,
            n_bins = bins.len(),
            "computed omni variogram"
        );
        bins
    }

    pub fn projector(&self, azimuth_deg: f64) -> DirectionalProjector {
        DirectionalProjector::new(
            azimuth_deg,
            self.azimuth_tolerance_deg,
            self.bandwidth_tolerance,
        )
    }

    /// Variogram along a compass azimuth in degrees clockwise from north.
    pub fn azimuthal(&self, azimuth_deg: f64) -> Result<DirectionalVariogram> {
        if !azimuth_deg.is_finite() {
            return Err(VariogramError::InvalidParameter {
                name: "azimuth_deg",
                value: azimuth_deg,
            });
        }

        let lags = self.projector(azimuth_deg).filter(self.index.lags());
        tracing::debug!(
            feature = %self.feature,
            azimuth_deg,
            n_pairs = lags.len(),
            "computed azimuthal variogram"
        );

        Ok(DirectionalVariogram {
            azimuth_deg,
            bins: self.bin(&lags),
        })
    }

    /// One variogram per azimuth, in input order, computed in parallel.
    pub fn azimuthal_sweep(&self, azimuths_deg: &[f64]) -> Result<Vec<DirectionalVariogram>> {
        azimuths_deg
            .par_iter()
            .map(|&azimuth| self.azimuthal(azimuth))
            .collect()
    }

    /// Variogram map over signed offsets, reporting cells with at least
    /// `min_points` pairs.
    pub fn map(&self) -> VariogramMap {
        let map = MapBinner::new(self.n_lags)
            .bin(self.index.lags(), self.index.max_dist())
            .with_min_points(self.config.min_points);
        tracing::debug!(
            feature = %self.feature,
            n_cells = map.cells().count(),
            "computed variogram map"
        );
        match self.sill {
            Some(sill) => map.standardized(sill),
            None => map,
        }
    }

    fn bin(&self, lags: &LagSet) -> Vec<VariogramBin> {
        let bins = LagBinner::new(self.n_lags, self.config.lag_tolerance)
            .bin(lags, self.index.max_dist());
        match self.sill {
            Some(sill) => bins.into_iter().map(|b| b.standardized(sill)).collect(),
            None => bins,
        }
    }
}
