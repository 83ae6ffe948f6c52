use itertools::{Itertools, MinMaxResult};
use nalgebra::Point2;
use ordered_float::OrderedFloat;
use serde::{Deserialize, Serialize};

use crate::error::{Result, VariogramError};

pub mod feature_table;
pub mod normalized;

/// A single measurement of the analysed feature.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    pub id: usize,
    pub x: f64,
    pub y: f64,
    pub value: f64,
}

impl Sample {
    pub fn new(id: usize, x: f64, y: f64, value: f64) -> Self {
        Self { id, x, y, value }
    }

    pub fn point(&self) -> Point2<f64> {
        Point2::new(self.x, self.y)
    }

    /// Rows with a missing coordinate or value take no part in any lag.
    pub fn is_usable(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.value.is_finite()
    }
}

/// Read-only table of samples for one feature column.
#[derive(Debug, Clone, PartialEq)]
pub struct PointDataset {
    feature: String,
    samples: Vec<Sample>,
}

impl PointDataset {
    pub fn new(feature: impl Into<String>, samples: Vec<Sample>) -> Self {
        Self {
            feature: feature.into(),
            samples,
        }
    }

    /// Builds a dataset from parallel point and value slices, ids are row indices.
    pub fn from_points(
        feature: impl Into<String>,
        points: &[Point2<f64>],
        values: &[f64],
    ) -> Result<Self> {
        let feature = feature.into();
        if points.len() != values.len() {
            return Err(VariogramError::ColumnLength {
                column: feature,
                expected: points.len(),
                found: values.len(),
            });
        }

        let samples = points
            .iter()
            .zip(values)
            .enumerate()
            .map(|(id, (p, v))| Sample::new(id, p.x, p.y, *v))
            .collect();

        Ok(Self::new(feature, samples))
    }

    pub fn feature(&self) -> &str {
        &self.feature
    }

    pub fn samples(&self) -> &[Sample] {
        &self.samples
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn usable_samples(&self) -> impl Iterator<Item = &Sample> + '_ {
        self.samples.iter().filter(|s| s.is_usable())
    }

    pub fn n_usable(&self) -> usize {
        self.usable_samples().count()
    }

    /// Range of the usable samples along x and y.
    pub fn extent(&self) -> [f64; 2] {
        let range = |values: MinMaxResult<OrderedFloat<f64>>| match values {
            MinMaxResult::MinMax(min, max) => max.0 - min.0,
            MinMaxResult::OneElement(_) | MinMaxResult::NoElements => 0.0,
        };

        [
            range(self.usable_samples().map(|s| OrderedFloat(s.x)).minmax()),
            range(self.usable_samples().map(|s| OrderedFloat(s.y)).minmax()),
        ]
    }

    /// Sample variance (n - 1 denominator) of the usable values.
    pub fn sample_variance(&self) -> Option<f64> {
        normalized::sample_variance(&self.usable_samples().map(|s| s.value).collect::<Vec<_>>())
    }
}
