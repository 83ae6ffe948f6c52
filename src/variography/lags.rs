//! Pairwise lag table.
//!
//! Every ordered pair of usable samples is materialised, so memory and time grow
//! as n(n - 1). A few thousand samples are comfortable; past roughly 10^4 samples
//! the table no longer fits in memory.

use itertools::{Itertools, MinMaxResult};
use nalgebra::Vector2;
use ordered_float::OrderedFloat;

use crate::error::{Result, VariogramError};
use crate::spatial_database::{PointDataset, Sample};

/// Distances at or below this are treated as coincident points.
pub const DEFAULT_EPSILON: f64 = 1.0e-5;

/// Separation between the ordered sample pair `(tail, head)`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LagPair {
    pub tail: usize,
    pub head: usize,
    pub h: f64,
    pub dx: f64,
    pub dy: f64,
    pub tail_value: f64,
    pub head_value: f64,
    pub sq_diff: f64,
}

impl LagPair {
    pub fn new(tail: &Sample, head: &Sample) -> Self {
        let dx = tail.x - head.x;
        let dy = tail.y - head.y;
        let diff = tail.value - head.value;
        Self {
            tail: tail.id,
            head: head.id,
            h: Vector2::new(dx, dy).norm(),
            dx,
            dy,
            tail_value: tail.value,
            head_value: head.value,
            sq_diff: diff * diff,
        }
    }

    pub fn offset(&self) -> Vector2<f64> {
        Vector2::new(self.dx, self.dy)
    }
}

/// Working collection of lags for one computation.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LagSet {
    pairs: Vec<LagPair>,
}

impl LagSet {
    pub fn new(pairs: Vec<LagPair>) -> Self {
        Self { pairs }
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    pub fn pairs(&self) -> &[LagPair] {
        &self.pairs
    }

    pub fn iter(&self) -> std::slice::Iter<'_, LagPair> {
        self.pairs.iter()
    }

    /// Fresh set holding the pairs accepted by `keep`; `self` is left as is.
    pub fn filtered<F>(&self, keep: F) -> LagSet
    where
        F: Fn(&LagPair) -> bool,
    {
        LagSet::new(self.pairs.iter().copied().filter(|lag| keep(lag)).collect())
    }

    pub fn distance_range(&self) -> Option<(f64, f64)> {
        self.range_of(|lag| lag.h)
    }

    pub fn dx_range(&self) -> Option<(f64, f64)> {
        self.range_of(|lag| lag.dx)
    }

    pub fn dy_range(&self) -> Option<(f64, f64)> {
        self.range_of(|lag| lag.dy)
    }

    fn range_of(&self, f: impl Fn(&LagPair) -> f64) -> Option<(f64, f64)> {
        match self.pairs.iter().map(|lag| OrderedFloat(f(lag))).minmax() {
            MinMaxResult::NoElements => None,
            MinMaxResult::OneElement(v) => Some((v.0, v.0)),
            MinMaxResult::MinMax(min, max) => Some((min.0, max.0)),
        }
    }
}

impl<'a> IntoIterator for &'a LagSet {
    type Item = &'a LagPair;
    type IntoIter = std::slice::Iter<'a, LagPair>;

    fn into_iter(self) -> Self::IntoIter {
        self.pairs.iter()
    }
}

/// All directed lags of a dataset within `(epsilon, max_dist]`.
#[derive(Debug, Clone)]
pub struct LagIndex {
    lags: LagSet,
    max_dist: f64,
    epsilon: f64,
    n_samples: usize,
}

impl LagIndex {
    /// `max_dist` defaults to the larger of the x and y ranges of the samples.
    pub fn new(dataset: &PointDataset, max_dist: Option<f64>, epsilon: f64) -> Result<Self> {
        let samples = dataset.usable_samples().collect_vec();
        if samples.len() < 2 {
            return Err(VariogramError::InsufficientSamples(samples.len()));
        }

        let max_dist = max_dist.unwrap_or_else(|| {
            let [range_x, range_y] = dataset.extent();
            range_x.max(range_y)
        });

        let pairs = samples
            .iter()
            .enumerate()
            .cartesian_product(samples.iter().enumerate())
            .filter(|((i, _), (j, _))| i != j)
            .map(|((_, tail), (_, head))| LagPair::new(tail, head))
            .filter(|lag| lag.h > epsilon && lag.h <= max_dist)
            .collect::<Vec<_>>();

        tracing::debug!(
            feature = dataset.feature(),
            n_samples = samples.len(),
            n_lags = pairs.len(),
            max_dist,
            "built lag index"
        );

        Ok(Self {
            lags: LagSet::new(pairs),
            max_dist,
            epsilon,
            n_samples: samples.len(),
        })
    }

    pub fn lags(&self) -> &LagSet {
        &self.lags
    }

    pub fn max_dist(&self) -> f64 {
        self.max_dist
    }

    pub fn epsilon(&self) -> f64 {
        self.epsilon
    }

    pub fn n_samples(&self) -> usize {
        self.n_samples
    }
}

#[cfg(test)]
mod test {
    use approx::assert_relative_eq;
    use nalgebra::Point2;
    use proptest::prelude::*;

    use super::*;

    fn unit_square() -> PointDataset {
        PointDataset::from_points(
            "v",
            &[
                Point2::new(0.0, 0.0),
                Point2::new(1.0, 0.0),
                Point2::new(0.0, 1.0),
                Point2::new(1.0, 1.0),
            ],
            &[1.0, 3.0, 1.0, 3.0],
        )
        .unwrap()
    }

    #[test]
    fn default_cutoff_drops_diagonals() {
        let index = LagIndex::new(&unit_square(), None, DEFAULT_EPSILON).unwrap();
        assert_eq!(index.max_dist(), 1.0);
        assert_eq!(index.lags().len(), 8);
        assert!(index.lags().iter().all(|lag| lag.h == 1.0));
    }

    #[test]
    fn both_orders_are_kept() {
        let index = LagIndex::new(&unit_square(), Some(2.0), DEFAULT_EPSILON).unwrap();
        assert_eq!(index.lags().len(), 12);

        let forward = index
            .lags()
            .iter()
            .find(|lag| lag.tail == 0 && lag.head == 3)
            .unwrap();
        let reverse = index
            .lags()
            .iter()
            .find(|lag| lag.tail == 3 && lag.head == 0)
            .unwrap();

        assert_relative_eq!(forward.h, 2f64.sqrt());
        assert_eq!(forward.h, reverse.h);
        assert_eq!((forward.dx, forward.dy), (-1.0, -1.0));
        assert_eq!((reverse.dx, reverse.dy), (1.0, 1.0));
        assert_eq!(forward.sq_diff, 4.0);
    }

    #[test]
    fn coincident_points_give_empty_set() {
        let dataset = PointDataset::from_points("v", &[Point2::new(2.0, 2.0); 5], &[1.0; 5]).unwrap();
        let index = LagIndex::new(&dataset, None, DEFAULT_EPSILON).unwrap();
        assert!(index.lags().is_empty());
        assert_eq!(index.lags().distance_range(), None);
    }

    #[test]
    fn too_few_samples() {
        let dataset = PointDataset::from_points(
            "v",
            &[Point2::new(0.0, 0.0), Point2::new(1.0, 1.0)],
            &[1.0, f64::NAN],
        )
        .unwrap();
        let err = LagIndex::new(&dataset, None, DEFAULT_EPSILON).unwrap_err();
        assert!(matches!(err, VariogramError::InsufficientSamples(1)));
    }

    #[test]
    fn filtered_leaves_source_untouched() {
        let index = LagIndex::new(&unit_square(), Some(2.0), DEFAULT_EPSILON).unwrap();
        let diagonals = index.lags().filtered(|lag| lag.h > 1.0);
        assert_eq!(diagonals.len(), 4);
        assert_eq!(index.lags().len(), 12);
    }

    proptest! {
        #[test]
        fn distances_are_symmetric(
            coords in prop::collection::vec((0.0..100.0f64, 0.0..100.0f64, -5.0..5.0f64), 2..20)
        ) {
            let (points, values): (Vec<_>, Vec<_>) = coords
                .iter()
                .map(|(x, y, v)| (Point2::new(*x, *y), *v))
                .unzip();
            let dataset = PointDataset::from_points("v", &points, &values).unwrap();
            let index = LagIndex::new(&dataset, Some(1.0e3), DEFAULT_EPSILON).unwrap();

            for lag in index.lags() {
                let reverse = index
                    .lags()
                    .iter()
                    .find(|other| other.tail == lag.head && other.head == lag.tail)
                    .unwrap();
                prop_assert_eq!(lag.h, reverse.h);
                prop_assert_eq!(lag.dx, -reverse.dx);
                prop_assert_eq!(lag.dy, -reverse.dy);
                prop_assert_eq!(lag.sq_diff, reverse.sq_diff);
                prop_assert!(lag.h > DEFAULT_EPSILON && lag.h <= 1.0e3);
            }
        }
    }
}
