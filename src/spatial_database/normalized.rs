use mathru::statistics::distrib::{Continuous, Normal};
use ordered_float::OrderedFloat;

/// Sample variance with an n - 1 denominator, `None` for fewer than two values.
pub fn sample_variance(data: &[f64]) -> Option<f64> {
    if data.len() < 2 {
        return None;
    }
    let mean = data.iter().sum::<f64>() / data.len() as f64;
    let ss = data.iter().map(|v| (v - mean).powi(2)).sum::<f64>();
    Some(ss / (data.len() - 1) as f64)
}

/// Standard score transform fitted on a set of values.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ZScoreTransform {
    mean: f64,
    std_dev: f64,
}

impl ZScoreTransform {
    pub fn new(mean: f64, std_dev: f64) -> Self {
        Self { mean, std_dev }
    }

    pub fn mean(&self) -> f64 {
        self.mean
    }

    pub fn std_dev(&self) -> f64 {
        self.std_dev
    }

    pub fn transform(&self, data: f64) -> f64 {
        (data - self.mean) / self.std_dev
    }

    pub fn back_transform(&self, data: f64) -> f64 {
        data * self.std_dev + self.mean
    }
}

impl From<&[f64]> for ZScoreTransform {
    fn from(data: &[f64]) -> Self {
        let mean = data.iter().sum::<f64>() / data.len() as f64;
        let std_dev = sample_variance(data).unwrap_or(f64::NAN).sqrt();
        Self::new(mean, std_dev)
    }
}

/// 1-based ranks, ties share the average of the ranks they span.
pub fn average_ranks(data: &[f64]) -> Vec<f64> {
    let mut order = (0..data.len()).collect::<Vec<_>>();
    order.sort_by_key(|&i| OrderedFloat(data[i]));

    let mut ranks = vec![0.0; data.len()];
    let mut start = 0;
    while start < order.len() {
        let mut end = start + 1;
        while end < order.len() && data[order[end]] == data[order[start]] {
            end += 1;
        }
        //ranks start..end are tied, positions are 1-based
        let rank = (start + 1 + end) as f64 / 2.0;
        for &i in &order[start..end] {
            ranks[i] = rank;
        }
        start = end;
    }
    ranks
}

/// Van der Waerden normal scores, `Φ⁻¹(rank / (n + 1))`.
pub fn normal_scores(data: &[f64]) -> Vec<f64> {
    let standard_normal = Normal::new(0.0, 1.0);
    let n = data.len() as f64;
    average_ranks(data)
        .into_iter()
        .map(|rank| standard_normal.quantile(rank / (n + 1.0)))
        .collect()
}
