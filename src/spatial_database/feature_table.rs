use std::{io, path::Path};

use itertools::Itertools;
use nalgebra::Point2;
use ordered_float::OrderedFloat;

use super::{normalized, PointDataset, Sample};
use crate::error::{Result, VariogramError};

/// Lower-case, trimmed, spaces to underscores, parentheses stripped.
pub fn normalize_column_name(name: &str) -> String {
    name.trim()
        .to_lowercase()
        .replace(' ', "_")
        .replace(['(', ')'], "")
}

/// Sample coordinates plus any number of named feature columns.
///
/// Every transform returns a new table, the receiver is never modified.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureTable {
    points: Vec<Point2<f64>>,
    columns: Vec<String>,
    values: Vec<Vec<f64>>,
}

impl FeatureTable {
    pub fn new(points: Vec<Point2<f64>>, columns: Vec<(String, Vec<f64>)>) -> Result<Self> {
        let mut table = Self {
            points,
            columns: Vec::with_capacity(columns.len()),
            values: Vec::with_capacity(columns.len()),
        };
        for (name, values) in columns {
            table.push_column(name, values)?;
        }
        Ok(table)
    }

    pub fn from_csv_path(
        csv_path: impl AsRef<Path>,
        x_col: &str,
        y_col: &str,
        feature_cols: &[&str],
    ) -> Result<Self> {
        let file = std::fs::File::open(csv_path)?;
        Self::from_csv_reader(file, x_col, y_col, feature_cols)
    }

    /// Reads coordinates and feature columns from CSV, header names are matched
    /// after [`normalize_column_name`]. Empty cells become NaN.
    pub fn from_csv_reader<R: io::Read>(
        reader: R,
        x_col: &str,
        y_col: &str,
        feature_cols: &[&str],
    ) -> Result<Self> {
        let mut rdr = csv::Reader::from_reader(reader);
        let headers = rdr
            .headers()?
            .iter()
            .map(normalize_column_name)
            .collect::<Vec<_>>();

        let position = |name: &str| {
            let name = normalize_column_name(name);
            headers
                .iter()
                .position(|h| *h == name)
                .map(|i| (name.clone(), i))
                .ok_or(VariogramError::UnknownColumn(name))
        };

        let (x_name, x_idx) = position(x_col)?;
        let (y_name, y_idx) = position(y_col)?;
        let features = feature_cols
            .iter()
            .map(|c| position(*c))
            .collect::<Result<Vec<_>>>()?;

        let mut points = Vec::new();
        let mut values = vec![Vec::new(); features.len()];

        for record in rdr.records() {
            let record = record?;
            let cell = |name: &str, i: usize| parse_cell(name, record.get(i).unwrap_or(""));

            points.push(Point2::new(cell(&x_name, x_idx)?, cell(&y_name, y_idx)?));
            for ((name, i), column) in features.iter().zip(values.iter_mut()) {
                column.push(cell(name, *i)?);
            }
        }

        Self::new(
            points,
            features.into_iter().map(|(name, _)| name).zip(values).collect(),
        )
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn points(&self) -> &[Point2<f64>] {
        &self.points
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn column(&self, name: &str) -> Result<&[f64]> {
        let name = normalize_column_name(name);
        self.columns
            .iter()
            .position(|c| *c == name)
            .map(|i| self.values[i].as_slice())
            .ok_or(VariogramError::UnknownColumn(name))
    }

    /// Shifts the coordinates so the minimum of each axis is zero.
    pub fn shifted_to_origin(&self) -> Self {
        let axis_min = |axis: fn(&Point2<f64>) -> f64| {
            self.points
                .iter()
                .map(axis)
                .filter(|v| v.is_finite())
                .map(OrderedFloat)
                .min()
                .map_or(0.0, |v| v.0)
        };
        let min_x = axis_min(|p| p.x);
        let min_y = axis_min(|p| p.y);

        Self {
            points: self
                .points
                .iter()
                .map(|p| Point2::new(p.x - min_x, p.y - min_y))
                .collect(),
            columns: self.columns.clone(),
            values: self.values.clone(),
        }
    }

    /// Appends `z_<col>` standard scores for each requested column.
    pub fn with_z_scores(&self, cols: &[&str]) -> Result<Self> {
        self.with_transformed("z_", cols, |data| {
            let transform = normalized::ZScoreTransform::from(data);
            data.iter().map(|v| transform.transform(*v)).collect()
        })
    }

    /// Appends `n_<col>` normal scores for each requested column.
    pub fn with_normal_scores(&self, cols: &[&str]) -> Result<Self> {
        self.with_transformed("n_", cols, normalized::normal_scores)
    }

    /// Selects one column as the value of a [`PointDataset`].
    pub fn dataset(&self, col: &str) -> Result<PointDataset> {
        let values = self.column(col)?;
        let samples = self
            .points
            .iter()
            .zip(values)
            .enumerate()
            .map(|(id, (p, v))| Sample::new(id, p.x, p.y, *v))
            .collect();
        Ok(PointDataset::new(normalize_column_name(col), samples))
    }

    // Rows missing any of `cols` are left out of the fit and receive NaN.
    fn with_transformed<F>(&self, prefix: &str, cols: &[&str], transform: F) -> Result<Self>
    where
        F: Fn(&[f64]) -> Vec<f64>,
    {
        let sources = cols
            .iter()
            .map(|c| self.column(c).map(|v| (normalize_column_name(c), v.to_vec())))
            .collect::<Result<Vec<_>>>()?;

        let complete_rows = (0..self.len())
            .filter(|&row| sources.iter().all(|(_, v)| v[row].is_finite()))
            .collect_vec();

        let mut table = self.clone();
        for (name, source) in sources {
            let fitted = transform(&complete_rows.iter().map(|&r| source[r]).collect_vec());
            let mut column = vec![f64::NAN; self.len()];
            for (&row, value) in complete_rows.iter().zip(fitted) {
                column[row] = value;
            }
            table.push_column(format!("{prefix}{name}"), column)?;
        }
        Ok(table)
    }

    fn push_column(&mut self, name: String, values: Vec<f64>) -> Result<()> {
        let name = normalize_column_name(&name);
        if values.len() != self.points.len() {
            return Err(VariogramError::ColumnLength {
                column: name,
                expected: self.points.len(),
                found: values.len(),
            });
        }
        match self.columns.iter().position(|c| *c == name) {
            Some(i) => self.values[i] = values,
            None => {
                self.columns.push(name);
                self.values.push(values);
            }
        }
        Ok(())
    }
}

fn parse_cell(column: &str, raw: &str) -> Result<f64> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(f64::NAN);
    }
    raw.parse::<f64>().map_err(|_| VariogramError::Parse {
        column: column.to_owned(),
        value: raw.to_owned(),
    })
}
