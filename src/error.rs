use thiserror::Error;

pub type Result<T> = std::result::Result<T, VariogramError>;

#[derive(Debug, Error)]
pub enum VariogramError {
    #[error("at least two usable samples are required, found {0}")]
    InsufficientSamples(usize),

    #[error("invalid {name}: {value}")]
    InvalidParameter { name: &'static str, value: f64 },

    #[error("feature `{0}` has zero variance, sill standardization is undefined")]
    ZeroVariance(String),

    #[error("unknown column `{0}`")]
    UnknownColumn(String),

    #[error("column `{column}` has {found} values, expected {expected}")]
    ColumnLength {
        column: String,
        expected: usize,
        found: usize,
    },

    #[error("unable to parse `{value}` in column `{column}`")]
    Parse { column: String, value: String },

    #[error(transparent)]
    Csv(#[from] csv::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
