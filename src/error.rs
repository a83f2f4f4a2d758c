use thiserror::Error;

// Unified error type for kryst-amg

#[derive(Error, Debug, Clone, PartialEq)]
pub enum AmgError {
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("degenerate coarsening at level {level}: {rows} rows mapped onto {cols} coarse unknowns")]
    DegenerateCoarsening { level: usize, rows: usize, cols: usize },
    #[error("structurally singular matrix (row {row} is empty)")]
    SingularMatrix { row: usize },
    #[error("zero pivot at row {0}")]
    ZeroPivot(usize),
    #[error("factorization error: {0}")]
    FactorError(String),
    #[error("invalid option {key}={value}")]
    InvalidOption { key: String, value: String },
    #[error("solver breakdown: {0}")]
    Breakdown(&'static str),
    #[error("unsupported operation: {0}")]
    Unsupported(&'static str),
}

impl AmgError {
    pub(crate) fn invalid_option(key: &str, value: &str) -> Self {
        AmgError::InvalidOption { key: key.to_string(), value: value.to_string() }
    }
}
