//! Error types for the action-log pipeline

use polars::prelude::PolarsError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ArpadlError {
    #[error("invalid configuration: {0}")]
    Config(String),
    #[error(transparent)]
    Schema(#[from] SchemaError),
    #[error("dataframe error: {0}")]
    Polars(#[from] PolarsError),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// A row or column that does not conform to the action table contract.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SchemaError {
    #[error("unknown column: {0}")]
    UnknownColumn(String),
    #[error("missing column: {0}")]
    MissingColumn(String),
    #[error("null value in column {column} at row {row}")]
    NullValue { column: String, row: usize },
    #[error("invalid value {value:?} in column {column} at row {row}")]
    InvalidValue {
        column: String,
        row: usize,
        value: String,
    },
    #[error("period_id {period} out of range 1..=4 at row {row}")]
    PeriodOutOfRange { row: usize, period: i64 },
    #[error("time_seconds {time} must be finite and >= 0 at row {row}")]
    InvalidTime { row: usize, time: f64 },
    #[error("action type {action_type} is not part of the {vocabulary} vocabulary (row {row})")]
    ActionTypeNotAllowed {
        row: usize,
        action_type: String,
        vocabulary: &'static str,
    },
}
