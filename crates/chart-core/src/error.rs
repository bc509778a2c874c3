// File: crates/chart-core/src/error.rs
// Summary: Error types: recoverable shaping errors and state contract violations.

use thiserror::Error;

use crate::chart::ChartType;

/// Shaping failures. Non-fatal: hosts show the message and keep the previous dataset.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ShapeError {
    #[error("Name column is not defined")]
    NameColumnUndefined,
    #[error("Names are not unique")]
    NamesNotUnique,
    #[error("Group by column is not defined")]
    GroupByUndefined,
    #[error("No data column is selected")]
    NoDataColumn,
    #[error("Too many data points: {count} exceeds the limit of {limit} for {chart} charts. Apply a filter to reduce the data.")]
    TooManyPoints { count: usize, limit: usize, chart: ChartType },
}

/// Caller bugs; never caused by user data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum StateError {
    #[error("COUNT cannot be combined with other aggregations")]
    CountNotExclusive,
    #[error("text data columns only support COUNT")]
    CountRequired,
    #[error("a rendered chart requires a dataset")]
    DatasetMissing,
}
