// File: crates/chart-core/src/range.rs
// Summary: Min/max value ranges and their union over series.

use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ValueRange {
    pub min: f64,
    pub max: f64,
}

impl ValueRange {
    pub fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    /// Range of the finite values in `values`; `None` when there are none.
    pub fn of<I: IntoIterator<Item = f64>>(values: I) -> Option<Self> {
        let mut min = f64::INFINITY;
        let mut max = f64::NEG_INFINITY;
        for v in values.into_iter().filter(|v| v.is_finite()) {
            min = min.min(v);
            max = max.max(v);
        }
        if min.is_finite() && max.is_finite() { Some(Self { min, max }) } else { None }
    }

    pub fn union(self, other: ValueRange) -> Self {
        Self { min: self.min.min(other.min), max: self.max.max(other.max) }
    }

    /// Union of every range; `None` for an empty input.
    pub fn union_all<I: IntoIterator<Item = ValueRange>>(ranges: I) -> Option<Self> {
        ranges.into_iter().reduce(ValueRange::union)
    }

    pub fn span(&self) -> f64 { self.max - self.min }
}
