// File: crates/chart-core/src/types.rs
// Summary: Shared types for tabular input (values, records, columns) and plot margins.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::time::TimeUnit;

/// A single cell of a record. Records are heterogeneous, so any column may hold any variant.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    Null,
    Bool(bool),
    Number(f64),
    Text(String),
}

impl Value {
    /// Numeric view of the cell; only finite numbers qualify.
    pub fn as_number(&self) -> Option<f64> {
        match *self {
            Value::Number(n) if n.is_finite() => Some(n),
            _ => None,
        }
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self { Value::Number(v) }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self { Value::Number(v as f64) }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self { Value::Bool(v) }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self { Value::Text(v.to_string()) }
}

impl From<String> for Value {
    fn from(v: String) -> Self { Value::Text(v) }
}

/// One input row: column name -> value. Missing keys read as `Value::Null`.
pub type Record = IndexMap<String, Value>;

static NULL: Value = Value::Null;

/// Look up a cell, treating an absent key as null.
pub fn cell<'a>(record: &'a Record, column: &str) -> &'a Value {
    record.get(column).unwrap_or(&NULL)
}

/// Build a record from `(name, value)` pairs.
pub fn record<K, V, I>(cells: I) -> Record
where
    K: Into<String>,
    V: Into<Value>,
    I: IntoIterator<Item = (K, V)>,
{
    cells.into_iter().map(|(k, v)| (k.into(), v.into())).collect()
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum DataType {
    Text,
    Number,
    Time,
    Boolean,
}

/// Column descriptor. Immutable once created; build it with the `with_*` helpers.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Column {
    name: String,
    data_type: DataType,
    width: u32,
    format: Option<String>,
    group_unit: Option<TimeUnit>,
}

impl Column {
    pub fn new(name: impl Into<String>, data_type: DataType) -> Self {
        Self { name: name.into(), data_type, width: 100, format: None, group_unit: None }
    }

    pub fn text(name: impl Into<String>) -> Self { Self::new(name, DataType::Text) }
    pub fn number(name: impl Into<String>) -> Self { Self::new(name, DataType::Number) }
    pub fn time(name: impl Into<String>) -> Self { Self::new(name, DataType::Time) }
    pub fn boolean(name: impl Into<String>) -> Self { Self::new(name, DataType::Boolean) }

    pub fn with_width(mut self, width: u32) -> Self {
        self.width = width;
        self
    }

    /// Display format. For TIME columns this is a strftime pattern (e.g. `%Y-%m`).
    pub fn with_format(mut self, format: impl Into<String>) -> Self {
        self.format = Some(format.into());
        self
    }

    /// Granularity used when grouping TIME values.
    pub fn with_group_unit(mut self, unit: TimeUnit) -> Self {
        self.group_unit = Some(unit);
        self
    }

    pub fn name(&self) -> &str { &self.name }
    pub fn data_type(&self) -> DataType { self.data_type }
    pub fn width(&self) -> u32 { self.width }
    pub fn format(&self) -> Option<&str> { self.format.as_deref() }
    pub fn group_unit(&self) -> Option<TimeUnit> { self.group_unit }

    pub fn is_numeric(&self) -> bool { self.data_type == DataType::Number }
    pub fn is_time(&self) -> bool { self.data_type == DataType::Time }
}

/// Name equality over two column lists (order-sensitive).
pub fn same_columns(a: &[Column], b: &[Column]) -> bool {
    a.len() == b.len() && a.iter().zip(b).all(|(x, y)| x.name == y.name)
}

/// Name membership test used for every "is this column selected" check.
pub fn contains_column(columns: &[Column], name: &str) -> bool {
    columns.iter().any(|c| c.name == name)
}

/// Records plus the columns describing them, as supplied by the host.
#[derive(Clone, Debug, Default)]
pub struct RecordSource {
    pub entries: Vec<Record>,
    pub columns: Vec<Column>,
}

impl RecordSource {
    pub fn new(entries: Vec<Record>, columns: Vec<Column>) -> Self {
        Self { entries, columns }
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }
}

/// Chart margins, in pixels.
/// Contract: all fields are non-negative.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Insets {
    pub left: u32,
    pub right: u32,
    pub top: u32,
    pub bottom: u32,
}

impl Insets {
    /// Create new insets (non-negative by type).
    pub const fn new(left: u32, right: u32, top: u32, bottom: u32) -> Self {
        Self { left, right, top, bottom }
    }
    pub const fn uniform(v: u32) -> Self { Self::new(v, v, v, v) }
}

impl Default for Insets {
    fn default() -> Self {
        Self::uniform(10)
    }
}
