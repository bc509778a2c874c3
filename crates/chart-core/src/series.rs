// File: crates/chart-core/src/series.rs
// Summary: Plottable dataset model: labels, series of points, optional hierarchy.

use std::cmp::Ordering;

use serde::Serialize;

use crate::downsample::lttb_indices;
use crate::range::ValueRange;

/// X coordinate of a point.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(untagged)]
pub enum XValue {
    Number(f64),
    /// UTC epoch milliseconds.
    Time(i64),
    Category(String),
}

impl XValue {
    /// Numeric position, if the value has one.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            XValue::Number(n) => Some(*n),
            XValue::Time(t) => Some(*t as f64),
            XValue::Category(_) => None,
        }
    }

    pub fn is_time(&self) -> bool { matches!(self, XValue::Time(_)) }

    /// Key used for distinct counting and merging.
    pub fn key(&self) -> String {
        match self {
            XValue::Number(n) => n.to_string(),
            XValue::Time(t) => t.to_string(),
            XValue::Category(s) => s.clone(),
        }
    }

    fn order(&self, other: &XValue) -> Ordering {
        match (self.as_f64(), other.as_f64()) {
            (Some(a), Some(b)) => a.total_cmp(&b),
            _ => Ordering::Equal,
        }
    }
}

/// Index of the source record a point came from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub struct RecordId(pub usize);

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Point {
    pub x: XValue,
    pub y: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub record: Option<RecordId>,
}

impl Point {
    pub fn new(x: XValue, y: f64) -> Self { Self { x, y, record: None } }

    pub fn category(label: impl Into<String>, y: f64) -> Self { Self::new(XValue::Category(label.into()), y) }

    pub fn with_record(mut self, record: RecordId) -> Self {
        self.record = Some(record);
        self
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Series {
    pub name: String,
    /// Data column the series plots, when it maps to exactly one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub column: Option<String>,
    pub points: Vec<Point>,
}

impl Series {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into(), column: None, points: Vec::new() }
    }

    pub fn with_points(name: impl Into<String>, points: Vec<Point>) -> Self {
        Self { name: name.into(), column: None, points }
    }

    pub fn for_column(mut self, column: impl Into<String>) -> Self {
        self.column = Some(column.into());
        self
    }

    pub fn len(&self) -> usize { self.points.len() }
    pub fn is_empty(&self) -> bool { self.points.is_empty() }

    pub fn y_range(&self) -> Option<ValueRange> {
        ValueRange::of(self.points.iter().map(|p| p.y))
    }

    /// Stable ascending sort on numeric/temporal x; categories keep their order.
    pub fn sort_by_x(&mut self) {
        self.points.sort_by(|a, b| a.x.order(&b.x));
    }

    /// Downsample with LTTB to at most `max_points`. Category x uses the point position.
    pub fn downsample_lttb(&self, max_points: usize) -> Self {
        if self.points.len() <= max_points || max_points < 2 {
            return self.clone();
        }
        let xy = self
            .points
            .iter()
            .enumerate()
            .map(|(i, p)| (p.x.as_f64().unwrap_or(i as f64), p.y))
            .collect::<Vec<_>>();
        let points = lttb_indices(&xy, max_points).into_iter().map(|i| self.points[i].clone()).collect();
        Series { name: self.name.clone(), column: self.column.clone(), points }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct HierarchyNode {
    pub label: String,
    /// Record count of every leaf below (or at) this node.
    pub value: f64,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<HierarchyNode>,
}

impl HierarchyNode {
    pub fn leaf_count(&self) -> usize {
        if self.children.is_empty() { 1 } else { self.children.iter().map(HierarchyNode::leaf_count).sum() }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct Dataset {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub labels: Option<Vec<String>>,
    pub series: Vec<Series>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub hierarchy: Vec<HierarchyNode>,
}

impl Dataset {
    pub fn new(series: Vec<Series>) -> Self {
        Self { labels: None, series, hierarchy: Vec::new() }
    }

    pub fn with_labels(mut self, labels: Vec<String>) -> Self {
        self.labels = Some(labels);
        self
    }

    /// Union of every series' y range.
    pub fn value_range(&self) -> Option<ValueRange> {
        ValueRange::union_all(self.series.iter().filter_map(Series::y_range))
    }

    /// Span of temporal x values across all series, in milliseconds.
    pub fn time_span(&self) -> Option<f64> {
        let times = self.series.iter().flat_map(|s| s.points.iter()).filter_map(|p| match p.x {
            XValue::Time(t) => Some(t as f64),
            _ => None,
        });
        ValueRange::of(times).map(|r| r.span())
    }

    /// Variant of the first x value, used to classify the category axis.
    pub fn first_x(&self) -> Option<&XValue> {
        self.series.iter().flat_map(|s| s.points.first()).next().map(|p| &p.x)
    }

    pub fn point_count(&self) -> usize { self.series.iter().map(Series::len).sum() }
}
