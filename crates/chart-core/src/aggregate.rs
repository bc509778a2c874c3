// File: crates/chart-core/src/aggregate.rs
// Summary: Aggregation engine turning records + chart state into a plottable Dataset.
// Notes:
// - Modes: flat categories, hierarchy, grouped COUNT, grouped value aggregation,
//   individual values. The mode is picked from the chart type and selection.
// - Errors are returned; state flags (range, warning, down-sampled) are reset on every run.

use std::collections::HashSet;

use indexmap::IndexMap;
use tracing::{debug, warn};

use crate::chart::ChartType;
use crate::config::EngineConfig;
use crate::error::ShapeError;
use crate::series::{Dataset, HierarchyNode, Point, RecordId, Series, XValue};
use crate::state::{Aggregation, ChartState};
use crate::time::{format_time, parse_time, TimeUnit};
use crate::types::{cell, Column, DataType, Record, RecordSource, Value};

/// Turns cell values into labels and time buckets. Injected so shaping has no ambient
/// formatting dependencies.
pub trait LabelFormatter {
    /// Display label of a cell; `None` for null cells.
    fn label(&self, value: &Value, column: &Column) -> Option<String>;

    /// Epoch millis of a TIME cell, rounded down to the column's grouping unit.
    fn time_key(&self, value: &Value, column: &Column) -> Option<i64> {
        let t = parse_time(value)?;
        Some(column.group_unit().map_or(t, |u| u.truncate(t)))
    }
}

/// Default formatter: integral numbers without decimals, booleans as `true`/`false`,
/// time as the column's grouping unit label (or its format pattern).
#[derive(Clone, Copy, Debug, Default)]
pub struct PlainFormatter;

impl LabelFormatter for PlainFormatter {
    fn label(&self, value: &Value, column: &Column) -> Option<String> {
        if column.data_type() == DataType::Time {
            if let Some(t) = self.time_key(value, column) {
                return Some(time_label(t, column));
            }
        }
        match value {
            Value::Null => None,
            Value::Bool(b) => Some(b.to_string()),
            Value::Number(n) => Some(format_number(*n)),
            Value::Text(s) => Some(s.clone()),
        }
    }
}

fn time_label(millis: i64, column: &Column) -> String {
    if let Some(unit) = column.group_unit() {
        return unit.label(millis);
    }
    if let Some(text) = column.format().and_then(|f| format_time(millis, f)) {
        return text;
    }
    let unit = if TimeUnit::Day.truncate(millis) == millis { TimeUnit::Day } else { TimeUnit::Second };
    unit.label(millis)
}

/// `3.0` -> `"3"`, `2.5` -> `"2.5"`.
pub fn format_number(n: f64) -> String {
    if n.fract() == 0.0 && n.abs() < 1e15 { format!("{}", n as i64) } else { n.to_string() }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum ShapeMode {
    Hierarchical,
    Flat,
    GroupedCount,
    Aggregated,
    Individual,
}

impl ShapeMode {
    fn select(state: &ChartState) -> Self {
        if state.chart_type().is_hierarchical() {
            ShapeMode::Hierarchical
        } else if state.chart_type().is_single_series() || state.group_by_columns().is_empty() {
            ShapeMode::Flat
        } else if state.is_count() {
            ShapeMode::GroupedCount
        } else if !state.aggregations().is_empty() {
            ShapeMode::Aggregated
        } else {
            ShapeMode::Individual
        }
    }
}

/// Running totals for one (x, series) cell of a value aggregation.
#[derive(Clone, Copy, Debug)]
struct Accumulator {
    sum: f64,
    count: usize,
    min: f64,
    max: f64,
}

impl Accumulator {
    fn new() -> Self { Self { sum: 0.0, count: 0, min: f64::INFINITY, max: f64::NEG_INFINITY } }

    fn push(&mut self, v: f64) {
        self.sum += v;
        self.count += 1;
        self.min = self.min.min(v);
        self.max = self.max.max(v);
    }

    fn finish(&self, agg: Aggregation) -> f64 {
        match agg {
            Aggregation::Count => self.count as f64,
            Aggregation::Sum => self.sum,
            Aggregation::Average => if self.count == 0 { 0.0 } else { self.sum / self.count as f64 },
            Aggregation::Min => self.min,
            Aggregation::Max => self.max,
        }
    }
}

#[derive(Default)]
struct NodeBuilder {
    value: f64,
    children: IndexMap<String, NodeBuilder>,
}

impl NodeBuilder {
    fn build(self, label: String) -> HierarchyNode {
        HierarchyNode {
            label,
            value: self.value,
            children: self.children.into_iter().map(|(l, n)| n.build(l)).collect(),
        }
    }

    fn leaves(&self, path: &mut Vec<String>, out: &mut Vec<Point>) {
        for (label, child) in &self.children {
            path.push(label.clone());
            if child.children.is_empty() {
                out.push(Point::category(path.join(" / "), child.value));
            } else {
                child.leaves(path, out);
            }
            path.pop();
        }
    }
}

fn check_limit(count: usize, limit: Option<usize>, chart: ChartType) -> Result<(), ShapeError> {
    match limit {
        Some(limit) if count > limit => Err(ShapeError::TooManyPoints { count, limit, chart }),
        _ => Ok(()),
    }
}

pub struct AggregationEngine<F: LabelFormatter = PlainFormatter> {
    config: EngineConfig,
    formatter: F,
}

impl AggregationEngine<PlainFormatter> {
    pub fn new(config: EngineConfig) -> Self {
        Self { config, formatter: PlainFormatter }
    }
}

impl Default for AggregationEngine<PlainFormatter> {
    fn default() -> Self { Self::new(EngineConfig::default()) }
}

impl<F: LabelFormatter> AggregationEngine<F> {
    pub fn with_formatter(config: EngineConfig, formatter: F) -> Self {
        Self { config, formatter }
    }

    pub fn config(&self) -> &EngineConfig { &self.config }

    /// Shape `source` according to `state`. On success the state's value range, warning
    /// and down-sampled flag describe the new dataset; on error they are cleared.
    pub fn shape(&self, state: &mut ChartState, source: &RecordSource) -> Result<Dataset, ShapeError> {
        state.reset_shape_flags();
        let mode = ShapeMode::select(state);
        debug!(?mode, chart = %state.chart_type(), records = source.entries.len(), "shaping");

        let mut downsampled = false;
        let result = match mode {
            ShapeMode::Hierarchical => self.shape_hierarchy(state, source),
            ShapeMode::Flat => self.shape_flat(state, source),
            ShapeMode::GroupedCount => self.shape_grouped_count(state, source),
            ShapeMode::Aggregated => self.shape_aggregated(state, source),
            ShapeMode::Individual => self.shape_individual(state, source, &mut downsampled),
        };
        let dataset = match result {
            Ok(dataset) => dataset,
            Err(err) => {
                warn!(%err, ?mode, "shaping failed");
                return Err(err);
            }
        };

        let warning = downsampled.then(|| {
            format!(
                "Some series had more than {} points and were down-sampled",
                self.config.downsample_threshold
            )
        });
        state.record_shape(dataset.value_range(), warning);
        debug!(series = dataset.series.len(), points = dataset.point_count(), downsampled, "shaped");
        Ok(dataset)
    }

    /// Shape and store the result in `state`. The previous dataset is kept on error.
    pub fn refresh(&self, state: &mut ChartState, source: &RecordSource) -> Result<(), ShapeError> {
        let dataset = self.shape(state, source)?;
        state.set_dataset(Some(dataset));
        Ok(())
    }

    fn limit(&self, state: &ChartState) -> Option<usize> {
        self.config.limits.max_points(state.chart_type())
    }

    /// X value of a record: time columns give bucketed millis (labels on circular charts),
    /// numeric columns on continuous charts give numbers, everything else a category label.
    fn x_value(&self, record: &Record, column: &Column, chart: ChartType) -> Option<XValue> {
        let value = cell(record, column.name());
        match column.data_type() {
            DataType::Time if !chart.is_circular() => self.formatter.time_key(value, column).map(XValue::Time),
            DataType::Number if chart.is_continuous() => value.as_number().map(XValue::Number),
            _ => self.formatter.label(value, column).map(XValue::Category),
        }
    }

    fn shape_flat(&self, state: &ChartState, source: &RecordSource) -> Result<Dataset, ShapeError> {
        let chart = state.chart_type();
        let limit = self.limit(state);

        if state.is_count() {
            let data = state.data_columns().first().ok_or(ShapeError::NoDataColumn)?;
            let mut counts: IndexMap<String, f64> = IndexMap::new();
            for record in &source.entries {
                if let Some(label) = self.formatter.label(cell(record, data.name()), data) {
                    *counts.entry(label).or_insert(0.0) += 1.0;
                }
            }
            check_limit(counts.len(), limit, chart)?;
            let labels = counts.keys().cloned().collect();
            let points = counts.into_iter().map(|(label, n)| Point::category(label, n)).collect();
            let series = Series::with_points(data.name(), points).for_column(data.name());
            return Ok(Dataset::new(vec![series]).with_labels(labels));
        }

        let key_column = state.group_by_columns().first().ok_or(ShapeError::NameColumnUndefined)?;
        if state.data_columns().is_empty() {
            return Err(ShapeError::NoDataColumn);
        }

        if state.aggregations().is_empty() {
            // one point per record; keys must identify records
            let mut seen: HashSet<String> = HashSet::new();
            let mut labels = Vec::new();
            let mut series = state
                .data_columns()
                .iter()
                .map(|c| Series::new(c.name()).for_column(c.name()))
                .collect::<Vec<_>>();
            for (i, record) in source.entries.iter().enumerate() {
                let Some(key) = self.formatter.label(cell(record, key_column.name()), key_column) else { continue };
                if !seen.insert(key.clone()) {
                    return Err(ShapeError::NamesNotUnique);
                }
                check_limit(seen.len(), limit, chart)?;
                for (column, s) in state.data_columns().iter().zip(series.iter_mut()) {
                    if let Some(y) = cell(record, column.name()).as_number() {
                        s.points.push(Point::category(key.clone(), y).with_record(RecordId(i)));
                    }
                }
                labels.push(key);
            }
            return Ok(Dataset::new(series).with_labels(labels));
        }

        let mut cells: IndexMap<String, Vec<Accumulator>> = IndexMap::new();
        let columns = state.data_columns();
        for record in &source.entries {
            let Some(key) = self.formatter.label(cell(record, key_column.name()), key_column) else { continue };
            let accs = cells.entry(key).or_insert_with(|| vec![Accumulator::new(); columns.len()]);
            for (column, acc) in columns.iter().zip(accs.iter_mut()) {
                if let Some(y) = cell(record, column.name()).as_number() {
                    acc.push(y);
                }
            }
        }
        check_limit(cells.len(), limit, chart)?;
        let labels = cells.keys().cloned().collect();
        let mut series = Vec::new();
        for (ci, column) in columns.iter().enumerate() {
            for &agg in state.aggregations() {
                let points = cells
                    .iter()
                    .filter(|(_, accs)| accs[ci].count > 0)
                    .map(|(key, accs)| Point::category(key.clone(), accs[ci].finish(agg)))
                    .collect();
                series.push(Series::with_points(series_name(agg, column), points).for_column(column.name()));
            }
        }
        Ok(Dataset::new(series).with_labels(labels))
    }

    fn shape_hierarchy(&self, state: &ChartState, source: &RecordSource) -> Result<Dataset, ShapeError> {
        let levels = state
            .group_by_columns()
            .iter()
            .chain(state.data_columns().first())
            .collect::<Vec<_>>();
        if state.data_columns().is_empty() {
            return Err(ShapeError::NoDataColumn);
        }

        let mut root = NodeBuilder::default();
        'records: for record in &source.entries {
            let mut path = Vec::with_capacity(levels.len());
            for column in &levels {
                match self.formatter.label(cell(record, column.name()), column) {
                    Some(label) => path.push(label),
                    None => continue 'records,
                }
            }
            root.value += 1.0;
            let mut node = &mut root;
            for label in path {
                node = node.children.entry(label).or_default();
                node.value += 1.0;
            }
        }

        let mut leaves = Vec::new();
        root.leaves(&mut Vec::new(), &mut leaves);
        check_limit(leaves.len(), self.limit(state), state.chart_type())?;

        let labels = leaves
            .iter()
            .map(|p| match &p.x {
                XValue::Category(s) => s.clone(),
                other => other.key(),
            })
            .collect();
        let hierarchy = root.children.into_iter().map(|(l, n)| n.build(l)).collect();
        let mut dataset = Dataset::new(vec![Series::with_points("count", leaves)]).with_labels(labels);
        dataset.hierarchy = hierarchy;
        Ok(dataset)
    }

    fn shape_grouped_count(&self, state: &ChartState, source: &RecordSource) -> Result<Dataset, ShapeError> {
        let chart = state.chart_type();
        let group = state.group_by_columns().first().ok_or(ShapeError::GroupByUndefined)?;
        let data = state.data_columns().first().ok_or(ShapeError::NoDataColumn)?;
        let limit = self.limit(state);

        let mut series: IndexMap<String, IndexMap<String, (XValue, f64)>> = IndexMap::new();
        let mut xs: HashSet<String> = HashSet::new();
        for record in &source.entries {
            let Some(name) = self.formatter.label(cell(record, data.name()), data) else { continue };
            let Some(x) = self.x_value(record, group, chart) else { continue };
            let key = x.key();
            xs.insert(key.clone());
            let entry = series.entry(name).or_default().entry(key).or_insert((x, 0.0));
            entry.1 += 1.0;
        }
        check_limit(xs.len(), limit, chart)?;
        check_limit(series.len(), limit, chart)?;

        let series = series
            .into_iter()
            .map(|(name, cells)| {
                let mut s = Series::with_points(name, cells.into_values().map(|(x, n)| Point::new(x, n)).collect());
                s.sort_by_x();
                s
            })
            .collect::<Vec<_>>();
        Ok(with_category_labels(Dataset::new(series)))
    }

    fn shape_aggregated(&self, state: &ChartState, source: &RecordSource) -> Result<Dataset, ShapeError> {
        let chart = state.chart_type();
        let group = state.group_by_columns().first().ok_or(ShapeError::GroupByUndefined)?;
        let columns = state.data_columns();
        if columns.is_empty() {
            return Err(ShapeError::NoDataColumn);
        }

        let mut cells: IndexMap<String, (XValue, Vec<Accumulator>)> = IndexMap::new();
        for record in &source.entries {
            let Some(x) = self.x_value(record, group, chart) else { continue };
            let (_, accs) = cells
                .entry(x.key())
                .or_insert_with(|| (x, vec![Accumulator::new(); columns.len()]));
            for (column, acc) in columns.iter().zip(accs.iter_mut()) {
                if let Some(y) = cell(record, column.name()).as_number() {
                    acc.push(y);
                }
            }
        }
        check_limit(cells.len(), self.limit(state), chart)?;

        let mut series = Vec::new();
        for (ci, column) in columns.iter().enumerate() {
            for &agg in state.aggregations() {
                let points = cells
                    .values()
                    .filter(|(_, accs)| accs[ci].count > 0)
                    .map(|(x, accs)| Point::new(x.clone(), accs[ci].finish(agg)))
                    .collect();
                let mut s = Series::with_points(series_name(agg, column), points).for_column(column.name());
                s.sort_by_x();
                series.push(s);
            }
        }
        Ok(with_category_labels(Dataset::new(series)))
    }

    fn shape_individual(
        &self,
        state: &ChartState,
        source: &RecordSource,
        downsampled: &mut bool,
    ) -> Result<Dataset, ShapeError> {
        let chart = state.chart_type();
        let group = state.group_by_columns().first().ok_or(ShapeError::GroupByUndefined)?;
        let limit = self.limit(state);
        let threshold = self.config.downsample_threshold;

        let mut out = Vec::new();
        for column in state.data_columns() {
            let mut parts: IndexMap<String, (HashSet<String>, Vec<Point>)> = IndexMap::new();
            for (i, record) in source.entries.iter().enumerate() {
                let Some(x) = self.x_value(record, group, chart) else { continue };
                let Some(y) = cell(record, column.name()).as_number() else { continue };
                let split = self.split_label(record, state.split_columns());
                let (xs, points) = parts.entry(split).or_default();
                xs.insert(x.key());
                check_limit(xs.len(), limit, chart)?;
                points.push(Point::new(x, y).with_record(RecordId(i)));
            }
            for (split, (_, points)) in parts {
                let name = if split.is_empty() { column.name().to_string() } else { format!("{} ({split})", column.name()) };
                let mut s = Series::with_points(name, points).for_column(column.name());
                s.sort_by_x();
                if s.len() > threshold {
                    warn!(series = %s.name, points = s.len(), threshold, "down-sampling series");
                    s = s.downsample_lttb(threshold);
                    *downsampled = true;
                }
                out.push(s);
            }
        }
        Ok(with_category_labels(Dataset::new(out)))
    }

    /// Joined split-column labels; empty when no split columns are set.
    fn split_label(&self, record: &Record, splits: &[Column]) -> String {
        splits
            .iter()
            .map(|c| self.formatter.label(cell(record, c.name()), c).unwrap_or_else(|| "(empty)".to_string()))
            .collect::<Vec<_>>()
            .join(", ")
    }
}

fn series_name(agg: Aggregation, column: &Column) -> String {
    format!("{} of {}", agg.label(), column.name())
}

/// Attach the union of category x values (first-seen order) as dataset labels.
fn with_category_labels(dataset: Dataset) -> Dataset {
    let all_categories = dataset
        .series
        .iter()
        .flat_map(|s| &s.points)
        .all(|p| matches!(p.x, XValue::Category(_)));
    if !all_categories {
        return dataset;
    }
    let mut seen = HashSet::new();
    let mut labels = Vec::new();
    for point in dataset.series.iter().flat_map(|s| &s.points) {
        if let XValue::Category(label) = &point.x {
            if seen.insert(label.clone()) {
                labels.push(label.clone());
            }
        }
    }
    if labels.is_empty() { dataset } else { dataset.with_labels(labels) }
}
