// File: crates/chart-core/src/configure.rs
// Summary: Axis configurator: computes legend, interaction and axis render options from state + dataset.
// Notes:
// - Circular charts hide both axes; horizontal bars swap the category and value roles.
// - Multi-axis adds one value axis per extra data column, alternating sides, and links
//   each series to its axis so legend clicks hide both together.

use serde::Serialize;
use tracing::debug;

use crate::axis::{AxisKind, AxisOptions, AxisPosition, TickFormat};
use crate::chart::ChartType;
use crate::config::EngineConfig;
use crate::force_y;
use crate::range::ValueRange;
use crate::scale::{ScaleConfig, Ticks};
use crate::series::{Dataset, Series, XValue};
use crate::state::{ChartState, LegendPosition};
use crate::time::TimeUnit;
use crate::types::{Column, Insets};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum InteractionMode {
    /// Tooltip shows the point nearest the pointer.
    Nearest,
    /// Tooltip shows every series at the hovered index.
    Index,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct LegendOptions {
    pub display: bool,
    pub position: LegendPosition,
}

/// Series whose legend entry also toggles a value axis.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct LegendLink {
    pub series: usize,
    pub axis: String,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct RenderOptions {
    pub chart_type: ChartType,
    pub margin: Insets,
    pub legend: LegendOptions,
    pub interaction: InteractionMode,
    pub axes: Vec<AxisOptions>,
    /// Value axis id per series (`None` for circular charts).
    pub series_axes: Vec<Option<String>>,
    pub series_hidden: Vec<bool>,
    pub legend_links: Vec<LegendLink>,
    pub stacked: bool,
    pub percent: bool,
}

impl RenderOptions {
    pub fn axis(&self, id: &str) -> Option<&AxisOptions> {
        self.axes.iter().find(|a| a.id == id)
    }

    pub fn value_axes(&self) -> impl Iterator<Item = &AxisOptions> {
        self.axes.iter().filter(|a| a.value_axis)
    }

    /// Legend click: flip the series' visibility. A linked axis stays visible while any
    /// series drawn against it is visible. Returns the new hidden state.
    pub fn toggle_series(&mut self, index: usize) -> Option<bool> {
        let hidden = self.series_hidden.get_mut(index)?;
        *hidden = !*hidden;
        let now_hidden = *hidden;
        let linked = self.legend_links.iter().find(|l| l.series == index).map(|l| l.axis.clone());
        if let Some(axis_id) = linked {
            let any_visible = self
                .legend_links
                .iter()
                .filter(|l| l.axis == axis_id)
                .any(|l| !self.series_hidden.get(l.series).copied().unwrap_or(true));
            if let Some(axis) = self.axes.iter_mut().find(|a| a.id == axis_id) {
                axis.display = any_visible;
            }
        }
        Some(now_hidden)
    }
}

#[derive(Clone, Debug, Default)]
pub struct AxisConfigurator {
    config: EngineConfig,
}

impl AxisConfigurator {
    pub fn new(config: EngineConfig) -> Self { Self { config } }

    /// Render options for the state's current dataset (an empty one if none was shaped).
    pub fn configure(&self, state: &ChartState) -> RenderOptions {
        let empty = Dataset::default();
        let dataset = state.dataset().unwrap_or(&empty);
        let chart = state.chart_type();

        let mut options = RenderOptions {
            chart_type: chart,
            margin: state.margin(),
            legend: self.legend(state, dataset),
            interaction: interaction_mode(&dataset.series),
            axes: Vec::new(),
            series_axes: Vec::new(),
            series_hidden: vec![false; dataset.series.len()],
            legend_links: Vec::new(),
            stacked: state.stacked(),
            percent: state.value_as_percent(),
        };

        if chart.is_circular() {
            options.axes = vec![AxisOptions::hidden("x", AxisPosition::Bottom), AxisOptions::hidden("y", AxisPosition::Left)];
            options.series_axes = vec![None; dataset.series.len()];
            debug!(chart = %chart, "circular chart: axes hidden");
            return options;
        }

        let horizontal = chart.is_horizontal();
        let (category_id, value_id) = if horizontal { ("y", "x") } else { ("x", "y") };
        let (category_side, value_side) =
            if horizontal { (AxisPosition::Left, AxisPosition::Bottom) } else { (AxisPosition::Bottom, AxisPosition::Left) };

        options.axes.push(self.category_axis(state, dataset, category_id, category_side));

        let multi = state.multi_value_axes() && state.data_columns().len() > 1;
        let value_columns: Vec<Option<&Column>> =
            if multi { state.data_columns().iter().map(Some).collect() } else { vec![state.data_columns().first()] };
        let value_ids = (0..value_columns.len())
            .map(|i| if i == 0 { value_id.to_string() } else { format!("{value_id}{i}") })
            .collect::<Vec<_>>();

        for (i, column) in value_columns.iter().enumerate() {
            let side = if i % 2 == 1 { value_side.opposite() } else { value_side };
            let range = if multi {
                column.and_then(|c| column_range(dataset, c.name()))
            } else {
                state.value_range().or_else(|| dataset.value_range())
            };
            let scale = state.scales().get(i);
            let title = if multi || state.data_columns().len() == 1 { column.map(|c| c.name().to_string()) } else { None };
            options.axes.push(self.value_axis(state, &value_ids[i], side, range, scale, title));
        }

        for (si, series) in dataset.series.iter().enumerate() {
            let axis_index = if multi {
                series
                    .column
                    .as_deref()
                    .and_then(|name| state.data_columns().iter().position(|c| c.name() == name))
                    .unwrap_or(0)
            } else {
                0
            };
            let axis_id = value_ids[axis_index].clone();
            if multi {
                options.legend_links.push(LegendLink { series: si, axis: axis_id.clone() });
            }
            options.series_axes.push(Some(axis_id));
        }

        debug!(chart = %chart, axes = options.axes.len(), multi, "configured axes");
        options
    }

    fn legend(&self, state: &ChartState, dataset: &Dataset) -> LegendOptions {
        let chart = state.chart_type();
        let items = if chart.is_single_series() || (chart.is_circular() && dataset.series.len() == 1) {
            dataset
                .labels
                .as_ref()
                .map(Vec::len)
                .unwrap_or_else(|| dataset.series.first().map_or(0, Series::len))
        } else {
            dataset.series.len()
        };
        let display = state.legend().visible
            && !self.config.legend_excluded.contains(&chart)
            && items <= self.config.legend_item_ceiling;
        LegendOptions { display, position: state.legend().position }
    }

    fn category_axis(&self, state: &ChartState, dataset: &Dataset, id: &str, side: AxisPosition) -> AxisOptions {
        let column = state.group_by_columns().first().or_else(|| state.data_columns().first());
        let kind = match dataset.first_x() {
            Some(XValue::Time(_)) => AxisKind::Time { unit: self.time_unit(column, dataset.time_span()) },
            Some(XValue::Number(_)) => AxisKind::Linear,
            _ => AxisKind::Category,
        };
        let mut axis = AxisOptions::new(id, kind, side);
        axis.title = column.map(|c| c.name().to_string());
        axis.stacked = state.stacked();
        axis
    }

    fn value_axis(
        &self,
        state: &ChartState,
        id: &str,
        side: AxisPosition,
        range: Option<ValueRange>,
        scale: Option<&ScaleConfig>,
        title: Option<String>,
    ) -> AxisOptions {
        let chart = state.chart_type();
        let mut axis = AxisOptions::value(id, side);
        axis.title = title;
        axis.stacked = state.stacked();
        axis.ticks = scale.map(|s| s.ticks.clone()).unwrap_or_else(Ticks::default);
        if state.value_as_percent() {
            axis.min = Some(0.0);
            axis.max = Some(100.0);
            axis.tick_format = TickFormat::Percent;
        } else if chart.is_continuous() && !chart.is_bar_like() && !state.stacked() {
            if let Some(force) = range.and_then(force_y::compute) {
                axis.apply_force_y(force);
            }
        }
        axis
    }

    /// Coarsest of the column's format unit, its grouping unit and the unit giving at
    /// least `min_time_ticks` ticks over the data span.
    pub fn time_unit(&self, column: Option<&Column>, span_millis: Option<f64>) -> TimeUnit {
        let from_format = column.and_then(|c| c.format()).and_then(TimeUnit::from_format);
        let from_grouping = column.and_then(Column::group_unit);
        let from_span = span_millis.filter(|s| *s > 0.0).map(|s| TimeUnit::for_span(s, self.config.min_time_ticks));
        [from_format, from_grouping, from_span]
            .into_iter()
            .flatten()
            .max()
            .unwrap_or(TimeUnit::Day)
    }
}

/// Nearest for a single series; index-aligned when every series has the same ordered x list.
pub fn interaction_mode(series: &[Series]) -> InteractionMode {
    let Some((first, rest)) = series.split_first() else { return InteractionMode::Nearest };
    if rest.is_empty() {
        return InteractionMode::Nearest;
    }
    let aligned = rest.iter().all(|s| {
        s.points.len() == first.points.len() && s.points.iter().zip(&first.points).all(|(a, b)| a.x == b.x)
    });
    if aligned { InteractionMode::Index } else { InteractionMode::Nearest }
}

fn column_range(dataset: &Dataset, column: &str) -> Option<ValueRange> {
    ValueRange::union_all(
        dataset
            .series
            .iter()
            .filter(|s| s.column.as_deref() == Some(column))
            .filter_map(Series::y_range),
    )
}
