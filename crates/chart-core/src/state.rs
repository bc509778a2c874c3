// File: crates/chart-core/src/state.rs
// Summary: ChartState, the single source of truth for what a chart element shows, with change notifications.
// Notes:
// - Every mutation reports one ChangeKind to subscribers, synchronously.
// - Column "selected / in use" checks compare by name, never by identity.

use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::chart::ChartType;
use crate::error::StateError;
use crate::range::ValueRange;
use crate::scale::{ScaleConfig, ScaleConfigStore};
use crate::series::Dataset;
use crate::types::{contains_column, same_columns, Column, DataType, Insets};

/// What a mutation invalidated.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ChangeKind {
    /// Styling only; the dataset stays valid.
    Look,
    /// Element resized; the dataset stays valid.
    Size,
    /// Columns, aggregation or chart type changed; the dataset must be rebuilt.
    Structure,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Aggregation {
    Count,
    Sum,
    Average,
    Min,
    Max,
}

impl Aggregation {
    pub fn label(self) -> &'static str {
        match self {
            Aggregation::Count => "Count",
            Aggregation::Sum => "Sum",
            Aggregation::Average => "Average",
            Aggregation::Min => "Min",
            Aggregation::Max => "Max",
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LegendPosition {
    #[default]
    Top,
    Bottom,
    Left,
    Right,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Legend {
    pub visible: bool,
    pub position: LegendPosition,
}

impl Default for Legend {
    fn default() -> Self { Self { visible: true, position: LegendPosition::Top } }
}

/// Opaque reference to whatever the renderer drew.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct RenderHandle(pub u64);

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u32);

type Subscriber = Box<dyn FnMut(ChangeKind)>;

/// Durable part of a ChartState, for the persistence collaborator.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PersistedChart {
    pub chart_type: ChartType,
    pub margin: Insets,
    pub legend: Legend,
    #[serde(default)]
    pub stacked: bool,
    #[serde(default)]
    pub multi_value_axes: bool,
    #[serde(default)]
    pub value_as_percent: bool,
    #[serde(default)]
    pub scales: Vec<ScaleConfig>,
}

pub struct ChartState {
    chart_type: ChartType,
    margin: Insets,
    legend: Legend,
    value_as_percent: bool,
    size: (u32, u32),
    available: Vec<Column>,
    data_columns: Vec<Column>,
    group_by_columns: Vec<Column>,
    split_columns: Vec<Column>,
    aggregations: Vec<Aggregation>,
    scales: Vec<ScaleConfig>,
    scale_store: ScaleConfigStore,
    stacked: bool,
    multi_value_axes: bool,

    // transient, owned by the shaping pipeline
    dataset: Option<Dataset>,
    value_range: Option<ValueRange>,
    downsampled: bool,
    warning: Option<String>,
    rendered: Option<RenderHandle>,

    subscribers: Vec<(SubscriptionId, Subscriber)>,
    next_subscription: u32,
    suppressed: u32,
}

impl ChartState {
    /// New state for one chart element over the columns the record source offers.
    pub fn new(chart_type: ChartType, available: Vec<Column>) -> Self {
        let mut state = Self {
            chart_type,
            margin: Insets::default(),
            legend: Legend::default(),
            value_as_percent: false,
            size: (0, 0),
            available,
            data_columns: Vec::new(),
            group_by_columns: Vec::new(),
            split_columns: Vec::new(),
            aggregations: Vec::new(),
            scales: Vec::new(),
            scale_store: ScaleConfigStore::new(),
            stacked: false,
            multi_value_axes: false,
            dataset: None,
            value_range: None,
            downsampled: false,
            warning: None,
            rendered: None,
            subscribers: Vec::new(),
            next_subscription: 0,
            suppressed: 0,
        };
        state.sync_scales();
        state
    }

    // ---- accessors ---------------------------------------------------------

    pub fn chart_type(&self) -> ChartType { self.chart_type }
    pub fn margin(&self) -> Insets { self.margin }
    pub fn legend(&self) -> Legend { self.legend }
    pub fn value_as_percent(&self) -> bool { self.value_as_percent }
    pub fn size(&self) -> (u32, u32) { self.size }
    pub fn available_columns(&self) -> &[Column] { &self.available }
    pub fn data_columns(&self) -> &[Column] { &self.data_columns }
    pub fn group_by_columns(&self) -> &[Column] { &self.group_by_columns }
    pub fn split_columns(&self) -> &[Column] { &self.split_columns }
    pub fn aggregations(&self) -> &[Aggregation] { &self.aggregations }
    pub fn scales(&self) -> &[ScaleConfig] { &self.scales }
    pub fn stacked(&self) -> bool { self.stacked }
    pub fn multi_value_axes(&self) -> bool { self.multi_value_axes }
    pub fn dataset(&self) -> Option<&Dataset> { self.dataset.as_ref() }
    pub fn value_range(&self) -> Option<ValueRange> { self.value_range }
    pub fn downsampled(&self) -> bool { self.downsampled }
    pub fn warning(&self) -> Option<&str> { self.warning.as_deref() }
    pub fn rendered(&self) -> Option<RenderHandle> { self.rendered }

    pub fn is_count(&self) -> bool { self.aggregations == [Aggregation::Count] }

    /// True if a column with this name is a data, group-by or split column.
    pub fn is_column_in_use(&self, name: &str) -> bool {
        contains_column(&self.data_columns, name)
            || contains_column(&self.group_by_columns, name)
            || contains_column(&self.split_columns, name)
    }

    fn has_non_numeric_data(&self) -> bool {
        self.data_columns.iter().any(|c| !c.is_numeric())
    }

    // ---- subscriptions -----------------------------------------------------

    /// Register a handler called synchronously after each mutation.
    pub fn subscribe<F: FnMut(ChangeKind) + 'static>(&mut self, handler: F) -> SubscriptionId {
        let id = SubscriptionId(self.next_subscription);
        self.next_subscription = self.next_subscription.wrapping_add(1);
        self.subscribers.push((id, Box::new(handler)));
        id
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.subscribers.len();
        self.subscribers.retain(|(sid, _)| *sid != id);
        self.subscribers.len() != before
    }

    /// Run a bulk edit with delivery suppressed. Nested scopes are fine; delivery resumes
    /// when the outermost scope returns. Nothing is replayed afterwards.
    pub fn suppress_notifications<R>(&mut self, scope: impl FnOnce(&mut Self) -> R) -> R {
        self.suppressed += 1;
        let out = scope(self);
        self.suppressed -= 1;
        out
    }

    fn notify(&mut self, kind: ChangeKind) {
        if self.suppressed > 0 {
            trace!(?kind, "change notification suppressed");
            return;
        }
        trace!(?kind, subscribers = self.subscribers.len(), "change notification");
        for (_, handler) in self.subscribers.iter_mut() {
            handler(kind);
        }
    }

    // ---- structure ---------------------------------------------------------

    /// Replace the data columns. Any non-numeric column forces COUNT and drops the group-by;
    /// an all-numeric selection infers a group-by when none is set. Re-setting the same
    /// columns (by name) is a no-op.
    pub fn set_data_columns(&mut self, columns: Vec<Column>) {
        if same_columns(&self.data_columns, &columns) { return; }
        self.data_columns = columns;
        if self.has_non_numeric_data() {
            self.aggregations = vec![Aggregation::Count];
            self.group_by_columns.clear();
        } else if self.group_by_columns.is_empty() {
            self.infer_group_by();
        }
        self.sync_scales();
        self.notify(ChangeKind::Structure);
    }

    /// Set the aggregation selection. Empty means individual values, which text data
    /// columns cannot show; an empty selection over them keeps COUNT.
    pub fn set_aggregations(&mut self, aggregations: Vec<Aggregation>) -> Result<(), StateError> {
        if aggregations.contains(&Aggregation::Count) && aggregations.iter().any(|a| *a != Aggregation::Count) {
            return Err(StateError::CountNotExclusive);
        }
        if self.has_non_numeric_data() && aggregations.iter().any(|a| *a != Aggregation::Count) {
            return Err(StateError::CountRequired);
        }
        let mut unique = Vec::with_capacity(aggregations.len());
        for agg in aggregations {
            if !unique.contains(&agg) { unique.push(agg); }
        }
        if unique.is_empty() && self.has_non_numeric_data() {
            unique.push(Aggregation::Count);
        }
        self.aggregations = unique;
        if self.is_count() && self.has_non_numeric_data() {
            self.group_by_columns.clear();
        } else if self.group_by_columns.is_empty() {
            self.infer_group_by();
        }
        self.notify(ChangeKind::Structure);
        Ok(())
    }

    pub fn set_group_by_columns(&mut self, columns: Vec<Column>) {
        self.group_by_columns = columns;
        self.notify(ChangeKind::Structure);
    }

    /// Split columns partition series further; any split turns multi-axis off.
    pub fn set_split_columns(&mut self, columns: Vec<Column>) {
        self.split_columns = columns;
        if !self.split_columns.is_empty() && self.multi_value_axes {
            self.multi_value_axes = false;
            self.sync_scales();
        }
        self.notify(ChangeKind::Structure);
    }

    pub fn set_chart_type(&mut self, chart_type: ChartType) {
        if self.chart_type == chart_type { return; }
        self.chart_type = chart_type;
        if !chart_type.supports_stacking() {
            self.stacked = false;
        }
        self.notify(ChangeKind::Structure);
    }

    /// On: one ScaleConfig per data column and stacking off. Off: one shared ScaleConfig.
    /// Stays off while split columns are set.
    pub fn toggle_multi_value_axes(&mut self, on: bool) {
        self.multi_value_axes = on && self.split_columns.is_empty();
        if self.multi_value_axes {
            self.stacked = false;
        }
        self.sync_scales();
        self.notify(ChangeKind::Structure);
    }

    /// Pick the first unselected column that can label an x axis, preferring non-numeric ones.
    fn infer_group_by(&mut self) {
        if self.data_columns.is_empty() { return; }
        let unused = |c: &&Column| !contains_column(&self.data_columns, c.name());
        let pick = self
            .available
            .iter()
            .filter(|c| unused(c))
            .find(|c| c.data_type() != DataType::Number)
            .or_else(|| self.available.iter().find(|c| unused(c)))
            .cloned();
        if let Some(column) = pick {
            trace!(column = column.name(), "inferred group-by column");
            self.group_by_columns = vec![column];
        }
    }

    /// Rebuild the active scale list from the store: one per data column with multi-axis,
    /// otherwise a single entry keyed by the first data column.
    fn sync_scales(&mut self) {
        self.scales = if self.multi_value_axes {
            let names = self.data_columns.iter().map(|c| c.name().to_string()).collect::<Vec<_>>();
            names.iter().map(|n| self.scale_store.get(n)).collect()
        } else {
            let name = self.data_columns.first().map(|c| c.name().to_string()).unwrap_or_default();
            vec![self.scale_store.get(&name)]
        };
    }

    // ---- look & size -------------------------------------------------------

    pub fn set_margin(&mut self, margin: Insets) {
        if self.margin == margin { return; }
        self.margin = margin;
        self.notify(ChangeKind::Look);
    }

    pub fn set_legend_visibility(&mut self, visible: bool) {
        if self.legend.visible == visible { return; }
        self.legend.visible = visible;
        self.notify(ChangeKind::Look);
    }

    pub fn set_legend_position(&mut self, position: LegendPosition) {
        if self.legend.position == position { return; }
        self.legend.position = position;
        self.notify(ChangeKind::Look);
    }

    pub fn set_value_as_percent(&mut self, percent: bool) {
        if self.value_as_percent == percent { return; }
        self.value_as_percent = percent;
        self.notify(ChangeKind::Look);
    }

    /// Ignored for chart types that cannot stack.
    pub fn set_stacked(&mut self, stacked: bool) {
        let stacked = stacked && self.chart_type.supports_stacking();
        if self.stacked == stacked { return; }
        self.stacked = stacked;
        self.notify(ChangeKind::Look);
    }

    /// Write edited scales through the store, matched to data columns by position.
    pub fn set_scales(&mut self, scales: Vec<ScaleConfig>) {
        self.scale_store.update(&scales, &self.data_columns);
        self.sync_scales();
        self.notify(ChangeKind::Look);
    }

    pub fn set_size(&mut self, width: u32, height: u32) {
        self.size = (width, height);
        self.notify(ChangeKind::Size);
    }

    // ---- shaping results ---------------------------------------------------

    /// Replace the dataset wholesale. Any rendered chart refers to the old one and is dropped.
    pub fn set_dataset(&mut self, dataset: Option<Dataset>) {
        self.dataset = dataset;
        self.rendered = None;
    }

    pub fn attach_rendered(&mut self, handle: RenderHandle) -> Result<(), StateError> {
        if self.dataset.is_none() {
            return Err(StateError::DatasetMissing);
        }
        self.rendered = Some(handle);
        Ok(())
    }

    pub fn detach_rendered(&mut self) -> Option<RenderHandle> { self.rendered.take() }

    pub(crate) fn reset_shape_flags(&mut self) {
        self.value_range = None;
        self.warning = None;
        self.downsampled = false;
    }

    pub(crate) fn record_shape(&mut self, range: Option<ValueRange>, warning: Option<String>) {
        self.value_range = range;
        self.downsampled = warning.is_some();
        self.warning = warning;
    }

    // ---- persistence -------------------------------------------------------

    pub fn persist(&self) -> PersistedChart {
        PersistedChart {
            chart_type: self.chart_type,
            margin: self.margin,
            legend: self.legend,
            stacked: self.stacked,
            multi_value_axes: self.multi_value_axes,
            value_as_percent: self.value_as_percent,
            scales: self.scales.clone(),
        }
    }

    /// Apply persisted fields, then fire a single STRUCTURE change.
    pub fn restore(&mut self, saved: &PersistedChart) {
        self.suppress_notifications(|state| {
            state.set_chart_type(saved.chart_type);
            state.set_margin(saved.margin);
            state.set_legend_visibility(saved.legend.visible);
            state.set_legend_position(saved.legend.position);
            state.set_value_as_percent(saved.value_as_percent);
            for scale in &saved.scales {
                state.scale_store.put(scale.clone());
            }
            state.toggle_multi_value_axes(saved.multi_value_axes);
            state.set_stacked(saved.stacked);
        });
        self.notify(ChangeKind::Structure);
    }
}

impl std::fmt::Debug for ChartState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChartState")
            .field("chart_type", &self.chart_type)
            .field("data_columns", &self.data_columns.iter().map(Column::name).collect::<Vec<_>>())
            .field("group_by_columns", &self.group_by_columns.iter().map(Column::name).collect::<Vec<_>>())
            .field("split_columns", &self.split_columns.iter().map(Column::name).collect::<Vec<_>>())
            .field("aggregations", &self.aggregations)
            .field("stacked", &self.stacked)
            .field("multi_value_axes", &self.multi_value_axes)
            .field("subscribers", &self.subscribers.len())
            .finish()
    }
}
