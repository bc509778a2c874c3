// File: crates/chart-core/src/axis.rs
// Summary: Axis render options (kind, side, bounds, ticks) produced by the configurator.

use serde::Serialize;

use crate::force_y::ForceY;
use crate::scale::Ticks;
use crate::time::TimeUnit;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum AxisKind {
    Category,
    Linear,
    Time { unit: TimeUnit },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AxisPosition {
    Left,
    Right,
    Top,
    Bottom,
}

impl AxisPosition {
    pub fn opposite(self) -> Self {
        match self {
            AxisPosition::Left => AxisPosition::Right,
            AxisPosition::Right => AxisPosition::Left,
            AxisPosition::Top => AxisPosition::Bottom,
            AxisPosition::Bottom => AxisPosition::Top,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TickFormat {
    #[default]
    Plain,
    Percent,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct AxisOptions {
    pub id: String,
    pub display: bool,
    pub kind: AxisKind,
    pub position: AxisPosition,
    /// Value axes plot series values; the other axis carries x/categories.
    pub value_axis: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,
    pub ticks: Ticks,
    pub tick_format: TickFormat,
    pub stacked: bool,
}

impl AxisOptions {
    pub fn new(id: impl Into<String>, kind: AxisKind, position: AxisPosition) -> Self {
        Self {
            id: id.into(),
            display: true,
            kind,
            position,
            value_axis: false,
            title: None,
            min: None,
            max: None,
            ticks: Ticks::default(),
            tick_format: TickFormat::Plain,
            stacked: false,
        }
    }

    pub fn value(id: impl Into<String>, position: AxisPosition) -> Self {
        let mut axis = Self::new(id, AxisKind::Linear, position);
        axis.value_axis = true;
        axis
    }

    /// An axis that is configured but not drawn (circular charts).
    pub fn hidden(id: impl Into<String>, position: AxisPosition) -> Self {
        let mut axis = Self::new(id, AxisKind::Linear, position);
        axis.display = false;
        axis
    }

    pub fn apply_force_y(&mut self, force: ForceY) {
        self.min = force.min.or(self.min);
        self.max = force.max.or(self.max);
    }
}
