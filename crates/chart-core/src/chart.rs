// File: crates/chart-core/src/chart.rs
// Summary: Chart type catalogue with derived predicates and the per-type point ceiling table.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ChartType {
    Bar,
    HorizontalBar,
    Line,
    Area,
    Scatter,
    Pie,
    Doughnut,
    PolarArea,
    Radar,
    Sunburst,
}

impl ChartType {
    pub const ALL: [ChartType; 10] = [
        ChartType::Bar,
        ChartType::HorizontalBar,
        ChartType::Line,
        ChartType::Area,
        ChartType::Scatter,
        ChartType::Pie,
        ChartType::Doughnut,
        ChartType::PolarArea,
        ChartType::Radar,
        ChartType::Sunburst,
    ];

    pub fn name(self) -> &'static str {
        match self {
            ChartType::Bar => "bar",
            ChartType::HorizontalBar => "horizontal-bar",
            ChartType::Line => "line",
            ChartType::Area => "area",
            ChartType::Scatter => "scatter",
            ChartType::Pie => "pie",
            ChartType::Doughnut => "doughnut",
            ChartType::PolarArea => "polar-area",
            ChartType::Radar => "radar",
            ChartType::Sunburst => "sunburst",
        }
    }

    /// No conventional x/y axes.
    pub fn is_circular(self) -> bool {
        matches!(self, ChartType::Pie | ChartType::Doughnut | ChartType::PolarArea | ChartType::Radar | ChartType::Sunburst)
    }

    /// X axis enumerates discrete labels.
    pub fn is_category(self) -> bool {
        matches!(
            self,
            ChartType::Bar | ChartType::HorizontalBar | ChartType::Pie | ChartType::Doughnut | ChartType::PolarArea | ChartType::Radar
        )
    }

    /// X axis may be numeric or temporal.
    pub fn is_continuous(self) -> bool {
        matches!(self, ChartType::Line | ChartType::Area | ChartType::Scatter)
    }

    /// Category axis runs vertically, value axis horizontally.
    pub fn is_horizontal(self) -> bool { self == ChartType::HorizontalBar }

    /// One series of category/value pairs (no grouping axis).
    pub fn is_single_series(self) -> bool {
        matches!(self, ChartType::Pie | ChartType::Doughnut | ChartType::PolarArea)
    }

    pub fn is_hierarchical(self) -> bool { self == ChartType::Sunburst }

    pub fn supports_stacking(self) -> bool {
        matches!(self, ChartType::Bar | ChartType::HorizontalBar | ChartType::Line | ChartType::Area)
    }

    /// Bars are anchored at zero, so their value axis must not be shifted.
    pub fn is_bar_like(self) -> bool {
        matches!(self, ChartType::Bar | ChartType::HorizontalBar)
    }
}

impl fmt::Display for ChartType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(self.name()) }
}

impl FromStr for ChartType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ChartType::ALL
            .iter()
            .copied()
            .find(|t| t.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("unknown chart type '{s}'"))
    }
}

/// Maximum number of categories/points per chart type; `None` means unlimited.
/// Entries missing from an override table fall back to the built-in ceiling.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChartLimits {
    overrides: HashMap<ChartType, Option<usize>>,
}

impl ChartLimits {
    /// Built-in ceilings.
    pub fn builtin(chart: ChartType) -> Option<usize> {
        match chart {
            ChartType::Pie | ChartType::Doughnut | ChartType::PolarArea | ChartType::Radar => Some(1000),
            ChartType::Bar | ChartType::HorizontalBar | ChartType::Sunburst => Some(5000),
            ChartType::Line | ChartType::Area | ChartType::Scatter => None,
        }
    }

    pub fn max_points(&self, chart: ChartType) -> Option<usize> {
        match self.overrides.get(&chart) {
            Some(limit) => *limit,
            None => Self::builtin(chart),
        }
    }

    pub fn with_limit(mut self, chart: ChartType, limit: Option<usize>) -> Self {
        self.overrides.insert(chart, limit);
        self
    }
}
