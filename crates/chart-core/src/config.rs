// File: crates/chart-core/src/config.rs
// Summary: Engine tuning knobs (point budgets, legend gating, time ticks) with serde-backed overrides.

use serde::{Deserialize, Serialize};

use crate::chart::{ChartLimits, ChartType};
use crate::downsample::DEFAULT_THRESHOLD;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Individual-value series longer than this are down-sampled.
    pub downsample_threshold: usize,
    pub limits: ChartLimits,
    /// Legends with more items than this are hidden.
    pub legend_item_ceiling: usize,
    /// Chart types that never show a legend.
    pub legend_excluded: Vec<ChartType>,
    /// Minimum tick count a data-derived time unit must produce.
    pub min_time_ticks: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            downsample_threshold: DEFAULT_THRESHOLD,
            limits: ChartLimits::default(),
            legend_item_ceiling: 20,
            legend_excluded: vec![ChartType::Sunburst],
            min_time_ticks: 10,
        }
    }
}

impl EngineConfig {
    /// Parse a JSON config; missing fields keep their defaults.
    pub fn from_json(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }
}
