// File: crates/chart-core/src/scale.rs
// Summary: Per-column tick settings and the name-keyed store that remembers them across selections.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::types::Column;

/// Tick overrides; unset fields keep the renderer's defaults.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Ticks {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub step_size: Option<f64>,
    /// Label rotation in degrees.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rotation: Option<f64>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ScaleConfig {
    pub column_name: String,
    #[serde(default)]
    pub ticks: Ticks,
}

impl ScaleConfig {
    pub fn empty(column_name: impl Into<String>) -> Self {
        Self { column_name: column_name.into(), ticks: Ticks::default() }
    }

    pub fn with_step_size(mut self, step: f64) -> Self {
        self.ticks.step_size = Some(step);
        self
    }

    pub fn with_rotation(mut self, degrees: f64) -> Self {
        self.ticks.rotation = Some(degrees);
        self
    }
}

/// Column name -> ScaleConfig cache. Entries are created lazily and never evicted.
#[derive(Clone, Debug, Default)]
pub struct ScaleConfigStore {
    entries: HashMap<String, ScaleConfig>,
}

impl ScaleConfigStore {
    pub fn new() -> Self { Self::default() }

    /// Copy of the cached entry for `name`, caching an empty one on first access.
    pub fn get(&mut self, name: &str) -> ScaleConfig {
        self.entries
            .entry(name.to_string())
            .or_insert_with(|| ScaleConfig::empty(name))
            .clone()
    }

    /// Store `scales[i]` under `columns[i].name()`; extra entries on either side are ignored.
    pub fn update(&mut self, scales: &[ScaleConfig], columns: &[Column]) {
        for (scale, column) in scales.iter().zip(columns) {
            let entry = ScaleConfig { column_name: column.name().to_string(), ticks: scale.ticks.clone() };
            self.entries.insert(entry.column_name.clone(), entry);
        }
    }

    /// Insert an entry under its own column name.
    pub fn put(&mut self, scale: ScaleConfig) {
        self.entries.insert(scale.column_name.clone(), scale);
    }

    pub fn contains(&self, name: &str) -> bool { self.entries.contains_key(name) }
    pub fn len(&self) -> usize { self.entries.len() }
    pub fn is_empty(&self) -> bool { self.entries.is_empty() }
}
