// File: crates/chart-core/src/lib.rs
// Summary: Core library entry point; chart state, record shaping and axis configuration.

pub mod aggregate;
pub mod axis;
pub mod chart;
pub mod config;
pub mod configure;
pub mod downsample;
pub mod error;
pub mod force_y;
pub mod range;
pub mod scale;
pub mod series;
pub mod state;
pub mod time;
pub mod types;

pub use aggregate::{AggregationEngine, LabelFormatter, PlainFormatter};
pub use axis::{AxisKind, AxisOptions, AxisPosition, TickFormat};
pub use chart::{ChartLimits, ChartType};
pub use config::EngineConfig;
pub use configure::{AxisConfigurator, InteractionMode, LegendLink, LegendOptions, RenderOptions};
pub use downsample::{lttb, lttb_indices};
pub use error::{ShapeError, StateError};
pub use force_y::ForceY;
pub use range::ValueRange;
pub use scale::{ScaleConfig, ScaleConfigStore, Ticks};
pub use series::{Dataset, HierarchyNode, Point, RecordId, Series, XValue};
pub use state::{Aggregation, ChangeKind, ChartState, Legend, LegendPosition, PersistedChart, RenderHandle, SubscriptionId};
pub use time::TimeUnit;
pub use types::{record, Column, DataType, Insets, Record, RecordSource, Value};
