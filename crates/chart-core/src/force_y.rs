// File: crates/chart-core/src/force_y.rs
// Summary: Value-axis bound adjustment that exaggerates small differences among large same-sign values.

use serde::Serialize;

use crate::range::ValueRange;

/// Axis bound overrides. At most one side is set.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize)]
pub struct ForceY {
    pub min: Option<f64>,
    pub max: Option<f64>,
}

/// Move the bound nearest zero toward the data by one data span, rounded outward.
///
/// Returns `None` when min == max, when the range touches or spans zero, or when the
/// moved bound would cross zero.
pub fn compute(range: ValueRange) -> Option<ForceY> {
    let ValueRange { min, max } = range;
    if !min.is_finite() || !max.is_finite() || min >= max { return None; }
    let span = max - min;
    if min > 0.0 {
        let bound = round_outward(min - span, false);
        if bound < 0.0 { return None; }
        Some(ForceY { min: Some(bound), max: None })
    } else if max < 0.0 {
        let bound = round_outward(max + span, true);
        if bound > 0.0 { return None; }
        Some(ForceY { min: None, max: Some(bound) })
    } else {
        None
    }
}

/// Integer rounding above magnitude 10, otherwise rounding one digit past the
/// leading significant digit. `up` rounds toward +inf, else toward -inf.
fn round_outward(bound: f64, up: bool) -> f64 {
    let round = |v: f64| if up { v.ceil() } else { v.floor() };
    if bound == 0.0 { return 0.0; }
    if bound.abs() > 10.0 { return round(bound); }
    let step = 10f64.powi(bound.abs().log10().floor() as i32 - 1);
    // snap tiny float noise before rounding so 5.6/0.1 stays 56
    let scaled = bound / step;
    let snapped = if (scaled - scaled.round()).abs() < 1e-9 { scaled.round() } else { scaled };
    round(snapped) * step
}
