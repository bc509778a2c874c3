// File: crates/chart-core/src/time.rs
// Summary: Time granularities: parsing TIME cells, truncation, labels and tick-unit selection.

use chrono::format::{Item, StrftimeItems};
use chrono::{DateTime, Datelike, Days, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::Value;

const MS_PER_SECOND: f64 = 1_000.0;
const MS_PER_MINUTE: f64 = 60.0 * MS_PER_SECOND;
const MS_PER_HOUR: f64 = 60.0 * MS_PER_MINUTE;
const MS_PER_DAY: f64 = 24.0 * MS_PER_HOUR;

/// Time granularity, ordered from finest to coarsest.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimeUnit {
    Millisecond,
    Second,
    Minute,
    Hour,
    Day,
    Week,
    Month,
    Quarter,
    Year,
}

impl TimeUnit {
    /// All units, finest first.
    pub const ALL: [TimeUnit; 9] = [
        TimeUnit::Millisecond,
        TimeUnit::Second,
        TimeUnit::Minute,
        TimeUnit::Hour,
        TimeUnit::Day,
        TimeUnit::Week,
        TimeUnit::Month,
        TimeUnit::Quarter,
        TimeUnit::Year,
    ];

    /// Approximate length of one unit in milliseconds.
    pub fn approx_millis(self) -> f64 {
        match self {
            TimeUnit::Millisecond => 1.0,
            TimeUnit::Second => MS_PER_SECOND,
            TimeUnit::Minute => MS_PER_MINUTE,
            TimeUnit::Hour => MS_PER_HOUR,
            TimeUnit::Day => MS_PER_DAY,
            TimeUnit::Week => 7.0 * MS_PER_DAY,
            TimeUnit::Month => 30.4375 * MS_PER_DAY,
            TimeUnit::Quarter => 91.3125 * MS_PER_DAY,
            TimeUnit::Year => 365.25 * MS_PER_DAY,
        }
    }

    /// Round `millis` (UTC epoch) down to the start of its unit.
    /// Weeks start on Monday; out-of-range timestamps are returned unchanged.
    pub fn truncate(self, millis: i64) -> i64 {
        let fixed = |step: i64| millis.div_euclid(step) * step;
        match self {
            TimeUnit::Millisecond => return millis,
            TimeUnit::Second => return fixed(1_000),
            TimeUnit::Minute => return fixed(60_000),
            TimeUnit::Hour => return fixed(3_600_000),
            _ => {}
        }
        let Some(dt) = DateTime::<Utc>::from_timestamp_millis(millis) else { return millis };
        let date = dt.date_naive();
        let start = match self {
            TimeUnit::Day => Some(date),
            TimeUnit::Week => date.checked_sub_days(Days::new(date.weekday().num_days_from_monday() as u64)),
            TimeUnit::Month => NaiveDate::from_ymd_opt(date.year(), date.month(), 1),
            TimeUnit::Quarter => NaiveDate::from_ymd_opt(date.year(), date.month0() / 3 * 3 + 1, 1),
            _ => NaiveDate::from_ymd_opt(date.year(), 1, 1),
        };
        start
            .and_then(|d| d.and_hms_opt(0, 0, 0))
            .map(|ndt| ndt.and_utc().timestamp_millis())
            .unwrap_or(millis)
    }

    /// Human label of the unit-bucket containing `millis`.
    pub fn label(self, millis: i64) -> String {
        let Some(dt) = DateTime::<Utc>::from_timestamp_millis(millis) else { return millis.to_string() };
        match self {
            TimeUnit::Millisecond => dt.format("%Y-%m-%d %H:%M:%S%.3f").to_string(),
            TimeUnit::Second => dt.format("%Y-%m-%d %H:%M:%S").to_string(),
            TimeUnit::Minute => dt.format("%Y-%m-%d %H:%M").to_string(),
            TimeUnit::Hour => dt.format("%Y-%m-%d %H:00").to_string(),
            TimeUnit::Day => dt.format("%Y-%m-%d").to_string(),
            TimeUnit::Week => {
                let week = dt.iso_week();
                format!("{}-W{:02}", week.year(), week.week())
            }
            TimeUnit::Month => dt.format("%Y-%m").to_string(),
            TimeUnit::Quarter => format!("Q{} {}", dt.month0() / 3 + 1, dt.year()),
            TimeUnit::Year => dt.format("%Y").to_string(),
        }
    }

    /// Finest unit a strftime-style format displays, or `None` if it shows no date/time field.
    pub fn from_format(format: &str) -> Option<TimeUnit> {
        let mut finest: Option<TimeUnit> = None;
        let mut chars = format.chars();
        while let Some(c) = chars.next() {
            if c != '%' { continue; }
            // skip padding/precision modifiers (%-d, %_H, %.3f, %3f)
            let field = chars.by_ref().find(|c| !matches!(c, '-' | '_' | '0' | '.' | '1'..='9'));
            let unit = match field {
                Some('f') => TimeUnit::Millisecond,
                Some('S' | 'T' | 's') => TimeUnit::Second,
                Some('M' | 'R') => TimeUnit::Minute,
                Some('H' | 'I' | 'k' | 'l') => TimeUnit::Hour,
                Some('d' | 'e' | 'j' | 'F' | 'D' | 'x' | 'a' | 'A' | 'u' | 'w') => TimeUnit::Day,
                Some('V' | 'W' | 'U') => TimeUnit::Week,
                Some('m' | 'b' | 'B' | 'h') => TimeUnit::Month,
                Some('Y' | 'y' | 'G' | 'g' | 'C') => TimeUnit::Year,
                _ => continue,
            };
            finest = Some(finest.map_or(unit, |f| f.min(unit)));
        }
        finest
    }

    /// Coarsest unit that still yields at least `min_ticks` ticks over `span_millis`.
    /// Falls back to milliseconds for very short spans.
    pub fn for_span(span_millis: f64, min_ticks: usize) -> TimeUnit {
        let wanted = min_ticks.max(1) as f64;
        TimeUnit::ALL
            .iter()
            .rev()
            .copied()
            .find(|u| span_millis / u.approx_millis() >= wanted)
            .unwrap_or(TimeUnit::Millisecond)
    }
}

/// Interpret a TIME cell as UTC epoch milliseconds.
/// Numbers are taken as epoch millis; text accepts RFC 3339, `YYYY-MM-DD HH:MM:SS`,
/// `YYYY-MM-DDTHH:MM:SS` and `YYYY-MM-DD`.
pub fn parse_time(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) if n.is_finite() => Some(*n as i64),
        Value::Text(s) => parse_time_str(s.trim()),
        _ => None,
    }
}

fn parse_time_str(s: &str) -> Option<i64> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.timestamp_millis());
    }
    for pattern in ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M"] {
        if let Ok(ndt) = NaiveDateTime::parse_from_str(s, pattern) {
            return Some(ndt.and_utc().timestamp_millis());
        }
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|ndt| ndt.and_utc().timestamp_millis())
}

/// Format `millis` with a strftime pattern; `None` when the pattern is invalid.
pub fn format_time(millis: i64, pattern: &str) -> Option<String> {
    if StrftimeItems::new(pattern).any(|item| matches!(item, Item::Error)) {
        return None;
    }
    let dt = DateTime::<Utc>::from_timestamp_millis(millis)?;
    Some(dt.format_with_items(StrftimeItems::new(pattern)).to_string())
}
