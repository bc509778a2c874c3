// Purpose: time parsing, truncation, labels and granularity selection.

use chart_core::time::{format_time, parse_time};
use chart_core::{TimeUnit, Value};

fn ms(text: &str) -> i64 {
    parse_time(&Value::from(text)).unwrap()
}

#[test]
fn parses_common_layouts() {
    let day = ms("2024-03-15");
    assert_eq!(ms("2024-03-15T00:00:00Z"), day);
    assert_eq!(ms("2024-03-15 00:00:00"), day);
    assert_eq!(ms("2024-03-15T00:00:00"), day);
    assert_eq!(ms("2024-03-15 00:00"), day);
    assert_eq!(parse_time(&Value::from(day as f64)), Some(day));
    assert_eq!(parse_time(&Value::from("not a date")), None);
    assert_eq!(parse_time(&Value::Null), None);
}

#[test]
fn truncation_snaps_to_unit_start() {
    let t = ms("2024-05-15 13:47:12");
    assert_eq!(TimeUnit::Hour.truncate(t), ms("2024-05-15 13:00:00"));
    assert_eq!(TimeUnit::Day.truncate(t), ms("2024-05-15"));
    // 2024-05-15 is a Wednesday
    assert_eq!(TimeUnit::Week.truncate(t), ms("2024-05-13"));
    assert_eq!(TimeUnit::Month.truncate(t), ms("2024-05-01"));
    assert_eq!(TimeUnit::Quarter.truncate(t), ms("2024-04-01"));
    assert_eq!(TimeUnit::Year.truncate(t), ms("2024-01-01"));
}

#[test]
fn labels_per_unit() {
    let t = ms("2024-05-15 13:47:12");
    assert_eq!(TimeUnit::Hour.label(t), "2024-05-15 13:00");
    assert_eq!(TimeUnit::Day.label(t), "2024-05-15");
    assert_eq!(TimeUnit::Week.label(t), "2024-W20");
    assert_eq!(TimeUnit::Month.label(t), "2024-05");
    assert_eq!(TimeUnit::Quarter.label(t), "Q2 2024");
    assert_eq!(TimeUnit::Year.label(t), "2024");
}

#[test]
fn format_unit_is_the_finest_field() {
    assert_eq!(TimeUnit::from_format("%Y"), Some(TimeUnit::Year));
    assert_eq!(TimeUnit::from_format("%b %Y"), Some(TimeUnit::Month));
    assert_eq!(TimeUnit::from_format("%Y-%m-%d %H:%M"), Some(TimeUnit::Minute));
    assert_eq!(TimeUnit::from_format("%-d/%-m"), Some(TimeUnit::Day));
    assert_eq!(TimeUnit::from_format("literal"), None);
}

#[test]
fn span_unit_yields_enough_ticks() {
    let day = TimeUnit::Day.approx_millis();
    assert_eq!(TimeUnit::for_span(30.0 * day, 10), TimeUnit::Day);
    assert_eq!(TimeUnit::for_span(400.0 * day, 10), TimeUnit::Month);
    assert_eq!(TimeUnit::for_span(5.0, 10), TimeUnit::Millisecond);
}

#[test]
fn invalid_patterns_do_not_format() {
    let t = ms("2024-05-15");
    assert_eq!(format_time(t, "%d.%m.%Y").as_deref(), Some("15.05.2024"));
    assert_eq!(format_time(t, "%Q"), None);
}
