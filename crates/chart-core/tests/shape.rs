// Purpose: record shaping across flat, hierarchical, grouped-count, aggregated and individual modes.

use chart_core::{
    record, Aggregation, AggregationEngine, ChartLimits, ChartState, ChartType, Column, EngineConfig, LabelFormatter,
    PlainFormatter, Record, RecordId, RecordSource, ShapeError, TimeUnit, Value, XValue,
};

fn engine() -> AggregationEngine {
    AggregationEngine::new(EngineConfig::default())
}

fn source(columns: Vec<Column>, entries: Vec<Record>) -> RecordSource {
    RecordSource::new(entries, columns)
}

fn labels_of(series: &chart_core::Series) -> Vec<String> {
    series.points.iter().map(|p| p.x.key()).collect()
}

fn ys(series: &chart_core::Series) -> Vec<f64> {
    series.points.iter().map(|p| p.y).collect()
}

#[test]
fn flat_count_merges_duplicates() {
    let columns = vec![Column::text("t1")];
    let src = source(
        columns.clone(),
        vec![record([("t1", "a")]), record([("t1", "b")]), record([("t1", "b")])],
    );
    let mut state = ChartState::new(ChartType::Bar, columns);
    state.set_data_columns(vec![Column::text("t1")]);

    let dataset = engine().shape(&mut state, &src).unwrap();
    assert_eq!(dataset.labels.as_deref(), Some(&["a".to_string(), "b".to_string()][..]));
    assert_eq!(dataset.series.len(), 1);
    assert_eq!(ys(&dataset.series[0]), vec![1.0, 2.0]);
}

#[test]
fn flat_count_total_matches_non_null_records() {
    let columns = vec![Column::text("kind"), Column::number("n")];
    let mut entries = vec![
        record([("kind", Value::from("x")), ("n", Value::from(1.0))]),
        record([("kind", Value::Null), ("n", Value::from(2.0))]),
        record([("n", Value::from(3.0))]),
    ];
    for i in 0..17 {
        entries.push(record([("kind", Value::from(format!("k{}", i % 4)))]));
    }
    let src = source(columns.clone(), entries);
    let mut state = ChartState::new(ChartType::Pie, columns);
    state.set_data_columns(vec![Column::text("kind")]);

    let dataset = engine().shape(&mut state, &src).unwrap();
    let total: f64 = dataset.series[0].points.iter().map(|p| p.y).sum();
    assert_eq!(total, 18.0);
}

#[test]
fn grouped_count_keys_series_by_data_value() {
    let columns = vec![Column::text("t1"), Column::number("n1")];
    let src = source(
        columns.clone(),
        vec![
            record([("t1", Value::from("a")), ("n1", Value::from(1.0))]),
            record([("t1", Value::from("b")), ("n1", Value::from(2.0))]),
            record([("t1", Value::from("b")), ("n1", Value::from(3.0))]),
            record([("t1", Value::from("b")), ("n1", Value::from(2.0))]),
        ],
    );
    let mut state = ChartState::new(ChartType::Bar, columns);
    state.set_data_columns(vec![Column::number("n1")]);
    assert_eq!(state.group_by_columns()[0].name(), "t1");
    state.set_aggregations(vec![Aggregation::Count]).unwrap();

    let dataset = engine().shape(&mut state, &src).unwrap();
    let names = dataset.series.iter().map(|s| s.name.as_str()).collect::<Vec<_>>();
    assert_eq!(names, vec!["1", "2", "3"]);
    assert_eq!(dataset.series[0].points, vec![chart_core::Point::category("a", 1.0)]);
    assert_eq!(dataset.series[1].points, vec![chart_core::Point::category("b", 2.0)]);
    assert_eq!(dataset.series[2].points, vec![chart_core::Point::category("b", 1.0)]);
}

#[test]
fn flat_individual_rejects_repeated_names() {
    let columns = vec![Column::text("name"), Column::number("v")];
    let src = source(
        columns.clone(),
        vec![
            record([("name", Value::from("a")), ("v", Value::from(1.0))]),
            record([("name", Value::from("a")), ("v", Value::from(2.0))]),
        ],
    );
    let mut state = ChartState::new(ChartType::Pie, columns);
    state.set_data_columns(vec![Column::number("v")]);

    let err = engine().shape(&mut state, &src).unwrap_err();
    assert_eq!(err, ShapeError::NamesNotUnique);
    assert_eq!(err.to_string(), "Names are not unique");
}

#[test]
fn flat_individual_needs_a_name_column() {
    let columns = vec![Column::number("n1")];
    let src = source(columns.clone(), vec![record([("n1", 1.0)])]);
    let mut state = ChartState::new(ChartType::Pie, columns);
    state.set_data_columns(vec![Column::number("n1")]);
    assert!(state.group_by_columns().is_empty());

    let err = engine().shape(&mut state, &src).unwrap_err();
    assert_eq!(err.to_string(), "Name column is not defined");
}

#[test]
fn pie_overflow_names_ceiling() {
    let columns = vec![Column::text("t")];
    let entries = (0..1001).map(|i| record([("t", Value::from(format!("c{i}")))])).collect();
    let src = source(columns.clone(), entries);
    let mut state = ChartState::new(ChartType::Pie, columns);
    state.set_data_columns(vec![Column::text("t")]);

    let err = engine().shape(&mut state, &src).unwrap_err();
    assert_eq!(err, ShapeError::TooManyPoints { count: 1001, limit: 1000, chart: ChartType::Pie });
    let message = err.to_string();
    assert!(message.contains("1000"), "{message}");
    assert!(message.contains("filter"), "{message}");
}

#[test]
fn configured_limits_override_builtin_ceilings() {
    let columns = vec![Column::text("t")];
    let entries = ["a", "b", "c", "d"].iter().map(|t| record([("t", *t)])).collect();
    let src = source(columns.clone(), entries);
    let config = EngineConfig {
        limits: ChartLimits::default().with_limit(ChartType::Bar, Some(3)),
        ..EngineConfig::default()
    };
    let engine = AggregationEngine::new(config);

    let mut bar = ChartState::new(ChartType::Bar, columns.clone());
    bar.set_data_columns(vec![Column::text("t")]);
    assert!(matches!(engine.shape(&mut bar, &src), Err(ShapeError::TooManyPoints { limit: 3, .. })));

    let mut pie = ChartState::new(ChartType::Pie, columns);
    pie.set_data_columns(vec![Column::text("t")]);
    assert!(engine.shape(&mut pie, &src).is_ok());
}

#[test]
fn individual_time_series_sorts_ascending_with_record_ids() {
    let columns = vec![Column::time("day"), Column::number("v")];
    let src = source(
        columns.clone(),
        vec![
            record([("day", Value::from("2024-01-03")), ("v", Value::from(3.0))]),
            record([("day", Value::from("2024-01-01")), ("v", Value::from(1.0))]),
            record([("day", Value::from("2024-01-02")), ("v", Value::from(2.0))]),
        ],
    );
    let mut state = ChartState::new(ChartType::Line, columns);
    state.set_data_columns(vec![Column::number("v")]);
    assert_eq!(state.group_by_columns()[0].name(), "day");

    let dataset = engine().shape(&mut state, &src).unwrap();
    let series = &dataset.series[0];
    assert!(series.points.iter().all(|p| p.x.is_time()));
    let ids = series.points.iter().map(|p| p.record).collect::<Vec<_>>();
    assert_eq!(ids, vec![Some(RecordId(1)), Some(RecordId(2)), Some(RecordId(0))]);
    assert_eq!(ys(series), vec![1.0, 2.0, 3.0]);
    assert_eq!(state.value_range().map(|r| (r.min, r.max)), Some((1.0, 3.0)));
    assert!(!state.downsampled());
}

#[test]
fn long_individual_series_is_downsampled() {
    let columns = vec![Column::number("x"), Column::number("y")];
    let entries = (0..5000)
        .map(|i| record([("x", Value::from(i as f64)), ("y", Value::from(((i as f64) * 0.01).sin()))]))
        .collect();
    let src = source(columns.clone(), entries);
    let mut state = ChartState::new(ChartType::Line, columns);
    state.set_data_columns(vec![Column::number("y")]);
    assert_eq!(state.group_by_columns()[0].name(), "x");

    let dataset = engine().shape(&mut state, &src).unwrap();
    let series = &dataset.series[0];
    assert!(series.len() <= 1000);
    assert!(series.len() > 500);
    assert_eq!(series.points.first().map(|p| p.x.clone()), Some(XValue::Number(0.0)));
    assert_eq!(series.points.last().map(|p| p.x.clone()), Some(XValue::Number(4999.0)));
    assert!(state.downsampled());
    assert!(state.warning().is_some_and(|w| w.contains("1000")));
}

#[test]
fn individual_series_never_exceed_record_count() {
    let columns = vec![Column::text("g"), Column::number("a"), Column::number("b")];
    let entries = vec![
        record([("g", Value::from("p")), ("a", Value::from(1.0)), ("b", Value::Null)]),
        record([("g", Value::from("q")), ("a", Value::from(2.0)), ("b", Value::from(5.0))]),
        record([("g", Value::Null), ("a", Value::from(3.0)), ("b", Value::from(6.0))]),
    ];
    let src = source(columns.clone(), entries);
    let mut state = ChartState::new(ChartType::Bar, columns);
    state.set_data_columns(vec![Column::number("a"), Column::number("b")]);

    let dataset = engine().shape(&mut state, &src).unwrap();
    assert_eq!(dataset.series.len(), 2);
    assert_eq!(dataset.series[0].len(), 2);
    assert_eq!(dataset.series[1].len(), 1);
    assert_eq!(dataset.labels.as_deref(), Some(&["p".to_string(), "q".to_string()][..]));
}

#[test]
fn hierarchy_counts_records_per_partition() {
    let columns = vec![Column::text("region"), Column::text("kind")];
    let src = source(
        columns.clone(),
        vec![
            record([("region", "N"), ("kind", "a")]),
            record([("region", "N"), ("kind", "a")]),
            record([("region", "N"), ("kind", "b")]),
            record([("region", "S"), ("kind", "a")]),
        ],
    );
    let mut state = ChartState::new(ChartType::Sunburst, columns);
    state.set_data_columns(vec![Column::text("kind")]);
    state.set_group_by_columns(vec![Column::text("region")]);

    let dataset = engine().shape(&mut state, &src).unwrap();
    let top = &dataset.hierarchy;
    assert_eq!(top.len(), 2);
    assert_eq!((top[0].label.as_str(), top[0].value), ("N", 3.0));
    assert_eq!((top[1].label.as_str(), top[1].value), ("S", 1.0));
    let north = top[0].children.iter().map(|c| (c.label.as_str(), c.value)).collect::<Vec<_>>();
    assert_eq!(north, vec![("a", 2.0), ("b", 1.0)]);
    assert_eq!(top[0].leaf_count(), 2);

    assert_eq!(labels_of(&dataset.series[0]), vec!["N / a", "N / b", "S / a"]);
    assert_eq!(ys(&dataset.series[0]), vec![2.0, 1.0, 1.0]);
}

#[test]
fn hierarchy_merges_time_values_by_granularity() {
    let month = Column::time("when").with_group_unit(TimeUnit::Month);
    let columns = vec![month.clone(), Column::text("kind")];
    let src = source(
        columns.clone(),
        vec![
            record([("when", "2024-01-05"), ("kind", "a")]),
            record([("when", "2024-01-20"), ("kind", "a")]),
            record([("when", "2024-02-01"), ("kind", "a")]),
        ],
    );
    let mut state = ChartState::new(ChartType::Sunburst, columns);
    state.set_data_columns(vec![Column::text("kind")]);
    state.set_group_by_columns(vec![month]);

    let dataset = engine().shape(&mut state, &src).unwrap();
    let top = dataset.hierarchy.iter().map(|n| (n.label.as_str(), n.value)).collect::<Vec<_>>();
    assert_eq!(top, vec![("2024-01", 2.0), ("2024-02", 1.0)]);
}

#[test]
fn grouped_count_on_time_axis_buckets_and_sorts() {
    let month = Column::time("when").with_group_unit(TimeUnit::Month);
    let columns = vec![month.clone(), Column::text("kind")];
    let src = source(
        columns.clone(),
        vec![
            record([("when", "2024-03-02"), ("kind", "a")]),
            record([("when", "2024-01-05"), ("kind", "a")]),
            record([("when", "2024-01-20"), ("kind", "a")]),
        ],
    );
    let mut state = ChartState::new(ChartType::Bar, columns);
    state.set_data_columns(vec![Column::text("kind")]);
    state.set_group_by_columns(vec![month]);
    assert!(state.is_count());

    let dataset = engine().shape(&mut state, &src).unwrap();
    let series = &dataset.series[0];
    let xs = series.points.iter().filter_map(|p| p.x.as_f64()).collect::<Vec<_>>();
    assert_eq!(xs.len(), 2);
    assert!(xs[0] < xs[1]);
    assert_eq!(ys(series), vec![2.0, 1.0]);
}

#[test]
fn value_aggregations_build_one_series_each() {
    let columns = vec![Column::text("t"), Column::number("v")];
    let src = source(
        columns.clone(),
        vec![
            record([("t", Value::from("a")), ("v", Value::from(1.0))]),
            record([("t", Value::from("b")), ("v", Value::from(2.0))]),
            record([("t", Value::from("a")), ("v", Value::from(3.0))]),
        ],
    );
    let mut state = ChartState::new(ChartType::Bar, columns);
    state.set_data_columns(vec![Column::number("v")]);
    state.set_aggregations(vec![Aggregation::Sum, Aggregation::Average, Aggregation::Max]).unwrap();

    let dataset = engine().shape(&mut state, &src).unwrap();
    let names = dataset.series.iter().map(|s| s.name.as_str()).collect::<Vec<_>>();
    assert_eq!(names, vec!["Sum of v", "Average of v", "Max of v"]);
    assert_eq!(ys(&dataset.series[0]), vec![4.0, 2.0]);
    assert_eq!(ys(&dataset.series[1]), vec![2.0, 2.0]);
    assert_eq!(ys(&dataset.series[2]), vec![3.0, 2.0]);
    assert_eq!(dataset.labels.as_deref(), Some(&["a".to_string(), "b".to_string()][..]));
}

#[test]
fn single_series_chart_merges_keys_under_aggregation() {
    let columns = vec![Column::text("t"), Column::number("v")];
    let src = source(
        columns.clone(),
        vec![
            record([("t", Value::from("a")), ("v", Value::from(1.0))]),
            record([("t", Value::from("a")), ("v", Value::from(5.0))]),
        ],
    );
    let mut state = ChartState::new(ChartType::Doughnut, columns);
    state.set_data_columns(vec![Column::number("v")]);
    state.set_aggregations(vec![Aggregation::Min]).unwrap();

    let dataset = engine().shape(&mut state, &src).unwrap();
    assert_eq!(dataset.series[0].name, "Min of v");
    assert_eq!(dataset.series[0].points, vec![chart_core::Point::category("a", 1.0)]);
}

#[test]
fn split_columns_partition_series() {
    let columns = vec![Column::number("x"), Column::number("v"), Column::text("site")];
    let src = source(
        columns.clone(),
        vec![
            record([("x", Value::from(1.0)), ("v", Value::from(10.0)), ("site", Value::from("p"))]),
            record([("x", Value::from(2.0)), ("v", Value::from(20.0)), ("site", Value::from("q"))]),
            record([("x", Value::from(3.0)), ("v", Value::from(30.0)), ("site", Value::from("p"))]),
        ],
    );
    let mut state = ChartState::new(ChartType::Scatter, columns);
    state.set_data_columns(vec![Column::number("v")]);
    state.set_group_by_columns(vec![Column::number("x")]);
    state.set_split_columns(vec![Column::text("site")]);

    let dataset = engine().shape(&mut state, &src).unwrap();
    let names = dataset.series.iter().map(|s| s.name.as_str()).collect::<Vec<_>>();
    assert_eq!(names, vec!["v (p)", "v (q)"]);
    assert_eq!(ys(&dataset.series[0]), vec![10.0, 30.0]);
    assert!(dataset.series.iter().all(|s| s.column.as_deref() == Some("v")));
}

#[test]
fn failed_refresh_keeps_previous_dataset() {
    let columns = vec![Column::text("name"), Column::number("v")];
    let good = source(
        columns.clone(),
        vec![
            record([("name", Value::from("a")), ("v", Value::from(1.0))]),
            record([("name", Value::from("b")), ("v", Value::from(2.0))]),
        ],
    );
    let bad = source(
        columns.clone(),
        vec![
            record([("name", Value::from("a")), ("v", Value::from(1.0))]),
            record([("name", Value::from("a")), ("v", Value::from(2.0))]),
        ],
    );
    let mut state = ChartState::new(ChartType::Pie, columns);
    state.set_data_columns(vec![Column::number("v")]);

    let engine = engine();
    engine.refresh(&mut state, &good).unwrap();
    let before = state.dataset().cloned();
    assert!(state.value_range().is_some());

    assert_eq!(engine.refresh(&mut state, &bad), Err(ShapeError::NamesNotUnique));
    assert_eq!(state.dataset().cloned(), before);
    assert!(state.value_range().is_none());
}

struct Shouting;

impl LabelFormatter for Shouting {
    fn label(&self, value: &Value, column: &Column) -> Option<String> {
        PlainFormatter.label(value, column).map(|s| s.to_uppercase())
    }
}

#[test]
fn injected_formatter_controls_labels() {
    let columns = vec![Column::text("t"), Column::boolean("ok")];
    let src = source(
        columns.clone(),
        vec![record([("t", Value::from("a")), ("ok", Value::from(true))]), record([("t", Value::from("b"))])],
    );
    let mut state = ChartState::new(ChartType::Bar, columns);
    state.set_data_columns(vec![Column::text("t")]);

    let engine = AggregationEngine::with_formatter(EngineConfig::default(), Shouting);
    let dataset = engine.shape(&mut state, &src).unwrap();
    assert_eq!(dataset.labels.as_deref(), Some(&["A".to_string(), "B".to_string()][..]));

    state.set_data_columns(vec![Column::boolean("ok")]);
    let dataset = engine.shape(&mut state, &src).unwrap();
    assert_eq!(dataset.labels.as_deref(), Some(&["TRUE".to_string()][..]));
}
