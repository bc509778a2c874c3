// File: crates/demo/src/main.rs
// Summary: Demo loads a CSV file, shapes it for a chart selection and prints dataset + render options as JSON.
// Usage:
//   chart-demo <file.csv> [--chart bar] [--data col,col] [--group col] [--split col]
//              [--agg count|sum|average|min|max] [--multi-axis] [--stacked] [--percent]
//              [--config engine.json]

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chart_core::time::parse_time;
use chart_core::{
    Aggregation, AggregationEngine, AxisConfigurator, ChangeKind, ChartState, ChartType, Column, DataType,
    EngineConfig, Record, RecordSource, Value,
};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Default)]
struct Args {
    input: PathBuf,
    chart: Option<String>,
    data: Vec<String>,
    group: Vec<String>,
    split: Vec<String>,
    aggregations: Vec<Aggregation>,
    multi_axis: bool,
    stacked: bool,
    percent: bool,
    config: Option<PathBuf>,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let args = parse_args(std::env::args().skip(1))?;
    let config = match &args.config {
        Some(path) => {
            let text = std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
            EngineConfig::from_json(&text).with_context(|| format!("parsing config {}", path.display()))?
        }
        None => EngineConfig::default(),
    };

    let source = load_csv(&args.input).with_context(|| format!("failed to load CSV '{}'", args.input.display()))?;
    tracing::info!(rows = source.entries.len(), columns = source.columns.len(), "loaded records");
    if source.entries.is_empty() {
        anyhow::bail!("no records loaded; check headers/delimiter.");
    }

    let chart = match &args.chart {
        Some(name) => name.parse::<ChartType>().map_err(anyhow::Error::msg)?,
        None => ChartType::Bar,
    };
    let mut state = ChartState::new(chart, source.columns.clone());
    state.subscribe(|kind: ChangeKind| tracing::debug!(?kind, "state changed"));

    let pick = |names: &[String]| -> Result<Vec<Column>> {
        names
            .iter()
            .map(|n| source.column(n).cloned().with_context(|| format!("unknown column '{n}'")))
            .collect()
    };
    let data = if args.data.is_empty() {
        source.columns.iter().filter(|c| c.is_numeric()).take(1).cloned().collect()
    } else {
        pick(&args.data)?
    };
    let group = pick(&args.group)?;
    let split = pick(&args.split)?;

    state.set_data_columns(data);
    if !group.is_empty() {
        state.set_group_by_columns(group);
    }
    if !args.aggregations.is_empty() {
        state.set_aggregations(args.aggregations.clone())?;
    }
    state.set_split_columns(split);
    state.toggle_multi_value_axes(args.multi_axis);
    state.set_stacked(args.stacked);
    state.set_value_as_percent(args.percent);

    let engine = AggregationEngine::new(config.clone());
    if let Err(err) = engine.refresh(&mut state, &source) {
        anyhow::bail!("cannot shape chart: {err}");
    }
    if let Some(warning) = state.warning() {
        tracing::warn!("{warning}");
    }

    let options = AxisConfigurator::new(config).configure(&state);
    let out = serde_json::json!({
        "state": format!("{state:?}"),
        "valueRange": state.value_range(),
        "downsampled": state.downsampled(),
        "dataset": state.dataset(),
        "options": options,
    });
    println!("{}", serde_json::to_string_pretty(&out)?);
    Ok(())
}

fn parse_args<I: Iterator<Item = String>>(mut it: I) -> Result<Args> {
    let mut args = Args::default();
    let list = |v: Option<String>, flag: &str| -> Result<Vec<String>> {
        let v = v.with_context(|| format!("{flag} needs a value"))?;
        Ok(v.split(',').map(|s| s.trim().to_string()).filter(|s| !s.is_empty()).collect())
    };
    while let Some(arg) = it.next() {
        match arg.as_str() {
            "--chart" => args.chart = it.next(),
            "--data" => args.data = list(it.next(), "--data")?,
            "--group" => args.group = list(it.next(), "--group")?,
            "--split" => args.split = list(it.next(), "--split")?,
            "--agg" => {
                args.aggregations = list(it.next(), "--agg")?
                    .iter()
                    .map(|a| parse_aggregation(a))
                    .collect::<Result<_>>()?
            }
            "--multi-axis" => args.multi_axis = true,
            "--stacked" => args.stacked = true,
            "--percent" => args.percent = true,
            "--config" => args.config = it.next().map(PathBuf::from),
            other if other.starts_with("--") => anyhow::bail!("unknown flag {other}"),
            other => args.input = PathBuf::from(other),
        }
    }
    if args.input.as_os_str().is_empty() {
        anyhow::bail!("usage: chart-demo <file.csv> [--chart bar] [--data a,b] [--group c] ...");
    }
    Ok(args)
}

fn parse_aggregation(s: &str) -> Result<Aggregation> {
    Ok(match s.to_ascii_lowercase().as_str() {
        "count" => Aggregation::Count,
        "sum" => Aggregation::Sum,
        "avg" | "average" => Aggregation::Average,
        "min" => Aggregation::Min,
        "max" => Aggregation::Max,
        other => anyhow::bail!("unknown aggregation '{other}'"),
    })
}

/// Load a headered CSV; column types are inferred from the non-empty cells.
fn load_csv(path: &Path) -> Result<RecordSource> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_path(path)
        .with_context(|| format!("opening {}", path.display()))?;

    let headers = rdr.headers()?.iter().map(|h| h.trim().to_string()).collect::<Vec<_>>();
    tracing::debug!(?headers, "csv headers");

    let mut rows: Vec<Vec<String>> = Vec::new();
    for (i, rec) in rdr.records().enumerate() {
        let rec = rec.with_context(|| format!("reading row {}", i + 1))?;
        rows.push(rec.iter().map(|c| c.trim().to_string()).collect());
    }

    let columns = headers
        .iter()
        .enumerate()
        .map(|(i, name)| Column::new(name.clone(), infer_type(rows.iter().filter_map(|r| r.get(i)))))
        .collect::<Vec<_>>();

    let entries = rows
        .iter()
        .map(|row| {
            columns
                .iter()
                .zip(row)
                .map(|(col, raw)| (col.name().to_string(), to_value(raw, col.data_type())))
                .collect::<Record>()
        })
        .collect();

    Ok(RecordSource::new(entries, columns))
}

fn infer_type<'a, I: Iterator<Item = &'a String>>(cells: I) -> DataType {
    let cells = cells.filter(|c| !c.is_empty()).collect::<Vec<_>>();
    if cells.is_empty() {
        return DataType::Text;
    }
    if cells.iter().all(|c| c.parse::<f64>().is_ok()) {
        DataType::Number
    } else if cells.iter().all(|c| c.eq_ignore_ascii_case("true") || c.eq_ignore_ascii_case("false")) {
        DataType::Boolean
    } else if cells.iter().all(|c| parse_time(&Value::Text(c.to_string())).is_some()) {
        DataType::Time
    } else {
        DataType::Text
    }
}

fn to_value(raw: &str, data_type: DataType) -> Value {
    if raw.is_empty() {
        return Value::Null;
    }
    match data_type {
        DataType::Number => raw.parse::<f64>().map(Value::Number).unwrap_or(Value::Null),
        DataType::Boolean => Value::Bool(raw.eq_ignore_ascii_case("true")),
        DataType::Time | DataType::Text => Value::Text(raw.to_string()),
    }
}
