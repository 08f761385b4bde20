use anyhow::{bail, Context, Result};
use chrono::{Local, NaiveDate};
use clap::Parser;
use log::info;
use std::path::PathBuf;

use weather_core::algorithms::trends::TrendType;
use weather_core::core::domain::{AggregationLevel, DurationLevel};
use weather_core::core::metrics::MetricKey;
use weather_core::parsing::json_parser::parse_records_file;
use weather_core::preprocessing::PreprocessPipeline;
use weather_core::services::{analyze, compute_detail_data};
use weather_core::AnalysisConfig;

/// Analyze a JSON file of sensor readings and print the report as JSON.
#[derive(Parser, Debug)]
#[command(name = "weather-report")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// JSON file with raw sensor records
    #[arg(long, short = 'i')]
    input: PathBuf,

    /// TOML configuration (defaults to weather.toml in the standard locations)
    #[arg(long, short = 'c')]
    config: Option<PathBuf>,

    /// First local day to include (YYYY-MM-DD)
    #[arg(long)]
    from: Option<NaiveDate>,

    /// Last local day to include (YYYY-MM-DD)
    #[arg(long)]
    to: Option<NaiveDate>,

    /// raw, hourly, daily, weekly or monthly
    #[arg(long, short = 'a')]
    aggregation: Option<AggregationLevel>,

    /// none, linear, logarithmic, exponential, power, polynomial or movingAverage
    #[arg(long, short = 't')]
    trend: Option<TrendType>,

    #[arg(long)]
    polynomial_order: Option<usize>,

    #[arg(long)]
    moving_average_period: Option<usize>,

    /// weekly, monthly or annually
    #[arg(long)]
    duration_level: Option<DurationLevel>,

    /// Metric to analyze; repeat for several (default: all)
    #[arg(long = "metric", short = 'm')]
    metrics: Vec<MetricKey>,

    /// Print the detail snapshot of one bucket (e.g. "05/01/2024") instead of the report
    #[arg(long)]
    detail_bucket: Option<String>,

    /// Pretty-print the JSON output
    #[arg(long)]
    pretty: bool,
}

fn load_config(cli: &Cli) -> Result<AnalysisConfig> {
    match &cli.config {
        Some(path) => AnalysisConfig::from_file(path)
            .with_context(|| format!("Failed to load config {}", path.display())),
        None => match AnalysisConfig::find_default_location() {
            Some(path) => {
                info!("Using configuration {}", path.display());
                AnalysisConfig::from_file(&path)
                    .with_context(|| format!("Failed to load config {}", path.display()))
            }
            None => Ok(AnalysisConfig::default()),
        },
    }
}

fn apply_overrides(cli: &Cli, config: &mut AnalysisConfig) {
    let analysis = &mut config.analysis;
    if let Some(aggregation) = cli.aggregation {
        analysis.aggregation = aggregation;
    }
    if let Some(trend) = cli.trend {
        analysis.trend = trend;
    }
    if let Some(order) = cli.polynomial_order {
        analysis.polynomial_order = order;
    }
    if let Some(period) = cli.moving_average_period {
        analysis.moving_average_period = period;
    }
    if let Some(level) = cli.duration_level {
        analysis.duration_level = level;
    }
    if !cli.metrics.is_empty() {
        analysis.metrics = cli.metrics.clone();
    }
    if cli.from.is_some() {
        config.filter.from = cli.from;
    }
    if cli.to.is_some() {
        config.filter.to = cli.to;
    }
}

fn to_json<T: serde::Serialize>(value: &T, pretty: bool) -> Result<String> {
    let json = if pretty {
        serde_json::to_string_pretty(value)
    } else {
        serde_json::to_string(value)
    };
    json.context("Failed to serialize output")
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let mut config = load_config(&cli)?;
    apply_overrides(&cli, &mut config);
    let request = config.to_request().context("Invalid analysis settings")?;
    let catalog = config.catalog().context("Invalid metric overrides")?;

    let records = parse_records_file(&cli.input)?;
    info!("Loaded {} records from {}", records.len(), cli.input.display());

    let output = match &cli.detail_bucket {
        Some(label) => {
            let Some(level) = request.aggregation.bucket_level() else {
                bail!("--detail-bucket needs an aggregation level other than raw");
            };
            let metric = request
                .effective_metrics()
                .first()
                .copied()
                .unwrap_or(MetricKey::Temperature);
            let points = PreprocessPipeline::with_timezone(Local, request.selection.clone())
                .process(&records)
                .points;
            let detail = compute_detail_data(&points, level, label, metric, &Local)?;
            to_json(&detail, cli.pretty)?
        }
        None => to_json(&analyze(&records, &request, &catalog), cli.pretty)?,
    };

    println!("{}", output);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use weather_core::transformations::DateRange;

    #[test]
    fn test_cli_flags_override_config() {
        let cli = Cli::parse_from([
            "weather-report",
            "--input",
            "readings.json",
            "--aggregation",
            "daily",
            "--trend",
            "movingAverage",
            "--metric",
            "humidity",
            "--from",
            "2024-01-01",
        ]);
        let mut config = AnalysisConfig::default();
        apply_overrides(&cli, &mut config);

        assert_eq!(config.analysis.aggregation, AggregationLevel::Daily);
        assert_eq!(config.analysis.trend, TrendType::MovingAverage);
        assert_eq!(config.analysis.metrics, vec![MetricKey::Humidity]);
        assert_eq!(config.filter.from, NaiveDate::from_ymd_opt(2024, 1, 1));
        assert_eq!(config.filter.to, None);
    }

    #[test]
    fn test_unknown_aggregation_is_rejected() {
        let result = Cli::try_parse_from([
            "weather-report",
            "--input",
            "readings.json",
            "--aggregation",
            "fortnightly",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_date_range_flags_are_validated() {
        let cli = Cli::parse_from([
            "weather-report",
            "--input",
            "readings.json",
            "--from",
            "2024-02-01",
            "--to",
            "2024-01-01",
        ]);
        let mut config = AnalysisConfig::default();
        apply_overrides(&cli, &mut config);
        assert!(DateRange::new(config.filter.from, config.filter.to).is_err());
        assert!(config.to_request().is_err());
    }
}
