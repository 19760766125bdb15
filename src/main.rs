use std::io::Read;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{info, warn};

use aqi_forecast::config::{Config, DEFAULT_CONFIG_PATH};
use aqi_forecast::domain::{ForecastMethod, ForecastRequest, HistoricalPoint, TimeSeries};
use aqi_forecast::forecast::ForecastingService;
use aqi_forecast::telemetry::init_tracing;

#[derive(Parser, Debug)]
#[command(version, about = "Offline AQI forecaster", long_about = None)]
struct Args {
    /// JSON array of `{"date": "YYYY-MM-DD", "aqi": N}` observations, or `-` for stdin
    #[arg(short, long, required_unless_present = "list_methods")]
    input: Option<String>,

    /// Days to forecast (defaults to the configured horizon)
    #[arg(long)]
    horizon: Option<usize>,

    /// linear, moving_average, exponential_smoothing, seasonal, arima or ensemble
    #[arg(short, long)]
    method: Option<ForecastMethod>,

    /// Path to config file
    #[arg(short, long, default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,

    /// Pretty-print JSON output
    #[arg(long)]
    pretty: bool,

    /// Print the method catalogue and exit
    #[arg(long)]
    list_methods: bool,

    /// Score every single-model method on the input instead of forecasting
    #[arg(long, conflicts_with = "list_methods")]
    backtest: bool,
}

fn read_history(input: &str) -> Result<Vec<HistoricalPoint>> {
    let raw = if input == "-" {
        let mut buf = String::new();
        std::io::stdin()
            .read_to_string(&mut buf)
            .context("failed to read history from stdin")?;
        buf
    } else {
        std::fs::read_to_string(input).with_context(|| format!("failed to read {input}"))?
    };
    serde_json::from_str(&raw).context("history must be a JSON array of {date, aqi} objects")
}

fn print_json<T: serde::Serialize>(value: &T, pretty: bool) -> Result<()> {
    let out = if pretty {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    };
    println!("{out}");
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let args = Args::parse();
    let cfg = Config::load_from(&args.config)?;
    init_tracing(&cfg.logging)?;

    let service = ForecastingService::new(cfg.forecast.clone());

    if args.list_methods {
        return print_json(&service.method_catalogue(), args.pretty);
    }

    let input = args.input.as_deref().context("--input is required")?;
    let history = read_history(input)?;

    if args.backtest {
        let series = TimeSeries::new(&history).context("history is not a valid series")?;
        let report: Vec<_> = service
            .available_methods()
            .into_iter()
            .filter_map(|method| {
                service
                    .backtest(&series, method)
                    .map(|metrics| serde_json::json!({ "method": method, "metrics": metrics }))
            })
            .collect();
        return print_json(&report, args.pretty);
    }

    let request = ForecastRequest::new(
        history,
        args.horizon.unwrap_or(cfg.forecast.default_horizon_days),
        args.method.unwrap_or(cfg.forecast.default_method),
    );
    let result = service.forecast_concurrent(&request).await?;

    for alert in result.alerts(cfg.forecast.alert_threshold) {
        warn!(date = %alert.date, aqi = alert.aqi, category = %alert.category, "{}", alert.message);
    }
    if let Some(peak) = result.peak() {
        info!(date = %peak.date, aqi = peak.rounded_aqi(), "forecast peak");
    }

    print_json(&result, args.pretty)
}
