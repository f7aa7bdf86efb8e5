//! CLI definition and dispatch.

use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::{info, warn};

use crate::adapters::csv_adapter::CsvAdapter;
use crate::adapters::csv_report_adapter::CsvReportAdapter;
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::adapters::svg_report::SvgReportAdapter;
use crate::domain::backtest::{self as backtest_engine, BacktestConfig, BacktestResult};
use crate::domain::config_validation::{
    chart_dimension, parse_optional_date, validate_backtest_config,
};
use crate::domain::error::MomrevError;
use crate::domain::metrics::Metrics;
use crate::domain::signal::{MOMENTUM_LOOKBACK, MOMENTUM_TOP_N, REVERSION_BOTTOM_N};
use crate::domain::universe::{load_price_table, parse_tickers, Universe};
use crate::ports::config_port::ConfigPort;
use crate::ports::data_port::DataPort;
use crate::ports::report_port::ReportPort;

pub const DEFAULT_CHART_PATH: &str = "cumulative_returns.svg";
pub const DEFAULT_CHART_WIDTH: u32 = 1200;
pub const DEFAULT_CHART_HEIGHT: u32 = 600;

#[derive(Parser, Debug)]
#[command(
    name = "momrev",
    about = "Momentum vs. mean-reversion equity backtester"
)]
pub struct Cli {
    /// Defaults to `backtest` with built-in parameters
    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run both strategies and write the comparison chart
    Backtest {
        #[arg(short, long)]
        config: Option<PathBuf>,
        /// Chart output path
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Also write daily and cumulative returns as CSV
        #[arg(long)]
        csv_out: Option<PathBuf>,
        /// Read `<TICKER>.csv` files from this directory instead of downloading
        #[arg(long)]
        data_dir: Option<PathBuf>,
    },
    /// Validate a configuration file and print the resolved parameters
    Validate {
        #[arg(short, long)]
        config: PathBuf,
    },
    /// Download adjusted closes into a directory of CSV files
    Fetch {
        #[arg(short, long)]
        config: Option<PathBuf>,
        #[arg(long)]
        out_dir: PathBuf,
    },
}

pub fn run(cli: Cli) -> ExitCode {
    match execute(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            (&e).into()
        }
    }
}

pub fn execute(cli: Cli) -> Result<(), MomrevError> {
    let command = cli.command.unwrap_or(Command::Backtest {
        config: None,
        output: None,
        csv_out: None,
        data_dir: None,
    });

    match command {
        Command::Backtest {
            config,
            output,
            csv_out,
            data_dir,
        } => run_backtest(
            config.as_deref(),
            output.as_deref(),
            csv_out.as_deref(),
            data_dir.as_deref(),
        ),
        Command::Validate { config } => run_validate(&config),
        Command::Fetch { config, out_dir } => run_fetch(config.as_deref(), &out_dir),
    }
}

/// Loads the INI file at `path`, or an empty configuration when none is given
/// so every key falls back to its default.
pub fn load_config(path: Option<&Path>) -> Result<FileConfigAdapter, MomrevError> {
    match path {
        Some(path) => {
            info!(path = %path.display(), "loading config");
            FileConfigAdapter::from_file(path)
        }
        None => FileConfigAdapter::from_string(""),
    }
}

pub fn build_backtest_config(config: &dyn ConfigPort) -> Result<BacktestConfig, MomrevError> {
    let defaults = BacktestConfig::default();

    let universe = match config.get_string("backtest", "tickers") {
        Some(list) => Universe::new(
            parse_tickers(&list)
                .map_err(|e| MomrevError::config_invalid("backtest", "tickers", e.to_string()))?,
        ),
        None => defaults.universe,
    };

    let start_date = parse_optional_date(config, "start_date")?.unwrap_or(defaults.start_date);
    let end_date = parse_optional_date(config, "end_date")?.unwrap_or(defaults.end_date);
    if start_date >= end_date {
        return Err(MomrevError::config_invalid(
            "backtest",
            "start_date",
            "start_date must be before end_date",
        ));
    }

    Ok(BacktestConfig {
        universe,
        start_date,
        end_date,
        lookback: positive(config, "momentum", "lookback", MOMENTUM_LOOKBACK)?,
        top_n: positive(config, "momentum", "top_n", MOMENTUM_TOP_N)?,
        bottom_n: positive(config, "mean_reversion", "bottom_n", REVERSION_BOTTOM_N)?,
        risk_free_rate: config
            .get_double("backtest", "risk_free_rate")?
            .unwrap_or(defaults.risk_free_rate),
    })
}

fn positive(
    config: &dyn ConfigPort,
    section: &str,
    key: &str,
    default: usize,
) -> Result<usize, MomrevError> {
    match config.get_int(section, key)? {
        None => Ok(default),
        Some(value) => usize::try_from(value)
            .ok()
            .filter(|v| *v >= 1)
            .ok_or_else(|| {
                MomrevError::config_invalid(section, key, format!("{key} must be at least 1"))
            }),
    }
}

/// Where and how the run's artifacts are written.
#[derive(Debug, Clone, PartialEq)]
pub struct ReportSettings {
    pub chart_path: PathBuf,
    pub csv_path: Option<PathBuf>,
    pub width: u32,
    pub height: u32,
    /// Print the metric summary to stderr.
    pub summary: bool,
}

impl ReportSettings {
    pub fn from_config(
        config: &dyn ConfigPort,
        chart_override: Option<&Path>,
        csv_override: Option<&Path>,
    ) -> Result<Self, MomrevError> {
        let chart_path = chart_override
            .map(Path::to_path_buf)
            .or_else(|| config.get_string("report", "chart_path").map(PathBuf::from))
            .unwrap_or_else(|| PathBuf::from(DEFAULT_CHART_PATH));
        let csv_path = csv_override
            .map(Path::to_path_buf)
            .or_else(|| config.get_string("report", "csv_path").map(PathBuf::from));

        Ok(Self {
            chart_path,
            csv_path,
            width: chart_dimension(config, "width")?.unwrap_or(DEFAULT_CHART_WIDTH),
            height: chart_dimension(config, "height")?.unwrap_or(DEFAULT_CHART_HEIGHT),
            summary: config.get_bool("report", "summary")?.unwrap_or(true),
        })
    }
}

/// Price source selected by `[data] source` or a `--data-dir` override.
#[derive(Debug, Clone, PartialEq)]
pub enum DataSource {
    Yahoo,
    Csv(PathBuf),
}

impl DataSource {
    pub fn from_config(config: &dyn ConfigPort, dir_override: Option<&Path>) -> Self {
        if let Some(dir) = dir_override {
            return DataSource::Csv(dir.to_path_buf());
        }
        match (
            config.get_string("data", "source").as_deref(),
            config.get_string("data", "csv_dir"),
        ) {
            (Some("csv"), Some(dir)) => DataSource::Csv(PathBuf::from(dir)),
            _ => DataSource::Yahoo,
        }
    }

    pub fn open(&self) -> Result<Box<dyn DataPort>, MomrevError> {
        match self {
            DataSource::Csv(dir) => Ok(Box::new(CsvAdapter::new(dir.clone()))),
            DataSource::Yahoo => open_yahoo(),
        }
    }
}

#[cfg(feature = "yahoo")]
fn open_yahoo() -> Result<Box<dyn DataPort>, MomrevError> {
    let adapter = crate::adapters::yahoo_adapter::YahooAdapter::new()?;
    Ok(Box::new(adapter))
}

#[cfg(not(feature = "yahoo"))]
fn open_yahoo() -> Result<Box<dyn DataPort>, MomrevError> {
    Err(MomrevError::DataSource {
        reason: "built without the yahoo feature; use --data-dir or [data] source = csv"
            .to_string(),
    })
}

fn run_backtest(
    config_path: Option<&Path>,
    chart_override: Option<&Path>,
    csv_override: Option<&Path>,
    data_dir: Option<&Path>,
) -> Result<(), MomrevError> {
    let config = load_config(config_path)?;
    validate_backtest_config(&config)?;

    let bt_config = build_backtest_config(&config)?;
    let settings = ReportSettings::from_config(&config, chart_override, csv_override)?;
    let data_port = DataSource::from_config(&config, data_dir).open()?;

    run_backtest_pipeline(data_port.as_ref(), &bt_config, &settings)?;
    Ok(())
}

/// Loads prices, runs both strategies and writes every configured artifact.
pub fn run_backtest_pipeline(
    data_port: &dyn DataPort,
    bt_config: &BacktestConfig,
    settings: &ReportSettings,
) -> Result<BacktestResult, MomrevError> {
    info!(
        tickers = bt_config.universe.count(),
        start = %bt_config.start_date,
        end = %bt_config.end_date,
        "loading prices"
    );
    let prices = load_price_table(
        data_port,
        &bt_config.universe,
        bt_config.start_date,
        bt_config.end_date,
    )?;

    if prices.len() <= bt_config.lookback {
        warn!(
            sessions = prices.len(),
            lookback = bt_config.lookback,
            "history shorter than the momentum lookback; momentum holds nothing"
        );
    }

    let result = backtest_engine::run_backtest(&prices, bt_config);

    if settings.summary {
        print_summary(&result, bt_config.risk_free_rate);
    }

    SvgReportAdapter::new(settings.width, settings.height).write(&result, &settings.chart_path)?;
    eprintln!("\nChart written to: {}", settings.chart_path.display());

    if let Some(csv_path) = &settings.csv_path {
        CsvReportAdapter.write(&result, csv_path)?;
        eprintln!("Returns written to: {}", csv_path.display());
    }

    Ok(result)
}

pub fn print_summary(result: &BacktestResult, risk_free_rate: f64) {
    for strategy in result.strategies() {
        let metrics = Metrics::compute(&strategy.daily_returns, risk_free_rate);
        eprintln!("\n=== {} ({}) ===", strategy.name, strategy.rebalance);
        eprintln!("Final Value:      {:.4}", strategy.final_value());
        eprintln!("Total Return:     {:.2}%", metrics.total_return * 100.0);
        eprintln!("Annualized:       {:.2}%", metrics.annualized_return * 100.0);
        eprintln!(
            "Volatility:       {:.2}%",
            metrics.annualized_volatility * 100.0
        );
        eprintln!("Sharpe Ratio:     {:.2}", metrics.sharpe_ratio);
        eprintln!("Max Drawdown:     -{:.1}%", metrics.max_drawdown * 100.0);
        eprintln!("Drawdown Days:    {}", metrics.max_drawdown_duration);
        eprintln!("Trading Days:     {}", metrics.trading_days);
    }
}

fn run_validate(config_path: &Path) -> Result<(), MomrevError> {
    let config = load_config(Some(config_path))?;
    validate_backtest_config(&config)?;
    let bt_config = build_backtest_config(&config)?;
    let settings = ReportSettings::from_config(&config, None, None)?;
    let source = DataSource::from_config(&config, None);

    println!("Configuration is valid");
    println!("  tickers:        {}", bt_config.universe.tickers.join(", "));
    println!(
        "  period:         {} to {} (exclusive)",
        bt_config.start_date, bt_config.end_date
    );
    println!(
        "  momentum:       top {} by {}-day return, monthly",
        bt_config.top_n, bt_config.lookback
    );
    println!(
        "  mean reversion: bottom {} by 1-week return, weekly (Fri)",
        bt_config.bottom_n
    );
    println!("  risk-free rate: {}", bt_config.risk_free_rate);
    match source {
        DataSource::Yahoo => println!("  data:           yahoo"),
        DataSource::Csv(dir) => println!("  data:           csv ({})", dir.display()),
    }
    println!(
        "  chart:          {} ({}x{})",
        settings.chart_path.display(),
        settings.width,
        settings.height
    );
    if let Some(csv_path) = settings.csv_path {
        println!("  csv:            {}", csv_path.display());
    }
    Ok(())
}

fn run_fetch(config_path: Option<&Path>, out_dir: &Path) -> Result<(), MomrevError> {
    let config = load_config(config_path)?;
    validate_backtest_config(&config)?;
    let bt_config = build_backtest_config(&config)?;
    let data_port = open_yahoo()?;

    fetch_to_csv(data_port.as_ref(), &bt_config, out_dir)
}

/// Copies every universe member's closes from `data_port` into
/// `<out_dir>/<TICKER>.csv`.
pub fn fetch_to_csv(
    data_port: &dyn DataPort,
    bt_config: &BacktestConfig,
    out_dir: &Path,
) -> Result<(), MomrevError> {
    let writer = CsvAdapter::new(out_dir.to_path_buf());
    for ticker in &bt_config.universe.tickers {
        let bars = data_port.fetch_closes(ticker, bt_config.start_date, bt_config.end_date)?;
        if bars.is_empty() {
            return Err(MomrevError::NoData {
                ticker: ticker.clone(),
            });
        }
        let path = writer.write_closes(ticker, &bars)?;
        info!(ticker = %ticker, bars = bars.len(), path = %path.display(), "saved closes");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn config(ini: &str) -> FileConfigAdapter {
        FileConfigAdapter::from_string(ini).unwrap()
    }

    #[test]
    fn no_subcommand_parses() {
        let cli = Cli::try_parse_from(["momrev"]).unwrap();
        assert!(cli.command.is_none());
    }

    #[test]
    fn backtest_flags_parse() {
        let cli = Cli::try_parse_from([
            "momrev",
            "backtest",
            "-c",
            "run.ini",
            "-o",
            "out.svg",
            "--csv-out",
            "out.csv",
            "--data-dir",
            "prices",
        ])
        .unwrap();
        match cli.command {
            Some(Command::Backtest {
                config,
                output,
                csv_out,
                data_dir,
            }) => {
                assert_eq!(config, Some(PathBuf::from("run.ini")));
                assert_eq!(output, Some(PathBuf::from("out.svg")));
                assert_eq!(csv_out, Some(PathBuf::from("out.csv")));
                assert_eq!(data_dir, Some(PathBuf::from("prices")));
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn validate_requires_config() {
        assert!(Cli::try_parse_from(["momrev", "validate"]).is_err());
    }

    #[test]
    fn empty_config_builds_the_default_run() {
        let built = build_backtest_config(&config("")).unwrap();
        assert_eq!(built, BacktestConfig::default());
    }

    #[test]
    fn config_overrides_defaults() {
        let built = build_backtest_config(&config(
            "[backtest]\ntickers = xom, pg\nstart_date = 2020-01-01\nend_date = 2021-01-01\nrisk_free_rate = 0.03\n\
             [momentum]\nlookback = 126\ntop_n = 1\n[mean_reversion]\nbottom_n = 2\n",
        ))
        .unwrap();

        assert_eq!(built.universe.tickers, vec!["XOM", "PG"]);
        assert_eq!(built.start_date, NaiveDate::from_ymd_opt(2020, 1, 1).unwrap());
        assert_eq!(built.end_date, NaiveDate::from_ymd_opt(2021, 1, 1).unwrap());
        assert_eq!(built.lookback, 126);
        assert_eq!(built.top_n, 1);
        assert_eq!(built.bottom_n, 2);
        assert_eq!(built.risk_free_rate, 0.03);
    }

    #[test]
    fn start_after_default_end_is_rejected() {
        let err = build_backtest_config(&config("[backtest]\nstart_date = 2030-01-01\n")).unwrap_err();
        assert!(matches!(err, MomrevError::ConfigInvalid { ref key, .. } if key == "start_date"));
    }

    #[test]
    fn negative_top_n_is_rejected() {
        let err = build_backtest_config(&config("[momentum]\ntop_n = -1\n")).unwrap_err();
        assert!(matches!(err, MomrevError::ConfigInvalid { ref key, .. } if key == "top_n"));
    }

    #[test]
    fn unparseable_numbers_are_rejected_not_defaulted() {
        for (ini, key) in [
            ("[momentum]\ntop_n = two\n", "top_n"),
            ("[momentum]\nlookback = 12m\n", "lookback"),
            ("[backtest]\nrisk_free_rate = 5%\n", "risk_free_rate"),
        ] {
            let err = build_backtest_config(&config(ini)).unwrap_err();
            assert!(
                matches!(err, MomrevError::ConfigInvalid { key: ref k, .. } if k == key),
                "{ini}: {err:?}"
            );
        }
    }

    #[test]
    fn unparseable_report_values_are_rejected() {
        for (ini, key) in [
            ("[report]\nwidth = wide\n", "width"),
            ("[report]\nheight = 0\n", "height"),
            ("[report]\nsummary = maybe\n", "summary"),
        ] {
            let err = ReportSettings::from_config(&config(ini), None, None).unwrap_err();
            assert!(
                matches!(err, MomrevError::ConfigInvalid { key: ref k, .. } if k == key),
                "{ini}: {err:?}"
            );
        }
    }

    #[test]
    fn report_settings_defaults() {
        let settings = ReportSettings::from_config(&config(""), None, None).unwrap();
        assert_eq!(settings.chart_path, PathBuf::from(DEFAULT_CHART_PATH));
        assert_eq!(settings.csv_path, None);
        assert_eq!(settings.width, DEFAULT_CHART_WIDTH);
        assert_eq!(settings.height, DEFAULT_CHART_HEIGHT);
        assert!(settings.summary);
    }

    #[test]
    fn report_settings_flags_win_over_config() {
        let cfg = config("[report]\nchart_path = a.svg\ncsv_path = a.csv\nwidth = 640\nsummary = off\n");
        let settings = ReportSettings::from_config(&cfg, Some(Path::new("b.svg")), None).unwrap();
        assert_eq!(settings.chart_path, PathBuf::from("b.svg"));
        assert_eq!(settings.csv_path, Some(PathBuf::from("a.csv")));
        assert_eq!(settings.width, 640);
        assert!(!settings.summary);
    }

    #[test]
    fn data_source_selection() {
        assert_eq!(DataSource::from_config(&config(""), None), DataSource::Yahoo);
        assert_eq!(
            DataSource::from_config(&config("[data]\nsource = csv\ncsv_dir = px\n"), None),
            DataSource::Csv(PathBuf::from("px"))
        );
        assert_eq!(
            DataSource::from_config(&config(""), Some(Path::new("local"))),
            DataSource::Csv(PathBuf::from("local"))
        );
    }
}
