//! CLI definition and dispatch.

use clap::{Parser, Subcommand};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::debug;

use crate::adapters::csv_adapter::{read_price_file, CsvAdapter};
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::adapters::result_table_csv::{read_result_table, read_returns};
use crate::adapters::svg_chart::SvgChartAdapter;
use crate::adapters::yahoo_adapter::YahooAdapter;
use crate::domain::date_aligner::get_start_date;
use crate::domain::error::QfError;
use crate::domain::exporter::download_csv_data;
use crate::domain::frequency::Frequency;
use crate::domain::performance::PerformanceSummary;
use crate::domain::returns::{simple_returns, values};
use crate::domain::settings::{DataSource, Settings};
use crate::domain::visualizer::visualize_results;
use crate::ports::data_port::DataPort;

#[derive(Parser, Debug)]
#[command(name = "qfkit", about = "Quantitative finance helpers for backtest preparation")]
pub struct Cli {
    /// INI configuration file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Shift a backtest start date back by a warm-up period of trading days
    StartDate {
        #[arg(long)]
        ticker: String,
        #[arg(long)]
        start: String,
        #[arg(long)]
        days_prior: usize,
    },
    /// Print performance statistics of a returns series
    Summary {
        /// CSV with `date,returns` columns, or a price file with --prices
        #[arg(long)]
        returns: PathBuf,
        /// Treat the input as a price file and derive returns from closes
        #[arg(long)]
        prices: bool,
        /// Override the configured sampling frequency
        #[arg(long)]
        freq: Option<Frequency>,
    },
    /// Chart a backtest result table and print the final portfolio value
    Visualize {
        #[arg(short, long)]
        input: PathBuf,
        #[arg(long)]
        title: String,
        #[arg(long, default_value = "$")]
        currency: String,
        #[arg(long)]
        chart_dir: Option<PathBuf>,
    },
    /// Download price history into a CSV file and chart the closing price
    Download {
        #[arg(long)]
        ticker: String,
        #[arg(long)]
        start: String,
        #[arg(long)]
        end: String,
        #[arg(short, long)]
        output: PathBuf,
        #[arg(long, default_value = "daily")]
        freq: Frequency,
        #[arg(long)]
        chart_dir: Option<PathBuf>,
    },
}

pub fn run(cli: Cli) -> ExitCode {
    let settings = match load_settings(cli.config.as_deref()) {
        Ok(s) => s,
        Err(e) => return report(&e),
    };

    let outcome = match cli.command {
        Command::StartDate {
            ticker,
            start,
            days_prior,
        } => run_start_date(&settings, &ticker, &start, days_prior),
        Command::Summary {
            returns,
            prices,
            freq,
        } => run_summary(&settings, &returns, prices, freq),
        Command::Visualize {
            input,
            title,
            currency,
            chart_dir,
        } => run_visualize(&settings, &input, &title, &currency, chart_dir),
        Command::Download {
            ticker,
            start,
            end,
            output,
            freq,
            chart_dir,
        } => run_download(&settings, &ticker, &start, &end, &output, freq, chart_dir),
    };

    match outcome {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => report(&e),
    }
}

fn report(err: &QfError) -> ExitCode {
    eprintln!("error: {err}");
    ExitCode::from(err)
}

pub fn load_settings(path: Option<&Path>) -> Result<Settings, QfError> {
    let adapter = match path {
        Some(path) => {
            debug!(path = %path.display(), "loading config");
            FileConfigAdapter::from_file(path).map_err(|e| QfError::ConfigParse {
                file: path.display().to_string(),
                reason: e.to_string(),
            })?
        }
        None => FileConfigAdapter::empty(),
    };
    Settings::from_config(&adapter)
}

pub fn build_data_port(settings: &Settings) -> Box<dyn DataPort> {
    match &settings.data {
        DataSource::Yahoo {
            base_url,
            user_agent,
        } => Box::new(YahooAdapter::new(base_url.as_str(), user_agent.as_str())),
        DataSource::Csv { dir } => Box::new(CsvAdapter::new(dir.clone())),
    }
}

pub fn print_summary(summary: &PerformanceSummary, out: &mut dyn Write) -> io::Result<()> {
    for (name, value) in summary.fields() {
        writeln!(out, "{name:<20}{value:>14.6}")?;
    }
    Ok(())
}

fn run_start_date(
    settings: &Settings,
    ticker: &str,
    start: &str,
    days_prior: usize,
) -> Result<(), QfError> {
    let data = build_data_port(settings);
    let adjusted = get_start_date(data.as_ref(), ticker, start, days_prior)?;
    println!("{}", adjusted.format("%Y-%m-%d"));
    Ok(())
}

fn run_summary(
    settings: &Settings,
    path: &Path,
    prices: bool,
    freq: Option<Frequency>,
) -> Result<(), QfError> {
    let series = if prices {
        simple_returns(&read_price_file(path)?)
    } else {
        read_returns(path)?
    };

    let mut config = settings.performance;
    if let Some(freq) = freq {
        config.frequency = freq;
    }

    debug!(periods = series.len(), frequency = %config.frequency, "summarizing returns");
    let summary = PerformanceSummary::compute(&values(&series), &config);
    print_summary(&summary, &mut io::stdout().lock())?;
    Ok(())
}

fn run_visualize(
    settings: &Settings,
    input: &Path,
    title: &str,
    currency: &str,
    chart_dir: Option<PathBuf>,
) -> Result<(), QfError> {
    let rows = read_result_table(input)?;
    let mut chart = SvgChartAdapter::new(chart_dir.unwrap_or_else(|| settings.chart_dir.clone()));

    visualize_results(
        &rows,
        title,
        currency,
        &settings.chart_style,
        &mut chart,
        &mut io::stdout().lock(),
    )?;

    for path in chart.written() {
        eprintln!("Chart written to: {}", path.display());
    }
    Ok(())
}

fn run_download(
    settings: &Settings,
    ticker: &str,
    start: &str,
    end: &str,
    output: &Path,
    freq: Frequency,
    chart_dir: Option<PathBuf>,
) -> Result<(), QfError> {
    let data = build_data_port(settings);
    let mut chart = SvgChartAdapter::new(chart_dir.unwrap_or_else(|| settings.chart_dir.clone()));

    let rows = download_csv_data(
        data.as_ref(),
        ticker,
        start,
        end,
        output,
        freq,
        &settings.chart_style,
        &mut chart,
    )?;

    eprintln!("{} rows written to: {}", rows, output.display());
    for path in chart.written() {
        eprintln!("Chart written to: {}", path.display());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::performance::PerformanceConfig;

    #[test]
    fn parses_download_arguments() {
        let cli = Cli::try_parse_from([
            "qfkit",
            "-c",
            "qf.ini",
            "download",
            "--ticker",
            "AAPL",
            "--start",
            "2017-01-01",
            "--end",
            "2017-12-31",
            "-o",
            "aapl.csv",
            "--freq",
            "weekly",
        ])
        .unwrap();

        assert_eq!(cli.config, Some(PathBuf::from("qf.ini")));
        match cli.command {
            Command::Download { ticker, freq, output, .. } => {
                assert_eq!(ticker, "AAPL");
                assert_eq!(freq, Frequency::Weekly);
                assert_eq!(output, PathBuf::from("aapl.csv"));
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn visualize_currency_defaults_to_dollar() {
        let cli = Cli::try_parse_from(["qfkit", "visualize", "-i", "perf.csv", "--title", "SMA"])
            .unwrap();
        match cli.command {
            Command::Visualize { currency, .. } => assert_eq!(currency, "$"),
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn rejects_unknown_frequency() {
        let result = Cli::try_parse_from([
            "qfkit", "summary", "--returns", "r.csv", "--freq", "hourly",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn settings_default_without_config() {
        assert_eq!(load_settings(None).unwrap(), Settings::default());
    }

    #[test]
    fn missing_config_file_is_parse_error() {
        let err = load_settings(Some(Path::new("/nonexistent/qf.ini"))).unwrap_err();
        assert!(matches!(err, QfError::ConfigParse { .. }));
    }

    #[test]
    fn summary_lines_are_aligned() {
        let summary = PerformanceSummary::compute(&[0.01, -0.01, 0.02], &PerformanceConfig::default());
        let mut out = Vec::new();
        print_summary(&summary, &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines.len(), 6);
        assert!(lines[0].starts_with("annualized_returns"));
        assert!(lines[5].starts_with("max_drawdown"));
        assert!(lines[5].ends_with("-0.010000"));
    }
}
