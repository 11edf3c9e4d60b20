//! Configuration loading and validation.
//!
//! Every key is optional; present keys must hold valid values.

use std::path::PathBuf;

use crate::domain::chart::ChartStyle;
use crate::domain::error::QfError;
use crate::domain::frequency::Frequency;
use crate::domain::performance::PerformanceConfig;
use crate::ports::config_port::ConfigPort;

pub const DEFAULT_YAHOO_URL: &str = "https://query1.finance.yahoo.com/v8/finance/chart";
pub const DEFAULT_USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36";

#[derive(Debug, Clone, PartialEq)]
pub enum DataSource {
    Yahoo { base_url: String, user_agent: String },
    Csv { dir: PathBuf },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub data: DataSource,
    pub performance: PerformanceConfig,
    pub chart_style: ChartStyle,
    pub chart_dir: PathBuf,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            data: DataSource::Yahoo {
                base_url: DEFAULT_YAHOO_URL.into(),
                user_agent: DEFAULT_USER_AGENT.into(),
            },
            performance: PerformanceConfig::default(),
            chart_style: ChartStyle::default(),
            chart_dir: PathBuf::from("charts"),
        }
    }
}

impl Settings {
    pub fn from_config(config: &dyn ConfigPort) -> Result<Self, QfError> {
        validate_numeric(config, "performance", "risk_free_rate")?;
        validate_numeric(config, "performance", "required_return")?;
        for key in ["width", "height", "dpi"] {
            validate_positive(config, "chart", key)?;
        }

        let defaults = Settings::default();

        Ok(Settings {
            data: build_data_source(config)?,
            performance: PerformanceConfig {
                risk_free_rate: config.get_double("performance", "risk_free_rate", 0.0),
                required_return: config.get_double("performance", "required_return", 0.0),
                frequency: build_frequency(config)?,
            },
            chart_style: ChartStyle {
                width: config.get_double("chart", "width", defaults.chart_style.width),
                height: config.get_double("chart", "height", defaults.chart_style.height),
                dpi: config.get_double("chart", "dpi", defaults.chart_style.dpi),
                ..defaults.chart_style
            },
            chart_dir: config
                .get_string("chart", "output_dir")
                .map(PathBuf::from)
                .unwrap_or(defaults.chart_dir),
        })
    }
}

fn build_data_source(config: &dyn ConfigPort) -> Result<DataSource, QfError> {
    let source = config
        .get_string("data", "source")
        .unwrap_or_else(|| "yahoo".to_string());

    match source.trim().to_lowercase().as_str() {
        "yahoo" => Ok(DataSource::Yahoo {
            base_url: config
                .get_string("data", "base_url")
                .unwrap_or_else(|| DEFAULT_YAHOO_URL.to_string()),
            user_agent: config
                .get_string("data", "user_agent")
                .unwrap_or_else(|| DEFAULT_USER_AGENT.to_string()),
        }),
        "csv" => match config.get_string("data", "csv_dir") {
            Some(dir) if !dir.trim().is_empty() => Ok(DataSource::Csv {
                dir: PathBuf::from(dir.trim()),
            }),
            _ => Err(QfError::ConfigInvalid {
                section: "data".into(),
                key: "csv_dir".into(),
                reason: "csv_dir is required when source = csv".into(),
            }),
        },
        other => Err(QfError::ConfigInvalid {
            section: "data".into(),
            key: "source".into(),
            reason: format!("unknown source {other:?} (expected yahoo or csv)"),
        }),
    }
}

fn build_frequency(config: &dyn ConfigPort) -> Result<Frequency, QfError> {
    match config.get_string("performance", "frequency") {
        None => Ok(Frequency::Daily),
        Some(s) => s.parse().map_err(|_| QfError::ConfigInvalid {
            section: "performance".into(),
            key: "frequency".into(),
            reason: format!("unknown frequency {s:?}"),
        }),
    }
}

fn validate_numeric(config: &dyn ConfigPort, section: &str, key: &str) -> Result<(), QfError> {
    if let Some(raw) = config.get_string(section, key) {
        if !raw.trim().parse::<f64>().is_ok_and(f64::is_finite) {
            return Err(QfError::ConfigInvalid {
                section: section.into(),
                key: key.into(),
                reason: format!("{raw:?} is not a finite number"),
            });
        }
    }
    Ok(())
}

fn validate_positive(config: &dyn ConfigPort, section: &str, key: &str) -> Result<(), QfError> {
    validate_numeric(config, section, key)?;
    if config.get_string(section, key).is_some() && config.get_double(section, key, 0.0) <= 0.0 {
        return Err(QfError::ConfigInvalid {
            section: section.into(),
            key: key.into(),
            reason: format!("{key} must be positive"),
        });
    }
    Ok(())
}
