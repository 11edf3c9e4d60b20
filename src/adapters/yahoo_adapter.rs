//! Yahoo Finance price data adapter.
//!
//! Talks to the v8 chart endpoint:
//! `{base_url}/{ticker}?period1=..&period2=..&interval=1d|1wk|1mo`.
//! Response parsing is always compiled; the HTTP client sits behind the
//! `yahoo` feature.

use chrono::{DateTime, Datelike, Duration, NaiveDate};
use serde::Deserialize;
use tracing::{debug, warn};

use crate::domain::error::QfError;
use crate::domain::frequency::Frequency;
use crate::domain::ohlcv::PriceBar;
use crate::ports::data_port::DataPort;

#[derive(Debug, Deserialize)]
struct ChartResponse {
    chart: ChartEnvelope,
}

#[derive(Debug, Deserialize)]
struct ChartEnvelope {
    result: Option<Vec<ChartData>>,
    error: Option<ApiError>,
}

#[derive(Debug, Deserialize)]
struct ApiError {
    code: String,
    description: String,
}

#[derive(Debug, Deserialize)]
struct ChartData {
    #[serde(default)]
    meta: Option<ChartMeta>,
    #[serde(default)]
    timestamp: Vec<i64>,
    indicators: Indicators,
}

#[derive(Debug, Deserialize)]
struct ChartMeta {
    #[serde(default)]
    gmtoffset: i64,
}

#[derive(Debug, Deserialize)]
struct Indicators {
    quote: Vec<QuoteData>,
}

#[derive(Debug, Deserialize)]
struct QuoteData {
    #[serde(default)]
    open: Vec<Option<f64>>,
    #[serde(default)]
    high: Vec<Option<f64>>,
    #[serde(default)]
    low: Vec<Option<f64>>,
    #[serde(default)]
    close: Vec<Option<f64>>,
    #[serde(default)]
    volume: Vec<Option<i64>>,
}

pub struct YahooAdapter {
    base_url: String,
    user_agent: String,
}

impl YahooAdapter {
    pub fn new(base_url: impl Into<String>, user_agent: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            user_agent: user_agent.into(),
        }
    }

    /// Seconds since the epoch at midnight UTC of `date`.
    fn epoch_seconds(date: NaiveDate) -> i64 {
        date.and_hms_opt(0, 0, 0)
            .map(|dt| dt.and_utc().timestamp())
            .unwrap_or_default()
    }

    /// Request URL covering `[start_date, end_date]`; `period2` is exclusive,
    /// so it points at the midnight after `end_date`.
    fn build_url(&self, ticker: &str, start_date: NaiveDate, end_date: NaiveDate, freq: Frequency) -> String {
        format!(
            "{}/{}?period1={}&period2={}&interval={}&events=history",
            self.base_url,
            ticker,
            Self::epoch_seconds(start_date),
            Self::epoch_seconds(end_date + Duration::days(1)),
            freq.interval_code()
        )
    }

    /// Turn a chart response into bars, dropping rows with missing fields.
    fn parse_response(ticker: &str, json: &str) -> Result<Vec<PriceBar>, QfError> {
        let response: ChartResponse =
            serde_json::from_str(json).map_err(|e| QfError::DataSource {
                reason: format!("invalid response for {ticker}: {e}"),
            })?;

        if let Some(error) = response.chart.error {
            return Err(QfError::DataSource {
                reason: format!("{ticker}: [{}] {}", error.code, error.description),
            });
        }

        let Some(data) = response.chart.result.and_then(|r| r.into_iter().next()) else {
            return Ok(Vec::new());
        };
        let Some(quote) = data.indicators.quote.first() else {
            return Ok(Vec::new());
        };
        let offset = data.meta.map(|m| m.gmtoffset).unwrap_or_default();

        let mut bars = Vec::with_capacity(data.timestamp.len());
        for (i, &ts) in data.timestamp.iter().enumerate() {
            let field = |v: &Vec<Option<f64>>| v.get(i).copied().flatten();
            let row = (
                field(&quote.open),
                field(&quote.high),
                field(&quote.low),
                field(&quote.close),
                quote.volume.get(i).copied().flatten(),
            );
            let (Some(open), Some(high), Some(low), Some(close), Some(volume)) = row else {
                warn!(ticker, timestamp = ts, "skipping incomplete quote");
                continue;
            };
            let Some(moment) = DateTime::from_timestamp(ts + offset, 0) else {
                warn!(ticker, timestamp = ts, "skipping out-of-range timestamp");
                continue;
            };
            bars.push(PriceBar {
                date: moment.date_naive(),
                open,
                high,
                low,
                close,
                volume,
            });
        }

        bars.sort_by_key(|b| b.date);
        bars.dedup_by_key(|b| b.date);
        Ok(bars)
    }

    /// Drop bars outside `[start_date, end_date]`.
    ///
    /// Weekly and monthly candles are dated at the start of their period, so
    /// the candle whose period contains `start_date` is kept.
    fn clip_to_range(bars: &mut Vec<PriceBar>, start_date: NaiveDate, end_date: NaiveDate, freq: Frequency) {
        let covers_start = |date: NaiveDate| match freq {
            Frequency::Daily => date >= start_date,
            Frequency::Weekly => start_date
                .checked_sub_signed(Duration::days(7))
                .is_none_or(|week_before| date > week_before),
            Frequency::Monthly => {
                (date.year(), date.month()) >= (start_date.year(), start_date.month())
            }
        };
        bars.retain(|b| covers_start(b.date) && b.date <= end_date);
    }
}

impl DataPort for YahooAdapter {
    #[cfg(feature = "yahoo")]
    fn fetch_prices(
        &self,
        ticker: &str,
        start_date: NaiveDate,
        end_date: NaiveDate,
        freq: Frequency,
    ) -> Result<Vec<PriceBar>, QfError> {
        let url = self.build_url(ticker, start_date, end_date, freq);
        debug!(%url, "requesting price history");

        let client = reqwest::blocking::Client::builder()
            .user_agent(self.user_agent.as_str())
            .build()
            .map_err(|e| QfError::DataSource {
                reason: e.to_string(),
            })?;

        let body = client
            .get(&url)
            .send()
            .and_then(|r| r.text())
            .map_err(|e| QfError::DataSource {
                reason: format!("request for {ticker} failed: {e}"),
            })?;

        let mut bars = Self::parse_response(ticker, &body)?;
        Self::clip_to_range(&mut bars, start_date, end_date, freq);
        debug!(ticker, rows = bars.len(), "received price history");
        Ok(bars)
    }

    #[cfg(not(feature = "yahoo"))]
    fn fetch_prices(
        &self,
        ticker: &str,
        _start_date: NaiveDate,
        _end_date: NaiveDate,
        _freq: Frequency,
    ) -> Result<Vec<PriceBar>, QfError> {
        let _ = (&self.base_url, &self.user_agent);
        Err(QfError::DataSource {
            reason: format!("cannot fetch {ticker}: yahoo feature is required"),
        })
    }
}
