//! Warm-up aware backtest start dates.

use chrono::{Duration, NaiveDate};
use tracing::debug;

use crate::domain::error::{parse_date, QfError};
use crate::domain::frequency::Frequency;
use crate::ports::data_port::DataPort;

/// Date that lies `days_prior` trading days before `start_date`.
///
/// Fetches daily bars for the window `[start_date - 2 * days_prior, start_date]`
/// and counts back from its end. When the window ends on `start_date` itself
/// that day does not count towards the warm-up, so one more bar is skipped.
pub fn get_start_date(
    data: &dyn DataPort,
    ticker: &str,
    start_date: &str,
    days_prior: usize,
) -> Result<NaiveDate, QfError> {
    if days_prior == 0 {
        return Err(QfError::InvalidArgument {
            name: "days_prior".into(),
            reason: "must be positive".into(),
        });
    }

    let start = parse_date(start_date)?;
    let window_start = i64::try_from(days_prior)
        .ok()
        .and_then(|n| n.checked_mul(2))
        .and_then(Duration::try_days)
        .and_then(|span| start.checked_sub_signed(span))
        .ok_or_else(|| QfError::InvalidArgument {
            name: "days_prior".into(),
            reason: format!("{days_prior} reaches past the earliest representable date"),
        })?;

    debug!(ticker, %window_start, %start, days_prior, "fetching warm-up window");
    let bars = data.fetch_prices(ticker, window_start, start, Frequency::Daily)?;

    let mut count = days_prior;
    if bars.last().is_some_and(|b| b.date == start) {
        count += 1;
    }

    if bars.len() < count {
        return Err(QfError::InsufficientData {
            ticker: ticker.to_string(),
            have: bars.len(),
            need: count,
        });
    }

    let adjusted = bars[bars.len() - count].date;
    debug!(ticker, %adjusted, trading_days = bars.len(), "aligned start date");
    Ok(adjusted)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ohlcv::PriceBar;
    use chrono::{Datelike, Weekday};
    use std::cell::RefCell;

    /// Serves weekday bars from a fixed calendar and records requested windows.
    struct WeekdayFeed {
        first: NaiveDate,
        last: NaiveDate,
        requests: RefCell<Vec<(NaiveDate, NaiveDate)>>,
    }

    impl WeekdayFeed {
        fn new(first: &str, last: &str) -> Self {
            WeekdayFeed {
                first: parse_date(first).unwrap(),
                last: parse_date(last).unwrap(),
                requests: RefCell::new(Vec::new()),
            }
        }
    }

    impl DataPort for WeekdayFeed {
        fn fetch_prices(
            &self,
            _ticker: &str,
            start_date: NaiveDate,
            end_date: NaiveDate,
            _freq: Frequency,
        ) -> Result<Vec<PriceBar>, QfError> {
            self.requests.borrow_mut().push((start_date, end_date));
            Ok(start_date
                .iter_days()
                .take_while(|d| *d <= end_date)
                .filter(|d| *d >= self.first && *d <= self.last)
                .filter(|d| !matches!(d.weekday(), Weekday::Sat | Weekday::Sun))
                .map(|date| PriceBar {
                    date,
                    open: 1.0,
                    high: 1.0,
                    low: 1.0,
                    close: 1.0,
                    volume: 0,
                })
                .collect())
        }
    }

    fn d(s: &str) -> NaiveDate {
        parse_date(s).unwrap()
    }

    #[test]
    fn requests_twice_the_warm_up_in_calendar_days() {
        let feed = WeekdayFeed::new("2020-01-01", "2021-12-31");
        get_start_date(&feed, "SPY", "2021-03-15", 10).unwrap();
        assert_eq!(
            feed.requests.borrow().as_slice(),
            &[(d("2021-02-23"), d("2021-03-15"))]
        );
    }

    #[test]
    fn start_on_trading_day_skips_that_day() {
        // 2021-03-15 is a Monday and present in the feed.
        let feed = WeekdayFeed::new("2020-01-01", "2021-12-31");
        let adjusted = get_start_date(&feed, "SPY", "2021-03-15", 3).unwrap();
        // Three trading days strictly before: Fri 12th, Thu 11th, Wed 10th.
        assert_eq!(adjusted, d("2021-03-10"));
    }

    #[test]
    fn start_on_weekend_counts_from_last_trading_day() {
        // 2021-03-14 is a Sunday; the window ends on Friday the 12th.
        let feed = WeekdayFeed::new("2020-01-01", "2021-12-31");
        let adjusted = get_start_date(&feed, "SPY", "2021-03-14", 3).unwrap();
        assert_eq!(adjusted, d("2021-03-10"));
    }

    #[test]
    fn lookback_crosses_weekends() {
        let feed = WeekdayFeed::new("2020-01-01", "2021-12-31");
        let adjusted = get_start_date(&feed, "SPY", "2021-03-15", 7).unwrap();
        // Fri 12, Thu 11, Wed 10, Tue 9, Mon 8, Fri 5, Thu 4
        assert_eq!(adjusted, d("2021-03-04"));
    }

    #[test]
    fn missing_start_day_uses_days_prior_as_is() {
        // Feed stops on the 12th even though the 15th is a weekday.
        let feed = WeekdayFeed::new("2020-01-01", "2021-03-12");
        let adjusted = get_start_date(&feed, "SPY", "2021-03-15", 2).unwrap();
        assert_eq!(adjusted, d("2021-03-11"));
    }

    #[test]
    fn too_little_history_is_an_error() {
        let feed = WeekdayFeed::new("2021-03-11", "2021-12-31");
        let err = get_start_date(&feed, "SPY", "2021-03-15", 5).unwrap_err();
        assert!(matches!(
            err,
            QfError::InsufficientData { have: 3, need: 6, .. }
        ));
    }

    #[test]
    fn zero_days_prior_rejected() {
        let feed = WeekdayFeed::new("2020-01-01", "2021-12-31");
        assert!(matches!(
            get_start_date(&feed, "SPY", "2021-03-15", 0),
            Err(QfError::InvalidArgument { .. })
        ));
        assert!(feed.requests.borrow().is_empty());
    }

    #[test]
    fn oversized_days_prior_rejected() {
        let feed = WeekdayFeed::new("2020-01-01", "2021-12-31");
        for days_prior in [1_000_000_000, usize::MAX] {
            assert!(matches!(
                get_start_date(&feed, "SPY", "2021-03-01", days_prior),
                Err(QfError::InvalidArgument { name, .. }) if name == "days_prior"
            ));
        }
        assert!(feed.requests.borrow().is_empty());
    }

    #[test]
    fn malformed_start_date_rejected() {
        let feed = WeekdayFeed::new("2020-01-01", "2021-12-31");
        assert!(matches!(
            get_start_date(&feed, "SPY", "15/03/2021", 5),
            Err(QfError::InvalidDate { .. })
        ));
    }
}
