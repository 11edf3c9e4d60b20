//! Sampling frequency of price and return series.

use std::fmt;
use std::str::FromStr;

use super::error::QfError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Frequency {
    #[default]
    Daily,
    Weekly,
    Monthly,
}

impl Frequency {
    /// Periods per year used to annualize statistics.
    pub fn periods_per_year(self) -> f64 {
        match self {
            Frequency::Daily => 252.0,
            Frequency::Weekly => 52.0,
            Frequency::Monthly => 12.0,
        }
    }

    /// Interval code understood by the Yahoo chart endpoint.
    pub fn interval_code(self) -> &'static str {
        match self {
            Frequency::Daily => "1d",
            Frequency::Weekly => "1wk",
            Frequency::Monthly => "1mo",
        }
    }
}

impl fmt::Display for Frequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Frequency::Daily => "daily",
            Frequency::Weekly => "weekly",
            Frequency::Monthly => "monthly",
        };
        f.write_str(name)
    }
}

impl FromStr for Frequency {
    type Err = QfError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "daily" | "1d" => Ok(Frequency::Daily),
            "weekly" | "1wk" => Ok(Frequency::Weekly),
            "monthly" | "1mo" => Ok(Frequency::Monthly),
            other => Err(QfError::InvalidArgument {
                name: "frequency".into(),
                reason: format!("unknown frequency {other:?} (expected daily, weekly or monthly)"),
            }),
        }
    }
}
