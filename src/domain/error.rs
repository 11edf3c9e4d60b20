//! Domain error types.

/// Top-level error type for qfkit.
#[derive(Debug, thiserror::Error)]
pub enum QfError {
    #[error("config parse error in {file}: {reason}")]
    ConfigParse { file: String, reason: String },

    #[error("invalid config value [{section}] {key}: {reason}")]
    ConfigInvalid {
        section: String,
        key: String,
        reason: String,
    },

    #[error("invalid date {value:?} (expected YYYY-MM-DD)")]
    InvalidDate { value: String },

    #[error("invalid argument {name}: {reason}")]
    InvalidArgument { name: String, reason: String },

    #[error("data source error: {reason}")]
    DataSource { reason: String },

    #[error("no data for {ticker} between {start} and {end}")]
    NoData {
        ticker: String,
        start: String,
        end: String,
    },

    #[error("insufficient data for {ticker}: have {have} trading days, need {need}")]
    InsufficientData {
        ticker: String,
        have: usize,
        need: usize,
    },

    #[error("result table is empty")]
    EmptyResult,

    #[error("csv error: {reason}")]
    Csv { reason: String },

    #[error("chart error: {reason}")]
    Chart { reason: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl From<csv::Error> for QfError {
    fn from(err: csv::Error) -> Self {
        QfError::Csv {
            reason: err.to_string(),
        }
    }
}

impl From<&QfError> for std::process::ExitCode {
    fn from(err: &QfError) -> Self {
        let code: u8 = match err {
            QfError::Io(_) | QfError::Csv { .. } | QfError::Chart { .. } => 1,
            QfError::ConfigParse { .. } | QfError::ConfigInvalid { .. } => 2,
            QfError::DataSource { .. } => 3,
            QfError::InvalidDate { .. } | QfError::InvalidArgument { .. } => 4,
            QfError::NoData { .. } | QfError::InsufficientData { .. } | QfError::EmptyResult => 5,
        };
        std::process::ExitCode::from(code)
    }
}

/// Parse a `YYYY-MM-DD` date, mapping failures to [`QfError::InvalidDate`].
pub fn parse_date(value: &str) -> Result<chrono::NaiveDate, QfError> {
    chrono::NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d").map_err(|_| QfError::InvalidDate {
        value: value.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn parse_date_accepts_iso_format() {
        assert_eq!(
            parse_date("2021-03-15").unwrap(),
            NaiveDate::from_ymd_opt(2021, 3, 15).unwrap()
        );
    }

    #[test]
    fn parse_date_rejects_other_formats() {
        let err = parse_date("2021/03/15").unwrap_err();
        assert!(matches!(err, QfError::InvalidDate { value } if value == "2021/03/15"));
        assert!(parse_date("2021-02-30").is_err());
    }

    #[test]
    fn insufficient_data_message() {
        let err = QfError::InsufficientData {
            ticker: "MSFT".into(),
            have: 3,
            need: 10,
        };
        assert_eq!(
            err.to_string(),
            "insufficient data for MSFT: have 3 trading days, need 10"
        );
    }
}
