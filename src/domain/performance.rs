//! Risk/return statistics of a periodic returns series.
//!
//! Each statistic is computed independently. NaN entries are skipped the way
//! the usual `nan*` aggregates skip them: they count as a zero return when
//! compounding and are left out of means and deviations. Degenerate input
//! yields `NaN` instead of an error.

use super::frequency::Frequency;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PerformanceConfig {
    /// Risk-free rate per period, subtracted before the Sharpe ratio.
    pub risk_free_rate: f64,
    /// Minimum acceptable return per period for the Sortino ratio.
    pub required_return: f64,
    pub frequency: Frequency,
}

impl Default for PerformanceConfig {
    fn default() -> Self {
        PerformanceConfig {
            risk_free_rate: 0.0,
            required_return: 0.0,
            frequency: Frequency::Daily,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PerformanceSummary {
    pub annualized_returns: f64,
    pub cumulative_returns: f64,
    pub annual_volatility: f64,
    pub sharpe_ratio: f64,
    pub sortino_ratio: f64,
    pub max_drawdown: f64,
}

impl PerformanceSummary {
    pub fn compute(returns: &[f64], config: &PerformanceConfig) -> Self {
        let factor = config.frequency.periods_per_year();
        PerformanceSummary {
            annualized_returns: annual_return(returns, factor),
            cumulative_returns: cum_returns_final(returns),
            annual_volatility: annual_volatility(returns, factor),
            sharpe_ratio: sharpe_ratio(returns, config.risk_free_rate, factor),
            sortino_ratio: sortino_ratio(returns, config.required_return, factor),
            max_drawdown: max_drawdown(returns),
        }
    }

    /// Field names and values in their fixed reporting order.
    pub fn fields(&self) -> [(&'static str, f64); 6] {
        [
            ("annualized_returns", self.annualized_returns),
            ("cumulative_returns", self.cumulative_returns),
            ("annual_volatility", self.annual_volatility),
            ("sharpe_ratio", self.sharpe_ratio),
            ("sortino_ratio", self.sortino_ratio),
            ("max_drawdown", self.max_drawdown),
        ]
    }
}

/// Total compounded return: `prod(1 + r) - 1`.
pub fn cum_returns_final(returns: &[f64]) -> f64 {
    if returns.is_empty() {
        return f64::NAN;
    }
    growth_factor(returns) - 1.0
}

/// Geometric mean return per year.
pub fn annual_return(returns: &[f64], periods_per_year: f64) -> f64 {
    if returns.is_empty() {
        return f64::NAN;
    }
    let years = returns.len() as f64 / periods_per_year;
    growth_factor(returns).powf(1.0 / years) - 1.0
}

/// Sample standard deviation scaled by `sqrt(periods_per_year)`.
pub fn annual_volatility(returns: &[f64], periods_per_year: f64) -> f64 {
    if returns.len() < 2 {
        return f64::NAN;
    }
    nan_std(returns) * periods_per_year.sqrt()
}

pub fn sharpe_ratio(returns: &[f64], risk_free: f64, periods_per_year: f64) -> f64 {
    if returns.len() < 2 {
        return f64::NAN;
    }
    let excess: Vec<f64> = returns.iter().map(|r| r - risk_free).collect();
    nan_mean(&excess) / nan_std(&excess) * periods_per_year.sqrt()
}

pub fn sortino_ratio(returns: &[f64], required_return: f64, periods_per_year: f64) -> f64 {
    if returns.len() < 2 {
        return f64::NAN;
    }
    let excess: Vec<f64> = returns.iter().map(|r| r - required_return).collect();
    let average_annual = nan_mean(&excess) * periods_per_year;
    average_annual / downside_risk(&excess, periods_per_year)
}

/// Root mean square of below-target excess returns, annualized.
fn downside_risk(excess: &[f64], periods_per_year: f64) -> f64 {
    let squared: Vec<f64> = excess
        .iter()
        .map(|r| if r.is_nan() { f64::NAN } else { r.min(0.0).powi(2) })
        .collect();
    nan_mean(&squared).sqrt() * periods_per_year.sqrt()
}

/// Largest peak-to-trough decline of the wealth path, as a value in `[-1, 0]`.
pub fn max_drawdown(returns: &[f64]) -> f64 {
    if returns.is_empty() {
        return f64::NAN;
    }

    let mut wealth = 100.0_f64;
    let mut peak = wealth;
    let mut worst = 0.0_f64;

    for r in returns {
        if !r.is_nan() {
            wealth *= 1.0 + r;
        }
        peak = peak.max(wealth);
        let dd = (wealth - peak) / peak;
        if dd < worst {
            worst = dd;
        }
    }

    worst
}

fn growth_factor(returns: &[f64]) -> f64 {
    returns
        .iter()
        .filter(|r| !r.is_nan())
        .fold(1.0, |acc, r| acc * (1.0 + r))
}

fn nan_mean(values: &[f64]) -> f64 {
    let (sum, n) = values
        .iter()
        .filter(|v| !v.is_nan())
        .fold((0.0, 0usize), |(s, n), v| (s + v, n + 1));
    if n == 0 { f64::NAN } else { sum / n as f64 }
}

/// Sample standard deviation (one degree of freedom) ignoring NaNs.
fn nan_std(values: &[f64]) -> f64 {
    let clean: Vec<f64> = values.iter().copied().filter(|v| !v.is_nan()).collect();
    if clean.len() < 2 {
        return f64::NAN;
    }
    let n = clean.len() as f64;
    let mean = clean.iter().sum::<f64>() / n;
    let variance = clean.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (n - 1.0);
    variance.sqrt()
}
