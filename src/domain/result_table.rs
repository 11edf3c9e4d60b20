//! Backtest result table and trade signal classification.

use chrono::NaiveDate;

#[derive(Debug, Clone, PartialEq)]
pub struct Transaction {
    /// Signed quantity: positive buys, negative sells.
    pub amount: f64,
    pub price: Option<f64>,
    pub symbol: Option<String>,
}

impl Transaction {
    pub fn new(amount: f64) -> Self {
        Transaction {
            amount,
            price: None,
            symbol: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ResultRow {
    pub date: NaiveDate,
    pub portfolio_value: f64,
    pub price: f64,
    pub transactions: Vec<Transaction>,
    pub returns: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Signal {
    Buy,
    Sell,
}

impl ResultRow {
    /// Buy or sell according to the first transaction of the row.
    ///
    /// Rows mixing buys and sells are classified by the first one only; a
    /// zero-amount first transaction yields no signal.
    pub fn signal(&self) -> Option<Signal> {
        let first = self.transactions.first()?;
        if first.amount > 0.0 {
            Some(Signal::Buy)
        } else if first.amount < 0.0 {
            Some(Signal::Sell)
        } else {
            None
        }
    }
}

/// `(date, price)` of every buy and every sell in the table.
pub fn signal_points(rows: &[ResultRow]) -> (Vec<(NaiveDate, f64)>, Vec<(NaiveDate, f64)>) {
    let mut buys = Vec::new();
    let mut sells = Vec::new();
    for row in rows {
        match row.signal() {
            Some(Signal::Buy) => buys.push((row.date, row.price)),
            Some(Signal::Sell) => sells.push((row.date, row.price)),
            None => {}
        }
    }
    (buys, sells)
}
