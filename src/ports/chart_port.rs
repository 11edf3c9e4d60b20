//! Display surface port trait.

use crate::domain::chart::{ChartStyle, Figure};
use crate::domain::error::QfError;

/// Destination for rendered figures.
pub trait ChartPort {
    fn render(&mut self, figure: &Figure, style: &ChartStyle) -> Result<(), QfError>;
}
