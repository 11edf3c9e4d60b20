//! Core domain types and the four helper operations.

pub mod chart;
pub mod date_aligner;
pub mod error;
pub mod exporter;
pub mod frequency;
pub mod ohlcv;
pub mod performance;
pub mod result_table;
pub mod returns;
pub mod settings;
pub mod visualizer;
