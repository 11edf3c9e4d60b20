//! Concrete adapter implementations for ports.

pub mod csv_adapter;
pub mod file_config_adapter;
pub mod result_table_csv;
pub mod svg_chart;
pub mod yahoo_adapter;
